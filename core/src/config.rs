use std::fmt;
use std::str::FromStr;

/// What happens to `<file>.bak` once ASTAP has solved the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupPolicy {
    /// Leave the backup next to the solved file.
    #[default]
    Keep,
    /// Delete the backup after a successful solve.
    RemoveOnSuccess,
}

impl fmt::Display for BackupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::RemoveOnSuccess => write!(f, "remove-on-success"),
        }
    }
}

impl FromStr for BackupPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "remove-on-success" | "remove" => Ok(Self::RemoveOnSuccess),
            _ => Err(format!("unknown backup policy: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Skip the `.bak` copy (and therefore any restore on failure)
    pub disable_backups: bool,
    /// Backup handling after a successful solve
    pub backup_policy: BackupPolicy,
}

impl SolveOptions {
    pub fn with_backups_disabled(disable_backups: bool) -> Self {
        Self {
            disable_backups,
            ..Self::default()
        }
    }
}
