use std::path::PathBuf;

use clap::{Parser, Subcommand};

use plate_solver_core::config::{BackupPolicy, SolveOptions};

/// CLI tool for plate solving FITS images in place with ASTAP
#[derive(Debug, Parser)]
#[command(name = "plate_solver", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the ASTAP command-line executable
    #[arg(long, env = "ASTAP_PATH", value_name = "PATH")]
    pub astap: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve a FITS file, or every .fits/.fit file directly inside a directory
    Solve {
        /// Input file or directory
        input: PathBuf,

        /// Do not create a .bak backup (a failed solve is then not rolled back)
        #[arg(long)]
        no_backup: bool,

        /// What to do with the .bak file after a successful solve
        #[arg(long, value_name = "POLICY", default_value_t = BackupPolicy::Keep)]
        backup_policy: BackupPolicy,

        /// Show the ASTAP commands that would run without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that the configured ASTAP binary exists
    Check,

    /// Put FILE.bak back in place of FILE
    Restore {
        /// File whose backup should be restored
        input: PathBuf,
    },
}

impl Command {
    /// Options for the `solve` subcommand; defaults for everything else.
    pub fn solve_options(&self) -> SolveOptions {
        match self {
            Command::Solve {
                no_backup,
                backup_policy,
                ..
            } => SolveOptions {
                disable_backups: *no_backup,
                backup_policy: *backup_policy,
            },
            _ => SolveOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_solve_defaults() {
        let cli = Cli::try_parse_from(["plate_solver", "--astap", "/opt/astap/astap_cli", "solve", "lights"])
            .unwrap();

        assert_eq!(cli.astap, PathBuf::from("/opt/astap/astap_cli"));
        let options = cli.command.solve_options();
        assert!(!options.disable_backups);
        assert_eq!(options.backup_policy, BackupPolicy::Keep);
        match cli.command {
            Command::Solve { input, dry_run, .. } => {
                assert_eq!(input, PathBuf::from("lights"));
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_solve_flags() {
        let cli = Cli::try_parse_from([
            "plate_solver",
            "--astap",
            "astap_cli",
            "solve",
            "m31.fits",
            "--no-backup",
            "--backup-policy",
            "remove-on-success",
            "--dry-run",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let options = cli.command.solve_options();
        assert!(options.disable_backups);
        assert_eq!(options.backup_policy, BackupPolicy::RemoveOnSuccess);
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        let result = Cli::try_parse_from([
            "plate_solver",
            "--astap",
            "astap_cli",
            "solve",
            "lights",
            "--backup-policy",
            "sometimes",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_restore() {
        let cli = Cli::try_parse_from(["plate_solver", "--astap", "astap_cli", "restore", "m31.fits"])
            .unwrap();
        assert!(matches!(cli.command, Command::Restore { ref input } if input == &PathBuf::from("m31.fits")));
    }
}
