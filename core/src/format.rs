use std::path::Path;

/// Extensions ASTAP is pointed at. Matching is case-sensitive, so `M31.FITS`
/// is not picked up by a directory solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitsExtension {
    Fits,
    Fit,
}

impl FitsExtension {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "fits" => Some(FitsExtension::Fits),
            "fit" => Some(FitsExtension::Fit),
            _ => None,
        }
    }
}
