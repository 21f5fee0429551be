//! Runs the ASTAP plate solver over FITS images.
//!
//! ASTAP does the actual solving and rewrites each file in place. This crate
//! locates the binary, builds the invocation, keeps a `<file>.bak` copy around
//! every run so a failed solve can be rolled back, and walks directories.

pub mod backup;
pub mod config;
pub mod error;
pub mod format;
pub mod solver;

pub use config::{BackupPolicy, SolveOptions};
pub use error::{RestoreError, SolverError};
pub use solver::{DirectoryReport, SolveEvent, Solver};
