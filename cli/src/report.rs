use std::path::PathBuf;

use plate_solver_core::DirectoryReport;

/// Result of solving a single file.
pub struct FileResult {
    pub path: PathBuf,
    pub error: Option<String>,
}

impl FileResult {
    pub fn solved(path: PathBuf) -> Self {
        Self { path, error: None }
    }

    pub fn failed(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            error: Some(error.into()),
        }
    }
}

/// Aggregate report for all solved files.
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_none()).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn print_summary(&self) {
        println!("\n--- Summary ---");
        println!(
            "Files solved: {} | Errors: {}",
            self.success_count(),
            self.error_count()
        );

        for r in &self.results {
            if let Some(ref err) = r.error {
                println!("  ERROR {}:", r.path.display());
                for line in err.trim_end().lines() {
                    println!("    {}", line);
                }
            }
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl From<DirectoryReport> for Report {
    fn from(dir: DirectoryReport) -> Self {
        let mut report = Report::new();
        for path in dir.solved {
            report.add(FileResult::solved(path));
        }
        for (path, error) in dir.failures {
            report.add(FileResult::failed(path, error));
        }
        report.results.sort_by(|a, b| a.path.cmp(&b.path));
        report
    }
}
