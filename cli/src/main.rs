use std::path::Path;
use std::process::Command as ProcessCommand;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use plate_solver::cli::{Cli, Command};
use plate_solver::report::{FileResult, Report};
use plate_solver_core::backup::{backup_path, restore_backup, RestoreOutcome};
use plate_solver_core::config::SolveOptions;
use plate_solver_core::solver::{SolveEvent, Solver};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match &cli.command {
        Command::Solve { input, dry_run, .. } => {
            let options = cli.command.solve_options();
            handle_solve(&cli.astap, input, &options, *dry_run)
        }
        Command::Check => handle_check(&cli.astap),
        Command::Restore { input } => handle_restore(input),
    }
}

fn handle_solve(astap: &Path, input: &Path, options: &SolveOptions, dry_run: bool) -> Result<()> {
    let solver = Solver::new(astap).context("Failed to set up ASTAP")?;

    if !input.exists() {
        anyhow::bail!("Input not found: {}", input.display());
    }

    if dry_run {
        return print_dry_run(&solver, input, options);
    }

    let report = if input.is_dir() {
        solve_directory(&solver, input, options)?
    } else {
        let mut report = Report::new();
        match solver.solve_with(input, options) {
            Ok(()) => report.add(FileResult::solved(input.to_path_buf())),
            Err(e) => {
                log::error!("Error solving {}: {}", input.display(), e);
                report.add(FileResult::failed(input.to_path_buf(), e.to_string()));
            }
        }
        report
    };

    report.print_summary();

    if report.error_count() > 0 {
        anyhow::bail!("{} file(s) could not be solved", report.error_count());
    }
    Ok(())
}

fn solve_directory(solver: &Solver, dir: &Path, options: &SolveOptions) -> Result<Report> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("█▓░"),
    );

    let dir_report = solver
        .solve_directory_with(dir, options, |event| match event {
            SolveEvent::Found { total } => {
                if total == 0 {
                    println!("No FITS files found.");
                }
                pb.set_length(total as u64);
            }
            SolveEvent::Solving { path } => pb.set_message(file_name(path)),
            SolveEvent::Solved { .. } => pb.inc(1),
            SolveEvent::Failed { path, error } => {
                log::error!("Error solving {}: {}", path.display(), error);
                pb.inc(1);
            }
        })
        .with_context(|| format!("Failed to solve directory {}", dir.display()))?;

    pb.finish_with_message("Done!");
    Ok(Report::from(dir_report))
}

fn print_dry_run(solver: &Solver, input: &Path, options: &SolveOptions) -> Result<()> {
    let files = if input.is_dir() {
        solver
            .eligible_files(input)
            .context("Failed to collect input files")?
    } else {
        vec![input.to_path_buf()]
    };

    if files.is_empty() {
        println!("No FITS files found.");
        return Ok(());
    }

    println!("[dry-run] Would run:");
    for f in &files {
        println!("  {}", describe(&solver.command(f)));
        if !options.disable_backups {
            println!("    backup → {} ({})", backup_path(f).display(), options.backup_policy);
        }
    }
    Ok(())
}

fn handle_check(astap: &Path) -> Result<()> {
    let solver = Solver::new(astap).context("ASTAP check failed")?;
    println!("✓ ASTAP binary found at {}", solver.binary_path().display());
    Ok(())
}

fn handle_restore(input: &Path) -> Result<()> {
    match restore_backup(input).with_context(|| format!("Failed to restore {}", input.display()))? {
        RestoreOutcome::Restored => {
            println!("✓ Restored {} from backup", input.display());
            Ok(())
        }
        RestoreOutcome::NoBackup => {
            anyhow::bail!("No backup found at {}", backup_path(input).display())
        }
    }
}

fn describe(cmd: &ProcessCommand) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
