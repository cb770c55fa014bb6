use owo_colors::OwoColorize;

use crate::plan::{Operation, Plan};
use crate::sync::SyncReport;

/// Small wrapper around stdout/stderr printing to provide consistent, colored
/// user-facing messages. Colors are enabled only when output is a TTY.
fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// One plan line per operation, uncolored when piped so it can be scripted against.
pub fn print_plan(plan: &Plan) {
    let tty = is_tty();
    for op in plan {
        if !tty {
            println!("{op}");
            continue;
        }
        match op {
            Operation::Copy { .. } => println!("{}", op.to_string().green()),
            Operation::Move { .. } => println!("{}", op.to_string().cyan()),
            Operation::Delete { .. } => println!("{}", op.to_string().red()),
        }
    }
}

/// Human-readable one-line summary of a finished (or simulated) sync.
pub fn summary_line(report: &SyncReport, dry_run: bool) -> String {
    let s = &report.summary;
    if s.total() == 0 {
        return "Destination already in sync".to_string();
    }
    let verb = if dry_run { "Would apply" } else { "Applied" };
    format!(
        "{verb} {} operations: {} copied ({} bytes), {} moved, {} deleted",
        s.total(),
        s.copied,
        s.bytes_copied,
        s.moved,
        s.deleted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::ExecSummary;

    #[test]
    fn summary_for_noop_sync() {
        let report = SyncReport {
            plan: Plan::default(),
            summary: ExecSummary::default(),
        };
        assert_eq!(summary_line(&report, false), "Destination already in sync");
    }

    #[test]
    fn summary_counts_everything() {
        let report = SyncReport {
            plan: Plan::default(),
            summary: ExecSummary {
                copied: 2,
                moved: 1,
                deleted: 3,
                bytes_copied: 10,
            },
        };
        assert_eq!(
            summary_line(&report, true),
            "Would apply 6 operations: 2 copied (10 bytes), 1 moved, 3 deleted"
        );
    }
}
