//! Terminal UI: spinners, per-target result lines, and captured command output.
//!
//! While a target is being dumped the operator sees only a spinner and the
//! `host/db` label.  The dump binary's own output is captured and hidden,
//! then replayed in full if it exits non-zero.

use std::{
    process::{Command, Output, Stdio},
    time::Duration,
};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::runner::describe;

// ─── Icons ───────────────────────────────────────────────────────────────────

static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of dumping a single target.
#[derive(Debug)]
pub struct StageOutcome {
    /// Human-readable label, e.g. `"db1.lan/orders"`.
    pub label: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Why the stage failed, if it did.
    pub error: Option<String>,
}

impl StageOutcome {
    /// Print the one-line summary (✓/✗ + label).
    ///
    /// On failure, also prints the captured stdout/stderr and the error
    /// message so the operator has everything they need without re-running.
    pub fn print(&self) {
        if self.success {
            println!("  {}  {}", icon_ok(), style(&self.label).bold());
            return;
        }

        println!("  {}  {}", icon_err(), style(&self.label).bold());

        if let Some(ref msg) = self.error {
            eprintln!();
            eprintln!("  {} {}", style("Error:").red().bold(), msg);
        }
        if !self.stdout.is_empty() {
            eprintln!();
            eprintln!("  {} stdout:", style("►").dim());
            for line in self.stdout.lines() {
                eprintln!("    {line}");
            }
        }
        if !self.stderr.is_empty() {
            eprintln!();
            eprintln!("  {} stderr:", style("►").dim());
            for line in self.stderr.lines() {
                eprintln!("    {line}");
            }
        }
    }

    /// Returns `true` if the stage did not succeed.
    pub const fn failed(&self) -> bool {
        !self.success
    }

    /// One-line description of a failure: the error plus the last line the
    /// command wrote to stderr, which is where mongo-dump reports the cause.
    pub fn failure_detail(&self) -> String {
        let error = self.error.as_deref().unwrap_or("command failed");
        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(last) => format!("{error} ({})", last.trim()),
            None => error.to_string(),
        }
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    pb.set_style(spinner_style);
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── Captured execution ───────────────────────────────────────────────────────

/// Run a command, capturing both stdout and stderr.
///
/// Nothing is inherited from the parent's stdout/stderr, so the spinner owns
/// the terminal while the command runs.
///
/// Returns `(success, stdout_text, stderr_text)`.
pub fn run_captured(args: &[String]) -> Result<(bool, String, String)> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;

    let output: Output = Command::new(prog)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn: {}", describe(args)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok((output.status.success(), stdout, stderr))
}

// ─── High-level stage runner ──────────────────────────────────────────────────

/// Run one command behind a spinner, returning a [`StageOutcome`].
///
/// The spinner is cleared before the outcome line is printed.
pub fn run_stage(label: &str, args: &[String]) -> StageOutcome {
    let spinner = make_spinner(label);

    let result = run_captured(args);
    spinner.finish_and_clear();

    match result {
        Ok((true, stdout, stderr)) => StageOutcome {
            label: label.to_string(),
            success: true,
            stdout,
            stderr,
            error: None,
        },
        Ok((false, stdout, stderr)) => StageOutcome {
            label: label.to_string(),
            success: false,
            stdout,
            stderr,
            error: Some(format!("command exited non-zero: {}", describe(args))),
        },
        Err(e) => StageOutcome {
            label: label.to_string(),
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(format!("{e:#}")),
        },
    }
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Print the banner closing a dump run.
pub fn print_summary(outcomes: &[StageOutcome]) {
    let failed: Vec<&StageOutcome> = outcomes.iter().filter(|o| o.failed()).collect();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style(format!("{} target(s) dumped.", outcomes.len()))
                .cyan()
                .bold()
        );
    } else {
        eprintln!("  {}  {}", icon_err(), style("Dump failed.").red().bold());
        for o in &failed {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn success(label: &str) -> StageOutcome {
        StageOutcome {
            label: label.into(),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
        }
    }

    fn failure(label: &str, err: &str, stdout: &str, stderr: &str) -> StageOutcome {
        StageOutcome {
            label: label.into(),
            success: false,
            stdout: stdout.into(),
            stderr: stderr.into(),
            error: Some(err.into()),
        }
    }

    // ── StageOutcome ──────────────────────────────────────────────────────────

    #[test]
    fn success_outcome_is_not_failed() {
        assert!(!success("a/db").failed());
    }

    #[test]
    fn failure_outcome_is_failed() {
        assert!(failure("a/db", "oh no", "", "").failed());
    }

    #[test]
    fn failure_detail_appends_last_stderr_line() {
        let o = failure("a/db", "exited 1", "", "connecting\nauth failed\n\n");
        assert_eq!(o.failure_detail(), "exited 1 (auth failed)");
    }

    #[test]
    fn failure_detail_without_stderr_is_error_only() {
        assert_eq!(failure("a/db", "exited 1", "x", "").failure_detail(), "exited 1");
    }

    // ── run_captured ─────────────────────────────────────────────────────────

    #[cfg(unix)]
    #[test]
    fn run_captured_true_succeeds() {
        let (ok, _out, _err) = run_captured(&["true".into()]).unwrap();
        assert!(ok);
    }

    #[cfg(unix)]
    #[test]
    fn run_captured_false_fails() {
        let (ok, _out, _err) = run_captured(&["false".into()]).unwrap();
        assert!(!ok);
    }

    #[cfg(unix)]
    #[test]
    fn run_captured_captures_both_streams() {
        let (ok, out, err) =
            run_captured(&["sh".into(), "-c".into(), "echo hello; echo oops >&2".into()]).unwrap();
        assert!(ok);
        assert!(out.contains("hello"));
        assert!(err.contains("oops"));
    }

    #[test]
    fn run_captured_empty_args_errors() {
        assert!(run_captured(&[]).is_err());
    }

    #[test]
    fn run_captured_missing_program_errors_without_password() {
        let args: Vec<String> = vec![
            "/definitely/not/here/mongo-dump".into(),
            "-p".into(),
            "hunter2".into(),
        ];
        let err = run_captured(&args).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("failed to spawn"));
        assert!(!msg.contains("hunter2"));
    }

    // ── run_stage ─────────────────────────────────────────────────────────────

    #[cfg(unix)]
    #[test]
    fn run_stage_success_sets_success_true() {
        let o = run_stage("Test", &["true".into()]);
        assert!(o.success);
        assert_eq!(o.label, "Test");
        assert!(o.error.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn run_stage_keeps_output_of_failed_command() {
        let o = run_stage("Test", &[
            "sh".into(),
            "-c".into(),
            "echo bad output; echo denied >&2; exit 1".into(),
        ]);
        assert!(!o.success);
        assert!(o.stdout.contains("bad output"));
        assert!(o.failure_detail().contains("denied"));
    }

    #[test]
    fn run_stage_spawn_failure_is_failed_outcome() {
        let o = run_stage("Test", &["/definitely/not/here".into()]);
        assert!(o.failed());
        assert!(o.error.as_deref().unwrap_or("").contains("failed to spawn"));
    }

    // ── print_summary ─────────────────────────────────────────────────────────

    #[test]
    fn summary_smoke() {
        print_summary(&[success("a/db"), success("b/db")]);
        print_summary(&[success("a/db"), failure("b/db", "boom", "", "detail")]);
        print_summary(&[]);
    }
}
