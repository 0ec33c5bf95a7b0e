//! Pretty CLI output helpers using the `colored` crate.

use colored::Colorize;

/// Print a progress step (blue)
pub fn step(msg: &str) {
    println!("{} {}", "»".blue().bold(), msg);
}

/// Print a "skip" action (yellow)
pub fn skipped(what: &str, reason: &str) {
    println!("  {} {} ({})", "skip".yellow(), what, reason);
}

/// Print a "start" action (green)
pub fn started(what: &str, detail: &str) {
    println!("  {} {} ({})", "start".green(), what, detail);
}

/// Print a section header (bold)
pub fn section(title: &str) {
    println!("\n{}", title.bold());
}

/// Print a success message (green bold)
pub fn success(msg: &str) {
    println!("\n{}", msg.green().bold());
}

/// Print a hint (cyan)
pub fn info(msg: &str) {
    println!("  {}", msg.cyan());
}

/// Print a warning (yellow)
pub fn warn(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an error (red)
pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

/// Print a check result (pass)
pub fn check_pass(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a check result (fail)
pub fn check_fail(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}
