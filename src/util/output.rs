use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use console::style;

static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn info(message: &str) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    let _ = writeln!(io::stderr(), "{}", message);
}

pub fn warn(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).yellow());
}

pub fn error(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).red());
}

/// Echoes an external command before it runs.
pub fn command(args: &[String]) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    let _ = writeln!(io::stderr(), "{} {}", style("-->").cyan(), args.join(" "));
}
