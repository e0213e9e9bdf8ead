//! User-facing alerts raised in debug mode

use std::io::{self, Write};

/// Surfaces a message to the person at the terminal.
///
/// Implementations may block until the message has been acknowledged.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Writes alerts to stderr and flushes before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", message);
        let _ = stderr.flush();
    }
}
