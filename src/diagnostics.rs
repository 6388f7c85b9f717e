//! Human-readable progress lines emitted by the referee.

use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Receives one line per phase entry, elimination and win-condition check.
pub trait DiagnosticSink: Send + Sync {
    /// Accepts one line.
    fn line(&self, line: &str);
}

/// Forwards lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn line(&self, line: &str) {
        info!(target: "strictly_werewolf::diagnostics", "{}", line);
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every line received so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.line("Night 1");
        sink.line("Bidding 1");
        assert_eq!(sink.lines(), vec!["Night 1", "Bidding 1"]);
    }
}
