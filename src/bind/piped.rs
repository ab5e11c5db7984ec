//! Piped stdin as an input source for the target's unbounded operand.

use std::io::BufRead;

/// Supplies piped input lines, or `None` when stdin is interactive.
/// Injectable so tests and embedded hosts can feed lines directly.
pub trait PipedInput {
    fn read_lines(&self) -> Option<Vec<String>>;
}

/// Reads the process's own stdin when it is not a TTY.
pub struct StdinPipe;

impl PipedInput for StdinPipe {
    fn read_lines(&self) -> Option<Vec<String>> {
        if atty::is(atty::Stream::Stdin) {
            return None;
        }
        let stdin = std::io::stdin();
        let lines = stdin.lock().lines().map_while(Result::ok).collect();
        Some(lines)
    }
}

/// A fixed set of lines, for tests.
pub struct FixedPipe {
    lines: Vec<String>,
}

impl FixedPipe {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl PipedInput for FixedPipe {
    fn read_lines(&self) -> Option<Vec<String>> {
        Some(self.lines.clone())
    }
}
