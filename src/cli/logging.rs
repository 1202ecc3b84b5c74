//! CLI output levels

/// Verbosity of CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all non-error output
    Quiet,
    /// Normal output
    Normal,
    /// Extra per-sample detail
    Verbose,
}

impl LogLevel {
    /// Whether a message at `required` level should be printed.
    pub fn permits(self, required: LogLevel) -> bool {
        match self {
            LogLevel::Quiet => false,
            LogLevel::Normal => required == LogLevel::Normal,
            LogLevel::Verbose => true,
        }
    }
}

/// Print `msg` when the current level permits it.
pub fn say(level: LogLevel, required: LogLevel, msg: &str) {
    if level.permits(required) {
        println!("{msg}");
    }
}
