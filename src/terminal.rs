use std::io::{self, IsTerminal};

/// Reports what the process's standard streams are attached to.
pub trait TerminalClient {
    /// Whether stdout is an interactive terminal.
    fn stdout_is_terminal(&self) -> bool;
    /// Whether stderr is an interactive terminal.
    fn stderr_is_terminal(&self) -> bool;
}

/// Terminal client backed by the real process streams.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SystemTerminalClient;

impl TerminalClient for SystemTerminalClient {
    fn stdout_is_terminal(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn stderr_is_terminal(&self) -> bool {
        io::stderr().is_terminal()
    }
}
