use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_INTERVAL: Duration = Duration::from_millis(90);

/// Indefinite stderr spinner shown while a future runs.
#[derive(Debug)]
pub(crate) struct Spinner {
    enabled: bool,
}

impl Spinner {
    /// Creates a spinner that only draws when `enabled`.
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Awaits `operation` with `message` beside the spinner.
    pub(crate) async fn wrap<Fut, T>(&self, message: &str, operation: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        if !self.enabled {
            return operation.await;
        }

        let bar = ProgressBar::new_spinner()
            .with_style(spinner_style())
            .with_message(message.to_string());
        bar.enable_steady_tick(TICK_INTERVAL);
        let result = operation.await;
        bar.finish_and_clear();
        result
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan.bold} {msg}")
        .unwrap_or_else(|_error| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}
