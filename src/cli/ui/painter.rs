use owo_colors::{OwoColorize, Style};
use strum_macros::EnumIter;

/// Role a piece of terminal text plays in the output.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter)]
pub(crate) enum Tone {
    Heading,
    Success,
    Warning,
    Muted,
    Value,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Heading => Style::new().bold().cyan(),
            Self::Success => Style::new().bold().green(),
            Self::Warning => Style::new().bold().yellow(),
            Self::Muted => Style::new().dimmed(),
            Self::Value => Style::new().bold(),
        }
    }
}

/// Colours device and profile output when stdout is a terminal.
#[derive(Debug)]
pub(crate) struct Painter {
    use_colour: bool,
}

impl Painter {
    pub(crate) fn new(use_colour: bool) -> Self {
        Self { use_colour }
    }

    pub(crate) fn paint(&self, tone: Tone, text: impl AsRef<str>) -> String {
        let text = text.as_ref();
        if self.use_colour {
            text.style(tone.style()).to_string()
        } else {
            text.to_owned()
        }
    }

    pub(crate) fn heading(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Heading, text)
    }

    /// Marks an interface that matches the active profile.
    pub(crate) fn success(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Success, text)
    }

    pub(crate) fn warning(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Warning, text)
    }

    pub(crate) fn muted(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Muted, text)
    }

    pub(crate) fn value(&self, text: impl AsRef<str>) -> String {
        self.paint(Tone::Value, text)
    }
}
