//! Human-readable progress messages.
//!
//! Each step of an operation is announced with a coloured tag. Messages go
//! through `tracing`, so the subscriber installed by the binary decides where
//! they end up.

use colored::{ColoredString, Colorize};
use std::fmt;
use tracing::{error, info};

/// Kind of progress message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// General information.
    Info,
    /// A step is starting.
    Initiate,
    /// An operation finished successfully.
    Success,
    /// Something failed.
    Error,
    /// A sub-step finished.
    Complete,
}

impl Tag {
    /// Returns the coloured label for this tag.
    #[must_use]
    pub fn label(self) -> ColoredString {
        match self {
            Self::Info => "[INFO]".blue(),
            Self::Initiate => "[INITIATE]".cyan(),
            Self::Success => "[SUCCESS]".green().bold(),
            Self::Error => "[ERROR]".red().bold(),
            Self::Complete => "[COMPLETE]".green(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Emits a tagged progress message at the level matching the tag.
pub fn report(tag: Tag, message: impl fmt::Display) {
    match tag {
        Tag::Error => error!("{tag} {message}"),
        _ => info!("{tag} {message}"),
    }
}
