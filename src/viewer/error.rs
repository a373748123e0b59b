use std::error::Error;
use std::fmt;

/// Failure kinds surfaced to the host. Each one is terminal for the
/// operation that produced it; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// The strict parser rejected the cleaned PGN. No session state changes.
    MalformedPgn(String),
    /// Conversion was requested without a stored API key.
    MissingCredential,
    /// The remote conversion service failed or returned nothing usable.
    RemoteFailure(String),
    /// A navigation target outside `[-1, len - 1]`.
    OutOfRange { requested: usize, len: usize },
    /// The settings store could not be read or written.
    Settings(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPgn(msg) => write!(f, "Invalid PGN format: {msg}"),
            Self::MissingCredential => {
                write!(f, "An API key is required to convert book notation")
            }
            Self::RemoteFailure(msg) => write!(f, "Conversion failed: {msg}"),
            Self::OutOfRange { requested, len } => {
                write!(f, "Ply {requested} is out of range for a game of {len} plies")
            }
            Self::Settings(msg) => write!(f, "Settings error: {msg}"),
        }
    }
}

impl Error for ViewerError {}

#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorAccumulator, ViewerError};

    #[test]
    fn test_push_multiple_messages_uses_separator() {
        let mut accumulator = ErrorAccumulator::default();
        accumulator.push("first");
        accumulator.push("second");

        assert_eq!(accumulator.take().as_deref(), Some("first; second"));
    }

    #[test]
    fn test_take_consumes_accumulator() {
        let mut accumulator = ErrorAccumulator::default();
        accumulator.push("error");

        assert_eq!(accumulator.take().as_deref(), Some("error"));
        assert!(accumulator.is_empty());
        assert!(accumulator.take().is_none());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(ErrorAccumulator::default().is_empty());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ViewerError::MalformedPgn("illegal san Nf6".to_string()).to_string(),
            "Invalid PGN format: illegal san Nf6"
        );
        assert_eq!(
            ViewerError::OutOfRange {
                requested: 7,
                len: 4
            }
            .to_string(),
            "Ply 7 is out of range for a game of 4 plies"
        );
        assert_eq!(
            ViewerError::RemoteFailure("overloaded".to_string()).to_string(),
            "Conversion failed: overloaded"
        );
    }
}
