//! Helper module with this crate's error type.
//!
//! Prompt errors complement I/O errors by naming the conditions a caller of
//! a timed read needs to tell apart, most importantly a [`ErrorKind::Timeout`]
//! without any default to fall back on. They seamlessly convert to and from
//! I/O errors.

use super::cmd::{Format, ResetStyle, SetForeground8};

/// The enumeration of error kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The deadline elapsed without input and without a default value.
    Timeout,
    /// A formatting or positioning argument is malformed or out of range.
    InvalidArgument,
    /// The waiting strategy's facility does not exist on this platform.
    PlatformUnavailable,
    /// Another timed read or interrupt policy is already active.
    InFlight,
    /// The input is not well-formed UTF-8.
    MalformedUtf8,
    /// The input was closed before anything was read.
    EndOfInput,
    /// An error reading from or writing to the console.
    Unreadable,
}

impl ErrorKind {
    /// Turn the error kind to an error message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "console input timed out without data or default",
            Self::InvalidArgument => "invalid argument",
            Self::PlatformUnavailable => "waiting strategy is not available on this platform",
            Self::InFlight => "another timed read or interrupt policy is already active",
            Self::MalformedUtf8 => "malformed UTF-8",
            Self::EndOfInput => "console input closed",
            Self::Unreadable => "error accessing console",
        }
    }
}

impl From<ErrorKind> for std::io::Error {
    fn from(value: ErrorKind) -> Self {
        Error::from(value).into()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind, source: None }
    }
}

/// A prompt error.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<std::io::Error>,
}

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new unreadable error.
    pub fn unreadable(source: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Unreadable,
            source: Some(source),
        }
    }

    /// Create a new platform unavailable error with the underlying cause.
    pub fn unavailable(source: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::PlatformUnavailable,
            source: Some(source),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Determine whether this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.as_str())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|error| error as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        // Unwrap our own errors that took a round trip through I/O.
        if value.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            if let Some(inner) = value.into_inner() {
                if let Ok(error) = inner.downcast::<Error>() {
                    return *error;
                }
            }
            return ErrorKind::Unreadable.into();
        }

        Error::unreadable(value)
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        use self::ErrorKind::*;

        let kind = match value.kind {
            Timeout => std::io::ErrorKind::TimedOut,
            InvalidArgument => std::io::ErrorKind::InvalidInput,
            PlatformUnavailable => std::io::ErrorKind::Unsupported,
            InFlight => std::io::ErrorKind::ResourceBusy,
            MalformedUtf8 => std::io::ErrorKind::InvalidData,
            EndOfInput => std::io::ErrorKind::UnexpectedEof,
            Unreadable => {
                if let Some(error) = value.source {
                    return error;
                }
                std::io::ErrorKind::Other
            }
        };

        Self::new(kind, value)
    }
}

/// Determine whether an operation should be retried.
///
/// This function treats both interrupted and timed out operations as retryable.
pub fn should_retry<T, E>(result: std::result::Result<T, E>) -> bool
where
    E: Into<std::io::Error>,
{
    if let Err(err) = result {
        let kind = err.into().kind();
        kind == std::io::ErrorKind::Interrupted || kind == std::io::ErrorKind::TimedOut
    } else {
        false
    }
}

/// Report the error, including any sources.
#[allow(clippy::print_stdout)]
pub fn report<E: std::error::Error>(error: &E) {
    println!(
        "{}{}ERROR: {}{}",
        Format::Bold,
        SetForeground8::<1>,
        error,
        ResetStyle
    );

    let mut error: &dyn std::error::Error = error;
    while let Some(inner) = error.source() {
        println!("    {}", inner);
        error = inner;
    }
}

// =====================================================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_io_round_trip() {
        let error: std::io::Error = ErrorKind::Timeout.into();
        assert_eq!(error.kind(), std::io::ErrorKind::TimedOut);

        let error = Error::from(error);
        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert!(error.is_timeout());
    }

    #[test]
    fn test_io_mapping() {
        for (kind, expected) in [
            (ErrorKind::InvalidArgument, std::io::ErrorKind::InvalidInput),
            (ErrorKind::PlatformUnavailable, std::io::ErrorKind::Unsupported),
            (ErrorKind::InFlight, std::io::ErrorKind::ResourceBusy),
            (ErrorKind::MalformedUtf8, std::io::ErrorKind::InvalidData),
            (ErrorKind::EndOfInput, std::io::ErrorKind::UnexpectedEof),
        ] {
            let error: std::io::Error = kind.into();
            assert_eq!(error.kind(), expected, "mapping {:?}", kind);
        }
    }

    #[test]
    fn test_unreadable_keeps_source() {
        let error = Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(error.kind(), ErrorKind::Unreadable);
        assert!(std::error::Error::source(&error).is_some());

        let error: std::io::Error = error.into();
        assert_eq!(error.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_should_retry() {
        assert!(should_retry::<(), _>(Err(ErrorKind::Timeout)));
        assert!(should_retry::<(), _>(Err(std::io::Error::from(
            std::io::ErrorKind::Interrupted
        ))));
        assert!(!should_retry::<(), _>(Err(ErrorKind::InvalidArgument)));
        assert!(!should_retry::<(), ErrorKind>(Ok(())));
    }
}
