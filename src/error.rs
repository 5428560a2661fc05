use std::fmt::{self, Debug, Display};
use std::io;
use std::path::PathBuf;

/// Provides `BreakthroughError` and maps other errors to
/// convert to a `BreakthroughError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum BreakthroughError {
    /// A formula denominator vanished at the given coverage/effectiveness pair.
    Singularity { coverage: f64, effectiveness: f64 },
    /// The implied effectiveness is undefined at the given coverage/breakthrough pair.
    ImpliedSingularity { coverage: f64, breakthrough: f64 },
    InvalidParameter(String),
    IoError(io::Error),
    /// An I/O failure while touching a known path.
    PathIoError { path: PathBuf, source: io::Error },
    ImageError(image::ImageError),
    DrawingError(String),
    OutputPathError(String),
}

impl BreakthroughError {
    /// Attaches the attempted path to an I/O error.
    pub fn with_path(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BreakthroughError::PathIoError {
            path: path.into(),
            source,
        }
    }
}

impl From<io::Error> for BreakthroughError {
    fn from(error: io::Error) -> Self {
        BreakthroughError::IoError(error)
    }
}

impl From<image::ImageError> for BreakthroughError {
    fn from(error: image::ImageError) -> Self {
        BreakthroughError::ImageError(error)
    }
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for BreakthroughError
{
    fn from(error: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        BreakthroughError::DrawingError(error.to_string())
    }
}

impl From<String> for BreakthroughError {
    fn from(error: String) -> Self {
        BreakthroughError::InvalidParameter(error)
    }
}

impl From<&str> for BreakthroughError {
    fn from(error: &str) -> Self {
        BreakthroughError::InvalidParameter(error.to_string())
    }
}

impl std::error::Error for BreakthroughError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BreakthroughError::IoError(error) => Some(error),
            BreakthroughError::PathIoError { source, .. } => Some(source),
            BreakthroughError::ImageError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for BreakthroughError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BreakthroughError::Singularity {
                coverage,
                effectiveness,
            } => write!(
                f,
                "singular configuration at coverage {coverage} and effectiveness {effectiveness}"
            ),
            BreakthroughError::ImpliedSingularity {
                coverage,
                breakthrough,
            } => write!(
                f,
                "implied effectiveness undefined at coverage {coverage} and breakthrough fraction {breakthrough}"
            ),
            BreakthroughError::InvalidParameter(message) => {
                write!(f, "invalid parameter: {message}")
            }
            BreakthroughError::IoError(error) => write!(f, "I/O error: {error}"),
            BreakthroughError::PathIoError { path, source } => {
                write!(f, "I/O error at {}: {source}", path.display())
            }
            BreakthroughError::ImageError(error) => write!(f, "image error: {error}"),
            BreakthroughError::DrawingError(message) => write!(f, "drawing error: {message}"),
            BreakthroughError::OutputPathError(message) => {
                write!(f, "output path error: {message}")
            }
        }
    }
}
