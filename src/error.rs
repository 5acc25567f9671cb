use super::*;

/// Raised by a [`Model`] when a `step()` leaves it in an inconsistent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelFault {
    /// Combinational logic did not settle within the given number of passes.
    Unsettled(usize),
    Other(String),
}

#[derive(Debug)]
pub enum TraceError {
    Io(Option<std::path::PathBuf>, std::io::Error),
    Model(u64, Phase, ModelFault),
    InvalidTimescale(String),
    TimeRewound(u64, u64),
    AlreadyStreaming,
    WidthMismatch(Path, Width, Width),
    TooManyCycles(u64),
}

impl std::fmt::Display for ModelFault {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ModelFault::Unsettled(passes) => write!(f, "Model did not settle after {passes} passes"),
            ModelFault::Other(message) => write!(f, "{message}"),
        }
    }
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TraceError::Io(Some(path), error) => write!(f, "I/O error on {}: {error}", path.display()),
            TraceError::Io(None, error) => write!(f, "I/O error: {error}"),
            TraceError::Model(cycle, phase, fault) => write!(f, "Model fault in cycle {cycle} ({phase:?}): {fault}"),
            TraceError::InvalidTimescale(timescale) => write!(f, "Invalid timescale: {timescale}"),
            TraceError::TimeRewound(last, time) => write!(f, "Sample time {time} is before the previous sample time {last}"),
            TraceError::AlreadyStreaming => write!(f, "Recorder cannot be configured after the first sample"),
            TraceError::WidthMismatch(path, expected, actual) => write!(f, "{path} is {actual} bits wide but shares storage that is {expected} bits wide"),
            TraceError::TooManyCycles(cycles) => write!(f, "Cannot timestamp {cycles} cycles"),
        }
    }
}

impl std::error::Error for ModelFault {}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(_path, error) => Some(error),
            TraceError::Model(_cycle, _phase, fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TraceError {
    fn from(error: std::io::Error) -> TraceError {
        TraceError::Io(None, error)
    }
}

impl From<std::fmt::Error> for TraceError {
    fn from(_error: std::fmt::Error) -> TraceError {
        TraceError::Io(None, std::io::Error::new(std::io::ErrorKind::Other, "formatting failed"))
    }
}
