use std::path::PathBuf;

/// Result alias that carries the custom [`SbanMidiError`] type.
pub type Result<T> = std::result::Result<T, SbanMidiError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SbanMidiError {
    /// The delta-time message sequence cannot be interpreted.
    #[error("invalid event stream: {0}")]
    InvalidEventStream(String),
    /// Rendering needs at least one note to size the canvas.
    #[error("track contains no notes")]
    EmptyTrack,
    /// Export destination is missing or is not a directory.
    #[error("`{}` is not an existing directory", .0.display())]
    InvalidDestination(PathBuf),
    /// A caller supplied parameter is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("{0}")]
    Message(String),
    /// Failure reported by the SMF container parser or writer.
    #[error("midi container: {0}")]
    Midi(#[from] midly::Error),
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl SbanMidiError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn stream<T: Into<String>>(msg: T) -> Self {
        Self::InvalidEventStream(msg.into())
    }
}
