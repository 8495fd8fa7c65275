/// Result alias that carries the custom [`PlayerError`] type.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Common error type for the core crate.
///
/// Variants fall into two groups: user guidance (nothing to play, exit
/// cleanly) and fatal conditions (the graphics context cannot be trusted any
/// more). See [`PlayerError::is_user_guidance`].
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Every selection field was empty.
    #[error("no beatmap specified")]
    NoCriteria,
    /// The catalog holds no record matching the criteria.
    #[error("beatmap not found ({criteria})")]
    NotFound { criteria: String },
    /// Window, context or resource creation failed before the first frame.
    #[error("bootstrap failed: {0}")]
    Bootstrap(String),
    /// A submitted frame failed mid-flight.
    #[error("frame failed: {0}")]
    Frame(String),
    /// The dispatch thread stopped accepting or answering work.
    #[error("dispatch queue closed")]
    DispatchClosed,
    /// Work was submitted before the context was installed.
    #[error("no context installed on the dispatch thread")]
    NoContext,
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl PlayerError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn bootstrap<T: Into<String>>(msg: T) -> Self {
        Self::Bootstrap(msg.into())
    }

    pub fn frame<T: Into<String>>(msg: T) -> Self {
        Self::Frame(msg.into())
    }

    /// True for conditions that end the process with status 0: there is
    /// simply nothing to play.
    pub fn is_user_guidance(&self) -> bool {
        matches!(self, Self::NoCriteria | Self::NotFound { .. })
    }
}

impl From<&str> for PlayerError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PlayerError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
