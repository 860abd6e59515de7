/// Convenience result type used across the crate.
pub type RaffleResult<T> = Result<T, RaffleError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum RaffleError {
    /// Invalid caller-provided configuration (participants, winner, playback, style).
    #[error("configuration error: {0}")]
    Config(String),

    /// A drawing surface or asset could not be acquired.
    #[error("resource error: {0}")]
    Resource(String),

    /// Failure raised while rendering a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Lifecycle method called in a state that does not allow it.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RaffleError {
    /// Build a [`RaffleError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`RaffleError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`RaffleError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RaffleError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`RaffleError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Resource(_) => ErrorKind::Resource,
            Self::Render(_) => ErrorKind::Render,
            Self::Lifecycle(_) => ErrorKind::Lifecycle,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

/// Error classification carried in [`EngineError`] payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// See [`RaffleError::Config`].
    Config,
    /// See [`RaffleError::Resource`].
    Resource,
    /// See [`RaffleError::Render`].
    Render,
    /// See [`RaffleError::Lifecycle`].
    Lifecycle,
    /// See [`RaffleError::Serde`].
    Serde,
    /// See [`RaffleError::Other`].
    Other,
}

/// Typed failure payload handed to `on_error` callbacks.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EngineError {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human readable message (the `Display` form of the source error).
    pub message: String,
}

impl From<&RaffleError> for EngineError {
    fn from(err: &RaffleError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<serde_json::Error> for RaffleError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
