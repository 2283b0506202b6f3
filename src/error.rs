use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopupAuthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid render args: {0}")]
    RenderArgs(#[from] serde_json::Error),

    #[error("popup window could not be opened (blocked?)")]
    PopupBlocked,

    #[error("invalid popup size {width}x{height}")]
    InvalidPopupSize { width: u32, height: u32 },

    #[error("failed to read popup location: {message}")]
    LocationRead { message: String },

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("button has not been rendered with an authorization url")]
    NotConfigured,

    #[error("provider returned error: {error}")]
    Provider {
        error: String,
        description: Option<String>,
    },

    #[error("state mismatch (expected={expected}, received={received})")]
    StateMismatch { expected: String, received: String },

    #[error("unknown order (expected={expected}, received={received})")]
    OrderMismatch { expected: String, received: String },

    #[error("missing order token in callback")]
    MissingOrderToken,

    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}
