//! Error types for WebView operations.

/// Errors that can occur during WebView operations.
#[derive(Debug)]
pub enum WebViewError {
    /// The current platform is not supported.
    PlatformNotSupported,
    /// WebView creation failed.
    CreationFailed(String),
    /// A WebView is already attached.
    AlreadyAttached,
    /// No WebView is currently attached.
    NotAttached,
    /// The embedded UI archive could not be read.
    InvalidArchive(String),
    /// The window system rejected a geometry change.
    Geometry(String),
}

impl WebViewError {
    /// Whether the surface is unusable after this error.
    ///
    /// A rejected geometry change leaves the surface in an unknown state; the
    /// session owning it must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }
}

impl std::fmt::Display for WebViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlatformNotSupported => write!(f, "platform not supported"),
            Self::CreationFailed(msg) => write!(f, "webview creation failed: {msg}"),
            Self::AlreadyAttached => write!(f, "webview already attached"),
            Self::NotAttached => write!(f, "no webview attached"),
            Self::InvalidArchive(msg) => write!(f, "invalid ui archive: {msg}"),
            Self::Geometry(msg) => write!(f, "window geometry change rejected: {msg}"),
        }
    }
}

impl std::error::Error for WebViewError {}

impl From<zip::result::ZipError> for WebViewError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::InvalidArchive(err.to_string())
    }
}

/// Result type for WebView operations.
pub type Result<T> = std::result::Result<T, WebViewError>;
