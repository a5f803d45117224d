//! Error types for the chat link, clock reads, textures, rendering and options.

/// Faults raised while talking to the generative-language service.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The request never produced an HTTP response.
    #[error("network failure: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The service answered without any text.
    #[error("response contained no text")]
    EmptyResponse,

    /// No API key was found in the configured environment variable.
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    /// The worker thread could not be started or died before replying.
    #[error("chat worker failed: {0}")]
    Worker(String),
}

/// The system clock could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("clock unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while locating, downloading or decoding a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read texture: {0}")]
    Io(#[source] std::io::Error),

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("texture not found at {0}")]
    NotFound(std::path::PathBuf),
}

/// Errors that can occur when loading, saving, or parsing the options file.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("failed to read options: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write options: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to parse options: {0}")]
    Parse(#[source] ron::error::SpannedError),

    #[error("failed to serialize options: {0}")]
    Serialize(#[source] ron::Error),
}

/// GL object creation or shader build failures.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("failed to create {what}: {reason}")]
    Create { what: &'static str, reason: String },

    #[error("failed to compile shader: {0}")]
    Compile(String),

    #[error("failed to link program: {0}")]
    Link(String),
}
