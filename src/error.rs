/// Segment-overlay error enum.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Dimension Mismatch: expected {expected} entries, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Score Count Mismatch: {masks} masks but {scores} scores")]
    ScoreCountMismatch { masks: usize, scores: usize },

    #[error("A segmentation request is already in flight")]
    Busy,

    #[error("Segmentation Service Error: {0}")]
    Service(String),

    #[error("HTTP Error: status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request Error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("PNG Decoding Error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("PNG Encoding Error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("Unsupported PNG Format: {0}")]
    UnsupportedPng(String),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
