use thiserror::Error;

use crate::fields::FieldKind;

#[derive(Debug, Error)]
pub enum MaskPackerError {
    /// Malformed atlas line or a field value that fails its typed parse.
    #[error("Format error on line {line}: {message}")]
    Format { line: usize, message: String },
    /// A recognized field whose declared kind has no matching setter. Decoder bug, not bad input.
    #[error("Unsupported field type for `{key}`: {kind:?}")]
    UnsupportedType { key: &'static str, kind: FieldKind },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Mask directory error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid file format, got: {0:?} expected: png or jpg")]
    InvalidFormat(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Sprite placement values that cannot be turned into a crop.
    #[error("Sprite `{sprite}`: {message}")]
    Geometry { sprite: String, message: String },
    /// A page canvas or sprite image above the allocation limit.
    #[error("Image of {width}x{height} pixels is too large")]
    TooLarge { width: u64, height: u64 },
    #[error("Page `{page}` failed: {source}")]
    Job {
        page: String,
        #[source]
        source: Box<MaskPackerError>,
    },
}

impl MaskPackerError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MaskPackerError>;
