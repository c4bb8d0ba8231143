use thiserror::Error;

#[derive(Debug, Error)]
pub enum LongPageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Cannot decode '{name}': {reason}")]
    Decode { name: String, reason: String },
    #[error("Working set is full ({limit} images max)")]
    CapacityExceeded { limit: usize },
    #[error("No images to build")]
    Empty,
    #[error(
        "{count} images need more than {max_groups} groups of {max_per_group}; raise max_groups or max_per_group"
    )]
    GroupLimitExceeded {
        count: usize,
        max_per_group: usize,
        max_groups: usize,
    },
    #[error("Layout of {count} images is taller than 4294967295 px")]
    LayoutOverflow { count: usize },
    #[error("Composite is {height} px tall; JPEG allows at most {max} px")]
    CanvasTooTall { height: u32, max: u32 },
    #[error("Invalid canvas width: {width}")]
    InvalidDimensions { width: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Archive error: {0}")]
    Archive(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

impl From<zip::result::ZipError> for LongPageError {
    fn from(e: zip::result::ZipError) -> Self {
        LongPageError::Archive(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LongPageError>;
