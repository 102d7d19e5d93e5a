use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("Deck description error: {0}")]
    Parse(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid slide dimensions: {width}x{height} EMU")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("Package part missing: {0}")]
    MissingPart(String),
    #[error("Deck has no slides")]
    Empty,
}

impl From<quick_xml::Error> for DeckError {
    fn from(e: quick_xml::Error) -> Self {
        DeckError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DeckError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        DeckError::Xml(e.to_string())
    }
}

impl From<std::fmt::Error> for DeckError {
    fn from(e: std::fmt::Error) -> Self {
        DeckError::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
