//! Error types for document conversion

use std::fmt;

/// Errors that abort a conversion.
///
/// Everything the transform can recover from (dangling references, images it
/// cannot decode, fonts it cannot measure) is logged and degraded locally;
/// only package-level problems and explicit restriction violations surface
/// here.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The package archive could not be opened or read
    Package(String),
    /// A required part is absent from the package
    MissingPart(String),
    /// A part is not well-formed XML
    Xml { part: String, message: String },
    /// A run language has no list-item implementation and languages are restricted
    UnsupportedLanguage(String),
    /// A numbering format has no list-item implementation and formats are restricted
    UnsupportedNumberingFormat(String),
    /// Error while writing the HTML output
    Serialization(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Package(msg) => write!(f, "Package error: {msg}"),
            ConvertError::MissingPart(part) => write!(f, "Missing part: {part}"),
            ConvertError::Xml { part, message } => write!(f, "Malformed XML in {part}: {message}"),
            ConvertError::UnsupportedLanguage(lang) => {
                write!(f, "Unsupported language: {lang}")
            }
            ConvertError::UnsupportedNumberingFormat(fmt_name) => {
                write!(f, "Unsupported numbering format: {fmt_name}")
            }
            ConvertError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<zip::result::ZipError> for ConvertError {
    fn from(err: zip::result::ZipError) -> Self {
        ConvertError::Package(err.to_string())
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Package(err.to_string())
    }
}
