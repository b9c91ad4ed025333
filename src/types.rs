//! Type-safe wrappers for common API values

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Public identifier of an image on the CDN
///
/// The server assigns this on upload; it is the path component used for
/// metadata lookups, deletion and URL generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Creates a new image id from a string without validation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for ImageId {
    type Err = ImageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ImageIdError::Empty);
        }
        if trimmed.contains(char::is_whitespace) {
            return Err(ImageIdError::InvalidCharacter(
                "Image id must not contain whitespace".into(),
            ));
        }
        Ok(ImageId(trimmed.to_string()))
    }
}

impl Display for ImageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<ImageId> for String {
    fn from(id: ImageId) -> Self {
        id.0
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageIdError {
    #[error("Image id cannot be empty")]
    Empty,
    #[error("Invalid image id: {0}")]
    InvalidCharacter(String),
}

/// How a batch of images is sent to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Every item in one combined request
    Parallel,
    /// One request per item, strictly in input order
    Sequential,
}

impl Default for UploadMode {
    fn default() -> Self {
        UploadMode::Parallel
    }
}

impl UploadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMode::Parallel => "parallel",
            UploadMode::Sequential => "sequential",
        }
    }
}

impl Display for UploadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(UploadMode::Parallel),
            "sequential" => Ok(UploadMode::Sequential),
            other => Err(format!(
                "Unknown upload mode '{}', expected 'parallel' or 'sequential'",
                other
            )),
        }
    }
}
