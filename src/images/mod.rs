//! Image URL generation
//!
//! Pure string building: no request is ever made. Uploaded images are
//! addressed by their public id and rendered through CDN transformation
//! parameters encoded in the URL path.

pub mod url;

pub use url::{
    ResponsiveImage, ResponsiveImageGenerator, ResponsiveOptions, ResponsiveSize,
    ThumbnailOptions, Transformation, DEFAULT_RESPONSIVE_SIZES, DEFAULT_SIZES_ATTRIBUTE,
};
