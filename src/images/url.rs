//! CDN URL generation

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};

/// Rendering parameters encoded into a CDN URL
///
/// Parameters are emitted in a fixed order (`w, h, c, g, q, f, dpr`).
/// Empty strings and zero values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpr: Option<f64>,
}

impl Transformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = Some(crop.into());
        self
    }

    pub fn gravity(mut self, gravity: impl Into<String>) -> Self {
        self.gravity = Some(gravity.into());
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn dpr(mut self, dpr: f64) -> Self {
        self.dpr = Some(dpr);
        self
    }

    /// Build from loosely typed `(key, value)` pairs
    ///
    /// Accepts long and short keys (`width` or `w`, ...). Unknown keys and
    /// numbers that do not parse are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut transformation = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "width" | "w" => transformation.width = value.parse().ok(),
                "height" | "h" => transformation.height = value.parse().ok(),
                "crop" | "c" => transformation.crop = Some(value.to_string()),
                "gravity" | "g" => transformation.gravity = Some(value.to_string()),
                "quality" | "q" => transformation.quality = Some(value.to_string()),
                "format" | "f" => transformation.format = Some(value.to_string()),
                "dpr" => transformation.dpr = value.parse().ok(),
                other => log::debug!("Ignoring unknown transformation key '{}'", other),
            }
        }
        transformation
    }

    /// Comma-joined parameters followed by `/`, or empty when nothing is set
    pub fn to_segment(&self) -> String {
        let mut params: Vec<String> = Vec::new();

        if let Some(width) = self.width.filter(|w| *w > 0) {
            params.push(format!("w_{}", width));
        }
        if let Some(height) = self.height.filter(|h| *h > 0) {
            params.push(format!("h_{}", height));
        }
        for (prefix, value) in [
            ("c", &self.crop),
            ("g", &self.gravity),
            ("q", &self.quality),
            ("f", &self.format),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push(format!("{}_{}", prefix, value));
            }
        }
        if let Some(dpr) = self.dpr.filter(|d| *d > 0.0 && d.is_finite()) {
            params.push(format!("dpr_{}", format_dpr(dpr)));
        }

        if params.is_empty() {
            String::new()
        } else {
            let mut segment = params.join(",");
            segment.push('/');
            segment
        }
    }
}

/// `2.0` prints as `2`, `1.5` as `1.5`
fn format_dpr(dpr: f64) -> String {
    if dpr.fract() == 0.0 {
        format!("{}", dpr as u64)
    } else {
        format!("{}", dpr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailOptions {
    pub width: u32,
    pub height: u32,
    pub crop: String,
    pub gravity: String,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            crop: "thumb".to_string(),
            gravity: "face".to_string(),
        }
    }
}

/// One entry of a `srcset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveSize {
    pub width: u32,
    pub dpr: f64,
}

impl ResponsiveSize {
    pub fn new(width: u32, dpr: f64) -> Self {
        Self { width, dpr }
    }
}

/// Width and pixel-ratio combinations used when none are given
pub const DEFAULT_RESPONSIVE_SIZES: [ResponsiveSize; 5] = [
    ResponsiveSize { width: 480, dpr: 1.0 },
    ResponsiveSize { width: 768, dpr: 1.0 },
    ResponsiveSize { width: 1024, dpr: 1.0 },
    ResponsiveSize { width: 480, dpr: 2.0 },
    ResponsiveSize { width: 768, dpr: 2.0 },
];

/// `sizes` attribute returned with every responsive set
pub const DEFAULT_SIZES_ATTRIBUTE: &str = "(max-width: 768px) 100vw, 50vw";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveOptions {
    pub sizes: Vec<ResponsiveSize>,
    pub quality: String,
    pub format: String,
}

impl Default for ResponsiveOptions {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_RESPONSIVE_SIZES.to_vec(),
            quality: "auto".to_string(),
            format: "auto".to_string(),
        }
    }
}

/// Attributes for a responsive `<img>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiveImage {
    pub src: String,
    #[serde(rename = "srcSet")]
    pub src_set: String,
    pub sizes: String,
}

/// Builds transformation URLs for one CDN account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveImageGenerator {
    base_url: String,
}

impl ResponsiveImageGenerator {
    pub fn new(cloud_name: &str) -> Self {
        Self {
            base_url: format!("https://res.cloudinary.com/{}/image/upload/", cloud_name),
        }
    }

    /// Generator for the account named in the configuration
    pub fn from_config(config: &crate::config::ClientConfig) -> Result<Self> {
        match config.cloud_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(Self::new(name)),
            _ => Err(ApiError::config_error("No CDN cloud name configured")),
        }
    }

    /// Use a different base; a trailing `/` is added when missing
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn custom_url(&self, public_id: &str, transformation: &Transformation) -> String {
        let mut url = String::with_capacity(self.base_url.len() + public_id.len() + 32);
        url.push_str(&self.base_url);
        url.push_str(&transformation.to_segment());
        url.push_str(public_id);
        url
    }

    pub fn thumbnail_url(&self, public_id: &str, options: &ThumbnailOptions) -> String {
        let transformation = Transformation::new()
            .width(options.width)
            .height(options.height)
            .crop(&options.crop)
            .gravity(&options.gravity)
            .quality("auto")
            .format("auto");
        self.custom_url(public_id, &transformation)
    }

    pub fn responsive_urls(&self, public_id: &str, options: &ResponsiveOptions) -> ResponsiveImage {
        let base = Transformation::new()
            .quality(&options.quality)
            .format(&options.format);
        let src = self.custom_url(public_id, &base);

        let src_set = options
            .sizes
            .iter()
            .map(|size| {
                let transformation = base.clone().width(size.width).dpr(size.dpr);
                format!("{} {}w", self.custom_url(public_id, &transformation), size.width)
            })
            .collect::<Vec<_>>()
            .join(", ");

        ResponsiveImage {
            src,
            src_set,
            sizes: DEFAULT_SIZES_ATTRIBUTE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://res.cloudinary.com/demo/image/upload/";

    #[test]
    fn test_thumbnail_segment() {
        let transformation = Transformation::new()
            .width(200)
            .height(200)
            .crop("thumb")
            .gravity("face")
            .quality("auto")
            .format("auto");
        assert_eq!(
            transformation.to_segment(),
            "w_200,h_200,c_thumb,g_face,q_auto,f_auto/"
        );

        let generator = ResponsiveImageGenerator::new("demo");
        assert_eq!(
            generator.custom_url("team/photo", &transformation),
            format!("{}w_200,h_200,c_thumb,g_face,q_auto,f_auto/team/photo", BASE)
        );
        assert_eq!(
            generator.thumbnail_url("team/photo", &ThumbnailOptions::default()),
            generator.custom_url("team/photo", &transformation)
        );
    }

    #[test]
    fn test_empty_transformation() {
        let generator = ResponsiveImageGenerator::new("demo");
        assert_eq!(
            generator.custom_url("abc", &Transformation::default()),
            format!("{}abc", BASE)
        );
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let transformation = Transformation::new()
            .width(0)
            .crop("")
            .format("webp")
            .dpr(0.0);
        assert_eq!(transformation.to_segment(), "f_webp/");
    }

    #[test]
    fn test_order_is_fixed() {
        let transformation = Transformation::new().dpr(2.0).format("png").width(10);
        assert_eq!(transformation.to_segment(), "w_10,f_png,dpr_2/");

        let transformation = Transformation::new().dpr(1.5);
        assert_eq!(transformation.to_segment(), "dpr_1.5/");
    }

    #[test]
    fn test_from_pairs() {
        let transformation = Transformation::from_pairs([
            ("width", "200"),
            ("h", "100"),
            ("crop", "fill"),
            ("q", "80"),
            ("colour", "red"),
            ("dpr", "abc"),
        ]);
        assert_eq!(transformation.width, Some(200));
        assert_eq!(transformation.height, Some(100));
        assert_eq!(transformation.crop.as_deref(), Some("fill"));
        assert_eq!(transformation.quality.as_deref(), Some("80"));
        assert_eq!(transformation.dpr, None);
        assert_eq!(transformation.to_segment(), "w_200,h_100,c_fill,q_80/");
    }

    #[test]
    fn test_responsive_defaults() {
        let generator = ResponsiveImageGenerator::new("demo");
        let image = generator.responsive_urls("abc", &ResponsiveOptions::default());

        assert_eq!(image.src, format!("{}q_auto,f_auto/abc", BASE));
        assert_eq!(image.sizes, "(max-width: 768px) 100vw, 50vw");

        let entries: Vec<&str> = image.src_set.split(", ").collect();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], format!("{}w_480,q_auto,f_auto,dpr_1/abc 480w", BASE));
        assert_eq!(entries[4], format!("{}w_768,q_auto,f_auto,dpr_2/abc 768w", BASE));
    }

    #[test]
    fn test_responsive_custom_sizes() {
        let generator = ResponsiveImageGenerator::with_base_url("https://cdn.example.com/img");
        let options = ResponsiveOptions {
            sizes: vec![ResponsiveSize::new(320, 1.0)],
            quality: "80".to_string(),
            format: "webp".to_string(),
        };
        let image = generator.responsive_urls("x", &options);
        assert_eq!(image.src, "https://cdn.example.com/img/q_80,f_webp/x");
        assert_eq!(
            image.src_set,
            "https://cdn.example.com/img/w_320,q_80,f_webp,dpr_1/x 320w"
        );
    }

    #[test]
    fn test_from_config() {
        let config = crate::config::ClientConfig::default();
        assert!(ResponsiveImageGenerator::from_config(&config).is_err());

        let config = config.cloud_name("demo");
        let generator = ResponsiveImageGenerator::from_config(&config).unwrap();
        assert_eq!(generator.base_url(), BASE);
    }
}
