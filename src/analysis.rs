//! Image upload validation and the analysis collaborator seam.
//!
//! Uploads are validated (format by magic bytes, 10 MB cap) before they can
//! reach the analysis trigger. The [`Analyzer`] trait is the seam to the
//! actual analysis work: the mock fabricates a plausible outcome offline,
//! the HTTP analyzer posts the image to the configured backend with the
//! session's bearer token attached.

use crate::errors::UploadError;
use crate::subscription::PlanTier;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Maximum accepted upload size: 10 MB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Detects the format from leading magic bytes. A CLI has no
    /// browser-supplied MIME type, so the bytes are the contract.
    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP") {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

/// A validated image, guaranteed to be an accepted format within size limits.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl UploadedImage {
    /// Validates raw bytes into an accepted upload.
    ///
    /// # Errors
    ///
    /// Fails with [`UploadError::TooLarge`] over 10 MB and
    /// [`UploadError::UnsupportedFormat`] for anything that is not JPEG,
    /// PNG, GIF, or WEBP.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, UploadError> {
        let size = bytes.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size,
                max: MAX_UPLOAD_BYTES,
            });
        }
        let format = ImageFormat::sniff(&bytes).ok_or(UploadError::UnsupportedFormat)?;
        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// Everything the analyzer needs beyond the image itself.
pub struct AnalysisContext {
    pub tier: PlanTier,
    /// Session bearer token, attached to authenticated backend calls.
    pub token: String,
}

/// Detected facial features plus personalized recommendations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub face_shape: String,
    pub eye_type: String,
    pub lip_shape: String,
    pub skin_tone: String,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub lipstick: String,
    pub eyeshadow: String,
    pub blush: String,
    pub accessories: String,
}

/// The analysis collaborator. The real pipeline is out of scope; anything
/// implementing this can stand behind the analysis trigger.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        image: &UploadedImage,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisOutcome>;
}

/// Offline stand-in that fabricates a stable outcome from the image bytes.
pub struct MockAnalyzer;

const FACE_SHAPES: &[&str] = &["Oval", "Round", "Heart", "Square", "Diamond"];
const EYE_TYPES: &[&str] = &["Almond", "Round", "Monolid", "Hooded"];
const LIP_SHAPES: &[&str] = &["Full", "Thin", "Bow-shaped", "Wide"];
const SKIN_TONES: &[&str] = &["Warm", "Cool", "Neutral", "Olive"];

impl MockAnalyzer {
    /// Cheap content fingerprint so the same image always analyzes the same
    /// way while different images usually differ.
    fn fingerprint(bytes: &[u8]) -> usize {
        let head: usize = bytes.iter().take(64).map(|b| *b as usize).sum();
        bytes.len().wrapping_mul(31).wrapping_add(head)
    }

    fn pick(options: &'static [&'static str], seed: usize) -> String {
        options[seed % options.len()].to_string()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(
        &self,
        image: &UploadedImage,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisOutcome> {
        let seed = Self::fingerprint(&image.bytes);
        let face_shape = Self::pick(FACE_SHAPES, seed);
        let eye_type = Self::pick(EYE_TYPES, seed >> 3);
        let lip_shape = Self::pick(LIP_SHAPES, seed >> 5);
        let skin_tone = Self::pick(SKIN_TONES, seed >> 7);

        let mut accessories = format!(
            "Frames and earrings that complement a {} face shape",
            face_shape.to_lowercase()
        );
        // Paid tiers get the advanced-insights depth from the plan table.
        if ctx.tier != PlanTier::Free {
            accessories.push_str("; layered pieces tuned to your undertone for evening looks");
        }

        Ok(AnalysisOutcome {
            recommendations: Recommendations {
                lipstick: format!("Shades in a {} undertone family", skin_tone.to_lowercase()),
                eyeshadow: format!("Contouring palettes for {} eyes", eye_type.to_lowercase()),
                blush: format!(
                    "Placement that softens a {} jawline",
                    face_shape.to_lowercase()
                ),
                accessories,
            },
            face_shape,
            eye_type,
            lip_shape,
            skin_tone,
        })
    }
}

/// Remote analyzer: posts the image to `{base}/analyze` as multipart form
/// data with the session's bearer token.
pub struct HttpAnalyzer {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAnalyzer {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(
        &self,
        image: &UploadedImage,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisOutcome> {
        let url = format!("{}/analyze", self.base_url);
        debug!(%url, "posting analysis request");

        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name("upload")
            .mime_str(image.format.mime())
            .context("Failed to build multipart image part")?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&ctx.token)
            .multipart(form)
            .send()
            .await
            .context("Analysis request failed")?
            .error_for_status()
            .context("Analysis backend rejected the request")?;

        response
            .json()
            .await
            .context("Failed to parse analysis response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_bytes(len: usize) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(len, 0x42);
        bytes
    }

    #[test]
    fn accepted_formats_are_sniffed_from_magic_bytes() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(ImageFormat::sniff(&png), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(&jpeg_bytes(16)), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"plain text"), None);
    }

    #[test]
    fn unsupported_bytes_are_rejected() {
        let err = UploadedImage::from_bytes(b"%PDF-1.4".to_vec()).unwrap_err();
        assert_eq!(err, UploadError::UnsupportedFormat);
    }

    #[test]
    fn oversized_uploads_are_rejected() {
        let bytes = jpeg_bytes(MAX_UPLOAD_BYTES as usize + 1);
        let err = UploadedImage::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
    }

    #[test]
    fn boundary_sized_upload_is_accepted() {
        let image = UploadedImage::from_bytes(jpeg_bytes(MAX_UPLOAD_BYTES as usize)).unwrap();
        assert_eq!(image.format(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn mock_analysis_is_deterministic_per_image() {
        let image = UploadedImage::from_bytes(jpeg_bytes(128)).unwrap();
        let ctx = AnalysisContext {
            tier: PlanTier::Free,
            token: "tok-1".to_string(),
        };

        let first = MockAnalyzer.analyze(&image, &ctx).await.unwrap();
        let second = MockAnalyzer.analyze(&image, &ctx).await.unwrap();
        assert_eq!(first, second);
        assert!(FACE_SHAPES.contains(&first.face_shape.as_str()));
    }

    #[tokio::test]
    async fn paid_tiers_get_extended_recommendations() {
        let image = UploadedImage::from_bytes(jpeg_bytes(128)).unwrap();
        let free = AnalysisContext {
            tier: PlanTier::Free,
            token: "tok-1".to_string(),
        };
        let pro = AnalysisContext {
            tier: PlanTier::Pro,
            token: "tok-1".to_string(),
        };

        let basic = MockAnalyzer.analyze(&image, &free).await.unwrap();
        let extended = MockAnalyzer.analyze(&image, &pro).await.unwrap();
        assert!(extended.recommendations.accessories.len() > basic.recommendations.accessories.len());
    }
}
