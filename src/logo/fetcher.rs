use image::DynamicImage;
use std::time::Duration;
use tracing::debug;

use crate::errors::FetchError;

const USER_AGENT: &str = concat!("m3u-gen/", env!("CARGO_PKG_VERSION"));

/// Resolves channel logos by walking an ordered list of candidate sources.
///
/// The fetcher never touches the cache or the disk; it only performs network
/// I/O and hands back a normalized bitmap.
pub struct LogoFetcher {
    client: reqwest::Client,
}

impl LogoFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Candidate logo sources for an identifier, in the order they are tried:
    /// the structured logo repository first, then the favicon service.
    pub fn candidate_urls(identifier: &str) -> Vec<String> {
        let slug = identifier.to_lowercase();
        vec![
            format!("https://logo.clearbit.com/{slug}.com"),
            format!("https://www.google.com/s2/favicons?domain={slug}.com&sz=128"),
        ]
    }

    /// Try each candidate in order and return the first body that decodes as
    /// an image, normalized to a fixed channel model.
    ///
    /// Transport errors, timeouts, and undecodable payloads all count as a
    /// plain candidate failure; the same candidate is never retried. When
    /// every candidate fails the result is `FetchError::NotFound`, which the
    /// caller records as a cacheable negative.
    pub async fn fetch(&self, identifier: &str) -> Result<DynamicImage, FetchError> {
        for url in Self::candidate_urls(identifier) {
            match self.try_candidate(&url).await {
                Ok(bitmap) => {
                    debug!("Resolved logo for '{}' from {}", identifier, url);
                    return Ok(normalize(bitmap));
                }
                Err(e) => {
                    debug!("Logo candidate failed for '{}': {}", identifier, e);
                }
            }
        }
        Err(FetchError::NotFound {
            identifier: identifier.to_string(),
        })
    }

    async fn try_candidate(&self, url: &str) -> Result<DynamicImage, FetchError> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Transport {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        image::load_from_memory(&bytes).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Collapse the source color model: images carrying an alpha channel
/// (including luma+alpha) become RGBA8, everything else opaque RGB8.
fn normalize(bitmap: DynamicImage) -> DynamicImage {
    if bitmap.color().has_alpha() {
        DynamicImage::ImageRgba8(bitmap.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(bitmap.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, RgbaImage};

    #[test]
    fn test_candidate_order_is_deterministic() {
        let first = LogoFetcher::candidate_urls("ExampleNews");
        let second = LogoFetcher::candidate_urls("examplenews");
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first[0].starts_with("https://logo.clearbit.com/examplenews.com"));
        assert!(first[1].contains("favicons?domain=examplenews.com"));
    }

    #[test]
    fn test_normalize_keeps_alpha() {
        let bitmap = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        assert!(matches!(normalize(bitmap), DynamicImage::ImageRgba8(_)));

        let luma_alpha = DynamicImage::ImageLumaA8(GrayAlphaImage::new(4, 4));
        assert!(matches!(normalize(luma_alpha), DynamicImage::ImageRgba8(_)));
    }

    #[test]
    fn test_normalize_flattens_opaque() {
        let grayscale = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert!(matches!(normalize(grayscale), DynamicImage::ImageRgb8(_)));
    }
}
