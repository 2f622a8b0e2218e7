use anyhow::Result;
use std::path::Path;

use crate::models::ChannelEntry;

/// Assembles and writes the final `#EXTM3U` document.
pub struct PlaylistGenerator {
    /// Tier whose public URL goes into the `tvg-logo` attribute.
    logo_tier: String,
}

impl PlaylistGenerator {
    pub fn new(logo_tier: impl Into<String>) -> Self {
        Self {
            logo_tier: logo_tier.into(),
        }
    }

    /// Render all entries as one playlist. Each entry is a 2-3 line group:
    /// the `#EXTINF` directive, a `#EXTGRP:LOGOS` directive listing every
    /// tier's URL when logos exist, and the raw stream URL.
    pub fn generate_m3u_content(&self, entries: &[ChannelEntry]) -> String {
        let mut m3u = String::from("#EXTM3U\n");

        for entry in entries {
            let mut extinf = String::from("#EXTINF:-1");
            extinf.push_str(&format!(" group-title=\"{}\"", entry.category));

            if let Some(logos) = &entry.logos {
                if let Some(logo_url) = logos.get(&self.logo_tier) {
                    extinf.push_str(&format!(" tvg-logo=\"{}\"", logo_url));
                }
            }

            extinf.push_str(&format!(",{}\n", entry.name));
            m3u.push_str(&extinf);

            if let Some(logos) = &entry.logos {
                let listing = logos
                    .iter()
                    .map(|(tier, url)| format!("{}:{}", tier, url))
                    .collect::<Vec<_>>()
                    .join(" | ");
                m3u.push_str(&format!("#EXTGRP:LOGOS {}\n", listing));
            }

            m3u.push_str(&format!("{}\n", entry.stream_url));
        }

        m3u
    }

    /// Save playlist content to disk, creating parent directories as needed.
    pub fn save_playlist_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogoReferences;

    fn entry_with_logos() -> ChannelEntry {
        let mut logos = LogoReferences::new();
        logos.insert(
            "small".to_string(),
            "http://localhost:8080/logos/small/abc.jpg".to_string(),
        );
        logos.insert(
            "medium".to_string(),
            "http://localhost:8080/logos/medium/abc.jpg".to_string(),
        );
        ChannelEntry {
            name: "examplenews".to_string(),
            stream_url: "http://examplenews.tv/live/ch1.m3u8".to_string(),
            category: "news".to_string(),
            logos: Some(logos),
        }
    }

    #[test]
    fn test_entry_with_logos_is_three_lines() {
        let generator = PlaylistGenerator::new("medium");
        let content = generator.generate_m3u_content(&[entry_with_logos()]);

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(
            lines[1],
            "#EXTINF:-1 group-title=\"news\" \
             tvg-logo=\"http://localhost:8080/logos/medium/abc.jpg\",examplenews"
        );
        assert!(lines[2].starts_with("#EXTGRP:LOGOS "));
        assert!(lines[2].contains("small:http://localhost:8080/logos/small/abc.jpg"));
        assert!(lines[2].contains("medium:http://localhost:8080/logos/medium/abc.jpg"));
        assert_eq!(lines[3], "http://examplenews.tv/live/ch1.m3u8");
    }

    #[test]
    fn test_entry_without_logos_has_no_logo_lines() {
        let generator = PlaylistGenerator::new("medium");
        let entry = ChannelEntry {
            name: "bare".to_string(),
            stream_url: "http://host.tv/bare.m3u8".to_string(),
            category: "misc".to_string(),
            logos: None,
        };

        let content = generator.generate_m3u_content(&[entry]);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "#EXTINF:-1 group-title=\"misc\",bare");
        assert!(!content.contains("tvg-logo"));
        assert!(!content.contains("#EXTGRP"));
    }
}
