use tracing::info;

use crate::models::{ChannelEntry, ProcessingResult};

/// Renders grouped channels as an extended M3U playlist
#[derive(Debug, Clone, Default)]
pub struct PlaylistGenerator {
    append_quality_tag: bool,
}

impl PlaylistGenerator {
    pub fn new(append_quality_tag: bool) -> Self {
        Self { append_quality_tag }
    }

    /// Playlist for a pipeline result, in aggregated order
    pub fn generate(&self, result: &ProcessingResult) -> String {
        let content = self.generate_m3u_content(result.entries());
        info!(
            "Generated playlist with {} channels in {} groups",
            result.stats.total_entries,
            result.groups.len()
        );
        content
    }

    pub fn generate_m3u_content<'a, I>(&self, entries: I) -> String
    where
        I: IntoIterator<Item = &'a ChannelEntry>,
    {
        let mut m3u = String::from("#EXTM3U\n");

        for entry in entries {
            let extinf = format!(
                "#EXTINF:-1 tvg-id=\"{}\" tvg-logo=\"{}\" group-title=\"{}\" tvg-name=\"{}\",{}\n",
                attribute_value(&entry.epg_id),
                attribute_value(&entry.logo_url),
                attribute_value(&entry.country),
                attribute_value(&entry.name),
                self.display_title(entry)
            );

            m3u.push_str(&extinf);
            m3u.push_str(&entry.stream_url);
            m3u.push('\n');
        }

        m3u
    }

    /// Channel title, with the quality tag appended when enabled and not
    /// already part of the name
    pub fn display_title(&self, entry: &ChannelEntry) -> String {
        let tag = match entry.quality.tag() {
            Some(tag) if self.append_quality_tag => tag,
            _ => return entry.name.clone(),
        };

        let already_tagged = entry
            .name
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.eq_ignore_ascii_case(tag));

        if already_tagged {
            entry.name.clone()
        } else {
            format!("{} [{}]", entry.name, tag)
        }
    }
}

/// Attribute values are always double-quoted; embedded quotes become `'`
fn attribute_value(value: &str) -> String {
    value.replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountryGroup, EntryOrigin, Quality, Signature};

    fn entry(name: &str, quality: Quality, country: &str) -> ChannelEntry {
        ChannelEntry {
            name: name.to_string(),
            group: String::new(),
            logo_url: "http://logo/x.png".to_string(),
            epg_id: "x.id".to_string(),
            stream_url: format!("http://x.com/{}", name.len()),
            origin: EntryOrigin::Import,
            signature: Signature::compute(name, "http://x.com"),
            quality,
            country: country.to_string(),
        }
    }

    #[test]
    fn test_generate_playlist() {
        let result = ProcessingResult {
            groups: vec![
                CountryGroup {
                    country: "Canada".to_string(),
                    entries: vec![entry("CBC", Quality::Unknown, "Canada")],
                },
                CountryGroup {
                    country: "Uncategorized".to_string(),
                    entries: vec![entry("Say \"Hi\"", Quality::Unknown, "Uncategorized")],
                },
            ],
            ..Default::default()
        };

        let playlist = PlaylistGenerator::new(true).generate(&result);
        let lines: Vec<&str> = playlist.lines().collect();

        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(
            lines[1],
            "#EXTINF:-1 tvg-id=\"x.id\" tvg-logo=\"http://logo/x.png\" group-title=\"Canada\" tvg-name=\"CBC\",CBC"
        );
        assert_eq!(lines[2], "http://x.com/3");
        assert!(lines[3].contains("tvg-name=\"Say 'Hi'\",Say \"Hi\""));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_quality_tag() {
        let tagged = PlaylistGenerator::new(true);
        let plain = PlaylistGenerator::new(false);

        assert_eq!(
            tagged.display_title(&entry("Movies 1080p", Quality::Fhd, "Other")),
            "Movies 1080p [FHD]"
        );
        assert_eq!(
            tagged.display_title(&entry("ESPN HD", Quality::Hd, "Other")),
            "ESPN HD"
        );
        assert_eq!(
            tagged.display_title(&entry("Shadow", Quality::Hd, "Other")),
            "Shadow [HD]"
        );
        assert_eq!(
            tagged.display_title(&entry("Mystery", Quality::Unknown, "Other")),
            "Mystery"
        );
        assert_eq!(
            plain.display_title(&entry("Movies 1080p", Quality::Fhd, "Other")),
            "Movies 1080p"
        );
    }
}
