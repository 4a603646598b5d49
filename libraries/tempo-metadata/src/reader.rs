//! Metadata extraction backed by lofty.

use crate::error::{MetadataError, Result};
use crate::provider::MetadataProvider;
use lofty::{Accessor, AudioFile, ItemKey, Probe, Tag, TaggedFile, TaggedFileExt};
use tempo_core::types::{FormatRecord, TrackCandidate};
use std::path::Path;

/// Separators recognized inside multi-value artist/genre tags.
const VALUE_SEPARATORS: &[&str] = &[";", ",", "/", "\0", " feat. ", " ft. "];

/// Extraction backend using the lofty tag library.
///
/// The probe step (open + content-based file type guess) is the cheap
/// "can open and prepare" check; only files that pass it get a full tag
/// read. A passing file whose tags cannot be read still produces a
/// minimal candidate named after the file stem.
pub struct LoftyProvider;

impl LoftyProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoftyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for LoftyProvider {
    fn extract(&self, path: &Path) -> Result<TrackCandidate> {
        let probe = Probe::open(path)
            .map_err(|_| MetadataError::NotPlayable(path.to_path_buf()))?
            .guess_file_type()
            .map_err(|_| MetadataError::NotPlayable(path.to_path_buf()))?;

        if probe.file_type().is_none() {
            return Err(MetadataError::NotPlayable(path.to_path_buf()));
        }

        let tagged = match probe.read() {
            Ok(tagged) => tagged,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "tag read failed, falling back to filename"
                );
                return Ok(minimal_candidate(path));
            }
        };

        let mut candidate = minimal_candidate(path);

        let properties = tagged.properties();
        candidate.duration_seconds = Some(properties.duration().as_secs_f64());
        if let Some(format) = candidate.format.as_mut() {
            format.bitrate = properties.audio_bitrate();
            format.sample_rate = properties.sample_rate();
            format.channels = properties.channels();
        }

        let tags = ordered_tags(&tagged);

        if let Some(title) = merged_field(&tags, |t| t.title().map(|s| s.to_string()), "TITLE") {
            candidate.title = title;
        }
        candidate.album = merged_field(&tags, |t| t.album().map(|s| s.to_string()), "ALBUM");
        candidate.year = merged_year(&tags);
        candidate.artists = split_multi_values(&merged_values(&tags, &ItemKey::TrackArtist, "ARTIST"));
        candidate.genres = split_multi_values(&merged_values(&tags, &ItemKey::Genre, "GENRE"));

        Ok(candidate)
    }
}

/// Candidate carrying only what the path and filesystem offer.
fn minimal_candidate(path: &Path) -> TrackCandidate {
    let mut candidate = TrackCandidate::from_path(path);

    let container = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string());
    let content_length = std::fs::metadata(path).map(|m| m.len()).ok();

    candidate.format = Some(FormatRecord {
        container,
        bitrate: None,
        sample_rate: None,
        channels: None,
        content_length,
    });

    candidate
}

/// Tags in merge priority order: primary first, then the rest.
fn ordered_tags(file: &TaggedFile) -> Vec<&Tag> {
    let mut tags: Vec<&Tag> = Vec::new();
    if let Some(primary) = file.primary_tag() {
        tags.push(primary);
    }
    for tag in file.tags() {
        if !tags.iter().any(|t| std::ptr::eq(*t, tag)) {
            tags.push(tag);
        }
    }
    tags
}

/// First non-blank value for a field: the structured accessor wins over
/// the free-form item within each tag, earlier tags win over later ones.
fn merged_field(
    tags: &[&Tag],
    structured: impl Fn(&Tag) -> Option<String>,
    free_key: &str,
) -> Option<String> {
    for tag in tags {
        if let Some(value) = structured(tag) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
        if let Some(value) = free_form_value(tag, free_key) {
            return Some(value);
        }
    }
    None
}

/// All values a tag carries for one item key, with free-form fallback.
fn merged_values(tags: &[&Tag], key: &ItemKey, free_key: &str) -> Vec<String> {
    for tag in tags {
        let structured: Vec<String> = tag
            .items()
            .filter(|item| item.key() == key)
            .filter_map(|item| item.value().text())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if !structured.is_empty() {
            return structured;
        }
        if let Some(value) = free_form_value(tag, free_key) {
            return vec![value];
        }
    }
    Vec::new()
}

/// Non-blank text of a free-form (unknown-key) item, matched
/// case-insensitively by name.
fn free_form_value(tag: &Tag, name: &str) -> Option<String> {
    tag.items().find_map(|item| match item.key() {
        ItemKey::Unknown(key) if key.eq_ignore_ascii_case(name) => item
            .value()
            .text()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    })
}

fn merged_year(tags: &[&Tag]) -> Option<i32> {
    for tag in tags {
        if let Some(year) = tag.year() {
            return Some(year as i32);
        }
        for key in ["DATE", "YEAR"] {
            if let Some(value) = free_form_value(tag, key) {
                if let Some(year) = parse_year(&value) {
                    return Some(year);
                }
            }
        }
    }
    None
}

/// Leading four digits of a date-ish string ("1994-06-21" -> 1994).
fn parse_year(value: &str) -> Option<i32> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 4 {
        digits[..4].parse().ok()
    } else {
        None
    }
}

/// Split raw tag values on every recognized separator, trim, drop
/// blanks, and deduplicate by exact name.
fn split_multi_values(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for value in values {
        let mut parts: Vec<String> = vec![value.clone()];
        for separator in VALUE_SEPARATORS {
            parts = parts
                .iter()
                .flat_map(|part| part.split(separator))
                .map(|s| s.to_string())
                .collect();
        }

        for part in parts {
            let trimmed = part.trim();
            if !trimmed.is_empty() && !out.iter().any(|existing| existing == trimmed) {
                out.push(trimmed.to_string());
            }
        }
    }

    out
}
