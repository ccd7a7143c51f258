use crate::error::StrategyError;
use crate::model::{CaptionTrack, VideoInfo};
use crate::url_to_text::fetchers::PageFetcher;
use html_escape::decode_html_entities;
use log::{debug, info};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Caption formats we can read, best first.
const FORMAT_PREFERENCE: &[&str] = &["vtt", "srt", "json3"];

/// A caption track chosen for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTrack<'a> {
    pub language: String,
    pub automatic: bool,
    pub track: &'a CaptionTrack,
}

/// Pick the first preferred language that has a track.
///
/// Uploaded subtitles win over automatic captions for the same language.
/// Languages outside the preference list are never chosen.
pub fn select_track<'a>(
    info: &'a VideoInfo,
    preferred_languages: &[String],
) -> Result<SelectedTrack<'a>, StrategyError> {
    for language in preferred_languages {
        for (tracks, automatic) in [(&info.subtitles, false), (&info.automatic_captions, true)] {
            if let Some(track) = best_track(tracks, language) {
                return Ok(SelectedTrack {
                    language: language.clone(),
                    automatic,
                    track,
                });
            }
        }
    }

    let available: Vec<&str> = info
        .subtitles
        .keys()
        .chain(info.automatic_captions.keys())
        .map(String::as_str)
        .collect();
    Err(StrategyError::TranscriptUnavailable(format!(
        "no caption track in {:?} (available: {:?})",
        preferred_languages, available
    )))
}

fn best_track<'a>(
    tracks: &'a BTreeMap<String, Vec<CaptionTrack>>,
    language: &str,
) -> Option<&'a CaptionTrack> {
    let candidates = tracks.get(language)?;
    FORMAT_PREFERENCE
        .iter()
        .find_map(|ext| candidates.iter().find(|t| t.ext.as_deref() == Some(*ext)))
        .or_else(|| candidates.first())
}

/// Reduce a caption payload (WebVTT, SRT or YouTube json3) to plain cue text.
///
/// Index lines, timing lines, headers and markup are dropped; cue lines are
/// joined with single spaces. Consecutive repeats, common in rolling
/// auto-captions, collapse to one.
pub fn parse_timed_text(payload: &str) -> String {
    let trimmed = payload.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('{') {
        if let Some(text) = parse_json3(trimmed) {
            return text;
        }
    }

    let mut lines: Vec<String> = Vec::new();
    let mut skipping_block = false;
    let mut block_start = true;

    for raw in trimmed.lines() {
        let line = raw.trim();
        if line.is_empty() {
            skipping_block = false;
            block_start = true;
            continue;
        }
        let first_in_block = std::mem::replace(&mut block_start, false);
        if skipping_block {
            continue;
        }
        // Header blocks only open after a blank line; inside a cue they are text.
        if first_in_block && is_block_header(line) {
            skipping_block = true;
            continue;
        }
        if line.contains("-->") || line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let text = strip_markup(line);
        if text.is_empty() || lines.last() == Some(&text) {
            continue;
        }
        lines.push(text);
    }

    lines.join(" ")
}

fn is_block_header(line: &str) -> bool {
    line.starts_with("WEBVTT")
        || line == "NOTE"
        || line.starts_with("NOTE ")
        || line == "STYLE"
        || line == "REGION"
}

fn parse_json3(payload: &str) -> Option<String> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let events = value.get("events")?.as_array()?;
    let mut lines: Vec<String> = Vec::new();
    for event in events {
        let Some(segs) = event.get("segs").and_then(Value::as_array) else {
            continue;
        };
        let text: String = segs
            .iter()
            .filter_map(|s| s.get("utf8").and_then(Value::as_str))
            .collect();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() && lines.last() != Some(&text) {
            lines.push(text);
        }
    }
    Some(lines.join(" "))
}

/// Remove `<c>`, `<i>`, `<00:00:01.000>`-style tags and decode entities.
fn strip_markup(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = decode_html_entities(&out);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Chooses a caption track for a video and turns it into transcript text.
pub struct CaptionResolver {
    fetcher: Arc<dyn PageFetcher>,
    preferred_languages: Vec<String>,
    timeout: Duration,
}

impl CaptionResolver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        preferred_languages: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            preferred_languages,
            timeout,
        }
    }

    pub async fn resolve(&self, info: &VideoInfo) -> Result<String, StrategyError> {
        let selected = select_track(info, &self.preferred_languages)?;
        info!(
            "Using {} captions in '{}'",
            if selected.automatic { "automatic" } else { "uploaded" },
            selected.language
        );

        let payload = self
            .fetcher
            .get(&selected.track.url, &HashMap::new(), self.timeout)
            .await
            .map_err(|e| {
                StrategyError::TranscriptUnavailable(format!("caption fetch failed: {e}"))
            })?;

        let text = parse_timed_text(&payload);
        debug!("Caption text: {} chars", text.len());
        if text.is_empty() {
            return Err(StrategyError::TranscriptUnavailable(format!(
                "caption track '{}' is empty",
                selected.language
            )));
        }
        Ok(text)
    }
}
