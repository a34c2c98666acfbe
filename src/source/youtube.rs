//! YouTube source implementation.
//!
//! Playlist enumeration and caption-track discovery go through yt-dlp; the
//! selected caption track is then fetched as json3 over HTTP and parsed into
//! caption snippets.

use super::{TranscriptSource, VideoEntry};
use crate::error::{Result, SpoleError};
use crate::transcript::{CaptionSnippet, Transcript};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// YouTube transcript source.
pub struct YoutubeSource {
    video_id_regex: Regex,
    http: reqwest::Client,
}

impl YoutubeSource {
    pub fn new() -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            video_id_regex,
            http,
        }
    }

    /// Extract video ID from a YouTube URL or bare ID.
    fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        // Try group 1 (URL format) then group 2 (bare ID)
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Dump per-video metadata with yt-dlp, including caption track listings.
    async fn dump_video_json(&self, url: &str) -> Result<serde_json::Value> {
        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--no-download",
                "--no-warnings",
                url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpoleError::ToolNotFound("yt-dlp".to_string())
                } else {
                    SpoleError::TranscriptFetch(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpoleError::TranscriptFetch(format!(
                "yt-dlp failed for {}: {}",
                url, stderr
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str).map_err(|e| {
            SpoleError::TranscriptFetch(format!("Failed to parse yt-dlp output: {}", e))
        })
    }

    /// Pick a caption track URL from the video metadata.
    ///
    /// Manual subtitles win over automatic captions; within each, languages
    /// are tried in preference order. Returns `TranscriptsDisabled` when the
    /// video has no caption tracks at all, `NoTranscriptAvailable` when none
    /// match a preferred language.
    fn select_caption_track(
        json: &serde_json::Value,
        video_id: &str,
        languages: &[String],
    ) -> Result<String> {
        let subtitles = json["subtitles"].as_object();
        let automatic = json["automatic_captions"].as_object();

        let has_any = subtitles.is_some_and(|m| !m.is_empty())
            || automatic.is_some_and(|m| !m.is_empty());
        if !has_any {
            return Err(SpoleError::TranscriptsDisabled(video_id.to_string()));
        }

        for tracks in [subtitles, automatic].into_iter().flatten() {
            for lang in languages {
                if let Some(formats) = tracks.get(lang).and_then(|v| v.as_array()) {
                    // Prefer the json3 rendition; any other format URL still
                    // serves json3 when asked for it.
                    let chosen = formats
                        .iter()
                        .find(|f| f["ext"].as_str() == Some("json3"))
                        .or_else(|| formats.first());

                    if let Some(track_url) = chosen.and_then(|f| f["url"].as_str()) {
                        let url = if track_url.contains("fmt=json3") {
                            track_url.to_string()
                        } else {
                            format!("{}&fmt=json3", track_url)
                        };
                        return Ok(url);
                    }
                }
            }
        }

        Err(SpoleError::NoTranscriptAvailable(video_id.to_string()))
    }

    /// Parse a json3 caption payload into snippets.
    ///
    /// Events without text (window styling, newline-only segments) are
    /// skipped; event order gives non-decreasing start times.
    fn parse_json3(payload: &serde_json::Value) -> Vec<CaptionSnippet> {
        let events = match payload["events"].as_array() {
            Some(e) => e,
            None => return Vec::new(),
        };

        let mut snippets = Vec::new();
        for event in events {
            let start_ms = match event["tStartMs"].as_f64() {
                Some(ms) => ms,
                None => continue,
            };

            let text = event["segs"]
                .as_array()
                .map(|segs| {
                    segs.iter()
                        .filter_map(|s| s["utf8"].as_str())
                        .collect::<String>()
                })
                .unwrap_or_default();

            let text = text.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                continue;
            }

            snippets.push(CaptionSnippet::new(text, start_ms / 1000.0));
        }

        snippets
    }
}

impl Default for YoutubeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YoutubeSource {
    #[instrument(skip(self))]
    async fn list_videos(
        &self,
        playlist_url: &str,
        limit: Option<usize>,
    ) -> Result<Vec<VideoEntry>> {
        Url::parse(playlist_url).map_err(|e| {
            SpoleError::InvalidInput(format!("Invalid playlist URL {}: {}", playlist_url, e))
        })?;

        let limit_str = limit.map(|l| l.to_string()).unwrap_or_else(|| "50".to_string());

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--no-download",
                "--no-warnings",
                "--flat-playlist",
                "--playlist-end",
                &limit_str,
                playlist_url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpoleError::ToolNotFound("yt-dlp".to_string())
                } else {
                    SpoleError::Playlist(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpoleError::Playlist(format!(
                "Failed to list playlist videos: {}",
                stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut entries = Vec::new();

        for line in stdout.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if let Ok(json) = serde_json::from_str::<serde_json::Value>(line) {
                let id = json["id"]
                    .as_str()
                    .or_else(|| json["url"].as_str())
                    .map(|s| self.extract_video_id(s).unwrap_or_else(|| s.to_string()));

                if let Some(video_id) = id {
                    let title = json["title"]
                        .as_str()
                        .unwrap_or("Unknown Title")
                        .to_string();

                    entries.push(VideoEntry {
                        url: format!("https://www.youtube.com/watch?v={}", video_id),
                        id: video_id,
                        title,
                    });
                }
            }
        }

        debug!("Playlist listing returned {} videos", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self, entry), fields(video_id = %entry.id))]
    async fn fetch_transcript(
        &self,
        entry: &VideoEntry,
        languages: &[String],
    ) -> Result<Transcript> {
        let json = self.dump_video_json(&entry.url).await?;
        let track_url = Self::select_caption_track(&json, &entry.id, languages)?;

        let payload: serde_json::Value = self
            .http
            .get(&track_url)
            .send()
            .await
            .map_err(|e| SpoleError::TranscriptFetch(format!("Caption download failed: {}", e)))?
            .json()
            .await
            .map_err(|e| SpoleError::TranscriptFetch(format!("Caption parse failed: {}", e)))?;

        let snippets = Self::parse_json3(&payload);
        debug!("Fetched {} caption snippets", snippets.len());

        let title = json["title"]
            .as_str()
            .unwrap_or(entry.title.as_str())
            .to_string();

        Ok(Transcript::new(
            entry.id.clone(),
            entry.url.clone(),
            title,
            snippets,
        ))
    }
}
