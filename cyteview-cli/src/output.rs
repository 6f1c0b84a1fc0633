//! Terminal rendering of feed events, as human-readable text or JSON lines.

use cyteview_feed::{AnalysisFrame, FeedEvent};
use serde_json::json;
use url::Url;

use crate::error::Result;

/// Glyphs for the compact histogram rendering, lowest bin to highest.
const BAR_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct OutputManager {
    json: bool,
}

impl OutputManager {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Render one feed event for stdout, without a trailing newline.
    pub fn format_event(&self, event: &FeedEvent) -> Result<String> {
        if self.json {
            return self.format_event_json(event);
        }
        Ok(match event {
            FeedEvent::Frame(frame) => format_frame_pretty(frame),
            other => other.description(),
        })
    }

    /// Confirmation line for a successful one-shot login.
    pub fn format_login_ok(&self, username: &str, base_url: &Url) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string(&json!({
                "status": "ok",
                "logged_in_as": username,
                "base_url": base_url.as_str(),
            }))?);
        }
        Ok(format!("✓ Logged in to {base_url} as `{username}`"))
    }

    fn format_event_json(&self, event: &FeedEvent) -> Result<String> {
        let value = match event {
            FeedEvent::Frame(frame) => json!({
                "event": "frame",
                "image_id": frame.image_id,
                "classification_label": frame.classification_label,
                "focus_score": frame.focus_score,
                "intensity_average": frame.intensity_average,
                "histogram": frame.histogram,
                "image_bytes": frame.image_bytes.len(),
                "received_at": frame.received_at,
            }),
            FeedEvent::Retrying {
                attempt,
                max_retries,
                delay,
                message,
                timestamp,
            } => json!({
                "event": "retrying",
                "attempt": attempt,
                "max_retries": max_retries,
                "delay_ms": delay.as_millis() as u64,
                "message": message,
                "timestamp": timestamp,
            }),
            FeedEvent::CycleError { message, timestamp } => json!({
                "event": "cycle_error",
                "message": message,
                "timestamp": timestamp,
            }),
            FeedEvent::AuthenticationLost { message, timestamp } => json!({
                "event": "authentication_lost",
                "message": message,
                "timestamp": timestamp,
            }),
        };
        Ok(serde_json::to_string(&value)?)
    }
}

fn format_frame_pretty(frame: &AnalysisFrame) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Frame {} ({})\n",
        frame.image_id,
        frame.received_at.format("%H:%M:%S%.3f")
    ));
    output.push_str(&format!("  Label:     {}\n", frame.classification_label));
    output.push_str(&format!("  Focus:     {:.2}\n", frame.focus_score));
    output.push_str(&format!("  Intensity: {:.2}\n", frame.intensity_average));
    output.push_str(&format!("  Image:     {} bytes\n", frame.image_bytes.len()));
    if !frame.histogram.is_empty() {
        output.push_str(&format!(
            "  Histogram: {}  (peak {})\n",
            histogram_bars(&frame.histogram),
            frame.histogram.iter().max().copied().unwrap_or(0),
        ));
    }
    output.pop();
    output
}

/// Map each bin onto one of eight block glyphs, scaled to the tallest bin.
fn histogram_bars(bins: &[u64]) -> String {
    let max = bins.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return BAR_GLYPHS[0].to_string().repeat(bins.len());
    }
    bins.iter()
        .map(|&count| {
            let level = (count as u128 * (BAR_GLYPHS.len() as u128 - 1) / max as u128) as usize;
            BAR_GLYPHS[level]
        })
        .collect()
}
