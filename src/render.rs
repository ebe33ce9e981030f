//! Report rendering: terminal text, JSON, and an HTML page with HLS players

use anyhow::Result;
use std::fmt::Write as _;

use crate::controller::{ClassificationReport, ResolvedMatch};
use crate::taxonomy::Category;

/// Output formats for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => Err(anyhow::anyhow!("unknown output format: {}", other)),
        }
    }
}

pub fn render(report: &ClassificationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Html => Ok(render_html(report)),
    }
}

/// Category listing for selection prompts
pub fn render_categories(categories: &[Category], builtin_count: usize) -> String {
    let mut out = String::new();
    for (i, category) in categories.iter().enumerate() {
        let marker = if i < builtin_count { "" } else { " (custom)" };
        let _ = writeln!(out, "{}{}", category.name, marker);
        let _ = writeln!(out, "    {}", category.prompts.join(", "));
    }
    out
}

pub fn render_text(report: &ClassificationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Classified Videos ({})", report.categories.join(", "));
    let _ = writeln!(out);

    for m in &report.matches {
        let _ = writeln!(out, "Video {}", m.position);
        let _ = writeln!(out, "  Video ID: {}", m.video_id);
        for class in &m.classes {
            let _ = writeln!(out, "  Class: {}", class.name);
            let _ = writeln!(out, "    - Score: {:.2}", class.score);
            let _ = writeln!(out, "    - Duration Ratio: {:.2}", class.duration_ratio);
        }
        match (&m.stream_url, &m.unavailable_reason) {
            (Some(url), _) => {
                let _ = writeln!(out, "  Stream: {}", url);
            }
            (None, Some(reason)) => {
                let _ = writeln!(out, "  Video URL not available ({})", reason);
            }
            (None, None) => {
                let _ = writeln!(out, "  Video URL not available");
            }
        }
        let _ = writeln!(out, "---");
    }

    let _ = writeln!(out, "Total videos classified: {}", report.total());
    out
}

pub fn render_html(report: &ClassificationReport) -> String {
    let mut body = String::new();
    for m in &report.matches {
        body.push_str(&render_match_html(m));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Olympics Classification</title>
    <script src="https://cdn.jsdelivr.net/npm/hls.js@latest"></script>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        .video-info {{ background-color: #f0f0f0; border-radius: 10px; padding: 15px; margin-bottom: 20px; }}
        .player {{ width: 100%; border-radius: 10px; overflow: hidden; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); }}
        .warning {{ color: #8a6d3b; background: #fcf8e3; padding: 10px; border-radius: 4px; }}
    </style>
</head>
<body>
    <h1>Classified Videos</h1>
    <p>Categories: {categories}</p>
{body}
    <p><strong>Total videos classified: {total}</strong></p>
</body>
</html>
"#,
        categories = escape_html(&report.categories.join(", ")),
        body = body,
        total = report.total()
    )
}

fn render_match_html(m: &ResolvedMatch) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "    <h3>Video {}</h3>", m.position);
    let _ = writeln!(out, "    <div class=\"video-info\">");
    let _ = writeln!(out, "      <p><strong>Video ID:</strong> {}</p>", escape_html(&m.video_id));
    for class in &m.classes {
        let _ = writeln!(
            out,
            "      <p><strong>Class:</strong> {}</p>\n      <ul><li>Score: {:.2}</li><li>Duration Ratio: {:.2}</li></ul>",
            escape_html(&class.name),
            class.score,
            class.duration_ratio
        );
    }
    let _ = writeln!(out, "    </div>");

    match &m.stream_url {
        Some(url) => out.push_str(&hls_player(&format!("video-{}", m.position), url)),
        None => {
            let _ = writeln!(
                out,
                "    <p class=\"warning\">Video URL not available. Unable to render video.</p>"
            );
        }
    }
    let _ = writeln!(out, "    <hr>");
    out
}

/// Video element wired to hls.js, falling back to native HLS playback
fn hls_player(element_id: &str, url: &str) -> String {
    let source = serde_json::to_string(url).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"    <div class="player"><video id="{id}" controls style="width: 100%; height: auto;"></video></div>
    <script>
      (function() {{
        var video = document.getElementById('{id}');
        var videoSrc = {src};
        if (Hls.isSupported()) {{
          var hls = new Hls();
          hls.loadSource(videoSrc);
          hls.attachMedia(video);
        }} else if (video.canPlayType('application/vnd.apple.mpegurl')) {{
          video.src = videoSrc;
        }}
      }})();
    </script>
"#,
        id = element_id,
        src = source.replace("</", "<\\/")
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
