// src/content.rs

use serde::{Deserialize, Serialize};

/// The line-break marker emitted for newlines. This is the only markup the
/// sanitizer itself produces; every angle bracket coming from user input is
/// escaped.
pub const LINE_BREAK: &str = "<br>";

/// Flood prevention: runs of blank lines render as at most this many breaks.
const MAX_CONSECUTIVE_BREAKS: usize = 2;

/// A post body in both its retained raw form and its display-safe form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeContent {
    /// The user's input, verbatim. Kept for audit and future editing.
    pub source: String,
    /// Escaped text safe to embed in HTML without further processing.
    pub rendered: String,
}

impl SafeContent {
    /// True when nothing visible survives sanitization (e.g. input that was
    /// all carriage returns or blank lines). Checked by validation before
    /// any write.
    pub fn is_degenerate(&self) -> bool {
        self.rendered.replace(LINE_BREAK, "").trim().is_empty()
    }
}

/// Turn arbitrary user input into a display-safe rendering.
///
/// Total function: malformed input is rendered literally, never rejected.
/// Carriage returns are dropped, newlines become [`LINE_BREAK`] markers
/// (capped at two in a row), and the five HTML-significant characters are
/// replaced with entities. The rendered output therefore never contains an
/// unescaped `&`, `'`, `<`, `>` or `"` originating from the input.
pub fn sanitize(raw: &str) -> SafeContent {
    let mut rendered = String::with_capacity(raw.len() + raw.len() / 8);
    let mut break_run = 0usize;

    for ch in raw.chars() {
        match ch {
            // Dropped outright; does not interrupt a newline run, so CRLF
            // sequences count as single breaks.
            '\r' => {}
            '\n' => {
                if break_run < MAX_CONSECUTIVE_BREAKS {
                    rendered.push_str(LINE_BREAK);
                    break_run += 1;
                }
            }
            '&' => {
                rendered.push_str("&amp;");
                break_run = 0;
            }
            '\'' => {
                rendered.push_str("&#39;");
                break_run = 0;
            }
            '<' => {
                rendered.push_str("&lt;");
                break_run = 0;
            }
            '>' => {
                rendered.push_str("&gt;");
                break_run = 0;
            }
            '"' => {
                rendered.push_str("&#34;");
                break_run = 0;
            }
            other => {
                rendered.push(other);
                break_run = 0;
            }
        }
    }

    SafeContent {
        source: raw.to_string(),
        rendered,
    }
}
