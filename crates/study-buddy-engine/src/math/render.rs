use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use super::{scanner::segments, types::Segment};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("typesetting failed: {message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Converts math source into renderable markup.
pub trait Typesetter {
    fn typeset(&self, source: &str, display_mode: bool) -> Result<String, RenderError>;
}

impl<F> Typesetter for F
where
    F: Fn(&str, bool) -> Result<String, RenderError>,
{
    fn typeset(&self, source: &str, display_mode: bool) -> Result<String, RenderError> {
        self(source, display_mode)
    }
}

/// A segment after typesetting.
///
/// `source_offset` is carried through from the scanned [`Segment`] so a
/// presentation layer can key list items on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RenderedSegment<'a> {
    /// Literal text, to be escaped by the presentation layer.
    Text { content: &'a str, source_offset: usize },
    /// Trusted markup returned by the typesetter, inserted verbatim.
    Markup {
        markup: String,
        display: bool,
        source_offset: usize,
    },
    /// A math segment that failed to typeset. `literal` keeps the delimiters so
    /// the user can see and fix the source.
    Error {
        literal: String,
        message: String,
        display: bool,
        source_offset: usize,
    },
}

impl RenderedSegment<'_> {
    pub fn source_offset(&self) -> usize {
        match self {
            RenderedSegment::Text { source_offset, .. }
            | RenderedSegment::Markup { source_offset, .. }
            | RenderedSegment::Error { source_offset, .. } => *source_offset,
        }
    }
}

/// Scans `text` and typesets every math segment.
///
/// A failure to typeset one segment only affects that segment, which becomes a
/// [`RenderedSegment::Error`]. With no typesetter at all, the whole input is
/// returned as a single text segment.
pub fn render_segments<'a>(
    text: &'a str,
    typesetter: Option<&dyn Typesetter>,
) -> Vec<RenderedSegment<'a>> {
    let Some(typesetter) = typesetter else {
        log::warn!(
            "No math typesetter available; showing {} bytes of text unrendered",
            text.len()
        );
        return vec![RenderedSegment::Text {
            content: text,
            source_offset: 0,
        }];
    };

    segments(text)
        .map(|seg| render_one(seg, typesetter))
        .collect()
}

fn render_one<'a>(seg: Segment<'a>, typesetter: &dyn Typesetter) -> RenderedSegment<'a> {
    if !seg.is_math() {
        return RenderedSegment::Text {
            content: seg.content,
            source_offset: seg.source_offset,
        };
    }

    let display = seg.display_mode();
    match typesetter.typeset(seg.content, display) {
        Ok(markup) => RenderedSegment::Markup {
            markup,
            display,
            source_offset: seg.source_offset,
        },
        Err(e) => {
            log::debug!("Math at offset {} failed: {e}", seg.source_offset);
            RenderedSegment::Error {
                literal: seg.literal(),
                message: e.message,
                display,
                source_offset: seg.source_offset,
            }
        }
    }
}

/// Serializes rendered segments to an HTML fragment.
pub fn to_html(rendered: &[RenderedSegment<'_>]) -> String {
    let mut out = String::new();
    for seg in rendered {
        match seg {
            RenderedSegment::Text { content, .. } => out.push_str(&encode_text(content)),
            RenderedSegment::Markup { markup, .. } => out.push_str(markup),
            RenderedSegment::Error {
                literal,
                message,
                display,
                ..
            } => {
                let mode_class = if *display {
                    "math-display"
                } else {
                    "math-inline"
                };
                out.push_str(&format!(
                    r#"<span class="math-error {mode_class}" title="{}"><code>{}</code></span>"#,
                    encode_double_quoted_attribute(message),
                    encode_text(literal)
                ));
            }
        }
    }
    out
}
