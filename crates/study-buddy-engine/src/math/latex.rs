//! MathML typesetting backed by pulldown-latex.

use pulldown_latex::{
    Parser, Storage,
    config::{DisplayMode, RenderConfig},
    mathml::push_mathml,
};

use super::render::{RenderError, Typesetter};

/// Typesets LaTeX math source to MathML.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexTypesetter;

impl Typesetter for LatexTypesetter {
    fn typeset(&self, source: &str, display_mode: bool) -> Result<String, RenderError> {
        let storage = Storage::new();
        let parser = Parser::new(source, &storage);
        let config = RenderConfig {
            display_mode: if display_mode {
                DisplayMode::Block
            } else {
                DisplayMode::Inline
            },
            ..Default::default()
        };

        // Collect first so parse errors are reported instead of half-rendered
        let events: Vec<_> = parser.collect();
        let errors: Vec<String> = events
            .iter()
            .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
            .collect();
        if !errors.is_empty() {
            return Err(RenderError::new(errors.join("; ")));
        }

        let mut mathml = String::new();
        push_mathml(&mut mathml, events.into_iter(), config)
            .map_err(|e| RenderError::new(e.to_string()))?;
        Ok(mathml)
    }
}
