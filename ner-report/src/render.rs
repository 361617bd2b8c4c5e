//! # Visualização de Entidades
//!
//! Gera um documento HTML com as entidades destacadas no texto original, no
//! estilo do displaCy: cada entidade vira um `<mark>` colorido pela categoria,
//! com o label ao lado.
//!
//! ## Sobreposição
//!
//! Os spans são dispostos por offset inicial (empates mantêm a ordem de
//! emissão). **O primeiro span vence**: um span que invade outro já disposto é
//! descartado, assim como spans com offsets inválidos. A função é pura: a
//! mesma entrada produz sempre os mesmos bytes.

use std::fmt;

use askama::Template;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::extractor::EntityRecord;
use crate::offsets::OffsetMap;

/// Span a destacar, em offsets de caractere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl From<&EntityRecord> for RenderSpan {
    fn from(record: &EntityRecord) -> Self {
        Self {
            start: record.start_offset,
            end: record.end_offset,
            label: record.label.clone(),
        }
    }
}

/// Documento renderizado (HTML).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trecho do texto: simples ou entidade.
struct Segment {
    text: String,
    entity: bool,
    label: String,
    color: &'static str,
}

#[derive(Template)]
#[template(path = "entities.html")]
struct EntitiesTemplate {
    segments: Vec<Segment>,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate {
    body: String,
}

/// Paleta por label (cores do displaCy); labels desconhecidos usam `DEFAULT_COLOR`
const PALETTE: &[(&str, &str)] = &[
    ("PERSON", "#aa9cfc"),
    ("ORG", "#7aecec"),
    ("GPE", "#feca74"),
    ("LOC", "#ff9561"),
    ("NORP", "#c887fb"),
    ("FAC", "#9cc9cc"),
    ("EVENT", "#ffeb80"),
    ("PRODUCT", "#bfeeb7"),
    ("WORK_OF_ART", "#f0d0ff"),
    ("LAW", "#ff8197"),
    ("LANGUAGE", "#ff8197"),
    ("DATE", "#bfe1d9"),
    ("TIME", "#bfe1d9"),
    ("MONEY", "#e4e7d2"),
    ("PERCENT", "#e4e7d2"),
    ("QUANTITY", "#e4e7d2"),
    ("ORDINAL", "#e4e7d2"),
    ("CARDINAL", "#e4e7d2"),
];

const DEFAULT_COLOR: &str = "#ddd";

/// Cor de destaque do label.
pub fn label_color(label: &str) -> &'static str {
    PALETTE
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, c)| *c)
        .unwrap_or(DEFAULT_COLOR)
}

/// Renderiza uma página HTML completa.
pub fn render(text: &str, spans: &[RenderSpan]) -> Result<RenderedDocument> {
    let body = render_fragment(text, spans)?.into_string();
    Ok(RenderedDocument(PageTemplate { body }.render()?))
}

/// Renderiza apenas o bloco `<div class="entities">`, para embutir em outra página.
pub fn render_fragment(text: &str, spans: &[RenderSpan]) -> Result<RenderedDocument> {
    let segments = layout(text, spans);
    Ok(RenderedDocument(EntitiesTemplate { segments }.render()?))
}

/// Divide o texto em segmentos, aplicando a regra "primeiro span vence".
fn layout(text: &str, spans: &[RenderSpan]) -> Vec<Segment> {
    let map = OffsetMap::new(text);
    let mut ordered: Vec<&RenderSpan> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let mut segments = Vec::new();
    let mut cursor = 0;
    for span in ordered {
        if span.start >= span.end || span.end > map.char_len() {
            warn!(start = span.start, end = span.end, "span inválido ignorado na visualização");
            continue;
        }
        if span.start < cursor {
            continue;
        }
        if let Some(plain) = map.slice(text, cursor, span.start).filter(|s| !s.is_empty()) {
            segments.push(plain_segment(plain));
        }
        if let Some(fragment) = map.slice(text, span.start, span.end) {
            segments.push(Segment {
                text: fragment.to_string(),
                entity: true,
                label: span.label.clone(),
                color: label_color(&span.label),
            });
        }
        cursor = span.end;
    }
    if let Some(rest) = map.slice(text, cursor, map.char_len()).filter(|s| !s.is_empty()) {
        segments.push(plain_segment(rest));
    }
    segments
}

fn plain_segment(text: &str) -> Segment {
    Segment {
        text: text.to_string(),
        entity: false,
        label: String::new(),
        color: DEFAULT_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, label: &str) -> RenderSpan {
        RenderSpan { start, end, label: label.to_string() }
    }

    #[test]
    fn test_render_highlights_entities() {
        let html = render_fragment("Alice lives in Paris", &[span(0, 5, "PERSON"), span(15, 20, "GPE")])
            .unwrap()
            .into_string();
        assert!(html.contains("Alice"));
        assert!(html.contains("PERSON"));
        assert!(html.contains("#feca74"));
        assert_eq!(html.matches("<mark").count(), 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let text = "Bob met Carol in Rome.";
        let spans = [span(17, 21, "GPE"), span(0, 3, "PERSON"), span(8, 13, "PERSON")];
        assert_eq!(render(text, &spans).unwrap(), render(text, &spans).unwrap());
    }

    #[test]
    fn test_first_span_wins_on_overlap() {
        let text = "New York City";
        let segments = layout(text, &[span(0, 8, "GPE"), span(4, 13, "ORG"), span(0, 13, "LOC")]);
        let entities: Vec<(&str, &str)> = segments
            .iter()
            .filter(|s| s.entity)
            .map(|s| (s.text.as_str(), s.label.as_str()))
            .collect();
        assert_eq!(entities, [("New York", "GPE")]);
        assert_eq!(segments.last().map(|s| s.text.as_str()), Some(" City"));
    }

    #[test]
    fn test_invalid_spans_are_dropped() {
        let segments = layout("Paris", &[span(3, 2, "X"), span(0, 9, "Y")]);
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].entity);
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_fragment("<b>Tom</b> & co", &[span(3, 6, "PERSON")]).unwrap().into_string();
        assert!(!html.contains("<b>"));
        assert!(!html.contains(" & "));
        assert!(html.contains("&#60;b&#62;"));
        assert!(html.contains("&#38; co"));
    }

    #[test]
    fn test_page_wraps_fragment() {
        let page = render("Paris", &[span(0, 5, "GPE")]).unwrap().into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<mark"));
        assert!(!page.contains("&lt;mark"));
    }

    #[test]
    fn test_unknown_label_color() {
        assert_eq!(label_color("SPACESHIP"), "#ddd");
        assert_eq!(label_color("PERSON"), "#aa9cfc");
    }
}
