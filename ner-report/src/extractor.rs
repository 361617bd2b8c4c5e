//! # Extrator de Entidades
//!
//! Chama o modelo e normaliza cada span em um [`EntityRecord`], um para um e na
//! ordem em que o modelo emitiu. Não há deduplicação, filtro nem reordenação:
//! spans sobrepostos passam como vieram.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NerError, Result};
use crate::model::ModelHandle;
use crate::offsets::OffsetMap;

/// Uma entidade reconhecida no texto de origem.
///
/// `start_offset..end_offset` é um intervalo semiaberto em caracteres e
/// `text` é exatamente o trecho correspondente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub text: String,
    pub label: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl EntityRecord {
    pub fn new(text: impl Into<String>, label: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            start_offset,
            end_offset,
        }
    }
}

/// Extrai as entidades de `text` com o modelo `handle`.
///
/// Texto vazio devolve uma lista vazia sem consultar o modelo. Se o modelo
/// falhar, ou emitir um span fora do texto ou com fragmento divergente, o
/// resultado é [`NerError::Extraction`] e nenhum registro é devolvido.
pub fn extract(handle: &ModelHandle, text: &str) -> Result<Vec<EntityRecord>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let spans = handle.extract_spans(text).map_err(|e| match e {
        NerError::Extraction(_) => e,
        other => NerError::Extraction(other.to_string()),
    })?;
    let map = OffsetMap::new(text);
    let char_len = map.char_len();

    let records = spans
        .into_iter()
        .map(|span| {
            if span.start >= span.end || span.end > char_len {
                return Err(NerError::Extraction(format!(
                    "span [{}, {}) inválido para texto de {} caracteres",
                    span.start, span.end, char_len
                )));
            }
            match map.slice(text, span.start, span.end) {
                Some(fragment) if fragment == span.text => {
                    Ok(EntityRecord::new(span.text, span.label, span.start, span.end))
                }
                _ => Err(NerError::Extraction(format!(
                    "fragmento '{}' não corresponde ao texto em [{}, {})",
                    span.text, span.start, span.end
                ))),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(model = handle.name(), entities = records.len(), "entidades extraídas");
    Ok(records)
}
