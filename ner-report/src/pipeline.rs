//! # Pipeline NER: Orquestrador de uma Requisição
//!
//! Uma ação "Analisar" percorre as etapas em sequência, de forma síncrona:
//!
//! 1. Extração ([`extractor::extract`]) com o handle escolhido.
//! 2. Tabela ([`report::to_table`]).
//! 3. Estatísticas ([`report::label_statistics`]).
//!
//! A exportação e a visualização partem do [`Analysis`] resultante. Não há
//! estado entre requisições: cada chamada recalcula tudo.

use std::time::Instant;

use tracing::{debug, info_span};

use crate::error::Result;
use crate::export::ExportSink;
use crate::extractor;
use crate::model::ModelHandle;
use crate::render::{self, RenderSpan, RenderedDocument};
use crate::report::{self, EntityTable, LabelStatistics};

/// Resultado de uma análise.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Nome do modelo que atendeu a requisição.
    pub model: String,
    pub table: EntityTable,
    pub statistics: LabelStatistics,
    pub processing_ms: u64,
}

impl Analysis {
    /// Spans da tabela para a visualização.
    pub fn spans(&self) -> Vec<RenderSpan> {
        self.table.iter().map(RenderSpan::from).collect()
    }

    /// Página HTML com as entidades destacadas em `text` (o mesmo texto analisado).
    pub fn render(&self, text: &str) -> Result<RenderedDocument> {
        render::render(text, &self.spans())
    }

    /// Bloco HTML para embutir em outra página.
    pub fn render_fragment(&self, text: &str) -> Result<RenderedDocument> {
        render::render_fragment(text, &self.spans())
    }

    /// Exporta a tabela para `sink` no formato pedido.
    pub fn export(&self, sink: &ExportSink, format: &str) -> Result<std::path::PathBuf> {
        sink.export(&self.table, format)
    }
}

/// Executa extração, tabela e estatísticas para `text`.
pub fn analyze(handle: &ModelHandle, text: &str) -> Result<Analysis> {
    let span = info_span!("analyze", model = handle.name(), chars = text.chars().count());
    let _guard = span.enter();
    let started = Instant::now();

    let records = extractor::extract(handle, text)?;
    let table = report::to_table(records);
    let statistics = report::label_statistics(&table);

    let processing_ms = started.elapsed().as_millis() as u64;
    debug!(entities = table.len(), labels = statistics.len(), processing_ms, "análise concluída");

    Ok(Analysis {
        model: handle.name().to_string(),
        table,
        statistics,
        processing_ms,
    })
}
