//! # ner-report: Extração e Relatório de Entidades Nomeadas
//!
//! Este crate liga um modelo de NER pré-treinado a um pequeno fluxo de relatório:
//! extrai as entidades de um texto, monta uma tabela, conta os labels, exporta
//! o resultado e gera uma visualização HTML com as entidades destacadas.
//!
//! ## Arquitetura
//!
//! 1.  **Provedor de Modelos** ([`model`]): carrega um modelo pelo nome e devolve um [`ModelHandle`].
//! 2.  **Extrator** ([`extractor`]): normaliza os spans do modelo em [`EntityRecord`]s.
//! 3.  **Relatório** ([`report`]): [`EntityTable`] e [`LabelStatistics`].
//! 4.  **Exportação** ([`export`]): `entities.csv` ou `entities.json` (uma linha por entidade).
//! 5.  **Visualização** ([`render`]): HTML com destaque por categoria.
//!
//! O [`pipeline`] encadeia 2 e 3 para uma requisição.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use ner_report::{analyze, ExportSink, ModelProvider};
//!
//! // 1. Carrega o modelo (etapa mais cara)
//! let provider = ModelProvider::new("models");
//! let handle = provider.load("en_core_web_sm")?;
//!
//! // 2. Analisa o texto
//! let text = "Alice moved from Paris to London in 2021.";
//! let analysis = analyze(&handle, text)?;
//!
//! for entity in analysis.table.iter() {
//!     println!("{} ({}) [{}, {})", entity.text, entity.label, entity.start_offset, entity.end_offset);
//! }
//! for count in analysis.statistics.by_count() {
//!     println!("{}: {}", count.label, count.count);
//! }
//!
//! // 3. Exporta e renderiza
//! analysis.export(&ExportSink::current_dir(), "csv")?;
//! let _html = analysis.render(text)?;
//! # Ok::<(), ner_report::NerError>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod model;
pub mod offsets;
pub mod package;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod rule_based;
pub mod tokenizer;

pub use config::NerConfig;
pub use error::{ErrorKind, ExportError, NerError, Result};
pub use export::{export, ExportFormat, ExportSink};
pub use extractor::{extract, EntityRecord};
pub use model::{ModelHandle, ModelProvider, RawSpan, Tagger};
pub use pipeline::{analyze, Analysis};
pub use render::{render, render_fragment, RenderSpan, RenderedDocument};
pub use report::{label_statistics, to_table, EntityRow, EntityTable, LabelCount, LabelStatistics};
