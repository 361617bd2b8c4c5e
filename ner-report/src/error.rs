//! # Erros do pipeline
//!
//! Cada etapa falha com um tipo próprio, para que quem chama consiga distinguir
//! "modelo indisponível", "falha na marcação" e "falha na exportação".
//! Nenhuma etapa faz retry: o erro encerra a requisição corrente.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NerError>;

/// Erro de alto nível do pipeline NER.
#[derive(Debug, Error)]
pub enum NerError {
    /// O modelo pedido não está instalado (ou o pacote é inválido).
    #[error("modelo '{name}' não encontrado: {reason}")]
    ModelNotFound { name: String, reason: String },

    /// A chamada ao modelo falhou ou devolveu spans inconsistentes.
    #[error("falha na extração de entidades: {0}")]
    Extraction(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Falha ao gerar o documento HTML da visualização.
    #[error("falha ao renderizar a visualização: {0}")]
    Render(#[from] askama::Error),
}

/// Categoria do erro, útil para mapear em códigos HTTP ou mensagens de UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ModelNotFound,
    Extraction,
    Export,
    Render,
}

impl NerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NerError::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            NerError::Extraction(_) => ErrorKind::Extraction,
            NerError::Export(_) => ErrorKind::Export,
            NerError::Render(_) => ErrorKind::Render,
        }
    }

    pub(crate) fn model_not_found(name: &str, reason: impl Into<String>) -> Self {
        NerError::ModelNotFound {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Erros do [`crate::export`].
///
/// Em qualquer variante nenhum arquivo parcial fica no destino.
#[derive(Debug, Error)]
pub enum ExportError {
    /// O formato pedido não é `csv` nem `json`. Carrega o texto recebido sem alteração.
    #[error("formato de exportação não suportado: '{0}'")]
    UnsupportedFormat(String),

    #[error("erro de E/S em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("erro ao escrever CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("erro ao escrever JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}
