//! # Provedor de Modelos
//!
//! Carrega modelos pré-treinados por nome e devolve um [`ModelHandle`] explícito,
//! que quem chama passa para cada extração. Não há modelo global: trocar de
//! modelo entre requisições é só usar outro handle.
//!
//! ## Instalação
//!
//! Um modelo está "instalado" quando existe `<model_dir>/<nome>.json` com um
//! [`ModelPackage`] válido. O carregamento lê e compila o pacote, e é a etapa
//! mais cara do pipeline: bloqueia a thread até terminar. Carregar o mesmo nome
//! duas vezes produz handles equivalentes e independentes.
//!
//! ## Outros backends
//!
//! Qualquer implementação de [`Tagger`] pode ser embrulhada com
//! [`ModelHandle::from_tagger`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::NerConfig;
use crate::error::{NerError, Result};
use crate::package::ModelPackage;
use crate::rule_based::RuleTagger;

/// Um span como o modelo o emite: `(fragmento, label, início, fim)` em caracteres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSpan {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl RawSpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            start,
            end,
        }
    }
}

/// Contrato de requisição/resposta com o modelo de marcação.
///
/// Implementações só recebem `&self`: um handle carregado é somente leitura e
/// pode ser usado por várias extrações, inclusive em threads diferentes.
pub trait Tagger: Send + Sync {
    /// Marca o texto. Offsets em caracteres, semiabertos.
    fn tag(&self, text: &str) -> Result<Vec<RawSpan>>;

    /// Labels que o modelo pode emitir (vazio se desconhecido).
    fn labels(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Referência a um modelo carregado.
#[derive(Clone)]
pub struct ModelHandle {
    name: String,
    tagger: Arc<dyn Tagger>,
}

impl ModelHandle {
    pub fn from_tagger(name: impl Into<String>, tagger: impl Tagger + 'static) -> Self {
        Self {
            name: name.into(),
            tagger: Arc::new(tagger),
        }
    }

    /// Nome com que o modelo foi carregado.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> Vec<String> {
        self.tagger.labels()
    }

    /// Executa o modelo sobre o texto.
    pub fn extract_spans(&self, text: &str) -> Result<Vec<RawSpan>> {
        self.tagger.tag(text)
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle").field("name", &self.name).finish()
    }
}

/// Localiza e carrega pacotes de modelo de um diretório.
#[derive(Debug, Clone)]
pub struct ModelProvider {
    model_dir: PathBuf,
}

impl ModelProvider {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn from_config(config: &NerConfig) -> Self {
        Self::new(config.model_dir.clone())
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Carrega o modelo `name`.
    ///
    /// Falha com [`NerError::ModelNotFound`] se o nome não for um nome de arquivo
    /// simples, se o pacote não existir ou se for inválido.
    pub fn load(&self, name: &str) -> Result<ModelHandle> {
        let started = Instant::now();
        let path = self.package_path(name)?;

        let raw = std::fs::read_to_string(&path).map_err(|e| {
            NerError::model_not_found(name, format!("não instalado em {} ({e})", self.model_dir.display()))
        })?;
        let package: ModelPackage = serde_json::from_str(&raw)
            .map_err(|e| NerError::model_not_found(name, format!("pacote inválido: {e}")))?;
        if package.name != name {
            warn!(requested = name, package = %package.name, "nome do pacote difere do arquivo");
        }
        let tagger = RuleTagger::compile(&package)
            .map_err(|e| NerError::model_not_found(name, format!("padrão inválido: {e}")))?;

        info!(
            model = name,
            version = %package.version,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "modelo carregado"
        );
        Ok(ModelHandle::from_tagger(name, tagger))
    }

    /// Nomes dos modelos instalados, em ordem alfabética.
    pub fn installed(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.model_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.model_dir.display(), error = %e, "diretório de modelos ilegível");
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }

    fn package_path(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(NerError::model_not_found(name, "nome de modelo inválido"));
        }
        Ok(self.model_dir.join(format!("{name}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn bundled() -> ModelProvider {
        ModelProvider::new(concat!(env!("CARGO_MANIFEST_DIR"), "/models"))
    }

    #[test]
    fn test_load_bundled_models() {
        let provider = bundled();
        assert_eq!(provider.installed(), ["en_core_web_lg", "en_core_web_md", "en_core_web_sm"]);
        for name in provider.installed() {
            let handle = provider.load(&name).unwrap();
            assert_eq!(handle.name(), name);
            assert!(handle.labels().contains(&"PERSON".to_string()));
        }
    }

    #[test]
    fn test_unknown_model() {
        let err = bundled().load("xx_missing_model").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelNotFound);
    }

    #[test]
    fn test_path_like_names_rejected() {
        let provider = bundled();
        for name in ["../en_core_web_sm", "", ".hidden", "a/b"] {
            assert_eq!(provider.load(name).unwrap_err().kind(), ErrorKind::ModelNotFound);
        }
    }

    #[test]
    fn test_invalid_package() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(
            dir.path().join("bad_regex.json"),
            r#"{"name": "bad_regex", "patterns": [{"label": "X", "regex": "("}]}"#,
        )
        .unwrap();

        let provider = ModelProvider::new(dir.path());
        assert_eq!(provider.load("broken").unwrap_err().kind(), ErrorKind::ModelNotFound);
        assert_eq!(provider.load("bad_regex").unwrap_err().kind(), ErrorKind::ModelNotFound);
    }

    #[test]
    fn test_reload_is_equivalent() {
        let provider = bundled();
        let a = provider.load("en_core_web_sm").unwrap();
        let b = provider.load("en_core_web_sm").unwrap();
        let text = "Alice flew from London to Paris.";
        assert_eq!(a.extract_spans(text).unwrap(), b.extract_spans(text).unwrap());
    }

    #[test]
    fn test_missing_dir_lists_nothing() {
        let provider = ModelProvider::new("/definitely/not/here");
        assert!(provider.installed().is_empty());
    }
}
