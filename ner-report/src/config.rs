//! Configuração do pipeline.
//!
//! Valores padrão podem ser sobrescritos por variáveis de ambiente:
//!
//! | Variável            | Campo           | Padrão            |
//! |---------------------|-----------------|-------------------|
//! | `NER_MODEL_DIR`     | `model_dir`     | `models`          |
//! | `NER_DEFAULT_MODEL` | `default_model` | `en_core_web_sm`  |
//! | `NER_EXPORT_DIR`    | `export_dir`    | `.` (diretório atual) |

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Nomes de modelo sugeridos na interface.
pub const SUGGESTED_MODELS: &[&str] = &["en_core_web_sm", "en_core_web_md", "en_core_web_lg"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerConfig {
    /// Diretório onde ficam os pacotes de modelo (`<nome>.json`).
    pub model_dir: PathBuf,
    /// Modelo usado quando a requisição não escolhe nenhum.
    pub default_model: String,
    /// Diretório onde `entities.csv` / `entities.json` são gravados.
    pub export_dir: PathBuf,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            default_model: SUGGESTED_MODELS[0].to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl NerConfig {
    /// Carrega a configuração padrão aplicando as variáveis de ambiente presentes.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply(|key| env::var(key).ok());
        config
    }

    fn apply(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("NER_MODEL_DIR").filter(|v| !v.is_empty()) {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup("NER_DEFAULT_MODEL").filter(|v| !v.is_empty()) {
            self.default_model = model;
        }
        if let Some(dir) = lookup("NER_EXPORT_DIR").filter(|v| !v.is_empty()) {
            self.export_dir = PathBuf::from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = NerConfig::default();
        assert_eq!(config.default_model, "en_core_web_sm");
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NER_MODEL_DIR", "/opt/models"),
            ("NER_DEFAULT_MODEL", "en_core_web_lg"),
            ("NER_EXPORT_DIR", ""),
        ]
        .into_iter()
        .collect();

        let mut config = NerConfig::default();
        config.apply(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.model_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.default_model, "en_core_web_lg");
        // valor vazio é ignorado
        assert_eq!(config.export_dir, PathBuf::from("."));
    }
}
