//! # Pacote de Modelo
//!
//! Formato em disco de um modelo instalável: um arquivo JSON `<nome>.json` no
//! diretório de modelos, com gazetteers por label, palavras-gatilho, sufixos de
//! organização e padrões regex.
//!
//! ```json
//! {
//!   "name": "en_core_web_sm",
//!   "version": "1.0.0",
//!   "gazetteer": { "GPE": ["Paris", "New York"], "PERSON": ["Alice"] },
//!   "titles": { "PERSON": ["mr", "dr", "president"] },
//!   "org_suffixes": ["inc", "corp"],
//!   "patterns": [{ "label": "DATE", "regex": "\\b(19|20)\\d{2}\\b" }]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPackage {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub description: String,
    /// label → nomes conhecidos (podem ter várias palavras)
    #[serde(default)]
    pub gazetteer: BTreeMap<String, Vec<String>>,
    /// label → palavras que precedem um nome com esse label ("mr" → PERSON)
    #[serde(default)]
    pub titles: BTreeMap<String, Vec<String>>,
    /// Sufixos que fecham um nome de organização ("inc", "ltd")
    #[serde(default)]
    pub org_suffixes: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<PatternRule>,
}

/// Um padrão regex aplicado sobre o texto bruto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub label: String,
    pub regex: String,
}

fn default_lang() -> String {
    "en".to_string()
}

impl ModelPackage {
    /// Todos os labels que o pacote pode emitir, ordenados.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .gazetteer
            .keys()
            .chain(self.titles.keys())
            .cloned()
            .chain(self.patterns.iter().map(|p| p.label.clone()))
            .collect();
        if !self.org_suffixes.is_empty() {
            labels.push("ORG".to_string());
        }
        labels.sort();
        labels.dedup();
        labels
    }
}
