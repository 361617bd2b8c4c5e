//! # Relatório de Entidades
//!
//! Converte os registros em uma tabela de colunas fixas
//! (`Entity`, `Label`, `Start Char`, `End Char`) e conta as ocorrências de cada
//! label. A mesma linha serializada ([`EntityRow`]) alimenta a exportação CSV e
//! JSON, então o esquema é idêntico nos dois formatos.

use serde::{Deserialize, Serialize};

use crate::extractor::EntityRecord;

/// Nomes das colunas, na ordem de exportação.
pub const COLUMNS: [&str; 4] = ["Entity", "Label", "Start Char", "End Char"];

/// Uma linha da tabela, com os nomes de coluna externos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRow {
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Start Char")]
    pub start_char: usize,
    #[serde(rename = "End Char")]
    pub end_char: usize,
}

impl From<&EntityRecord> for EntityRow {
    fn from(record: &EntityRecord) -> Self {
        Self {
            entity: record.text.clone(),
            label: record.label.clone(),
            start_char: record.start_offset,
            end_char: record.end_offset,
        }
    }
}

/// Sequência ordenada de entidades, na ordem de emissão do modelo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTable {
    records: Vec<EntityRecord>,
}

impl EntityTable {
    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.iter()
    }

    /// Linhas prontas para serialização.
    pub fn rows(&self) -> Vec<EntityRow> {
        self.records.iter().map(EntityRow::from).collect()
    }
}

impl<'a> IntoIterator for &'a EntityTable {
    type Item = &'a EntityRecord;
    type IntoIter = std::slice::Iter<'a, EntityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Monta a tabela. Reorganização puramente estrutural: mesma ordem, um para um.
pub fn to_table(records: Vec<EntityRecord>) -> EntityTable {
    EntityTable { records }
}

/// Contagem de entidades por label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelStatistics {
    /// (label, contagem) na ordem da primeira aparição do label na tabela
    counts: Vec<LabelCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelStatistics {
    pub fn get(&self, label: &str) -> Option<usize> {
        self.counts.iter().find(|c| c.label == label).map(|c| c.count)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.counts.iter().map(|c| c.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelCount> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Soma das contagens (igual ao tamanho da tabela de origem).
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// Contagens em ordem decrescente; empates mantêm a ordem de aparição.
    pub fn by_count(&self) -> Vec<LabelCount> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }
}

/// Conta as ocorrências de cada label distinto. Tabela vazia → estatística vazia.
pub fn label_statistics(table: &EntityTable) -> LabelStatistics {
    let mut counts: Vec<LabelCount> = Vec::new();
    for record in table {
        match counts.iter_mut().find(|c| c.label == record.label) {
            Some(entry) => entry.count += 1,
            None => counts.push(LabelCount {
                label: record.label.clone(),
                count: 1,
            }),
        }
    }
    LabelStatistics { counts }
}
