//! # Exportação
//!
//! Grava a tabela em `entities.csv` ou `entities.json` (JSON delimitado por
//! linha). Os nomes são fixos e um arquivo existente é **sobrescrito sem aviso**;
//! quem precisar preservar uma exportação anterior deve copiá-la logo após a
//! chamada.
//!
//! A escrita é atômica: o conteúdo vai para um arquivo temporário no mesmo
//! diretório e só então é renomeado sobre o destino. Uma falha no meio do
//! caminho deixa o arquivo anterior intacto.
//!
//! Exportações concorrentes para o mesmo diretório não são coordenadas: vence
//! a última a renomear.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ExportError, Result};
use crate::report::EntityTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Nome fixo do arquivo de saída.
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "entities.csv",
            ExportFormat::Json => "entities.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    /// Aceita `csv` e `json` sem diferenciar maiúsculas; qualquer outro valor
    /// vira [`ExportError::UnsupportedFormat`] com o texto original.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Destino de exportação: um diretório onde os nomes fixos são gravados.
#[derive(Debug, Clone)]
pub struct ExportSink {
    dir: PathBuf,
}

impl ExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Destino no diretório de trabalho atual.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Exporta a tabela no formato dado por texto (`"csv"` / `"json"`).
    pub fn export(&self, table: &EntityTable, format: &str) -> Result<PathBuf> {
        let format: ExportFormat = format.parse()?;
        self.export_as(table, format)
    }

    /// Exporta a tabela em um formato já validado.
    pub fn export_as(&self, table: &EntityTable, format: ExportFormat) -> Result<PathBuf> {
        let path = self.dir.join(format.file_name());

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| ExportError::io(&self.dir, e))?;
        let tmp_path = tmp.path().to_path_buf();
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            match format {
                ExportFormat::Csv => write_csv(&mut writer, table)?,
                ExportFormat::Json => write_json_lines(&mut writer, table)?,
            }
            writer.flush().map_err(|e| ExportError::io(&tmp_path, e))?;
        }
        tmp.as_file().sync_all().map_err(|e| ExportError::io(&tmp_path, e))?;
        // em caso de erro o NamedTempFile devolvido é descartado e apaga o temporário
        tmp.persist(&path).map_err(|e| ExportError::io(&path, e.error))?;

        info!(path = %path.display(), format = %format, rows = table.len(), "entidades exportadas");
        Ok(path)
    }
}

/// Exporta para o diretório de trabalho atual, sobrescrevendo o arquivo fixo.
pub fn export(table: &EntityTable, format: &str) -> Result<PathBuf> {
    ExportSink::current_dir().export(table, format)
}

fn write_csv<W: Write>(writer: W, table: &EntityTable) -> std::result::Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    // cabeçalho explícito: com a tabela vazia o serde não escreveria nenhum
    csv.write_record(crate::report::COLUMNS)?;
    for row in table.rows() {
        csv.serialize(row)?;
    }
    csv.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

fn write_json_lines<W: Write>(mut writer: W, table: &EntityTable) -> std::result::Result<(), ExportError> {
    for row in table.rows() {
        serde_json::to_writer(&mut writer, &row)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, NerError};
    use crate::extractor::EntityRecord;
    use crate::report::{to_table, EntityRow};

    fn sample() -> EntityTable {
        to_table(vec![
            EntityRecord::new("Paris", "GPE", 0, 5),
            EntityRecord::new("Alice", "PERSON", 10, 15),
        ])
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = ExportSink::new(dir.path()).export(&sample(), "csv").unwrap();
        assert_eq!(path, dir.path().join("entities.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next(), Some("Entity,Label,Start Char,End Char"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<EntityRow> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows, sample().rows());
    }

    #[test]
    fn test_json_lines_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = ExportSink::new(dir.path()).export(&sample(), "json").unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(
            first,
            serde_json::json!({"Entity": "Paris", "Label": "GPE", "Start Char": 0, "End Char": 5})
        );
        let second: EntityRow = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.entity, "Alice");
        assert_eq!(second.end_char, 15);
    }

    #[test]
    fn test_csv_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let table = to_table(vec![EntityRecord::new("Smith, \"Jr\"", "PERSON", 0, 11)]);
        let path = ExportSink::new(dir.path()).export(&table, "CSV").unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().nth(1), Some("\"Smith, \"\"Jr\"\"\",PERSON,0,11"));
    }

    #[test]
    fn test_unsupported_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExportSink::new(dir.path()).export(&sample(), "xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Export);
        assert!(matches!(err, NerError::Export(ExportError::UnsupportedFormat(ref f)) if f == "xml"));
        assert!(!dir.path().join("entities.csv").exists());
        assert!(!dir.path().join("entities.json").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ExportSink::new(dir.path());
        sink.export(&sample(), "json").unwrap();
        let single = to_table(vec![EntityRecord::new("Bob", "PERSON", 0, 3)]);
        let path = sink.export(&single, "json").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("Bob"));
        // apenas o arquivo final, sem temporários
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ExportSink::new(dir.path().join("nope"));
        let err = sink.export(&sample(), "csv").unwrap_err();
        assert!(matches!(err, NerError::Export(ExportError::Io { .. })));
    }

    #[test]
    fn test_failed_persist_leaves_previous_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ExportSink::new(dir.path());
        let csv_path = sink.export(&sample(), "csv").unwrap();
        let before = std::fs::read_to_string(&csv_path).unwrap();

        // o destino do JSON é um diretório não vazio: o rename final falha
        let blocked = dir.path().join("entities.json");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep.txt"), "x").unwrap();

        let err = sink.export(&sample(), "json").unwrap_err();
        assert!(matches!(err, NerError::Export(ExportError::Io { ref path, .. }) if *path == blocked));

        assert_eq!(std::fs::read_to_string(&csv_path).unwrap(), before);
        assert_eq!(std::fs::read_to_string(blocked.join("keep.txt")).unwrap(), "x");
        let leftovers: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temporários restantes: {leftovers:?}");
    }

    #[test]
    fn test_empty_table_exports() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ExportSink::new(dir.path());
        let empty = to_table(Vec::new());

        let csv = std::fs::read_to_string(sink.export(&empty, "csv").unwrap()).unwrap();
        assert_eq!(csv, "Entity,Label,Start Char,End Char\n");
        let json = std::fs::read_to_string(sink.export(&empty, "json").unwrap()).unwrap();
        assert!(json.is_empty());
    }
}
