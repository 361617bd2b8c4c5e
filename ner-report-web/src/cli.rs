//! Argumentos de linha de comando.
//!
//! Argumentos têm precedência sobre as variáveis de ambiente lidas por
//! [`NerConfig::from_env`].

use std::path::PathBuf;

use clap::Parser;
use ner_report::NerConfig;

/// Diretório de modelos distribuído junto com o workspace
const BUNDLED_MODEL_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../ner-report/models");

#[derive(Debug, Clone, Parser)]
#[command(name = "ner-report-web", version, about = "Servidor web para análise de entidades nomeadas")]
pub struct Args {
    /// Endereço de escuta
    #[arg(long, env = "NER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Porta HTTP
    #[arg(short, long, env = "NER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Diretório com os pacotes de modelo (`<nome>.json`) [env: NER_MODEL_DIR]
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Modelo usado quando a requisição não escolhe nenhum [env: NER_DEFAULT_MODEL]
    #[arg(long, value_name = "NAME")]
    pub default_model: Option<String>,

    /// Diretório onde entities.csv / entities.json são gravados [env: NER_EXPORT_DIR]
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

impl Args {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Combina argumentos, ambiente e padrões.
    pub fn to_config(&self) -> NerConfig {
        let mut config = NerConfig::from_env();
        if let Some(dir) = &self.model_dir {
            config.model_dir = dir.clone();
        }
        if let Some(model) = &self.default_model {
            config.default_model = model.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = dir.clone();
        }
        // fora do workspace, o diretório relativo padrão pode não existir
        if !config.model_dir.exists() {
            config.model_dir = PathBuf::from(BUNDLED_MODEL_DIR);
        }
        config
    }
}
