//! Configuração do exporter carregada a partir de `oozie-exporter.toml`.
//!
//! A struct [`ExporterConfig`] contém todos os parâmetros configuráveis.
//! Chaves ausentes no arquivo usam defaults. A variável de ambiente
//! `OOZIE_EXPORTER_PUSHGATEWAY` tem precedência sobre o endereço do arquivo,
//! e as flags da CLI têm precedência sobre tudo. Lida uma vez na inicialização.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::cli::Cli;
use crate::selector::SelectionPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "oozie-exporter.toml";
pub const PUSHGATEWAY_ENV: &str = "OOZIE_EXPORTER_PUSHGATEWAY";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    /// Nome DNS ou endereço IP do host Oozie.
    #[serde(default = "default_server")]
    pub server: String,

    /// Porta do servidor Oozie.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Profundidade do histórico, em dias, para a consulta de jobs.
    #[serde(default)]
    pub depth: u32,

    /// Pausa entre ciclos de polling, em segundos.
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// `host:port` do Prometheus Pushgateway.
    #[serde(default = "default_pushgateway")]
    pub pushgateway: String,

    /// Máximo de jobs pedidos por consulta (parâmetro `len`).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub selection: SelectionPolicy,

    /// Registra e pula um ciclo cuja consulta não retornou jobs, em vez de falhar.
    #[serde(default = "default_skip_empty")]
    pub skip_empty: bool,
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    11000
}

fn default_delay() -> u64 {
    300
}

fn default_pushgateway() -> String {
    "localhost:9091".to_string()
}

fn default_page_size() -> u32 {
    10000
}

fn default_skip_empty() -> bool {
    true
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            depth: 0,
            delay: default_delay(),
            pushgateway: default_pushgateway(),
            page_size: default_page_size(),
            selection: SelectionPolicy::default(),
            skip_empty: default_skip_empty(),
        }
    }
}

impl ExporterConfig {
    /// Carrega `path`, ou `oozie-exporter.toml` no diretório atual quando
    /// nenhum caminho é dado. Só o arquivo padrão implícito pode faltar.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(addr) = std::env::var(PUSHGATEWAY_ENV) {
            if !addr.is_empty() {
                config.pushgateway = addr;
            }
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str::<ExporterConfig>(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Aplica as flags da linha de comando sobre os valores carregados.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server = server.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(depth) = cli.depth {
            self.depth = depth;
        }
        if let Some(delay) = cli.delay {
            self.delay = delay;
        }
        if let Some(pushgateway) = &cli.pushgateway {
            self.pushgateway = pushgateway.clone();
        }
        if let Some(selection) = cli.selection {
            self.selection = selection;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("server must not be empty");
        }
        if self.pushgateway.trim().is_empty() {
            bail!("pushgateway address must not be empty");
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(())
    }
}
