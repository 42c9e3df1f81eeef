//! Interface de linha de comando do exporter baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (run, once, show)
//! e flags globais de conexão. Flags omitidas caem no arquivo de
//! configuração ou nos defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::selector::SelectionPolicy;

/// Discover unique Oozie workflow jobs and push their status to a Pushgateway.
#[derive(Debug, Parser)]
#[command(name = "oozie-exporter", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Nome DNS ou endereço IP do host Oozie [default: localhost].
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Porta do servidor Oozie [default: 11000].
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Profundidade do histórico de jobs, em dias [default: 0].
    #[arg(short, long, global = true)]
    pub depth: Option<u32>,

    /// Pausa entre ciclos, em segundos [default: 300].
    #[arg(short = 'D', long, global = true)]
    pub delay: Option<u64>,

    /// Pushgateway address as host:port [default: localhost:9091].
    #[arg(long, global = true)]
    pub pushgateway: Option<String>,

    /// Regra para escolher um job entre execuções do mesmo workflow.
    #[arg(long, value_enum, global = true)]
    pub selection: Option<SelectionPolicy>,

    /// Caminho para um arquivo de configuração TOML [default: ./oozie-exporter.toml].
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita logs de debug (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Faz polling e push para sempre, pausando entre ciclos (padrão).
    Run,

    /// Executa um único ciclo e sai; código de saída não-zero em falha.
    Once,

    /// Busca e imprime as métricas derivadas sem enviá-las.
    Show,
}
