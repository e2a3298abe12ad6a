//! pjctl: command-line control for JVC projectors.
//!
//! # Usage
//!
//! ```text
//! pjctl [OPTIONS] <COMMAND>
//!
//! Commands:
//!   exec         Send "name,value" commands, e.g. `pjctl exec "enhance,seven"`
//!   power        Turn the projector on or off
//!   status       Print the power state
//!   info         Toggle the on-screen info panel
//!   low-latency  Set or read low latency mode
//!   query        Print the raw value of a reference command
//!   preset       Apply a named picture preset
//!   commands     List known commands, or the values of one command
//! ```
//!
//! # Where settings come from
//!
//! Lowest to highest precedence:
//!
//! 1. Built-in defaults (port 20554, 1000 ms between commands).
//! 2. The TOML config file (`--config`, or the platform config directory).
//! 3. Environment variables (`PJCTL_HOST`, `PJCTL_PORT`, ...).
//! 4. Command-line flags.
//!
//! Logging goes to stderr.  `RUST_LOG` overrides the `log_level` from the
//! config file.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pjctl_client::infrastructure::storage::config::{
    config_file_path, load_config_from, AppConfig, ProjectorConfig,
};
use pjctl_client::{Preset, ProtocolClient};
use pjctl_core::{Command, CommandKind, JvcRegistry};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Control a JVC projector over its TCP control port.
#[derive(Debug, Parser)]
#[command(name = "pjctl", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "PJCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Projector hostname or IP address.
    #[arg(long, env = "PJCTL_HOST")]
    host: Option<String>,

    /// Projector control port.
    #[arg(long, env = "PJCTL_PORT")]
    port: Option<u16>,

    /// Network password (NZ series only).
    #[arg(long, env = "PJCTL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Minimum delay between commands, in milliseconds.
    #[arg(long, env = "PJCTL_DELAY_MS")]
    delay_ms: Option<u64>,

    /// Connect and handshake timeout, in seconds.
    #[arg(long, env = "PJCTL_CONNECT_TIMEOUT")]
    connect_timeout: Option<u64>,

    /// Ack and value read timeout, in seconds.
    #[arg(long, env = "PJCTL_COMMAND_TIMEOUT")]
    command_timeout: Option<u64>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Send one or more "name,value" commands, in order.
    Exec {
        #[arg(required = true, value_name = "NAME,VALUE")]
        commands: Vec<String>,

        /// Open a new connection for every command.
        #[arg(long)]
        separate: bool,
    },
    /// Turn the projector on or off.
    Power { state: Toggle },
    /// Print the power state.
    Status,
    /// Toggle the on-screen info panel.
    Info,
    /// Set low latency mode, or print it when no state is given.
    LowLatency { state: Option<Toggle> },
    /// Print the value of a reference command with protocol markers removed.
    Query { name: String },
    /// Apply a picture preset: gaming-hdr, gaming-sdr, hdr-picture, sdr-picture.
    Preset { name: Preset },
    /// List command names, or the values accepted by NAME.
    Commands { name: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn as_value(self) -> &'static str {
        match self {
            Toggle::On => "on",
            Toggle::Off => "off",
        }
    }
}

impl Cli {
    /// Loads the config file named by `--config`, or the default one.
    ///
    /// A missing default file is not an error.
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => match config_file_path() {
                Ok(path) => path,
                Err(_) => return Ok(AppConfig::default()),
            },
        };
        load_config_from(&path).with_context(|| format!("loading {}", path.display()))
    }

    /// Overwrites the file settings with any flags given on the command line.
    fn apply_overrides(&self, projector: &mut ProjectorConfig) {
        if let Some(host) = &self.host {
            projector.host = host.clone();
        }
        if let Some(port) = self.port {
            projector.port = port;
        }
        if let Some(password) = &self.password {
            projector.password = Some(password.clone());
        }
        if let Some(delay_ms) = self.delay_ms {
            projector.delay_ms = delay_ms;
        }
        if let Some(secs) = self.connect_timeout {
            projector.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.command_timeout {
            projector.command_timeout_secs = secs;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = cli.load_config()?;
    cli.apply_overrides(&mut config.projector);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("using projector at {}:{}", config.projector.host, config.projector.port);

    if let CliCommand::Commands { name } = &cli.command {
        return list_commands(name.as_deref());
    }

    let session = config
        .projector
        .to_session_config()
        .context("invalid projector settings")?;
    let mut client = ProtocolClient::new(session);
    run(cli.command, &mut client)
}

fn run(command: CliCommand, client: &mut ProtocolClient) -> anyhow::Result<()> {
    match command {
        CliCommand::Exec { commands, separate } => {
            let commands = parse_commands(&commands)?;
            if separate {
                client.execute_many(&commands)?;
            } else {
                client.execute_sequence(&commands)?;
            }
        }
        CliCommand::Power { state: Toggle::On } => client.power_on()?,
        CliCommand::Power { state: Toggle::Off } => client.power_off()?,
        CliCommand::Status => println!("{}", client.power_state()),
        CliCommand::Info => client.info()?,
        CliCommand::LowLatency { state: Some(state) } => {
            client.execute_one("low_latency", state.as_value(), CommandKind::Operation)?;
            info!("low latency {}", state.as_value());
        }
        CliCommand::LowLatency { state: None } => {
            let on = client
                .query_boolean_state("low_latency")
                .context("reading low latency state")?;
            println!("{}", if on { "on" } else { "off" });
        }
        CliCommand::Query { name } => {
            let value = client.query(&name)?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        CliCommand::Preset { name } => client.apply_preset(name)?,
        CliCommand::Commands { name } => list_commands(name.as_deref())?,
    }
    Ok(())
}

/// Parses `"name,value"` arguments, reporting the first malformed one.
fn parse_commands(raw: &[String]) -> anyhow::Result<Vec<Command>> {
    raw.iter()
        .map(|arg| {
            Command::parse_operation(arg)
                .with_context(|| format!("expected NAME,VALUE but got '{arg}'"))
        })
        .collect()
}

fn list_commands(name: Option<&str>) -> anyhow::Result<()> {
    let registry = JvcRegistry::new();
    match name {
        None => {
            for command in registry.command_names() {
                println!("{command}");
            }
        }
        Some(name) => {
            let Some(values) = registry.value_names(name) else {
                bail!("unknown command '{name}'; run `pjctl commands` for the list");
            };
            for value in values {
                println!("{name},{value}");
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
