//! `strided`: command-line runner for the strided async copy conformance suite.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use console::style;
use strided_cli::commands::{InfoCommand, PlanCommand, RunCommand, SweepCommand};
use strided_cli::exit::{EXIT_CONFIG_FAIL, EXIT_SUCCESS, exit_code_for};
use strided_cli::{DeviceSelection, Session, load_configuration};
use strided_common::{ConformanceConfig, LogFormat};
use tracing::error;

/// Strided async copy conformance suite
#[derive(Parser)]
#[command(name = "strided")]
#[command(about = "Conformance tests for strided async work-group copies")]
#[command(version)]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Device: mock, intel-arc, nvidia, amd, embedded or opencl
    #[arg(short, long, global = true, value_name = "PROFILE")]
    profile: Option<DeviceSelection>,

    /// Generate shell completions
    #[arg(long, value_enum)]
    completions: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the conformance sweep
    Run(RunCommand),

    /// Show the geometry planned for one transfer
    Plan(PlanCommand),

    /// List the transfers a sweep would test
    Sweep(SweepCommand),

    /// Show device capabilities
    Info(InfoCommand),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show the default configuration file path
    Path,
    /// Print the default configuration
    Default,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        generate_completions(shell);
        return;
    }

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", style("Configuration error:").red().bold());
            std::process::exit(EXIT_CONFIG_FAIL);
        }
    };

    setup_logging(&config, cli.log_level.as_deref());

    let code = match dispatch(cli, config) {
        Ok(code) => code,
        Err(e) => {
            error!("Command failed: {}", e);

            let mut source = e.source();
            while let Some(err) = source {
                error!("  Caused by: {}", err);
                source = err.source();
            }

            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: Cli, config: ConformanceConfig) -> Result<i32> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(EXIT_SUCCESS);
    };
    if let Commands::Config { action } = &command {
        return handle_config_command(action, &config, cli.config.is_some());
    }

    let session = Session { config, device: DeviceSelection::resolve(cli.profile)? };
    match command {
        Commands::Run(cmd) => cmd.execute(&session),
        Commands::Plan(cmd) => cmd.execute(&session),
        Commands::Sweep(cmd) => cmd.execute(&session),
        Commands::Info(cmd) => cmd.execute(&session),
        Commands::Config { .. } => Ok(EXIT_SUCCESS),
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level, which loses to `--log-level`.
fn setup_logging(config: &ConformanceConfig, log_level_override: Option<&str>) {
    let level = log_level_override.unwrap_or(&config.logging.level);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout carries reports
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match config.logging.format {
        LogFormat::Json => {
            subscriber.json().with_timer(tracing_subscriber::fmt::time::uptime()).init();
        }
        LogFormat::Compact => {
            subscriber.compact().init();
        }
        LogFormat::Pretty => {
            subscriber.pretty().init();
        }
    }
}

/// Generate shell completions
fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn handle_config_command(
    action: &ConfigAction,
    config: &ConformanceConfig,
    explicit_path: bool,
) -> Result<i32> {
    match action {
        ConfigAction::Show => {
            let config_str = config.to_toml().context("Failed to serialize configuration")?;
            println!("{config_str}");
        }
        ConfigAction::Path => {
            let path = ConformanceConfig::default_config_path();
            println!("{}", path.display());
            if explicit_path {
                println!("{}", style("(overridden by --config for this invocation)").dim());
            }
        }
        ConfigAction::Default => {
            println!("{}", ConformanceConfig::default_toml()?);
        }
    }
    Ok(EXIT_SUCCESS)
}
