use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coderunner_core::tools::clean_generated_code;
use coderunner_core::{ConfigLoader, RunnerConfig, SandboxRunner};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[clap(name = "coderunner", author, version = "0.1.0", about = "Run code once in a disposable container")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(
        long,
        short,
        global = true,
        help = "YAML configuration file; environment variables still override it"
    )]
    config: Option<PathBuf>,

    #[clap(long, short, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a script in the sandbox and print its output
    Run {
        #[clap(help = "Script file to run, or '-' to read from stdin", default_value = "-")]
        file: String,

        #[clap(long, help = "Override the container image")]
        image: Option<String>,

        #[clap(long, help = "Override the timeout in seconds")]
        timeout: Option<u64>,

        #[clap(long, help = "Strip Markdown code fences before running")]
        clean: bool,
    },
    /// Check that the container engine is reachable
    Check,
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .target(env_logger::Target::Stderr)
        .init();

    match run_cli(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(cli: Cli) -> Result<ExitCode> {
    let mut config = ConfigLoader::from_source(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            file,
            image,
            timeout,
            clean,
        } => {
            apply_overrides(&mut config, image, timeout)?;
            let code = read_code(&file).await?;
            let code = if clean { clean_generated_code(&code) } else { code };

            let runner = SandboxRunner::docker(&config)?;
            let result = runner.run(&code, None).await;
            print!("{}", result);

            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Check => {
            let runner = SandboxRunner::docker(&config)?;
            if runner.engine().is_available().await {
                println!("Container engine is reachable");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Container engine is not reachable");
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_overrides(config: &mut RunnerConfig, image: Option<String>, timeout: Option<u64>) -> Result<()> {
    if let Some(image) = image {
        config.image = image;
    }
    if let Some(timeout) = timeout {
        config.timeout = timeout;
    }
    config.validate()?;
    Ok(())
}

async fn read_code(file: &str) -> Result<String> {
    if file == "-" {
        let mut code = String::new();
        tokio::io::stdin()
            .read_to_string(&mut code)
            .await
            .context("Failed to read code from stdin")?;
        Ok(code)
    } else {
        tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read script {}", file))
    }
}
