//! policy-summa CLI - insurance document summarisation
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use policy_summa::{pipeline, report, schema, Config, GeminiClient, Pipeline, Session, Upload};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "policy-summa")]
#[command(author, version, about = "Summarise insurance documents with Gemini", long_about = None)]
struct Cli {
    /// Path to a summa.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a .txt or .pdf insurance document
    Summarise {
        /// Document to summarise
        file: PathBuf,
        /// Declared MIME type, instead of guessing from the extension
        #[arg(long)]
        mime: Option<String>,
        /// Show the extracted text instead of summarising it
        #[arg(long)]
        raw: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the response schema sent to the model
    Schema {
        /// Print the JSON Schema of the summary output instead
        #[arg(long)]
        json_schema: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,policy_summa=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Summarise {
            file,
            mime,
            raw,
            json,
        } => {
            // A missing key is fatal, so check it before touching the document.
            let client = if raw {
                None
            } else {
                let config = load_config(cli.config.as_deref())?;
                Some(GeminiClient::from_config(&config)?)
            };

            let upload = Upload::from_path(&file, mime.as_deref())?;

            let Some(client) = client else {
                return Ok(match pipeline::prepare(&upload) {
                    Ok(text) => {
                        println!("{text}");
                        eprintln!("--- Extracted {} characters ---", text.len());
                        ExitCode::SUCCESS
                    }
                    Err(failure) => {
                        eprintln!("{}", report::render_failure(&failure));
                        ExitCode::FAILURE
                    }
                });
            };

            eprintln!("Summarising {}...", upload.name);
            let session = Session::new();
            let pipeline = Pipeline::new(client);
            let outcome = session.summarize(&pipeline, &upload).await;

            match &*outcome {
                Ok(result) if json => println!("{}", serde_json::to_string_pretty(result)?),
                Ok(result) => print!("{}", report::render_summary(result)),
                Err(failure) => {
                    eprintln!("{}", report::render_failure(failure));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Schema { json_schema } => {
            let value = if json_schema {
                serde_json::to_value(schemars::schema_for!(policy_summa::SummaryResult))?
            } else {
                schema::RESPONSE_SCHEMA.clone()
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "policy-summa",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
