use anyhow::Context;
use clap::{Parser, Subcommand};
use message_bridge::config::config_search_paths;
use message_bridge::diagnostics::DiagnosticLog;
use message_bridge::{encode_for, ingest_message, BridgeConfig, Diagnostics, IngestOptions, Provider};
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "message-bridge",
    about = "Translate chat messages between OpenAI, Anthropic, Google and Cohere formats",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append diagnostics to this JSONL file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest OpenAI-shaped messages and encode them for a provider
    Encode {
        /// Target protocol: openai, anthropic, google or cohere
        #[arg(short, long)]
        provider: String,

        /// JSON file holding one message object or an array of them (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long)]
        user_ref: String,

        #[arg(long)]
        agent_ref: String,

        /// Model that produced the messages
        #[arg(long)]
        model: Option<String>,

        /// Accept the deprecated `function` role and `function_call` field
        #[arg(long)]
        allow_functions_style: bool,

        /// Correlation id for deprecated messages that lack one
        #[arg(long)]
        tool_call_id: Option<String>,
    },
    /// Print the effective configuration
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "message_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let config = BridgeConfig::find_and_load(cli.config.as_deref())?;

    match cli.command {
        Some(Command::ShowConfig) => {
            print!("{}", config.to_toml()?);
        }
        Some(Command::Encode {
            provider,
            input,
            user_ref,
            agent_ref,
            model,
            allow_functions_style,
            tool_call_id,
        }) => {
            let provider: Provider = provider.parse()?;

            let mut opts = IngestOptions::new(user_ref, agent_ref)
                .allow_functions_style(allow_functions_style || config.ingest.allow_functions_style);
            opts.model = model;
            opts.tool_call_id = tool_call_id;

            let raw = read_input(input.as_ref())?;
            let payloads = match raw {
                serde_json::Value::Array(items) => items,
                single => vec![single],
            };

            let mut diagnostics = Diagnostics::new();
            let mut encoded = Vec::with_capacity(payloads.len());
            for (index, payload) in payloads.iter().enumerate() {
                let record = ingest_message(payload, &opts, &mut diagnostics)
                    .with_context(|| format!("message {index} could not be ingested"))?;
                let wire = encode_for(provider, &record, &config, &mut diagnostics)
                    .with_context(|| format!("message {index} could not be encoded for {provider}"))?;
                encoded.push(wire);
            }

            for d in diagnostics.warnings() {
                warn!(component = %d.component, "{}", d.message);
            }
            if let Some(ref path) = cli.log_file {
                diagnostics.info(
                    "cli",
                    format!("encoded {} message(s) for {provider}", encoded.len()),
                );
                let mut log = DiagnosticLog::open(path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                log.append_all(diagnostics.entries())?;
                info!(path = %log.path().display(), entries = diagnostics.len(), "Wrote diagnostics");
            }

            info!(provider = %provider, messages = encoded.len(), "Encoded");
            println!("{}", serde_json::to_string_pretty(&encoded)?);
        }
        None => {
            anyhow::bail!("no command given; try `message-bridge encode --help`");
        }
    }

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<serde_json::Value> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}
