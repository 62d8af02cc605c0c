use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use summary_pulse::{
    config::{
        GenerationSettings, PricingTable, SummarizerConfig, TargetWordTable, DEFAULT_CHARGE_PRICE,
        DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
    },
    openrouter::{OpenRouterClient, OpenRouterConfig, DEFAULT_BASE_URL},
    tracing::init_tracing_subscriber,
    types::InputRecord,
    SummaryProcessorBuilder,
};
use summary_store::{DataStore, FsDataStore};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "summary-pulse", about = "Single-document text summarizer")]
struct Cli {
    /// JSON pricing table override: { "<model>": { "input": f64, "output": f64 } }
    #[arg(long, env = "SUMMARY_PRICING_PATH")]
    pricing_file: Option<PathBuf>,

    /// Amount billed per successful invocation
    #[arg(long, env = "SUMMARY_CHARGE_PRICE", default_value_t = DEFAULT_CHARGE_PRICE)]
    charge_price: f64,

    /// Model used when the input record names none
    #[arg(long, env = "SUMMARY_DEFAULT_MODEL", default_value = DEFAULT_MODEL)]
    default_model: String,

    /// Target words for `short` summaries
    #[arg(long, default_value_t = 75)]
    short_words: u32,

    /// Target words for `medium` summaries
    #[arg(long, default_value_t = 175)]
    medium_words: u32,

    /// Target words for `long` summaries
    #[arg(long, default_value_t = 350)]
    long_words: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize one input record and push the result to the dataset
    Run(RunArgs),
    /// Print the effective pricing table and exit
    Pricing,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the JSON input record, `-` reads stdin
    #[arg(long, env = "SUMMARY_INPUT_PATH", default_value = "-")]
    input: String,

    /// Directory of the output dataset
    #[arg(long, env = "SUMMARY_DATASET_DIR", default_value = "./storage/datasets/default")]
    dataset_dir: PathBuf,

    /// OpenRouter API key, used when the input record carries none
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_api_key: Option<String>,

    /// Provider API base URL
    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout of the model call
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Retries for transient transport failures
    #[arg(long, default_value_t = 0)]
    max_retries: u32,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    system_prompt: String,

    /// Sent as `HTTP-Referer` to identify the calling application
    #[arg(long, env = "OPENROUTER_REFERER")]
    referer: Option<String>,

    /// Sent as `X-Title` to identify the calling application
    #[arg(long, env = "OPENROUTER_TITLE")]
    title: Option<String>,
}

fn summarizer_config(cli: &Cli) -> anyhow::Result<SummarizerConfig> {
    let pricing = match &cli.pricing_file {
        Some(path) => PricingTable::from_json_file(path)?,
        None => PricingTable::default(),
    };

    Ok(SummarizerConfig {
        target_words: TargetWordTable {
            short: cli.short_words,
            medium: cli.medium_words,
            long: cli.long_words,
        },
        pricing,
        charge_price: cli.charge_price,
        default_model: cli.default_model.clone(),
    })
}

async fn read_input(source: &str) -> anyhow::Result<InputRecord> {
    let raw = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read input record from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read input record from {source}"))?
    };

    serde_json::from_str(&raw).context("Input record is not valid JSON")
}

async fn run(config: SummarizerConfig, args: RunArgs) -> anyhow::Result<()> {
    let mut input = read_input(&args.input).await?;
    if input.openrouter_api_key.is_none() {
        input.openrouter_api_key = args.openrouter_api_key;
    }

    let client = OpenRouterClient::new(OpenRouterConfig {
        base_url: args.base_url,
        timeout: Duration::from_secs(args.timeout_secs),
        max_retries: args.max_retries,
        referer: args.referer,
        title: args.title,
        generation: GenerationSettings {
            system_prompt: args.system_prompt,
            temperature: args.temperature,
            max_tokens: args.max_tokens,
        },
    })?;

    let processor = SummaryProcessorBuilder::new()
        .config(config)
        .gateway(client)
        .build();

    let request = processor.prepare(input)?;
    let store = FsDataStore::init(&args.dataset_dir).await?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let result = processor.run_with_cancellation(&request, cancel).await?;

    store.push_record(&result).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = summarizer_config(&cli)?;

    match cli.command {
        Command::Run(args) => {
            tracing::info!(dataset = ?args.dataset_dir, "Running summarizer...");
            run(config, args)
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Summarization failed"))?;
        }
        Command::Pricing => {
            println!("{}", serde_json::to_string_pretty(&config.pricing)?);
        }
    }

    Ok(())
}
