use anyhow::{Result, bail};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};

use sitemark::{
    cleaner::DEFAULT_MAX_CHUNK_SIZE,
    config::Config,
    llm::{ClaudeClient, CompletionModel},
    runs::{CleanOptions, CleanRun},
};

#[derive(Parser)]
#[command(name = "sitemark-clean")]
#[command(about = "Clean markdown files with a hosted language model")]
struct Cli {
    /// Input markdown file or directory path
    #[arg(long)]
    input: PathBuf,

    /// Output file path (default: parallel output_clean directory)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip processing if output file already exists
    #[arg(long)]
    skip_existing: bool,

    /// Number of parallel workers
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Model to clean with (overrides CLEAN_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Largest chunk, in characters, sent to the model at once
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_SIZE)]
    max_chunk_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    sitemark::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?.with_clean_model(cli.model);
    let model: Arc<dyn CompletionModel> = Arc::new(ClaudeClient::from_config(&config)?);

    let run = CleanRun::new(CleanOptions {
        input: cli.input,
        output: cli.output,
        skip_existing: cli.skip_existing,
        workers: cli.workers,
        max_chunk_size: cli.max_chunk_size.max(1),
    })
    .with_ctrl_c();

    let summary = run.execute(model).await?;
    if summary.failed > 0 {
        bail!("{} of {} files failed", summary.failed, summary.total());
    }
    Ok(())
}
