use anyhow::{Result, bail};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};

use sitemark::{
    article::{ArticleClient, ArticleSource},
    config::Config,
    runs::{DownloadOptions, DownloadRun},
    sitemap::loader::DEFAULT_MAX_DEPTH,
};

#[derive(Parser)]
#[command(name = "sitemark-download")]
#[command(about = "Download sitemap pages as markdown")]
struct Cli {
    /// URL of the sitemap.xml file
    #[arg(long, alias = "sitemap_url")]
    sitemap_url: String,

    /// Output directory for markdown files
    #[arg(long, alias = "output_dir", default_value = "output")]
    output_dir: PathBuf,

    /// RapidAPI key (can also be set as RAPID_API_KEY env variable)
    #[arg(long, alias = "api_key")]
    api_key: Option<String>,

    /// Show what would be downloaded without actually downloading
    #[arg(long)]
    dry_run: bool,

    /// Skip pages whose markdown file already exists
    #[arg(long)]
    skip_existing: bool,

    /// Number of pages extracted at once
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// How many levels of sitemap indexes to follow
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    sitemark::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?.with_rapid_api_key(cli.api_key);

    let source: Option<Arc<dyn ArticleSource>> = if cli.dry_run {
        None
    } else {
        Some(Arc::new(ArticleClient::from_config(&config)?))
    };

    let run = DownloadRun::new(DownloadOptions {
        sitemap_url: cli.sitemap_url,
        output_dir: cli.output_dir,
        dry_run: cli.dry_run,
        skip_existing: cli.skip_existing,
        concurrency: cli.concurrency,
        max_depth: cli.max_depth,
        retry: config.retry(),
    })
    .with_ctrl_c();

    let summary = run.execute(source).await?;
    if summary.failed > 0 {
        bail!("{} of {} pages failed", summary.failed, summary.total());
    }
    Ok(())
}
