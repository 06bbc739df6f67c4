use anyhow::{Context, Result, bail};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};
use url::Url;

use crate::article::{ArticleSource, render_article};
use crate::config::RetryPolicy;
use crate::jobs::{Outcome, RunSummary, WorkerConfig, WorkerPool};
use crate::output::{markdown_path, save_markdown};
use crate::sitemap::{SitemapEntry, load_sitemap};

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub sitemap_url: String,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub skip_existing: bool,
    pub concurrency: usize,
    pub max_depth: usize,
    pub retry: RetryPolicy,
}

/// Sitemap -> extraction API -> markdown files.
pub struct DownloadRun {
    options: DownloadOptions,
    pool: WorkerPool,
}

impl DownloadRun {
    pub fn new(options: DownloadOptions) -> Self {
        let pool = WorkerPool::new(WorkerConfig {
            concurrency: options.concurrency,
        });
        Self { options, pool }
    }

    pub fn with_ctrl_c(mut self) -> Self {
        self.pool = self.pool.with_ctrl_c();
        self
    }

    /// Run the download. `source` may only be `None` for a dry run.
    pub async fn execute(&self, source: Option<Arc<dyn ArticleSource>>) -> Result<RunSummary> {
        let options = &self.options;

        let source = match (source, options.dry_run) {
            (_, true) => None,
            (Some(source), false) => Some(source),
            (None, false) => bail!("an article source is required unless running dry"),
        };

        if !options.dry_run {
            tokio::fs::create_dir_all(&options.output_dir)
                .await
                .with_context(|| {
                    format!("Failed to create {}", options.output_dir.display())
                })?;
        }

        let loaded = load_sitemap(&options.sitemap_url, options.max_depth, options.retry).await;
        let entries = match loaded {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error parsing sitemap: {}", e);
                Vec::new()
            }
        };
        info!("Found {} URLs in sitemap", entries.len());

        let Some(source) = source else {
            return Ok(self.plan(&entries));
        };

        let output_dir = Arc::new(options.output_dir.clone());
        let skip_existing = options.skip_existing;
        let summary = self
            .pool
            .run(entries, move |entry: SitemapEntry| {
                let source = source.clone();
                let output_dir = output_dir.clone();
                async move {
                    download_page(source.as_ref(), &entry.loc, &output_dir, skip_existing).await
                }
            })
            .await;

        info!("Download finished: {}", summary);
        Ok(summary)
    }

    fn plan(&self, entries: &[SitemapEntry]) -> RunSummary {
        for entry in entries {
            let path = markdown_path(&self.options.output_dir, &entry.loc);
            info!("Would download: {}", entry.loc);
            info!("Would save to: {}", path.display());
        }
        RunSummary {
            skipped: entries.len(),
            ..Default::default()
        }
    }
}

async fn download_page(
    source: &dyn ArticleSource,
    url: &Url,
    output_dir: &std::path::Path,
    skip_existing: bool,
) -> Result<Outcome> {
    let path = markdown_path(output_dir, url);
    if skip_existing && tokio::fs::try_exists(&path).await.unwrap_or(false) {
        info!("Skipping existing file: {}", path.display());
        return Ok(Outcome::Skipped);
    }

    info!("Processing: {}", url);
    let article = source
        .parse_article(url)
        .await
        .with_context(|| format!("Failed to extract {url}"))?;
    let content = render_article(&article).with_context(|| format!("Nothing saved for {url}"))?;

    save_markdown(&path, &content)
        .await
        .with_context(|| format!("Error saving file for {url}"))?;
    info!("Saved: {}", path.display());
    Ok(Outcome::Done)
}
