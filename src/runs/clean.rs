use anyhow::{Context, Result};
use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
    sync::Arc,
};
use tracing::info;

use crate::cleaner::clean_markdown;
use crate::jobs::{Outcome, RunSummary, WorkerConfig, WorkerPool};
use crate::llm::CompletionModel;
use crate::output::{
    clean_output_path, collect_markdown_files, mirrored_output_path, save_markdown,
};

#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// A markdown file, or a directory searched recursively for `*.md`.
    pub input: PathBuf,
    /// Output file for a single input, output root for a directory input.
    pub output: Option<PathBuf>,
    pub skip_existing: bool,
    pub workers: usize,
    pub max_chunk_size: usize,
}

#[derive(Debug, Clone)]
struct CleanTask {
    input: PathBuf,
    output: PathBuf,
}

impl Display for CleanTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.input.display())
    }
}

/// Markdown files -> model -> cleaned markdown files.
pub struct CleanRun {
    options: CleanOptions,
    pool: WorkerPool,
}

impl CleanRun {
    pub fn new(options: CleanOptions) -> Self {
        let pool = WorkerPool::new(WorkerConfig {
            concurrency: options.workers,
        });
        Self { options, pool }
    }

    pub fn with_ctrl_c(mut self) -> Self {
        self.pool = self.pool.with_ctrl_c();
        self
    }

    pub async fn execute(&self, model: Arc<dyn CompletionModel>) -> Result<RunSummary> {
        let options = &self.options;
        let files = collect_markdown_files(&options.input)
            .with_context(|| format!("Failed to read input {}", options.input.display()))?;
        info!("Found {} files to process", files.len());

        let input_is_dir = options.input.is_dir();
        let tasks: Vec<CleanTask> = files
            .into_iter()
            .map(|input| {
                let output = match &options.output {
                    Some(root) if input_is_dir => {
                        mirrored_output_path(&options.input, &input, root)
                    }
                    explicit => clean_output_path(&input, explicit.as_deref()),
                };
                CleanTask { input, output }
            })
            .collect();

        let skip_existing = options.skip_existing;
        let max_chunk_size = options.max_chunk_size;
        let summary = self
            .pool
            .run(tasks, move |task: CleanTask| {
                let model = model.clone();
                async move { clean_file(&task, model.as_ref(), skip_existing, max_chunk_size).await }
            })
            .await;

        info!("Clean finished: {}", summary);
        Ok(summary)
    }
}

async fn clean_file(
    task: &CleanTask,
    model: &dyn CompletionModel,
    skip_existing: bool,
    max_chunk_size: usize,
) -> Result<Outcome> {
    if skip_existing && tokio::fs::try_exists(&task.output).await.unwrap_or(false) {
        info!("Skipping existing file: {}", task.output.display());
        return Ok(Outcome::Skipped);
    }

    let content = tokio::fs::read_to_string(&task.input)
        .await
        .with_context(|| format!("Error reading {}", task.input.display()))?;

    info!("Processing: {}", task.input.display());
    let cleaned = clean_markdown(&content, model, max_chunk_size)
        .await
        .with_context(|| format!("Failed to clean: {}", task.input.display()))?;

    save_markdown(&task.output, &cleaned)
        .await
        .with_context(|| format!("Error writing {}", task.output.display()))?;
    info!("Saved cleaned file: {}", task.output.display());
    Ok(Outcome::Done)
}
