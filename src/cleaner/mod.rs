//! LLM-driven clean-up of downloaded markdown.

pub mod chunker;
pub mod prompts;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, split_content};

use thiserror::Error;
use tracing::{info, instrument};

use crate::llm::{CompletionModel, LlmError};

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("chunk {index} of {total} failed: {source}")]
    Chunk {
        index: usize,
        total: usize,
        #[source]
        source: LlmError,
    },
}

/// Clean `content` chunk by chunk and stitch the results back together.
///
/// The first chunk is sent with instructions to keep any frontmatter
/// untouched. A failure on any chunk fails the whole document.
#[instrument(skip_all, fields(chars = content.chars().count()))]
pub async fn clean_markdown<M>(
    content: &str,
    model: &M,
    max_chunk_size: usize,
) -> Result<String, CleanError>
where
    M: CompletionModel + ?Sized,
{
    let chunks = split_content(content, max_chunk_size);
    let total = chunks.len();
    let mut cleaned = Vec::with_capacity(total);

    for (index, chunk) in chunks.iter().enumerate() {
        info!(
            "Processing chunk {}/{} ({} characters)",
            index + 1,
            total,
            chunk.chars().count()
        );
        let prompt = if index == 0 {
            prompts::first_chunk_prompt(chunk)
        } else {
            prompts::chunk_prompt(chunk)
        };
        let text = model
            .complete(&prompt)
            .await
            .map_err(|source| CleanError::Chunk {
                index: index + 1,
                total,
                source,
            })?;
        cleaned.push(text);
    }

    let result = cleaned.join("\n\n");
    info!("Final cleaned content size: {} characters", result.chars().count());
    Ok(result)
}
