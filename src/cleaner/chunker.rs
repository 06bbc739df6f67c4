use tracing::debug;

/// Largest chunk, in characters, handed to the model in one request.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 6000;

/// Accumulates pieces until adding another would overflow `max`.
struct ChunkBuilder {
    max: usize,
    chunks: Vec<String>,
    current: Vec<String>,
    current_size: usize,
}

impl ChunkBuilder {
    fn new(max: usize) -> Self {
        Self {
            max,
            chunks: Vec::new(),
            current: Vec::new(),
            current_size: 0,
        }
    }

    /// Flush first if `piece` would overflow a non-empty chunk, joining the
    /// flushed pieces with `separator`.
    fn push(&mut self, piece: &str, separator: &str) {
        let size = piece.chars().count();
        if self.current_size + size > self.max && !self.current.is_empty() {
            self.flush(separator);
        }
        self.current.push(piece.to_string());
        self.current_size += size;
    }

    fn flush(&mut self, separator: &str) {
        let chunk = self.current.join(separator);
        debug!("Creating chunk {}: {} characters", self.chunks.len(), chunk.chars().count());
        self.chunks.push(chunk);
        self.current.clear();
        self.current_size = 0;
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.flush("\n\n");
        }
        self.chunks
    }
}

/// Split markdown into chunks of at most `max_chunk_size` characters,
/// preferring paragraph boundaries, then line boundaries, then sentences.
///
/// A single sentence longer than the limit still becomes its own chunk.
/// Empty input yields one empty chunk.
pub fn split_content(content: &str, max_chunk_size: usize) -> Vec<String> {
    let mut builder = ChunkBuilder::new(max_chunk_size);

    for section in content.split("\n\n") {
        if section.chars().count() <= max_chunk_size {
            builder.push(section, "\n\n");
            continue;
        }

        debug!(
            "Found large section of {} characters, splitting on lines",
            section.chars().count()
        );
        for line in section.split('\n') {
            if line.chars().count() <= max_chunk_size {
                builder.push(line, "\n");
                continue;
            }

            for sentence in line.split('.').filter(|s| !s.is_empty()) {
                builder.push(&format!("{sentence}."), "\n");
            }
        }
    }

    let chunks = builder.finish();
    debug!(
        "Split {} characters into {} chunks",
        content.chars().count(),
        chunks.len()
    );
    chunks
}
