use vibe_lib::embeddings::Embedding;
use vibe_lib::retrieval::{Ranking, Retrieval, VideoIndex};
use crate::error::AppError;
use crate::term::Console;
use super::Session;

const SUMMARY_WORDS: usize = 20;

/// Semantic search over video segments.
pub struct Search {
    embedding: Box<dyn Embedding>,
    index: VideoIndex,
    ranking: Ranking,
}

impl Search {
    /// Create an instance over a loaded index.
    pub fn new(embedding: Box<dyn Embedding>, index: VideoIndex, ranking: Ranking) -> Self {
        Search { embedding, index, ranking }
    }
}

impl Session for Search {
    fn title(&self) -> &'static str {
        "You can now search for videos."
    }

    fn intro(&self) -> Vec<String> {
        let threshold = self.ranking.threshold.unwrap_or_default();
        vec![format!("Showing up to {} videos with similarity of at least {threshold}.", self.ranking.top_k)]
    }

    fn help(&self) -> &'static str {
        "Enter a search query. Video segments are ranked by the cosine similarity\n\
of their embeddings to the query embedding."
    }

    fn handle(&mut self, input: &str, console: &mut dyn Console) -> Result<(), AppError> {
        let query = self.embedding.get_embedding(input)?;

        let videos = match self.index.search(&query, &self.ranking)? {
            Retrieval::Found(videos) => videos,
            Retrieval::NoResults => {
                console.info(&format!("No videos found similar to '{input}'. Try a different search term."));
                return Ok(());
            }
        };

        console.info(&format!("Videos similar to '{input}':"));
        for scored in videos {
            let video = scored.item;
            console.info("");
            console.info(&format!("- {}", video.title));
            console.info(&format!("  Summary: {}", video.summary_preview(SUMMARY_WORDS)));
            console.info(&format!("  YouTube: {}", video.youtube_url()));
            console.info(&format!("  Similarity: {:.4}", scored.score));
            console.info(&format!("  Speakers: {}", video.speaker));
        }

        Ok(())
    }
}
