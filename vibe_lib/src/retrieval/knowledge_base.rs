use std::path::Path;
use tracing::info;
use crate::embeddings::Embedding;
use crate::error::Error;
use super::{chunk_text, rank, Ranking, Retrieval, Scored};

/// Separator placed between retrieved chunks in a prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Document split into chunks, one embedding per chunk.
pub struct KnowledgeBase {
    chunks: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl KnowledgeBase {
    /// Read a text file and build the knowledge base from it.
    pub fn load(path: &Path, chunk_size: usize, embedding: &mut dyn Embedding) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text, chunk_size, embedding)
    }

    /// Chunk `text` and embed every chunk.
    pub fn from_text(text: &str, chunk_size: usize, embedding: &mut dyn Embedding) -> Result<Self, Error> {
        let chunks = chunk_text(text, chunk_size)?;
        let vectors = if chunks.is_empty() {
            vec![]
        } else {
            embedding.get_embeddings(&chunks)?
        };

        if vectors.len() != chunks.len() {
            return Err(Error::LLMResponseError("number of embeddings does not match number of chunks."));
        }
        if let Some(first) = vectors.first() {
            if let Some(bad) = vectors.iter().find(|v| v.len() != first.len()) {
                return Err(Error::DimensionMismatch(first.len(), bad.len()));
            }
        }

        info!(chunks = chunks.len(), chunk_size, "knowledge base embedded");

        Ok(KnowledgeBase {
            chunks: chunks.into_iter().map(str::to_owned).collect(),
            vectors,
        })
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when the document was empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunks in document order.
    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(String::as_str)
    }

    /// Embed `query` and rank the chunks against it.
    pub fn retrieve(&self, query: &str, embedding: &mut dyn Embedding, ranking: &Ranking) -> Result<Retrieval<&str>, Error> {
        if self.is_empty() {
            return Ok(Retrieval::NoResults);
        }
        let query = embedding.get_embedding(query)?;
        rank(&query, self.chunks().zip(self.vectors.iter()), ranking)
    }
}

/// Join retrieved chunks, best first, into one prompt context.
pub fn join_context(matches: &[Scored<&str>]) -> String {
    matches.iter()
        .map(|m| m.item)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Maps text to a vector from letter counts, enough to make ranking predictable.
    struct LetterEmbedding {
        calls: usize,
    }

    impl Embedding for LetterEmbedding {
        fn get_embeddings(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error> {
            self.calls += 1;
            Ok(texts.iter().map(|t| {
                ['a', 'b', 'c'].iter()
                    .map(|l| t.chars().filter(|c| c == l).count() as f32)
                    .collect()
            }).collect())
        }
    }

    #[test]
    fn test_build_and_retrieve() {
        let mut embedding = LetterEmbedding { calls: 0 };
        let kb = KnowledgeBase::from_text("aaaabbbbccccabca", 4, &mut embedding).unwrap();
        assert_eq!(kb.len(), 4);
        assert_eq!(embedding.calls, 1);
        assert_eq!(kb.chunks().collect::<String>(), "aaaabbbbccccabca");

        let ranking = Ranking { top_k: 2, threshold: None };
        let result = kb.retrieve("bb", &mut embedding, &ranking).unwrap().into_vec();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].item, "bbbb");
        assert_eq!(result[1].item, "abca");

        assert_eq!(join_context(&result), "bbbb\n\n---\n\nabca");
    }

    #[test]
    fn test_threshold_gives_no_results() {
        let mut embedding = LetterEmbedding { calls: 0 };
        let kb = KnowledgeBase::from_text("aaaabbbb", 4, &mut embedding).unwrap();

        let ranking = Ranking { top_k: 3, threshold: Some(0.75) };
        assert!(kb.retrieve("c", &mut embedding, &ranking).unwrap().is_empty());
    }

    #[test]
    fn test_empty_document() {
        let mut embedding = LetterEmbedding { calls: 0 };
        let kb = KnowledgeBase::from_text("", 500, &mut embedding).unwrap();
        assert!(kb.is_empty());
        assert_eq!(embedding.calls, 0);

        let ranking = Ranking { top_k: 3, threshold: None };
        assert!(kb.retrieve("a", &mut embedding, &ranking).unwrap().is_empty());
        assert_eq!(embedding.calls, 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "abcabc").unwrap();

        let mut embedding = LetterEmbedding { calls: 0 };
        let kb = KnowledgeBase::load(file.path(), 500, &mut embedding).unwrap();
        assert_eq!(kb.len(), 1);

        let missing = KnowledgeBase::load(Path::new("/definitely/not/here.md"), 500, &mut embedding);
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
