use std::path::Path;
use serde::{Deserialize, Deserializer};
use tracing::info;
use crate::error::Error;
use super::{rank, Ranking, Retrieval};

/// Row of the precomputed video embedding index.
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    /// YouTube video id.
    #[serde(rename = "videoId", default, deserialize_with = "null_as_default")]
    pub video_id: String,
    /// Video title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Segment summary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Segment start, in seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub seconds: f64,
    /// Speaker names.
    #[serde(default, deserialize_with = "null_as_default")]
    pub speaker: String,
    /// Segment embedding.
    #[serde(rename = "ada_v2")]
    pub embedding: Vec<f32>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where D: Deserializer<'de>, T: Deserialize<'de> + Default
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Video {
    /// Link to the segment start.
    pub fn youtube_url(&self) -> String {
        format!("https://youtu.be/{}?t={}", self.video_id, self.seconds)
    }

    /// First `words` words of the summary followed by an ellipsis.
    pub fn summary_preview(&self, words: usize) -> String {
        let head = self.summary.split_whitespace().take(words).collect::<Vec<_>>().join(" ");
        format!("{head}...")
    }
}

/// Video segments with their embeddings.
pub struct VideoIndex {
    videos: Vec<Video>,
}

impl VideoIndex {
    /// Load the index from a JSON file (array of rows).
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| match e {
                Error::LLMJsonError(err) => Error::DataFormat(path.display().to_string(), err.to_string()),
                other => other,
            })
    }

    /// Parse the index from JSON text.
    pub fn from_json(content: &str) -> Result<Self, Error> {
        let videos: Vec<Video> = serde_json::from_str(content)?;

        if let Some(first) = videos.first() {
            if let Some(bad) = videos.iter().find(|v| v.embedding.len() != first.embedding.len()) {
                return Err(Error::DimensionMismatch(first.embedding.len(), bad.embedding.len()));
            }
        }

        info!(rows = videos.len(), "video index loaded");
        Ok(VideoIndex { videos })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    /// True when the index has no rows.
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Rows most similar to the query embedding.
    pub fn search(&self, query: &[f32], ranking: &Ranking) -> Result<Retrieval<&Video>, Error> {
        rank(query, self.videos.iter().map(|v| (v, v.embedding.as_slice())), ranking)
    }
}
