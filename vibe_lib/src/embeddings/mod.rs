//! Text embeddings.

use crate::config::{EmbeddingConfig, LocalModel};
use crate::error::Error;
use crate::request::get_reqwest_client;

mod api;
mod local;

pub use api::ApiEmbeddings;
pub use local::LocalEmbeddings;

/// Implementations.
#[derive(Clone, Debug)]
pub enum Type {
    /// Hosted embeddings endpoint.
    Api(EmbeddingConfig),
    /// Hugging Face sentence transformer running on CPU.
    HuggingFace(LocalModel),
}

/// Embedding generation.
pub trait Embedding {
    /// Return one embedding per input text, in input order.
    fn get_embeddings(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error>;

    /// Return the embedding for a single text.
    fn get_embedding(&mut self, text: &str) -> Result<Vec<f32>, Error> {
        self.get_embeddings(&[text])?
            .pop()
            .ok_or(Error::LLMResponseError("no embedding returned."))
    }
}

/// Run `embed` over consecutive slices of at most `batch_size` texts and concatenate the results.
pub(crate) fn in_batches<F>(texts: &[&str], batch_size: usize, mut embed: F) -> Result<Vec<Vec<f32>>, Error>
    where F: FnMut(&[&str]) -> Result<Vec<Vec<f32>>, Error>
{
    if batch_size == 0 {
        return Err(Error::InvalidArgument("embedding batch size must be greater than zero"));
    }

    let mut result = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size) {
        let vectors = embed(batch)?;
        if vectors.len() != batch.len() {
            return Err(Error::LLMResponseError("number of embeddings does not match number of inputs."));
        }
        result.extend(vectors);
    }

    Ok(result)
}

/// Return embedding generator.
pub fn get_embedding(t: Type) -> Result<Box<dyn Embedding>, Error> {
    match t {
        Type::Api(config) => Ok(Box::new(ApiEmbeddings::new(config, get_reqwest_client()?))),
        Type::HuggingFace(model) => Ok(Box::new(LocalEmbeddings::load(&model)?)),
    }
}
