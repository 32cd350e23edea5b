use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, HiddenAct, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::config::LocalModel;
use crate::error::Error;

use super::{in_batches, Embedding};

// BERT position embeddings limit.
const MAX_TOKENS: usize = 512;

/// Sentence embeddings computed on CPU with a BERT-family model.
pub struct LocalEmbeddings {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    batch_size: usize,
}

impl LocalEmbeddings {
    /// Download (or reuse from the hub cache) and load the model.
    pub fn load(model: &LocalModel) -> Result<Self, Error> {
        let device = Device::Cpu;
        info!(model = %model.model_id, revision = %model.revision, "loading local embedding model");

        let repo = Api::new()?.repo(Repo::with_revision(model.model_id.clone(), RepoType::Model, model.revision.clone()));
        let config_path = repo.get("config.json")?;
        let tokenizer_path = repo.get("tokenizer.json")?;
        let weights_path = repo.get(if model.use_pth { "pytorch_model.bin" } else { "model.safetensors" })?;

        let config = std::fs::read_to_string(&config_path)?;
        let mut config: BertConfig = serde_json::from_str(&config)
            .map_err(|e| Error::DataFormat(config_path.to_string_lossy().into_owned(), e.to_string()))?;
        if model.approximate_gelu {
            config.hidden_act = HiddenAct::GeluApproximate;
        }

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::DataFormat(tokenizer_path.to_string_lossy().into_owned(), e.to_string()))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer.with_truncation(Some(TruncationParams {
            max_length: MAX_TOKENS,
            ..Default::default()
        }))
        .map_err(|e| Error::Error(format!("tokenizer build error: {e}")))?;

        let vb = if model.use_pth {
            VarBuilder::from_pth(&weights_path, DTYPE, &device)?
        } else {
            // Safety: the file comes from the hub cache and is not modified while mapped.
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)? }
        };
        let bert = BertModel::load(vb, &config)?;

        Ok(LocalEmbeddings {
            model: bert,
            tokenizer,
            device,
            batch_size: model.batch_size,
        })
    }

    fn encode(&self, texts: &[&str]) -> Result<(Tensor, Tensor), Error> {
        let encodings = self.tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::Error(format!("tokenization error: {e}")))?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in encodings.iter() {
            ids.push(Tensor::new(encoding.get_ids(), &self.device)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), &self.device)?);
        }

        Ok((Tensor::stack(&ids, 0)?, Tensor::stack(&masks, 0)?))
    }
}

impl Embedding for LocalEmbeddings {

    fn get_embeddings(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error> {
        in_batches(texts, self.batch_size, |batch| {
            debug!(inputs = batch.len(), "computing local embeddings");
            self.embed_batch(batch)
        })
    }
}

impl LocalEmbeddings {
    /// One padded forward pass over `texts`.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error> {
        let (token_ids, attention_mask) = self.encode(texts)?;
        let token_type_ids = token_ids.zeros_like()?;
        let hidden = self.model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean over real tokens only, padding is masked out.
        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;
        let normalized = pooled.broadcast_div(&pooled.sqr()?.sum_keepdim(1)?.sqrt()?)?;

        Ok(normalized.to_vec2::<f32>()?)
    }
}
