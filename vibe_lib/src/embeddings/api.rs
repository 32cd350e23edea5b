use serde_json::{json, Value};
use tracing::debug;
use crate::config::{EmbeddingConfig, ModelProvider};
use crate::error::Error;
use crate::request::Client;
use super::{in_batches, Embedding};

/// Embeddings from the OpenAI or Azure OpenAI embeddings endpoint.
pub struct ApiEmbeddings {
    config: EmbeddingConfig,
    client: Box<dyn Client>,
}

impl ApiEmbeddings {
    /// Create a generator that sends requests through `client`.
    pub fn new(config: EmbeddingConfig, client: Box<dyn Client>) -> Self {
        ApiEmbeddings { config, client }
    }

    fn request(&self, batch: &[&str]) -> Result<Value, Error> {
        let payload = json!({
            "model": self.config.name,
            "input": batch,
        });

        match self.config.provider {
            ModelProvider::OpenAI => {
                let token = format!("Bearer {}", self.config.api_key);
                self.client.make_json_request(&self.config.api_url, payload, &[("Authorization", token.as_ref())], &[])
            },
            ModelProvider::Azure => {
                let params: Vec<(&str, &str)> = self.config.api_version
                    .as_deref()
                    .map(|v| ("api-version", v))
                    .into_iter()
                    .collect();
                self.client.make_json_request(&self.config.api_url, payload, &[("api-key", self.config.api_key.as_ref())], &params)
            },
        }
    }

    fn parse_response(response: &Value, expected: usize) -> Result<Vec<Vec<f32>>, Error> {
        if let Some(error) = response.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error").to_owned();
            return Err(Error::LLMErrorMessage(message));
        }

        let data = response["data"].as_array()
            .ok_or(Error::LLMResponseError("can't enumerate embeddings."))?;

        if data.len() != expected {
            return Err(Error::LLMResponseError("number of embeddings does not match number of inputs."));
        }

        let mut indexed = Vec::with_capacity(data.len());
        for (pos, item) in data.iter().enumerate() {
            let index = match item.get("index") {
                None | Some(Value::Null) => pos,
                Some(v) => v.as_u64()
                    .and_then(|i| usize::try_from(i).ok())
                    .ok_or(Error::LLMResponseError("embedding index is not a non-negative integer."))?,
            };
            let vector = item["embedding"].as_array()
                .ok_or(Error::LLMResponseError("can't extract embedding vector."))?
                .iter()
                .map(|v| v.as_f64().map(|x| x as f32))
                .collect::<Option<Vec<f32>>>()
                .ok_or(Error::LLMResponseError("embedding contains a non-numeric value."))?;
            indexed.push((index, vector));
        }

        indexed.sort_by_key(|(index, _)| *index);
        if indexed.iter().enumerate().any(|(pos, (index, _))| pos != *index) {
            return Err(Error::LLMResponseError("embedding indexes do not match the inputs."));
        }
        Ok(indexed.into_iter().map(|(_, v)| v).collect())
    }
}

impl Embedding for ApiEmbeddings {

    fn get_embeddings(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error> {
        in_batches(texts, self.config.batch_size, |batch| {
            debug!(inputs = batch.len(), model = %self.config.name, "requesting embeddings");
            let response = self.request(batch)?;
            Self::parse_response(&response, batch.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::stub::{Exchange, StubClient};

    fn config(provider: ModelProvider, batch_size: usize) -> EmbeddingConfig {
        let mut config = EmbeddingConfig::new(provider, "emb".into(), "key".into(), "<url>".into());
        config.batch_size = batch_size;
        config
    }

    #[test]
    fn test_batches_and_orders_by_index() {
        let headers = vec![("Authorization".to_owned(), "Bearer key".to_owned())];
        let first = Exchange {
            headers: headers.clone(),
            params: vec![],
            payload: json!({ "model": "emb", "input": ["a", "b"] }),
            response: json!({
                "object": "list",
                "data": [
                    { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                    { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
                ]
            }),
        };
        let second = Exchange {
            headers,
            params: vec![],
            payload: json!({ "model": "emb", "input": ["c"] }),
            response: json!({
                "data": [ { "index": 0, "embedding": [0.5, 0.5] } ]
            }),
        };

        let client = Box::new(StubClient::scripted(vec![first, second]).with_url("<url>"));
        let mut embeddings = ApiEmbeddings::new(config(ModelProvider::OpenAI, 2), client);

        let vectors = embeddings.get_embeddings(&["a", "b", "c"]).expect("embeddings");
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn test_azure_single_query() {
        let mut cfg = config(ModelProvider::Azure, 16);
        cfg.api_version = Some("2024-02-01".into());

        let client = Box::new(StubClient::new(
            vec![("api-key".to_owned(), "key".to_owned())],
            vec![("api-version".to_owned(), "2024-02-01".to_owned())],
            json!({ "model": "emb", "input": ["query"] }),
            json!({ "data": [ { "index": 0, "embedding": [0.25, 0.75] } ] }),
        ));
        let mut embeddings = ApiEmbeddings::new(cfg, client);

        assert_eq!(embeddings.get_embedding("query").expect("embedding"), vec![0.25, 0.75]);
    }

    #[test]
    fn test_count_mismatch_and_error_body() {
        let client = Box::new(StubClient::new(
            vec![("Authorization".to_owned(), "Bearer key".to_owned())],
            vec![],
            json!({ "model": "emb", "input": ["a", "b"] }),
            json!({ "data": [ { "index": 0, "embedding": [1.0] } ] }),
        ));
        let mut embeddings = ApiEmbeddings::new(config(ModelProvider::OpenAI, 8), client);
        assert!(matches!(embeddings.get_embeddings(&["a", "b"]), Err(Error::LLMResponseError(_))));

        let client = Box::new(StubClient::new(
            vec![("Authorization".to_owned(), "Bearer key".to_owned())],
            vec![],
            json!({ "model": "emb", "input": ["a"] }),
            json!({ "error": { "message": "deployment not found" } }),
        ));
        let mut embeddings = ApiEmbeddings::new(config(ModelProvider::OpenAI, 8), client);
        match embeddings.get_embeddings(&["a"]) {
            Err(Error::LLMErrorMessage(msg)) => assert_eq!(msg, "deployment not found"),
            _ => panic!("expected provider error"),
        }
    }

    #[test]
    fn test_rejects_bad_indexes() {
        let bad = [
            json!({ "data": [ { "index": 0, "embedding": [1.0] }, { "index": 0, "embedding": [2.0] } ] }),
            json!({ "data": [ { "index": 0, "embedding": [1.0] }, { "index": 2, "embedding": [2.0] } ] }),
            json!({ "data": [ { "index": 1, "embedding": [1.0] }, { "embedding": [2.0] } ] }),
            json!({ "data": [ { "index": -1, "embedding": [1.0] }, { "index": 1, "embedding": [2.0] } ] }),
        ];
        for response in bad {
            assert!(matches!(ApiEmbeddings::parse_response(&response, 2), Err(Error::LLMResponseError(_))), "{response}");
        }

        let no_indexes = json!({ "data": [ { "embedding": [1.0] }, { "embedding": [2.0] } ] });
        assert_eq!(ApiEmbeddings::parse_response(&no_indexes, 2).unwrap(), vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_empty_input_sends_nothing() {
        let client = Box::new(StubClient::scripted(vec![]));
        let mut embeddings = ApiEmbeddings::new(config(ModelProvider::OpenAI, 8), client);
        assert!(embeddings.get_embeddings(&[]).expect("no embeddings").is_empty());
    }
}
