use reqwest::blocking::Client as BlockingClient;
use serde_json::Value;
use tracing::debug;
use crate::error::Error;
use crate::request::client::Client;

pub struct ReqwestClient {
    client: BlockingClient,
}

impl ReqwestClient {

    pub fn new() -> Self {
        ReqwestClient {
            client: BlockingClient::new(),
        }
    }
}

impl Client for ReqwestClient {

    fn make_json_request(&self, url: &str, payload: Value, headers: &[(&str, &str)], params: &[(&str, &str)]) -> Result<Value, Error> {

        let mut request = self.client
            .post(url)
            .query(params)
            .json(&payload);

        for (k, v) in headers {
            request = request.header(*k, *v);
        }

        debug!(url, "sending request");
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(%status, bytes = body.len(), "received response");

        // Providers report errors as JSON bodies; anything else is surfaced verbatim.
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(Error::LLMErrorMessage(format!("{status}: {}", body.trim()))),
            Err(err) => Err(err.into()),
        }
    }
}
