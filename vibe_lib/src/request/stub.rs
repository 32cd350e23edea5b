//! Only for tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use serde_json::Value;
use crate::error::Error;
use crate::request::client::Client;

/// One expected request and the canned response to it.
pub struct Exchange {
    /// Expected headers.
    pub headers: Vec<(String, String)>,
    /// Expected query parameters.
    pub params: Vec<(String, String)>,
    /// Expected payload.
    pub payload: Value,
    /// Response body.
    pub response: Value,
}

/// Client for tests, replays exchanges in order.
pub struct StubClient {
    expected_url: Option<String>,
    exchanges: RefCell<VecDeque<Exchange>>,
}

impl StubClient {

    /// Create client for a single exchange.
    pub fn new(expected_headers: Vec<(String, String)>,
        expected_params: Vec<(String, String)>,
        expected_payload: Value, 
        response_body: Value) -> Self 
    {
        Self::scripted(vec![Exchange {
            headers: expected_headers,
            params: expected_params,
            payload: expected_payload,
            response: response_body,
        }])
    }

    /// Create client for a sequence of exchanges.
    pub fn scripted(exchanges: Vec<Exchange>) -> Self {
        StubClient {
            expected_url: None,
            exchanges: RefCell::new(exchanges.into()),
        }
    }

    /// Also check the request URL.
    pub fn with_url(mut self, url: &str) -> Self {
        self.expected_url = Some(url.to_owned());
        self
    }
}

impl Client for StubClient {

    fn make_json_request(&self, url: &str, payload: Value, headers: &[(&str, &str)], params: &[(&str, &str)]) -> Result<Value, Error> {
        if let Some(expected) = &self.expected_url {
            assert_eq!(url, expected, "url");
        }

        let exchange = self.exchanges.borrow_mut()
            .pop_front()
            .expect("unexpected request");

        assert_eq!(headers.len(), exchange.headers.len(), "headers count");
        for (actual, expected) in headers.iter().zip(exchange.headers.iter()) {
            assert_eq!(actual.0, expected.0, "headers keys");
            assert_eq!(actual.1, expected.1, "headers values");
        }

        assert_eq!(params.len(), exchange.params.len(), "params count");
        for (actual, expected) in params.iter().zip(exchange.params.iter()) {
            assert_eq!(actual.0, expected.0, "params keys");
            assert_eq!(actual.1, expected.1, "params values");
        }

        assert_eq!(payload, exchange.payload);

        Ok(exchange.response)
    }
}
