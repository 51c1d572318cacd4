use std::time::Duration;

use reqwest::Method;
use serde::Serialize;

use super::ClientError;

/// Everything the gateway needs to issue, and if necessary replay, one call.
#[derive(Clone, Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
    pub authenticated: bool,
}

impl RequestSpec {
    pub fn new(method: Method, path: &str) -> RequestSpec {
        return RequestSpec {
            method,
            path: path.to_string(),
            query: vec![],
            body: None,
            timeout: None,
            authenticated: true,
        };
    }

    pub fn get(path: &str) -> RequestSpec {
        return RequestSpec::new(Method::GET, path);
    }

    pub fn post(path: &str) -> RequestSpec {
        return RequestSpec::new(Method::POST, path);
    }

    pub fn put(path: &str) -> RequestSpec {
        return RequestSpec::new(Method::PUT, path);
    }

    pub fn delete(path: &str) -> RequestSpec {
        return RequestSpec::new(Method::DELETE, path);
    }

    pub fn query(mut self, key: &str, value: &str) -> RequestSpec {
        self.query.push((key.to_string(), value.to_string()));
        return self;
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<RequestSpec, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        return Ok(self);
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> RequestSpec {
        self.timeout = timeout;
        return self;
    }

    /// Sent without a bearer token. A 401 is handed back as is rather than
    /// triggering a refresh.
    pub fn anonymous(mut self) -> RequestSpec {
        self.authenticated = false;
        return self;
    }
}
