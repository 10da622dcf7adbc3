//! Transport seam between [`ApiClient`](crate::ApiClient) and the network

use async_trait::async_trait;

use crate::api::{AuthToken, Error};

pub use ::http::{Method, StatusCode};

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub bearer: Option<AuthToken>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends one request. Implementations must only fail with
/// [`Error::Transport`]: any answer from the backend, successful or not, is
/// a `Response`.
#[async_trait(?Send)]
pub trait Backend {
    async fn send(&self, req: Request) -> Result<Response, Error>;
}

#[derive(Clone, Debug)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestBackend {
    pub fn new(base_url: impl Into<String>) -> ReqwestBackend {
        ReqwestBackend::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> ReqwestBackend {
        let base_url = base_url.into();
        ReqwestBackend {
            client,
            base_url: String::from(base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait(?Send)]
impl Backend for ReqwestBackend {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        let mut builder = self
            .client
            .request(req.method, format!("{}{}", self.base_url, req.path))
            .query(&req.query);
        if let Some(token) = &req.bearer {
            builder = builder.bearer_auth(&token.0);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Response {
            status,
            body: body.to_vec(),
        })
    }
}
