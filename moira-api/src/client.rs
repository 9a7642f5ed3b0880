//! Moira API client.
//!
//! [`MoiraClient`] owns the API root and a [`Transport`]. It turns paths into
//! URLs, encodes and decodes JSON bodies, and maps non-200 answers to
//! [`ApiError::RemoteRejected`]. The fetchers and reconcilers are methods on
//! this type, defined in [`crate::fetch`] and [`crate::reconcile`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiResponse, Transport, UreqTransport};

/// Blocking Moira client. Built once per run and shared by every operation.
#[derive(Debug, Clone)]
pub struct MoiraClient<T: Transport = UreqTransport> {
    base_url: String,
    transport: T,
}

impl MoiraClient<UreqTransport> {
    /// Client backed by a `ureq` agent configured from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.normalized_base_url(), UreqTransport::new(config))
    }
}

impl<T: Transport> MoiraClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{path}`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path`, optionally impersonating `as_user`, and decode the body.
    pub(crate) fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        as_user: Option<&str>,
    ) -> Result<R, ApiError> {
        let request = ApiRequest::get(self.url(path)).as_user(as_user);
        let response = self.send_expecting_ok(&request)?;
        decode(&request.url, &response.body)
    }

    /// `PUT path` with a JSON body. Returns the raw response body on 200.
    pub(crate) fn put_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        as_user: Option<&str>,
    ) -> Result<String, ApiError> {
        let encoded = serde_json::to_string(body)?;
        let request = ApiRequest::put_json(self.url(path), encoded).as_user(as_user);
        let response = self.send_expecting_ok(&request)?;
        Ok(response.body)
    }

    fn send_expecting_ok(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.transport.send(request)?;
        if !response.is_ok() {
            return Err(ApiError::RemoteRejected {
                url: request.url.clone(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}

pub(crate) fn decode<R: DeserializeOwned>(url: &str, body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
