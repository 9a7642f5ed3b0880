//! Blocking HTTP transport.
//!
//! Everything that talks to Moira goes through the [`Transport`] trait so the
//! client can be driven by [`UreqTransport`] in production and by an
//! in-memory fake in tests. One transport is built per run and shared by all
//! fetchers and reconcilers.

use std::fmt;
use std::io::Read;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Request header naming the user whose settings are read or written.
pub const IMPERSONATION_HEADER: &str = "X-WebAuth-User";

/// `Content-Type` sent with every JSON body.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// HTTP methods the client needs. Moira creates and updates with `PUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn put_json(url: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::Put,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string())],
            body: Some(body),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Impersonate `login` when one is given.
    pub fn as_user(self, login: Option<&str>) -> Self {
        match login {
            Some(login) => self.header(IMPERSONATION_HEADER, login),
            None => self,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn impersonated_user(&self) -> Option<&str> {
        self.header_value(IMPERSONATION_HEADER)
    }
}

/// Status and body of a completed request, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Sends a request and returns the response.
///
/// Non-200 statuses are *not* errors at this layer; only failures to get a
/// response at all are.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request)
    }
}

// ---------------------------------------------------------------------------
// ureq transport
// ---------------------------------------------------------------------------

/// Production transport backed by a single [`ureq::Agent`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            user = request.impersonated_user().unwrap_or("-"),
            "sending request"
        );

        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        let result = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        let response = match result {
            Ok(response) => response,
            // ureq reports 4xx/5xx as errors; callers want to see them as responses.
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => return Err(network_err(&request.url, err)),
        };
        let status = response.status();
        // `into_string` caps bodies at 10 MiB; trigger lists can be larger.
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|e| network_err(&request.url, e))?;
        tracing::debug!(url = %request.url, status, "response received");
        Ok(ApiResponse { status, body })
    }
}

pub(crate) fn network_err(
    url: &str,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> ApiError {
    ApiError::Network {
        url: url.to_string(),
        source: source.into(),
    }
}
