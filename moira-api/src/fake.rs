//! In-memory [`Transport`] for tests.
//!
//! Routes are matched on method and URL suffix; the most recently
//! registered matching route wins. Every request is recorded so tests can
//! assert on exactly which calls were made.
//!
//! ```rust
//! use moira_api::fake::FakeTransport;
//! use moira_api::{Method, MoiraClient};
//!
//! let fake = FakeTransport::new().on_json(Method::Get, "/tag", serde_json::json!({"list": ["db"]}));
//! let client = MoiraClient::new("http://moira.test/api", &fake);
//! assert_eq!(client.fetch_tags().unwrap().list, vec!["db".to_string()]);
//! assert_eq!(fake.requests().len(), 1);
//! ```

use std::cell::RefCell;
use std::io;

use crate::error::ApiError;
use crate::transport::{network_err, ApiRequest, ApiResponse, Method, Transport};

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, ApiError>>;

struct Route {
    method: Method,
    suffix: String,
    handler: Handler,
}

/// Scripted transport; unmatched requests get a 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Vec<Route>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with a fixed status and body.
    pub fn on(self, method: Method, path: &str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        self.on_fn(method, path, move |_| ApiResponse {
            status,
            body: body.clone(),
        })
    }

    /// Answer `method path` with `200` and a JSON body.
    pub fn on_json(self, method: Method, path: &str, value: serde_json::Value) -> Self {
        self.on(method, path, 200, value.to_string())
    }

    /// Answer `method path` by calling `handler`.
    pub fn on_fn(
        mut self,
        method: Method,
        path: &str,
        handler: impl Fn(&ApiRequest) -> ApiResponse + 'static,
    ) -> Self {
        self.routes.push(Route {
            method,
            suffix: path.to_string(),
            handler: Box::new(move |req| Ok(handler(req))),
        });
        self
    }

    /// Fail `method path` as if the connection was refused.
    pub fn refuse(mut self, method: Method, path: &str) -> Self {
        self.routes.push(Route {
            method,
            suffix: path.to_string(),
            handler: Box::new(|req| {
                Err(network_err(
                    &req.url,
                    io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
                ))
            }),
        });
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Only the `PUT` requests sent so far.
    pub fn writes(&self) -> Vec<ApiRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == Method::Put)
            .cloned()
            .collect()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        let route = self
            .routes
            .iter()
            .rev()
            .find(|r| r.method == request.method && request.url.ends_with(&r.suffix));
        match route {
            Some(route) => (route.handler)(request),
            None => Ok(ApiResponse {
                status: 404,
                body: format!("no route for {} {}", request.method, request.url),
            }),
        }
    }
}
