//! Scripted transports shared by the integration tests. Nothing here talks
//! to the network.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use taisen::clients::{ApiRequest, RawResponse, Transport};
use taisen::error::ClientError;

type Responder = dyn Fn(&ApiRequest) -> Result<RawResponse, ClientError> + Send + Sync;

/// Routes each request through a closure and counts calls.
pub struct FnTransport {
    responder: Box<Responder>,
    calls: AtomicUsize,
}

impl FnTransport {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<RawResponse, ClientError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FnTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(request)
    }
}

/// Transport for "both upstreams unreachable" scenarios.
pub struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn execute(&self, _request: &ApiRequest) -> Result<RawResponse, ClientError> {
        Err(ClientError::Transport("connection refused".to_string()))
    }
}

pub fn ok(body: serde_json::Value) -> Result<RawResponse, ClientError> {
    Ok(RawResponse {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(code: u16) -> Result<RawResponse, ClientError> {
    Ok(RawResponse {
        status: code,
        body: String::new(),
    })
}

/// The GraphQL query text of a POST request, for routing.
pub fn gql_query(request: &ApiRequest) -> &str {
    match request {
        ApiRequest::Post { body, .. } => body["query"].as_str().unwrap_or_default(),
        ApiRequest::Get { .. } => "",
    }
}
