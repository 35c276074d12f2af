use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, Uri};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

use super::payload::LocationReport;
use super::TransportSink;

const LOCATION_PATH: &str = "/api/location";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid base url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("unsupported scheme in {0}, only http is supported")]
    UnsupportedScheme(String),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("request error: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub delivered: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Posts accepted samples as JSON to `{base_url}/api/location`.
///
/// Every send runs on its own task and is bounded by the request timeout.
/// `flush` lets a caller that is about to exit wait for the ones still in
/// flight.
#[derive(Clone)]
pub struct HttpSink {
    endpoint: Uri,
    client: Client<HttpConnector>,
    request_timeout: Duration,
    in_flight: Arc<Mutex<JoinSet<()>>>,
    counters: Arc<Counters>,
}

impl HttpSink {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, SinkError> {
        let endpoint = endpoint_for(base_url)?;
        Ok(Self {
            endpoint,
            client: Client::new(),
            request_timeout,
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
            counters: Arc::new(Counters::default()),
        })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    pub fn stats(&self) -> SinkStats {
        SinkStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Waits up to `deadline` for in-flight sends. Returns how many were
    /// still running and got abandoned.
    pub async fn flush(&self, deadline: Duration) -> usize {
        let mut pending = std::mem::take(&mut *self.in_flight.lock().unwrap());
        let drained = tokio::time::timeout(deadline, async {
            while pending.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            let abandoned = pending.len();
            log::warn!("Abandoning {} unfinished sends", abandoned);
            pending.abort_all();
            return abandoned;
        }
        0
    }

    async fn post(
        client: Client<HttpConnector>,
        endpoint: Uri,
        request_timeout: Duration,
        report: LocationReport,
    ) -> Result<hyper::StatusCode, SinkError> {
        let body = serde_json::to_vec(&report)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))?;
        let response = tokio::time::timeout(request_timeout, client.request(request))
            .await
            .map_err(|_| SinkError::Timeout(request_timeout))??;
        Ok(response.status())
    }
}

impl TransportSink for HttpSink {
    fn send(&self, report: LocationReport) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let request_timeout = self.request_timeout;
        let counters = self.counters.clone();

        let mut in_flight = self.in_flight.lock().unwrap();
        // reap finished sends
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn(async move {
            match Self::post(client, endpoint, request_timeout, report).await {
                Ok(status) => {
                    counters.delivered.fetch_add(1, Ordering::Relaxed);
                    log::debug!("Server response: {}", status.as_u16());
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    log::error!("Send failed: {}", e);
                }
            }
        });
    }
}

fn endpoint_for(base_url: &str) -> Result<Uri, SinkError> {
    let url = format!("{}{}", base_url.trim().trim_end_matches('/'), LOCATION_PATH);
    let uri: Uri = url.parse().map_err(|e: hyper::http::uri::InvalidUri| {
        SinkError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        }
    })?;

    match uri.scheme_str() {
        Some("http") => Ok(uri),
        Some(_) => Err(SinkError::UnsupportedScheme(base_url.to_string())),
        None => Err(SinkError::InvalidUrl {
            url: base_url.to_string(),
            message: "missing scheme".into(),
        }),
    }
}
