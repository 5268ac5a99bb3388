use std::env;
use std::time::Duration;

use logtide_types::{LogRecord, NewLogEntry};
use reqwest::{Client, header};
use serde::Deserialize;
use tracing::debug;

use crate::connection::ReconnectPolicy;
use crate::endpoints::ServerEndpoints;
use crate::ClientError;
use crate::stream::LogStream;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around a configured `reqwest::Client` for one log server.
///
/// All URLs are derived once from the base URL; see [`ServerEndpoints`].
#[derive(Debug, Clone)]
pub struct LogServerClient {
    endpoints: ServerEndpoints,
    http: Client,
    user_agent: String,
}

/// Response body of the ingest route: `{"status": "success", "data": {..}}`.
#[derive(Debug, Deserialize)]
struct IngestResponse {
    data: LogRecord,
}

impl LogServerClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let endpoints = ServerEndpoints::parse(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            endpoints,
            http,
            user_agent: format!("logtide/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn endpoints(&self) -> &ServerEndpoints {
        &self.endpoints
    }

    /// Fetch previously emitted records, newest first as served.
    pub async fn fetch_history(&self, limit: Option<u32>) -> Result<Vec<LogRecord>, ClientError> {
        let url = self.endpoints.history().clone();
        debug!(%url, ?limit, "fetching history");
        let mut request = self.http.get(url).header(header::USER_AGENT, &self.user_agent);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let records = request.send().await?.error_for_status()?.json::<Vec<LogRecord>>().await?;
        debug!(count = records.len(), "history received");
        Ok(records)
    }

    /// Submit one record to the ingest route and return the stored copy,
    /// which carries the server-assigned timestamp.
    pub async fn publish(&self, entry: &NewLogEntry) -> Result<LogRecord, ClientError> {
        let url = self.endpoints.ingest().clone();
        debug!(%url, level = %entry.level, source = %entry.source, "publishing log entry");
        let response = self
            .http
            .post(url)
            .header(header::USER_AGENT, &self.user_agent)
            .json(entry)
            .send()
            .await?
            .error_for_status()?
            .json::<IngestResponse>()
            .await?;
        Ok(response.data)
    }

    /// Build the live stream for this server.
    pub fn stream(&self, policy: ReconnectPolicy) -> LogStream {
        LogStream::new(self.endpoints.stream().clone(), policy)
    }
}
