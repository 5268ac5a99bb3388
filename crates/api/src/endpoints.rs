//! Derivation of the server's stream, history and ingest URLs from one base.

use url::Url;

use crate::ClientError;

pub const STREAM_PATH: &str = "ws";
pub const HISTORY_PATH: &str = "history";
pub const INGEST_PATH: &str = "logs";

/// Resolved URLs for a single log server.
///
/// Paths are joined relative to the base, so a server mounted under a prefix
/// (`https://host/monitor/`) keeps that prefix. The stream URL mirrors the
/// base's security: `https` becomes `wss`, `http` becomes `ws`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoints {
    base: Url,
    stream: Url,
    history: Url,
    ingest: Url,
}

impl ServerEndpoints {
    pub fn parse(base: &str) -> Result<Self, ClientError> {
        let mut parsed = Url::parse(base.trim()).map_err(|error| ClientError::InvalidUrl {
            url: base.to_string(),
            reason: error.to_string(),
        })?;
        let stream_scheme = match parsed.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(ClientError::UnsupportedScheme(other.to_string())),
        };
        if parsed.host_str().is_none() {
            return Err(ClientError::InvalidUrl {
                url: base.to_string(),
                reason: "missing host".into(),
            });
        }
        parsed.set_query(None);
        parsed.set_fragment(None);
        if !parsed.path().ends_with('/') {
            let with_slash = format!("{}/", parsed.path());
            parsed.set_path(&with_slash);
        }

        let join = |path: &str| {
            parsed.join(path).map_err(|error| ClientError::InvalidUrl {
                url: base.to_string(),
                reason: error.to_string(),
            })
        };
        let history = join(HISTORY_PATH)?;
        let ingest = join(INGEST_PATH)?;
        let mut stream = join(STREAM_PATH)?;
        stream.set_scheme(stream_scheme).map_err(|_| ClientError::InvalidUrl {
            url: base.to_string(),
            reason: format!("cannot switch scheme to {stream_scheme}"),
        })?;

        Ok(Self {
            base: parsed,
            stream,
            history,
            ingest,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn stream(&self) -> &Url {
        &self.stream
    }

    pub fn history(&self) -> &Url {
        &self.history
    }

    pub fn ingest(&self) -> &Url {
        &self.ingest
    }
}
