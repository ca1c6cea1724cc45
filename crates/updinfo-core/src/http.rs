use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use updinfo_backend::{Endpoint, Transport, TransportError};

const FETCH_OPERATION: &str = "fetch update info";
const BODY_SNIPPET_CHARS: usize = 160;

/// Fetches update info over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with its own client.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("updinfo/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| TransportError::network_request_from("build http client", error))?;
        Ok(Self { client })
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, endpoint: &Endpoint) -> Result<Vec<u8>, TransportError> {
        debug!("Requesting update info from {endpoint}");

        let response = self
            .client
            .get(endpoint.as_str())
            .send()
            .await
            .map_err(|error| TransportError::network_request_from(FETCH_OPERATION, error))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_snippet = response
                .text()
                .await
                .ok()
                .map(|body| response_snippet(&body, BODY_SNIPPET_CHARS))
                .unwrap_or_default();
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body_snippet,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| TransportError::network_body_from(FETCH_OPERATION, error))?;
        Ok(body.to_vec())
    }
}

/// Reads update info from a local file, for `file://` endpoints and plain
/// paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

impl FileTransport {
    fn path_of(endpoint: &Endpoint) -> Result<PathBuf, TransportError> {
        match endpoint.scheme() {
            None => Ok(PathBuf::from(endpoint.as_str())),
            Some("file") => Ok(PathBuf::from(
                endpoint.as_str().trim_start_matches("file://"),
            )),
            Some(_) => Err(TransportError::UnsupportedEndpoint {
                endpoint: endpoint.to_string(),
                reason: "only file:// endpoints and plain paths are readable from disk",
            }),
        }
    }
}

#[async_trait]
impl Transport for FileTransport {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, endpoint: &Endpoint) -> Result<Vec<u8>, TransportError> {
        let path = Self::path_of(endpoint)?;
        debug!("Reading update info from {}", path.display());
        Ok(tokio::fs::read(&path).await?)
    }
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.trim().chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_snippet_is_prefixed_and_truncated() {
        assert_eq!(response_snippet("  service down \n", 160), ": service down");
        assert_eq!(response_snippet("abcdef", 3), ": abc");
        assert_eq!(response_snippet("   ", 160), "");
    }

    #[test]
    fn file_transport_resolves_paths() {
        assert_eq!(
            FileTransport::path_of(&Endpoint::new("file:///tmp/info.json"))
                .expect("file url resolves"),
            PathBuf::from("/tmp/info.json")
        );
        assert_eq!(
            FileTransport::path_of(&Endpoint::new("fixtures/info.json"))
                .expect("plain path resolves"),
            PathBuf::from("fixtures/info.json")
        );
        assert!(matches!(
            FileTransport::path_of(&Endpoint::new("https://example.com/info.json")),
            Err(TransportError::UnsupportedEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn file_transport_reads_payload() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("info.json");
        std::fs::write(&path, br#"{"channels": []}"#).expect("payload should be written");

        let payload = FileTransport
            .fetch(&Endpoint::new(path.display().to_string()))
            .await
            .expect("payload should be read");

        assert_eq!(payload, br#"{"channels": []}"#);
    }

    #[tokio::test]
    async fn file_transport_maps_missing_file_to_io_error() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let missing = temp_dir.path().join("missing.json");

        let error = FileTransport
            .fetch(&Endpoint::new(missing.display().to_string()))
            .await
            .expect_err("missing file should fail");

        assert!(matches!(
            error,
            TransportError::IoError { kind, .. } if kind == std::io::ErrorKind::NotFound
        ));
    }
}
