//! HTTP client for the remote status service.
//!
//! The service exposes `GET /query/{kind}` returning an object keyed by entity
//! ID, and `GET /shutdown`.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;

use crate::error::{Error, Result};
use crate::models::{EntityKind, Normalizer, Record, Snapshot};

/// Client bound to one status service endpoint.
#[derive(Debug, Clone)]
pub struct StatusClient {
    client: Client,
    base_url: String,
    normalizer: Normalizer,
}

impl StatusClient {
    /// Client for the service forwarded to `localhost:port`.
    pub fn local(port: u16, timeout: Duration) -> Result<Self> {
        Self::new(format!("http://127.0.0.1:{}", port), timeout)
    }

    /// Every request made through this client is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            normalizer: Normalizer::default(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and normalize a snapshot of all entities of `kind`.
    ///
    /// A non-200 answer means "no data" and yields an empty snapshot. Network
    /// failures and undecodable bodies are [`Error::Transport`].
    pub async fn query(&self, kind: EntityKind) -> Result<Snapshot> {
        let url = format!("{}/query/{}", self.base_url, kind);
        let transport = |source: reqwest::Error| Error::Transport {
            url: url.clone(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;
        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(%url, status = %response.status(), "status query returned no data");
            return Ok(Snapshot::empty(kind));
        }

        let raw: BTreeMap<String, Record> = response.json().await.map_err(transport)?;
        tracing::debug!(%kind, count = raw.len(), "status query succeeded");
        Ok(Snapshot::from_raw(kind, raw, &self.normalizer))
    }

    /// Like [`query`](Self::query), but a failed request degrades to an empty
    /// snapshot. The error is handed back for the caller to report.
    pub async fn query_or_empty(&self, kind: EntityKind) -> (Snapshot, Option<Error>) {
        match self.query(kind).await {
            Ok(snapshot) => (snapshot, None),
            Err(e) => {
                tracing::warn!(%kind, error = %e, "status query failed, showing no data");
                (Snapshot::empty(kind), Some(e))
            }
        }
    }

    /// Ask the service to stop. Any non-2xx answer is an error.
    pub async fn shutdown(&self) -> Result<()> {
        let url = format!("{}/shutdown", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { url, status });
        }
        tracing::info!(%url, "status service shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_query_jobs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query/job"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"14.server": {"attributes": {"Job_Name": "relax", "job_state": "R"}}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = StatusClient::new(server.uri(), TIMEOUT).unwrap();
        let snapshot = client.query(EntityKind::Job).await.unwrap();

        assert_eq!(snapshot.kind(), EntityKind::Job);
        assert_eq!(snapshot.len(), 1);
        let job = snapshot.get("14.server").unwrap();
        assert_eq!(job.attr("job_name").unwrap().to_string(), "relax");
    }

    #[tokio::test]
    async fn test_non_200_is_empty_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query/queue"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = StatusClient::new(server.uri(), TIMEOUT).unwrap();
        let snapshot = client.query(EntityKind::Queue).await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.kind(), EntityKind::Queue);
    }

    #[tokio::test]
    async fn test_bad_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query/job"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = StatusClient::new(server.uri(), TIMEOUT).unwrap();
        let err = client.query(EntityKind::Job).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        // port 9 (discard) is closed on test machines
        let client = StatusClient::new("http://127.0.0.1:9", TIMEOUT).unwrap();
        let err = client.query(EntityKind::Job).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_query_or_empty_degrades_on_transport_failure() {
        let client = StatusClient::new("http://127.0.0.1:9", TIMEOUT).unwrap();
        let (snapshot, err) = client.query_or_empty(EntityKind::Queue).await;
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.kind(), EntityKind::Queue);
        assert!(matches!(err, Some(Error::Transport { .. })));
    }

    #[tokio::test]
    async fn test_request_timeout_is_applied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query/job"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = StatusClient::new(server.uri(), Duration::from_millis(100)).unwrap();
        let err = client.query(EntityKind::Job).await.unwrap_err();
        match err {
            Error::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shutdown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shutdown"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = StatusClient::new(format!("{}/", server.uri()), TIMEOUT).unwrap();
        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shutdown"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = StatusClient::new(server.uri(), TIMEOUT).unwrap();
        let err = client.shutdown().await.unwrap_err();
        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 500));
    }
}
