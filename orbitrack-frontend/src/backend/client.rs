use anyhow::{Context, Result, bail};
use orbitrack_common::ElementSetRecord;
use std::time::Duration;
use tokio::sync::oneshot;

/// HTTP client for the backend's element-set endpoint
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    url: String,
}

impl BackendClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_element_sets(&self) -> Result<Vec<ElementSetRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Backend returned HTTP {}: {}", status.as_u16(), body);
        }

        let items: Vec<serde_json::Value> = response
            .json()
            .await
            .context("Failed to decode element-set records")?;
        Ok(decode_records(items))
    }

    /// Like [`fetch_element_sets`](Self::fetch_element_sets), but any failure is an empty list
    pub async fn fetch_or_empty(&self) -> Vec<ElementSetRecord> {
        match self.fetch_element_sets().await {
            Ok(records) => {
                tracing::info!("Fetched {} element-set records from {}", records.len(), self.url);
                records
            }
            Err(e) => {
                tracing::error!("Failed to fetch element sets: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Run the one initial fetch in the background; the receiver resolves once it is done
    pub fn spawn_initial_fetch(self) -> oneshot::Receiver<Vec<ElementSetRecord>> {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let records = self.fetch_or_empty().await;
            if tx.send(records).is_err() {
                tracing::warn!("Initial fetch finished after the viewer stopped");
            }
        });
        rx
    }
}

/// Decode each array item on its own; a malformed record is skipped, not the batch
fn decode_records(items: Vec<serde_json::Value>) -> Vec<ElementSetRecord> {
    let total = items.len();
    let records: Vec<ElementSetRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record at index {}: {}", index, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!("Kept {} of {} element-set records", records.len(), total);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

    async fn spawn_backend(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/tle-first-1000", addr)
    }

    fn client(url: &str) -> BackendClient {
        BackendClient::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_records() {
        let app = Router::new().route(
            "/tle-first-1000",
            get(|| async {
                r#"[{"id":1,"tle":"L1\nL2","info":{"satid":1,"satname":"Alpha"}},{"id":2,"error":"Failed"}]"#
            }),
        );
        let url = spawn_backend(app).await;

        let records = client(&url).fetch_element_sets().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_element_set(), Some("L1\nL2"));
        assert_eq!(records[1].error(), Some("Failed"));
    }

    #[tokio::test]
    async fn test_server_error_becomes_empty_list() {
        let app = Router::new().route(
            "/tle-first-1000",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#).into_response() }),
        );
        let url = spawn_backend(app).await;

        let client = client(&url);
        assert!(client.fetch_element_sets().await.is_err());
        assert!(client.fetch_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_record_does_not_drop_batch() {
        let app = Router::new().route(
            "/tle-first-1000",
            get(|| async {
                r#"[{"id":1,"tle":"L1\nL2","info":{"satid":1,"satname":"Alpha"}},{"id":2,"tle":null},"junk",{"id":3,"error":"Failed"}]"#
            }),
        );
        let url = spawn_backend(app).await;

        let records = client(&url).fetch_or_empty().await;

        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(records[0].raw_element_set(), Some("L1\nL2"));
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_empty_list() {
        let app = Router::new().route("/tle-first-1000", get(|| async { "not json" }));
        let url = spawn_backend(app).await;

        assert!(client(&url).fetch_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend_resolves_empty() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let rx = client(&format!("http://{}/tle-first-1000", addr)).spawn_initial_fetch();
        assert!(rx.await.unwrap().is_empty());
    }
}
