//! Fetch+decode helper shared by every collector.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::collector::ScrapeError;

/// Issue one GET against `endpoint` and decode the JSON body into `T`.
///
/// Transport failures and non-2xx statuses surface as
/// [`ScrapeError::Network`]; a body that is not valid JSON of the expected
/// shape surfaces as [`ScrapeError::Decode`]. There are no retries within
/// one invocation: a failed fetch is the collector's error for this poll
/// and recovery happens naturally on the next cycle.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    endpoint: &str,
) -> Result<T, ScrapeError> {
    let response = client
        .get(endpoint)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(ScrapeError::Network)?;

    let body = response.bytes().await.map_err(ScrapeError::Network)?;
    serde_json::from_slice(&body).map_err(ScrapeError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use serde::Deserialize;
    use tokio::net::TcpListener;

    #[derive(Debug, Deserialize)]
    struct Payload {
        status: String,
        count: u64,
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let base = serve(Router::new().route(
            "/stats",
            get(|| async { r#"{"status":"green","count":7}"# }),
        ))
        .await;

        let client = Client::new();
        let payload: Payload = fetch_json(&client, &format!("{base}/stats")).await.unwrap();
        assert_eq!(payload.status, "green");
        assert_eq!(payload.count, 7);
    }

    #[tokio::test]
    async fn test_fetch_json_non_2xx_is_network_error() {
        let base = serve(Router::new().route(
            "/stats",
            get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;

        let client = Client::new();
        let err = fetch_json::<Payload>(&client, &format!("{base}/stats"))
            .await
            .unwrap_err();
        assert_eq!(err.class(), "network");
    }

    #[tokio::test]
    async fn test_fetch_json_malformed_body_is_decode_error() {
        let base = serve(Router::new().route("/stats", get(|| async { "{not json" }))).await;

        let client = Client::new();
        let err = fetch_json::<Payload>(&client, &format!("{base}/stats"))
            .await
            .unwrap_err();
        assert_eq!(err.class(), "decode");
    }

    #[tokio::test]
    async fn test_fetch_json_connection_refused_is_network_error() {
        let client = Client::new();
        // Port 1 is never listening on loopback in the test environment.
        let err = fetch_json::<Payload>(&client, "http://127.0.0.1:1/stats")
            .await
            .unwrap_err();
        assert_eq!(err.class(), "network");
    }
}
