//! HTTP client for the matters service.
//!
//! Fetches `GET {base}/api/matters/{matter_id}`. The merge engine treats every
//! failure here as an empty record, so this client only reports errors and
//! never retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use ccl_core::{Error, MatterRecord, MatterSource, Result};

/// Matters lookup over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMatterSource {
    client: Client,
    base_url: Url,
}

impl HttpMatterSource {
    /// Create a client for the matters service at `base_url`.
    ///
    /// `timeout` bounds each lookup; `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid matters base URL {}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "matters base URL must be http or https, got: {}",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    /// URL of the lookup for `matter_id`, with the identifier percent-encoded.
    pub fn matter_url(&self, matter_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("cannot append path to {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "matters", matter_id]);
        Ok(url)
    }
}

#[async_trait]
impl MatterSource for HttpMatterSource {
    async fn fetch_matter(&self, matter_id: &str) -> Result<MatterRecord> {
        let url = self.matter_url(matter_id)?;
        debug!(
            subsystem = "merge",
            component = "matters_client",
            op = "fetch_matter",
            matter_id,
            url = %url,
            "Fetching matter record"
        );

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Upstream {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<MatterRecord>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_matter_url_encodes_identifier() {
        let source = HttpMatterSource::new("http://localhost:8080/", None).unwrap();
        let url = source.matter_url("HLX 42").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/matters/HLX%2042");
    }

    #[test]
    fn test_matter_url_keeps_base_path() {
        let source = HttpMatterSource::new("http://gateway.local/matters-svc", None).unwrap();
        let url = source.matter_url("7").unwrap();
        assert_eq!(url.as_str(), "http://gateway.local/matters-svc/api/matters/7");
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(matches!(
            HttpMatterSource::new("ftp://example.com", None),
            Err(Error::Config(_))
        ));
        assert!(HttpMatterSource::new("not a url", None).is_err());
    }

    #[tokio::test]
    async fn test_fetch_matter_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/matters/12345"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_number": "SMITH-0001",
                "description": "Boundary dispute",
                "opponents": [{ "name": "Jones Estates Ltd" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpMatterSource::new(&mock_server.uri(), None).unwrap();
        let record = source.fetch_matter("12345").await.unwrap();

        assert_eq!(record.display_number(), "SMITH-0001");
        assert_eq!(record.description(), "Boundary dispute");
        assert_eq!(record.opponents[0].party_name(), "Jones Estates Ltd");
    }

    #[tokio::test]
    async fn test_fetch_matter_tolerates_off_type_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/matters/2024001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "DisplayNumber": 2024001,
                "description": "Lease dispute",
                "opponents": { "name": "Jones Estates Ltd" },
                "team_assignments": ["not", "an", "object"]
            })))
            .mount(&mock_server)
            .await;

        let source = HttpMatterSource::new(&mock_server.uri(), None).unwrap();
        let record = source.fetch_matter("2024001").await.unwrap();

        assert_eq!(record.display_number(), "2024001");
        assert_eq!(record.description(), "Lease dispute");
        assert_eq!(record.opponents[0].party_name(), "Jones Estates Ltd");
        assert!(record.team_assignments.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_matter_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/matters/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let source = HttpMatterSource::new(&mock_server.uri(), None).unwrap();
        let err = source.fetch_matter("404").await.unwrap_err();

        assert!(matches!(err, Error::Upstream { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_matter_invalid_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/matters/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let source = HttpMatterSource::new(&mock_server.uri(), None).unwrap();
        assert!(matches!(
            source.fetch_matter("1").await,
            Err(Error::Request(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_matter_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/matters/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let source =
            HttpMatterSource::new(&mock_server.uri(), Some(Duration::from_millis(50))).unwrap();
        assert!(source.fetch_matter("slow").await.is_err());
    }
}
