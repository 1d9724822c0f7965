// SPDX-License-Identifier: AGPL-3.0
// Gallery Core - Artwork catalog client
//
// Stateless: every call builds its own URL and the caller tracks the image
// base URL across responses. No retries at this layer.

use crate::model::{ArtworkRecord, CatalogEnvelope, CatalogPage};
use crate::types::{AppError, GallerySettings};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use url::Url;

/// Fields requested from the catalog for every artwork
pub const ARTWORK_FIELDS: &str = "id,title,artist_display,date_display,image_id,thumbnail,artwork_type_title,department_title,artist_title";

/// Result count requested by every search
pub const SEARCH_LIMIT: u32 = 100;

/// Target width of the IIIF image request
pub const IMAGE_WIDTH: u32 = 843;

/// Source of catalog pages. Implemented by [`ArtworkGateway`]; the seam lets
/// the controller run against any other source.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of the unfiltered catalog
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<CatalogPage, AppError>;

    /// Full-text search, limited to [`SEARCH_LIMIT`] results
    async fn search(&self, query: &str) -> Result<CatalogPage, AppError>;
}

/// HTTP client for the remote artwork catalog
pub struct ArtworkGateway {
    http_client: Client,
    api_base_url: String,
}

impl ArtworkGateway {
    pub fn new(settings: &GallerySettings) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent).map_err(|e| {
            AppError::InvalidConfig(format!("userAgent '{}': {}", settings.user_agent, e))
        })?;
        headers.insert(HeaderName::from_static("aic-user-agent"), agent);

        // Transport defaults apply for timeouts
        let http_client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(http_client, &settings.api_base_url))
    }

    /// Use a preconfigured client
    pub fn with_client(http_client: Client, api_base_url: &str) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/artworks?page=..&limit=..&fields=..`
    pub fn page_url(&self, page: u32, limit: u32) -> Result<Url, AppError> {
        if page == 0 {
            return Err(AppError::InvalidRequest("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(AppError::InvalidRequest("limit must be at least 1".to_string()));
        }

        parse_url(&format!(
            "{}/artworks?page={}&limit={}&fields={}",
            self.api_base_url, page, limit, ARTWORK_FIELDS
        ))
    }

    /// `{base}/artworks/search?q=..&limit=100&fields=..`
    pub fn search_url(&self, query: &str) -> Result<Url, AppError> {
        // encode() never fails, so the query is never sent raw
        let encoded = urlencoding::encode(query);

        parse_url(&format!(
            "{}/artworks/search?q={}&limit={}&fields={}",
            self.api_base_url, encoded, SEARCH_LIMIT, ARTWORK_FIELDS
        ))
    }

    async fn get_page(&self, url: Url) -> Result<CatalogPage, AppError> {
        tracing::debug!("GET {}", url);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_connect() {
                AppError::Network(format!("Cannot connect to catalog: {}", e))
            } else if e.is_timeout() {
                AppError::Network(format!("Catalog request timed out: {}", e))
            } else {
                AppError::Network(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Catalog returned status {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

        decode_page(&body)
    }
}

#[async_trait]
impl CatalogSource for ArtworkGateway {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<CatalogPage, AppError> {
        let url = self.page_url(page, limit)?;
        self.get_page(url).await
    }

    async fn search(&self, query: &str) -> Result<CatalogPage, AppError> {
        let url = self.search_url(query)?;
        self.get_page(url).await
    }
}

fn parse_url(raw: &str) -> Result<Url, AppError> {
    Url::parse(raw).map_err(|e| AppError::InvalidRequest(format!("'{}': {}", raw, e)))
}

/// Decode a response body into a [`CatalogPage`]
pub fn decode_page(body: &[u8]) -> Result<CatalogPage, AppError> {
    let envelope: CatalogEnvelope =
        serde_json::from_slice(body).map_err(|e| AppError::Decode(e.to_string()))?;
    Ok(envelope.into())
}

/// Build the full-size image URL for a record, or None when it has no image.
pub fn resolve_image_url(record: &ArtworkRecord, base_url: &str) -> Option<String> {
    let image_id = record.image_id.as_deref()?;
    Some(format!(
        "{}/{}/full/{},/0/default.jpg",
        base_url, image_id, IMAGE_WIDTH
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn gateway() -> ArtworkGateway {
        ArtworkGateway::with_client(Client::new(), "https://api.artic.edu/api/v1/")
    }

    fn record(image_id: Option<&str>) -> ArtworkRecord {
        ArtworkRecord {
            id: 7,
            title: "Water Lilies".to_string(),
            artist_display: "Claude Monet".to_string(),
            date_display: None,
            image_id: image_id.map(str::to_string),
            thumbnail: None,
            artwork_type_title: None,
            department_title: None,
            artist_title: None,
        }
    }

    #[test]
    fn test_page_url() {
        let url = gateway().page_url(2, 20).unwrap();
        assert_eq!(
            url.as_str(),
            format!(
                "https://api.artic.edu/api/v1/artworks?page=2&limit=20&fields={}",
                ARTWORK_FIELDS
            )
        );
    }

    #[test]
    fn test_page_url_rejects_zero() {
        assert!(matches!(
            gateway().page_url(0, 20),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            gateway().page_url(1, 0),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = gateway().search_url("Van Gogh & friends").unwrap();
        assert!(url
            .as_str()
            .starts_with("https://api.artic.edu/api/v1/artworks/search?q=Van%20Gogh%20%26%20friends&limit=100&fields="));

        let q: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(q[0], ("q".to_string(), "Van Gogh & friends".to_string()));
        assert_eq!(q[1], ("limit".to_string(), "100".to_string()));
        assert_eq!(q[2], ("fields".to_string(), ARTWORK_FIELDS.to_string()));
    }

    #[test]
    fn test_invalid_base_is_invalid_request() {
        let gateway = ArtworkGateway::with_client(Client::new(), "no scheme here");
        assert!(matches!(
            gateway.search_url("monet"),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_resolve_image_url() {
        for base in ["https://www.artic.edu/iiif/2", "https://mirror.example/iiif"] {
            assert_eq!(
                resolve_image_url(&record(Some("abc-123")), base),
                Some(format!("{}/abc-123/full/843,/0/default.jpg", base))
            );
            assert_eq!(resolve_image_url(&record(None), base), None);
        }
    }

    #[test]
    fn test_decode_page_errors_are_decode_failures() {
        assert!(matches!(
            decode_page(b"<html>Bad gateway</html>"),
            Err(AppError::Decode(_))
        ));
        // title is required
        assert!(matches!(
            decode_page(br#"{"data": [{"id": 1, "artist_display": "x"}]}"#),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_page() {
        let page = decode_page(
            br#"{"data": [{"id": 1, "title": "t", "artist_display": "a", "image_id": "i"}],
                "config": {"iiif_url": "https://other.example/iiif"}}"#,
        )
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(
            page.image_base_url.as_deref(),
            Some("https://other.example/iiif")
        );
    }

    /// Serve one canned HTTP response on a local port. The handle yields the
    /// raw request head.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}/api/v1", addr), handle)
    }

    fn local_gateway(base: &str) -> ArtworkGateway {
        let client = Client::builder().no_proxy().build().unwrap();
        ArtworkGateway::with_client(client, base)
    }

    #[tokio::test]
    async fn test_search_over_http() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"data": [{"id": 1, "title": "Irises", "artist_display": "Monet", "image_id": "i1"}],
                "pagination": {"total": 1},
                "config": {"iiif_url": "https://local.example/iiif"}}"#,
        )
        .await;

        let page = local_gateway(&base).search("water lilies").await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].title, "Irises");
        assert_eq!(
            page.image_base_url.as_deref(),
            Some("https://local.example/iiif")
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/v1/artworks/search?q=water%20lilies&limit=100&fields="));
    }

    #[tokio::test]
    async fn test_error_status_is_network_failure() {
        // The body would decode; the status alone must fail the request
        let (base, server) = serve_once("500 Internal Server Error", r#"{"data": []}"#).await;

        let result = local_gateway(&base).fetch_page(1, 20).await;
        assert!(matches!(result, Err(AppError::Network(ref m)) if m.contains("500")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_failure() {
        let (base, server) = serve_once("200 OK", "<html>maintenance</html>").await;

        let result = local_gateway(&base).fetch_page(1, 20).await;
        assert!(matches!(result, Err(AppError::Decode(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_failure() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let result = local_gateway(&format!("http://{}/api/v1", addr))
            .search("monet")
            .await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }
}
