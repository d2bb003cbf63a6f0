use crate::prelude::*;
use bookfinder_core::book::SearchResponse;
use bookfinder_core::error::SearchError;

/// Build the HTTP client used for every search request.
pub fn new_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("bookfinder/", env!("CARGO_PKG_VERSION")))
        .build()
        .wrap_err("Failed to build HTTP client")
}

/// Issue a single search request and parse the response body.
///
/// Non-success statuses map to [`SearchError::Network`], bodies that are not
/// a search response to [`SearchError::Parse`]. There is no retry and no
/// timeout.
pub async fn fetch_search(
    client: &reqwest::Client,
    url: &str,
) -> std::result::Result<SearchResponse, SearchError> {
    log::debug!("GET {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SearchError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Network(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| SearchError::Transport(e.to_string()))?;

    serde_json::from_str(&body).map_err(|e| SearchError::Parse(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    /// Serve `app` on an ephemeral local port and return its base URL.
    pub(crate) async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_search_success() {
        let app = Router::new().route(
            "/search.json",
            get(|| async {
                axum::Json(serde_json::json!({
                    "numFound": 1,
                    "docs": [{ "key": "/works/OL893415W", "title": "Dune" }]
                }))
            }),
        );
        let base = serve(app).await;

        let response = fetch_search(&new_client().unwrap(), &format!("{base}/search.json?title=Dune"))
            .await
            .unwrap();

        assert_eq!(response.num_found, Some(1));
        assert_eq!(response.docs[0].title.as_deref(), Some("Dune"));
    }

    #[tokio::test]
    async fn test_fetch_search_http_error() {
        let app = Router::new().route(
            "/search.json",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
        );
        let base = serve(app).await;

        let result = fetch_search(&new_client().unwrap(), &format!("{base}/search.json?q=x")).await;
        assert_eq!(result.unwrap_err(), SearchError::Network(503));
    }

    #[tokio::test]
    async fn test_fetch_search_malformed_body() {
        let app = Router::new().route("/search.json", get(|| async { "<html>oops</html>" }));
        let base = serve(app).await;

        let result = fetch_search(&new_client().unwrap(), &format!("{base}/search.json?q=x")).await;
        assert!(matches!(result, Err(SearchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_search_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = fetch_search(&new_client().unwrap(), &format!("http://{addr}/search.json")).await;
        assert!(matches!(result, Err(SearchError::Transport(_))));
    }
}
