//! Search request construction
//!
//! Maps a search mode and a free-text query onto a parameterized Open Library
//! search URL. Everything here is pure string building: empty queries are
//! rejected before a URL is ever built (see [`crate::accumulator::SearchState::begin`]).

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Default host for the search and catalog APIs.
pub const DEFAULT_API_BASE: &str = "https://openlibrary.org";

/// Path of the search endpoint, relative to the API base.
pub const SEARCH_PATH: &str = "/search.json";

/// Fields requested from the search API for every document.
pub const SEARCH_FIELDS: &str =
    "key,title,author_name,first_publish_year,cover_i,language,subject,isbn";

/// Number of documents requested per API page.
pub const API_PAGE_LIMIT: usize = 40;

/// Which catalog field a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Title,
    Author,
    Isbn,
    Subject,
    #[default]
    All,
}

impl SearchMode {
    /// Query parameter name used for this mode.
    pub fn param(self) -> &'static str {
        match self {
            SearchMode::Title => "title",
            SearchMode::Author => "author",
            SearchMode::Isbn => "isbn",
            SearchMode::Subject => "subject",
            SearchMode::All => "q",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Title => "title",
            SearchMode::Author => "author",
            SearchMode::Isbn => "isbn",
            SearchMode::Subject => "subject",
            SearchMode::All => "all",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown modes fall back to free-text search, so parsing never fails.
impl FromStr for SearchMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "title" => SearchMode::Title,
            "author" => SearchMode::Author,
            "isbn" => SearchMode::Isbn,
            "subject" => SearchMode::Subject,
            _ => SearchMode::All,
        })
    }
}

/// Build the search URL for one API page.
///
/// # Arguments
/// * `api_base` - Scheme and host, without a trailing slash
/// * `mode` - Selects the query parameter name
/// * `query` - Trimmed, non-empty query text
/// * `page` - 1-indexed API page
pub fn build_search_url(api_base: &str, mode: SearchMode, query: &str, page: u32) -> String {
    format!(
        "{}{}?{}={}&page={}&fields={}&limit={}",
        api_base.trim_end_matches('/'),
        SEARCH_PATH,
        mode.param(),
        urlencoding::encode(query),
        page,
        SEARCH_FIELDS,
        API_PAGE_LIMIT
    )
}

/// Build a free-text search that matches exactly one catalog key.
pub fn build_key_lookup_url(api_base: &str, key: &str) -> String {
    format!(
        "{}{}?q={}&page=1&fields={}&limit=1",
        api_base.trim_end_matches('/'),
        SEARCH_PATH,
        urlencoding::encode(&format!("key:{key}")),
        SEARCH_FIELDS
    )
}

/// Normalize user input into a catalog key such as `/works/OL45804W`.
///
/// Accepts a bare id (`OL45804W`), a key (`/works/OL45804W`) or a catalog URL
/// (`https://openlibrary.org/works/OL45804W`).
pub fn normalize_key(input: &str) -> Result<String, SearchError> {
    let re = Regex::new(r"^(?:https?://openlibrary\.org)?(/(?:works|books|authors)/)?(OL\d+[WMA])(?:/.*)?$")
        .map_err(|e| SearchError::InvalidKey(e.to_string()))?;

    let caps = re
        .captures(input.trim())
        .ok_or_else(|| SearchError::InvalidKey(input.to_string()))?;

    let id = &caps[2];
    let prefix = match caps.get(1) {
        Some(prefix) => prefix.as_str(),
        None => match id.chars().last() {
            Some('M') => "/books/",
            Some('A') => "/authors/",
            _ => "/works/",
        },
    };

    Ok(format!("{prefix}{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [SearchMode; 5] = [
        SearchMode::Title,
        SearchMode::Author,
        SearchMode::Isbn,
        SearchMode::Subject,
        SearchMode::All,
    ];

    fn params(url: &str) -> Vec<(String, String)> {
        let (_, query) = url.split_once('?').unwrap();
        query
            .split('&')
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap();
                (k.to_string(), v.to_string())
            })
            .collect()
    }

    #[test]
    fn test_title_scenario() {
        let url = build_search_url(DEFAULT_API_BASE, SearchMode::Title, "Dune", 1);
        assert!(url.starts_with("https://openlibrary.org/search.json?"));
        assert!(url.contains("title=Dune&page=1"));
    }

    #[test]
    fn test_exactly_one_mode_param() {
        for mode in MODES {
            let url = build_search_url(DEFAULT_API_BASE, mode, "rust", 3);
            let params = params(&url);
            let mode_params: Vec<_> = params
                .iter()
                .filter(|(k, _)| ["title", "author", "isbn", "subject", "q"].contains(&k.as_str()))
                .collect();

            assert_eq!(mode_params.len(), 1, "{url}");
            assert_eq!(mode_params[0].0, mode.param());
            assert!(params.contains(&("page".to_string(), "3".to_string())));
            assert!(params.contains(&("fields".to_string(), SEARCH_FIELDS.to_string())));
            assert!(params.contains(&("limit".to_string(), "40".to_string())));
        }
    }

    #[test]
    fn test_query_is_percent_encoded() {
        let url = build_search_url(DEFAULT_API_BASE, SearchMode::All, "lord of the rings & co", 1);
        assert!(url.contains("q=lord%20of%20the%20rings%20%26%20co&page=1"));
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let url = build_search_url("http://localhost:8080/", SearchMode::Author, "Herbert", 2);
        assert!(url.starts_with("http://localhost:8080/search.json?author=Herbert&page=2"));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("title".parse::<SearchMode>().unwrap(), SearchMode::Title);
        assert_eq!("AUTHOR".parse::<SearchMode>().unwrap(), SearchMode::Author);
        assert_eq!("isbn".parse::<SearchMode>().unwrap(), SearchMode::Isbn);
        assert_eq!("subject".parse::<SearchMode>().unwrap(), SearchMode::Subject);
        assert_eq!("all".parse::<SearchMode>().unwrap(), SearchMode::All);
        assert_eq!("anything".parse::<SearchMode>().unwrap(), SearchMode::All);
    }

    #[test]
    fn test_mode_display_roundtrip() {
        for mode in MODES {
            assert_eq!(mode.to_string().parse::<SearchMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_key_lookup_url() {
        let url = build_key_lookup_url(DEFAULT_API_BASE, "/works/OL45804W");
        assert!(url.contains("q=key%3A%2Fworks%2FOL45804W&page=1"));
        assert!(url.ends_with("&limit=1"));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("OL45804W").unwrap(), "/works/OL45804W");
        assert_eq!(normalize_key("OL7353617M").unwrap(), "/books/OL7353617M");
        assert_eq!(normalize_key("OL23919A").unwrap(), "/authors/OL23919A");
        assert_eq!(normalize_key("/works/OL45804W").unwrap(), "/works/OL45804W");
        assert_eq!(
            normalize_key("https://openlibrary.org/works/OL45804W/Fantastic_Mr_Fox").unwrap(),
            "/works/OL45804W"
        );
    }

    #[test]
    fn test_normalize_key_invalid() {
        assert!(normalize_key("").is_err());
        assert!(normalize_key("dune").is_err());
        assert!(normalize_key("https://example.com/works/OL1W").is_err());
        assert!(normalize_key("OL1Wjunk").is_err());
        assert!(normalize_key("/works/OL1W2").is_err());
    }
}
