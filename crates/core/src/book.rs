use serde::{Deserialize, Serialize};

/// Host serving cover images.
pub const COVERS_BASE: &str = "https://covers.openlibrary.org";

/// Host of the browsable catalog.
pub const CATALOG_BASE: &str = "https://openlibrary.org";

/// Search document as returned by the search API
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SearchDoc {
    pub key: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    pub first_publish_year: Option<i32>,
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub language: Vec<String>,
    #[serde(default)]
    pub subject: Vec<String>,
    #[serde(default)]
    pub isbn: Vec<String>,
}

/// Search API response body
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
    #[serde(rename = "numFound", alias = "num_found")]
    pub num_found: Option<u64>,
}

/// A search result wrapped with its stable identifier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Book {
    /// Catalog key, e.g. `/works/OL45804W`
    pub id: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub cover_id: Option<i64>,
    pub languages: Vec<String>,
    pub subjects: Vec<String>,
    pub isbns: Vec<String>,
}

impl Book {
    /// Wrap a search document with its stable identifier.
    ///
    /// Documents without a catalog key cannot be deduplicated or referenced
    /// and are dropped.
    pub fn from_doc(doc: SearchDoc) -> Option<Book> {
        let id = doc.key.filter(|key| !key.trim().is_empty())?;

        Some(Book {
            id,
            title: doc.title,
            authors: doc.author_name,
            year: doc.first_publish_year,
            cover_id: doc.cover_i,
            languages: doc.language,
            subjects: doc.subject,
            isbns: doc.isbn,
        })
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    pub fn cover_url(&self, size: CoverSize) -> Option<String> {
        cover_url(self.cover_id, &self.isbns, size)
    }

    pub fn catalog_url(&self) -> String {
        catalog_url(&self.id)
    }
}

/// Convert every document of a response into books, in API order.
pub fn books_from_response(response: SearchResponse) -> Vec<Book> {
    response.docs.into_iter().filter_map(Book::from_doc).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl CoverSize {
    fn suffix(self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

/// Build a cover image URL from a cover id, falling back to the first ISBN.
pub fn cover_url(cover_id: Option<i64>, isbns: &[String], size: CoverSize) -> Option<String> {
    if let Some(id) = cover_id {
        return Some(format!("{COVERS_BASE}/b/id/{id}-{}.jpg", size.suffix()));
    }

    isbns
        .first()
        .map(|isbn| format!("{COVERS_BASE}/b/isbn/{isbn}-{}.jpg", size.suffix()))
}

/// Browsable catalog page for a catalog key.
pub fn catalog_url(key: &str) -> String {
    format!("{CATALOG_BASE}{key}")
}
