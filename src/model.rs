use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Fixed number of results requested per page.
pub const PAGE_SIZE: u32 = 20;

/// Which structured field of the remote search the query text is matched against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    All,
    Title,
    Author,
    Subject,
    Isbn,
}

impl Scope {
    pub const ALL: [Scope; 5] = [
        Scope::All,
        Scope::Title,
        Scope::Author,
        Scope::Subject,
        Scope::Isbn,
    ];

    /// Unrecognized values fall back to a general text search.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" => Self::Title,
            "author" => Self::Author,
            "subject" => Self::Subject,
            "isbn" => Self::Isbn,
            "" | "all" => Self::All,
            other => {
                tracing::debug!(scope = other, "unknown search scope; using general text");
                Self::All
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Fields",
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Subject => "Subject",
            Self::Isbn => "ISBN",
        }
    }

    /// Name of the upstream query parameter that carries the query text.
    pub fn param(self) -> &'static str {
        match self {
            Self::All => "q",
            Self::Title => "title",
            Self::Author => "author",
            Self::Subject => "subject",
            Self::Isbn => "isbn",
        }
    }
}

/// Languages offered by name; any other code is passed through as-is.
pub const KNOWN_LANGUAGES: [(&str, &str); 5] = [
    ("eng", "English"),
    ("fre", "French"),
    ("ger", "German"),
    ("spa", "Spanish"),
    ("ita", "Italian"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFilter {
    #[default]
    All,
    Code(String),
}

impl LanguageFilter {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let code = raw.trim().to_ascii_lowercase();
        if code.is_empty() || code == "all" {
            return Ok(Self::All);
        }
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            anyhow::bail!("invalid language code: {raw:?}");
        }
        Ok(Self::Code(code))
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Code(code) => Some(code.as_str()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "All Languages".to_owned(),
            Self::Code(code) => KNOWN_LANGUAGES
                .iter()
                .find(|(known, _)| known == code)
                .map(|(_, label)| (*label).to_owned())
                .unwrap_or_else(|| code.clone()),
        }
    }
}

/// Independent, non-exclusive filters. `year_from > year_to` is passed upstream unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FilterSet {
    pub language: LanguageFilter,
    pub year_from: Option<u32>,
    pub year_to: Option<u32>,
    pub free_to_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchInput {
    pub query_text: String,
    pub scope: Scope,
    pub filters: FilterSet,
    pub page: u32,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            scope: Scope::All,
            filters: FilterSet::default(),
            page: 1,
        }
    }
}

/// One document from the remote search, in the shape the API returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookSummary {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub subject: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
    #[serde(default)]
    pub isbn: Vec<String>,
    #[serde(default)]
    pub number_of_pages_median: Option<u32>,
}

impl BookSummary {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn authors(&self) -> Option<String> {
        if self.author_name.is_empty() {
            return None;
        }
        Some(self.author_name.join(", "))
    }
}

/// Body of a search response. Missing `docs` and `numFound` default to empty/zero.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<BookSummary>,
    #[serde(default, rename = "numFound")]
    pub num_found: u64,
}

/// Book keys marked as favorites for the lifetime of one session.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSet {
    keys: HashSet<String>,
}

impl FavoriteSet {
    /// Returns `true` when the key is a favorite after the toggle.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.remove(key) {
            return false;
        }
        self.keys.insert(key.to_owned());
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
