use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    /// Used on result cards.
    Medium,
    /// Used in the detail view.
    Large,
}

impl CoverSize {
    fn suffix(self) -> &'static str {
        match self {
            Self::Medium => "M",
            Self::Large => "L",
        }
    }
}

/// `None` when the book has no cover; callers render a placeholder instead.
pub fn cover_url(covers_base: &Url, cover_id: Option<i64>, size: CoverSize) -> Option<Url> {
    let id = cover_id?;
    let path = format!("b/id/{id}-{}.jpg", size.suffix());
    with_trailing_slash(covers_base).join(&path).ok()
}

/// Link to the work page for a document key such as `/works/OL45804W`.
pub fn work_url(site_base: &Url, key: &str) -> Option<Url> {
    if key.is_empty() {
        return None;
    }
    let key = key.trim_start_matches('/');
    with_trailing_slash(site_base).join(key).ok()
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
