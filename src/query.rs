use url::Url;

use crate::model::{FilterSet, PAGE_SIZE, Scope, SearchInput};

/// Projection requested from the search endpoint; enough for cards and the detail view.
pub const FIELDS: &str =
    "key,title,author_name,first_publish_year,cover_i,subject,language,isbn,number_of_pages_median";

/// Everything needed to issue one search request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    endpoint: Url,
    params: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    /// All values of `name`, in the order they were appended.
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.params
            .iter()
            .filter(move |(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }

    pub fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())));
        url
    }
}

/// Returns `None` for blank query text: no request should fire.
pub fn build(
    endpoint: &Url,
    query: &str,
    scope: Scope,
    filters: &FilterSet,
    page: u32,
) -> Option<RequestDescriptor> {
    if query.trim().is_empty() {
        return None;
    }

    let mut params = vec![(scope.param(), query.to_owned())];

    if let Some(code) = filters.language.code() {
        params.push(("language", code.to_owned()));
    }
    // Both bounds go out as separate parameters under the same name.
    if let Some(from) = filters.year_from {
        params.push(("first_publish_year", format!("[{from} TO *]")));
    }
    if let Some(to) = filters.year_to {
        params.push(("first_publish_year", format!("[* TO {to}]")));
    }
    if filters.free_to_read {
        params.push(("has_fulltext", "true".to_owned()));
    }

    params.push(("page", page.max(1).to_string()));
    params.push(("limit", PAGE_SIZE.to_string()));
    params.push(("fields", FIELDS.to_owned()));

    Some(RequestDescriptor {
        endpoint: endpoint.clone(),
        params,
    })
}

pub fn build_for(endpoint: &Url, input: &SearchInput) -> Option<RequestDescriptor> {
    build(
        endpoint,
        &input.query_text,
        input.scope,
        &input.filters,
        input.page,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LanguageFilter;

    fn endpoint() -> Url {
        Url::parse("https://openlibrary.org/search.json").unwrap()
    }

    #[test]
    fn blank_query_builds_nothing() {
        let filters = FilterSet {
            free_to_read: true,
            ..FilterSet::default()
        };
        assert!(build(&endpoint(), "", Scope::Title, &filters, 3).is_none());
        assert!(build(&endpoint(), "   \t", Scope::All, &filters, 1).is_none());
    }

    #[test]
    fn title_scope_with_default_filters() {
        let request = build(&endpoint(), "foo", Scope::Title, &FilterSet::default(), 1).unwrap();
        assert_eq!(request.value("title"), Some("foo"));
        assert_eq!(request.value("q"), None);
        assert_eq!(request.value("page"), Some("1"));
        assert_eq!(request.value("limit"), Some("20"));
        assert_eq!(request.value("fields"), Some(FIELDS));
        assert_eq!(request.value("language"), None);
        assert_eq!(request.value("first_publish_year"), None);
        assert_eq!(request.value("has_fulltext"), None);
    }

    #[test]
    fn each_scope_uses_its_own_parameter() {
        for scope in Scope::ALL {
            let request = build(&endpoint(), "x", scope, &FilterSet::default(), 1).unwrap();
            assert_eq!(request.value(scope.param()), Some("x"));
            let query_params = ["q", "title", "author", "subject", "isbn"]
                .iter()
                .filter(|name| request.value(name).is_some())
                .count();
            assert_eq!(query_params, 1, "scope {scope:?}");
        }
    }

    #[test]
    fn general_scope_encodes_spaces_as_plus() {
        let request = build(&endpoint(), "test book", Scope::All, &FilterSet::default(), 1).unwrap();
        let url = request.url();
        let query = url.query().unwrap();
        assert!(query.starts_with("q=test+book&page=1&limit=20&fields="), "{query}");
    }

    #[test]
    fn free_to_read_is_independent_of_other_filters() {
        let combos = [
            FilterSet::default(),
            FilterSet {
                language: LanguageFilter::Code("fre".to_owned()),
                ..FilterSet::default()
            },
            FilterSet {
                year_from: Some(1990),
                year_to: Some(2000),
                ..FilterSet::default()
            },
        ];
        for filters in combos {
            let filters = FilterSet {
                free_to_read: true,
                ..filters
            };
            let request = build(&endpoint(), "x", Scope::All, &filters, 1).unwrap();
            assert_eq!(request.value("has_fulltext"), Some("true"));
        }
    }

    #[test]
    fn year_bounds_append_two_ranges() {
        let filters = FilterSet {
            year_from: Some(2000),
            year_to: Some(1990),
            ..FilterSet::default()
        };
        let request = build(&endpoint(), "x", Scope::All, &filters, 2).unwrap();
        let ranges = request.values("first_publish_year").collect::<Vec<_>>();
        assert_eq!(ranges, vec!["[2000 TO *]", "[* TO 1990]"]);
        assert_eq!(request.value("page"), Some("2"));
    }

    #[test]
    fn language_all_is_not_sent() {
        let filters = FilterSet {
            language: LanguageFilter::All,
            ..FilterSet::default()
        };
        let request = build(&endpoint(), "x", Scope::All, &filters, 1).unwrap();
        assert_eq!(request.value("language"), None);

        let filters = FilterSet {
            language: LanguageFilter::Code("ger".to_owned()),
            ..FilterSet::default()
        };
        let request = build(&endpoint(), "x", Scope::All, &filters, 1).unwrap();
        assert_eq!(request.value("language"), Some("ger"));
    }

    #[test]
    fn identical_inputs_build_identical_descriptors() {
        let filters = FilterSet {
            year_from: Some(1950),
            free_to_read: true,
            ..FilterSet::default()
        };
        let a = build(&endpoint(), "dune", Scope::Subject, &filters, 4);
        let b = build(&endpoint(), "dune", Scope::Subject, &filters, 4);
        assert_eq!(a, b);
    }
}
