use std::fmt::{self, Write as _};

use url::Url;

use crate::covers::{self, CoverSize};
use crate::model::{BookSummary, FavoriteSet};
use crate::view::{Pagination, SKELETON_CARDS, ViewState};

/// Subjects listed in the detail view.
const MAX_SUBJECTS: usize = 10;

pub struct Renderer<'a> {
    pub covers_url: &'a Url,
    pub site_url: &'a Url,
    pub favorites: &'a FavoriteSet,
}

impl Renderer<'_> {
    pub fn view(&self, view: &ViewState) -> Result<String, fmt::Error> {
        let mut out = String::new();
        match view {
            ViewState::Skeleton => {
                writeln!(out, "Searching...")?;
                for _ in 0..SKELETON_CARDS {
                    writeln!(out, "  [.........]")?;
                }
            }
            ViewState::Error { message } => {
                writeln!(out, "Something went wrong")?;
                writeln!(out, "{message}")?;
                writeln!(out, "Type :retry to try again.")?;
            }
            ViewState::Empty { query: Some(query) } => {
                writeln!(out, "No books found for \"{query}\"")?;
                writeln!(
                    out,
                    "Try different keywords, check spelling, or adjust your filters"
                )?;
            }
            ViewState::Empty { query: None } => {
                writeln!(out, "Start your search")?;
                writeln!(
                    out,
                    "Search millions of books from the Open Library collection"
                )?;
            }
            ViewState::Results {
                total,
                items,
                pagination,
            } => {
                writeln!(out, "{} Results", group_thousands(*total))?;
                for (idx, book) in items.iter().enumerate() {
                    self.write_card(&mut out, idx + 1, book)?;
                }
                if let Some(pagination) = pagination {
                    write_pagination(&mut out, pagination)?;
                }
            }
        }
        Ok(out)
    }

    fn write_card(&self, out: &mut String, number: usize, book: &BookSummary) -> fmt::Result {
        let marker = if self.favorites.contains(&book.key) {
            "♥"
        } else {
            " "
        };
        writeln!(out, "{number:>3}. {marker} {}", book.display_title())?;
        if let Some(authors) = book.authors() {
            writeln!(out, "        by {authors}")?;
        }
        if let Some(year) = book.first_publish_year {
            writeln!(out, "        {year}")?;
        }
        match covers::cover_url(self.covers_url, book.cover_i, CoverSize::Medium) {
            Some(url) => writeln!(out, "        cover: {url}"),
            None => writeln!(out, "        cover: (none)"),
        }
    }

    pub fn details(&self, book: &BookSummary) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "Book Details")?;
        writeln!(out, "{}", book.display_title())?;
        if let Some(authors) = book.authors() {
            writeln!(out, "Author: {authors}")?;
        }
        if let Some(year) = book.first_publish_year {
            writeln!(out, "Published: {year}")?;
        }
        if !book.language.is_empty() {
            writeln!(out, "Languages: {}", book.language.join(", "))?;
        }
        if let Some(pages) = book.number_of_pages_median {
            writeln!(out, "Pages: {pages}")?;
        }
        if !book.subject.is_empty() {
            writeln!(out, "Subjects:")?;
            for subject in book.subject.iter().take(MAX_SUBJECTS) {
                writeln!(out, "  - {subject}")?;
            }
        }
        if let Some(url) = covers::cover_url(self.covers_url, book.cover_i, CoverSize::Large) {
            writeln!(out, "Cover: {url}")?;
        }
        if let Some(url) = covers::work_url(self.site_url, &book.key) {
            writeln!(out, "View on Open Library: {url}")?;
        }
        if self.favorites.contains(&book.key) {
            writeln!(out, "♥ Favorite")?;
        }
        Ok(out)
    }
}

fn write_pagination(out: &mut String, pagination: &Pagination) -> fmt::Result {
    writeln!(
        out,
        "Showing page {} of {} ({} total results)",
        pagination.current,
        pagination.total_pages,
        group_thousands(pagination.total)
    )?;
    let mut bar = Vec::new();
    if pagination.has_previous() {
        bar.push("< Previous".to_owned());
    }
    for page in pagination.pages() {
        if page == pagination.current {
            bar.push(format!("[{page}]"));
        } else {
            bar.push(page.to_string());
        }
    }
    if pagination.has_next() {
        bar.push("Next >".to_owned());
    }
    writeln!(out, "{}", bar.join(" "))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
