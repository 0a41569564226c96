//! Search session state machine
//!
//! Owns the current search term, category filter, and page cursor, and decides
//! when a catalog fetch happens and with which parameters. Every method that
//! can trigger a fetch returns a [`FetchPlan`]; methods that can be a no-op
//! (blank search text, previous-page at the first page) return
//! `Option<FetchPlan>` so "nothing to fetch" is a typed outcome rather than a
//! convention.

use serde::{Deserialize, Serialize};

/// Number of results requested per page. Fixed by design.
pub const MAX_RESULTS_PER_PAGE: usize = 12;

/// Query used while the user has not entered a search term yet.
pub const DEFAULT_QUERY: &str = "bestseller";

/// Fixed category filter set. Every non-`All` category maps to a
/// `subject:` filter token appended to the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    All,
    Fiction,
    Science,
    History,
    Biography,
    Technology,
    Romance,
    Mystery,
    Poetry,
}

impl Category {
    /// All selectable categories, in display order.
    pub const ALL: [Category; 9] = [
        Category::All,
        Category::Fiction,
        Category::Science,
        Category::History,
        Category::Biography,
        Category::Technology,
        Category::Romance,
        Category::Mystery,
        Category::Poetry,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Fiction => "Fiction",
            Category::Science => "Science",
            Category::History => "History",
            Category::Biography => "Biography",
            Category::Technology => "Technology",
            Category::Romance => "Romance",
            Category::Mystery => "Mystery",
            Category::Poetry => "Poetry",
        }
    }

    /// Filter token appended to the search term. Empty for `All`.
    pub fn token(&self) -> &'static str {
        match self {
            Category::All => "",
            Category::Fiction => "subject:Fiction",
            Category::Science => "subject:Science",
            Category::History => "subject:History",
            Category::Biography => "subject:Biography",
            Category::Technology => "subject:Technology",
            Category::Romance => "subject:Romance",
            Category::Mystery => "subject:Mystery",
            Category::Poetry => "subject:Poetry",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a category label does not match the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Invalid category: {0}. Valid categories: all, fiction, science, history, \
     biography, technology, romance, mystery, poetry"
)]
pub struct CategoryParseError(pub String);

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .find(|c| c.label().to_ascii_lowercase() == normalized)
            .copied()
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// Parameters for one catalog search fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchPlan {
    /// Combined query string: search term plus category token.
    pub query: String,
    /// Result window offset: `page_index * MAX_RESULTS_PER_PAGE`.
    pub start_index: usize,
    /// Result window size.
    pub max_results: usize,
}

/// Ephemeral search view state: current term, category filter, page cursor.
///
/// Created with defaults at startup (empty term, `All`, page 0) and mutated
/// only through the action methods below. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    query_text: String,
    category: Category,
    page_index: usize,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Zero-based page cursor. The user-facing page number is this plus one.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Trimmed search term, falling back to [`DEFAULT_QUERY`] when empty.
    pub fn effective_term(&self) -> &str {
        let trimmed = self.query_text.trim();
        if trimmed.is_empty() {
            DEFAULT_QUERY
        } else {
            trimmed
        }
    }

    /// Search term plus category token, single-space separated and trimmed.
    pub fn combined_query(&self) -> String {
        format!("{} {}", self.effective_term(), self.category.token())
            .trim()
            .to_string()
    }

    /// Fetch parameters for the current state. Issued as-is on initial load.
    pub fn current_plan(&self) -> FetchPlan {
        FetchPlan {
            query: self.combined_query(),
            start_index: self.page_index * MAX_RESULTS_PER_PAGE,
            max_results: MAX_RESULTS_PER_PAGE,
        }
    }

    /// Explicit search submission. Blank or whitespace-only text is a no-op:
    /// no fetch, no state change. Otherwise the term is stored trimmed, the
    /// page cursor resets to 0, and a fetch plan is returned.
    pub fn submit_query(&mut self, raw: &str) -> Option<FetchPlan> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.query_text = trimmed.to_string();
        self.page_index = 0;
        Some(self.current_plan())
    }

    /// Category selection. Always resets the page cursor to 0 and fetches the
    /// current term (or the default when none has been entered).
    pub fn set_category(&mut self, category: Category) -> FetchPlan {
        self.category = category;
        self.page_index = 0;
        self.current_plan()
    }

    /// Advance one page and fetch at the new offset.
    pub fn next_page(&mut self) -> FetchPlan {
        self.page_index += 1;
        self.current_plan()
    }

    /// Go back one page. At the first page this is a no-op: no fetch, no
    /// state change.
    pub fn prev_page(&mut self) -> Option<FetchPlan> {
        if self.page_index == 0 {
            return None;
        }
        self.page_index -= 1;
        Some(self.current_plan())
    }
}
