//! Composable read queries over the lecture collection.
//!
//! A [`LectureQuery`] is a conjunction of [`Filter`]s plus optional ordering and
//! a result cap. The SQLite store compiles the whole conjunction into a single
//! statement, so combinations such as "title starts with X and is public" are
//! evaluated in one pass rather than as a store query followed by a local filter.

use crate::storage::Visibility;

/// Number of lectures shown on the Discover view
pub const DISCOVER_LIMIT: usize = 20;

/// Appended to a search term to form the exclusive upper bound of a prefix range.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Visibility(Visibility),
    PrivateCode(String),
    /// Half-open range `[term, term + U+F8FF)` over the title
    TitlePrefix(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Store-defined order
    Unordered,
    NewestFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureQuery {
    pub filters: Vec<Filter>,
    pub order: Order,
    pub limit: Option<usize>,
}

impl LectureQuery {
    /// Every lecture, no filter
    pub fn all() -> Self {
        Self {
            filters: Vec::new(),
            order: Order::Unordered,
            limit: None,
        }
    }

    /// Most recent public lectures
    pub fn discover() -> Self {
        Self::all()
            .and(Filter::Visibility(Visibility::Public))
            .newest_first()
            .limit(DISCOVER_LIMIT)
    }

    /// Private lectures holding exactly this code
    pub fn by_code(code: &str) -> Self {
        Self::all()
            .and(Filter::PrivateCode(code.to_string()))
            .and(Filter::Visibility(Visibility::Private))
    }

    pub fn title_prefix(term: &str) -> Self {
        Self::all().and(Filter::TitlePrefix(term.to_string()))
    }

    pub fn and(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order = Order::NewestFirst;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as a WHERE/ORDER/LIMIT tail plus its positional text parameters.
    pub(crate) fn to_sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        for filter in &self.filters {
            match filter {
                Filter::Visibility(v) => {
                    params.push(v.as_str().to_string());
                    clauses.push(format!("visibility = ?{}", params.len()));
                }
                Filter::PrivateCode(code) => {
                    params.push(code.clone());
                    clauses.push(format!("private_code = ?{}", params.len()));
                }
                Filter::TitlePrefix(term) => {
                    params.push(term.clone());
                    let lower = params.len();
                    params.push(prefix_upper_bound(term));
                    clauses.push(format!("title >= ?{} AND title < ?{}", lower, params.len()));
                }
            }
        }

        let mut sql = String::new();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if self.order == Order::NewestFirst {
            sql.push_str(" ORDER BY created_at DESC");
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, params)
    }
}

pub fn prefix_upper_bound(term: &str) -> String {
    let mut upper = String::with_capacity(term.len() + PREFIX_SENTINEL.len_utf8());
    upper.push_str(term);
    upper.push(PREFIX_SENTINEL);
    upper
}
