use crate::storage::query::{Filter, LectureQuery};
use crate::storage::Visibility;

/// The three mutually exclusive dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Lectures,
    Discover,
    CodeSearch,
}

impl View {
    pub const ALL: [View; 3] = [View::Lectures, View::Discover, View::CodeSearch];

    pub fn label(&self) -> &'static str {
        match self {
            View::Lectures => "Your Lectures",
            View::Discover => "Discover",
            View::CodeSearch => "Search by Code",
        }
    }

    /// Query run on entering the view; CodeSearch waits for a submitted code.
    pub fn entry_query(&self) -> Option<LectureQuery> {
        match self {
            View::Lectures => Some(LectureQuery::all()),
            View::Discover => Some(LectureQuery::discover()),
            View::CodeSearch => None,
        }
    }

    /// Query for a typed search term. A blank term falls back to the entry query.
    pub fn search_query(&self, term: &str) -> Option<LectureQuery> {
        let term = term.trim();
        match self {
            View::CodeSearch => Some(LectureQuery::by_code(term)),
            _ if term.is_empty() => self.entry_query(),
            View::Lectures => Some(LectureQuery::title_prefix(term)),
            View::Discover => Some(
                LectureQuery::title_prefix(term).and(Filter::Visibility(Visibility::Public)),
            ),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
