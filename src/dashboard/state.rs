//! Pure dashboard state machine.
//!
//! [`update`] maps `(state, action)` to `(state, effect)`. Effects describe store
//! work for the driver to perform; their completions come back as actions.

use crate::dashboard::view::View;
use crate::lectures::LectureDraft;
use crate::storage::query::LectureQuery;
use crate::storage::{Lecture, LectureId};

/// Identifies one issued query so late completions can be recognised.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Deletion {
    #[default]
    None,
    Pending(LectureId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    pub view: View,
    /// Last query issued for the current view
    pub active_query: Option<LectureQuery>,
    pub lectures: Vec<Lecture>,
    pub deletion: Deletion,
    pub status: Status,
    pub latest_request: RequestId,
    /// Most recent lecture created from this dashboard
    pub last_created: Option<Lecture>,
}

#[derive(Debug, Clone)]
pub enum Action {
    SelectView(View),
    /// Title search in Lectures/Discover, code lookup in CodeSearch
    Search(String),
    Refresh,
    QueryFinished {
        request: RequestId,
        outcome: Result<Vec<Lecture>, String>,
    },
    SubmitCreate(LectureDraft),
    CreateFinished(Result<Lecture, String>),
    RequestDelete(LectureId),
    ConfirmDelete,
    CancelDelete,
    DeleteFinished(Result<LectureId, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Query {
        request: RequestId,
        query: LectureQuery,
    },
    Create(LectureDraft),
    Delete(LectureId),
}

impl DashboardState {
    pub fn new(view: View) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn pending_deletion(&self) -> Option<&LectureId> {
        match &self.deletion {
            Deletion::Pending(id) => Some(id),
            Deletion::None => None,
        }
    }

    fn issue(mut self, query: LectureQuery) -> (Self, Option<Effect>) {
        self.latest_request += 1;
        self.active_query = Some(query.clone());
        self.status = Status::Loading;
        let effect = Effect::Query {
            request: self.latest_request,
            query,
        };
        (self, Some(effect))
    }

    fn requery(self) -> (Self, Option<Effect>) {
        match self.active_query.clone() {
            Some(query) => self.issue(query),
            None => (self, None),
        }
    }
}

pub fn update(state: DashboardState, action: Action) -> (DashboardState, Option<Effect>) {
    match action {
        Action::SelectView(view) => {
            let mut state = DashboardState {
                view,
                active_query: None,
                lectures: Vec::new(),
                deletion: Deletion::None,
                status: Status::Idle,
                last_created: None,
                ..state
            };
            match view.entry_query() {
                Some(query) => state.issue(query),
                None => {
                    // Abandon anything in flight for the previous view.
                    state.latest_request += 1;
                    (state, None)
                }
            }
        }

        Action::Search(term) => match state.view.search_query(&term) {
            Some(query) => state.issue(query),
            None => (state, None),
        },

        Action::Refresh => state.requery(),

        Action::QueryFinished { request, outcome } => {
            if request != state.latest_request {
                tracing::debug!(
                    "dropping stale query result {} (latest {})",
                    request,
                    state.latest_request
                );
                return (state, None);
            }
            let mut state = state;
            match outcome {
                Ok(lectures) => {
                    state.lectures = lectures;
                    state.status = Status::Idle;
                }
                // Previous results stay visible.
                Err(message) => state.status = Status::Failed(message),
            }
            (state, None)
        }

        Action::SubmitCreate(draft) => {
            let state = DashboardState {
                last_created: None,
                ..state
            };
            if !draft.has_title() {
                return (state, None);
            }
            (state, Some(Effect::Create(draft)))
        }

        Action::CreateFinished(Ok(lecture)) => DashboardState {
            last_created: Some(lecture),
            ..state
        }
        .requery(),

        Action::CreateFinished(Err(message)) => (
            DashboardState {
                status: Status::Failed(message),
                last_created: None,
                ..state
            },
            None,
        ),

        Action::RequestDelete(id) => (
            DashboardState {
                deletion: Deletion::Pending(id),
                ..state
            },
            None,
        ),

        Action::ConfirmDelete => {
            let effect = state.pending_deletion().cloned().map(Effect::Delete);
            (state, effect)
        }

        Action::CancelDelete => (
            DashboardState {
                deletion: Deletion::None,
                ..state
            },
            None,
        ),

        Action::DeleteFinished(Ok(id)) => {
            let mut state = state;
            if state.pending_deletion() == Some(&id) {
                state.deletion = Deletion::None;
            }
            state.requery()
        }

        Action::DeleteFinished(Err(message)) => (
            DashboardState {
                deletion: Deletion::None,
                status: Status::Failed(message),
                ..state
            },
            None,
        ),
    }
}
