pub mod state;
pub mod view;

pub use state::{update, Action, DashboardState, Deletion, Effect, Status};
pub use view::View;

use crate::lectures::LectureService;

/// Runs the dashboard state machine against a lecture service.
///
/// Each dispatched action is folded into the state; any resulting effect is
/// performed immediately and its completion fed back in, until the machine
/// settles.
pub struct Dashboard {
    state: DashboardState,
    service: LectureService,
}

impl Dashboard {
    pub fn new(service: LectureService) -> Self {
        Self {
            state: DashboardState::default(),
            service,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn service(&self) -> &LectureService {
        &self.service
    }

    pub fn dispatch(&mut self, action: Action) {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            let (state, effect) = update(std::mem::take(&mut self.state), action);
            self.state = state;
            next = effect.map(|effect| self.perform(effect));
        }
    }

    fn perform(&mut self, effect: Effect) -> Action {
        match effect {
            Effect::Query { request, query } => {
                let outcome = self.service.run_query(&query).map_err(|e| {
                    tracing::warn!("Lecture query failed: {}", e);
                    e.to_string()
                });
                Action::QueryFinished { request, outcome }
            }
            Effect::Create(draft) => {
                let outcome = self.service.create(draft).map_err(|e| {
                    tracing::error!("Failed to create lecture: {}", e);
                    e.to_string()
                });
                Action::CreateFinished(outcome)
            }
            Effect::Delete(id) => {
                let outcome = self.service.delete(&id).map(|_| id).map_err(|e| {
                    tracing::error!("Failed to delete lecture: {}", e);
                    e.to_string()
                });
                Action::DeleteFinished(outcome)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodePolicy;
    use crate::lectures::LectureDraft;
    use crate::storage::database::Database;
    use crate::storage::Visibility;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dashboard() -> Dashboard {
        let service = LectureService::with_rng(
            Database::open_in_memory().unwrap(),
            CodePolicy::Always,
            StdRng::seed_from_u64(5),
        );
        Dashboard::new(service)
    }

    fn create(dash: &mut Dashboard, title: &str, visibility: Visibility) {
        dash.dispatch(Action::SubmitCreate(LectureDraft::new(title, visibility)));
    }

    fn titles(dash: &Dashboard) -> Vec<String> {
        let mut titles: Vec<String> = dash
            .state()
            .lectures
            .iter()
            .map(|l| l.title.clone())
            .collect();
        titles.sort();
        titles
    }

    #[test]
    fn test_create_refreshes_active_view() {
        let mut dash = dashboard();
        dash.dispatch(Action::SelectView(View::Lectures));
        assert!(dash.state().lectures.is_empty());

        create(&mut dash, "Genetics", Visibility::Private);
        assert_eq!(titles(&dash), vec!["Genetics"]);
        assert_eq!(dash.state().status, Status::Idle);
    }

    #[test]
    fn test_blank_title_creates_nothing() {
        let mut dash = dashboard();
        dash.dispatch(Action::SelectView(View::Lectures));
        create(&mut dash, "", Visibility::Public);

        dash.dispatch(Action::Refresh);
        assert!(dash.state().lectures.is_empty());
        assert_eq!(dash.service().database().count_lectures().unwrap(), 0);
    }

    #[test]
    fn test_blank_title_after_create_reports_nothing_saved() {
        let mut dash = dashboard();
        dash.dispatch(Action::SelectView(View::Lectures));
        create(&mut dash, "First", Visibility::Private);
        assert!(dash.state().last_created.is_some());

        create(&mut dash, "", Visibility::Private);
        assert!(dash.state().last_created.is_none());
        assert_eq!(dash.service().database().count_lectures().unwrap(), 1);
    }

    #[test]
    fn test_discover_search_excludes_private() {
        let mut dash = dashboard();
        create(&mut dash, "Quantum basics", Visibility::Public);
        create(&mut dash, "Quantum office hours", Visibility::Private);

        dash.dispatch(Action::SelectView(View::Discover));
        dash.dispatch(Action::Search("Quantum".to_string()));
        assert_eq!(titles(&dash), vec!["Quantum basics"]);

        dash.dispatch(Action::SelectView(View::Lectures));
        dash.dispatch(Action::Search("Quantum".to_string()));
        assert_eq!(
            titles(&dash),
            vec!["Quantum basics", "Quantum office hours"]
        );
    }

    #[test]
    fn test_title_prefix_search() {
        let mut dash = dashboard();
        for title in ["Intro", "Introduction", "Advanced"] {
            create(&mut dash, title, Visibility::Public);
        }
        dash.dispatch(Action::SelectView(View::Lectures));
        dash.dispatch(Action::Search("Intro".to_string()));
        assert_eq!(titles(&dash), vec!["Intro", "Introduction"]);
    }

    #[test]
    fn test_code_search_finds_private_lecture() {
        let mut dash = dashboard();
        create(&mut dash, "Seminar", Visibility::Private);
        dash.dispatch(Action::SelectView(View::Lectures));
        let code = dash.state().lectures[0].private_code.clone().unwrap();

        dash.dispatch(Action::SelectView(View::CodeSearch));
        assert!(dash.state().lectures.is_empty());

        dash.dispatch(Action::Search(code.to_string()));
        assert_eq!(titles(&dash), vec!["Seminar"]);
    }

    #[test]
    fn test_requery_is_idempotent() {
        let mut dash = dashboard();
        create(&mut dash, "One", Visibility::Public);
        create(&mut dash, "Two", Visibility::Public);
        dash.dispatch(Action::SelectView(View::Discover));
        let first = dash.state().lectures.clone();
        dash.dispatch(Action::Refresh);
        assert_eq!(dash.state().lectures, first);
    }

    #[test]
    fn test_delete_takes_two_steps() {
        let mut dash = dashboard();
        create(&mut dash, "Doomed", Visibility::Public);
        dash.dispatch(Action::SelectView(View::Lectures));
        let id = dash.state().lectures[0].id.clone();

        dash.dispatch(Action::RequestDelete(id.clone()));
        assert_eq!(dash.service().database().count_lectures().unwrap(), 1);
        assert_eq!(dash.state().pending_deletion(), Some(&id));

        dash.dispatch(Action::ConfirmDelete);
        assert_eq!(dash.service().database().count_lectures().unwrap(), 0);
        assert!(dash.state().lectures.is_empty());
        assert_eq!(dash.state().deletion, Deletion::None);
    }

    #[test]
    fn test_cancelled_delete_keeps_record() {
        let mut dash = dashboard();
        create(&mut dash, "Survivor", Visibility::Public);
        dash.dispatch(Action::SelectView(View::Lectures));
        let id = dash.state().lectures[0].id.clone();

        dash.dispatch(Action::RequestDelete(id));
        dash.dispatch(Action::CancelDelete);
        dash.dispatch(Action::ConfirmDelete);
        assert_eq!(dash.service().database().count_lectures().unwrap(), 1);
    }
}
