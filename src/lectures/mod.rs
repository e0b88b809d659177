pub mod code;

use crate::config::CodePolicy;
use crate::error::{ProfessorError, Result};
use crate::storage::database::Database;
use crate::storage::query::LectureQuery;
use crate::storage::{Lecture, LectureId, NewLecture, PrivateCode, Visibility};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// User-supplied fields of a lecture that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureDraft {
    pub title: String,
    pub visibility: Visibility,
    pub video_url: Option<String>,
    pub transcription: Option<String>,
}

impl LectureDraft {
    pub fn new(title: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            title: title.into(),
            visibility,
            video_url: None,
            transcription: None,
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Reads and writes lectures on behalf of the dashboard.
pub struct LectureService {
    db: Database,
    policy: CodePolicy,
    rng: StdRng,
}

impl LectureService {
    pub fn new(db: Database, policy: CodePolicy) -> Self {
        Self::with_rng(db, policy, StdRng::from_entropy())
    }

    pub fn with_rng(db: Database, policy: CodePolicy, rng: StdRng) -> Self {
        Self { db, policy, rng }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn run_query(&self, query: &LectureQuery) -> Result<Vec<Lecture>> {
        self.db.query(query)
    }

    pub fn get(&self, id: &LectureId) -> Result<Lecture> {
        self.db
            .get_lecture(id)?
            .ok_or_else(|| ProfessorError::LectureNotFound(id.to_string()))
    }

    /// Allocate a code (per policy) and write the lecture as a single row.
    ///
    /// Nothing is written when the title is blank or the store cannot be read.
    pub fn create(&mut self, draft: LectureDraft) -> Result<Lecture> {
        self.create_with(draft, code::allocate::<StdRng>)
    }

    fn create_with<F>(&mut self, draft: LectureDraft, mut next_code: F) -> Result<Lecture>
    where
        F: FnMut(&Database, &mut StdRng) -> Result<PrivateCode>,
    {
        if !draft.has_title() {
            return Err(ProfessorError::Validation(
                "lecture title is required".to_string(),
            ));
        }

        let wants_code = match self.policy {
            CodePolicy::Always => true,
            CodePolicy::PrivateOnly => draft.visibility == Visibility::Private,
        };

        loop {
            let private_code = if wants_code {
                Some(next_code(&self.db, &mut self.rng)?)
            } else {
                None
            };

            let new = NewLecture {
                title: draft.title.clone(),
                visibility: draft.visibility,
                private_code,
                video_url: draft.video_url.clone(),
                transcription: draft.transcription.clone(),
            };

            match self.db.insert_lecture(&new) {
                Ok(lecture) => {
                    tracing::info!(
                        "Created {} lecture {} ({})",
                        lecture.visibility,
                        lecture.id,
                        lecture.display_title()
                    );
                    return Ok(lecture);
                }
                Err(ProfessorError::CodeConflict(code)) => {
                    tracing::warn!("Private code {} was taken before write, retrying", code);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn delete(&self, id: &LectureId) -> Result<()> {
        if self.db.delete_lecture(id)? {
            tracing::info!("Deleted lecture {}", id);
            Ok(())
        } else {
            Err(ProfessorError::LectureNotFound(id.to_string()))
        }
    }
}
