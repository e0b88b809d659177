use crate::error::{ProfessorError, Result};
use crate::storage::migrations;
use crate::storage::query::LectureQuery;
use crate::storage::{Lecture, LectureId, NewLecture, PrivateCode, Visibility};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::path::Path;

const LECTURE_COLUMNS: &str =
    "id, title, video_url, transcription, created_at, visibility, private_code";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Write one complete lecture row and return it with its assigned id.
    ///
    /// Fails with [`ProfessorError::CodeConflict`] if another lecture already
    /// holds the requested private code.
    pub fn insert_lecture(&self, new: &NewLecture) -> Result<Lecture> {
        let lecture = Lecture {
            id: LectureId::new(),
            title: new.title.clone(),
            video_url: new.video_url.clone(),
            transcription: new.transcription.clone(),
            created_at: Utc::now().trunc_subsecs(6),
            visibility: new.visibility,
            private_code: new.private_code.clone(),
        };

        let inserted = self.conn.execute(
            "INSERT INTO lectures (id, title, video_url, transcription, created_at, visibility, private_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                lecture.id.0,
                lecture.title,
                lecture.video_url,
                lecture.transcription,
                format_timestamp(&lecture.created_at),
                lecture.visibility.as_str(),
                lecture.private_code.as_ref().map(|c| c.as_str()),
            ],
        );

        match inserted {
            Ok(_) => Ok(lecture),
            Err(e) if is_private_code_conflict(&e) => Err(ProfessorError::CodeConflict(
                lecture
                    .private_code
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_lecture(&self, id: &LectureId) -> Result<Option<Lecture>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM lectures WHERE id = ?1",
            LECTURE_COLUMNS
        ))?;

        let lecture = stmt.query_row([&id.0], row_to_lecture).optional()?;

        Ok(lecture)
    }

    /// Returns whether a row was removed.
    pub fn delete_lecture(&self, id: &LectureId) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM lectures WHERE id = ?1", [&id.0])?;
        Ok(removed > 0)
    }

    pub fn code_exists(&self, code: &PrivateCode) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM lectures WHERE private_code = ?1)",
            [code.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn query(&self, query: &LectureQuery) -> Result<Vec<Lecture>> {
        let (tail, params) = query.to_sql();
        let sql = format!("SELECT {} FROM lectures{}", LECTURE_COLUMNS, tail);
        tracing::debug!("lecture query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let lectures = stmt
            .query_map(params_from_iter(params.iter()), row_to_lecture)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(lectures)
    }

    pub fn count_lectures(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lectures", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Fixed-width RFC 3339 so that text ordering in SQL matches time ordering.
fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_lecture(row: &Row<'_>) -> rusqlite::Result<Lecture> {
    let created_raw: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    let visibility_raw: String = row.get(5)?;
    let visibility = Visibility::from_str(&visibility_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown visibility {:?}", visibility_raw).into(),
        )
    })?;

    Ok(Lecture {
        id: LectureId::from_string(row.get(0)?),
        title: row.get(1)?,
        video_url: row.get(2)?,
        transcription: row.get(3)?,
        created_at,
        visibility,
        private_code: row
            .get::<_, Option<String>>(6)?
            .and_then(|c| PrivateCode::parse(&c)),
    })
}

fn is_private_code_conflict(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, msg) => {
            err.code == ErrorCode::ConstraintViolation
                && msg
                    .as_deref()
                    .map(|m| m.contains("private_code"))
                    .unwrap_or(false)
        }
        _ => false,
    }
}

trait OptionalExt<T> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::query::{Filter, DISCOVER_LIMIT};
    use chrono::Duration;

    fn new_lecture(title: &str, visibility: Visibility, code: Option<&str>) -> NewLecture {
        NewLecture {
            title: title.to_string(),
            visibility,
            private_code: code.and_then(PrivateCode::parse),
            video_url: None,
            transcription: None,
        }
    }

    fn insert_at(db: &Database, title: &str, visibility: Visibility, at: DateTime<Utc>) {
        db.conn
            .execute(
                "INSERT INTO lectures (id, title, created_at, visibility) VALUES (?1, ?2, ?3, ?4)",
                params![
                    LectureId::new().0,
                    title,
                    format_timestamp(&at),
                    visibility.as_str()
                ],
            )
            .unwrap();
    }

    fn titles(lectures: &[Lecture]) -> Vec<&str> {
        lectures.iter().map(|l| l.title.as_str()).collect()
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("professor.db");
        let db = Database::open(&path).unwrap();
        db.insert_lecture(&new_lecture("Persisted", Visibility::Public, None))
            .unwrap();
        drop(db);

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.count_lectures().unwrap(), 1);
    }

    #[test]
    fn test_lecture_crud() {
        let db = Database::open_in_memory().unwrap();

        let mut new = new_lecture("Linear Algebra", Visibility::Private, Some("Qw3rT9"));
        new.video_url = Some("https://bucket.s3.amazonaws.com/uploads/1_la.mp4".to_string());
        new.transcription = Some("Today we cover eigenvectors".to_string());
        let created = db.insert_lecture(&new).unwrap();

        let loaded = db.get_lecture(&created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.private_code.as_ref().unwrap().as_str(), "Qw3rT9");

        assert!(db.delete_lecture(&created.id).unwrap());
        assert!(db.get_lecture(&created.id).unwrap().is_none());
        assert!(!db.delete_lecture(&created.id).unwrap());
    }

    #[test]
    fn test_duplicate_code_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_lecture(&new_lecture("First", Visibility::Private, Some("AAAAAA")))
            .unwrap();

        let err = db
            .insert_lecture(&new_lecture("Second", Visibility::Public, Some("AAAAAA")))
            .unwrap_err();
        assert!(matches!(err, ProfessorError::CodeConflict(ref c) if c == "AAAAAA"));
        assert_eq!(db.count_lectures().unwrap(), 1);
    }

    #[test]
    fn test_lectures_without_code_do_not_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.insert_lecture(&new_lecture("One", Visibility::Public, None))
            .unwrap();
        db.insert_lecture(&new_lecture("Two", Visibility::Public, None))
            .unwrap();
        assert_eq!(db.count_lectures().unwrap(), 2);
    }

    #[test]
    fn test_code_exists() {
        let db = Database::open_in_memory().unwrap();
        db.insert_lecture(&new_lecture("Coded", Visibility::Private, Some("zZ9yY8")))
            .unwrap();
        assert!(db.code_exists(&PrivateCode::parse("zZ9yY8").unwrap()).unwrap());
        assert!(!db.code_exists(&PrivateCode::parse("ZZ9YY8").unwrap()).unwrap());
    }

    #[test]
    fn test_prefix_search() {
        let db = Database::open_in_memory().unwrap();
        for title in ["Intro", "Introduction", "Advanced"] {
            db.insert_lecture(&new_lecture(title, Visibility::Public, None))
                .unwrap();
        }

        let mut found = titles(&db.query(&LectureQuery::title_prefix("Intro")).unwrap())
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        found.sort();
        assert_eq!(found, vec!["Intro", "Introduction"]);
    }

    #[test]
    fn test_prefix_search_with_visibility() {
        let db = Database::open_in_memory().unwrap();
        db.insert_lecture(&new_lecture("Calculus I", Visibility::Public, None))
            .unwrap();
        db.insert_lecture(&new_lecture("Calculus II", Visibility::Private, Some("c4lc22")))
            .unwrap();

        let query =
            LectureQuery::title_prefix("Calculus").and(Filter::Visibility(Visibility::Public));
        let found = db.query(&query).unwrap();
        assert_eq!(titles(&found), vec!["Calculus I"]);
    }

    #[test]
    fn test_discover_order_and_cap() {
        let db = Database::open_in_memory().unwrap();
        let base = Utc::now() - Duration::days(1);
        for i in 0..25 {
            insert_at(
                &db,
                &format!("Public {:02}", i),
                Visibility::Public,
                base + Duration::minutes(i),
            );
        }
        insert_at(&db, "Private newest", Visibility::Private, Utc::now());

        let found = db.query(&LectureQuery::discover()).unwrap();
        assert_eq!(found.len(), DISCOVER_LIMIT);
        let expected: Vec<String> = (5..25).rev().map(|i| format!("Public {:02}", i)).collect();
        assert_eq!(
            titles(&found),
            expected.iter().map(String::as_str).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_code_search_ignores_public_lectures() {
        let db = Database::open_in_memory().unwrap();
        db.insert_lecture(&new_lecture("Open", Visibility::Public, Some("PUB123")))
            .unwrap();
        db.insert_lecture(&new_lecture("Closed", Visibility::Private, Some("PRV123")))
            .unwrap();

        assert!(db.query(&LectureQuery::by_code("PUB123")).unwrap().is_empty());
        let found = db.query(&LectureQuery::by_code("PRV123")).unwrap();
        assert_eq!(titles(&found), vec!["Closed"]);
    }

    #[test]
    fn test_requery_is_stable() {
        let db = Database::open_in_memory().unwrap();
        for title in ["B", "A", "C"] {
            db.insert_lecture(&new_lecture(title, Visibility::Public, None))
                .unwrap();
        }
        let first = db.query(&LectureQuery::all()).unwrap();
        let second = db.query(&LectureQuery::all()).unwrap();
        assert_eq!(first, second);
    }
}
