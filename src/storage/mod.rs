use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod database;
pub mod migrations;
pub mod query;

/// Unique lecture identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LectureId(pub String);

impl LectureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for LectureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LectureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who may discover a lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Six-character shareable access code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrivateCode(String);

impl PrivateCode {
    pub const LEN: usize = 6;

    /// Accepts exactly six ASCII letters or digits.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    /// Caller guarantees the shape `parse` would check.
    pub(crate) fn new_unchecked(s: String) -> Self {
        debug_assert!(Self::parse(&s).is_some());
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrivateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored lecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub title: String,
    pub video_url: Option<String>,
    pub transcription: Option<String>,
    pub created_at: DateTime<Utc>,
    pub visibility: Visibility,
    pub private_code: Option<PrivateCode>,
}

impl Lecture {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Lecture"
        } else {
            &self.title
        }
    }
}

/// Everything needed to write a lecture; id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewLecture {
    pub title: String,
    pub visibility: Visibility,
    pub private_code: Option<PrivateCode>,
    pub video_url: Option<String>,
    pub transcription: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lecture_ids_are_unique() {
        assert_ne!(LectureId::new(), LectureId::new());
    }

    #[test]
    fn test_visibility_roundtrip() {
        for v in [Visibility::Public, Visibility::Private] {
            assert_eq!(Visibility::from_str(v.as_str()), Some(v));
        }
        assert_eq!(Visibility::from_str("unlisted"), None);
    }

    #[test]
    fn test_private_code_parse() {
        assert!(PrivateCode::parse("aB3xY9").is_some());
        assert!(PrivateCode::parse("abc").is_none());
        assert!(PrivateCode::parse("abcdefg").is_none());
        assert!(PrivateCode::parse("ab-cd9").is_none());
        assert!(PrivateCode::parse("ábcde").is_none());
    }

    #[test]
    fn test_untitled_display() {
        let lecture = Lecture {
            id: LectureId::new(),
            title: "  ".to_string(),
            video_url: None,
            transcription: None,
            created_at: Utc::now(),
            visibility: Visibility::Public,
            private_code: None,
        };
        assert_eq!(lecture.display_title(), "Untitled Lecture");
    }
}
