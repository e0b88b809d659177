use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfessorError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Private code already in use: {0}")]
    CodeConflict(String),

    #[error("Lecture not found: {0}")]
    LectureNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Prompt cancelled: {0}")]
    Prompt(String),

    /// Failure the dashboard already rendered as a message
    #[error("{0}")]
    Dashboard(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProfessorError>;
