use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessorConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub lectures: LectureConfig,

    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database (None = XDG data dir)
    pub database_path: Option<PathBuf>,
}

/// Which lectures receive a shareable private code at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePolicy {
    /// Every lecture gets a code, public ones included
    #[default]
    Always,
    /// Only private lectures get a code
    PrivateOnly,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LectureConfig {
    #[serde(default)]
    pub code_policy: CodePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// OpenAI API key (falls back to OPENAI_API_KEY)
    pub api_key: Option<String>,
    /// Hosted Whisper model identifier
    #[serde(default = "default_whisper_model")]
    pub model: String,
    /// Upper bound on the source media download, in seconds
    #[serde(default = "default_media_timeout")]
    pub media_timeout_secs: u64,
    #[serde(default = "default_transcription_url")]
    pub api_url: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_whisper_model(),
            media_timeout_secs: default_media_timeout(),
            api_url: default_transcription_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI API key (falls back to OPENAI_API_KEY)
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Token budget for a single answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: default_llm_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub bucket: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Lifetime of a presigned upload URL, in seconds
    #[serde(default = "default_expires")]
    pub expires_secs: u64,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            region: default_region(),
            endpoint: None,
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
            expires_secs: default_expires(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_whisper_model() -> String {
    "whisper-1".to_string()
}

fn default_media_timeout() -> u64 {
    10
}

fn default_transcription_url() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_expires() -> u64 {
    60
}

fn default_key_prefix() -> String {
    "uploads".to_string()
}
