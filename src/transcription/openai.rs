use crate::error::{ProfessorError, Result};
use reqwest::multipart;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WhisperErrorBody {
    error: Option<WhisperErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct WhisperErrorDetail {
    message: Option<String>,
}

/// Media metadata sent alongside the bytes
pub struct MediaPart<'a> {
    pub filename: &'a str,
    pub mime: &'a str,
}

impl Default for MediaPart<'_> {
    fn default() -> Self {
        Self {
            filename: "video.mp4",
            mime: "video/mp4",
        }
    }
}

/// Transcribe media bytes via the hosted Whisper API
pub async fn transcribe_bytes(
    client: &reqwest::Client,
    api_url: &str,
    api_key: &str,
    model: &str,
    media: &[u8],
    part: MediaPart<'_>,
) -> Result<String> {
    let file_part = multipart::Part::bytes(media.to_vec())
        .file_name(part.filename.to_string())
        .mime_str(part.mime)
        .map_err(|e| ProfessorError::Transcription(format!("Failed to create multipart: {}", e)))?;

    let form = multipart::Form::new()
        .text("model", model.to_string())
        .part("file", file_part);

    let response = client
        .post(api_url)
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await
        .map_err(|e| ProfessorError::Transcription(format!("Whisper request failed: {}", e)))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(ProfessorError::Transcription(error_message(status, &body)));
    }

    let result: WhisperResponse = serde_json::from_str(&body).map_err(|e| {
        ProfessorError::Transcription(format!("Failed to parse Whisper response: {}", e))
    })?;

    Ok(result.text)
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<WhisperErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("Whisper API failed ({})", status))
}
