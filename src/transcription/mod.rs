pub mod openai;

use crate::config::settings::TranscriptionConfig;
use crate::error::{ProfessorError, Result};
use std::time::Duration;

/// Download the media at `url` and return its hosted transcription.
///
/// Only the download is bounded by `media_timeout_secs`; the Whisper call
/// itself runs without a deadline.
pub async fn transcribe_url(config: &TranscriptionConfig, url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ProfessorError::Validation("Missing video URL".to_string()));
    }

    let api_key = config.api_key.as_deref().ok_or_else(|| {
        ProfessorError::Config(
            "Transcription API key not configured (set OPENAI_API_KEY)".to_string(),
        )
    })?;

    let media = fetch_media(url, Duration::from_secs(config.media_timeout_secs)).await?;
    tracing::info!(
        "Downloaded media: {:.2} MB",
        media.len() as f64 / 1024.0 / 1024.0
    );

    let client = reqwest::Client::new();
    let text = openai::transcribe_bytes(
        &client,
        &config.api_url,
        api_key,
        &config.model,
        &media,
        openai::MediaPart::default(),
    )
    .await?;

    tracing::info!("Transcribed {} characters", text.len());
    Ok(text)
}

async fn fetch_media(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ProfessorError::Transcription(format!(
                "Timed out after {}s downloading video file",
                timeout.as_secs()
            ))
        } else {
            ProfessorError::Transcription(format!("Failed to download video file: {}", e))
        }
    })?;

    if !response.status().is_success() {
        return Err(ProfessorError::Transcription(format!(
            "Failed to download video file: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ProfessorError::Transcription(format!("Failed to read video file: {}", e)))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_is_rejected() {
        let config = TranscriptionConfig {
            api_key: Some("sk-test".to_string()),
            ..TranscriptionConfig::default()
        };
        let err = transcribe_url(&config, "  ").await.unwrap_err();
        assert!(matches!(err, ProfessorError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_rejected_before_download() {
        let config = TranscriptionConfig::default();
        let err = transcribe_url(&config, "http://127.0.0.1:9/video.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfessorError::Config(_)));
    }
}
