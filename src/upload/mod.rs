pub mod s3;

use crate::config::settings::UploadConfig;
use crate::error::{ProfessorError, Result};
use chrono::Utc;
use serde::Serialize;

/// Everything a client needs to send one file straight to object storage.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTicket {
    pub upload_url: String,
    pub key: String,
    /// Where the object can be read once uploaded (subject to bucket policy)
    pub object_url: String,
}

/// Issue a short-lived upload authorization for a file of the given type.
pub async fn presign_upload(config: &UploadConfig, name: &str, content_type: &str) -> Result<UploadTicket> {
    if name.trim().is_empty() || content_type.trim().is_empty() {
        return Err(ProfessorError::Validation(
            "Missing name or type".to_string(),
        ));
    }

    let presigner = s3::S3Presigner::new(config)?;
    let key = object_key(&config.key_prefix, Utc::now().timestamp_millis(), name);
    let upload_url = presigner.presign_put(&key, content_type).await?;
    let object_url = object_url(config, presigner.bucket(), &key);

    tracing::info!("Issued upload URL for {} ({})", key, content_type);

    Ok(UploadTicket {
        upload_url,
        key,
        object_url,
    })
}

/// `<prefix>/<millis>_<name>` with each whitespace run in the name replaced by `_`.
pub fn object_key(prefix: &str, millis: i64, name: &str) -> String {
    let mut safe = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                safe.push('_');
            }
            in_space = true;
        } else {
            safe.push(ch);
            in_space = false;
        }
    }

    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}_{}", millis, safe)
    } else {
        format!("{}/{}_{}", prefix, millis, safe)
    }
}

pub fn object_url(config: &UploadConfig, bucket: &str, key: &str) -> String {
    match &config.endpoint {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.amazonaws.com/{}", bucket, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_collapses_whitespace() {
        assert_eq!(
            object_key("uploads", 1700000000000, "Week 1  intro\tlecture.mp4"),
            "uploads/1700000000000_Week_1_intro_lecture.mp4"
        );
    }

    #[test]
    fn test_object_key_without_prefix() {
        assert_eq!(object_key("/", 5, "a.mp4"), "5_a.mp4");
    }

    #[test]
    fn test_object_url_default_host() {
        let config = UploadConfig::default();
        assert_eq!(
            object_url(&config, "lecture-videos", "uploads/1_a.mp4"),
            "https://lecture-videos.s3.amazonaws.com/uploads/1_a.mp4"
        );
    }

    #[test]
    fn test_object_url_custom_endpoint() {
        let config = UploadConfig {
            endpoint: Some("http://localhost:9000/".to_string()),
            ..UploadConfig::default()
        };
        assert_eq!(
            object_url(&config, "videos", "uploads/1_a.mp4"),
            "http://localhost:9000/videos/uploads/1_a.mp4"
        );
    }

    #[tokio::test]
    async fn test_missing_name_or_type() {
        let config = UploadConfig::default();
        let err = presign_upload(&config, "", "video/mp4").await.unwrap_err();
        assert!(matches!(err, ProfessorError::Validation(_)));
        let err = presign_upload(&config, "a.mp4", " ").await.unwrap_err();
        assert!(matches!(err, ProfessorError::Validation(_)));
    }
}
