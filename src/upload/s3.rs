use aws_sdk_s3::config::{Credentials, Region, SharedCredentialsProvider};
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;

use crate::config::settings::UploadConfig;
use crate::error::{ProfessorError, Result};

/// Presigns PUT requests against one bucket
#[derive(Debug)]
pub struct S3Presigner {
    client: aws_sdk_s3::Client,
    bucket: String,
    expires: Duration,
}

impl S3Presigner {
    #[tracing::instrument(skip(config), name = "S3Presigner::new", fields(region = %config.region), err)]
    pub fn new(config: &UploadConfig) -> Result<Self> {
        let bucket = config
            .bucket
            .clone()
            .ok_or_else(|| ProfessorError::Config("Upload bucket not configured".to_string()))?;
        let (access_key, secret_key) =
            match (&config.access_key_id, &config.secret_access_key) {
                (Some(a), Some(s)) => (a.clone(), s.clone()),
                _ => {
                    return Err(ProfessorError::Config(
                        "AWS credentials not configured (set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY)"
                            .to_string(),
                    ))
                }
            };

        tracing::debug!("setting up s3 presigner for bucket {}", bucket);

        let client = aws_sdk_s3::Client::from_conf({
            let mut builder = aws_sdk_s3::Config::builder();

            builder.set_endpoint_url(config.endpoint.clone());

            builder.set_region(Some(Region::new(config.region.clone())));

            builder.set_force_path_style(Some(config.force_path_style));

            builder.set_credentials_provider(Some(SharedCredentialsProvider::new(
                Credentials::new(access_key, secret_key, None, None, "ConfiguredCredentialsProvider"),
            )));

            builder.build()
        });

        Ok(Self {
            client,
            bucket,
            expires: Duration::from_secs(config.expires_secs),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// A URL that accepts one PUT of `content_type` at `key` until it expires.
    #[tracing::instrument(skip(self), name = "S3Presigner::presign_put", err)]
    pub async fn presign_put(&self, key: &str, content_type: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.expires)
            .map_err(|e| ProfessorError::Upload(format!("Invalid presign expiry: {}", e)))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| {
                ProfessorError::Upload(format!(
                    "Failed to generate upload URL: {}",
                    aws_sdk_s3::error::DisplayErrorContext(&e)
                ))
            })?;

        Ok(request.uri().to_string())
    }
}
