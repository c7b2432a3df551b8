use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1/b";
const API_BASE: &str = "https://storage.googleapis.com/storage/v1/b";
const PUBLIC_BASE: &str = "https://storage.googleapis.com";

pub fn validate_image(content_type: &str, size: usize) -> Result<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(Error::BadRequest(
            "Invalid file type. Only JPEG, PNG, GIF, and WebP images are allowed.".to_string(),
        ));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(Error::BadRequest(
            "File size too large. Maximum size is 5MB.".to_string(),
        ));
    }
    Ok(())
}

/// File extension for an accepted image MIME type.
fn image_extension(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "img",
    }
}

/// `profile-images/{user}/{millis}.{ext}`, with the extension taken from the
/// validated content type. The client's file name is never used.
pub fn profile_image_name(user_id: &str, content_type: &str) -> String {
    format!(
        "profile-images/{}/{}.{}",
        user_id,
        chrono::Utc::now().timestamp_millis(),
        image_extension(content_type)
    )
}

/// Google Cloud Storage client using the JSON API with a bearer access token.
#[derive(Clone)]
pub struct StorageService {
    client: Client,
    bucket: Option<String>,
    access_token: Option<String>,
}

impl StorageService {
    pub fn new(client: Client, bucket: Option<String>, access_token: Option<String>) -> Self {
        Self {
            client,
            bucket,
            access_token,
        }
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.bucket.as_deref(), self.access_token.as_deref()) {
            (Some(bucket), Some(token)) => Ok((bucket, token)),
            _ => Err(Error::Config(
                "Object storage is not configured (GCS_BUCKET / GCS_ACCESS_TOKEN)".to_string(),
            )),
        }
    }

    pub fn public_url(bucket: &str, object_name: &str) -> String {
        format!("{}/{}/{}", PUBLIC_BASE, bucket, object_name)
    }

    /// Recovers the object name from a URL produced by [`Self::public_url`].
    pub fn object_name_from_url(&self, url: &str) -> Option<String> {
        let bucket = self.bucket.as_deref()?;
        let prefix = format!("{}/{}/", PUBLIC_BASE, bucket);
        url.strip_prefix(&prefix)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    /// Uploads a publicly readable object and returns its public URL.
    pub async fn upload(&self, object_name: &str, content_type: &str, data: Bytes) -> Result<String> {
        let (bucket, token) = self.credentials()?;
        let size = data.len();

        let res = self
            .client
            .post(format!("{}/{}/o", UPLOAD_BASE, bucket))
            .query(&[
                ("uploadType", "media"),
                ("name", object_name),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Storage upload failed {}: {}", status, text).into());
        }

        tracing::info!(object_name, size, "Uploaded object");
        Ok(Self::public_url(bucket, object_name))
    }

    pub async fn delete(&self, object_name: &str) -> Result<()> {
        let (bucket, token) = self.credentials()?;
        let encoded: String = url::form_urlencoded::byte_serialize(object_name.as_bytes()).collect();

        let res = self
            .client
            .delete(format!("{}/{}/o/{}", API_BASE, bucket, encoded))
            .bearer_auth(token)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            return Err(anyhow::anyhow!("Storage delete failed with status {}", status).into());
        }
        tracing::info!(object_name, "Deleted object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_type_and_oversize() {
        assert!(validate_image("image/png", 1024).is_ok());
        assert!(matches!(
            validate_image("application/pdf", 10),
            Err(Error::BadRequest(_))
        ));
        assert!(validate_image("image/webp", MAX_IMAGE_BYTES).is_ok());
        assert!(validate_image("image/webp", MAX_IMAGE_BYTES + 1).is_err());
    }

    #[test]
    fn object_names_are_per_user() {
        let name = profile_image_name("ada", "image/png");
        assert!(name.starts_with("profile-images/ada/"));
        assert!(name.ends_with(".png"));
        assert!(profile_image_name("ada", "image/webp").ends_with(".webp"));
    }

    #[test]
    fn extension_follows_content_type() {
        for content_type in ALLOWED_IMAGE_TYPES {
            let name = profile_image_name("ada", content_type);
            let ext = name.rsplit_once('.').map(|(_, ext)| ext).unwrap();
            assert!(matches!(ext, "jpg" | "png" | "gif" | "webp"), "{name}");
        }
        assert!(profile_image_name("ada", "image/jpeg").ends_with(".jpg"));
    }

    #[test]
    fn public_url_round_trips_to_object_name() {
        let storage = StorageService::new(Client::new(), Some("avatars".into()), Some("t".into()));
        let url = StorageService::public_url("avatars", "profile-images/ada/1.png");
        assert_eq!(url, "https://storage.googleapis.com/avatars/profile-images/ada/1.png");
        assert_eq!(
            storage.object_name_from_url(&url).as_deref(),
            Some("profile-images/ada/1.png")
        );
        assert_eq!(storage.object_name_from_url("https://elsewhere/x.png"), None);
    }

    #[tokio::test]
    async fn unconfigured_storage_is_a_config_error() {
        let storage = StorageService::new(Client::new(), None, None);
        let err = storage
            .upload("profile-images/u/1.png", "image/png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
