//! Image-serving endpoint client.
//!
//! The [`ImageService`] trait defines the two calls the media library makes
//! against the external endpoint: look up the base serving URL for a stored
//! file, and delete that serving image again.
//!
//! The production implementation is [`HttpImageService`], a blocking HTTP
//! client. Tests substitute a recording mock.

mod http;

pub use http::HttpImageService;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Image service returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Malformed image service response: {0}")]
    MalformedResponse(String),
}

/// The external image-serving endpoint.
pub trait ImageService {
    /// Base serving URL for a stored file, without any resize suffix.
    fn serving_url(&self, file: &str) -> Result<String, ServiceError>;

    /// Stop serving a stored file.
    fn delete(&self, file: &str) -> Result<(), ServiceError>;
}

impl<S: ImageService + ?Sized> ImageService for &S {
    fn serving_url(&self, file: &str) -> Result<String, ServiceError> {
        (**self).serving_url(file)
    }

    fn delete(&self, file: &str) -> Result<(), ServiceError> {
        (**self).delete(file)
    }
}

/// Endpoint URL for a stored file.
///
/// The `gs://` scheme is stripped from the file reference so the endpoint
/// sees `bucket/object`. A service URL without a scheme is assumed to be
/// `https://`, and exactly one slash separates it from the object path.
///
/// # Examples
/// ```
/// # use gcs_media::service::image_service_url;
/// assert_eq!(
///     image_service_url("images.example.com/", "gs://media/2024/05/dawn.jpg"),
///     "https://images.example.com/media/2024/05/dawn.jpg"
/// );
/// ```
pub fn image_service_url(service_url: &str, file: &str) -> String {
    let object = file.strip_prefix("gs://").unwrap_or(file);
    let object = object.trim_start_matches('/');
    let base = service_url.trim().trim_end_matches('/');
    if base.contains("://") {
        format!("{base}/{object}")
    } else {
        format!("https://{base}/{object}")
    }
}
