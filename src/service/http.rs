//! Blocking HTTP implementation of [`ImageService`].
//!
//! `GET {service}/{bucket}/{object}` answers with a JSON body
//! `{"serving_url": "..."}`; `DELETE` on the same URL stops serving it.

use super::{ImageService, ServiceError, image_service_url};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ServingUrlResponse {
    serving_url: Option<String>,
}

pub struct HttpImageService {
    client: Client,
    service_url: String,
}

impl HttpImageService {
    pub fn new(service_url: impl Into<String>) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            service_url: service_url.into(),
        })
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }
}

impl ImageService for HttpImageService {
    fn serving_url(&self, file: &str) -> Result<String, ServiceError> {
        let url = image_service_url(&self.service_url, file);
        debug!(%url, "requesting serving url");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                url,
            });
        }
        parse_serving_url(&response.text()?)
    }

    fn delete(&self, file: &str) -> Result<(), ServiceError> {
        let url = image_service_url(&self.service_url, file);
        debug!(%url, "deleting serving url");

        let response = self.client.delete(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }
}

/// Extract the serving URL from a lookup response body.
fn parse_serving_url(body: &str) -> Result<String, ServiceError> {
    let parsed: ServingUrlResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
    match parsed.serving_url {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => Err(ServiceError::MalformedResponse(
            "missing serving_url".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serving_url() {
        let body = r#"{"serving_url":"https://lh3.example.com/abc"}"#;
        assert_eq!(parse_serving_url(body).unwrap(), "https://lh3.example.com/abc");
    }

    #[test]
    fn ignores_extra_fields() {
        let body = r#"{"serving_url":"https://lh3.example.com/abc","bucket":"media"}"#;
        assert_eq!(parse_serving_url(body).unwrap(), "https://lh3.example.com/abc");
    }

    #[test]
    fn missing_serving_url_is_malformed() {
        assert!(matches!(
            parse_serving_url("{}"),
            Err(ServiceError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_serving_url(r#"{"serving_url":null}"#),
            Err(ServiceError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_serving_url(r#"{"serving_url":"  "}"#),
            Err(ServiceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_serving_url("<html>502 Bad Gateway</html>"),
            Err(ServiceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn user_agent_names_the_crate() {
        assert!(APP_USER_AGENT.starts_with("gcs-media/"));
    }

    #[test]
    fn client_builds_without_network() {
        let service = HttpImageService::new("https://svc.example.com").unwrap();
        assert_eq!(service.service_url(), "https://svc.example.com");
    }
}
