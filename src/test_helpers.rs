//! Shared test utilities.
//!
//! Attachment fixtures and a recording [`ImageService`] mock that never
//! touches the network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let service = MockImageService::returning("https://lh3.example.com/abc");
//! assert_eq!(service.serving_url("gs://bucket/a.jpg").unwrap(), "https://lh3.example.com/abc");
//! assert_eq!(service.get_operations(), vec![ServiceOp::ServingUrl("gs://bucket/a.jpg".into())]);
//! ```

use std::sync::Mutex;

use crate::attachments::Attachment;
use crate::service::{ImageService, ServiceError};

// =========================================================================
// Fixtures
// =========================================================================

/// A JPEG attachment stored at `gs://bucket/uploads/{id}.jpg`.
pub fn attachment(id: u64, width: u32, height: u32) -> Attachment {
    Attachment {
        id,
        file: format!("gs://bucket/uploads/{id}.jpg"),
        url: format!("https://example.com/uploads/{id}.jpg"),
        mime_type: "image/jpeg".to_string(),
        width,
        height,
    }
}

// =========================================================================
// Mock image service
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOp {
    ServingUrl(String),
    Delete(String),
}

/// Image service that records calls and answers from a fixed outcome:
/// either a serving URL, or an HTTP status for every call.
pub struct MockImageService {
    outcome: Result<String, u16>,
    pub operations: Mutex<Vec<ServiceOp>>,
}

impl MockImageService {
    pub fn returning(url: &str) -> Self {
        Self {
            outcome: Ok(url.to_string()),
            operations: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            outcome: Err(status),
            operations: Mutex::new(Vec::new()),
        }
    }

    pub fn get_operations(&self) -> Vec<ServiceOp> {
        self.operations.lock().unwrap().clone()
    }

    fn status_error(status: u16, file: &str) -> ServiceError {
        ServiceError::Status {
            status,
            url: file.to_string(),
        }
    }
}

impl ImageService for MockImageService {
    fn serving_url(&self, file: &str) -> Result<String, ServiceError> {
        self.operations
            .lock()
            .unwrap()
            .push(ServiceOp::ServingUrl(file.to_string()));

        self.outcome
            .clone()
            .map_err(|status| Self::status_error(status, file))
    }

    fn delete(&self, file: &str) -> Result<(), ServiceError> {
        self.operations
            .lock()
            .unwrap()
            .push(ServiceOp::Delete(file.to_string()));

        match self.outcome {
            Ok(_) => Ok(()),
            Err(status) => Err(Self::status_error(status, file)),
        }
    }
}
