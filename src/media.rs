//! The host-facing media library boundary.
//!
//! The host calls into [`MediaLibrary`] at its media extension points:
//!
//! | Host extension point | Method |
//! |---|---|
//! | image downsize | [`MediaLibrary::get_intermediate_url`] |
//! | `<img>` attributes | [`MediaLibrary::attachment_image_srcset`] |
//! | attachment markup | [`MediaLibrary::image_markup`] |
//! | attachment delete | [`MediaLibrary::delete_attachment`] |
//!
//! Every rendering path degrades to the host's own behaviour when the image
//! service is disabled, unreachable, or cannot serve the attachment. Only
//! deletion reports service failures, since a stale serving image is
//! something an operator has to know about.

use crate::attachments::{Attachment, AttachmentIndex};
use crate::cache::{CacheStats, ServingUrlCache};
use crate::config::MediaConfig;
use crate::markup::{ImageAttributes, render_img, sizes_attribute};
use crate::planner::{Planner, PresetRegistry, SizeRequest, format_srcset};
use crate::service::{ImageService, ServiceError};
use maud::Markup;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Attachment {0} not found")]
    NotFound(u64),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// The host's image-downsize result: what to put in an `<img>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downsize {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Whether the URL points at a resized copy rather than the original.
    pub intermediate: bool,
}

pub struct MediaLibrary<S> {
    config: MediaConfig,
    presets: PresetRegistry,
    attachments: AttachmentIndex,
    cache: ServingUrlCache,
    stats: CacheStats,
    service: Option<S>,
}

impl<S: ImageService> MediaLibrary<S> {
    pub fn new(
        config: MediaConfig,
        attachments: AttachmentIndex,
        cache: ServingUrlCache,
        service: Option<S>,
    ) -> Self {
        let presets = config.preset_registry();
        Self {
            config,
            presets,
            attachments,
            cache,
            stats: CacheStats::default(),
            service,
        }
    }

    pub fn planner(&self) -> Planner<'_> {
        Planner::new(&self.presets, self.config.images.quality())
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn attachments(&self) -> &AttachmentIndex {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut AttachmentIndex {
        &mut self.attachments
    }

    pub fn cache(&self) -> &ServingUrlCache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn service(&self) -> Option<&S> {
        self.service.as_ref()
    }

    /// Base serving URL for an attachment, if the service can serve it.
    ///
    /// Served from the cache when the cached entry was obtained for the
    /// attachment's current file. Otherwise the service is asked once and a
    /// successful answer is cached. Failures are logged and yield `None`.
    pub fn attachment_serving_url(&mut self, id: u64) -> Option<String> {
        if !self.config.images.enabled {
            return None;
        }
        let Some(attachment) = self.attachments.attachments.get(&id) else {
            debug!(id, "unknown attachment");
            return None;
        };
        if !attachment.is_servable() {
            debug!(id, mime_type = %attachment.mime_type, "not servable");
            return None;
        }

        let url = if let Some(url) = self.cache.get(id, &attachment.file) {
            debug!(id, "serving url cache hit");
            self.stats.hit();
            url.to_string()
        } else {
            self.stats.miss();
            let service = self.service.as_ref()?;
            match service.serving_url(&attachment.file) {
                Ok(url) => {
                    self.cache.insert(id, attachment.file.clone(), url.clone());
                    url
                }
                Err(e) => {
                    warn!(id, file = %attachment.file, error = %e, "image service lookup failed");
                    return None;
                }
            }
        };

        Some(if self.config.uploads.use_https {
            force_https(&url)
        } else {
            url
        })
    }

    /// Downsize an attachment through the image service.
    ///
    /// Falls back to `native` (the host's own downsize) unchanged when there
    /// is no serving URL or the request does not resolve.
    pub fn get_intermediate_url(
        &mut self,
        id: u64,
        size: &SizeRequest,
        native: impl FnOnce() -> Option<Downsize>,
    ) -> Option<Downsize> {
        let Some(base_url) = self.attachment_serving_url(id) else {
            debug!(id, "no serving url, using native downsize");
            return native();
        };
        let original = self.attachments.attachments.get(&id)?.dimensions();

        let planner = self.planner();
        let Some(resolved) = planner.resolve_size(size, original) else {
            debug!(id, %size, %original, "size does not resolve, using native downsize");
            return native();
        };

        Some(Downsize {
            url: planner.serving_url(&base_url, &resolved),
            width: resolved.width,
            height: resolved.height,
            intermediate: resolved.intermediate,
        })
    }

    /// Add a `srcset` to an attachment's `<img>` attributes.
    ///
    /// Attributes come back unchanged without a serving URL or candidates.
    pub fn attachment_image_srcset(
        &mut self,
        mut attrs: ImageAttributes,
        id: u64,
        size: &SizeRequest,
    ) -> ImageAttributes {
        let Some(base_url) = self.attachment_serving_url(id) else {
            return attrs;
        };
        let Some(attachment) = self.attachments.attachments.get(&id) else {
            return attrs;
        };

        let candidates = self
            .planner()
            .build_srcset(&base_url, size, attachment.dimensions());
        if !candidates.is_empty() {
            attrs.srcset = Some(format_srcset(&candidates));
        }
        attrs
    }

    /// Full `<img>` markup for an attachment at a size.
    pub fn image_markup(&mut self, id: u64, size: &SizeRequest, alt: &str) -> Option<Markup> {
        let native = self
            .attachments
            .attachments
            .get(&id)
            .map(Attachment::native_downsize)?;
        let downsize = self.get_intermediate_url(id, size, || Some(native))?;

        let attrs = ImageAttributes {
            alt: alt.to_string(),
            class: Some(format!("attachment-{size} size-{size}")),
            ..ImageAttributes::new(downsize.url, downsize.width, downsize.height)
        };
        let mut attrs = self.attachment_image_srcset(attrs, id, size);
        if attrs.srcset.is_some() {
            attrs.sizes = Some(sizes_attribute(attrs.width));
        }
        Some(render_img(&attrs))
    }

    /// Host delete handler: drop the cached serving URL and tell the service
    /// to stop serving the file.
    ///
    /// A no-op when images are disabled. The attachment itself stays in the
    /// index; see [`MediaLibrary::remove_attachment`].
    pub fn delete_attachment(&mut self, id: u64) -> Result<(), MediaError> {
        let attachment = self
            .attachments
            .attachments
            .get(&id)
            .ok_or(MediaError::NotFound(id))?;
        if !self.config.images.enabled {
            return Ok(());
        }

        self.cache.remove(id);
        if let Some(service) = &self.service {
            service.delete(&attachment.file)?;
        }
        Ok(())
    }

    /// Drop an attachment from the index together with its cached serving
    /// URL, so a later attachment reusing the id cannot pick it up.
    pub fn remove_attachment(&mut self, id: u64) -> Option<Attachment> {
        self.cache.remove(id);
        self.attachments.remove(id)
    }
}

/// Rewrite an `http://` URL to `https://`, leaving the rest untouched.
fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}
