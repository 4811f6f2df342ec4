//! # gcs-media
//!
//! Media-library image delivery through an external image-serving endpoint
//! backed by a cloud object store. The host CMS owns uploads and admin UI;
//! this crate owns what happens when the host asks for a resized image, an
//! `<img>` tag with a responsive `srcset`, or the removal of an attachment.
//!
//! # Architecture
//!
//! ```text
//! host request ──► MediaLibrary ──► Planner (pure)          ──► serving URL
//!                      │                                         + srcset
//!                      ├── ServingUrlCache (state dir, JSON)
//!                      └── ImageService (HTTP) ◄── cache miss / delete
//! ```
//!
//! The planner is the algorithmic core: given a size request and an
//! original's dimensions it decides the delivered dimensions and renders the
//! endpoint's resize suffix (`=w150-h150-p-l90-nu`). It never performs I/O,
//! so the interesting geometry is unit tested without a network.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`planner`] | Size resolution, serving-URL suffixes, srcset candidates, presets |
//! | [`media`] | The host-facing boundary: downsize, srcset injection, markup, delete |
//! | [`service`] | The image-serving endpoint: trait plus blocking HTTP client |
//! | [`cache`] | Per-attachment serving-URL cache persisted as JSON |
//! | [`attachments`] | Attachment metadata index and local image identification |
//! | [`config`] | Layered `config.toml` loading and validation |
//! | [`markup`] | `<img>` rendering with Maud |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Composition Over Hooks
//!
//! The host calls [`media::MediaLibrary`] directly rather than the crate
//! registering itself into host filters. The fallback to the host's own
//! downsize is a closure the caller passes in, so there is nothing to
//! unregister and re-register around it.
//!
//! ## Presets Are a Snapshot
//!
//! Named sizes come from configuration once and are handed to the
//! [`planner::Planner`] as a [`planner::PresetRegistry`]. Nothing in the
//! crate holds a global preset table.
//!
//! ## Degrade, Don't Fail
//!
//! Rendering never fails because of the image service. No service URL, an
//! unservable mime type, an unknown preset, or an endpoint error all fall
//! back to the host's native behaviour, with the reason logged via
//! `tracing`. Only deletion surfaces service errors.

pub mod attachments;
pub mod cache;
pub mod config;
pub mod markup;
pub mod media;
pub mod output;
pub mod planner;
pub mod service;

#[cfg(test)]
pub(crate) mod test_helpers;
