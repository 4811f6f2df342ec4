//! CLI output formatting.
//!
//! Output leads with what was asked for (a size on an original, an
//! attachment) and puts URLs and regions on indented context lines beneath
//! it, so several results read as an inventory.
//!
//! # Output Format
//!
//! ## Resolve
//!
//! ```text
//! thumbnail on 1000x800
//!     150x150 crop
//!     Region: 800x800 at 100,0
//! ```
//!
//! ## Srcset
//!
//! ```text
//!  125w https://lh3.example.com/abc=w125-h94-l90-nu
//!  250w https://lh3.example.com/abc=w250-h188-l90-nu
//! ```
//!
//! ## Attachments
//!
//! ```text
//! 001 gs://bucket/2024/05/dawn.jpg (1000x800, image/jpeg)
//!     URL: https://example.com/uploads/dawn.jpg
//!     Serving: https://lh3.example.com/abc
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::attachments::AttachmentIndex;
use crate::cache::{CacheStats, ServingUrlCache};
use crate::media::Downsize;
use crate::planner::{Dimensions, ResolvedDimensions, SizeRequest, SrcsetCandidate};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format an attachment id as at least 3 zero-padded digits.
fn format_id(id: u64) -> String {
    format!("{:0>3}", id)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `150x150 crop`, `300x240`, or `1000x800 original`.
fn resolved_label(resolved: &ResolvedDimensions) -> String {
    let dims = resolved.dimensions();
    if !resolved.intermediate {
        format!("{dims} original")
    } else if resolved.crop {
        format!("{dims} crop")
    } else {
        dims.to_string()
    }
}

// ============================================================================
// Planner commands
// ============================================================================

pub fn format_resolution(
    request: &SizeRequest,
    original: Dimensions,
    resolved: Option<&ResolvedDimensions>,
    serving_url: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![format!("{request} on {original}")];
    let Some(resolved) = resolved else {
        lines.push(format!("{}no resolution (native fallback)", indent(1)));
        return lines;
    };

    lines.push(format!("{}{}", indent(1), resolved_label(resolved)));
    if let Some(region) = resolved.region {
        lines.push(format!(
            "{}Region: {}x{} at {},{}",
            indent(1),
            region.width,
            region.height,
            region.x,
            region.y
        ));
    }
    if let Some(url) = serving_url {
        lines.push(format!("{}URL: {}", indent(1), url));
    }
    lines
}

pub fn print_resolution(
    request: &SizeRequest,
    original: Dimensions,
    resolved: Option<&ResolvedDimensions>,
    serving_url: Option<&str>,
) {
    for line in format_resolution(request, original, resolved, serving_url) {
        println!("{}", line);
    }
}

/// One line per candidate, widths right-aligned.
pub fn format_srcset_candidates(candidates: &[SrcsetCandidate]) -> Vec<String> {
    if candidates.is_empty() {
        return vec!["No srcset candidates".to_string()];
    }
    let pad = candidates
        .iter()
        .map(|c| c.width.to_string().len())
        .max()
        .unwrap_or(0);
    candidates
        .iter()
        .map(|c| format!("{:>pad$}w {}", c.width, c.url))
        .collect()
}

pub fn print_srcset_candidates(candidates: &[SrcsetCandidate]) {
    for line in format_srcset_candidates(candidates) {
        println!("{}", line);
    }
}

// ============================================================================
// Media library commands
// ============================================================================

pub fn format_downsize(id: u64, request: &SizeRequest, downsize: Option<&Downsize>) -> Vec<String> {
    let header = format!("{} {}", format_id(id), request);
    let Some(d) = downsize else {
        return vec![format!("{header} → unavailable")];
    };
    let kind = if d.intermediate {
        "intermediate"
    } else {
        "original"
    };
    vec![
        format!("{header} → {}x{} ({kind})", d.width, d.height),
        format!("{}{}", indent(1), d.url),
    ]
}

pub fn print_downsize(id: u64, request: &SizeRequest, downsize: Option<&Downsize>) {
    for line in format_downsize(id, request, downsize) {
        println!("{}", line);
    }
}

pub fn format_attachment_list(index: &AttachmentIndex, cache: &ServingUrlCache) -> Vec<String> {
    if index.is_empty() {
        return vec!["No attachments".to_string()];
    }
    let mut lines = Vec::new();
    for attachment in index.iter() {
        lines.push(format!(
            "{} {} ({}, {})",
            format_id(attachment.id),
            attachment.file,
            attachment.dimensions(),
            attachment.mime_type
        ));
        lines.push(format!("{}URL: {}", indent(1), attachment.url));
        if let Some(serving) = cache.get(attachment.id, &attachment.file) {
            lines.push(format!("{}Serving: {}", indent(1), serving));
        }
    }
    lines
}

pub fn print_attachment_list(index: &AttachmentIndex, cache: &ServingUrlCache) {
    for line in format_attachment_list(index, cache) {
        println!("{}", line);
    }
}

pub fn format_cache_stats(stats: &CacheStats) -> String {
    format!("Serving URLs: {}", stats)
}
