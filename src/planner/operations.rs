//! High-level planning operations.
//!
//! These functions combine the calculations with a preset snapshot and the
//! quality setting. They take a request and an original, and produce
//! dimensions, serving URLs, and srcset candidates. Nothing here performs
//! I/O or keeps state between calls.

use super::calculations::{constrain_dimensions, crop_dimensions, crop_region, scale_box};
use super::params::{
    Dimensions, Quality, ResolvedDimensions, ServingUrlParams, SizeRequest, SizeSpec,
};
use super::presets::PresetRegistry;

/// Scale ratios offered in a srcset, ascending.
pub const SRCSET_RATIOS: [f64; 4] = [0.25, 0.5, 1.0, 2.0];

/// One responsive candidate: a serving URL and its intrinsic width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetCandidate {
    pub url: String,
    pub width: u32,
}

/// Resize planner bound to a preset snapshot and a quality setting.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    presets: &'a PresetRegistry,
    quality: Option<Quality>,
}

impl<'a> Planner<'a> {
    pub fn new(presets: &'a PresetRegistry, quality: Option<Quality>) -> Self {
        Self { presets, quality }
    }

    /// The `(width, height, crop)` box a request stands for.
    ///
    /// `None` for an unregistered preset name.
    pub fn size_spec(&self, request: &SizeRequest, original: Dimensions) -> Option<SizeSpec> {
        match request {
            SizeRequest::Full => Some(SizeSpec::fit(original.width, original.height)),
            SizeRequest::Named(name) => self.presets.get(name).copied(),
            SizeRequest::Explicit(spec) => Some(*spec),
        }
    }

    /// Constrain a request against an original.
    ///
    /// `None` for an unknown preset or when no non-empty size exists.
    pub fn resolve_size(
        &self,
        request: &SizeRequest,
        original: Dimensions,
    ) -> Option<ResolvedDimensions> {
        let spec = self.size_spec(request, original)?;
        resolve_spec(&spec, original)
    }

    /// Serving-URL parameters for a resolved size, with this planner's quality.
    pub fn serving_params(&self, resolved: &ResolvedDimensions) -> ServingUrlParams {
        ServingUrlParams::from_resolved(resolved, self.quality)
    }

    pub fn serving_url(&self, base_url: &str, resolved: &ResolvedDimensions) -> String {
        render_serving_url(base_url, &self.serving_params(resolved))
    }

    /// Responsive candidates for a request.
    ///
    /// Walks [`SRCSET_RATIOS`], scaling the resolved box (rounding up) and
    /// re-resolving it with the request's crop policy. Candidates larger than
    /// the original on either axis are skipped, as is a candidate identical to
    /// the one before it. Empty when the request itself does not resolve.
    pub fn build_srcset(
        &self,
        base_url: &str,
        request: &SizeRequest,
        original: Dimensions,
    ) -> Vec<SrcsetCandidate> {
        let Some(spec) = self.size_spec(request, original) else {
            return Vec::new();
        };
        let Some(base) = resolve_spec(&spec, original) else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        let mut previous: Option<Dimensions> = None;

        for ratio in SRCSET_RATIOS {
            let scaled = scale_box(base.dimensions(), ratio);
            if scaled.width > original.width || scaled.height > original.height {
                continue;
            }

            let scaled_spec = SizeSpec {
                width: scaled.width,
                height: scaled.height,
                crop: spec.crop,
            };
            let Some(resolved) = resolve_spec(&scaled_spec, original) else {
                continue;
            };
            if previous == Some(resolved.dimensions()) {
                continue;
            }
            previous = Some(resolved.dimensions());

            candidates.push(SrcsetCandidate {
                url: self.serving_url(base_url, &resolved),
                width: resolved.width,
            });
        }

        candidates
    }
}

/// Constrain an explicit `(width, height, crop)` box against an original.
///
/// - Fit (`crop` falsy): the box is scaled down to fit, preserving aspect.
/// - Crop: the requested box, capped to the original, cut from the largest
///   same-aspect region of the original placed by the crop anchor.
///
/// A box that does not shrink the original resolves to the original itself.
pub fn resolve_spec(spec: &SizeSpec, original: Dimensions) -> Option<ResolvedDimensions> {
    if original.is_empty() {
        return None;
    }

    let constrained = constrain_dimensions(original, spec.width, spec.height);
    if constrained == original {
        return Some(ResolvedDimensions::original(original));
    }

    let resolved = if spec.crop.is_cropped() {
        let target = crop_dimensions(original, spec.width, spec.height)?;
        if target == original {
            return Some(ResolvedDimensions::original(original));
        }
        ResolvedDimensions {
            width: target.width,
            height: target.height,
            crop: true,
            intermediate: true,
            region: Some(crop_region(original, target, spec.crop.anchor())),
        }
    } else {
        ResolvedDimensions {
            width: constrained.width,
            height: constrained.height,
            crop: false,
            intermediate: true,
            region: None,
        }
    };

    Some(resolved)
}

/// Append the resize suffix the image-serving endpoint understands.
///
/// Tokens are joined with `-` in a fixed order: dimensions (`w{W}-h{H}`,
/// `h{H}`, `w{W}`, or `s0` for the original size), `p` when cropping,
/// `l{Q}` for quality, and `nu` unless upscaling is allowed.
///
/// # Examples
/// ```
/// # use gcs_media::planner::{Quality, ServingUrlParams, render_serving_url};
/// let params = ServingUrlParams {
///     width: Some(150),
///     height: Some(150),
///     crop: true,
///     quality: Some(Quality::new(90)),
///     stretch: false,
/// };
/// assert_eq!(
///     render_serving_url("https://lh3.example.com/abc", &params),
///     "https://lh3.example.com/abc=w150-h150-p-l90-nu"
/// );
/// ```
pub fn render_serving_url(base_url: &str, params: &ServingUrlParams) -> String {
    let width = params.width.filter(|&w| w > 0);
    let height = params.height.filter(|&h| h > 0);

    let mut tokens = Vec::with_capacity(5);
    match (width, height) {
        (Some(w), Some(h)) => {
            tokens.push(format!("w{w}"));
            tokens.push(format!("h{h}"));
        }
        (None, Some(h)) => tokens.push(format!("h{h}")),
        (Some(w), None) => tokens.push(format!("w{w}")),
        (None, None) => tokens.push("s0".to_string()),
    }
    if params.crop {
        tokens.push("p".to_string());
    }
    if let Some(quality) = params.quality {
        tokens.push(format!("l{}", quality.value()));
    }
    if !params.stretch {
        tokens.push("nu".to_string());
    }

    format!("{}={}", base_url, tokens.join("-"))
}

/// Render candidates as a `srcset` attribute value: `"url 150w, url 300w"`.
///
/// Spaces in URLs are percent-encoded so they cannot split a candidate.
pub fn format_srcset(candidates: &[SrcsetCandidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{} {}w", c.url.replace(' ', "%20"), c.width))
        .collect::<Vec<_>>()
        .join(", ")
}
