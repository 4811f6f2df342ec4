//! Parameter types for resize planning.
//!
//! These structs describe *what* size is wanted and *what* the serving
//! endpoint should be asked for. They carry no behaviour beyond small
//! conversions; the math lives in [`calculations`](super::calculations) and
//! the planning in [`operations`](super::operations).
//!
//! ## Types
//!
//! - [`Dimensions`]: An asset's natural width and height.
//! - [`Crop`]: Crop policy: a flag, or an `[x, y]` anchor pair.
//! - [`SizeSpec`]: A preset or explicit `(width, height, crop)` request.
//! - [`SizeRequest`]: What the caller asked for: full, named, or explicit.
//! - [`ResolvedDimensions`]: Output of constraining a request to an original.
//! - [`Quality`]: Serving quality (1-100, default 90). Clamped on construction.
//! - [`ServingUrlParams`]: Everything the resize suffix encodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Natural width and height of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either axis is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Crop policy of a size.
///
/// In config files this is either a boolean (`crop = true`) or an anchor
/// pair (`crop = [0.5, 0.0]` keeps the top centre). The anchor places the
/// crop region inside the original: `0.0` is left/top, `1.0` right/bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Crop {
    Flag(bool),
    Anchor([f64; 2]),
}

impl Crop {
    pub fn is_cropped(self) -> bool {
        match self {
            Crop::Flag(flag) => flag,
            Crop::Anchor(_) => true,
        }
    }

    /// Anchor as `(x, y)` fractions clamped to `0.0..=1.0`. `true` is the centre.
    pub fn anchor(self) -> (f64, f64) {
        match self {
            Crop::Anchor([x, y]) => (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)),
            Crop::Flag(_) => (0.5, 0.5),
        }
    }
}

impl Default for Crop {
    fn default() -> Self {
        Crop::Flag(false)
    }
}

/// A `(width, height, crop)` triple: a named preset or an explicit request.
///
/// A zero width or height leaves that axis unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub crop: Crop,
}

impl SizeSpec {
    pub fn fit(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            crop: Crop::Flag(false),
        }
    }

    pub fn cropped(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            crop: Crop::Flag(true),
        }
    }
}

/// What a caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeRequest {
    /// The original, unresized.
    Full,
    /// A preset looked up by name (`thumbnail`, `medium`, custom names...).
    Named(String),
    /// An explicit box.
    Explicit(SizeSpec),
}

impl SizeRequest {
    pub fn named(name: impl Into<String>) -> Self {
        SizeRequest::Named(name.into())
    }
}

impl FromStr for SizeRequest {
    type Err = String;

    /// Parse `full`, `WxH` (fit), `WxH:crop`, or a preset name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("size must not be empty".to_string());
        }
        if s == "full" {
            return Ok(SizeRequest::Full);
        }
        let (dims, crop) = match s.strip_suffix(":crop") {
            Some(dims) => (dims, true),
            None => (s, false),
        };
        if let Some((w, h)) = dims.split_once('x')
            && let (Ok(width), Ok(height)) = (w.parse::<u32>(), h.parse::<u32>())
        {
            let spec = if crop {
                SizeSpec::cropped(width, height)
            } else {
                SizeSpec::fit(width, height)
            };
            return Ok(SizeRequest::Explicit(spec));
        }
        if crop {
            return Err(format!("invalid size '{s}': expected WxH:crop"));
        }
        Ok(SizeRequest::Named(s.to_string()))
    }
}

impl fmt::Display for SizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeRequest::Full => write!(f, "full"),
            SizeRequest::Named(name) => write!(f, "{name}"),
            SizeRequest::Explicit(spec) if spec.crop.is_cropped() => {
                write!(f, "{}x{}:crop", spec.width, spec.height)
            }
            SizeRequest::Explicit(spec) => write!(f, "{}x{}", spec.width, spec.height),
        }
    }
}

/// Source rectangle inside the original that a cropped size is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A size request constrained against an original.
///
/// `width`/`height` never exceed the original. When `intermediate` is false
/// the result *is* the original: `crop` is false and there is no region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDimensions {
    pub width: u32,
    pub height: u32,
    pub crop: bool,
    pub intermediate: bool,
    pub region: Option<CropRegion>,
}

impl ResolvedDimensions {
    /// The original itself, used when a request does not shrink it.
    pub fn original(original: Dimensions) -> Self {
        Self {
            width: original.width,
            height: original.height,
            crop: false,
            intermediate: false,
            region: None,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Quality setting for the serving endpoint (1-100).
///
/// Only constructible through [`Quality::new`] or [`Quality::from_setting`],
/// so the value is always in range:
///
/// ```compile_fail
/// # use gcs_media::planner::Quality;
/// let q = Quality(0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Quality from a stored setting where `0` means "let the endpoint decide".
    pub fn from_setting(value: u32) -> Option<Self> {
        (value > 0).then(|| Self::new(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Everything the resize suffix of a serving URL encodes.
///
/// A zero or absent `width`/`height` is left out of the suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServingUrlParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: bool,
    pub quality: Option<Quality>,
    /// Allow the endpoint to upscale. Off by default.
    pub stretch: bool,
}

impl ServingUrlParams {
    pub fn from_resolved(resolved: &ResolvedDimensions, quality: Option<Quality>) -> Self {
        Self {
            width: Some(resolved.width),
            height: Some(resolved.height),
            crop: resolved.crop,
            quality,
            stretch: false,
        }
    }
}

impl Default for ServingUrlParams {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            crop: false,
            quality: Some(Quality::default()),
            stretch: false,
        }
    }
}
