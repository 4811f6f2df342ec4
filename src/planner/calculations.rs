//! Pure calculation functions for resize dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Rounding is half away from zero (`f64::round`), matching the host's
//! dimension helpers so computed sizes agree pixel for pixel.

use super::params::{CropRegion, Dimensions};

/// Constrain `current` to fit inside a `max_width` x `max_height` box.
///
/// The host's "fit" function. A zero maximum leaves that axis unbounded;
/// when both are zero `current` is returned unchanged. Never upscales.
///
/// The larger of the two per-axis scale factors is preferred; if it would
/// push either axis past its maximum, the smaller one is used instead.
/// Results are at least 1px, and an axis that lands exactly one pixel short
/// of its constrained maximum (a rounding artefact) is snapped to it.
///
/// # Examples
/// ```
/// # use gcs_media::planner::{Dimensions, constrain_dimensions};
/// // 1000x800 into a 150x150 box → 150x120
/// assert_eq!(
///     constrain_dimensions(Dimensions::new(1000, 800), 150, 150),
///     Dimensions::new(150, 120)
/// );
/// ```
pub fn constrain_dimensions(current: Dimensions, max_width: u32, max_height: u32) -> Dimensions {
    if max_width == 0 && max_height == 0 {
        return current;
    }

    let cur_w = current.width as f64;
    let cur_h = current.height as f64;

    let mut width_ratio = 1.0;
    let mut height_ratio = 1.0;
    let mut did_width = false;
    let mut did_height = false;

    if max_width > 0 && current.width > max_width {
        width_ratio = max_width as f64 / cur_w;
        did_width = true;
    }
    if max_height > 0 && current.height > max_height {
        height_ratio = max_height as f64 / cur_h;
        did_height = true;
    }

    let smaller = f64::min(width_ratio, height_ratio);
    let larger = f64::max(width_ratio, height_ratio);

    // An unbounded axis has a maximum of 0, so this always falls back to the
    // smaller ratio when only one axis is constrained.
    let ratio = if (cur_w * larger).round() as u32 > max_width
        || (cur_h * larger).round() as u32 > max_height
    {
        smaller
    } else {
        larger
    };

    let mut w = ((cur_w * ratio).round() as u32).max(1);
    let mut h = ((cur_h * ratio).round() as u32).max(1);

    if did_width && w + 1 == max_width {
        w = max_width;
    }
    if did_height && h + 1 == max_height {
        h = max_height;
    }

    Dimensions::new(w, h)
}

/// Output box of a cropped size: the requested box capped to the original.
///
/// Each axis is capped independently. A zero axis is derived from the other
/// axis and the original's aspect ratio (truncated, at least 1px, capped to
/// the original). Returns `None` for an empty original or an empty request.
pub fn crop_dimensions(original: Dimensions, width: u32, height: u32) -> Option<Dimensions> {
    if original.is_empty() || (width == 0 && height == 0) {
        return None;
    }
    let aspect = original.width as f64 / original.height as f64;

    let mut w = width.min(original.width);
    let mut h = height.min(original.height);
    if w == 0 {
        w = ((h as f64 * aspect) as u32).clamp(1, original.width);
    }
    if h == 0 {
        h = ((w as f64 / aspect) as u32).clamp(1, original.height);
    }

    Some(Dimensions::new(w, h))
}

/// Source region a cropped `target` is cut from.
///
/// The largest box with `target`'s aspect ratio that fits inside `original`,
/// positioned by `anchor` (`(0.5, 0.5)` centres it).
pub fn crop_region(original: Dimensions, target: Dimensions, anchor: (f64, f64)) -> CropRegion {
    let (orig_w, orig_h) = (original.width as f64, original.height as f64);
    let (tgt_w, tgt_h) = (target.width as f64, target.height as f64);

    let size_ratio = f64::max(tgt_w / orig_w, tgt_h / orig_h);
    let width = ((tgt_w / size_ratio).round() as u32).min(original.width);
    let height = ((tgt_h / size_ratio).round() as u32).min(original.height);

    let (ax, ay) = anchor;
    let x = ((original.width - width) as f64 * ax).floor() as u32;
    let y = ((original.height - height) as f64 * ay).floor() as u32;

    CropRegion {
        x,
        y,
        width,
        height,
    }
}

/// Scale a box by `ratio`, rounding each axis up independently.
pub fn scale_box(dims: Dimensions, ratio: f64) -> Dimensions {
    Dimensions::new(
        (dims.width as f64 * ratio).ceil() as u32,
        (dims.height as f64 * ratio).ceil() as u32,
    )
}
