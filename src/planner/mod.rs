//! Resize planning. Pure, no I/O.
//!
//! | Operation | Function |
//! |---|---|
//! | **Resolve** a named/explicit size | [`Planner::resolve_size`] |
//! | **Serving URL** suffix | [`render_serving_url`] |
//! | **Srcset** candidates | [`Planner::build_srcset`] |
//! | **Fit** a box (host semantics) | [`constrain_dimensions`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing sizes and URL parameters
//! - **Presets**: The read-only registry of named sizes
//! - **Operations**: The planner, combining calculations with presets and quality

mod calculations;
mod operations;
mod params;
pub mod presets;

pub use calculations::{constrain_dimensions, crop_dimensions, crop_region, scale_box};
pub use operations::{
    Planner, SRCSET_RATIOS, SrcsetCandidate, format_srcset, render_serving_url, resolve_spec,
};
pub use params::{
    Crop, CropRegion, Dimensions, Quality, ResolvedDimensions, ServingUrlParams, SizeRequest,
    SizeSpec,
};
pub use presets::PresetRegistry;
