//! Image primitives used by the screenshot pipeline.
//!
//! This module provides:
//! - HSV conversion and color-range masking
//! - Gaussian blur and square dilation
//! - Largest-blob bounding boxes over binary masks
//! - Hough-gradient circle detection
//! - Masked template matching
//! - Write-only debug dumps of intermediate images

pub mod blob;
pub mod color;
pub mod debug;
pub mod filter;
pub mod hough;
pub mod matching;

pub use blob::largest_blob_box;
pub use color::{in_range, to_gray, HsvRange};
pub use debug::{DebugDump, Mark};
pub use filter::{dilate_square, gaussian_blur};
pub use hough::{detect_circles, Circle, HoughParams};
pub use matching::match_points;
