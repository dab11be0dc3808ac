//! Climate visualisation pipelines.
//!
//! - [`crest`]: Alpine crest profiles with isotherm altitudes per period
//! - [`slideshow`]: the crest charts assembled into MP4/GIF
//! - [`grid`]: heatmap animations of gridded day counts

pub mod config;
pub mod crest;
pub mod grid;
pub mod slideshow;
