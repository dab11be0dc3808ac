//! Rendering for the climate visualizations.
//!
//! - [`chart`]: figure model (traces, legend, category axis)
//! - [`plot`]: figure drawing with plotters, whole or in layers
//! - [`raster`]: SVG rasterisation (resvg) and pixmap conversion
//! - [`heatmap`]: gridded frames with title and colour bar
//! - [`png`]: PNG encoding
//! - [`animation`]: GIF and MP4 assembly
//! - [`html`]: interactive documents

pub mod animation;
pub mod chart;
pub mod error;
pub mod heatmap;
pub mod html;
pub mod plot;
pub mod png;
pub mod raster;

pub use animation::{load_frames, Animation};
pub use chart::{Annotation, CategoryAxis, Figure, MarkerShape, Point, Segment, Trace, TraceKind};
pub use error::{RenderError, RenderResult};
pub use heatmap::{heatmap_svg, render_heatmap, ColorScale, HeatmapFrame, HeatmapStyle};
pub use html::{chart_document, HeatmapDocument};
pub use plot::{figure_layers, figure_svg, render_figure, ChartLayers, HoverPoint, TraceLayer};
pub use raster::{pixmap_to_image, pixmap_to_png, SvgRasterizer};
