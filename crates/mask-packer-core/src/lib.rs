//! Core library for painting per-sprite masks onto texture atlas pages.
//!
//! - Decoder: `decode_atlas` reads libGDX-style atlas text into pages and sprites
//! - Masks: `MaskIndex` maps sprite names to image files under a directory tree
//! - Geometry: rotation by affine resampling (nearest/bilinear/bicubic), then trim crop
//! - Pipeline: `pack_masks` composes and writes one image per page, pages in parallel
//!
//! Quick example:
//! ```ignore
//! use mask_packer_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let pages = decode_atlas(std::fs::File::open("hero.atlas")?)?;
//! let masks = MaskIndex::scan("masks")?;
//! let reports = pack_masks(&pages, &masks, &ComposeConfig::default(), "out".as_ref())?;
//! println!("pages: {}", reports.len());
//! # Ok(()) }
//! ```

pub mod codec;
pub mod compositing;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod geometry;
pub mod mask_index;
pub mod model;
pub mod pipeline;
pub mod resample;

pub use compositing::*;
pub use config::*;
pub use decoder::*;
pub use error::*;
pub use mask_index::*;
pub use model::*;
pub use pipeline::*;
pub use resample::{ResampleKernel, rotate, rotated_size};

/// Convenience prelude for common types and functions.
/// Importing `mask_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{ComposeConfig, ComposeConfigBuilder, OutputFormat, PageIndexPolicy};
    pub use crate::mask_index::{MaskIndex, MaskSource};
    pub use crate::model::{Angle, Bounds, Offsets, Page, Point, Sprite};
    pub use crate::resample::ResampleKernel;
    pub use crate::{
        ComposedPage, MaskPackerError, PageReport, compose_page, decode_atlas, decode_atlas_str,
        dry_run, pack_masks, reports_to_json,
    };
}
