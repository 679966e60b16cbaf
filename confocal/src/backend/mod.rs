//! Metadata and plane access behind a narrow interface.
//!
//! The reader only ever asks three things of a file format: what does the
//! file contain, give me one plane, and forget whatever you cached.

mod ome_tiff;
mod ome_xml;


pub use ome_tiff::OmeTiffBackend;

use std::path::Path;

use crate::error::Result;
use crate::metadata::{ImageMetadata, PlaneCoord};
use crate::plane::Plane;

pub trait ImageBackend: Send + Sync {
    /// File extensions, without the dot, picked up when scanning a directory.
    fn extensions(&self) -> &[&str];

    /// Reads the metadata of every series in `path`.
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata>;

    /// Loads one raw plane of `series`. Pixel values are returned unscaled.
    fn load_plane(&self, path: &Path, coord: PlaneCoord, series: usize) -> Result<Plane>;

    /// Drops cached decoder state. Later calls re-open files as needed.
    fn clear_cache(&self);
}
