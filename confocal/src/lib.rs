//! Confocal - reader for confocal microscopy images.
//!
//! Resolves the Nth image of a multi-series project file or of a folder of
//! single-image files, exposes channel names, pixel resolution and per-plane
//! timestamps, and produces an 8-bit normalized mask (nucleus) channel.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use confocal::Reader;
//!
//! let reader = Reader::new("experiment.ome.tif", 0, "DAPI")?;
//! println!("Channels: {:?}", reader.list_channel_names());
//!
//! let mask = reader.read_mask_channel(true, 0)?;
//! confocal::save_png(&mask.image, &mask.file_name)?;
//! reader.close();
//! ```

mod backend;
mod config;
mod error;
mod metadata;
mod normalize;
mod plane;
mod reader;
mod records;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{ImageBackend, OmeTiffBackend};
pub use config::{ReaderConfig, DEFAULT_PERCENTILE};
pub use error::{Error, Result};
pub use metadata::{
    ChannelMetadata, DimensionOrder, ImageMetadata, PixelType, PlaneCoord, PlaneMetadata,
    SeriesMetadata,
};
pub use normalize::{clip_and_rescale, find_threshold, normalize};
pub use plane::{save_png, Plane, PlaneData};
pub use reader::{MaskPlane, Reader};
pub use records::{
    ChannelFrame, RegionMeasurement, Resolution, Signal, UnetConfig, DEFAULT_PHYSICAL_UNIT,
};
