//! Locates the Nth confocal image and reads its channels.
//!
//! A reader is opened on either a single multi-series file, where the index picks
//! a series, or a directory, where the index picks a file among every matching
//! file found recursively (series 0). Files are enumerated in lexicographic
//! file-name order at each directory level so an index always maps to the same
//! file for the same tree.


use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::{ImageBackend, OmeTiffBackend};
use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::metadata::{PixelType, PlaneCoord, SeriesMetadata};
use crate::normalize::normalize;
use crate::plane::Plane;
use crate::records::{ChannelFrame, Resolution, DEFAULT_PHYSICAL_UNIT};

/// Extension of the suggested mask output file.
const MASK_FILE_EXTENSION: &str = "png";

/// Mask channel plane with the file name it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskPlane {
    pub image: Plane,
    /// `<source base name>_<mask channel name>.png`
    pub file_name: String,
}

pub struct Reader {
    backend: Arc<dyn ImageBackend>,
    config: ReaderConfig,
    image_path: PathBuf,
    series: usize,
    metadata: SeriesMetadata,
    channels: Vec<String>,
    mask_channel_name: String,
    mask_channel: Option<usize>,
    resolution: Resolution,
    released: bool,
}

impl Reader {
    /// Opens image `index` under `path` with the shared OME-TIFF backend and default settings.
    pub fn new<P: AsRef<Path>>(path: P, index: usize, mask_channel_name: &str) -> Result<Self> {
        Self::with_backend(
            path,
            index,
            mask_channel_name,
            OmeTiffBackend::shared(),
            ReaderConfig::default(),
        )
    }

    pub fn with_backend<P: AsRef<Path>>(
        path: P,
        index: usize,
        mask_channel_name: &str,
        backend: Arc<dyn ImageBackend>,
        config: ReaderConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let (image_path, series) = resolve_image_path(path, index, backend.as_ref(), &config)?;
        debug!(
            "Resolved image {} of {} to {} series {}",
            index,
            path.display(),
            image_path.display(),
            series
        );

        let metadata = backend.read_metadata(&image_path)?;
        let available = metadata.series_count();
        let Some(metadata) = metadata.series.into_iter().nth(series) else {
            // No reader will exist to release what read_metadata cached.
            backend.clear_cache();
            return Err(Error::NotFound {
                path: image_path,
                index: series,
                available,
            });
        };

        let channels = channel_names(&metadata);
        let mask_channel = find_channel(&channels, mask_channel_name);
        if mask_channel.is_none() {
            warn!(
                "Mask channel '{}' not found in {} (channels: {:?})",
                mask_channel_name,
                image_path.display(),
                channels
            );
        }

        let resolution = Resolution::with_unit(
            metadata.physical_size_x,
            metadata.physical_size_y,
            metadata
                .physical_size_unit
                .as_deref()
                .unwrap_or(DEFAULT_PHYSICAL_UNIT),
        );

        info!(
            "Opened {} series {}: {} channels, {} timepoints, {}",
            image_path.display(),
            series,
            channels.len(),
            metadata.size_t,
            metadata.pixel_type
        );

        Ok(Self {
            backend,
            config,
            image_path,
            series,
            metadata,
            channels,
            mask_channel_name: mask_channel_name.to_string(),
            mask_channel,
            resolution,
            released: false,
        })
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn series(&self) -> usize {
        self.series
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel_name(&self, index: usize) -> Option<&str> {
        self.channels.get(index).map(String::as_str)
    }

    /// Index of the mask channel, `None` if no channel carries its name.
    pub fn mask_channel(&self) -> Option<usize> {
        self.mask_channel
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn pixel_type(&self) -> PixelType {
        self.metadata.pixel_type
    }

    pub fn timepoint_count(&self) -> usize {
        self.metadata.size_t
    }

    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    /// Channel names in channel index order.
    pub fn list_channel_names(&self) -> &[String] {
        &self.channels
    }

    /// Every channel's plane at timepoint `t`, in channel order, with its capture time.
    ///
    /// The capture time of channel `c` is the delta-T of plane `channel_count * t + c`.
    pub fn read_all_channels(&self, t: usize) -> Result<Vec<ChannelFrame>> {
        self.check_timepoint(t)?;

        let channel_count = self.channels.len();
        let mut frames = Vec::with_capacity(channel_count);
        for (c, name) in self.channels.iter().enumerate() {
            let image = self.load_plane(c, t)?;
            let plane_num = channel_count * t + c;
            let time_point = self.metadata.plane(plane_num).and_then(|p| p.delta_t);
            if time_point.is_none() {
                debug!("No DeltaT recorded for plane {}", plane_num);
            }

            frames.push(ChannelFrame::new(name.clone(), image, time_point));
        }

        Ok(frames)
    }

    /// Reads the mask channel at timepoint `t`, optionally normalized to 8 bits.
    pub fn read_mask_channel(&self, normalize_image: bool, t: usize) -> Result<MaskPlane> {
        let channel = self.mask_channel.ok_or_else(|| Error::ChannelNotFound {
            name: self.mask_channel_name.clone(),
        })?;
        self.check_timepoint(t)?;

        let mut image = self.load_plane(channel, t)?;
        if normalize_image {
            image = normalize(&image, self.config.percentile)?;
        }

        let file_name = format!(
            "{}_{}.{}",
            base_name(&self.image_path),
            self.channels[channel],
            MASK_FILE_EXTENSION
        );

        Ok(MaskPlane { image, file_name })
    }

    /// Releases the backend's decoder cache. Dropping the reader does the same.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.backend.clear_cache();
        }
    }

    fn check_timepoint(&self, t: usize) -> Result<()> {
        if t >= self.metadata.size_t {
            return Err(Error::TimepointOutOfRange {
                t,
                count: self.metadata.size_t,
            });
        }
        Ok(())
    }

    fn load_plane(&self, channel: usize, t: usize) -> Result<Plane> {
        self.backend
            .load_plane(&self.image_path, PlaneCoord::new(channel, 0, t), self.series)
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("image_path", &self.image_path)
            .field("series", &self.series)
            .field("channels", &self.channels)
            .field("mask_channel", &self.mask_channel)
            .finish()
    }
}

/// Maps (path, index) to a concrete file and series.
fn resolve_image_path(
    path: &Path,
    index: usize,
    backend: &dyn ImageBackend,
    config: &ReaderConfig,
) -> Result<(PathBuf, usize)> {
    if path.is_file() {
        return Ok((path.to_path_buf(), index));
    }

    let extensions: Vec<&str> = if config.extensions.is_empty() {
        backend.extensions().to_vec()
    } else {
        config.extensions.iter().map(String::as_str).collect()
    };

    let files = common::file_utils::files_with_extensions_recursive(path, &extensions)
        .map_err(|e| Error::io(path, e.into()))?;
    let available = files.len();

    files
        .into_iter()
        .nth(index)
        .map(|file| (file, 0))
        .ok_or_else(|| Error::NotFound {
            path: path.to_path_buf(),
            index,
            available,
        })
}

/// Channel names by index; unnamed channels are called `C<index>`.
fn channel_names(metadata: &SeriesMetadata) -> Vec<String> {
    metadata
        .channels
        .iter()
        .enumerate()
        .map(|(i, c)| c.name.clone().unwrap_or_else(|| format!("C{}", i)))
        .collect()
}

/// Last channel carrying `name`.
fn find_channel(channels: &[String], name: &str) -> Option<usize> {
    channels.iter().rposition(|c| c == name)
}

/// File name without its last extension.
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
