//! Plain value records produced by the reader and by downstream measurement.

use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::plane::Plane;

/// Unit assumed when the metadata does not name one.
pub const DEFAULT_PHYSICAL_UNIT: &str = "µm";

/// Physical size of one pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    x: Option<f64>,
    y: Option<f64>,
    unit: String,
}

impl Resolution {
    pub fn new(x: Option<f64>, y: Option<f64>) -> Self {
        Self::with_unit(x, y, DEFAULT_PHYSICAL_UNIT)
    }

    pub fn with_unit(x: Option<f64>, y: Option<f64>, unit: impl Into<String>) -> Self {
        Self {
            x,
            y,
            unit: unit.into(),
        }
    }

    pub fn x(&self) -> Option<f64> {
        self.x
    }

    pub fn y(&self) -> Option<f64> {
        self.y
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// A channel's plane at one timepoint together with its capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFrame {
    name: String,
    image: Plane,
    time_point: Option<f64>,
}

impl ChannelFrame {
    pub fn new(name: impl Into<String>, image: Plane, time_point: Option<f64>) -> Self {
        Self {
            name: name.into(),
            image,
            time_point,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &Plane {
        &self.image
    }

    /// Time since acquisition start, if the file records it.
    pub fn time_point(&self) -> Option<f64> {
        self.time_point
    }

    pub fn into_image(self) -> Plane {
        self.image
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub intensity: f64,
}

impl Signal {
    pub fn new(name: impl Into<String>, intensity: f64) -> Self {
        Self {
            name: name.into(),
            intensity,
        }
    }
}

/// Center and area of a segmented region, with per-channel signals attached later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMeasurement {
    center: DVec2,
    area: f64,
    signals: Option<Vec<Signal>>,
}

impl RegionMeasurement {
    pub fn new(center: DVec2, area: f64) -> Self {
        Self {
            center,
            area,
            signals: None,
        }
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn signals(&self) -> Option<&[Signal]> {
        self.signals.as_deref()
    }

    pub fn update_signals(&mut self, signals: Vec<Signal>) {
        self.signals = Some(signals);
    }
}

/// Settings of the U-Net segmentation model consuming the normalized images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnetConfig {
    pub model_path: PathBuf,
    pub scale: f64,
    pub threshold: f64,
    pub image_size: u32,
}

impl UnetConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        common::read_config_file(path)
    }
}
