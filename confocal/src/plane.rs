use std::path::Path;

use image_lib::GrayImage;

use crate::error::{Error, Result};

/// Typed pixel storage of a single plane, row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneData {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PlaneData {
    pub fn len(&self) -> usize {
        match self {
            PlaneData::U8(v) => v.len(),
            PlaneData::I8(v) => v.len(),
            PlaneData::U16(v) => v.len(),
            PlaneData::I16(v) => v.len(),
            PlaneData::U32(v) => v.len(),
            PlaneData::I32(v) => v.len(),
            PlaneData::F32(v) => v.len(),
            PlaneData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bits_per_sample(&self) -> u32 {
        match self {
            PlaneData::U8(_) | PlaneData::I8(_) => 8,
            PlaneData::U16(_) | PlaneData::I16(_) => 16,
            PlaneData::U32(_) | PlaneData::I32(_) | PlaneData::F32(_) => 32,
            PlaneData::F64(_) => 64,
        }
    }
}

/// One 2D pixel array for a (channel, z, timepoint) combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: PlaneData,
}

impl Plane {
    /// Panics if `data` does not hold exactly `width * height` samples.
    pub fn new(width: usize, height: usize, data: PlaneData) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "Pixel count mismatch for {}x{} plane",
            width,
            height
        );
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &PlaneData {
        &self.data
    }

    pub fn into_data(self) -> PlaneData {
        self.data
    }

    /// Pixel at (x, y) widened to f64.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width, "x coordinate out of bounds");
        debug_assert!(y < self.height, "y coordinate out of bounds");

        let idx = y * self.width + x;
        match &self.data {
            PlaneData::U8(v) => v[idx] as f64,
            PlaneData::I8(v) => v[idx] as f64,
            PlaneData::U16(v) => v[idx] as f64,
            PlaneData::I16(v) => v[idx] as f64,
            PlaneData::U32(v) => v[idx] as f64,
            PlaneData::I32(v) => v[idx] as f64,
            PlaneData::F32(v) => v[idx] as f64,
            PlaneData::F64(v) => v[idx],
        }
    }

    /// Borrows the samples of an 8-bit plane.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            PlaneData::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Converts an 8-bit plane into an `image` grayscale buffer.
    pub fn to_gray_image(&self) -> Result<GrayImage> {
        let pixels = self.as_u8().ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "{}-bit plane cannot be stored as 8-bit grayscale",
                self.data.bits_per_sample()
            ))
        })?;

        GrayImage::from_raw(self.width as u32, self.height as u32, pixels.to_vec())
            .ok_or_else(|| Error::UnsupportedFormat("Plane buffer size mismatch".to_string()))
    }
}

/// Writes an 8-bit plane as a grayscale PNG.
pub fn save_png<P: AsRef<Path>>(plane: &Plane, filename: P) -> Result<()> {
    let filename = filename.as_ref();
    let img = plane.to_gray_image()?;

    img.save_with_format(filename, image_lib::ImageFormat::Png)
        .map_err(|e| match e {
            image_lib::ImageError::IoError(source) => Error::io(filename, source),
            other => Error::UnsupportedFormat(other.to_string()),
        })
}
