//! Testing utilities for confocal.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

use crate::backend::ImageBackend;
use crate::error::{Error, Result};
use crate::metadata::{ImageMetadata, PlaneCoord};
use crate::plane::Plane;

/// In-memory backend: metadata and planes registered per path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    images: HashMap<PathBuf, (ImageMetadata, HashMap<(usize, PlaneCoord), Plane>)>,
    clear_calls: AtomicUsize,
    loads: Mutex<Vec<(PathBuf, PlaneCoord, usize)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, path: &Path, metadata: ImageMetadata) {
        self.images
            .insert(path.to_path_buf(), (metadata, HashMap::new()));
    }

    pub fn add_plane(&mut self, path: &Path, series: usize, coord: PlaneCoord, plane: Plane) {
        self.images
            .get_mut(path)
            .expect("add_image must be called first")
            .1
            .insert((series, coord), plane);
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> Vec<(PathBuf, PlaneCoord, usize)> {
        self.loads.lock().clone()
    }
}

impl ImageBackend for MemoryBackend {
    fn extensions(&self) -> &[&str] {
        &["czi"]
    }

    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata> {
        self.images
            .get(path)
            .map(|(metadata, _)| metadata.clone())
            .ok_or_else(|| Error::Metadata(format!("unknown file {}", path.display())))
    }

    fn load_plane(&self, path: &Path, coord: PlaneCoord, series: usize) -> Result<Plane> {
        self.loads
            .lock()
            .push((path.to_path_buf(), coord, series));

        self.images
            .get(path)
            .and_then(|(_, planes)| planes.get(&(series, coord)))
            .cloned()
            .ok_or_else(|| {
                Error::decode(path, format!("no plane {:?} in series {}", coord, series))
            })
    }

    fn clear_cache(&self) {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Writes 16-bit grayscale planes as consecutive IFDs, the first one carrying `ome_xml`.
pub fn write_ome_tiff(path: &Path, ome_xml: &str, width: u32, height: u32, planes: &[Vec<u16>]) {
    write_ome_tiff_as::<colortype::Gray16>(path, ome_xml, width, height, planes);
}

/// Writes grayscale planes of color type `C` as consecutive IFDs.
///
/// The encoder only accepts ASCII descriptions; see [`write_raw_tiff`] for UTF-8.
pub fn write_ome_tiff_as<C: ColorType>(
    path: &Path,
    ome_xml: &str,
    width: u32,
    height: u32,
    planes: &[Vec<C::Inner>],
) where
    [C::Inner]: TiffValue,
{
    let mut file = File::create(path).expect("Failed to create OME-TIFF fixture");
    let mut tiff = TiffEncoder::new(&mut file).expect("Failed to start TIFF encoder");

    for (i, data) in planes.iter().enumerate() {
        let mut image = tiff
            .new_image::<C>(width, height)
            .expect("Failed to add TIFF image");
        if i == 0 {
            image
                .encoder()
                .write_tag(Tag::ImageDescription, ome_xml)
                .expect("Failed to write ImageDescription");
        }
        image.write_data(data).expect("Failed to write TIFF plane");
    }
}

/// Hand-assembled little-endian TIFF with one uncompressed 8-bit plane.
///
/// `description` is stored byte for byte as an ASCII-typed tag, so it may hold UTF-8.
pub fn write_raw_tiff(path: &Path, description: &str, width: u32, height: u32, pixels: &[u8]) {
    assert_eq!(pixels.len(), (width * height) as usize);

    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    const ASCII: u16 = 2;
    const ENTRIES: u32 = 9;

    let ifd_end = 8 + 2 + ENTRIES * 12 + 4;
    let description_len = description.len() as u32 + 1;
    let pixels_offset = ifd_end + description_len;

    let entries: [(u16, u16, u32, u32); ENTRIES as usize] = [
        (256, LONG, 1, width),
        (257, LONG, 1, height),
        (258, SHORT, 1, 8),
        (259, SHORT, 1, 1),
        (262, SHORT, 1, 1),
        (270, ASCII, description_len, ifd_end),
        (273, LONG, 1, pixels_offset),
        (278, LONG, 1, height),
        (279, LONG, 1, pixels.len() as u32),
    ];

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"II");
    bytes.extend_from_slice(&42u16.to_le_bytes());
    bytes.extend_from_slice(&8u32.to_le_bytes());
    bytes.extend_from_slice(&(ENTRIES as u16).to_le_bytes());
    for (tag, kind, count, value) in entries {
        bytes.extend_from_slice(&tag.to_le_bytes());
        bytes.extend_from_slice(&kind.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(description.as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(pixels);

    std::fs::write(path, bytes).expect("Failed to write raw TIFF fixture");
}

/// One `<Image>` of a generated OME-XML document.
#[derive(Debug, Clone, Copy)]
pub struct SeriesXml<'a> {
    pub channels: &'a [&'a str],
    pub size_t: usize,
    pub order: &'a str,
    pub pixel_type: &'a str,
    /// Extra `<Pixels>` children such as `<Plane>` or `<TiffData>`.
    pub extra: &'a str,
}

pub fn series_xml<'a>(channels: &'a [&'a str], size_t: usize) -> SeriesXml<'a> {
    SeriesXml {
        channels,
        size_t,
        order: "XYCZT",
        pixel_type: "uint16",
        extra: "",
    }
}

impl<'a> SeriesXml<'a> {
    pub fn with_extra(mut self, extra: &'a str) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_pixel_type(mut self, pixel_type: &'a str) -> Self {
        self.pixel_type = pixel_type;
        self
    }
}

/// Minimal OME-XML document with one `<Image>` per series.
///
/// The unit is written as a character reference so the document stays ASCII.
pub fn ome_xml(width: u32, height: u32, series: &[SeriesXml]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">"#,
    );

    for (i, s) in series.iter().enumerate() {
        xml.push_str(&format!(
            r#"<Image ID="Image:{i}" Name="cell {i}"><Pixels ID="Pixels:{i}" DimensionOrder="{}" Type="{}" SizeX="{width}" SizeY="{height}" SizeZ="1" SizeC="{}" SizeT="{}" PhysicalSizeX="0.2" PhysicalSizeY="0.25" PhysicalSizeXUnit="&#181;m">"#,
            s.order,
            s.pixel_type,
            s.channels.len(),
            s.size_t
        ));
        for (c, name) in s.channels.iter().enumerate() {
            xml.push_str(&format!(
                r#"<Channel ID="Channel:{i}:{c}" Name="{name}" SamplesPerPixel="1"/>"#
            ));
        }
        xml.push_str(s.extra);
        xml.push_str("</Pixels></Image>");
    }

    xml.push_str("</OME>");
    xml
}
