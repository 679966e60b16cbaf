//! Image metadata model shared by all backends.
//!
//! Mirrors the subset of OME metadata the reader needs: per series channel
//! names, physical pixel size, pixel type, dimension sizes and the per-plane
//! delta-T table.

use strum_macros::{Display, EnumString};

use crate::error::{Error, Result};

/// Pixel storage type as named by OME.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PixelType {
    Int8,
    #[default]
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float,
    Double,
    Bit,
    Complex,
    #[strum(serialize = "double-complex")]
    DoubleComplex,
}

impl PixelType {
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelType::Bit => 1,
            PixelType::Int8 | PixelType::Uint8 => 8,
            PixelType::Int16 | PixelType::Uint16 => 16,
            PixelType::Int32 | PixelType::Uint32 | PixelType::Float => 32,
            PixelType::Double | PixelType::Complex => 64,
            PixelType::DoubleComplex => 128,
        }
    }
}

/// Order in which Z, C and T vary across consecutive planes, fastest first.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum DimensionOrder {
    #[default]
    XYZCT,
    XYZTC,
    XYCTZ,
    XYCZT,
    XYTCZ,
    XYTZC,
}

/// Channel / z-slice / timepoint of a plane inside one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlaneCoord {
    pub c: usize,
    pub z: usize,
    pub t: usize,
}

impl PlaneCoord {
    pub fn new(c: usize, z: usize, t: usize) -> Self {
        Self { c, z, t }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelMetadata {
    pub name: Option<String>,
}

/// One `Plane` entry: its coordinate and capture time relative to acquisition start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaneMetadata {
    pub coord: PlaneCoord,
    /// Time since acquisition start, in the file's DeltaT unit (seconds unless stated otherwise).
    pub delta_t: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesMetadata {
    pub name: Option<String>,
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub dimension_order: DimensionOrder,
    pub pixel_type: PixelType,
    pub physical_size_x: Option<f64>,
    pub physical_size_y: Option<f64>,
    pub physical_size_unit: Option<String>,
    pub channels: Vec<ChannelMetadata>,
    /// Plane entries in the order they appear in the metadata, indexed by plane number.
    pub planes: Vec<PlaneMetadata>,
}

impl SeriesMetadata {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn plane_count(&self) -> usize {
        self.size_z * self.size_c * self.size_t
    }

    pub fn plane(&self, plane_num: usize) -> Option<&PlaneMetadata> {
        self.planes.get(plane_num)
    }

    /// Linear index of `coord` among this series' planes according to the dimension order.
    pub fn plane_rank(&self, coord: PlaneCoord) -> Result<usize> {
        if coord.c >= self.size_c || coord.z >= self.size_z || coord.t >= self.size_t {
            return Err(Error::Metadata(format!(
                "Plane {:?} outside of C={} Z={} T={}",
                coord, self.size_c, self.size_z, self.size_t
            )));
        }

        let (c, z, t) = (coord.c, coord.z, coord.t);
        let (sc, sz, st) = (self.size_c, self.size_z, self.size_t);
        let rank = match self.dimension_order {
            DimensionOrder::XYZCT => z + sz * (c + sc * t),
            DimensionOrder::XYZTC => z + sz * (t + st * c),
            DimensionOrder::XYCZT => c + sc * (z + sz * t),
            DimensionOrder::XYCTZ => c + sc * (t + st * z),
            DimensionOrder::XYTCZ => t + st * (c + sc * z),
            DimensionOrder::XYTZC => t + st * (z + sz * c),
        };

        Ok(rank)
    }
}

/// Metadata for every series stored in one file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageMetadata {
    pub series: Vec<SeriesMetadata>,
}

impl ImageMetadata {
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn series(&self, index: usize) -> Option<&SeriesMetadata> {
        self.series.get(index)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn series(order: DimensionOrder) -> SeriesMetadata {
        SeriesMetadata {
            size_z: 2,
            size_c: 3,
            size_t: 4,
            dimension_order: order,
            ..Default::default()
        }
    }

    #[test]
    fn pixel_type_parses_ome_names() {
        assert_eq!(PixelType::from_str("uint16").unwrap(), PixelType::Uint16);
        assert_eq!(PixelType::from_str("float").unwrap(), PixelType::Float);
        assert_eq!(
            PixelType::from_str("double-complex").unwrap(),
            PixelType::DoubleComplex
        );
        assert!(PixelType::from_str("uint12").is_err());
        assert_eq!(PixelType::Uint16.to_string(), "uint16");
        assert_eq!(PixelType::Uint16.bits_per_pixel(), 16);
    }

    #[test]
    fn plane_rank_follows_dimension_order() {
        let coord = PlaneCoord::new(1, 1, 2);

        // z fastest, then c, then t
        assert_eq!(
            series(DimensionOrder::XYZCT).plane_rank(coord).unwrap(),
            1 + 2 * (1 + 3 * 2)
        );
        // c fastest, then z, then t
        assert_eq!(
            series(DimensionOrder::XYCZT).plane_rank(coord).unwrap(),
            1 + 3 * (1 + 2 * 2)
        );
        // t fastest, then c, then z
        assert_eq!(
            series(DimensionOrder::XYTCZ).plane_rank(coord).unwrap(),
            2 + 4 * (1 + 3 * 1)
        );
    }

    #[test]
    fn plane_rank_covers_every_plane_once() {
        let s = series(DimensionOrder::XYCTZ);
        let mut seen = vec![false; s.plane_count()];
        for c in 0..3 {
            for z in 0..2 {
                for t in 0..4 {
                    let rank = s.plane_rank(PlaneCoord::new(c, z, t)).unwrap();
                    assert!(!seen[rank]);
                    seen[rank] = true;
                }
            }
        }
        assert!(seen.into_iter().all(|v| v));
    }

    #[test]
    fn plane_rank_rejects_out_of_range() {
        let s = series(DimensionOrder::XYZCT);
        assert!(matches!(
            s.plane_rank(PlaneCoord::new(3, 0, 0)),
            Err(Error::Metadata(_))
        ));
    }
}
