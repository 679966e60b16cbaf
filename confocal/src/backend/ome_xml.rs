use std::str::FromStr;

use roxmltree::Node;

use crate::error::{Error, Result};
use crate::metadata::{
    ChannelMetadata, DimensionOrder, ImageMetadata, PixelType, PlaneCoord, PlaneMetadata,
    SeriesMetadata,
};

/// A `<TiffData>` block: a run of planes stored in consecutive IFDs.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct TiffData {
    pub ifd: usize,
    pub first: PlaneCoord,
    pub plane_count: Option<usize>,
}

/// Parsed OME-XML document: metadata plus plane-to-IFD layout per series.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct OmeDocument {
    pub metadata: ImageMetadata,
    pub tiff_data: Vec<Vec<TiffData>>,
}

impl OmeDocument {
    /// Maps a plane of `series` to the IFD holding it.
    pub fn ifd_for(&self, series: usize, coord: PlaneCoord) -> Result<usize> {
        let meta = self.metadata.series(series).ok_or_else(|| {
            Error::Metadata(format!(
                "Series {} out of range ({} series)",
                series,
                self.metadata.series_count()
            ))
        })?;
        let rank = meta.plane_rank(coord)?;

        let blocks = &self.tiff_data[series];
        if blocks.is_empty() {
            let offset: usize = self.metadata.series[..series]
                .iter()
                .map(SeriesMetadata::plane_count)
                .sum();
            return Ok(offset + rank);
        }

        let single = blocks.len() == 1;
        for block in blocks {
            let start = meta.plane_rank(block.first)?;
            let count = match block.plane_count {
                Some(count) => count,
                None if single => meta.plane_count() - start,
                None => 1,
            };
            if rank >= start && rank < start + count {
                return Ok(block.ifd + (rank - start));
            }
        }

        Err(Error::Metadata(format!(
            "No TiffData entry covers plane {:?} of series {}",
            coord, series
        )))
    }
}

pub(crate) fn parse_ome_xml(xml: &str) -> Result<OmeDocument> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| Error::Metadata(format!("XML parse error: {}", e)))?;

    let root = doc.root_element();
    if root.tag_name().name() != "OME" {
        return Err(Error::Metadata("Root element must be <OME>".to_string()));
    }

    let mut document = OmeDocument::default();
    for image in children(root, "Image") {
        let (series, tiff_data) = parse_image(&image)?;
        document.metadata.series.push(series);
        document.tiff_data.push(tiff_data);
    }

    if document.metadata.series.is_empty() {
        return Err(Error::Metadata("OME document has no <Image>".to_string()));
    }

    Ok(document)
}

fn enum_error(attr: &str, value: &str, err: strum::ParseError) -> Error {
    Error::Metadata(format!("Unknown {} '{}': {}", attr, value, err))
}

fn parse_image(image: &Node) -> Result<(SeriesMetadata, Vec<TiffData>)> {
    let pixels = children(*image, "Pixels")
        .next()
        .ok_or_else(|| Error::Metadata("<Image> without <Pixels>".to_string()))?;

    let dimension_order = required_attr(&pixels, "DimensionOrder")?;
    let dimension_order = DimensionOrder::from_str(dimension_order).map_err(|e| {
        enum_error("DimensionOrder", dimension_order, e)
    })?;
    let pixel_type = required_attr(&pixels, "Type")?;
    let pixel_type =
        PixelType::from_str(pixel_type).map_err(|e| enum_error("Type", pixel_type, e))?;

    let mut series = SeriesMetadata {
        name: image.attribute("Name").map(str::to_string),
        size_x: parse_attr(&pixels, "SizeX")?.unwrap_or(0),
        size_y: parse_attr(&pixels, "SizeY")?.unwrap_or(0),
        size_z: parse_attr(&pixels, "SizeZ")?.unwrap_or(1),
        size_c: parse_attr(&pixels, "SizeC")?.unwrap_or(1),
        size_t: parse_attr(&pixels, "SizeT")?.unwrap_or(1),
        dimension_order,
        pixel_type,
        physical_size_x: parse_attr(&pixels, "PhysicalSizeX")?,
        physical_size_y: parse_attr(&pixels, "PhysicalSizeY")?,
        physical_size_unit: pixels.attribute("PhysicalSizeXUnit").map(str::to_string),
        channels: children(pixels, "Channel")
            .map(|c| ChannelMetadata {
                name: c.attribute("Name").map(str::to_string),
            })
            .collect(),
        planes: Vec::new(),
    };

    if series.channels.is_empty() {
        series.channels = vec![ChannelMetadata::default(); series.size_c];
    }

    for plane in children(pixels, "Plane") {
        series.planes.push(PlaneMetadata {
            coord: PlaneCoord::new(
                parse_attr(&plane, "TheC")?.unwrap_or(0),
                parse_attr(&plane, "TheZ")?.unwrap_or(0),
                parse_attr(&plane, "TheT")?.unwrap_or(0),
            ),
            delta_t: parse_attr(&plane, "DeltaT")?,
        });
    }

    let mut tiff_data = Vec::new();
    for block in children(pixels, "TiffData") {
        tiff_data.push(TiffData {
            ifd: parse_attr(&block, "IFD")?.unwrap_or(0),
            first: PlaneCoord::new(
                parse_attr(&block, "FirstC")?.unwrap_or(0),
                parse_attr(&block, "FirstZ")?.unwrap_or(0),
                parse_attr(&block, "FirstT")?.unwrap_or(0),
            ),
            plane_count: parse_attr(&block, "PlaneCount")?,
        });
    }

    Ok((series, tiff_data))
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn required_attr<'a>(node: &Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        Error::Metadata(format!(
            "<{}> is missing attribute '{}'",
            node.tag_name().name(),
            name
        ))
    })
}

fn parse_attr<T: FromStr>(node: &Node, name: &str) -> Result<Option<T>> {
    match node.attribute(name) {
        None => Ok(None),
        Some(text) => text.trim().parse().map(Some).map_err(|_| {
            Error::Metadata(format!(
                "<{}> attribute {}='{}' is not a valid value",
                node.tag_name().name(),
                name,
                text
            ))
        }),
    }
}
