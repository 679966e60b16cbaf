use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use log::debug;
use parking_lot::Mutex;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

use super::ome_xml::{parse_ome_xml, OmeDocument};
use super::ImageBackend;
use crate::error::{Error, Result};
use crate::metadata::{ImageMetadata, PlaneCoord};
use crate::plane::{Plane, PlaneData};

/// Extensions of OME-TIFF files (`*.ome.tif` ends in `tif`).
const OME_TIFF_EXTENSIONS: &[&str] = &["tif", "tiff"];

/// Reads OME-TIFF files: the OME-XML in the first IFD describes every series,
/// pixel planes live in the IFDs it points to.
///
/// Parsed OME-XML is cached per file until [`ImageBackend::clear_cache`].
#[derive(Debug, Default)]
pub struct OmeTiffBackend {
    cache: Mutex<HashMap<PathBuf, Arc<OmeDocument>>>,
}

impl OmeTiffBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance, shared by every reader that does not bring its own backend.
    pub fn shared() -> Arc<OmeTiffBackend> {
        static SHARED: OnceLock<Arc<OmeTiffBackend>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(OmeTiffBackend::new())).clone()
    }

    pub fn cached_file_count(&self) -> usize {
        self.cache.lock().len()
    }

    fn document(&self, path: &Path) -> Result<Arc<OmeDocument>> {
        if let Some(doc) = self.cache.lock().get(path) {
            return Ok(doc.clone());
        }

        debug!("Parsing OME-XML of {}", path.display());
        let mut decoder = open_decoder(path)?;
        let xml = decoder
            .get_tag_ascii_string(Tag::ImageDescription)
            .map_err(|e| Error::decode(path, format!("no OME-XML description: {}", e)))?;
        let doc = Arc::new(parse_ome_xml(&xml)?);

        self.cache.lock().insert(path.to_path_buf(), doc.clone());
        Ok(doc)
    }
}

impl ImageBackend for OmeTiffBackend {
    fn extensions(&self) -> &[&str] {
        OME_TIFF_EXTENSIONS
    }

    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata> {
        Ok(self.document(path)?.metadata.clone())
    }

    fn load_plane(&self, path: &Path, coord: PlaneCoord, series: usize) -> Result<Plane> {
        let doc = self.document(path)?;
        let ifd = doc.ifd_for(series, coord)?;
        debug!(
            "Loading plane c={} z={} t={} of series {} from IFD {} of {}",
            coord.c,
            coord.z,
            coord.t,
            series,
            ifd,
            path.display()
        );

        let mut decoder = open_decoder(path)?;
        decoder
            .seek_to_image(ifd)
            .map_err(|e| Error::decode(path, format!("IFD {}: {}", ifd, e)))?;
        read_gray_plane(path, &mut decoder)
    }

    fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    // Use unlimited to support large confocal planes
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| Error::decode(path, e))?
        .with_limits(Limits::unlimited());

    Ok(decoder)
}

fn read_gray_plane(path: &Path, decoder: &mut Decoder<BufReader<File>>) -> Result<Plane> {
    match decoder.colortype().map_err(|e| Error::decode(path, e))? {
        tiff::ColorType::Gray(_) => {}
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "Plane color type {:?} in {}",
                other,
                path.display()
            )));
        }
    }

    let (w, h) = decoder.dimensions().map_err(|e| Error::decode(path, e))?;
    let data = match decoder.read_image().map_err(|e| Error::decode(path, e))? {
        DecodingResult::U8(buf) => PlaneData::U8(buf),
        DecodingResult::I8(buf) => PlaneData::I8(buf),
        DecodingResult::U16(buf) => PlaneData::U16(buf),
        DecodingResult::I16(buf) => PlaneData::I16(buf),
        DecodingResult::U32(buf) => PlaneData::U32(buf),
        DecodingResult::I32(buf) => PlaneData::I32(buf),
        DecodingResult::F32(buf) => PlaneData::F32(buf),
        DecodingResult::F64(buf) => PlaneData::F64(buf),
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "64-bit integer or half-float samples in {}",
                path.display()
            )));
        }
    };

    let (width, height) = (w as usize, h as usize);
    if data.len() != width * height {
        return Err(Error::decode(
            path,
            format!(
                "expected {} samples for {}x{} plane, got {}",
                width * height,
                width,
                height,
                data.len()
            ),
        ));
    }

    Ok(Plane::new(width, height, data))
}
