//! Example: Export the normalized mask channel of one confocal image
//!
//! Opens image `INDEX` of `PATH` (an OME-TIFF project file, or a directory of
//! OME-TIFF files), normalizes the mask channel at timepoint 0 and writes it as
//! `<image>_<channel>.png` into the output directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example export_mask -- PATH INDEX MASK_CHANNEL [OUTPUT_DIR] [CONFIG]
//! cargo run --example export_mask -- cells/ 3 DAPI test_output reader.yaml
//! ```

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use confocal::{save_png, OmeTiffBackend, Reader, ReaderConfig};
use log::info;

fn main() -> anyhow::Result<()> {
    common::setup_logging("info");

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        anyhow::bail!(
            "Usage: {} PATH INDEX MASK_CHANNEL [OUTPUT_DIR] [CONFIG]",
            args[0]
        );
    }

    let path = PathBuf::from(&args[1]);
    let index: usize = args[2]
        .parse()
        .with_context(|| format!("INDEX must be a non-negative integer, got '{}'", args[2]))?;
    let mask_channel = &args[3];
    let output_dir = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = match args.get(5) {
        Some(config_path) => ReaderConfig::from_file(Path::new(config_path))?,
        None => ReaderConfig::default(),
    };

    let reader = Reader::with_backend(
        &path,
        index,
        mask_channel,
        OmeTiffBackend::shared(),
        config,
    )?;
    info!(
        "Channels: {:?}, resolution: {:?} x {:?} {}",
        reader.list_channel_names(),
        reader.resolution().x(),
        reader.resolution().y(),
        reader.resolution().unit()
    );

    let mask = reader.read_mask_channel(true, 0)?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let output = output_dir.join(&mask.file_name);
    save_png(&mask.image, &output)?;
    info!("Wrote {}", output.display());

    reader.close();
    Ok(())
}
