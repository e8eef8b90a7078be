//! Loading an image from disk or memory into something a navigator can walk.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::analysis::memory::ImageMemory;
use crate::config::NavigatorConfig;
use crate::core::layout::ImageLayout;
use crate::disasm::IcedDecoder;
use crate::error::{NavError, Result};
use crate::formats::pe;
use crate::io::{IOLimits, SafeReader};
use crate::log_error;
use crate::navigator::Navigator;

/// Decoder type produced for an image held in `B`.
pub type ImageDecoder<B> = IcedDecoder<ImageMemory<B>>;

/// A parsed image with a decoder bound to its preferred load base.
pub struct LoadedImage<B: AsRef<[u8]>> {
    layout: ImageLayout,
    decoder: Arc<ImageDecoder<B>>,
    config: NavigatorConfig,
}

impl<B: AsRef<[u8]>> LoadedImage<B> {
    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    pub fn decoder(&self) -> &Arc<ImageDecoder<B>> {
        &self.decoder
    }

    /// A fresh navigator over this image, cursor at RVA 0.
    pub fn navigator(&self) -> Result<Navigator<ImageDecoder<B>>> {
        Navigator::with_config(&self.layout, Arc::clone(&self.decoder), &self.config)
    }
}

/// Parse a PE image held in memory.
///
/// Rejects out-of-range search settings before touching the bytes.
pub fn load_image<B: AsRef<[u8]>>(bytes: B, config: &NavigatorConfig) -> Result<LoadedImage<B>> {
    config.validate()?;
    let layout = pe::parse_layout(bytes.as_ref())?;
    layout.validate()?;

    let memory = ImageMemory::new(bytes, &layout);
    let decoder = IcedDecoder::new(memory, layout.image_base, layout.architecture)?
        .with_format(config.format);

    Ok(LoadedImage {
        layout,
        decoder: Arc::new(decoder),
        config: config.clone(),
    })
}

/// Map a PE file from disk and parse it.
pub fn open_image<P: AsRef<Path>>(
    path: P,
    config: &NavigatorConfig,
) -> Result<LoadedImage<SafeReader>> {
    let path = path.as_ref();
    let reader = SafeReader::open(path, IOLimits::from(&config.io))
        .map_err(|e| log_error!(NavError::from(e), "failed to map image"))?;
    let image = load_image(reader, config)
        .map_err(|e| log_error!(e, "failed to load image"))?;

    info!(
        path = %path.display(),
        arch = %image.layout.architecture,
        image_base = format_args!("{:#x}", image.layout.image_base),
        size_of_image = format_args!("{:#x}", image.layout.size_of_image),
        sections = image.layout.sections.len(),
        "loaded image"
    );
    Ok(image)
}
