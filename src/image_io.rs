//! Loading image files into packed bitmaps.

mod decode;

use std::{fs, path::Path};

use crate::{bitmap::PackedBitmap, error::Error, format::PixelFormat};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Largest width or height a hardware bitmap can have.
const MAX_SIZE: u32 = 0xffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
}

/// What the loaded bitmap should contain. If the source can't provide it, loading fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// 1-bit palette indices.
    Indexed1,
    /// 4-bit palette indices.
    Indexed4,
    /// 8-bit palette indices.
    Indexed8,
    Alpha4,
    Alpha8,
    Alpha16,
    /// 3 bits luminance, 1 bit alpha.
    LumAlpha4,
    /// 4 bits luminance, 4 bits alpha.
    LumAlpha8,
    /// 8 bits luminance (low byte), 8 bits alpha (high byte).
    LumAlpha16,
    /// 1:5:5:5, presence bit in bit 15.
    Rgb555,
    /// 8:8:8:8 as ARGB.
    Rgba8888,
}

impl TargetMode {
    /// The pixel format of the bitmap that holds the loaded samples.
    pub fn storage_format(self) -> PixelFormat {
        match self {
            TargetMode::Indexed1 => PixelFormat::Packed1,
            TargetMode::Indexed4 | TargetMode::Alpha4 | TargetMode::LumAlpha4 => {
                PixelFormat::Packed4
            }
            TargetMode::Indexed8 | TargetMode::Alpha8 | TargetMode::LumAlpha8 => {
                PixelFormat::Chunky8
            }
            TargetMode::Alpha16 | TargetMode::LumAlpha16 | TargetMode::Rgb555 => {
                PixelFormat::Chunky16
            }
            TargetMode::Rgba8888 => PixelFormat::Chunky32,
        }
    }

    /// Bits per index for the indexed modes, None for direct colour modes.
    pub fn index_bits(self) -> Option<u32> {
        match self {
            TargetMode::Indexed1 => Some(1),
            TargetMode::Indexed4 => Some(4),
            TargetMode::Indexed8 => Some(8),
            _ => None,
        }
    }

    /// The narrowest indexed mode that can hold indices below `max_index`.
    /// A `max_index` of 0 means there is no limit.
    pub fn indexed_for(max_index: u32) -> TargetMode {
        match max_index {
            1..=2 => TargetMode::Indexed1,
            3..=16 => TargetMode::Indexed4,
            _ => TargetMode::Indexed8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub mode: TargetMode,
    /// Pad width and height to the next power of two. Padding is zero.
    pub pad_pow2: bool,
    /// Indices at or above this abort the load. Zero leaves only the limit of `mode`.
    pub max_index: u32,
}

impl LoadRequest {
    pub fn new(mode: TargetMode) -> Self {
        Self {
            mode,
            pad_pow2: false,
            max_index: 0,
        }
    }

    /// Also reject indices that don't fit an output with `max_index` colours.
    pub fn with_max_index(self, max_index: u32) -> Self {
        Self { max_index, ..self }
    }
}

/// Information about a loaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImageMeta {
    pub format: SourceFormat,
    /// Size of the image in the file, not including any padding.
    pub width: u32,
    pub height: u32,
    /// True if the bitmap holds palette indices.
    pub indexed: bool,
    /// Highest index used in the image. Zero for direct colour images.
    pub max_index: u32,
    /// ARGB palette entries, in palette order. Empty unless indexed.
    pub palette: Vec<u32>,
}

pub struct LoadedImage {
    pub bitmap: PackedBitmap,
    pub meta: SourceImageMeta,
}

pub fn identify(bytes: &[u8]) -> Option<SourceFormat> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        Some(SourceFormat::Png)
    } else {
        None
    }
}

pub fn load_file(filename: &Path, request: &LoadRequest) -> Result<LoadedImage, Error> {
    let bytes = fs::read(filename)?;
    load_bytes(&bytes, request)
}

/// Load an image from the contents of a file.
/// Fails without returning a partial image if the contents can't be converted
/// to the requested mode.
pub fn load_bytes(bytes: &[u8], request: &LoadRequest) -> Result<LoadedImage, Error> {
    match identify(bytes) {
        Some(SourceFormat::Png) => {
            let image = decode::load_png(bytes, request)?;
            image.bitmap.trace_rows();
            Ok(image)
        }
        None => Err(Error::NotPng),
    }
}

/// Size of the bitmap to allocate for an image of the given size.
fn padded_size(width: u32, height: u32, request: &LoadRequest) -> Result<(u32, u32), Error> {
    let (padded_width, padded_height) = if request.pad_pow2 {
        (width.next_power_of_two(), height.next_power_of_two())
    } else {
        (width, height)
    };
    if padded_width > MAX_SIZE || padded_height > MAX_SIZE {
        return Err(Error::InvalidSize(padded_width, padded_height));
    }
    Ok((padded_width, padded_height))
}
