use std::io;
use thiserror::Error;

use crate::image_io::TargetMode;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file error: {0}")]
    Io(#[from] io::Error),
    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),
    #[error("attempted to decompress a non-PNG file")]
    NotPng,
    #[error("unsupported PNG bit depth {0}")]
    UnsupportedBitDepth(u8),
    #[error("can't convert {source_layout} image to {target:?}")]
    CannotConvert {
        source_layout: &'static str,
        target: TargetMode,
    },
    #[error("index {value} out of range, must be below {limit}")]
    IndexOutOfRange { value: u32, limit: u32 },
    #[error("image {width}x{height} is too small for {tile_width}x{tile_height} tiles")]
    TooSmallForTiles {
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    },
    #[error("invalid image size: {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("invalid {option} parameter \"{value}\"")]
    InvalidArgument { option: &'static str, value: String },
}
