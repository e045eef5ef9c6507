#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

pub mod bitmap;
pub mod error;
pub mod format;
pub mod header;
pub mod image_io;
pub mod report;
pub mod scaling;
pub mod storage;
pub mod transform;

pub use bitmap::PackedBitmap;
pub use format::PixelFormat;
