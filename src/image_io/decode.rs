//! PNG decoding and sample conversion.

use rgb::RGBA8;
use std::borrow::Cow;

use super::{padded_size, LoadRequest, LoadedImage, SourceFormat, SourceImageMeta, TargetMode};
use crate::{bitmap::PackedBitmap, error::Error};

/// Channel layout of the source samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Indexed,
    Grey,
    GreyAlpha,
    Rgb,
    Rgba,
}

impl Layout {
    fn from_color_type(color_type: png::ColorType) -> Self {
        match color_type {
            png::ColorType::Indexed => Layout::Indexed,
            png::ColorType::Grayscale => Layout::Grey,
            png::ColorType::GrayscaleAlpha => Layout::GreyAlpha,
            png::ColorType::Rgb => Layout::Rgb,
            png::ColorType::Rgba => Layout::Rgba,
        }
    }

    fn channels(self) -> usize {
        match self {
            Layout::Indexed | Layout::Grey => 1,
            Layout::GreyAlpha => 2,
            Layout::Rgb => 3,
            Layout::Rgba => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Layout::Indexed => "indexed",
            Layout::Grey => "grey",
            Layout::GreyAlpha => "grey-alpha",
            Layout::Rgb => "RGB",
            Layout::Rgba => "RGBA",
        }
    }
}

/// Converts the channel bytes of one pixel to a target sample.
type Converter = fn(&[u8]) -> u32;

/// How each row of the source is turned into bitmap samples.
enum Plan {
    /// Copy palette indices. Indices at or above `limit` abort the load.
    Indices { limit: Option<u32> },
    /// Look up each index in the palette and convert the RGBA colour.
    Palette(Converter),
    /// Convert the channels of each pixel.
    Direct(Converter),
}

fn cannot_convert(layout: Layout, target: TargetMode) -> Error {
    Error::CannotConvert {
        source_layout: layout.name(),
        target,
    }
}

/// Find the conversion from 8-bit channels (or 16-bit big endian grey if `wide`)
/// to the target mode.
fn converter(layout: Layout, target: TargetMode, wide: bool) -> Option<Converter> {
    use TargetMode::*;
    let convert: Converter = match (layout, target, wide) {
        (Layout::Grey, Alpha16, true) => |p: &[u8]| u16::from_be_bytes([p[0], p[1]]) as u32,
        (_, _, true) => return None,

        // Grey is treated as alpha, with full luminance.
        (Layout::Grey, Alpha4, _) => |p: &[u8]| (p[0] >> 4) as u32,
        (Layout::Grey, Alpha8, _) => |p: &[u8]| p[0] as u32,
        (Layout::Grey, Alpha16, _) => |p: &[u8]| p[0] as u32 * 0x0101,
        (Layout::Grey, LumAlpha4, _) => |p: &[u8]| 0xe | (p[0] >> 7) as u32,
        (Layout::Grey, LumAlpha8, _) => |p: &[u8]| 0xf0 | (p[0] >> 4) as u32,
        (Layout::Grey, LumAlpha16, _) => |p: &[u8]| 0xff | (p[0] as u32) << 8,
        (Layout::Grey, Rgba8888, _) => |p: &[u8]| (p[0] as u32) << 24 | 0x00ff_ffff,

        (Layout::GreyAlpha, LumAlpha4, _) => |p: &[u8]| ((p[0] >> 5) << 1 | p[1] >> 7) as u32,
        (Layout::GreyAlpha, LumAlpha8, _) => |p: &[u8]| ((p[0] & 0xf0) | p[1] >> 4) as u32,
        (Layout::GreyAlpha, LumAlpha16, _) => |p: &[u8]| p[0] as u32 | (p[1] as u32) << 8,
        (Layout::GreyAlpha, Rgba8888, _) => |p: &[u8]| {
            u32::from_be_bytes([p[1], p[0], p[0], p[0]])
        },

        (Layout::Rgb, Rgb555, _) => |p: &[u8]| rgb555(p[0], p[1], p[2], true),
        (Layout::Rgb, Rgba8888, _) => |p: &[u8]| u32::from_be_bytes([0xff, p[0], p[1], p[2]]),
        (Layout::Rgba, Rgb555, _) => |p: &[u8]| rgb555(p[0], p[1], p[2], p[3] & 0x80 != 0),
        (Layout::Rgba, Rgba8888, _) => |p: &[u8]| u32::from_be_bytes([p[3], p[0], p[1], p[2]]),
        _ => return None,
    };
    Some(convert)
}

fn rgb555(r: u8, g: u8, b: u8, present: bool) -> u32 {
    let colour = (r as u32 & 0xf8) << 7 | (g as u32 & 0xf8) << 2 | (b as u32) >> 3;
    if present {
        colour | 0x8000
    } else {
        colour
    }
}

/// The lowest of the index limits, where zero and `None` mean no limit.
fn index_limit(mode_limit: Option<u32>, max_index: u32) -> Option<u32> {
    match (mode_limit, max_index) {
        (limit, 0) => limit,
        (Some(limit), max_index) => Some(limit.min(max_index)),
        (None, max_index) => Some(max_index),
    }
}

fn plan(layout: Layout, depth: u8, request: &LoadRequest) -> Result<Plan, Error> {
    let target = request.mode;
    if depth == 16 && target != TargetMode::Alpha16 {
        return Err(Error::UnsupportedBitDepth(depth));
    }
    match (layout, target.index_bits()) {
        (Layout::Indexed, Some(bits)) => {
            let depth = depth as u32;
            if depth != 8 && depth > bits {
                Err(cannot_convert(layout, target))
            } else {
                let mode_limit = if depth == 8 && bits < 8 {
                    Some(1 << bits)
                } else {
                    None
                };
                Ok(Plan::Indices {
                    limit: index_limit(mode_limit, request.max_index),
                })
            }
        }
        (Layout::Indexed, None) => converter(Layout::Rgba, target, false)
            .map(Plan::Palette)
            .ok_or_else(|| cannot_convert(layout, target)),
        (_, Some(_)) => Err(cannot_convert(layout, target)),
        (_, None) => converter(layout, target, depth == 16)
            .map(Plan::Direct)
            .ok_or_else(|| cannot_convert(layout, target)),
    }
}

/// Split a row into samples of `depth` bits, first sample in the most significant bits.
/// If `scale` is set the samples are expanded to the full 8-bit range.
fn unpack(row: &[u8], depth: u8, scale: bool) -> impl Iterator<Item = u8> + '_ {
    let depth = depth.min(8);
    let per_byte = 8 / depth;
    let mask = ((1u16 << depth) - 1) as u8;
    let factor = if scale { 0xff / mask } else { 1 };
    row.iter().flat_map(move |&byte| {
        (1..=per_byte).map(move |i| ((byte >> (8 - depth * i)) & mask) * factor)
    })
}

/// Palette entries, with alpha from the transparency chunk. Entries without alpha are opaque.
fn read_palette(palette: &[u8], trns: Option<&[u8]>) -> Vec<RGBA8> {
    palette
        .chunks_exact(3)
        .enumerate()
        .map(|(i, rgb)| {
            let alpha = trns.and_then(|t| t.get(i)).copied().unwrap_or(0xff);
            RGBA8::new(rgb[0], rgb[1], rgb[2], alpha)
        })
        .collect()
}

fn argb(colour: RGBA8) -> u32 {
    u32::from_be_bytes([colour.a, colour.r, colour.g, colour.b])
}

pub fn load_png(bytes: &[u8], request: &LoadRequest) -> Result<LoadedImage, Error> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let info = reader.info();
    let (width, height) = (info.width, info.height);
    let depth = info.bit_depth as u8;
    let layout = Layout::from_color_type(info.color_type);
    let palette = match (layout, info.palette.as_deref()) {
        (Layout::Indexed, Some(palette)) => read_palette(palette, info.trns.as_deref()),
        _ => Vec::new(),
    };
    log::debug!(
        "PNG {}x{}, {} bit {}, {} palette entries, interlaced: {}",
        width,
        height,
        depth,
        layout.name(),
        palette.len(),
        info.interlaced
    );

    let plan = plan(layout, depth, request)?;
    let (padded_width, padded_height) = padded_size(width, height, request)?;

    let mut pixels = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut pixels)?;

    // Allocated zeroed, so padding columns and rows are already clear.
    let mut bitmap = PackedBitmap::new(
        request.mode.storage_format(),
        padded_width,
        padded_height,
    );
    let mut max_index = 0;
    let rows = pixels
        .chunks_exact(frame.line_size)
        .take(height as usize)
        .zip(0..);

    for (row, y) in rows {
        match plan {
            Plan::Indices { limit } => {
                for (index, x) in unpack(row, depth, false).take(width as usize).zip(0..) {
                    let index = index as u32;
                    if let Some(limit) = limit {
                        if index >= limit {
                            return Err(Error::IndexOutOfRange {
                                value: index,
                                limit,
                            });
                        }
                    }
                    max_index = max_index.max(index);
                    bitmap.plot(x, y, index);
                }
            }
            Plan::Palette(convert) => {
                for (index, x) in unpack(row, depth, false).take(width as usize).zip(0..) {
                    let colour = palette.get(index as usize).copied().ok_or_else(|| {
                        Error::IndexOutOfRange {
                            value: index as u32,
                            limit: palette.len() as u32,
                        }
                    })?;
                    bitmap.plot(x, y, convert(&[colour.r, colour.g, colour.b, colour.a]));
                }
            }
            Plan::Direct(convert) => {
                let samples: Cow<'_, [u8]> = if depth < 8 {
                    Cow::Owned(unpack(row, depth, true).collect())
                } else {
                    Cow::Borrowed(row)
                };
                let pixel_size = layout.channels() * (depth as usize / 8).max(1);
                for (pixel, x) in samples.chunks_exact(pixel_size).take(width as usize).zip(0..) {
                    bitmap.plot(x, y, convert(pixel));
                }
            }
        }
    }

    let indexed = matches!(plan, Plan::Indices { .. });
    Ok(LoadedImage {
        bitmap,
        meta: SourceImageMeta {
            format: SourceFormat::Png,
            width,
            height,
            indexed,
            max_index,
            palette: if indexed {
                palette.into_iter().map(argb).collect()
            } else {
                Vec::new()
            },
        },
    })
}
