//! Reformatting a loaded image into the output pixel format.

use itertools::Itertools;
use std::fmt;

use crate::{bitmap::PackedBitmap, error::Error, format::PixelFormat, image_io::SourceImageMeta};

/// Width and height of a tile in pixels.
pub type TileSize = (u32, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub format: PixelFormat,
    /// Cut the image into tiles of this size and stack them vertically.
    /// None, or a zero width or height, converts the whole image.
    pub tile: Option<TileSize>,
    /// Pixels of border inserted at the left of each row.
    pub shift: u32,
    /// Double every source pixel horizontally before converting.
    pub double_width: bool,
    /// Complement every output byte. Only used for masks.
    pub invert: bool,
}

impl Options {
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            tile: None,
            shift: 0,
            double_width: false,
            invert: false,
        }
    }

    /// Turn off the options the output format can't support.
    /// Returns what was turned off.
    pub fn sanitize(&mut self) -> Vec<Downgrade> {
        let mut downgrades = Vec::new();
        if self.format.is_pattern_based() {
            if self.shift != 0 {
                self.shift = 0;
                downgrades.push(Downgrade::Shift(self.format));
            }
            if self.double_width {
                self.double_width = false;
                downgrades.push(Downgrade::DoubleWidth(self.format));
            }
        }
        downgrades
    }

    fn tile_size(&self) -> Option<TileSize> {
        self.tile.filter(|&(width, height)| width > 0 && height > 0)
    }
}

/// An option that was ignored because the output format doesn't support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downgrade {
    Shift(PixelFormat),
    DoubleWidth(PixelFormat),
}

impl fmt::Display for Downgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Downgrade::Shift(format) => write!(f, "-shift not supported for {}, ignored", format),
            Downgrade::DoubleWidth(format) => {
                write!(f, "-2x not supported for {}, ignored", format)
            }
        }
    }
}

/// The result of a transform.
pub struct Output {
    pub bitmap: PackedBitmap,
    /// Number of tiles stacked in the bitmap. 1 when converting the whole image.
    pub tile_count: u32,
    /// Height of each tile. The bitmap height when converting the whole image.
    pub tile_height: u32,
}

/// Copy the image into the output format.
/// Border pixels are index zero.
pub fn build_output(
    source: &PackedBitmap,
    meta: &SourceImageMeta,
    options: &Options,
) -> Result<Output, Error> {
    build(source, meta, options, 0, |value| value)
}

/// Build a mask with all bits set where the image has the index `index`, and clear elsewhere.
/// Border pixels count as index zero.
pub fn build_mask(
    source: &PackedBitmap,
    meta: &SourceImageMeta,
    options: &Options,
    index: u32,
) -> Result<Output, Error> {
    let selected = |value: u32| if value == index { u32::MAX } else { 0 };
    let mut output = build(source, meta, options, selected(0), selected)?;
    if options.invert {
        for y in 0..output.bitmap.height() {
            if let Some(row) = output.bitmap.row_mut(y) {
                row.iter_mut().for_each(|b| *b = !*b);
            }
        }
    }
    Ok(output)
}

/// Top left corners of the source regions, in output order, and the size of each region.
fn regions(
    meta: &SourceImageMeta,
    options: &Options,
) -> Result<(Vec<(u32, u32)>, TileSize), Error> {
    let (tile_width, tile_height) = match options.tile_size() {
        Some(size) => size,
        None => return Ok((vec![(0, 0)], (meta.width, meta.height))),
    };
    let columns = meta.width / tile_width;
    let rows = meta.height / tile_height;
    if columns == 0 || rows == 0 {
        return Err(Error::TooSmallForTiles {
            width: meta.width,
            height: meta.height,
            tile_width,
            tile_height,
        });
    }
    let origins = (0..rows)
        .cartesian_product(0..columns)
        .map(|(row, column)| (column * tile_width, row * tile_height))
        .collect();
    Ok((origins, (tile_width, tile_height)))
}

fn build(
    source: &PackedBitmap,
    meta: &SourceImageMeta,
    options: &Options,
    border: u32,
    sample: impl Fn(u32) -> u32,
) -> Result<Output, Error> {
    let (origins, (region_width, region_height)) = regions(meta, options)?;
    let tile_count = origins.len() as u32;
    let shift = options.shift;
    let mut bitmap = PackedBitmap::new(
        options.format,
        region_width + shift,
        region_height * tile_count,
    );
    log::debug!(
        "{} regions of {}x{} from {}x{}, shift {}",
        tile_count,
        region_width,
        region_height,
        meta.width,
        meta.height,
        shift
    );

    let source_columns = shift..shift + region_width;
    for y in 0..bitmap.height() {
        // Rows added by rounding up the height have no source row.
        let source_row = origins
            .get((y / region_height) as usize)
            .map(|&(x, top)| (x, top + y % region_height));
        for x in 0..bitmap.stride() {
            let value = match source_row {
                Some((left, sy)) if source_columns.contains(&x) => {
                    sample(source.peek(left + x - shift, sy))
                }
                _ => border,
            };
            bitmap.plot(x, y, value);
        }
    }
    bitmap.trace_rows();

    let tile_height = if options.tile_size().is_some() {
        region_height
    } else {
        bitmap.height()
    };
    Ok(Output {
        bitmap,
        tile_count,
        tile_height,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::image_io::SourceFormat;

    /// An 8-bit indexed source image.
    fn source(
        width: u32,
        height: u32,
        pixel: impl Fn(u32, u32) -> u32,
    ) -> (PackedBitmap, SourceImageMeta) {
        let mut bitmap = PackedBitmap::new(PixelFormat::Chunky8, width, height);
        for y in 0..height {
            for x in 0..width {
                bitmap.plot(x, y, pixel(x, y));
            }
        }
        let meta = SourceImageMeta {
            format: SourceFormat::Png,
            width,
            height,
            indexed: true,
            max_index: 255,
            palette: Vec::new(),
        };
        (bitmap, meta)
    }

    fn checkerboard() -> (PackedBitmap, SourceImageMeta) {
        source(2, 2, |x, y| (x + y) % 2)
    }

    #[test]
    fn whole_image_with_shift() {
        let (bitmap, meta) = source(3, 2, |x, y| x + 3 * y + 1);
        let mut options = Options::new(PixelFormat::Packed4);
        options.shift = 2;
        let output = build_output(&bitmap, &meta, &options).unwrap();
        assert_eq!(1, output.tile_count);
        assert_eq!(2, output.tile_height);
        assert_eq!(5, output.bitmap.width());
        assert_eq!(&[0x00, 0x12, 0x30], output.bitmap.row(0).unwrap());
        assert_eq!(&[0x00, 0x45, 0x60], output.bitmap.row(1).unwrap());
    }

    #[test]
    fn values_truncated_to_output_format() {
        let (bitmap, meta) = source(8, 1, |x, _| x);
        let options = Options::new(PixelFormat::Packed1);
        let output = build_output(&bitmap, &meta, &options).unwrap();
        assert_eq!(&[0b0101_0101], output.bitmap.data());
    }

    #[test]
    fn tiles_in_row_major_order() {
        // 2x2 tiles of 2x3 pixels, plus a column that doesn't fill a tile.
        let (bitmap, meta) = source(5, 6, |x, y| 1 + (x / 2).min(1) + 2 * (y / 3));
        let mut options = Options::new(PixelFormat::Chunky8);
        options.tile = Some((2, 3));
        let output = build_output(&bitmap, &meta, &options).unwrap();
        assert_eq!(4, output.tile_count);
        assert_eq!(3, output.tile_height);
        assert_eq!((2, 12), (output.bitmap.width(), output.bitmap.height()));
        for y in 0..12 {
            let tag = (y / 3 + 1) as u8;
            assert_eq!(&[tag, tag], output.bitmap.row(y).unwrap(), "row {}", y);
        }
    }

    #[test]
    fn tile_count_rounds_down() {
        let (bitmap, meta) = source(17, 9, |_, _| 1);
        let mut options = Options::new(PixelFormat::Chunky8);
        options.tile = Some((8, 4));
        let output = build_output(&bitmap, &meta, &options).unwrap();
        assert_eq!(4, output.tile_count);
        assert_eq!(16, output.bitmap.height());
    }

    #[test]
    fn zero_tile_size_converts_whole_image() {
        let (bitmap, meta) = source(3, 5, |_, _| 1);
        let mut options = Options::new(PixelFormat::Chunky8);
        options.tile = Some((0, 8));
        let output = build_output(&bitmap, &meta, &options).unwrap();
        assert_eq!(1, output.tile_count);
        assert_eq!((3, 5), (output.bitmap.width(), output.bitmap.height()));
    }

    #[test]
    fn image_smaller_than_tile_fails() {
        let (bitmap, meta) = source(7, 16, |_, _| 1);
        let mut options = Options::new(PixelFormat::Packed1);
        options.tile = Some((8, 8));
        assert!(matches!(
            build_output(&bitmap, &meta, &options),
            Err(Error::TooSmallForTiles {
                width: 7,
                height: 16,
                tile_width: 8,
                tile_height: 8
            })
        ));
    }

    #[test]
    fn mask_selects_index() {
        let (bitmap, meta) = checkerboard();
        let options = Options::new(PixelFormat::Packed1);
        let output = build_mask(&bitmap, &meta, &options, 1).unwrap();
        assert_eq!(&[0b0100_0000, 0b1000_0000], output.bitmap.data());
    }

    #[test]
    fn mask_border_is_clear_for_nonzero_index() {
        let (bitmap, meta) = checkerboard();
        let mut options = Options::new(PixelFormat::Packed1);
        options.shift = 1;
        let output = build_mask(&bitmap, &meta, &options, 1).unwrap();
        assert_eq!(&[0b0010_0000, 0b0100_0000], output.bitmap.data());
    }

    #[test]
    fn mask_border_is_set_for_index_zero() {
        let (bitmap, meta) = checkerboard();
        let mut options = Options::new(PixelFormat::Packed1);
        options.shift = 1;
        let output = build_mask(&bitmap, &meta, &options, 0).unwrap();
        assert_eq!(&[0b1101_1111, 0b1011_1111], output.bitmap.data());
    }

    #[test]
    fn inverted_mask_complements_every_byte() {
        let (bitmap, meta) = checkerboard();
        let mut options = Options::new(PixelFormat::Packed1);
        options.invert = true;
        let output = build_mask(&bitmap, &meta, &options, 1).unwrap();
        assert_eq!(&[0b1011_1111, 0b0111_1111], output.bitmap.data());
    }

    #[test]
    fn mask_fills_rounded_rows_with_border() {
        let (bitmap, meta) = source(2, 2, |_, _| 0);
        let options = Options::new(PixelFormat::GameBoy);
        let output = build_mask(&bitmap, &meta, &options, 0).unwrap();
        assert_eq!((8, 8), (output.bitmap.width(), output.bitmap.height()));
        assert!(output.bitmap.data().iter().all(|&b| b == 0xff));
    }

    #[test]
    fn sanitize_pattern_format() {
        let mut options = Options::new(PixelFormat::Nes);
        options.shift = 3;
        options.double_width = true;
        assert_eq!(
            vec![
                Downgrade::Shift(PixelFormat::Nes),
                Downgrade::DoubleWidth(PixelFormat::Nes)
            ],
            options.sanitize()
        );
        assert_eq!(0, options.shift);
        assert!(!options.double_width);
    }

    #[test]
    fn sanitize_keeps_supported_options() {
        let mut options = Options::new(PixelFormat::AtariStLow);
        options.shift = 3;
        options.double_width = true;
        assert!(options.sanitize().is_empty());
        assert_eq!(3, options.shift);
        assert!(options.double_width);
    }
}
