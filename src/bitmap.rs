//! Packed bitmaps in hardware pixel formats.

mod layout;

use crate::format::PixelFormat;
use layout::{layout_for, Geometry, Layout};

/// A bitmap whose buffer holds the exact bytes of a hardware pixel format.
pub struct PackedBitmap {
    format: PixelFormat,
    layout: &'static dyn Layout,
    geometry: Geometry,
    /// Size: pitch x height bytes.
    data: Vec<u8>,
}

impl PackedBitmap {
    /// Create a zeroed bitmap.
    /// Some formats round the size up, so read the actual size back with
    /// [`width`](Self::width) and [`height`](Self::height).
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        let layout = layout_for(format);
        let geometry = layout.geometry(width, height);
        log::debug!(
            "create {} bitmap {}x{} as {}x{}, pitch {}, stride {}",
            format.name(),
            width,
            height,
            geometry.width,
            geometry.height,
            geometry.pitch,
            geometry.stride
        );
        Self {
            format,
            layout,
            geometry,
            data: vec![0u8; geometry.pitch as usize * geometry.height as usize],
        }
    }

    /// Replace the contents with a new zeroed buffer, possibly in another format.
    pub fn create(&mut self, format: PixelFormat, width: u32, height: u32) {
        *self = Self::new(format, width, height);
    }

    /// Release the buffer. The bitmap is left with zero size.
    pub fn destroy(&mut self) {
        self.geometry = Geometry::default();
        self.data = Vec::new();
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    /// Bytes per row.
    pub fn pitch(&self) -> u32 {
        self.geometry.pitch
    }

    /// Pixels per row that the buffer has room for, including padding.
    pub fn stride(&self) -> u32 {
        self.geometry.stride
    }

    /// The raw buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Set a pixel. The value is truncated to the bit width of the format.
    /// `x` must be below the stride and `y` below the height.
    pub fn plot(&mut self, x: u32, y: u32, value: u32) {
        debug_assert!(x < self.geometry.stride, "x {} out of range", x);
        debug_assert!(y < self.geometry.height, "y {} out of range", y);
        let value = value & self.format.value_mask();
        self.layout
            .plot(&mut self.data, &self.geometry, x, y, value);
    }

    /// Get a pixel.
    /// `x` must be below the stride and `y` below the height.
    pub fn peek(&self, x: u32, y: u32) -> u32 {
        debug_assert!(x < self.geometry.stride, "x {} out of range", x);
        debug_assert!(y < self.geometry.height, "y {} out of range", y);
        self.layout.peek(&self.data, &self.geometry, x, y)
    }

    /// Fill every byte of the buffer with `value`.
    pub fn clear(&mut self, value: u8) {
        self.data.iter_mut().for_each(|b| *b = value);
    }

    /// Get the bytes of a row, or None if the row is outside the bitmap.
    pub fn row(&self, row: u32) -> Option<&[u8]> {
        let range = self.row_range(row)?;
        Some(&self.data[range])
    }

    pub fn row_mut(&mut self, row: u32) -> Option<&mut [u8]> {
        let range = self.row_range(row)?;
        Some(&mut self.data[range])
    }

    /// Iterate over the rows of the buffer, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.geometry.height).filter_map(move |row| self.row(row))
    }

    /// Print every row as hex at trace level.
    pub fn trace_rows(&self) {
        if log::log_enabled!(log::Level::Trace) {
            for (y, row) in self.rows().enumerate() {
                log::trace!("{:4}: {}", y, hex::encode_upper(row));
            }
        }
    }

    fn row_range(&self, row: u32) -> Option<std::ops::Range<usize>> {
        if row >= self.geometry.height || self.data.is_empty() {
            return None;
        }
        let pitch = self.geometry.pitch as usize;
        let start = row as usize * pitch;
        Some(start..start + pitch)
    }
}

#[cfg(test)]
mod test {
    use super::PackedBitmap;
    use crate::format::PixelFormat;

    /// A size that is not a multiple of any block size.
    const WIDTH: u32 = 37;
    const HEIGHT: u32 = 11;

    #[test]
    fn plot_then_peek_returns_masked_value() {
        for format in PixelFormat::ALL.iter().copied() {
            let mut bitmap = PackedBitmap::new(format, WIDTH, HEIGHT);
            let mask = format.value_mask();
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    let value = x.wrapping_mul(0x9e37_79b9) ^ y.wrapping_mul(0x85eb_ca6b);
                    bitmap.plot(x, y, value);
                    assert_eq!(
                        value & mask,
                        bitmap.peek(x, y),
                        "{:?} at ({}, {})",
                        format,
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn plot_leaves_neighbours_untouched() {
        for format in PixelFormat::ALL.iter().copied() {
            let mask = format.value_mask();
            for x in 0..20 {
                let mut bitmap = PackedBitmap::new(format, 24, 9);
                bitmap.clear(0xff);
                bitmap.plot(x, 4, 0);
                for y in 0..9 {
                    for nx in 0..24 {
                        let expected = if (nx, y) == (x, 4) { 0 } else { mask };
                        assert_eq!(
                            expected,
                            bitmap.peek(nx, y),
                            "{:?} plotting ({}, 4), checking ({}, {})",
                            format,
                            x,
                            nx,
                            y
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn cleared_bitmap_peeks_zero() {
        for format in PixelFormat::ALL.iter().copied() {
            let mut bitmap = PackedBitmap::new(format, WIDTH, HEIGHT);
            bitmap.clear(0xaa);
            bitmap.clear(0);
            for y in 0..bitmap.height() {
                for x in 0..bitmap.width() {
                    assert_eq!(0, bitmap.peek(x, y));
                }
            }
        }
    }

    #[test]
    fn buffer_size_is_pitch_times_height() {
        for format in PixelFormat::ALL.iter().copied() {
            let bitmap = PackedBitmap::new(format, WIDTH, HEIGHT);
            assert_eq!(
                (bitmap.pitch() * bitmap.height()) as usize,
                bitmap.data().len()
            );
            assert!(bitmap.stride() >= WIDTH);
        }
    }

    #[test]
    fn pattern_formats_round_to_8() {
        for format in PixelFormat::ALL.iter().copied() {
            if !format.is_pattern_based() {
                continue;
            }
            let bitmap = PackedBitmap::new(format, 13, 3);
            assert_eq!(0, bitmap.height() % 8);
            assert_eq!(0, bitmap.width() % 8);
            assert!(bitmap.height() >= 3);
            assert!(bitmap.width() >= 13);
        }
        let nes = PackedBitmap::new(PixelFormat::Nes, 13, 3);
        assert_eq!((16, 8), (nes.width(), nes.height()));
    }

    #[test]
    fn geometry() {
        let expect = |format, width, height, pitch, stride| {
            let bitmap = PackedBitmap::new(format, width, 5);
            assert_eq!(
                (width, height, pitch, stride),
                (bitmap.width(), bitmap.height(), bitmap.pitch(), bitmap.stride()),
                "{:?}",
                format
            );
        };
        expect(PixelFormat::Packed1, 9, 5, 2, 16);
        expect(PixelFormat::Packed2, 9, 5, 3, 12);
        expect(PixelFormat::Packed4, 9, 5, 5, 10);
        expect(PixelFormat::Chunky8, 9, 5, 9, 9);
        expect(PixelFormat::Chunky16, 9, 5, 18, 9);
        expect(PixelFormat::Chunky32, 9, 5, 36, 9);
        expect(PixelFormat::AtariStLow, 17, 5, 16, 32);
        expect(PixelFormat::AtariStMedium, 17, 5, 8, 32);
        expect(PixelFormat::AtariStHigh, 17, 5, 4, 32);
        expect(PixelFormat::AmstradCpc0, 9, 5, 5, 10);
        expect(PixelFormat::AmstradCpc1, 9, 5, 3, 12);
        expect(PixelFormat::AmstradCpc2, 9, 5, 2, 16);
        expect(PixelFormat::IbmCga, 9, 5, 3, 12);
        expect(PixelFormat::GameBoy, 16, 8, 4, 16);
        expect(PixelFormat::MasterSystem, 16, 8, 8, 16);
    }

    #[test]
    fn packed_1_msb_is_leftmost() {
        let mut bitmap = PackedBitmap::new(PixelFormat::Packed1, 8, 1);
        bitmap.plot(0, 0, 1);
        bitmap.plot(7, 0, 1);
        assert_eq!(&[0x81], bitmap.data());
    }

    #[test]
    fn packed_2_and_4_byte_layout() {
        let mut bitmap = PackedBitmap::new(PixelFormat::IbmCga, 4, 1);
        for x in 0..4 {
            bitmap.plot(x, 0, x);
        }
        assert_eq!(&[0b00_01_10_11], bitmap.data());

        let mut bitmap = PackedBitmap::new(PixelFormat::Packed4, 2, 1);
        bitmap.plot(0, 0, 0xa);
        bitmap.plot(1, 0, 0x5);
        assert_eq!(&[0xa5], bitmap.data());
    }

    #[test]
    fn chunky_is_little_endian() {
        let mut bitmap = PackedBitmap::new(PixelFormat::Chunky16, 1, 1);
        bitmap.plot(0, 0, 0x1234);
        assert_eq!(&[0x34, 0x12], bitmap.data());
        let mut bitmap = PackedBitmap::new(PixelFormat::Chunky32, 1, 1);
        bitmap.plot(0, 0, 0x1234_5678);
        assert_eq!(&[0x78, 0x56, 0x34, 0x12], bitmap.data());
    }

    #[test]
    fn atari_st_low_plane_words() {
        let mut bitmap = PackedBitmap::new(PixelFormat::AtariStLow, 16, 1);
        // Pixel 0 gets planes 0 and 2, pixel 15 gets plane 3.
        bitmap.plot(0, 0, 0b0101);
        bitmap.plot(15, 0, 0b1000);
        assert_eq!(
            &[0x80, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x01],
            bitmap.data()
        );
    }

    #[test]
    fn amstrad_cpc_mode_0_bit_order() {
        let mut bitmap = PackedBitmap::new(PixelFormat::AmstradCpc0, 2, 1);
        bitmap.plot(0, 0, 0b0001);
        assert_eq!(&[0x80], bitmap.data());
        bitmap.plot(0, 0, 0b1000);
        assert_eq!(&[0x02], bitmap.data());
        bitmap.plot(1, 0, 0b1111);
        assert_eq!(&[0x02 | 0x55], bitmap.data());
    }

    #[test]
    fn amstrad_cpc_mode_1_nibbles() {
        let mut bitmap = PackedBitmap::new(PixelFormat::AmstradCpc1, 4, 1);
        bitmap.plot(0, 0, 1);
        bitmap.plot(3, 0, 2);
        assert_eq!(&[0x81], bitmap.data());
    }

    #[test]
    fn game_boy_row_planes() {
        let mut bitmap = PackedBitmap::new(PixelFormat::GameBoy, 8, 8);
        bitmap.plot(0, 1, 3);
        bitmap.plot(7, 1, 2);
        assert_eq!(&[0x80, 0x81], bitmap.row(1).unwrap());
    }

    #[test]
    fn master_system_row_planes() {
        let mut bitmap = PackedBitmap::new(PixelFormat::MasterSystem, 8, 8);
        bitmap.plot(1, 0, 0b1010);
        assert_eq!(&[0x00, 0x40, 0x00, 0x40], bitmap.row(0).unwrap());
    }

    #[test]
    fn nes_tiles_are_16_byte_chunks() {
        let mut bitmap = PackedBitmap::new(PixelFormat::Nes, 16, 8);
        // Second tile, row 2: plane 0 at byte 16 + 2, plane 1 at byte 16 + 8 + 2.
        bitmap.plot(8, 2, 3);
        let mut expected = [0u8; 32];
        expected[18] = 0x80;
        expected[26] = 0x80;
        assert_eq!(&expected[..], bitmap.data());
    }

    #[test]
    fn row_outside_bitmap() {
        let mut bitmap = PackedBitmap::new(PixelFormat::Packed1, 8, 2);
        assert!(bitmap.row(1).is_some());
        assert!(bitmap.row(2).is_none());
        bitmap.destroy();
        assert!(bitmap.row(0).is_none());
        assert_eq!(0, bitmap.rows().count());
    }

    #[test]
    fn create_replaces_format_and_buffer() {
        let mut bitmap = PackedBitmap::new(PixelFormat::Chunky8, 4, 4);
        bitmap.clear(0xff);
        bitmap.create(PixelFormat::Nes, 3, 3);
        assert_eq!(PixelFormat::Nes, bitmap.format());
        assert_eq!(16, bitmap.data().len());
        assert!(bitmap.data().iter().all(|&b| b == 0));
    }
}
