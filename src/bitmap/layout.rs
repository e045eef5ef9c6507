//! Addressing strategies for each pixel format.
//!
//! A layout knows how to size a buffer for a given image size and where the bits of
//! each pixel live in it. The bitmap picks its layout once, when it is created.

use crate::format::PixelFormat;

/// Buffer geometry computed by a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// Pixels per row, after any rounding.
    pub width: u32,
    /// Rows, after any rounding.
    pub height: u32,
    /// Bytes per row.
    pub pitch: u32,
    /// Pixels covered by one pitch.
    pub stride: u32,
}

impl Geometry {
    fn byte_offset(&self, x_bytes: u32, y: u32) -> usize {
        x_bytes as usize + y as usize * self.pitch as usize
    }
}

pub trait Layout: Sync {
    fn geometry(&self, width: u32, height: u32) -> Geometry;

    /// Store `value`, already masked to the pixel's bit width.
    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32);

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32;
}

fn round_up(value: u32, multiple: u32) -> u32 {
    (value + multiple - 1) / multiple * multiple
}

fn blocks(width: u32, block_width: u32) -> u32 {
    (width + block_width - 1) / block_width
}

fn set_bits(byte: &mut u8, mask: u8, on: bool) {
    if on {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
}

/// Scatter the bits of `value` into separate plane bytes.
/// Bit `n` of the value goes to `data[offsets[n]]`.
fn write_planes(data: &mut [u8], offsets: &[usize], mask: u8, value: u32) {
    for (plane, &offset) in offsets.iter().enumerate() {
        set_bits(&mut data[offset], mask, value & (1 << plane) != 0);
    }
}

fn read_planes(data: &[u8], offsets: &[usize], mask: u8) -> u32 {
    offsets
        .iter()
        .enumerate()
        .filter(|&(_, &offset)| data[offset] & mask != 0)
        .map(|(plane, _)| 1 << plane)
        .sum()
}

/// Several pixels per byte, leftmost pixel in the most significant bits.
pub struct Linear {
    bits: u32,
}

impl Linear {
    fn pixels_per_byte(&self) -> u32 {
        8 / self.bits
    }

    fn locate(&self, geometry: &Geometry, x: u32, y: u32) -> (usize, u32) {
        let per_byte = self.pixels_per_byte();
        let shift = (per_byte - 1 - x % per_byte) * self.bits;
        (geometry.byte_offset(x / per_byte, y), shift)
    }
}

impl Layout for Linear {
    fn geometry(&self, width: u32, height: u32) -> Geometry {
        let per_byte = self.pixels_per_byte();
        let pitch = blocks(width, per_byte);
        Geometry {
            width,
            height,
            pitch,
            stride: pitch * per_byte,
        }
    }

    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32) {
        let (offset, shift) = self.locate(geometry, x, y);
        let mask = ((1u32 << self.bits) - 1) as u8;
        data[offset] = (data[offset] & !(mask << shift)) | ((value as u8 & mask) << shift);
    }

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32 {
        let (offset, shift) = self.locate(geometry, x, y);
        let mask = ((1u32 << self.bits) - 1) as u8;
        ((data[offset] >> shift) & mask) as u32
    }
}

/// One little endian sample of `bytes` bytes per pixel.
pub struct Chunky {
    bytes: u32,
}

impl Layout for Chunky {
    fn geometry(&self, width: u32, height: u32) -> Geometry {
        Geometry {
            width,
            height,
            pitch: width * self.bytes,
            stride: width,
        }
    }

    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32) {
        let offset = geometry.byte_offset(x * self.bytes, y);
        let bytes = value.to_le_bytes();
        data[offset..offset + self.bytes as usize].copy_from_slice(&bytes[..self.bytes as usize]);
    }

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32 {
        let offset = geometry.byte_offset(x * self.bytes, y);
        data[offset..offset + self.bytes as usize]
            .iter()
            .rev()
            .fold(0, |acc, &b| (acc << 8) | b as u32)
    }
}

/// Atari ST bit planes. Each 16 pixel block holds one big endian word per plane,
/// pixel 0 in bit 15.
pub struct AtariPlanar {
    planes: u32,
}

impl AtariPlanar {
    fn locate(&self, geometry: &Geometry, x: u32, y: u32) -> ([usize; 4], u8) {
        let block_offset = geometry.byte_offset((x / 16) * 2 * self.planes, y);
        let half = ((x & 15) >> 3) as usize;
        let mut offsets = [0usize; 4];
        for (plane, offset) in offsets.iter_mut().enumerate() {
            *offset = block_offset + plane * 2 + half;
        }
        (offsets, 0x80 >> (x & 7))
    }
}

impl Layout for AtariPlanar {
    fn geometry(&self, width: u32, height: u32) -> Geometry {
        let blocks = blocks(width, 16);
        Geometry {
            width,
            height,
            pitch: blocks * 2 * self.planes,
            stride: blocks * 16,
        }
    }

    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32) {
        let (offsets, mask) = self.locate(geometry, x, y);
        write_planes(data, &offsets[..self.planes as usize], mask, value);
    }

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32 {
        let (offsets, mask) = self.locate(geometry, x, y);
        read_planes(data, &offsets[..self.planes as usize], mask)
    }
}

/// Amstrad CPC mode 0. Two pixels per byte, with the bits of both pixels interleaved.
pub struct CpcMode0;

impl CpcMode0 {
    /// Bit position of value bits 0..3, for the left and the right pixel.
    const BITS: [[u8; 4]; 2] = [[7, 3, 5, 1], [6, 2, 4, 0]];
}

impl Layout for CpcMode0 {
    fn geometry(&self, width: u32, height: u32) -> Geometry {
        let pitch = blocks(width, 2);
        Geometry {
            width,
            height,
            pitch,
            stride: pitch * 2,
        }
    }

    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32) {
        let byte = &mut data[geometry.byte_offset(x / 2, y)];
        for (bit, &position) in Self::BITS[(x & 1) as usize].iter().enumerate() {
            set_bits(byte, 1 << position, value & (1 << bit) != 0);
        }
    }

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32 {
        let byte = data[geometry.byte_offset(x / 2, y)];
        Self::BITS[(x & 1) as usize]
            .iter()
            .enumerate()
            .filter(|&(_, &position)| byte & (1 << position) != 0)
            .map(|(bit, _)| 1 << bit)
            .sum()
    }
}

/// Amstrad CPC mode 1. Four pixels per byte, bit 0 of each in the high nibble and
/// bit 1 in the low nibble.
pub struct CpcMode1;

impl Layout for CpcMode1 {
    fn geometry(&self, width: u32, height: u32) -> Geometry {
        let pitch = blocks(width, 4);
        Geometry {
            width,
            height,
            pitch,
            stride: pitch * 4,
        }
    }

    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32) {
        let byte = &mut data[geometry.byte_offset(x / 4, y)];
        set_bits(byte, 0x80 >> (x & 3), value & 1 != 0);
        set_bits(byte, 0x08 >> (x & 3), value & 2 != 0);
    }

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32 {
        let byte = data[geometry.byte_offset(x / 4, y)];
        let low = (byte & (0x80 >> (x & 3)) != 0) as u32;
        let high = (byte & (0x08 >> (x & 3)) != 0) as u32;
        low | high << 1
    }
}

/// One byte per plane for each 8 pixel span of a row (Game Boy, Master System).
/// Width and height are rounded up to whole 8 pixel tiles.
pub struct RowPlanar {
    planes: u32,
}

impl RowPlanar {
    fn locate(&self, geometry: &Geometry, x: u32, y: u32) -> ([usize; 4], u8) {
        let block_offset = geometry.byte_offset((x / 8) * self.planes, y);
        let mut offsets = [0usize; 4];
        for (plane, offset) in offsets.iter_mut().enumerate() {
            *offset = block_offset + plane;
        }
        (offsets, 0x80 >> (x & 7))
    }
}

impl Layout for RowPlanar {
    fn geometry(&self, width: u32, height: u32) -> Geometry {
        let blocks = blocks(width, 8);
        Geometry {
            width: blocks * 8,
            height: round_up(height, 8),
            pitch: blocks * self.planes,
            stride: blocks * 8,
        }
    }

    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32) {
        let (offsets, mask) = self.locate(geometry, x, y);
        write_planes(data, &offsets[..self.planes as usize], mask, value);
    }

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32 {
        let (offsets, mask) = self.locate(geometry, x, y);
        read_planes(data, &offsets[..self.planes as usize], mask)
    }
}

/// NES pattern tables. Tiles of 16 bytes in row-major order: 8 rows of plane 0,
/// then 8 rows of plane 1. Width and height are rounded up to whole tiles.
pub struct NesTiles;

impl NesTiles {
    fn locate(&self, geometry: &Geometry, x: u32, y: u32) -> ([usize; 2], u8) {
        let tile = (x / 8 + (y / 8) * (geometry.width / 8)) as usize;
        let row = (y & 7) as usize;
        let base = tile * 16 + row;
        ([base, base + 8], 0x80 >> (x & 7))
    }
}

impl Layout for NesTiles {
    fn geometry(&self, width: u32, height: u32) -> Geometry {
        let width = round_up(width, 8);
        Geometry {
            width,
            height: round_up(height, 8),
            // Each tile is 16 bytes over 8 rows, i.e. 2 bytes per row per tile.
            pitch: width / 4,
            stride: width,
        }
    }

    fn plot(&self, data: &mut [u8], geometry: &Geometry, x: u32, y: u32, value: u32) {
        let (offsets, mask) = self.locate(geometry, x, y);
        write_planes(data, &offsets, mask, value);
    }

    fn peek(&self, data: &[u8], geometry: &Geometry, x: u32, y: u32) -> u32 {
        let (offsets, mask) = self.locate(geometry, x, y);
        read_planes(data, &offsets, mask)
    }
}

static LINEAR_1: Linear = Linear { bits: 1 };
static LINEAR_2: Linear = Linear { bits: 2 };
static LINEAR_4: Linear = Linear { bits: 4 };
static CHUNKY_8: Chunky = Chunky { bytes: 1 };
static CHUNKY_16: Chunky = Chunky { bytes: 2 };
static CHUNKY_32: Chunky = Chunky { bytes: 4 };
static ATARI_ST_LOW: AtariPlanar = AtariPlanar { planes: 4 };
static ATARI_ST_MEDIUM: AtariPlanar = AtariPlanar { planes: 2 };
static ATARI_ST_HIGH: AtariPlanar = AtariPlanar { planes: 1 };
static GAME_BOY: RowPlanar = RowPlanar { planes: 2 };
static MASTER_SYSTEM: RowPlanar = RowPlanar { planes: 4 };

/// Get the addressing strategy for a format.
pub fn layout_for(format: PixelFormat) -> &'static dyn Layout {
    match format {
        PixelFormat::Packed1 | PixelFormat::AmstradCpc2 => &LINEAR_1,
        PixelFormat::Packed2 | PixelFormat::IbmCga => &LINEAR_2,
        PixelFormat::Packed4 => &LINEAR_4,
        PixelFormat::Chunky8 => &CHUNKY_8,
        PixelFormat::Chunky16 => &CHUNKY_16,
        PixelFormat::Chunky32 => &CHUNKY_32,
        PixelFormat::AtariStLow => &ATARI_ST_LOW,
        PixelFormat::AtariStMedium => &ATARI_ST_MEDIUM,
        PixelFormat::AtariStHigh => &ATARI_ST_HIGH,
        PixelFormat::AmstradCpc0 => &CpcMode0,
        PixelFormat::AmstradCpc1 => &CpcMode1,
        PixelFormat::GameBoy => &GAME_BOY,
        PixelFormat::MasterSystem => &MASTER_SYSTEM,
        PixelFormat::Nes => &NesTiles,
    }
}
