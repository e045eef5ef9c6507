//! Catalog of the supported hardware pixel formats.

use std::fmt;

/// A hardware pixel encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8 pixels per byte. MSB = leftmost pixel.
    Packed1,
    /// 4 pixels per byte in adjacent bit pairs. MSB = pixel 0.
    Packed2,
    /// 2 pixels per byte. Bits 7:4 = left pixel, bits 3:0 = right pixel.
    Packed4,
    /// One byte per pixel.
    Chunky8,
    /// Two bytes per pixel, little endian.
    Chunky16,
    /// Four bytes per pixel, little endian.
    Chunky32,
    /// Atari ST low resolution. 16 pixels x 4 big endian plane words.
    AtariStLow,
    /// Atari ST medium resolution. 16 pixels x 2 big endian plane words.
    AtariStMedium,
    /// Atari ST high resolution. 16 pixels x 1 big endian plane word.
    AtariStHigh,
    /// Amstrad CPC mode 0. 2 pixels per byte with interleaved bits.
    AmstradCpc0,
    /// Amstrad CPC mode 1. 4 pixels per byte, low bits in the high nibble.
    AmstradCpc1,
    /// Amstrad CPC mode 2. 8 pixels per byte.
    AmstradCpc2,
    /// IBM CGA BIOS mode 4/5. 4 pixels per byte.
    IbmCga,
    /// Sega Master System / Game Gear. 4 plane bytes per 8 pixel row.
    MasterSystem,
    /// Game Boy. 2 plane bytes per 8 pixel row.
    GameBoy,
    /// NES / Famicom. 16 byte tiles, plane 0 rows followed by plane 1 rows.
    Nes,
}

/// Names accepted on the command line, lower case.
const ALIASES: [(&str, PixelFormat); 17] = [
    ("1bpp", PixelFormat::Packed1),
    ("2bpp", PixelFormat::Packed2),
    ("4bpp", PixelFormat::Packed4),
    ("8bpp", PixelFormat::Chunky8),
    ("16bpp", PixelFormat::Chunky16),
    ("32bpp", PixelFormat::Chunky32),
    ("cga", PixelFormat::IbmCga),
    ("cpc0", PixelFormat::AmstradCpc0),
    ("cpc1", PixelFormat::AmstradCpc1),
    ("cpc2", PixelFormat::AmstradCpc2),
    ("gb", PixelFormat::GameBoy),
    ("nes", PixelFormat::Nes),
    ("sms", PixelFormat::MasterSystem),
    ("sega", PixelFormat::MasterSystem),
    ("st0", PixelFormat::AtariStLow),
    ("st1", PixelFormat::AtariStMedium),
    ("st2", PixelFormat::AtariStHigh),
];

impl PixelFormat {
    pub const ALL: [PixelFormat; 16] = [
        PixelFormat::Packed1,
        PixelFormat::Packed2,
        PixelFormat::Packed4,
        PixelFormat::Chunky8,
        PixelFormat::Chunky16,
        PixelFormat::Chunky32,
        PixelFormat::AtariStLow,
        PixelFormat::AtariStMedium,
        PixelFormat::AtariStHigh,
        PixelFormat::AmstradCpc0,
        PixelFormat::AmstradCpc1,
        PixelFormat::AmstradCpc2,
        PixelFormat::IbmCga,
        PixelFormat::MasterSystem,
        PixelFormat::GameBoy,
        PixelFormat::Nes,
    ];

    /// Look up a format by one of its names, ignoring case.
    /// Returns None if the name is not recognized.
    pub fn decode(name: &str) -> Option<PixelFormat> {
        ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|&(_, format)| format)
    }

    /// The primary command line name of the format.
    pub fn name(self) -> &'static str {
        ALIASES
            .iter()
            .find(|&&(_, format)| format == self)
            .map(|&(alias, _)| alias)
            .unwrap_or_default()
    }

    /// Human readable description, for progress messages and help text.
    pub fn description(self) -> &'static str {
        match self {
            PixelFormat::Packed1 => "8 x 1-bit pixels per byte (ZX Spectrum, Hercules, etc.)",
            PixelFormat::Packed2 => "4 x 2-bit pixels per byte",
            PixelFormat::Packed4 => "2 x 4-bit pixels per byte",
            PixelFormat::Chunky8 => "1 byte per pixel",
            PixelFormat::Chunky16 => "2 bytes per pixel",
            PixelFormat::Chunky32 => "4 bytes per pixel",
            PixelFormat::AtariStLow => "Atari ST mode 0 (Low)",
            PixelFormat::AtariStMedium => "Atari ST mode 1 (Medium)",
            PixelFormat::AtariStHigh => "Atari ST mode 2 (High)",
            PixelFormat::AmstradCpc0 => "Amstrad CPC mode 0 (160x200,16)",
            PixelFormat::AmstradCpc1 => "Amstrad CPC mode 1 (320x200,4)",
            PixelFormat::AmstradCpc2 => "Amstrad CPC mode 2 (640x200,2)",
            PixelFormat::IbmCga => "IBM CGA mode 4/5 (320x200,4)",
            PixelFormat::MasterSystem => "Master System / Game Gear",
            PixelFormat::GameBoy => "Game Boy",
            PixelFormat::Nes => "NES / Famicom",
        }
    }

    /// Number of bits stored for each pixel.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Packed1 | PixelFormat::AmstradCpc2 | PixelFormat::AtariStHigh => 1,
            PixelFormat::Packed2
            | PixelFormat::IbmCga
            | PixelFormat::AmstradCpc1
            | PixelFormat::AtariStMedium
            | PixelFormat::GameBoy
            | PixelFormat::Nes => 2,
            PixelFormat::Packed4
            | PixelFormat::AmstradCpc0
            | PixelFormat::AtariStLow
            | PixelFormat::MasterSystem => 4,
            PixelFormat::Chunky8 => 8,
            PixelFormat::Chunky16 => 16,
            PixelFormat::Chunky32 => 32,
        }
    }

    /// Mask applied to values stored in a pixel.
    pub fn value_mask(self) -> u32 {
        match self.bits_per_pixel() {
            32 => u32::MAX,
            bits => (1 << bits) - 1,
        }
    }

    /// Number of palette indices the format can represent.
    /// Returns 0 for direct colour formats, where no index limit applies.
    pub fn max_index(self) -> u32 {
        match self {
            PixelFormat::Chunky16 | PixelFormat::Chunky32 => 0,
            _ => 1 << self.bits_per_pixel(),
        }
    }

    /// True for the 8x8 pattern based formats.
    /// These round their geometry up to 8 pixels and can't be shifted or scaled.
    pub fn is_pattern_based(self) -> bool {
        matches!(
            self,
            PixelFormat::GameBoy | PixelFormat::MasterSystem | PixelFormat::Nes
        )
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
