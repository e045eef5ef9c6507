//! Header written before the pixel data of an output file.
//!
//! The header is described by a string of single character codes, read left to right:
//!
//! | Code | Effect                                          |
//! |------|-------------------------------------------------|
//! | `1`  | Following fields are 1 byte                     |
//! | `2`  | Following fields are 2 bytes                    |
//! | `L`  | 2 byte fields are little endian                 |
//! | `B`  | 2 byte fields are big endian                    |
//! | `z`  | Zero                                            |
//! | `w`  | Bitmap width in pixels                          |
//! | `h`  | Tile height (bitmap height if not tiled)        |
//! | `p`  | Pitch, in units of the field width              |
//! | `n`  | Number of tiles                                 |
//!
//! Fields start out 1 byte wide and big endian. Other characters are ignored.

use crate::bitmap::PackedBitmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

struct Writer {
    field_bytes: u32,
    byte_order: ByteOrder,
    bytes: Vec<u8>,
}

impl Writer {
    fn emit(&mut self, value: u32) {
        match (self.field_bytes, self.byte_order) {
            (1, _) => self.bytes.push(value as u8),
            (_, ByteOrder::Big) => self.bytes.extend_from_slice(&(value as u16).to_be_bytes()),
            (_, ByteOrder::Little) => self.bytes.extend_from_slice(&(value as u16).to_le_bytes()),
        }
    }
}

/// Build the header described by `codes`.
pub fn encode(codes: &str, bitmap: &PackedBitmap, tile_count: u32, tile_height: u32) -> Vec<u8> {
    let mut writer = Writer {
        field_bytes: 1,
        byte_order: ByteOrder::Big,
        bytes: Vec::new(),
    };
    for code in codes.chars() {
        match code {
            '1' => writer.field_bytes = 1,
            '2' => writer.field_bytes = 2,
            'L' => writer.byte_order = ByteOrder::Little,
            'B' => writer.byte_order = ByteOrder::Big,
            'z' => writer.emit(0),
            'w' => writer.emit(bitmap.width()),
            'h' => writer.emit(tile_height),
            'p' => writer.emit(bitmap.pitch() / writer.field_bytes),
            'n' => writer.emit(tile_count),
            _ => log::debug!("ignoring header code {:?}", code),
        }
    }
    writer.bytes
}
