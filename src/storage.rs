//! File I/O

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
};

use crate::{bitmap::PackedBitmap, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Write the buffer of a bitmap, row by row.
pub fn write_bitmap(bitmap: &PackedBitmap, writer: &mut impl Write) -> Result<(), Error> {
    for row in bitmap.rows() {
        writer.write_all(row)?;
    }
    Ok(())
}

fn open(filename: &Path, mode: WriteMode) -> Result<File, Error> {
    let file = match mode {
        WriteMode::Truncate => File::create(filename)?,
        WriteMode::Append => OpenOptions::new()
            .create(true)
            .append(true)
            .open(filename)?,
    };
    Ok(file)
}

/// Write a header followed by the bitmap.
/// Returns the size of the file afterwards.
pub fn save(
    filename: &Path,
    mode: WriteMode,
    header: &[u8],
    bitmap: &PackedBitmap,
) -> Result<u64, Error> {
    let mut writer = BufWriter::new(open(filename, mode)?);
    writer.write_all(header)?;
    write_bitmap(bitmap, &mut writer)?;
    writer.flush()?;
    Ok(writer.get_ref().metadata()?.len())
}
