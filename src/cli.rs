//! Command-line interface

use imagetools::{
    error::Error,
    format::PixelFormat,
    header,
    image_io::{self, LoadRequest, TargetMode},
    report::Reporter,
    scaling,
    storage::{self, WriteMode},
    transform::{self, Options, TileSize},
};
use std::{env, ffi::OsString, path::PathBuf};
use structopt::StructOpt;

/// Options that are followed by a value.
const VALUE_OPTIONS: [&str; 4] = ["tile", "shift", "pf", "index"];
const FLAG_OPTIONS: [&str; 4] = ["append", "2x", "not", "help"];

/// Largest value accepted by `-shift` and `-index`.
const BYTE_LIMIT: u32 = 255;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "imagetools",
    about = "Convert indexed colour images to raw pixel formats for old hardware"
)]
enum Command {
    /// Export a raw image in a new pixel format
    Export(ExportArgs),
    /// Extract a bit mask from an image
    Mask(MaskArgs),
    /// List the supported pixel formats
    Formats,
}

#[derive(StructOpt, Debug)]
struct CommonArgs {
    /// An image file to read (indexed PNG)
    #[structopt(parse(from_os_str))]
    input: PathBuf,
    /// The output file
    #[structopt(parse(from_os_str))]
    output: PathBuf,
    /// Split the input image into tiles of WxH pixels, output in row-major order
    #[structopt(long, parse(try_from_str = parse_tile))]
    tile: Option<TileSize>,
    /// Shift output to the right by R pixels. Not supported by GB, NES or SEGA formats
    #[structopt(long, default_value = "0", parse(try_from_str = parse_shift))]
    shift: u32,
    /// Append to the output file, rather than overwriting it
    #[structopt(long)]
    append: bool,
    /// Double the width of the input image. Not supported by GB, NES or SEGA formats
    #[structopt(long = "2x")]
    double_width: bool,
    /// Header codes (1 2 L B z w h p n), given as -H<codes>
    #[structopt(long, default_value = "")]
    header: String,
    /// Output pixel format, see the formats command
    #[structopt(long = "pf", default_value = "1bpp", parse(try_from_str = parse_format))]
    format: PixelFormat,
}

#[derive(StructOpt, Debug)]
struct ExportArgs {
    #[structopt(flatten)]
    common: CommonArgs,
}

#[derive(StructOpt, Debug)]
struct MaskArgs {
    #[structopt(flatten)]
    common: CommonArgs,
    /// Index of the pixels to extract
    #[structopt(long, default_value = "0", parse(try_from_str = parse_index))]
    index: u32,
    /// Invert the output, including the border and shifted area
    #[structopt(long = "not")]
    invert: bool,
}

impl Command {
    fn tool_name(&self) -> &'static str {
        match self {
            Command::Export(_) => "export",
            Command::Mask(_) => "mask",
            Command::Formats => "formats",
        }
    }
}

/// Parse a number in decimal, or in hex with a `0x`, `$` or `&` prefix or an `h` suffix.
/// Returns None if the text isn't a number or the number is above `limit`.
fn parse_value(text: &str, limit: u32) -> Option<u32> {
    let hex_prefixed = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
        .or_else(|| text.strip_prefix('&'));
    let (digits, radix) = if let Some(digits) = hex_prefixed {
        (digits, 16)
    } else if let Some(digits) = text.strip_suffix('h').or_else(|| text.strip_suffix('H')) {
        (digits, 16)
    } else {
        (text, 10)
    };
    u32::from_str_radix(digits, radix)
        .ok()
        .filter(|&value| value <= limit)
}

fn invalid(option: &'static str, value: &str) -> Error {
    Error::InvalidArgument {
        option,
        value: value.to_string(),
    }
}

fn parse_shift(text: &str) -> Result<u32, Error> {
    parse_value(text, BYTE_LIMIT).ok_or_else(|| invalid("-shift", text))
}

fn parse_index(text: &str) -> Result<u32, Error> {
    parse_value(text, BYTE_LIMIT).ok_or_else(|| invalid("-index", text))
}

fn parse_tile(text: &str) -> Result<TileSize, Error> {
    let mut parts = text.splitn(2, |c| c == 'x' || c == 'X');
    match (parts.next(), parts.next()) {
        (Some(width), Some(height)) => parse_value(width, u16::MAX as u32)
            .zip(parse_value(height, u16::MAX as u32))
            .ok_or_else(|| invalid("-tile", text)),
        _ => Err(invalid("-tile", text)),
    }
}

fn parse_format(text: &str) -> Result<PixelFormat, Error> {
    PixelFormat::decode(text).ok_or_else(|| invalid("-pf", text))
}

/// Rewrite a single dash option (`-tile`, `-PF`, `-H12w`) as the long option structopt expects.
/// Returns None to keep the argument as it is.
fn normalize_option(text: &str) -> Option<String> {
    let name = text.strip_prefix('-')?;
    if let Some(codes) = name.strip_prefix('H') {
        return Some(format!("--header={}", codes));
    }
    let name = name.strip_prefix('-').unwrap_or(name).to_lowercase();
    if VALUE_OPTIONS.contains(&name.as_str()) || FLAG_OPTIONS.contains(&name.as_str()) {
        Some(format!("--{}", name))
    } else {
        None
    }
}

/// Accept the traditional spelling of the command line.
/// Tool names and option names are not case sensitive.
fn normalize(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut normalized = Vec::new();
    let mut takes_value = false;
    for (position, arg) in args.into_iter().enumerate() {
        let rewritten = match arg.to_str() {
            _ if position == 0 || takes_value => None,
            Some(text) if position == 1 && !text.starts_with('-') => Some(text.to_lowercase()),
            Some(text) => normalize_option(text),
            None => None,
        };
        takes_value = matches!(
            &rewritten,
            Some(option) if VALUE_OPTIONS.iter().any(|v| option.strip_prefix("--") == Some(*v))
        );
        normalized.push(rewritten.map(OsString::from).unwrap_or(arg));
    }
    normalized
}

fn list_formats(reporter: &Reporter) {
    reporter.info("Pixel formats (-pf):");
    for format in PixelFormat::ALL.iter() {
        println!("  {:<8} {}", format.name(), format.description());
    }
}

fn run(command: &Command, reporter: &Reporter) -> Result<(), Error> {
    let (common, mask) = match command {
        Command::Export(args) => (&args.common, None),
        Command::Mask(args) => (&args.common, Some(args)),
        Command::Formats => {
            list_formats(reporter);
            return Ok(());
        }
    };

    let mut options = Options {
        format: common.format,
        tile: common.tile,
        shift: common.shift,
        double_width: common.double_width,
        invert: mask.map_or(false, |m| m.invert),
    };
    for downgrade in options.sanitize() {
        reporter.warn(downgrade);
    }

    // Masks compare full indices. Exports fail early if an index doesn't fit the output.
    let request = match mask {
        Some(_) => LoadRequest::new(TargetMode::Indexed8),
        None => {
            let max_index = options.format.max_index();
            LoadRequest::new(TargetMode::indexed_for(max_index)).with_max_index(max_index)
        }
    };
    reporter.begin(format_args!("Loading \"{}\"", common.input.display()));
    let image = match image_io::load_file(&common.input, &request) {
        Ok(image) => {
            reporter.finish(format_args!("OK ({}x{})", image.meta.width, image.meta.height));
            image
        }
        Err(err) => {
            reporter.finish("FAILED");
            return Err(err);
        }
    };
    let image = if options.double_width {
        scaling::double_width(&image)
    } else {
        image
    };

    let output = match mask {
        Some(args) => {
            reporter.info(format_args!(
                "Generating '{}' format mask from palette index {}.",
                options.format, args.index
            ));
            transform::build_mask(&image.bitmap, &image.meta, &options, args.index)?
        }
        None => {
            reporter.info(format_args!(
                "Exporting '{}' format raw image.",
                options.format
            ));
            transform::build_output(&image.bitmap, &image.meta, &options)?
        }
    };
    if options.shift != 0 {
        reporter.info(format_args!(
            "Output is shifted right by {} pixels.",
            options.shift
        ));
    }
    if common.tile.is_some() {
        reporter.info(format_args!("{} tiles.", output.tile_count));
    }

    let header = header::encode(
        &common.header,
        &output.bitmap,
        output.tile_count,
        output.tile_height,
    );
    let (mode, verb) = if common.append {
        (WriteMode::Append, "Appending")
    } else {
        (WriteMode::Truncate, "Writing")
    };
    reporter.begin(format_args!("{} \"{}\"", verb, common.output.display()));
    match storage::save(&common.output, mode, &header, &output.bitmap) {
        Ok(size) => {
            reporter.finish(format_args!("DONE ({} bytes)", size));
            Ok(())
        }
        Err(err) => {
            reporter.finish("FAILED");
            Err(err)
        }
    }
}

/// Main entry point. Parses command-line arguments and prints any errors.
/// On error, returns the exit code for `process::exit`.
pub fn main() -> Result<(), i32> {
    let command = Command::from_iter(normalize(env::args_os()));
    let reporter = Reporter::new(command.tool_name());
    run(&command, &reporter).map_err(|err| {
        reporter.error(&err);
        1
    })
}
