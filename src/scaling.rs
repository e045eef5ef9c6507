//! Horizontal pixel doubling.

use imgref::{ImgRef, ImgVec};

use crate::{bitmap::PackedBitmap, image_io::LoadedImage};

/// Repeat every pixel `scale_x` times horizontally.
pub fn scale_horizontally<Pixel>(source: ImgRef<'_, Pixel>, scale_x: usize) -> ImgVec<Pixel>
where
    Pixel: Copy + Default,
{
    let target_w = source.width() * scale_x;
    let mut pixels = vec![Pixel::default(); target_w * source.height()];
    for (source_row, target_row) in source.rows().zip(pixels.chunks_exact_mut(target_w)) {
        scale_row(source_row, target_row, scale_x);
    }
    ImgVec::new(pixels, target_w, source.height())
}

fn scale_row<T>(source: &[T], target: &mut [T], scale: usize)
where
    T: Copy,
{
    debug_assert_eq!(source.len() * scale, target.len());
    for (&pixel, run) in source.iter().zip(target.chunks_exact_mut(scale)) {
        run.iter_mut().for_each(|t| *t = pixel);
    }
}

/// Read every pixel of a bitmap.
fn samples(bitmap: &PackedBitmap) -> ImgVec<u32> {
    let (width, height) = (bitmap.width(), bitmap.height());
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| bitmap.peek(x, y)))
        .collect();
    ImgVec::new(pixels, width as usize, height as usize)
}

/// Double the width of a loaded image, keeping its pixel format.
pub fn double_width(image: &LoadedImage) -> LoadedImage {
    let scaled = scale_horizontally(samples(&image.bitmap).as_ref(), 2);
    let mut bitmap = PackedBitmap::new(
        image.bitmap.format(),
        scaled.width() as u32,
        scaled.height() as u32,
    );
    for (row, y) in scaled.rows().zip(0..) {
        for (&value, x) in row.iter().zip(0..) {
            bitmap.plot(x, y, value);
        }
    }
    let mut meta = image.meta.clone();
    meta.width *= 2;
    log::debug!("doubled width to {}", meta.width);
    LoadedImage { bitmap, meta }
}
