//! Row iteration over RGBA images in normalized `[f32; 4]` form.

use image::{ImageBuffer, Rgba, RgbaImage};
use rayon::prelude::*;

use crate::Region;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PixelConversion {
    #[default]
    None,
    /// Color channels are multiplied by alpha before the operation and
    /// divided by the resulting alpha after it.
    Premultiply,
}

pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Integer channel storage with a `[0, 1]` normalized view.
pub trait UnitChannel: Copy + Send + Sync + 'static {
    fn to_unit(self) -> f32;
    /// Clamps to [0, 1] and rounds half up.
    fn from_unit(value: f32) -> Self;
}

impl UnitChannel for u8 {
    fn to_unit(self) -> f32 {
        f32::from(self) / 255.0
    }

    fn from_unit(value: f32) -> Self {
        (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }
}

impl UnitChannel for u16 {
    fn to_unit(self) -> f32 {
        f32::from(self) / 65535.0
    }

    fn from_unit(value: f32) -> Self {
        (value.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
    }
}

/// Interleaved RGBA pixels, row-major without padding.
pub trait RgbaSurface {
    type Channel: UnitChannel;

    fn size(&self) -> (u32, u32);
    fn channels_mut(&mut self) -> &mut [Self::Channel];
}

impl RgbaSurface for RgbaImage {
    type Channel = u8;

    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn channels_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl RgbaSurface for Rgba16Image {
    type Channel = u16;

    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn channels_mut(&mut self) -> &mut [u16] {
        self
    }
}

pub fn to_vec4<S: UnitChannel>(px: [S; 4]) -> [f32; 4] {
    px.map(S::to_unit)
}

pub fn from_vec4<S: UnitChannel>(v: [f32; 4]) -> [S; 4] {
    v.map(S::from_unit)
}

pub fn premultiply(v: [f32; 4]) -> [f32; 4] {
    let a = v[3];
    [v[0] * a, v[1] * a, v[2] * a, a]
}

/// Fully transparent pixels are left as they are.
pub fn unpremultiply(v: [f32; 4]) -> [f32; 4] {
    let a = v[3];
    if a == 0.0 {
        return v;
    }
    [v[0] / a, v[1] / a, v[2] / a, a]
}

/// Runs `op` on every pixel of `region`, rows in parallel.
///
/// The region is clipped to the image; pixels outside it are never written.
pub fn process_pixels_as_vec4<I, F>(
    image: &mut I,
    region: Region,
    conversion: PixelConversion,
    op: F,
) where
    I: RgbaSurface + ?Sized,
    F: Fn([f32; 4]) -> [f32; 4] + Sync,
{
    let (width, height) = image.size();
    let Some(region) = region.clip(width, height) else {
        return;
    };

    let row_len = width as usize * 4;
    let start = region.x as usize * 4;
    let end = start + region.width as usize * 4;

    image
        .channels_mut()
        .par_chunks_exact_mut(row_len)
        .skip(region.y as usize)
        .take(region.height as usize)
        .for_each(|row| {
            for px in row[start..end].chunks_exact_mut(4) {
                let mut v = to_vec4([px[0], px[1], px[2], px[3]]);
                if conversion == PixelConversion::Premultiply {
                    v = premultiply(v);
                }
                v = op(v);
                if conversion == PixelConversion::Premultiply {
                    v = unpremultiply(v);
                }
                px.copy_from_slice(&from_vec4::<I::Channel>(v));
            }
        });
}
