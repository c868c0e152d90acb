use core::fmt;
use core::ops::RangeInclusive;
use core::str::FromStr;

use pkx::{Channel, Color};
use serde::Deserialize;

use crate::pixel::{process_pixels_as_vec4, PixelConversion, RgbaSurface};
use crate::Region;

/// How the four per-channel scalings are applied.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleStrategy {
    /// One pass with the product of the four channel matrices.
    #[default]
    Fused,
    /// Four passes in R, G, B, A order, re-quantized to the channel depth after each.
    Sequential,
}

impl fmt::Display for ScaleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fused => f.write_str("fused"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

impl FromStr for ScaleStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fused" => Ok(Self::Fused),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown scale strategy '{other}' (expected 'fused' or 'sequential')"
            )),
        }
    }
}

/// 4x4 color matrix applied to row vectors: `out[j] = sum(v[i] * m[i][j])`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorMatrix(pub [[f32; 4]; 4]);

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Identity with the diagonal entry of `channel` replaced by `amount`.
    pub fn channel_brightness(channel: Channel, amount: f32) -> Self {
        let mut m = Self::IDENTITY;
        let i = channel.index();
        m.0[i][i] = amount;
        m
    }

    /// Matrix equivalent to applying `self` and then `next`.
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        let mut out = [[0.0f32; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.0[i][k] * next.0[k][j]).sum();
            }
        }
        ColorMatrix(out)
    }

    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        core::array::from_fn(|j| v[0] * m[0][j] + v[1] * m[1][j] + v[2] * m[2][j] + v[3] * m[3][j])
    }
}

/// Maps `value` linearly from `from` onto `to`. `None` when `value` lies
/// outside `from` or `from` is empty.
pub fn convert_range(
    from: RangeInclusive<f32>,
    to: RangeInclusive<f32>,
    value: f32,
) -> Option<f32> {
    let (from_start, from_end) = from.into_inner();
    let (to_start, to_end) = to.into_inner();
    if value < from_start || value > from_end || from_start >= from_end {
        return None;
    }
    Some(to_start + (value - from_start) * (to_end - to_start) / (from_end - from_start))
}

/// Brightness multiplier for one byte of `color2`: 0 maps to 0, 255 to 2.
pub fn brightness_factor(value: u8) -> f32 {
    f32::from(value) * 2.0 / 255.0
}

/// Scales each channel of every pixel in `region` by the factor derived from
/// the matching byte of `color2`.
pub fn apply_channel_brightness<I: RgbaSurface + ?Sized>(
    image: &mut I,
    region: Region,
    color2: Color,
    strategy: ScaleStrategy,
) {
    let passes = Channel::ALL
        .map(|c| ColorMatrix::channel_brightness(c, brightness_factor(color2.channel(c))));

    match strategy {
        ScaleStrategy::Fused => {
            let matrix = passes
                .iter()
                .fold(ColorMatrix::IDENTITY, |acc, pass| acc.then(pass));
            log::trace!("fused brightness matrix {matrix:?}");
            process_pixels_as_vec4(image, region, PixelConversion::None, |px| {
                matrix.transform(px)
            });
        }
        ScaleStrategy::Sequential => {
            for matrix in passes {
                process_pixels_as_vec4(image, region, PixelConversion::None, |px| {
                    matrix.transform(px)
                });
            }
        }
    }
}
