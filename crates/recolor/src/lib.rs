pub mod brightness;
pub mod pixel;
pub mod route;

use pkx::ColorPair;

pub use crate::brightness::{
    apply_channel_brightness, brightness_factor, convert_range, ColorMatrix, ScaleStrategy,
};
pub use crate::pixel::{
    process_pixels_as_vec4, PixelConversion, Rgba16Image, RgbaSurface, UnitChannel,
};
pub use crate::route::{apply_channel_route, ChannelRoute};

/// Rectangle of interest inside an image, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full<I: RgbaSurface + ?Sized>(image: &I) -> Self {
        let (width, height) = image.size();
        Self::new(0, 0, width, height)
    }

    /// Intersects the region with a `width` x `height` image. `None` when
    /// nothing is left.
    pub fn clip(self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self::new(self.x, self.y, w, h))
    }
}

/// Applies the colors of one model to its textures: channel routing with
/// `color1`, then per-channel brightness with `color2`.
#[derive(Copy, Clone, Debug)]
pub struct Recolor {
    pub colors: ColorPair,
    pub strategy: ScaleStrategy,
}

impl Recolor {
    pub fn new(colors: ColorPair) -> Self {
        Self {
            colors,
            strategy: ScaleStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ScaleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn apply<I: RgbaSurface + ?Sized>(&self, image: &mut I) {
        let region = Region::full(image);
        self.apply_region(image, region);
    }

    pub fn apply_region<I: RgbaSurface + ?Sized>(&self, image: &mut I, region: Region) {
        apply_channel_route(image, region, self.colors.color1);
        apply_channel_brightness(image, region, self.colors.color2, self.strategy);
    }
}
