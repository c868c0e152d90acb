use pkx::{Channel, Color};

use crate::pixel::{process_pixels_as_vec4, PixelConversion, RgbaSurface};
use crate::Region;

/// Source channel for each destination channel, read from the bytes of
/// `color1` modulo 4. Channels may repeat or be dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelRoute {
    sources: [usize; 4],
}

impl ChannelRoute {
    pub const IDENTITY: ChannelRoute = ChannelRoute {
        sources: [0, 1, 2, 3],
    };

    pub fn from_color(color1: Color) -> Self {
        Self {
            sources: Channel::ALL.map(|c| usize::from(color1.channel(c) % 4)),
        }
    }

    pub fn sources(&self) -> [usize; 4] {
        self.sources
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn route_pixel(&self, px: [f32; 4]) -> [f32; 4] {
        self.sources.map(|source| px[source])
    }
}

/// Remaps the channels of every pixel in `region` as selected by `color1`.
///
/// Runs on premultiplied values. The identity route leaves the image
/// untouched, including the color of fully transparent pixels.
pub fn apply_channel_route<I: RgbaSurface + ?Sized>(image: &mut I, region: Region, color1: Color) {
    let route = ChannelRoute::from_color(color1);
    if route.is_identity() {
        log::trace!("identity channel route, skipping");
        return;
    }
    log::trace!("routing channels from {:?}", route.sources());
    process_pixels_as_vec4(image, region, PixelConversion::Premultiply, |px| {
        route.route_pixel(px)
    });
}
