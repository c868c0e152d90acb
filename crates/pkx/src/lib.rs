pub mod error;

use crate::error::Error;
use byteorder::ReadBytesExt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

pub type Result<T> = core::result::Result<T, Error>;

/// Offset of the byte compared against byte 0 to tell the layouts apart.
pub const DETECT_MARKER_OFFSET: u64 = 0x40;
/// Colosseum models keep their colors this many bytes before the end of the file.
pub const COLOSSEUM_TAIL_LEN: u64 = 0x11;
/// XD models keep their colors at a fixed position after the header.
pub const XD_COLOR_OFFSET: u64 = 0x73;
/// Distance between two channels of the first color (one 32-bit field each).
pub const COLOR1_STRIDE: u64 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    pub fn index(self) -> usize {
        match self {
            Self::R => 0,
            Self::G => 1,
            Self::B => 2,
            Self::A => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn channel(self, channel: Channel) -> u8 {
        match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
            Channel::A => self.a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

/// The two colors stored in a model: `color1` routes channels, `color2`
/// scales their brightness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorPair {
    pub color1: Color,
    pub color2: Color,
}

/// Byte layout conventions of the model container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormatVariant {
    Colosseum,
    Xd,
    /// Recognized, but its models carry no color.
    BattleRevolution,
    Undefined,
}

/// Order in which the four bytes of the second color are packed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PackedOrder {
    Abgr,
    Rgba,
}

impl PackedOrder {
    pub fn unpack(self, bytes: [u8; 4]) -> Color {
        match self {
            Self::Abgr => Color::new(bytes[3], bytes[2], bytes[1], bytes[0]),
            Self::Rgba => Color::from(bytes),
        }
    }
}

impl FormatVariant {
    pub const ALL: [FormatVariant; 4] = [
        FormatVariant::Colosseum,
        FormatVariant::Xd,
        FormatVariant::BattleRevolution,
        FormatVariant::Undefined,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Colosseum => "Colosseum",
            Self::Xd => "XD",
            Self::BattleRevolution => "Battle Revolution",
            Self::Undefined => "undefined",
        }
    }

    /// Where and how the colors are stored; `None` for layouts without color.
    pub fn color_layout(self) -> Option<ColorLayout> {
        match self {
            Self::Colosseum => Some(ColorLayout {
                base: BaseOffset::FromEnd(COLOSSEUM_TAIL_LEN),
                color2_order: PackedOrder::Abgr,
            }),
            Self::Xd => Some(ColorLayout {
                base: BaseOffset::Fixed(XD_COLOR_OFFSET),
                color2_order: PackedOrder::Rgba,
            }),
            Self::BattleRevolution | Self::Undefined => None,
        }
    }

    pub fn has_color(self) -> bool {
        self.color_layout().is_some()
    }

    pub fn color2_order(self) -> Option<PackedOrder> {
        self.color_layout().map(|layout| layout.color2_order)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BaseOffset {
    /// Counted back from the end of the stream.
    FromEnd(u64),
    Fixed(u64),
}

impl BaseOffset {
    pub fn resolve(self, stream_len: u64) -> Result<u64> {
        match self {
            Self::FromEnd(back) => stream_len.checked_sub(back).ok_or(Error::Truncated {
                offset: 0,
                len: stream_len,
            }),
            Self::Fixed(offset) => Ok(offset),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorLayout {
    pub base: BaseOffset,
    pub color2_order: PackedOrder,
}

/// Classifies a model by comparing byte 0 with byte 0x40.
///
/// Equal bytes mean a Colosseum layout, anything else is taken as XD. There
/// is no magic or version field to consult. A stream shorter than 0x41 bytes
/// fails with [`Error::Io`].
pub fn detect_variant<R: Read + Seek>(reader: &mut R) -> Result<FormatVariant> {
    reader.seek(SeekFrom::Start(0))?;
    let first = reader.read_u8()?;

    reader.seek(SeekFrom::Start(DETECT_MARKER_OFFSET))?;
    let marker = reader.read_u8()?;

    let variant = if first == marker {
        FormatVariant::Colosseum
    } else {
        FormatVariant::Xd
    };
    log::debug!(
        "detected {} layout (byte 0 = {first:#04x}, byte {DETECT_MARKER_OFFSET:#x} = {marker:#04x})",
        variant.name()
    );
    Ok(variant)
}

/// Position of the first color channel, or `None` when the variant has no color.
pub fn base_offset(variant: FormatVariant, stream_len: u64) -> Result<Option<u64>> {
    variant
        .color_layout()
        .map(|layout| layout.base.resolve(stream_len))
        .transpose()
}

/// Reads both colors using the layout of `variant`.
///
/// Returns `Ok(None)` without touching the stream for variants that carry no
/// color. Leaves the cursor after the last byte read; the stream stays open.
pub fn extract_colors<R: Read + Seek>(
    reader: &mut R,
    variant: FormatVariant,
) -> Result<Option<ColorPair>> {
    let Some(layout) = variant.color_layout() else {
        return Ok(None);
    };

    let len = reader.seek(SeekFrom::End(0))?;
    let base = layout.base.resolve(len)?;
    log::debug!("{} colors start at {base:#x} of {len:#x}", variant.name());

    let mut color1 = [0u8; 4];
    for (i, slot) in color1.iter_mut().enumerate() {
        let offset = field_offset(base, i as u64 * COLOR1_STRIDE, len)?;
        *slot = read_byte_at(reader, offset, len)?;
    }

    // color2 follows the alpha byte of color1 without padding.
    let color2_start = field_offset(base, 3 * COLOR1_STRIDE + 1, len)?;
    reader.seek(SeekFrom::Start(color2_start))?;
    let mut packed = [0u8; 4];
    for (i, slot) in packed.iter_mut().enumerate() {
        *slot = read_next_byte(reader, color2_start + i as u64, len)?;
    }

    let colors = ColorPair {
        color1: Color::from(color1),
        color2: layout.color2_order.unpack(packed),
    };
    log::trace!("{} colors: {colors:?}", variant.name());
    Ok(Some(colors))
}

/// Like [`extract_colors`], but a layout without color is
/// [`Error::UnsupportedFormat`].
pub fn require_colors<R: Read + Seek>(
    reader: &mut R,
    variant: FormatVariant,
) -> Result<ColorPair> {
    extract_colors(reader, variant)?.ok_or(Error::UnsupportedFormat { variant })
}

/// Detects the layout and extracts the colors in one call.
pub fn read_color_pair<R: Read + Seek>(reader: &mut R) -> Result<Option<ColorPair>> {
    let variant = detect_variant(reader)?;
    extract_colors(reader, variant)
}

/// An opened model file. The handle is released when the value is dropped.
#[derive(Debug)]
pub struct ModelFile {
    file: File,
    variant: FormatVariant,
}

impl ModelFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let variant = detect_variant(&mut file)?;
        Ok(Self { file, variant })
    }

    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    pub fn colors(&mut self) -> Result<Option<ColorPair>> {
        extract_colors(&mut self.file, self.variant)
    }

    pub fn require_colors(&mut self) -> Result<ColorPair> {
        require_colors(&mut self.file, self.variant)
    }
}

fn field_offset(base: u64, delta: u64, len: u64) -> Result<u64> {
    base.checked_add(delta)
        .ok_or(Error::Truncated { offset: base, len })
}

fn read_byte_at<R: Read + Seek>(reader: &mut R, offset: u64, len: u64) -> Result<u8> {
    reader.seek(SeekFrom::Start(offset))?;
    read_next_byte(reader, offset, len)
}

fn read_next_byte<R: Read>(reader: &mut R, offset: u64, len: u64) -> Result<u8> {
    reader.read_u8().map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::Truncated { offset, len },
        _ => Error::Io(err),
    })
}
