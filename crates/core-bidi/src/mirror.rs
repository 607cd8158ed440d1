//! Glyph mirroring for RTL cells.
//!
//! Box drawing (U+2500..U+257F) has no Unicode mirroring property, yet
//! right-to-left terminal applications drawing frames expect corners and
//! tees to flip. That is a rendering convention the row opts into
//! (`BidiFlags::BOX_MIRROR`), so it lives in a local table. Everything else
//! uses the Bidi_Mirroring_Glyph property.

use crate::classifier::BidiClassifier;

const BOX_DRAWING_START: u32 = 0x2500;

/// Low byte of the horizontally mirrored box drawing character, indexed by
/// the low byte of the original (offset from U+2500).
#[rustfmt::skip]
static BOX_DRAWING_MIRROR: [u8; 128] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x10, 0x11, 0x12, 0x13,
    0x0c, 0x0d, 0x0e, 0x0f, 0x18, 0x19, 0x1a, 0x1b, 0x14, 0x15, 0x16, 0x17, 0x24, 0x25, 0x26, 0x27,
    0x28, 0x29, 0x2a, 0x2b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x2c, 0x2e, 0x2d, 0x2f,
    0x30, 0x32, 0x31, 0x33, 0x34, 0x36, 0x35, 0x37, 0x38, 0x3a, 0x39, 0x3b, 0x3c, 0x3e, 0x3d, 0x3f,
    0x40, 0x41, 0x42, 0x44, 0x43, 0x46, 0x45, 0x47, 0x48, 0x4a, 0x49, 0x4b, 0x4c, 0x4d, 0x4e, 0x4f,
    0x50, 0x51, 0x55, 0x56, 0x57, 0x52, 0x53, 0x54, 0x5b, 0x5c, 0x5d, 0x58, 0x59, 0x5a, 0x61, 0x62,
    0x63, 0x5e, 0x5f, 0x60, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x6b, 0x6c, 0x6e, 0x6d, 0x70,
    0x6f, 0x72, 0x71, 0x73, 0x76, 0x75, 0x74, 0x77, 0x7a, 0x79, 0x78, 0x7b, 0x7e, 0x7d, 0x7c, 0x7f,
];

fn mirror_box_drawing(ch: char) -> Option<char> {
    let offset = (ch as u32).checked_sub(BOX_DRAWING_START)?;
    let mirrored = *BOX_DRAWING_MIRROR.get(offset as usize)?;
    if u32::from(mirrored) == offset {
        return None;
    }
    char::from_u32(BOX_DRAWING_START + u32::from(mirrored))
}

fn is_box_drawing(ch: char) -> bool {
    (BOX_DRAWING_START..BOX_DRAWING_START + 0x80).contains(&(ch as u32))
}

/// Mirrored glyph of `ch`, or `None` when it has no distinct mirror.
///
/// Box drawing mirrors only when `box_drawing` is set. Other characters ask
/// the classifier, or the Unicode mirroring table when there is none.
pub fn mirror(
    ch: char,
    box_drawing: bool,
    classifier: Option<&dyn BidiClassifier>,
) -> Option<char> {
    if is_box_drawing(ch) {
        return if box_drawing { mirror_box_drawing(ch) } else { None };
    }
    let mirrored = match classifier {
        Some(c) => c.mirror(ch),
        None => unicode_bidi_mirroring::get_mirrored(ch),
    };
    mirrored.filter(|&m| m != ch)
}
