//! 3x5 bitmap font.

use crate::render::{PixelBuf, Rgb, SHADOW};

pub const GLYPH_W: i32 = 3;
pub const GLYPH_H: i32 = 5;
/// Horizontal advance per character, including 1px spacing.
const ADVANCE: i32 = GLYPH_W + 1;

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
const LETTERS: [[u8; 15]; 26] = [
    [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // A
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0], // B
    [0,1,1, 1,0,0, 1,0,0, 1,0,0, 0,1,1], // C
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,1,0], // D
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1], // E
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,0,0], // F
    [0,1,1, 1,0,0, 1,0,1, 1,0,1, 0,1,1], // G
    [1,0,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // H
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 1,1,1], // I
    [0,0,1, 0,0,1, 0,0,1, 1,0,1, 0,1,0], // J
    [1,0,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // K
    [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1], // L
    [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1], // M
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,0,1], // N
    [0,1,0, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // O
    [1,1,0, 1,0,1, 1,1,0, 1,0,0, 1,0,0], // P
    [0,1,0, 1,0,1, 1,0,1, 1,1,0, 0,1,1], // Q
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // R
    [0,1,1, 1,0,0, 0,1,0, 0,0,1, 1,1,0], // S
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0], // T
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // U
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // V
    [1,0,1, 1,0,1, 1,1,1, 1,1,1, 1,0,1], // W
    [1,0,1, 1,0,1, 0,1,0, 1,0,1, 1,0,1], // X
    [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0], // Y
    [1,1,1, 0,0,1, 0,1,0, 1,0,0, 1,1,1], // Z
];

#[rustfmt::skip]
fn punctuation(ch: char) -> Option<[u8; 15]> {
    Some(match ch {
        '.'  => [0,0,0, 0,0,0, 0,0,0, 0,0,0, 0,1,0],
        ':'  => [0,0,0, 0,1,0, 0,0,0, 0,1,0, 0,0,0],
        '-'  => [0,0,0, 0,0,0, 1,1,1, 0,0,0, 0,0,0],
        '\'' => [0,1,0, 0,1,0, 0,0,0, 0,0,0, 0,0,0],
        '&'  => [0,1,0, 1,0,1, 0,1,0, 1,0,1, 0,1,1],
        '/'  => [0,0,1, 0,0,1, 0,1,0, 1,0,0, 1,0,0],
        '!'  => [0,1,0, 0,1,0, 0,1,0, 0,0,0, 0,1,0],
        _ => return None,
    })
}

/// Bitmap for `ch`, `None` for characters drawn as blanks.
pub fn glyph(ch: char) -> Option<[u8; 15]> {
    let ch = ch.to_ascii_uppercase();
    match ch {
        '0'..='9' => Some(DIGITS[(ch as u8 - b'0') as usize]),
        'A'..='Z' => Some(LETTERS[(ch as u8 - b'A') as usize]),
        _ => punctuation(ch),
    }
}

/// Pixel width of `text` at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        0
    } else {
        (n * ADVANCE - 1) * scale
    }
}

fn draw_glyph(buf: &mut PixelBuf, x: i32, y: i32, glyph: &[u8; 15], scale: i32, c: Rgb) {
    for row in 0..GLYPH_H {
        for col in 0..GLYPH_W {
            if glyph[(row * GLYPH_W + col) as usize] == 1 {
                buf.fill_rect(x + col * scale, y + row * scale, scale, scale, c);
            }
        }
    }
}

/// Draw `text` with its top-left corner at (x, y).
pub fn draw_text(buf: &mut PixelBuf, x: i32, y: i32, text: &str, scale: i32, fg: Rgb) {
    for (i, ch) in text.chars().enumerate() {
        if let Some(g) = glyph(ch) {
            draw_glyph(buf, x + i as i32 * ADVANCE * scale, y, &g, scale, fg);
        }
    }
}

/// Draw `text` horizontally centred on `cx`, with a 1px drop shadow.
pub fn draw_text_centered(
    buf: &mut PixelBuf,
    cx: i32,
    y: i32,
    text: &str,
    scale: i32,
    fg: Rgb,
) {
    let x = cx - text_width(text, scale) / 2;
    draw_text(buf, x + 1, y + 1, text, scale, SHADOW);
    draw_text(buf, x, y, text, scale, fg);
}

pub fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    draw_text_centered(buf, cx, y, &n.to_string(), 1, fg);
}
