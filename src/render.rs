//! Pixel buffer drawn into the terminal with half-block characters.
//!
//! Every terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background.

use crossterm::{cursor, queue, style::{self, Color as CColor}};
use std::io::{self, Write};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    pub const fn halved(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn to_crossterm(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

pub const SKY_TOP: Rgb = Rgb(70, 180, 200);
pub const SKY_BOT: Rgb = Rgb(190, 232, 245);
pub const GRASS: Rgb = Rgb(84, 168, 55);
pub const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
pub const DIRT: Rgb = Rgb(210, 185, 110);
pub const DIRT_DARK: Rgb = Rgb(185, 160, 90);
pub const PANEL: Rgb = Rgb(220, 195, 120);
pub const PIPE_L: Rgb = Rgb(74, 122, 26);
pub const PIPE_M: Rgb = Rgb(100, 170, 40);
pub const PIPE_R: Rgb = Rgb(115, 191, 46);
pub const PIPE_HI: Rgb = Rgb(145, 215, 62);
pub const CAP_DARK: Rgb = Rgb(60, 100, 20);
pub const BIRD_Y: Rgb = Rgb(245, 200, 66);
pub const BIRD_HI: Rgb = Rgb(255, 225, 100);
pub const BIRD_WING: Rgb = Rgb(215, 165, 35);
pub const BIRD_EYE: Rgb = Rgb(255, 255, 255);
pub const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
pub const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
pub const BIRD_BEAK_HI: Rgb = Rgb(240, 110, 50);
pub const HILL_FAR: Rgb = Rgb(120, 195, 75);
pub const HILL_NEAR: Rgb = Rgb(95, 175, 55);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const SHADOW: Rgb = Rgb(30, 30, 30);
pub const INK: Rgb = Rgb(40, 40, 48);

// Dashboard
pub const BOARD_BG: Rgb = Rgb(24, 26, 36);
pub const AXIS: Rgb = Rgb(120, 124, 140);
pub const GRID: Rgb = Rgb(44, 48, 62);
pub const SKYBLUE: Rgb = Rgb(135, 206, 235);
pub const CORAL: Rgb = Rgb(240, 128, 128);

// ── Pixel buffer ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    /// Buffer covering a terminal of `cols` x `rows` cells.
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        Self::new(cols as usize, rows as usize * 2)
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    /// Bresenham line, both endpoints inclusive.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, c: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set(x, y, c);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Halve every pixel, used as an overlay behind panels.
    pub fn darken(&mut self) {
        for p in &mut self.px {
            *p = p.halved();
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(top.to_crossterm()))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(top.to_crossterm()))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(bot.to_crossterm()))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}
