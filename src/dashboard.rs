//! Analytics dashboard: score over time and the spread of game durations.
//!
//! Reads the whole session log once and draws two charts into the pixel
//! buffer. An empty log produces an empty, zero-valued view.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use tracing::debug;

use crate::font::{GLYPH_H, draw_text, draw_text_centered, text_width};
use crate::render::*;
use crate::sessions::SessionRecord;
use crate::stats::{DURATION_BINS, Histogram, Summary};

/// Everything the dashboard shows, computed once from the log.
#[derive(Debug, Clone)]
pub struct Dashboard {
    summary: Summary,
    scores: Vec<u32>,
    durations: Option<Histogram>,
}

/// Plot area in pixels.
#[derive(Debug, Clone, Copy)]
struct Area {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Area {
    fn bottom(&self) -> i32 {
        self.y + self.h - 1
    }

    fn right(&self) -> i32 {
        self.x + self.w - 1
    }
}

impl Dashboard {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let durations: Vec<f64> = records.iter().map(|r| r.duration_seconds).collect();
        Self {
            summary: Summary::from_records(records),
            scores: records.iter().map(|r| r.score).collect(),
            durations: Histogram::new(&durations, DURATION_BINS),
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Scores in log order, one per game.
    pub fn score_series(&self) -> &[u32] {
        &self.scores
    }

    pub fn duration_histogram(&self) -> Option<&Histogram> {
        self.durations.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn draw(&self, buf: &mut PixelBuf) {
        buf.clear(BOARD_BG);
        let w = buf.width() as i32;
        let h = buf.height() as i32;
        let cx = w / 2;

        let header = format!(
            "GAMES {}  BEST {}  AVG {}",
            self.summary.total_games,
            self.summary.highest_score,
            self.summary.average_label()
        );
        draw_text_centered(buf, cx, 1, &header, 1, WHITE);
        draw_text_centered(buf, cx, h - GLYPH_H - 1, "Q: BACK", 1, AXIS);

        if self.is_empty() {
            draw_text_centered(buf, cx, h / 2 - GLYPH_H / 2, "NO GAMES LOGGED YET", 1, BIRD_Y);
            return;
        }

        // Two stacked charts between header and footer
        let top = GLYPH_H + 3;
        let bottom = h - GLYPH_H - 3;
        let mid = (top + bottom) / 2;
        self.draw_scores(buf, top, mid - 1);
        self.draw_durations(buf, mid + 1, bottom);
    }

    fn draw_scores(&self, buf: &mut PixelBuf, y0: i32, y1: i32) {
        let w = buf.width() as i32;
        draw_text(buf, 2, y0, "SCORES OVER TIME", 1, SKYBLUE);

        let max = self.scores.iter().copied().max().unwrap_or(0).max(1);
        let max_label = max.to_string();
        let area = chart_area(w, y0 + GLYPH_H + 2, y1, &max_label);
        draw_axes(buf, area, &max_label, "0");

        let points = line_points(&self.scores, max, area);
        for pair in points.windows(2) {
            let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
            buf.draw_line(ax, ay, bx, by, SKYBLUE);
        }
        for &(x, y) in &points {
            buf.fill_rect(x, y - 1, 2, 2, WHITE);
        }
    }

    fn draw_durations(&self, buf: &mut PixelBuf, y0: i32, y1: i32) {
        let Some(hist) = &self.durations else {
            return;
        };
        let w = buf.width() as i32;
        draw_text(buf, 2, y0, "GAME DURATIONS (S)", 1, CORAL);

        let max_label = hist.max_count().to_string();
        let area = chart_area(w, y0 + GLYPH_H + 2, y1 - GLYPH_H - 1, &max_label);
        draw_axes(buf, area, &max_label, "0");

        for (i, (x, bar_w, bar_h)) in bar_geometry(hist, area).into_iter().enumerate() {
            if hist.counts[i] == 0 {
                continue;
            }
            let y = area.bottom() - bar_h + 1;
            buf.fill_rect(x, y, bar_w, bar_h, CORAL);
            // Edge between neighbouring bars
            buf.fill_rect(x, y, 1, bar_h, SHADOW);
        }

        let (lo, _) = hist.bin_edges(0);
        let (_, hi) = hist.bin_edges(hist.bins() - 1);
        let range = hi - lo;
        let (lo, hi) = (duration_label(lo.max(0.0), range), duration_label(hi, range));
        let label_y = area.bottom() + 2;
        draw_text(buf, area.x, label_y, &lo, 1, AXIS);
        draw_text(buf, area.right() - text_width(&hi, 1) + 1, label_y, &hi, 1, AXIS);
    }

    /// Show the dashboard full-screen until Q, Esc or Enter.
    /// The terminal must already be in raw mode on the alternate screen.
    pub fn run(&self, out: &mut impl Write) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let mut buf = PixelBuf::for_terminal(cols, rows);
        self.draw(&mut buf);
        buf.render(out)?;

        loop {
            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter => {
                        debug!("dashboard closed");
                        return Ok(());
                    }
                    _ => {}
                },
                Event::Resize(c, r) => {
                    buf.resize(c as usize, r as usize * 2);
                    self.draw(&mut buf);
                    buf.render(out)?;
                }
                _ => {}
            }
        }
    }
}

/// Whole seconds, or tenths when the whole range is under ten seconds.
fn duration_label(secs: f64, range: f64) -> String {
    if range < 10.0 {
        format!("{secs:.1}")
    } else {
        format!("{secs:.0}")
    }
}

/// Plot area right of a y-axis label column.
fn chart_area(w: i32, y0: i32, y1: i32, widest_label: &str) -> Area {
    let x = text_width(widest_label, 1).max(3) + 4;
    Area {
        x,
        y: y0,
        w: (w - x - 3).max(1),
        h: (y1 - y0 + 1).max(1),
    }
}

fn draw_axes(buf: &mut PixelBuf, area: Area, top_label: &str, bottom_label: &str) {
    // Dashed grid line at the maximum
    for x in (area.x..=area.right()).step_by(2) {
        buf.set(x, area.y, GRID);
    }
    buf.draw_line(area.x - 1, area.y, area.x - 1, area.bottom() + 1, AXIS);
    buf.draw_line(area.x - 1, area.bottom() + 1, area.right(), area.bottom() + 1, AXIS);

    let label_x = |s: &str| area.x - 2 - text_width(s, 1);
    draw_text(buf, label_x(top_label), area.y, top_label, 1, AXIS);
    draw_text(buf, label_x(bottom_label), area.bottom() - GLYPH_H + 1, bottom_label, 1, AXIS);
}

/// One point per value, spread across the area left to right; a single
/// value sits in the middle.
fn line_points(values: &[u32], max: u32, area: Area) -> Vec<(i32, i32)> {
    let n = values.len();
    let span = f64::from((area.h - 1).max(0));
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = if n == 1 {
                area.x + area.w / 2
            } else {
                area.x + (i as f64 * f64::from(area.w - 1) / (n - 1) as f64).round() as i32
            };
            let y = area.bottom() - (f64::from(v) / f64::from(max.max(1)) * span).round() as i32;
            (x, y)
        })
        .collect()
}

/// (x, width, height) of each histogram bar.
fn bar_geometry(hist: &Histogram, area: Area) -> Vec<(i32, i32, i32)> {
    let bins = hist.bins() as i32;
    let max = hist.max_count().max(1) as f64;
    (0..bins)
        .map(|i| {
            let x0 = area.x + i * area.w / bins;
            let x1 = area.x + (i + 1) * area.w / bins;
            let count = hist.counts[i as usize] as f64;
            let h = (count / max * f64::from(area.h)).round() as i32;
            let h = if count > 0.0 { h.max(1) } else { 0 };
            (x0, (x1 - x0).max(1), h)
        })
        .collect()
}
