use super::{Game, Phase};
use crate::collision::Rect;
use crate::font::{self, draw_number, draw_text_centered};
use crate::render::*;

impl Game {
    pub fn draw(&self, buf: &mut PixelBuf) {
        self.draw_sky(buf);
        self.draw_hills(buf);
        if matches!(self.phase, Phase::Playing | Phase::GameOver) {
            self.draw_pipes(buf);
        }
        self.draw_ground(buf);
        self.draw_bird(buf);

        match self.phase {
            Phase::Menu => self.draw_title(buf),
            Phase::Playing => draw_number(buf, self.pw as i32 / 2, 4, self.score, WHITE),
            Phase::GameOver if self.panel_visible() => self.draw_game_over(buf),
            Phase::GameOver => draw_number(buf, self.pw as i32 / 2, 4, self.score, WHITE),
            Phase::Statistics => self.draw_statistics(buf),
        }
    }

    /// Title text scale; doubled on large terminals.
    fn text_scale(&self) -> i32 {
        if self.scale >= 1.5 { 2 } else { 1 }
    }

    fn draw_sky(&self, buf: &mut PixelBuf) {
        let sky_h = self.sky_h();
        for y in 0..sky_h {
            let t = (y * 256 / sky_h.max(1)) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in 0..self.pw {
                buf.set(x as i32, y as i32, c);
            }
        }
    }

    fn draw_hills(&self, buf: &mut PixelBuf) {
        let base = self.sky_h() as i32;
        // Far hills
        for x in 0..self.pw as i32 {
            let fx = (x as f64 + self.ground_x * 0.2) * 0.04;
            let h = (fx.sin() * 6.0 + (fx * 1.7).sin() * 3.0) * self.scale;
            let top = base - h as i32 - (4.0 * self.scale) as i32;
            for y in top..base {
                buf.set(x, y, HILL_FAR);
            }
        }
        // Near hills
        for x in 0..self.pw as i32 {
            let fx = (x as f64 + self.ground_x * 0.4) * 0.06;
            let h = (fx.sin() * 4.0 + (fx * 2.3).sin() * 2.0) * self.scale;
            let top = base - h as i32 - (2.0 * self.scale) as i32;
            for y in top..base {
                buf.set(x, y, HILL_NEAR);
            }
        }
    }

    fn draw_ground(&self, buf: &mut PixelBuf) {
        let gy = self.sky_h() as i32;
        // Grass strip
        for x in 0..self.pw as i32 {
            let alt = ((x as f64 + self.ground_x) as i32 / 3) % 2 == 0;
            buf.set(x, gy, if alt { GRASS } else { GRASS_LIGHT });
            buf.set(x, gy + 1, GRASS);
        }
        // Dirt
        for y in (gy + 2)..self.ph as i32 {
            for x in 0..self.pw as i32 {
                let stripe = ((x as f64 + self.ground_x * 0.8) as i32 + (y - gy) * 2) % 12 < 6;
                buf.set(x, y, if stripe { DIRT } else { DIRT_DARK });
            }
        }
    }

    fn draw_pipes(&self, buf: &mut PixelBuf) {
        let cap_extra = (2.0 * self.scale).max(1.0) as i32;
        let cap_h = (3.0 * self.scale).max(2.0) as i32;
        let pw = self.pipe_w as i32;

        for pipe in &self.pipes {
            let [top, bottom] = self.pipe_rects(pipe);
            let px = pipe.x as i32;
            let gap_top = top.bottom() as i32;
            let gap_bot = bottom.top() as i32;

            // Top pipe body
            for x in 0..pw {
                let c = pipe_shade(x, pw);
                for y in 0..gap_top - cap_h {
                    buf.set(px + x, y, c);
                }
            }
            // Top pipe cap
            for x in -cap_extra..(pw + cap_extra) {
                let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in (gap_top - cap_h)..gap_top {
                    buf.set(px + x, y, c);
                }
                buf.set(px + x, gap_top - cap_h, CAP_DARK);
                buf.set(px + x, gap_top - 1, CAP_DARK);
            }

            // Bottom pipe cap
            for x in -cap_extra..(pw + cap_extra) {
                let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in gap_bot..(gap_bot + cap_h) {
                    buf.set(px + x, y, c);
                }
                buf.set(px + x, gap_bot, CAP_DARK);
                buf.set(px + x, gap_bot + cap_h - 1, CAP_DARK);
            }
            // Bottom pipe body
            for x in 0..pw {
                let c = pipe_shade(x, pw);
                for y in (gap_bot + cap_h)..bottom.bottom() as i32 {
                    buf.set(px + x, y, c);
                }
            }
        }
    }

    fn draw_bird(&self, buf: &mut PixelBuf) {
        let cx = self.bird_x as i32;
        let cy = self.bird_y as i32;
        let s = self.scale;

        // Tilt follows vertical speed
        let tilt = (self.bird_vy / (3.0 * s)).clamp(-1.0, 1.0) as i32;

        // Body core
        let bw = (3.0 * s).max(2.0) as i32;
        let bh = (2.0 * s).max(2.0) as i32;
        buf.fill_rect(cx - bw, cy - bh, bw * 2 + 1, bh * 2, BIRD_Y);

        // Highlight (top of body)
        buf.fill_rect(cx - bw + 1, cy - bh, bw * 2 - 2, 1.max((s * 0.8) as i32), BIRD_HI);

        // Wing flaps while alive
        let flapping = self.phase != Phase::GameOver;
        let wing_y_off = if flapping && self.frame % 8 < 4 { -1 } else { 1 };
        let wing_h = (1.5 * s).max(1.0) as i32;
        let wing_w = (2.0 * s).max(1.0) as i32;
        buf.fill_rect(cx - bw + 1, cy + wing_y_off + tilt, wing_w, wing_h, BIRD_WING);

        // Eye
        let ex = cx + bw - (1.5 * s) as i32;
        let ey = cy - bh + (1.0 * s).max(1.0) as i32;
        let eye_r = (0.8 * s).max(1.0) as i32;
        buf.fill_rect(ex, ey, eye_r + 1, eye_r + 1, BIRD_EYE);
        buf.set(ex + eye_r, ey + eye_r, BIRD_PUPIL);
        if s >= 1.5 {
            buf.set(ex + eye_r - 1, ey + eye_r, BIRD_PUPIL);
        }

        // Beak
        let beak_x = cx + bw;
        let beak_y = cy - (0.5 * s) as i32 + tilt;
        let beak_w = (2.5 * s).max(2.0) as i32;
        let beak_h = (1.5 * s).max(1.0) as i32;
        buf.fill_rect(beak_x, beak_y, beak_w, beak_h / 2 + 1, BIRD_BEAK_HI);
        buf.fill_rect(beak_x, beak_y + beak_h / 2 + 1, beak_w, beak_h / 2, BIRD_BEAK);

        // Tail
        let tail_w = (1.5 * s).max(1.0) as i32;
        buf.fill_rect(cx - bw - tail_w, cy - 1 + tilt, tail_w, 2, BIRD_WING);
    }

    fn draw_title(&self, buf: &mut PixelBuf) {
        let cx = self.pw as i32 / 2;
        let ts = self.text_scale();
        let y = self.ph as i32 / 6;
        draw_text_centered(buf, cx, y, "FLAP & TRACK", ts, BIRD_Y);

        let sub_y = (self.sky_h() as f64 * 0.65) as i32;
        draw_text_centered(buf, cx, sub_y, "PRESS SPACE TO PLAY", 1, WHITE);
        if self.best > 0 {
            draw_text_centered(buf, cx, sub_y + 7, &format!("BEST {}", self.best), 1, BIRD_HI);
        }
    }

    fn draw_game_over(&self, buf: &mut PixelBuf) {
        let cx = self.pw as i32 / 2;
        let (px, py, panel_w, panel_h) = self.panel_rect();

        buf.darken();

        draw_text_centered(buf, cx, 1, "SPACE:RETRY S:STATS", 1, WHITE);
        let ts = self.text_scale();
        draw_text_centered(buf, cx, py - 2 - font::GLYPH_H * ts, "GAME OVER", ts, BIRD_Y);

        // Panel
        buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
        buf.fill_rect(px, py, panel_w, panel_h, DIRT);
        buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL);
        draw_text_centered(buf, cx, py + 3, &format!("SCORE {}", self.score), 1, WHITE);
        draw_text_centered(buf, cx, py + 10, &format!("BEST {}", self.best), 1, BIRD_Y);

        draw_button(buf, &self.stats_button(), "STATS");
    }

    fn draw_statistics(&self, buf: &mut PixelBuf) {
        let cx = self.pw as i32 / 2;
        let top = self.stats_top();

        buf.darken();

        draw_text_centered(buf, cx, top, "GAME STATISTICS", 1, BIRD_Y);
        let lines = [
            format!("GAMES PLAYED: {}", self.summary.total_games),
            format!("HIGHEST SCORE: {}", self.summary.highest_score),
            format!("AVERAGE SCORE: {}", self.summary.average_label()),
        ];
        for (i, line) in lines.iter().enumerate() {
            draw_text_centered(buf, cx, top + 9 + i as i32 * 6, line, 1, WHITE);
        }

        draw_button(buf, &self.graphs_button(), "GRAPHS");
        draw_text_centered(buf, cx, top + 40, "ENTER: BACK", 1, WHITE);
    }
}

/// Dark rounded-ish button with a centred label.
fn draw_button(buf: &mut PixelBuf, r: &Rect, label: &str) {
    let (x, y, w, h) = (r.x as i32, r.y as i32, r.w as i32, r.h as i32);
    buf.fill_rect(x + 1, y, w - 2, h, INK);
    buf.fill_rect(x, y + 1, w, h - 2, INK);
    let ly = y + (h - font::GLYPH_H) / 2;
    font::draw_text(buf, x + (w - font::text_width(label, 1)) / 2, ly, label, 1, WHITE);
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::game::Input;

    #[test]
    fn every_phase_draws_without_panicking() {
        for (w, h) in [(80, 48), (32, 24), (200, 120)] {
            let mut buf = PixelBuf::new(w, h);
            let mut g = Game::new(w, h, &PhysicsConfig::default(), 3);
            g.draw(&mut buf);
            g.handle(Input::Flap);
            for _ in 0..300 {
                g.update();
                g.draw(&mut buf);
            }
            assert_eq!(g.phase(), Phase::GameOver);
            g.show_statistics(Default::default());
            g.draw(&mut buf);
        }
    }

    #[test]
    fn pipe_shade_edges_are_dark() {
        assert_eq!(pipe_shade(0, 10), PIPE_L);
        assert_eq!(pipe_shade(0, 1), PIPE_M);
    }

    #[test]
    fn game_over_panel_paints_stats_button() {
        let mut g = Game::new(80, 48, &PhysicsConfig::default(), 3);
        g.handle(Input::Flap);
        for _ in 0..300 {
            g.update();
        }
        assert!(g.panel_visible());
        let mut buf = PixelBuf::new(80, 48);
        g.draw(&mut buf);
        let b = g.stats_button();
        assert_eq!(buf.get(b.x as usize + 1, b.y as usize + 1), INK);
    }
}
