//! Bird physics, pipes, scoring and the menu → playing → game-over →
//! statistics state machine.
//!
//! Everything is in pixel units of the half-block buffer and advances one
//! step per frame. Sizes and speeds are scaled from a 48px tall reference
//! playfield so the game feels the same in any terminal.

mod draw;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::collision::{self, Rect};
use crate::config::PhysicsConfig;
use crate::stats::Summary;

/// Smallest playfield the physics is laid out for.
const MIN_W: usize = 32;
const MIN_H: usize = 24;

/// Frames the bird rests on the ground before the game-over panel shows.
const PANEL_DELAY: u32 = 15;

#[derive(Debug, Clone)]
struct Pipe {
    x: f64,
    gap_center: f64,
    scored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
    Statistics,
}

/// Player intent, already decoded from keys or the mouse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Space / Up: start, flap, or restart.
    Flap,
    /// Enter: leave the statistics screen; flaps elsewhere.
    Confirm,
    /// `S` on the game-over screen.
    ShowStats,
    /// `G` on the statistics screen.
    ShowGraphs,
    /// Left click at a pixel position.
    Click { x: f64, y: f64 },
}

/// Something the surrounding app has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new game began.
    Started,
    Flapped,
    /// A pipe was passed; carries the new score.
    Scored(u32),
    /// The bird hit something; the game is over.
    Crashed { score: u32 },
    /// The statistics screen should be filled via [`Game::show_statistics`].
    StatsRequested,
    DashboardRequested,
}

#[derive(Debug)]
pub struct Game {
    pw: usize, // pixel width
    ph: usize, // pixel height
    bird_y: f64,
    bird_vy: f64,
    pipes: Vec<Pipe>,
    score: u32,
    best: u32,
    phase: Phase,
    frame: u64,
    ground_x: f64,
    landed: bool,
    dead_timer: u32,
    summary: Summary,
    rng: Pcg32,
    tuning: PhysicsConfig,
    // Derived
    scale: f64,
    ground_h: usize,
    pipe_w: usize,
    pipe_gap: usize,
    bird_x: f64,
    gravity: f64,
    flap_vel: f64,
    max_fall: f64,
    pipe_speed: f64,
    pipe_spacing: f64,
}

impl Game {
    pub fn new(pw: usize, ph: usize, tuning: &PhysicsConfig, seed: u64) -> Self {
        Self::build(pw, ph, tuning.clone(), Pcg32::seed_from_u64(seed))
    }

    fn build(pw: usize, ph: usize, tuning: PhysicsConfig, rng: Pcg32) -> Self {
        let pw = pw.max(MIN_W);
        let ph = ph.max(MIN_H);
        let scale = ph as f64 / 48.0;
        let width_scale = (pw as f64 / 80.0).max(0.8);
        let ground_h = (8.0 * scale).max(6.0) as usize;
        let pipe_gap = (tuning.pipe_gap * scale).max(11.0) as usize;
        let pipe_w = (8.0 * scale).clamp(5.0, 14.0) as usize;

        let mut g = Game {
            pw,
            ph,
            bird_y: 0.0,
            bird_vy: 0.0,
            pipes: Vec::new(),
            score: 0,
            best: 0,
            phase: Phase::Menu,
            frame: 0,
            ground_x: 0.0,
            landed: false,
            dead_timer: 0,
            summary: Summary::default(),
            rng,
            scale,
            ground_h,
            pipe_w,
            pipe_gap,
            bird_x: (pw as f64 * 0.22).max(10.0),
            gravity: tuning.gravity * scale,
            flap_vel: tuning.flap_velocity * scale,
            max_fall: tuning.max_fall_speed * scale,
            pipe_speed: tuning.pipe_speed * width_scale,
            pipe_spacing: (pw as f64 * tuning.pipe_spacing).max(28.0),
            tuning,
        };
        g.bird_y = g.rest_y();
        g
    }

    /// Rebuild the world for a new terminal size. A game in progress is
    /// abandoned; the statistics screen survives.
    pub fn resize(&mut self, pw: usize, ph: usize) {
        let phase = match self.phase {
            Phase::Statistics => Phase::Statistics,
            _ => Phase::Menu,
        };
        let rng = self.rng.clone();
        *self = Game {
            best: self.best,
            summary: self.summary,
            phase,
            ..Game::build(pw, ph, self.tuning.clone(), rng)
        };
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Seed the best score, typically from the session log.
    pub fn set_best(&mut self, best: u32) {
        self.best = self.best.max(best);
    }

    fn sky_h(&self) -> usize {
        self.ph - self.ground_h
    }

    fn rest_y(&self) -> f64 {
        self.sky_h() as f64 * 0.4
    }

    fn half_w(&self) -> f64 {
        2.0 * self.scale
    }

    fn half_h(&self) -> f64 {
        1.5 * self.scale
    }

    fn bird_rect(&self) -> Rect {
        Rect::centered(self.bird_x, self.bird_y, self.half_w() * 2.0, self.half_h() * 2.0)
    }

    fn pipe_rects(&self, p: &Pipe) -> [Rect; 2] {
        let w = self.pipe_w as f64;
        let gap_top = p.gap_center - self.pipe_gap as f64 / 2.0;
        let gap_bot = p.gap_center + self.pipe_gap as f64 / 2.0;
        [
            Rect::new(p.x, 0.0, w, gap_top),
            Rect::new(p.x, gap_bot, w, self.sky_h() as f64 - gap_bot),
        ]
    }

    /// True once the bird has landed and the game-over panel is up.
    pub fn panel_visible(&self) -> bool {
        self.phase == Phase::GameOver && self.landed && self.dead_timer > PANEL_DELAY
    }

    fn start(&mut self) -> GameEvent {
        let rng = self.rng.clone();
        *self = Game {
            best: self.best,
            summary: self.summary,
            phase: Phase::Playing,
            ..Game::build(self.pw, self.ph, self.tuning.clone(), rng)
        };
        self.bird_vy = self.flap_vel;
        GameEvent::Started
    }

    pub fn handle(&mut self, input: Input) -> Option<GameEvent> {
        match (self.phase, input) {
            (Phase::Menu, Input::Flap | Input::Confirm) => Some(self.start()),
            (Phase::Playing, Input::Flap | Input::Confirm) => {
                self.bird_vy = self.flap_vel;
                Some(GameEvent::Flapped)
            }
            (Phase::GameOver, Input::Flap | Input::Confirm) if self.panel_visible() => {
                Some(self.start())
            }
            (Phase::GameOver, Input::ShowStats) if self.panel_visible() => {
                Some(GameEvent::StatsRequested)
            }
            (Phase::GameOver, Input::Click { x, y }) if self.panel_visible() => {
                hit(&self.stats_button(), x, y).then_some(GameEvent::StatsRequested)
            }
            (Phase::Statistics, Input::Confirm) => {
                self.phase = Phase::Menu;
                self.bird_y = self.rest_y();
                self.bird_vy = 0.0;
                None
            }
            (Phase::Statistics, Input::ShowGraphs) => Some(GameEvent::DashboardRequested),
            (Phase::Statistics, Input::Click { x, y }) => {
                hit(&self.graphs_button(), x, y).then_some(GameEvent::DashboardRequested)
            }
            _ => None,
        }
    }

    /// Switch to the statistics screen showing `summary`.
    pub fn show_statistics(&mut self, summary: Summary) {
        self.summary = summary;
        self.set_best(summary.highest_score);
        self.phase = Phase::Statistics;
    }

    pub fn update(&mut self) -> Vec<GameEvent> {
        self.frame += 1;
        let mut events = Vec::new();

        match self.phase {
            Phase::Menu | Phase::Statistics => {
                self.bird_y = self.rest_y() + (self.frame as f64 * 0.08).sin() * 3.0 * self.scale;
                self.ground_x += 0.5;
            }
            Phase::Playing => {
                self.fall();
                self.ground_x += self.pipe_speed;

                // Spawn pipes
                let should_spawn = self
                    .pipes
                    .last()
                    .is_none_or(|p| p.x < self.pw as f64 - self.pipe_spacing);
                if should_spawn {
                    let gap_center = self.next_gap_center();
                    self.pipes.push(Pipe {
                        x: self.pw as f64 + 2.0,
                        gap_center,
                        scored: false,
                    });
                }

                // Move pipes
                let bird_left = self.bird_x - self.half_w();
                let half_pipe = self.pipe_w as f64 / 2.0;
                for p in &mut self.pipes {
                    p.x -= self.pipe_speed;
                    if !p.scored && p.x + half_pipe < bird_left {
                        p.scored = true;
                        self.score += 1;
                        events.push(GameEvent::Scored(self.score));
                    }
                }
                let pipe_w = self.pipe_w as f64;
                self.pipes.retain(|p| p.x + pipe_w + 5.0 > 0.0);

                if self.check_collision() {
                    self.phase = Phase::GameOver;
                    self.bird_vy = self.flap_vel * 0.6;
                    self.landed = false;
                    self.dead_timer = 0;
                    self.best = self.best.max(self.score);
                    events.push(GameEvent::Crashed { score: self.score });
                }
            }
            Phase::GameOver => {
                if self.landed {
                    self.dead_timer += 1;
                } else {
                    self.fall();
                    let floor = self.sky_h() as f64 - self.half_h();
                    if self.bird_y >= floor {
                        self.bird_y = floor;
                        self.bird_vy = 0.0;
                        self.landed = true;
                    }
                }
            }
        }
        events
    }

    fn fall(&mut self) {
        self.bird_vy = (self.bird_vy + self.gravity).min(self.max_fall);
        self.bird_y += self.bird_vy;
    }

    /// Gap centre drawn uniformly, keeping 0.7 gap heights of margin at
    /// either end; centred when the sky is too short for that.
    fn next_gap_center(&mut self) -> f64 {
        let sky = self.sky_h() as f64;
        let margin = self.pipe_gap as f64 * 0.7;
        if sky - margin > margin {
            self.rng.random_range(margin..=sky - margin)
        } else {
            sky / 2.0
        }
    }

    fn check_collision(&self) -> bool {
        let obstacles: Vec<Rect> = self.pipes.iter().flat_map(|p| self.pipe_rects(p)).collect();
        collision::hits_world(&self.bird_rect(), &obstacles, self.sky_h() as f64)
    }

    /// Button under the game-over panel.
    fn stats_button(&self) -> Rect {
        let (_, py, _, panel_h) = self.panel_rect();
        let w = crate::font::text_width("STATS", 1) as f64 + 6.0;
        Rect::new(
            (self.pw as f64 - w) / 2.0,
            (py + panel_h + 2) as f64,
            w.round(),
            9.0,
        )
    }

    /// Button on the statistics screen.
    fn graphs_button(&self) -> Rect {
        let top = self.stats_top();
        let w = crate::font::text_width("GRAPHS", 1) as f64 + 6.0;
        Rect::new((self.pw as f64 - w) / 2.0, (top + 29) as f64, w.round(), 9.0)
    }

    /// Game-over panel as (x, y, w, h).
    fn panel_rect(&self) -> (i32, i32, i32, i32) {
        let panel_w = (40.0 * self.scale).max(30.0) as i32;
        let panel_h = (16.0 * self.scale).max(16.0) as i32;
        let px = self.pw as i32 / 2 - panel_w / 2;
        let py = self.ph as i32 / 2 - panel_h / 2;
        (px, py, panel_w, panel_h)
    }

    /// Top of the statistics block, which is 45px tall.
    fn stats_top(&self) -> i32 {
        ((self.ph as i32 - 45) / 2).max(0)
    }
}

/// A cell covers two pixels, so a click also counts for the pixel below.
fn hit(r: &Rect, x: f64, y: f64) -> bool {
    r.contains(x, y) || r.contains(x, y + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(80, 48, &PhysicsConfig::default(), 7)
    }

    fn run_until_crash(g: &mut Game, max_frames: usize) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..max_frames {
            all.extend(g.update());
            if g.phase() != Phase::Playing {
                break;
            }
        }
        all
    }

    fn land(g: &mut Game) {
        for _ in 0..200 {
            g.update();
            if g.panel_visible() {
                return;
            }
        }
        panic!("game-over panel never appeared");
    }

    #[test]
    fn starts_in_menu_and_flap_starts_play() {
        let mut g = game();
        assert_eq!(g.phase(), Phase::Menu);
        assert_eq!(g.handle(Input::Flap), Some(GameEvent::Started));
        assert_eq!(g.phase(), Phase::Playing);
        assert!(g.bird_vy < 0.0);
    }

    #[test]
    fn flapping_sets_upward_velocity() {
        let mut g = game();
        g.handle(Input::Flap);
        for _ in 0..10 {
            g.update();
        }
        assert_eq!(g.handle(Input::Flap), Some(GameEvent::Flapped));
        assert_eq!(g.bird_vy, g.flap_vel);
    }

    #[test]
    fn falling_is_capped() {
        let mut g = game();
        g.handle(Input::Flap);
        g.bird_y = 2.0;
        g.bird_vy = 0.0;
        g.pipes.clear();
        for _ in 0..12 {
            g.update();
            assert!(g.bird_vy <= g.max_fall);
        }
    }

    #[test]
    fn free_fall_crashes_into_ground_once() {
        let mut g = game();
        g.handle(Input::Flap);
        let events = run_until_crash(&mut g, 500);
        assert_eq!(g.phase(), Phase::GameOver);
        let crashes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Crashed { .. }))
            .collect();
        assert_eq!(crashes, [&GameEvent::Crashed { score: 0 }]);

        // Further frames never crash again
        for _ in 0..100 {
            assert!(g.update().is_empty());
        }
    }

    #[test]
    fn ceiling_is_fatal() {
        let mut g = game();
        g.handle(Input::Flap);
        g.bird_y = 1.0;
        let events = g.update();
        assert!(events.contains(&GameEvent::Crashed { score: 0 }));
    }

    #[test]
    fn pipe_body_is_fatal() {
        let mut g = game();
        g.handle(Input::Flap);
        g.bird_vy = 0.0;
        g.gravity = 0.0;
        // Gap far below the bird
        g.pipes.push(Pipe {
            x: g.bird_x - 2.0,
            gap_center: g.sky_h() as f64 - 10.0,
            scored: false,
        });
        let events = g.update();
        assert!(events.contains(&GameEvent::Crashed { score: 0 }));
    }

    #[test]
    fn passing_a_pipe_scores_exactly_once() {
        let mut g = game();
        g.handle(Input::Flap);
        g.bird_vy = 0.0;
        g.gravity = 0.0;
        g.pipes.push(Pipe {
            x: g.bird_x + 4.0,
            gap_center: g.bird_y,
            scored: false,
        });

        let mut scored = Vec::new();
        for _ in 0..20 {
            for e in g.update() {
                if let GameEvent::Scored(n) = e {
                    scored.push(n);
                }
            }
            assert_eq!(g.phase(), Phase::Playing);
        }
        assert_eq!(scored, [1]);
        assert_eq!(g.score(), 1);
    }

    #[test]
    fn gap_centres_respect_margins() {
        let mut g = game();
        let sky = g.sky_h() as f64;
        let margin = g.pipe_gap as f64 * 0.7;
        for _ in 0..200 {
            let c = g.next_gap_center();
            assert!(c >= margin && c <= sky - margin);
        }
    }

    #[test]
    fn same_seed_same_pipes() {
        let mut a = game();
        let mut b = game();
        let xs: Vec<f64> = (0..20).map(|_| a.next_gap_center()).collect();
        let ys: Vec<f64> = (0..20).map(|_| b.next_gap_center()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn offscreen_pipes_are_dropped() {
        let mut g = game();
        g.handle(Input::Flap);
        g.gravity = 0.0;
        g.bird_vy = 0.0;
        g.pipes.push(Pipe {
            x: -20.0,
            gap_center: g.bird_y,
            scored: true,
        });
        g.update();
        assert!(g.pipes.iter().all(|p| p.x > -20.0));
    }

    #[test]
    fn restart_waits_for_panel() {
        let mut g = game();
        g.handle(Input::Flap);
        run_until_crash(&mut g, 500);
        assert_eq!(g.handle(Input::Flap), None);
        land(&mut g);
        assert_eq!(g.handle(Input::Flap), Some(GameEvent::Started));
        assert_eq!(g.phase(), Phase::Playing);
        assert_eq!(g.score(), 0);
        assert!(g.pipes.is_empty());
    }

    #[test]
    fn crash_raises_best() {
        let mut g = game();
        g.set_best(3);
        g.handle(Input::Flap);
        g.score = 5;
        g.bird_y = 1.0;
        g.update();
        assert_eq!(g.best(), 5);
    }

    #[test]
    fn stats_key_and_button_request_statistics() {
        let mut g = game();
        g.handle(Input::Flap);
        run_until_crash(&mut g, 500);
        land(&mut g);
        assert_eq!(g.handle(Input::ShowStats), Some(GameEvent::StatsRequested));

        let b = g.stats_button();
        let click = Input::Click {
            x: b.x + 1.0,
            y: b.y + 1.0,
        };
        assert_eq!(g.handle(click), Some(GameEvent::StatsRequested));
        assert_eq!(g.handle(Input::Click { x: 0.0, y: 0.0 }), None);
    }

    #[test]
    fn statistics_screen_flow() {
        let mut g = game();
        let summary = Summary {
            total_games: 4,
            highest_score: 9,
            average_score: 4.5,
        };
        g.show_statistics(summary);
        assert_eq!(g.phase(), Phase::Statistics);
        assert_eq!(g.best(), 9);
        assert_eq!(g.handle(Input::ShowGraphs), Some(GameEvent::DashboardRequested));

        let b = g.graphs_button();
        let click = Input::Click {
            x: b.x + 2.0,
            y: b.y,
        };
        assert_eq!(g.handle(click), Some(GameEvent::DashboardRequested));

        assert_eq!(g.handle(Input::Confirm), None);
        assert_eq!(g.phase(), Phase::Menu);
    }

    #[test]
    fn stats_key_ignored_outside_game_over() {
        let mut g = game();
        assert_eq!(g.handle(Input::ShowStats), None);
        assert_eq!(g.handle(Input::ShowGraphs), None);
        assert_eq!(g.phase(), Phase::Menu);
    }

    #[test]
    fn resize_abandons_play_but_keeps_best() {
        let mut g = game();
        g.set_best(11);
        g.handle(Input::Flap);
        g.resize(120, 80);
        assert_eq!(g.phase(), Phase::Menu);
        assert_eq!(g.best(), 11);
        assert_eq!(g.pw, 120);
    }

    #[test]
    fn tiny_terminal_is_clamped() {
        let g = Game::new(4, 4, &PhysicsConfig::default(), 1);
        assert!(g.sky_h() > 0);
        assert!(g.rest_y() > 0.0);
    }
}
