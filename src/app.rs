//! Terminal front end: owns the screen, turns key and mouse events into
//! game input, and reacts to game events by logging sessions, loading
//! statistics and opening the dashboard.

use std::io::{self, Stdout, Write, stdout};
use std::time::Instant;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::{cursor, execute, terminal};
use tracing::{debug, error, info};

use crate::audio::{Audio, Cue};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::game::{Game, GameEvent, Input, Phase};
use crate::render::PixelBuf;
use crate::sessions::{SessionLog, SessionRecord};
use crate::stats::Summary;

/// Raw mode on the alternate screen for as long as it lives.
#[derive(Debug)]
pub struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
            EnableMouseCapture,
        )?;
        Ok(Self { out })
    }

    pub fn out(&mut self) -> &mut Stdout {
        &mut self.out
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// What a key press means in the current phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Game(Input),
    Ignore,
}

pub fn map_key(key: KeyEvent, phase: Phase) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q' | 'Q') => Action::Quit,
        KeyCode::Esc if phase == Phase::Statistics => Action::Game(Input::Confirm),
        KeyCode::Esc => Action::Quit,
        KeyCode::Char(' ') | KeyCode::Up => Action::Game(Input::Flap),
        KeyCode::Enter => Action::Game(Input::Confirm),
        KeyCode::Char('s' | 'S') => Action::Game(Input::ShowStats),
        KeyCode::Char('g' | 'G') => Action::Game(Input::ShowGraphs),
        _ => Action::Ignore,
    }
}

/// Left clicks only; a terminal row is two pixels tall.
pub fn map_mouse(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::Game(Input::Click {
            x: f64::from(mouse.column),
            y: f64::from(mouse.row) * 2.0,
        }),
        _ => Action::Ignore,
    }
}

/// Game state plus everything that outlives a single round.
#[derive(Debug)]
pub struct App {
    game: Game,
    log: SessionLog,
    audio: Audio,
    started: Option<Instant>,
}

impl App {
    /// The best score is seeded from the log so it survives restarts.
    pub fn new(mut game: Game, log: SessionLog, audio: Audio) -> Self {
        let best = Summary::from_records(&log.read_all_or_empty()).highest_score;
        game.set_best(best);
        Self {
            game,
            log,
            audio,
            started: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Apply one game event. Returns true when the dashboard should open.
    pub fn react(&mut self, event: GameEvent) -> bool {
        match event {
            GameEvent::Started => {
                self.started = Some(Instant::now());
                self.audio.play(Cue::Flap);
            }
            GameEvent::Flapped => self.audio.play(Cue::Flap),
            GameEvent::Scored(score) => {
                debug!(score, "pipe passed");
                self.audio.play(Cue::Score);
            }
            GameEvent::Crashed { score } => {
                self.audio.play(Cue::Crash);
                self.record(score);
            }
            GameEvent::StatsRequested => {
                let summary = Summary::from_records(&self.log.read_all_or_empty());
                debug!(?summary, "showing statistics");
                self.game.show_statistics(summary);
            }
            GameEvent::DashboardRequested => return true,
        }
        false
    }

    /// Called on quit: a game still in the air is logged as it stands.
    pub fn finish(&mut self) {
        if self.game.phase() == Phase::Playing {
            info!(score = self.game.score(), "quit during a game");
            self.record(self.game.score());
        }
    }

    fn record(&mut self, score: u32) {
        let Some(started) = self.started.take() else {
            return;
        };
        let record = SessionRecord::new(score, started.elapsed());
        if let Err(e) = self.log.append(&record) {
            error!(error = %e, path = %self.log.path().display(), "failed to log game");
        }
    }

    fn dashboard(&self) -> Dashboard {
        Dashboard::from_records(&self.log.read_all_or_empty())
    }
}

/// Run the game until the player quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be driven.
pub fn run_game(config: &Config, seed: u64, mute: bool) -> Result<()> {
    let log = SessionLog::new(config.session_log_path());
    let audio = Audio::open(&config.audio, mute);
    info!(seed, log = %log.path().display(), "starting game");

    let mut session = TerminalSession::enter()?;
    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::for_terminal(cols, rows);
    let game = Game::new(buf.width(), buf.height(), &config.physics, seed);
    let mut app = App::new(game, log, audio);

    let frame_dur = config.frame_duration();

    loop {
        let frame_start = Instant::now();

        // Input
        let mut open_dashboard = false;
        while event::poll(std::time::Duration::ZERO)? {
            let action = match event::read()? {
                Event::Key(key) => map_key(key, app.game().phase()),
                Event::Mouse(mouse) => map_mouse(mouse),
                Event::Resize(c, r) => {
                    buf.resize(c as usize, r as usize * 2);
                    app.game_mut().resize(buf.width(), buf.height());
                    Action::Ignore
                }
                _ => Action::Ignore,
            };
            match action {
                Action::Quit => {
                    app.finish();
                    info!("bye");
                    return Ok(());
                }
                Action::Game(input) => {
                    if let Some(ev) = app.game_mut().handle(input) {
                        open_dashboard |= app.react(ev);
                    }
                }
                Action::Ignore => {}
            }
        }

        if open_dashboard {
            app.dashboard().run(session.out())?;
            // The terminal may have been resized meanwhile
            let (cols, rows) = terminal::size()?;
            if (cols as usize, rows as usize * 2) != (buf.width(), buf.height()) {
                buf.resize(cols as usize, rows as usize * 2);
                app.game_mut().resize(buf.width(), buf.height());
            }
        }

        // Update
        for ev in app.game_mut().update() {
            app.react(ev);
        }

        // Render
        app.game().draw(&mut buf);
        buf.render(session.out())?;
        session.out().flush()?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

/// Show the dashboard on its own.
///
/// # Errors
///
/// Returns an error if the log is malformed or the terminal cannot be driven.
pub fn run_dashboard(config: &Config) -> Result<()> {
    let log = SessionLog::new(config.session_log_path());
    let dashboard = Dashboard::from_records(&log.read_all()?);
    info!(games = dashboard.summary().total_games, "opening dashboard");

    let mut session = TerminalSession::enter()?;
    dashboard.run(session.out())?;
    Ok(())
}
