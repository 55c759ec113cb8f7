//! TUI module for polymetro
//!
//! Drives the ensemble once per redraw and paints its rings.

mod rings;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use std::time::Duration;

use polymetro::{ensemble::DEFAULT_STAGE_SIZE, sound::SoundEngine, Ensemble};

use rings::{render_rings, RingCanvas};
use transport::{render_transport, TransportInfo};

/// UI application state
pub struct UiApp<E: SoundEngine> {
    /// The ensemble being played (owned by this loop)
    ensemble: Ensemble<E>,
    /// Rings from the latest tick
    canvas: RingCanvas,
    /// Elapsed time of the latest tick
    elapsed_ms: f64,
    /// Last error reported by a key action
    status: Option<String>,
    /// Whether the app should quit
    should_quit: bool,
}

impl<E: SoundEngine> UiApp<E> {
    /// Create a new UI application
    pub fn new(ensemble: Ensemble<E>) -> Self {
        let stage_size = ensemble
            .config()
            .map(|config| config.stage_size)
            .unwrap_or(DEFAULT_STAGE_SIZE);
        Self {
            ensemble,
            canvas: RingCanvas::new(stage_size),
            elapsed_ms: 0.0,
            status: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            // Advance the ensemble one frame
            if let Some(frame) = self.ensemble.render_tick(&mut self.canvas)? {
                self.elapsed_ms = frame.elapsed_ms;
            }

            // Draw the UI
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        if self.ensemble.is_running() {
            self.ensemble.stop()?;
        }
        Ok(())
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.toggle(),
            _ => {}
        }
    }

    /// Start or stop the ensemble
    fn toggle(&mut self) {
        let result = if self.ensemble.is_running() {
            let result = self.ensemble.stop();
            self.canvas.reset();
            self.elapsed_ms = 0.0;
            result
        } else {
            self.ensemble.start()
        };

        self.status = match result {
            Ok(()) => None,
            Err(err) => {
                log::error!("{}", err);
                Some(err.to_string())
            }
        };
    }

    fn transport_info(&self) -> TransportInfo {
        let tempos = self.ensemble.voice_configs().iter().map(|v| v.tempo_bpm);
        let tempo_min_bpm = tempos.clone().fold(f64::INFINITY, f64::min);
        let tempo_max_bpm = tempos.fold(f64::NEG_INFINITY, f64::max);

        TransportInfo {
            running: self.ensemble.is_running(),
            voice_count: self.ensemble.voice_configs().len(),
            tempo_min_bpm,
            tempo_max_bpm,
            elapsed_ms: self.elapsed_ms,
            realignment_ms: self.ensemble.realignment_ms(),
            downbeat: self.canvas.downbeat_lit(),
            status: self.status.clone(),
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: transport, rings, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(10),   // Rings
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.transport_info());
        render_rings(frame, chunks[1], &self.canvas);

        let help = Paragraph::new(" [Q] Quit  [Space] Start/Stop")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
