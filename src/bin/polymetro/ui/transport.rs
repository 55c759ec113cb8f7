//! Transport bar widget - shows run state, tempos, elapsed time and realignment

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Everything the transport bar displays
pub struct TransportInfo {
    pub running: bool,
    pub voice_count: usize,
    pub tempo_min_bpm: f64,
    pub tempo_max_bpm: f64,
    pub elapsed_ms: f64,
    pub realignment_ms: Option<f64>,
    pub downbeat: bool,
    pub status: Option<String>,
}

/// Format milliseconds as mm:ss.ss
fn clock_time(ms: f64) -> String {
    let secs = ms.max(0.0) / 1000.0;
    format!("{:02}:{:05.2}", (secs / 60.0).floor() as u64, secs % 60.0)
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, info: &TransportInfo) {
    let block = Block::default().title(" polymetro ").borders(Borders::ALL);

    let play_symbol = if info.running { "▶" } else { "■" };
    let play_state_str = if info.running { "Running" } else { "Stopped" };

    let mut spans = vec![
        Span::styled(
            format!(" {} {}  ", play_symbol, play_state_str),
            Style::default().fg(if info.running {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!(
                "{} voices  {:.1}-{:.1} BPM  ",
                info.voice_count, info.tempo_min_bpm, info.tempo_max_bpm
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{}  ", clock_time(info.elapsed_ms)),
            Style::default().fg(Color::White),
        ),
    ];

    if let Some(realign) = info.realignment_ms {
        let remaining = realign - info.elapsed_ms.max(0.0).rem_euclid(realign);
        spans.push(Span::styled(
            format!("realign in {}  ", clock_time(remaining)),
            Style::default().fg(Color::DarkGray),
        ));
    }

    spans.push(Span::styled(
        "●",
        Style::default().fg(if info.downbeat {
            Color::Red
        } else {
            Color::DarkGray
        }),
    ));

    if let Some(status) = &info.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::Magenta),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
