//! Status screen: device line, keyboard row, voices and output level

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use polykey::synth::{InstrumentKind, KeyLayout, Note};
use polykey::OutputSettings;

/// Everything one frame shows. Borrowed from the control loop.
pub struct Status<'a> {
    pub device: &'a str,
    pub settings: &'a OutputSettings,
    pub instrument: InstrumentKind,
    pub layout: &'a KeyLayout,
    pub notes: &'a [Note],
    /// Audio time in seconds.
    pub time: f64,
    /// Recent output peak, before clipping.
    pub level: f32,
    pub releases: bool,
}

pub fn render(frame: &mut Frame, status: &Status) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Device bar
            Constraint::Length(3), // Keyboard
            Constraint::Length(3), // Level
            Constraint::Min(0),
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_device(frame, chunks[0], status);
    render_keys(frame, chunks[1], status);
    render_level(frame, chunks[2], status.level);

    let input = if status.releases {
        "key releases"
    } else {
        "hold timeout"
    };
    let help = Paragraph::new(format!(" [Esc] Quit  input: {input}"))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}

fn render_device(frame: &mut Frame, area: Rect, status: &Status) {
    let settings = status.settings;
    let line = Line::from(vec![
        Span::styled(
            format!(" {}  ", status.instrument),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{}  ", status.device),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "{:.1}kHz {}ch {}bit  ",
                settings.sample_rate as f64 / 1000.0,
                settings.channels,
                settings.bit_depth
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("notes: {}  t={:.2}s", status.notes.len(), status.time),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let block = Block::default().title(" polykey ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_keys(frame: &mut Frame, area: Rect, status: &Status) {
    let spans: Vec<Span> = status
        .layout
        .iter()
        .map(|(key, id)| {
            let note = status.notes.iter().find(|n| n.id == id);
            let style = match note {
                Some(n) if n.is_held() => Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                // releasing
                Some(_) => Style::default().fg(Color::Yellow),
                None => Style::default().fg(Color::Gray),
            };
            Span::styled(format!(" {key} "), style)
        })
        .collect();

    let block = Block::default().title(" Keys ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_level(frame: &mut Frame, area: Rect, level: f32) {
    let color = if level > 1.0 { Color::Red } else { Color::Magenta };
    let gauge = Gauge::default()
        .block(Block::default().title(" Level ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(f64::from(level).clamp(0.0, 1.0))
        .label(format!("{level:.2}"));
    frame.render_widget(gauge, area);
}
