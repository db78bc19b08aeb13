use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use super::app::App;

/// Render the TUI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(8), // Settings
            Constraint::Length(3), // Level meter
            Constraint::Length(4), // Generator counter
            Constraint::Min(0),    // Status / help
            Constraint::Length(3), // Controls
        ])
        .split(frame.size());

    render_title(frame, chunks[0]);
    render_settings(frame, chunks[1], app);
    render_level(frame, chunks[2], app);
    render_counter(frame, chunks[3], app);
    render_status(frame, chunks[4], app);
    render_controls(frame, chunks[5]);
}

/// Render title bar
fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("Pink Pine - Colored Noise Generator")
        .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(title, area);
}

/// Render the settings the engine was built with
fn render_settings(frame: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let row = |name: &'static str, text: String| {
        Line::from(vec![Span::styled(format!("{:<12}", name), label), Span::styled(text, value)])
    };

    let generators = if app.algorithm.uses_generators() {
        app.params.generator_count().to_string()
    } else {
        "unused".to_string()
    };

    let lines = vec![
        row("Algorithm", app.algorithm.description().to_string()),
        row(
            "Volume",
            format!("{} % (amplitude {})", app.params.volume_percent(), app.params.amplitude()),
        ),
        row("Generators", generators),
        row("Device", app.stream.device_name.clone()),
        row(
            "Stream",
            format!(
                "{} Hz, {} ch, {}",
                app.stream.sample_rate, app.stream.channels, app.stream.sample_format
            ),
        ),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().title("Settings").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// Render peak level gauge
fn render_level(frame: &mut Frame, area: Rect, app: &App) {
    let ratio = app.level_of_amplitude();
    let color = if ratio > 0.9 { Color::Red } else { Color::Magenta };

    let gauge = Gauge::default()
        .block(Block::default().title("Peak Level").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .label(format!("{:.0}%", ratio * 100.0))
        .ratio(ratio);

    frame.render_widget(gauge, area);
}

/// Render the generator counter as bits
fn render_counter(frame: &mut Frame, area: Rect, app: &App) {
    let lines = if app.algorithm.uses_generators() {
        vec![
            Line::from(Span::styled(app.counter_bits(), Style::default().fg(Color::Green))),
            Line::from(Span::styled(
                format!("{} / {}", app.counter, app.params.counter_mask()),
                Style::default().fg(Color::Gray),
            )),
        ]
    } else {
        vec![Line::from(Span::styled(
            "White noise does not use the generator counter",
            Style::default().fg(Color::Gray),
        ))]
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Counter").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render stream status, or help when toggled
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let lines = if app.show_help {
        vec![
            Line::from("Voss: each generator is redrawn when its counter bit flips."),
            Line::from("Voss-McCartney: one generator per sample, picked by the"),
            Line::from("counter's trailing zero bits."),
            Line::from("White: one uniform random value per sample."),
        ]
    } else if let Some(err) = &app.last_error {
        vec![Line::from(Span::styled(
            format!("Stream error: {}", err),
            Style::default().fg(Color::Red),
        ))]
    } else if app.reports == 0 {
        vec![Line::from("Waiting for audio...")]
    } else {
        vec![Line::from(Span::styled("Playing", Style::default().fg(Color::Green)))]
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Status").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Render help text
fn render_controls(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new("?: Help  |  Q/Esc: Quit")
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}
