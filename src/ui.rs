use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use instrument_timeline::{Instrument, InstrumentType, PlaybackMode, PlaybackSequencer, Snapshot};

/// How often the event loop wakes up to poll the sequencer when no key is
/// pressed. Small enough that auto-advance never lags noticeably.
const TICK: Duration = Duration::from_millis(200);

pub struct App {
    pub scenario_label: String,
    pub sequencer: PlaybackSequencer,
    pub instrument_state: TableState,
}

impl App {
    pub fn new(scenario_label: String, sequencer: PlaybackSequencer) -> Self {
        let mut instrument_state = TableState::default();
        if sequencer.current().map_or(false, |s| !s.instruments.is_empty()) {
            instrument_state.select(Some(0));
        }
        Self {
            scenario_label,
            sequencer,
            instrument_state,
        }
    }

    fn current_snapshot(&self) -> Option<&Snapshot> {
        self.sequencer.current()
    }

    fn selected_instrument(&self) -> Option<&Instrument> {
        let snapshot = self.current_snapshot()?;
        self.instrument_state
            .selected()
            .and_then(|i| snapshot.instruments.get(i))
    }

    /// Clamp the instrument selection after the snapshot changed.
    fn reset_selection(&mut self) {
        let count = self.current_snapshot().map_or(0, |s| s.instruments.len());
        if count == 0 {
            self.instrument_state.select(None);
        } else {
            let selected = self.instrument_state.selected().unwrap_or(0);
            self.instrument_state.select(Some(selected.min(count - 1)));
        }
    }

    fn select_next_instrument(&mut self) {
        let count = self.current_snapshot().map_or(0, |s| s.instruments.len());
        if count == 0 {
            return;
        }
        let next = self.instrument_state.selected().map_or(0, |i| (i + 1) % count);
        self.instrument_state.select(Some(next));
    }

    fn select_previous_instrument(&mut self) {
        let count = self.current_snapshot().map_or(0, |s| s.instruments.len());
        if count == 0 {
            return;
        }
        let prev = self
            .instrument_state
            .selected()
            .map_or(0, |i| (i + count - 1) % count);
        self.instrument_state.select(Some(prev));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Wake up for keys or for the next scheduled advancement,
        // whichever comes first
        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
                        app.sequencer.next();
                        app.reset_selection();
                    }
                    KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                        app.sequencer.prev();
                        app.reset_selection();
                    }
                    KeyCode::Char(' ') => {
                        app.sequencer.toggle(Instant::now());
                    }
                    KeyCode::Home => {
                        app.sequencer.go_to(0);
                        app.reset_selection();
                    }
                    KeyCode::End => {
                        app.sequencer.go_to(-1);
                        app.reset_selection();
                    }
                    KeyCode::Down | KeyCode::Char('j') => app.select_next_instrument(),
                    KeyCode::Up | KeyCode::Char('k') => app.select_previous_instrument(),
                    _ => {}
                }
            }
        }

        if app.sequencer.poll(Instant::now()) {
            app.reset_selection();
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55), // Instrument list
            Constraint::Percentage(45), // Version detail
        ])
        .split(chunks[1]);

    render_instruments(f, content_chunks[0], app);
    render_versions(f, content_chunks[1], app);

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let position = format!(
        "{}/{}",
        app.sequencer.active_index() + 1,
        app.sequencer.len()
    );

    let (mode_text, mode_color) = match app.sequencer.mode() {
        PlaybackMode::Playing => ("▶ playing", Color::Green),
        PlaybackMode::Stopped => ("■ stopped", Color::Yellow),
        PlaybackMode::Idle => ("idle", Color::DarkGray),
    };

    let mut spans = vec![
        Span::styled(
            app.scenario_label.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(format!("Snapshot {position}"), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(mode_text, Style::default().fg(mode_color)),
    ];

    if let Some((from, to)) = app.current_snapshot().and_then(|s| s.date_span()) {
        let span_text = match to {
            Some(to) => format!("{from} → {to}"),
            None => format!("{from} → open ended"),
        };
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(span_text, Style::default().fg(Color::Cyan)));
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn type_color(instrument_type: &InstrumentType) -> Color {
    match instrument_type {
        InstrumentType::Regeling => Color::Green,
        InstrumentType::InformatieObject => Color::Magenta,
        InstrumentType::Onbekend | InstrumentType::Other(_) => Color::White,
    }
}

fn render_instruments(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Instrument", "Type", "Versions"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let empty = Vec::new();
    let instruments = app
        .current_snapshot()
        .map(|s| &s.instruments)
        .unwrap_or(&empty);

    let rows = instruments.iter().map(|instrument| {
        let color = type_color(&instrument.instrument_type);
        Row::new(vec![
            Cell::from(truncate(&instrument.display_name, 40)),
            Cell::from(instrument.instrument_type.as_str().to_string())
                .style(Style::default().fg(color)),
            Cell::from(instrument.versions.len().to_string()),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(30),
            Constraint::Length(18),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Instruments "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.instrument_state);
}

fn render_versions(f: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["Version", "Valid from", "Valid to", "Status"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let (title, rows): (String, Vec<Row>) = match app.selected_instrument() {
        Some(instrument) => {
            let rows = instrument
                .versions
                .iter()
                .map(|version| {
                    let number = version
                        .version_number
                        .map_or_else(|| "v?".to_string(), |n| format!("v{n}"));
                    let valid_to = version
                        .valid_to
                        .map_or_else(|| "open ended".to_string(), |d| d.to_string());
                    let style = if version.on_timeline {
                        Style::default()
                    } else {
                        // Off-timeline versions are shown but dimmed
                        Style::default().fg(Color::DarkGray)
                    };
                    Row::new(vec![
                        Cell::from(number),
                        Cell::from(version.valid_from.to_string()),
                        Cell::from(valid_to),
                        Cell::from(version.status.clone().unwrap_or_default()),
                    ])
                    .style(style)
                    .height(1)
                })
                .collect();
            (format!(" {} ", instrument.display_name), rows)
        }
        None => (" Versions ".to_string(), Vec::new()),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(truncate(&title, 48)),
    );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let meta_line = app
        .current_snapshot()
        .map(|s| s.meta.summary_lines().join("  •  "))
        .unwrap_or_else(|| "no snapshot loaded".to_string());

    let status = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            " ←/→ navigate  space play/pause  ↑/↓ select  q quit ",
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled(truncate(&meta_line, 120), Style::default().fg(Color::DarkGray)),
    ])])
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(status, area);
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let cut: String = value.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
