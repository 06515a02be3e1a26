//! Terminal adapter: translates the render/overlay/dropdown models into
//! ratatui widgets. No application logic lives here.

use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::App;
use crate::render::RenderModel;
use crate::search::Overlay;
use crate::suggest::{SuggestController, SuggestState};
use crate::units::{MENU_ROWS, MenuRow, UnitsMenu};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

pub fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn muted() -> Style {
    Style::new().fg(Color::DarkGray)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_search_bar(frame, chunks[0], app);
    draw_body(frame, chunks[1], app);
    draw_footer(frame, chunks[2]);

    if app.suggest().is_visible() {
        draw_dropdown(frame, chunks[1], app.suggest());
    }
    if app.units_menu().is_open() {
        draw_units_menu(frame, chunks[1], app.units_menu());
    }
    if let Some(overlay) = app.orchestrator().overlay() {
        draw_overlay(frame, frame.area(), overlay);
    }
}

fn draw_search_bar(frame: &mut Frame, area: Rect, app: &App) {
    let input = Paragraph::new(app.input()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search for a place"),
    );
    frame.render_widget(input, area);
}

fn draw_body(frame: &mut Frame, area: Rect, app: &App) {
    if app.orchestrator().is_loading() {
        let loading = Paragraph::new("Loading…")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(loading, area);
        return;
    }

    let Some(view) = app.orchestrator().view() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    draw_current_panel(frame, chunks[0], view);
    draw_hourly_strip(frame, chunks[1], view);
    draw_daily_cards(frame, chunks[2], view);
}

fn draw_current_panel(frame: &mut Frame, area: Rect, view: &RenderModel) {
    let lines = vec![
        Line::from(Span::styled(
            view.place_label.clone(),
            Style::new().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(view.date_line.clone(), muted())),
        Line::default(),
        Line::from(vec![
            Span::styled(
                view.temperature.clone(),
                Style::new().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(view.icon.clone()),
            Span::raw(" "),
            Span::raw(view.condition.clone()),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("Feels like ", muted()),
            Span::raw(view.feels_like.clone()),
            Span::styled("   Humidity ", muted()),
            Span::raw(view.humidity.clone()),
            Span::styled("   Wind ", muted()),
            Span::raw(view.wind.clone()),
            Span::styled("   Precipitation ", muted()),
            Span::raw(view.precipitation.clone()),
        ]),
    ];

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn draw_hourly_strip(frame: &mut Frame, area: Rect, view: &RenderModel) {
    let mut spans = Vec::new();
    for entry in &view.hourly {
        spans.push(Span::styled(format!("{} ", entry.time), muted()));
        spans.push(Span::raw(format!("{}  ", entry.temperature)));
    }

    let strip = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Next hours"),
    );
    frame.render_widget(strip, area);
}

fn draw_daily_cards(frame: &mut Frame, area: Rect, view: &RenderModel) {
    let block = Block::default().borders(Borders::ALL).title("Daily");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.daily.is_empty() {
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, view.daily.len() as u32);
            view.daily.len()
        ])
        .split(inner);

    for (card, column) in view.daily.iter().zip(columns.iter()) {
        let lines = vec![
            Line::from(card.weekday.clone()).alignment(Alignment::Center),
            Line::from(card.icon.clone()).alignment(Alignment::Center),
            Line::from(card.temps.clone()).alignment(Alignment::Center),
        ];
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

fn draw_dropdown(frame: &mut Frame, body: Rect, suggest: &SuggestController) {
    let lines: Vec<Line> = match suggest.state() {
        SuggestState::Searching { query } => vec![
            Line::from(format!("Searching for \"{query}\"")),
            Line::from(Span::styled("Search in progress", muted())),
        ],
        SuggestState::Empty => vec![Line::from("No suggestions")],
        _ => suggest
            .places()
            .iter()
            .enumerate()
            .map(|(index, place)| {
                let row = format!(
                    "{}  {:.2}, {:.2}",
                    place.label(),
                    place.latitude,
                    place.longitude
                );
                if suggest.cursor() == Some(index) {
                    Line::from(Span::styled(
                        row,
                        Style::new().add_modifier(Modifier::REVERSED),
                    ))
                } else {
                    Line::from(row)
                }
            })
            .collect(),
    };

    let height = (lines.len() as u16 + 2).min(body.height);
    let area = Rect {
        x: body.x,
        y: body.y,
        width: body.width.min(60),
        height,
    };

    frame.render_widget(Clear, area);
    let dropdown = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(dropdown, area);
}

fn draw_units_menu(frame: &mut Frame, body: Rect, menu: &UnitsMenu) {
    let mut lines = Vec::new();
    let mut previous_section: Option<&str> = None;

    for (index, row) in MENU_ROWS.iter().enumerate() {
        let (section, label) = match row {
            MenuRow::Switch => (None, menu.switch_label().to_string()),
            MenuRow::Temperature(unit) => (Some("Temperature"), unit.menu_label().to_string()),
            MenuRow::WindSpeed(unit) => (Some("Wind Speed"), unit.menu_label().to_string()),
            MenuRow::Precipitation(unit) => {
                (Some("Precipitation"), unit.menu_label().to_string())
            }
        };

        if section != previous_section {
            if let Some(title) = section {
                lines.push(Line::from(Span::styled(title, muted())));
            }
            previous_section = section;
        }

        let marker = if menu.is_selected(*row) { "✓ " } else { "  " };
        let mut style = Style::new();
        if menu.cursor() == index {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(Span::styled(format!("{marker}{label}"), style)));
    }

    let width = 28u16.min(body.width);
    let area = Rect {
        x: body.x + body.width.saturating_sub(width),
        y: body.y,
        width,
        height: (lines.len() as u16 + 2).min(body.height),
    };

    frame.render_widget(Clear, area);
    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Units"));
    frame.render_widget(widget, area);
}

fn draw_overlay(frame: &mut Frame, area: Rect, overlay: &Overlay) {
    let popup = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            overlay.title.clone(),
            Style::new().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(overlay.message.clone(), muted())).alignment(Alignment::Center),
        Line::default(),
        Line::from("[ Press Enter to retry ]").alignment(Alignment::Center),
    ];

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, popup);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Span::styled(
        "Enter search · ↑/↓ pick suggestion · Tab units · Esc dismiss · Ctrl-C quit",
        muted(),
    ));
    frame.render_widget(footer, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
