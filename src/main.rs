use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};
use tracing::{error, info};

use combine_comps::config::{Config, app_cache_dir};
use combine_comps::logging;
use combine_comps::pipeline::{self, CombineData};
use combine_comps::records::{CanonicalPlayerRecord, Measurement, REQUIRED_FEATURES};
use combine_comps::state::{DashboardState, Outcome, TopEntry};

struct App {
    data: CombineData,
    state: DashboardState,
    should_quit: bool,
}

impl App {
    fn new(data: CombineData, config: &Config) -> Self {
        Self {
            data,
            state: DashboardState::new(config.top_k).with_filter(config.ranking_filter),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Tab | KeyCode::Down => self.state.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.state.focus_prev(),
            KeyCode::Char('j') => self.state.select_next(),
            KeyCode::Char('k') => self.state.select_prev(),
            KeyCode::Char(c) => self.state.push_char(c),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Esc => self.state.clear_inputs(),
            KeyCode::Enter => {
                self.state.submit(&self.data.table);
                info!(outcome = outcome_label(&self.state.outcome), "comparison submitted");
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    if let Some(dir) = app_cache_dir() {
        logging::init_file_logging(&config.log_filter, &dir.join("dashboard.log"))?;
    }

    println!("Loading draft combine data...");
    let data = pipeline::build_from_config(&config)?;
    for err in &data.errors {
        error!("{err}");
    }
    info!(
        players = data.table.len(),
        seasons = data.seasons_loaded,
        "dashboard data ready"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(data, &config);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(40)])
        .split(chunks[1]);
    render_inputs(frame, body[0], &app.state);
    render_results(frame, body[1], &app.state);

    let footer = Paragraph::new(
        "Tab/↑/↓ Field | Enter Compare | j/k Select | Esc Clear | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let mut text = format!(
        "DRAFT COMBINE COMPS | {} players | {} seasons | top {}",
        app.data.table.len(),
        app.data.seasons_loaded,
        app.state.top_k
    );
    let filter = &app.state.filter;
    if let Some(pick) = filter.max_draft_pick {
        text.push_str(&format!(" | pick <= {pick}"));
    }
    if let Some(minutes) = filter.min_minutes_played {
        text.push_str(&format!(" | min >= {minutes}"));
    }
    text
}

fn render_inputs(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let mut lines: Vec<Line> = Vec::new();
    for (idx, feature) in REQUIRED_FEATURES.iter().enumerate() {
        let focused = idx == state.focus;
        let style = if focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        let value = if state.inputs[idx].is_empty() && !focused {
            "-".to_string()
        } else {
            state.inputs[idx].clone()
        };
        lines.push(Line::from(format!("{:<18}", feature.label())));
        lines.push(Line::from(Span::styled(format!(" {value:<12}"), style)));
        lines.push(Line::from(""));
    }
    let form = Paragraph::new(lines).block(Block::default().title("Query").borders(Borders::ALL));
    frame.render_widget(form, area);
}

fn render_results(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let block = Block::default().title("Closest players").borders(Borders::ALL);
    match &state.outcome {
        Outcome::Idle => {
            let msg = Paragraph::new("Enter five measurements and press Enter")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(msg, area);
        }
        Outcome::NeedsInput { missing } => {
            let names = missing
                .iter()
                .map(|f| f.label())
                .collect::<Vec<_>>()
                .join(", ");
            let msg = Paragraph::new(format!("Provide all five measurements (missing: {names})"))
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
        }
        Outcome::NoCandidates => {
            let msg = Paragraph::new("No players to compare against")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(msg, area);
        }
        Outcome::Ranked {
            top,
            averages,
            total,
        } => {
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(top.len() as u16 + 3),
                    Constraint::Min(6),
                    Constraint::Length(8),
                ])
                .split(area);
            render_top_table(frame, sections[0], top, state.selected, *total);
            render_detail(frame, sections[1], state.selected_entry().map(|e| &e.record));
            let avg_text = averages
                .iter()
                .map(|a| {
                    let value = a.mean.map_or("-".to_string(), |v| format!("{v:.2}"));
                    format!("{:<18}{value}", a.measurement.label())
                })
                .collect::<Vec<_>>();
            let half = avg_text.len().div_ceil(2);
            let rows = (0..half)
                .map(|i| {
                    let right = avg_text.get(i + half).cloned().unwrap_or_default();
                    format!("{:<30}{right}", avg_text[i])
                })
                .collect::<Vec<_>>()
                .join("\n");
            let avg = Paragraph::new(rows)
                .block(Block::default().title("Top averages").borders(Borders::ALL));
            frame.render_widget(avg, sections[2]);
        }
    }
}

fn render_top_table(frame: &mut Frame, area: Rect, top: &[TopEntry], selected: usize, total: usize) {
    let rows = top.iter().enumerate().map(|(idx, entry)| {
        let style = if idx == selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let p = &entry.record;
        Row::new(vec![
            format!("{}", idx + 1),
            p.player_name.clone(),
            p.season.label().to_string(),
            p.position.clone().unwrap_or_else(|| "-".to_string()),
            format!("{:.3}", entry.distance),
        ])
        .style(style)
    });
    let widths = [
        Constraint::Length(3),
        Constraint::Min(18),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Player", "Season", "Pos", "Distance"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title(format!("Closest players ({total} ranked)"))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn render_detail(frame: &mut Frame, area: Rect, record: Option<&CanonicalPlayerRecord>) {
    let block = Block::default().title("Player").borders(Borders::ALL);
    let Some(p) = record else {
        frame.render_widget(block, area);
        return;
    };
    let mut lines = vec![format!(
        "{}  {}  seasons: {}",
        p.player_name,
        p.position.as_deref().unwrap_or("-"),
        p.seasons
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    )];
    if let Some(ft_in) = p.height_wo_shoes_ft_in.as_deref() {
        lines.push(format!("Height w/o shoes {ft_in}"));
    }
    for m in Measurement::ALL {
        let value = p
            .measurement(m)
            .map_or("-".to_string(), |v| format!("{v:.2}"));
        lines.push(format!("{:<18}{value}", m.label()));
    }
    if let Some(pick) = p.attributes.draft_pick {
        lines.push(format!("{:<18}{pick}", "Draft pick"));
    }
    let detail = Paragraph::new(lines.join("\n")).block(block);
    frame.render_widget(detail, area);
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Idle => "idle",
        Outcome::NeedsInput { .. } => "needs_input",
        Outcome::NoCandidates => "no_candidates",
        Outcome::Ranked { .. } => "ranked",
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Draft Combine Comps - Help",
        "",
        "Query:",
        "  Tab / ↓      Next field",
        "  Shift-Tab / ↑ Previous field",
        "  0-9 .        Type a measurement (inches)",
        "  Backspace    Delete",
        "  Enter        Compare",
        "  Esc          Clear all fields",
        "",
        "Results:",
        "  j / k        Select player",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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
