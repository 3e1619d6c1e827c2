use activity_monitor::{Monitor, MonitorConfig, SliderRange, APP_DESCRIPTION, APP_TITLE};
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
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

/// Notches moved by PageUp/PageDown
const FAST_STEPS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Threshold,
    Spending,
}

impl Focus {
    pub fn toggle(&self) -> Self {
        match self {
            Focus::Threshold => Focus::Spending,
            Focus::Spending => Focus::Threshold,
        }
    }
}

pub struct App {
    monitor: Monitor,
    threshold_range: SliderRange,
    spending_range: SliderRange,
    pub threshold_km: f64,
    pub spending_limit: f64,
    pub focus: Focus,
    pub report: String,
}

impl App {
    pub fn new(monitor: Monitor, config: &MonitorConfig) -> Self {
        let mut app = Self {
            monitor,
            threshold_range: config.threshold_range,
            spending_range: config.spending_range,
            threshold_km: config.threshold_range.clamp(config.default_threshold_km),
            spending_limit: config.spending_range.clamp(config.default_spending_limit),
            focus: Focus::Threshold,
            report: String::new(),
        };
        app.refresh();
        app
    }

    /// Re-run the analysis with the current slider values
    pub fn refresh(&mut self) {
        self.report = self
            .monitor
            .run_analysis(self.threshold_km, self.spending_limit);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggle();
    }

    /// Move the focused slider; the report follows immediately
    pub fn adjust(&mut self, steps: i32) {
        match self.focus {
            Focus::Threshold => {
                self.threshold_km = self.threshold_range.step_by(self.threshold_km, steps)
            }
            Focus::Spending => {
                self.spending_limit = self.spending_range.step_by(self.spending_limit, steps)
            }
        }
        self.refresh();
    }

    pub fn jump_to_min(&mut self) {
        match self.focus {
            Focus::Threshold => self.threshold_km = self.threshold_range.min,
            Focus::Spending => self.spending_limit = self.spending_range.min,
        }
        self.refresh();
    }

    pub fn jump_to_max(&mut self) {
        match self.focus {
            Focus::Threshold => self.threshold_km = self.threshold_range.max,
            Focus::Spending => self.spending_limit = self.spending_range.max,
        }
        self.refresh();
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

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

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    app.toggle_focus()
                }
                KeyCode::Char('k') | KeyCode::Char('j') => app.toggle_focus(),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => app.adjust(1),
                KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => app.adjust(-1),
                KeyCode::PageUp => app.adjust(FAST_STEPS),
                KeyCode::PageDown => app.adjust(-FAST_STEPS),
                KeyCode::Home => app.jump_to_min(),
                KeyCode::End => app.jump_to_max(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title + description
            Constraint::Length(3), // Threshold slider
            Constraint::Length(3), // Spending slider
            Constraint::Min(3),    // Report
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_slider(
        f,
        chunks[1],
        "Threshold Distance (km)",
        app.threshold_range.ratio(app.threshold_km),
        format!("{:.0} km", app.threshold_km),
        app.focus == Focus::Threshold,
    );
    render_slider(
        f,
        chunks[2],
        "Spending Limit (USD)",
        app.spending_range.ratio(app.spending_limit),
        format!("${:.0}", app.spending_limit),
        app.focus == Focus::Spending,
    );
    render_report(f, chunks[3], app);
    render_status_bar(f, chunks[4]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            APP_TITLE,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(APP_DESCRIPTION, Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::BOTTOM));

    f.render_widget(header, area);
}

fn render_slider(
    f: &mut Frame,
    area: Rect,
    title: &str,
    ratio: f64,
    label: String,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title.to_string()),
        )
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(ratio)
        .label(label);

    f.render_widget(gauge, area);
}

fn render_report(f: &mut Frame, area: Rect, app: &App) {
    let color = if app.report.starts_with("An error occurred") {
        Color::Red
    } else if app.report == activity_monitor::ALL_CLEAR_MESSAGE {
        Color::Green
    } else {
        Color::Yellow
    };

    let lines: Vec<Line> = app
        .report
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(color))))
        .collect();

    let report = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title("Output"),
        );

    f.render_widget(report, area);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let status_spans = vec![
        Span::styled(" Tab/↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Slider | "),
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" Adjust | "),
        Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)),
        Span::raw(" Fast | "),
        Span::styled("Home/End", Style::default().fg(Color::Yellow)),
        Span::raw(" Min/Max | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_monitor::{HomeCoordinate, SampleSource};

    fn app() -> App {
        let config = MonitorConfig::default();
        let monitor = Monitor::new(Box::new(SampleSource), HomeCoordinate::default());
        App::new(monitor, &config)
    }

    #[test]
    fn test_initial_report_uses_defaults() {
        let app = app();

        assert_eq!(app.threshold_km, 20.0);
        assert_eq!(app.spending_limit, 500.0);
        assert_eq!(
            app.report,
            "Unusual locations detected: 1 entries.\nSuspicious transactions detected: 1 entries."
        );
    }

    #[test]
    fn test_sliders_update_report_live() {
        let mut app = app();

        app.jump_to_max();
        assert_eq!(app.threshold_km, 100.0);
        assert_eq!(app.report, "Suspicious transactions detected: 1 entries.");

        app.toggle_focus();
        app.adjust(2);
        assert_eq!(app.spending_limit, 600.0);
        assert_eq!(app.report, "No unusual activities detected.");
    }

    #[test]
    fn test_sliders_stay_in_range() {
        let mut app = app();

        app.adjust(-FAST_STEPS * 10);
        assert_eq!(app.threshold_km, 1.0);

        app.toggle_focus();
        app.jump_to_min();
        app.adjust(-1);
        assert_eq!(app.spending_limit, 0.0);
    }
}
