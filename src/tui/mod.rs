//! Ratatui-based terminal dashboard.
//!
//! The TUI provides a form for the six editable applicant fields, then shows
//! the decision, the probability of default, and a contribution bar chart for
//! the current applicant. Every edit re-runs the full scoring pipeline
//! synchronously, so the displayed explanation always matches the displayed
//! score.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, RunOutput};
use crate::cli::ScoreArgs;
use crate::domain::{Applicant, Checking, CreditHistory, Decision, Savings};
use crate::error::AppError;
use crate::io::artifact::Artifacts;

mod plotters_chart;

use plotters_chart::ContributionChart;

const FIELD_COUNT: usize = 6;

/// Start the TUI.
pub fn run(args: ScoreArgs) -> Result<(), AppError> {
    let config = crate::app::score_config_from_args(&args);
    let artifacts = pipeline::load_artifacts(&config)?;
    let applicant = pipeline::resolve_applicant(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(artifacts, applicant, config.seed, config.top_n);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    artifacts: Artifacts,
    applicant: Applicant,
    selected_field: usize,
    seed: u64,
    top_n: usize,
    status: String,
    run: Option<RunOutput>,
    pending_score: bool,
}

impl App {
    fn new(artifacts: Artifacts, applicant: Applicant, seed: u64, top_n: usize) -> Self {
        Self {
            artifacts,
            applicant,
            selected_field: 0,
            seed,
            top_n,
            status: String::new(),
            run: None,
            pending_score: true,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            // Draw a "working" frame before the synchronous pipeline run so
            // slow explanations don't leave a stale screen behind.
            if self.pending_score {
                self.status = "Scoring applicant...".to_string();
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                self.rescore()?;
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_COUNT - 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => {
                self.seed = self.seed.wrapping_add(1);
                self.applicant = crate::data::sample::random_applicant(self.seed)?;
                self.pending_score = true;
            }
            KeyCode::Char('d') => {
                self.applicant = Applicant::default();
                self.pending_score = true;
            }
            KeyCode::Enter => {
                self.pending_score = true;
            }
            _ => {}
        }

        Ok(false)
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => self.applicant.checking = cycle(&Checking::ALL, self.applicant.checking, delta),
            1 => {
                self.applicant.duration_months =
                    step_u32(self.applicant.duration_months, delta, 1, 4, 72);
            }
            2 => {
                self.applicant.credit_amount =
                    step_u32(self.applicant.credit_amount, delta, 100, 250, 20_000);
            }
            3 => self.applicant.history = cycle(&CreditHistory::ALL, self.applicant.history, delta),
            4 => self.applicant.savings = cycle(&Savings::ALL, self.applicant.savings, delta),
            5 => self.applicant.age = step_u32(self.applicant.age, delta, 1, 19, 75),
            _ => {}
        }
        self.pending_score = true;
    }

    fn rescore(&mut self) -> Result<(), AppError> {
        let run = pipeline::run_score(&self.applicant, &self.artifacts)?;
        self.status = format!(
            "{} | p(default)={:.1}%",
            run.score.decision.display_name(),
            run.score.probability_of_default * 100.0
        );
        if !run.alignment.dropped.is_empty() {
            self.status
                .push_str(&format!(" | {} column(s) unknown to schema", run.alignment.dropped.len()));
        }
        self.run = Some(run);
        self.pending_score = false;
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(size);

        self.draw_form(frame, chunks[0]);
        self.draw_result(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FIELD_COUNT as u16 + 2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let rows: [(&str, String); FIELD_COUNT] = [
            ("Checking", self.applicant.checking.label().to_string()),
            ("Duration", format!("{} months", self.applicant.duration_months)),
            ("Amount", format!("{} DM", self.applicant.credit_amount)),
            ("History", self.applicant.history.label().to_string()),
            ("Savings", self.applicant.savings.label().to_string()),
            ("Age", format!("{} years", self.applicant.age)),
        ];

        let mut lines: Vec<Line> = Vec::new();
        for (i, (label, value)) in rows.iter().enumerate() {
            let style = if i == self.selected_field {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!("{label:<10} {value}"), style)));
        }

        let form = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Applicant").borders(Borders::ALL));
        frame.render_widget(form, chunks[0]);

        self.draw_decision(frame, chunks[1]);

        let help = Paragraph::new("↑/↓ field | ←/→ change | r random | d defaults | q quit")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[2]);
    }

    fn draw_decision(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Prediction").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line> = Vec::new();
        if let Some(run) = &self.run {
            let (label, color) = match run.score.decision {
                Decision::Approved => ("APPROVED", Color::Green),
                Decision::Rejected => ("REJECTED", Color::Red),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!(
                "p(default) = {:.1}%",
                run.score.probability_of_default * 100.0
            )));
            lines.push(Line::from(format!(
                "margin = {:+.3} (baseline {:+.3})",
                run.attribution.raw_margin, run.attribution.baseline
            )));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            self.status.clone(),
            Style::default().fg(Color::Yellow),
        )));

        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let hint = Paragraph::new(
            "Red bars push the applicant toward default; blue bars pull away from it.\n\
             Bar length is the feature's share of the log-odds for this applicant.",
        )
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().title("How to read").borders(Borders::ALL));
        frame.render_widget(hint, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Why (local attribution)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for first score...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let bars: Vec<(String, f64)> = run
            .attribution
            .ranked()
            .iter()
            .take(self.top_n)
            .map(|c| (crate::report::truncate_name(&c.name, 26), c.contribution))
            .collect();

        frame.render_widget(ContributionChart { bars: &bars }, inner);
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, delta: i32) -> T {
    let len = all.len() as i32;
    let idx = all.iter().position(|v| *v == current).unwrap_or(0) as i32;
    all[(idx + delta).rem_euclid(len) as usize]
}

fn step_u32(current: u32, delta: i32, step: u32, min: u32, max: u32) -> u32 {
    let next = if delta >= 0 {
        current.saturating_add(step)
    } else {
        current.saturating_sub(step)
    };
    next.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_both_directions() {
        assert_eq!(cycle(&Checking::ALL, Checking::NoAccount, 1), Checking::Overdrawn);
        assert_eq!(cycle(&Checking::ALL, Checking::Overdrawn, -1), Checking::NoAccount);
        assert_eq!(cycle(&Savings::ALL, Savings::Mid, 1), Savings::High);
    }

    #[test]
    fn step_respects_bounds() {
        assert_eq!(step_u32(72, 1, 1, 4, 72), 72);
        assert_eq!(step_u32(4, -1, 1, 4, 72), 4);
        assert_eq!(step_u32(300, -1, 100, 250, 20_000), 250);
        assert_eq!(step_u32(300, 1, 100, 250, 20_000), 400);
    }
}
