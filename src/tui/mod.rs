//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a ticker, timeframe, and
//! optional comparison ticker, then renders the close-price chart and the
//! company/metrics/analyst sidebar.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Terminal,
};

use chrono::{Datelike, NaiveDate};

use crate::app::normalize_symbol;
use crate::cli::{picker, ViewArgs};
use crate::data::{load_tickers, YahooClient};
use crate::domain::{DashConfig, DashboardData, TickerBundle};
use crate::error::AppError;
use crate::report;
use crate::timeframe::Timeframe;

mod plotters_chart;

use plotters_chart::PriceChart;

/// Start the TUI.
pub fn run(args: ViewArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args)?;
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

/// Which text field an `Enter` press is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditTarget {
    Symbol,
    Compare,
}

struct App {
    universe: Vec<String>,
    config: DashConfig,
    client: YahooClient,
    data: Option<DashboardData>,
    selected_field: usize,
    editing: Option<EditTarget>,
    input: String,
    status: String,
}

impl App {
    fn new(args: ViewArgs) -> Result<Self, AppError> {
        let universe = load_tickers(&args.tickers)?;
        let symbol = args
            .symbol
            .as_deref()
            .map(normalize_symbol)
            .or_else(|| universe.first().cloned())
            .ok_or_else(|| AppError::new(2, "Ticker universe is empty."))?;

        let config = DashConfig {
            symbol,
            compare: args.compare.as_deref().map(normalize_symbol),
            timeframe: args.timeframe,
        };

        let client = YahooClient::new()?;
        let mut app = Self {
            universe,
            config,
            client,
            data: None,
            selected_field: 0,
            editing: None,
            input: String::new(),
            status: "Fetching...".to_string(),
        };
        app.refresh();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
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

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_text_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 2 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => match self.selected_field {
                0 => {
                    self.editing = Some(EditTarget::Symbol);
                    self.input.clear();
                    self.status = "Editing symbol. Enter to apply, Esc to cancel.".to_string();
                }
                2 => {
                    self.editing = Some(EditTarget::Compare);
                    self.input.clear();
                    self.status =
                        "Editing comparison (blank clears). Enter to apply, Esc to cancel.".to_string();
                }
                _ => {}
            },
            KeyCode::Char('x') => {
                if self.config.compare.take().is_some() {
                    self.refresh();
                    self.status = "Comparison cleared.".to_string();
                }
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }

        false
    }

    fn handle_text_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let target = self.editing.take();
                self.apply_text_input(target);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=') {
                    self.input.push(c.to_ascii_uppercase());
                }
            }
            _ => {}
        }
    }

    fn apply_text_input(&mut self, target: Option<EditTarget>) {
        let typed = self.input.trim().to_string();
        match target {
            Some(EditTarget::Symbol) => {
                let Some(symbol) = picker::resolve_symbol(&self.universe, &typed) else {
                    self.status = "Symbol unchanged.".to_string();
                    return;
                };
                self.config.symbol = symbol;
                self.refresh();
            }
            Some(EditTarget::Compare) => {
                self.config.compare = picker::resolve_symbol(&self.universe, &typed);
                self.refresh();
            }
            None => {}
        }
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.selected_field {
            0 => {
                self.config.symbol = cycle_symbol(&self.universe, &self.config.symbol, delta);
                self.refresh();
            }
            1 => {
                self.config.timeframe = if delta >= 0 {
                    self.config.timeframe.next()
                } else {
                    self.config.timeframe.prev()
                };
                self.refresh();
            }
            2 => {
                self.config.compare =
                    cycle_compare(&self.universe, self.config.compare.as_deref(), delta);
                self.refresh();
            }
            _ => {}
        }
    }

    /// Re-run the dashboard pipeline with the current selection.
    ///
    /// Fetch failures land in the status line and keep the previous data on
    /// screen, so a typo'd symbol or a network blip doesn't tear the UI down.
    fn refresh(&mut self) {
        self.status = format!("Fetching {}...", self.config.symbol);
        match crate::app::pipeline::run_dashboard(&self.client, &self.config) {
            Ok(data) => {
                let n = data.primary.series.points.len();
                self.status = format!(
                    "{} | {} | {} point(s)",
                    data.primary.symbol,
                    data.timeframe.label(),
                    n
                );
                self.data = Some(data);
            }
            Err(err) => {
                self.status = format!("Fetch failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(5), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_settings(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("qd", Style::default().fg(Color::Cyan)),
            Span::raw(" — stock details dashboard"),
        ]));

        let compare_label = self.config.compare.as_deref().unwrap_or("-");
        let window = self
            .data
            .as_ref()
            .map(|d| {
                format!(
                    "{} to {}",
                    d.range.start.format("%Y-%m-%d"),
                    d.range.end.format("%Y-%m-%d")
                )
            })
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "symbol: {} | timeframe: {} | window: {window} | compare: {compare_label}",
                self.config.symbol,
                self.config.timeframe.label(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(data) = &self.data {
            let mut parts = vec![data.primary.title()];
            if let Some(pct) = data.primary.series.window_change_pct() {
                parts.push(format!("{pct:+.2}% over window"));
            }
            lines.push(Line::from(Span::styled(
                parts.join(" | "),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(46)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_sidebar(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match &self.config.compare {
            Some(compare) => format!("{} vs {}", self.config.symbol, compare),
            None => format!("{} Close", self.config.symbol),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let mut inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        // The 1D window is empty whenever the market has not traded yet, so
        // reserve a line to say so instead of showing a bare chart.
        if self.config.timeframe == Timeframe::D1 && inner.height > 1 {
            let note_rect = Rect {
                x: inner.x,
                y: inner.y + inner.height - 1,
                width: inner.width,
                height: 1,
            };
            frame.render_widget(
                Paragraph::new(report::ONE_DAY_NOTE).style(Style::default().fg(Color::DarkGray)),
                note_rect,
            );
            inner.height -= 1;
        }

        let Some(data) = &self.data else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        if data.primary.series.is_empty() {
            let msg = Paragraph::new("No price data in the selected window.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let (primary, compare, x_bounds, y_bounds) = chart_series(data);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PriceChart {
            primary: &primary,
            compare: &compare,
            x_bounds,
            y_bounds,
            x_label: "date",
            y_label: "close",
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_price,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Details").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(data) = &self.data else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let mut lines = bundle_lines(&data.primary);
        if let Some(compare) = &data.compare {
            lines.push(Line::raw(""));
            lines.extend(bundle_lines(compare));
        }

        let p = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
        frame.render_widget(p, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let compare_label = self.config.compare.as_deref().unwrap_or("-");

        let mut items = Vec::new();
        items.push(ListItem::new(format!("Symbol: {}", self.config.symbol)));
        items.push(ListItem::new(format!(
            "Timeframe: {}",
            self.config.timeframe.label()
        )));
        items.push(ListItem::new(format!("Compare: {compare_label}")));

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing.is_some() {
            let hint = Paragraph::new(format!("> {}", self.input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  x clear compare  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Sidebar lines for one ticker: title, facts, metrics, recent actions, and
/// the consensus sentence when one exists.
fn bundle_lines(bundle: &TickerBundle) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::Gray);
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        bundle.title(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));

    for raw in report::format_company_info(&bundle.info).lines() {
        lines.push(Line::raw(raw.to_string()));
    }
    lines.push(Line::raw(""));
    for raw in report::format_key_metrics(&bundle.metrics).lines() {
        lines.push(Line::raw(raw.to_string()));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Recent analyst actions", label_style)));
    if bundle.recent_grades.is_empty() {
        lines.push(Line::raw("No analyst actions on record."));
    }
    for grade in bundle.recent_grades.iter().take(6) {
        lines.push(Line::raw(format!(
            "{} {}: {} -> {}",
            grade.date.format("%Y-%m-%d"),
            grade.firm,
            grade.from_grade,
            grade.to_grade
        )));
    }

    if let Some(consensus) = &bundle.consensus {
        lines.push(Line::raw(""));
        lines.push(Line::raw(report::format_consensus(consensus)));
    }

    lines
}

/// Build chart series for Plotters. X values are epoch days so the tick
/// formatter can recover calendar dates.
fn chart_series(data: &DashboardData) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let primary = close_points(&data.primary);
    let compare = data
        .compare
        .as_ref()
        .map(close_points)
        .unwrap_or_default();

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in primary.iter().chain(compare.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let x_bounds = [x_min, x_max];
    let y_bounds = [y_min - pad, y_max + pad];

    (primary, compare, x_bounds, y_bounds)
}

fn close_points(bundle: &TickerBundle) -> Vec<(f64, f64)> {
    bundle
        .series
        .points
        .iter()
        .map(|p| (f64::from(p.date.num_days_from_ce()), p.close))
        .collect()
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d %b %y").to_string())
        .unwrap_or_default()
}

fn fmt_axis_price(v: f64) -> String {
    format!("{v:.2}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_date(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_price(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("close")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

/// Step to the next/previous universe symbol relative to `current`.
///
/// A symbol outside the universe (typed free-form) starts cycling from the
/// top of the list.
fn cycle_symbol(universe: &[String], current: &str, delta: i64) -> String {
    if universe.is_empty() {
        return current.to_string();
    }
    let len = universe.len() as i64;
    let next = match universe.iter().position(|s| s.eq_ignore_ascii_case(current)) {
        Some(idx) => (idx as i64 + delta).rem_euclid(len),
        None => 0,
    };
    universe[next as usize].clone()
}

/// Cycle the comparison selection through `None` plus every universe symbol.
fn cycle_compare(universe: &[String], current: Option<&str>, delta: i64) -> Option<String> {
    if universe.is_empty() {
        return None;
    }
    let len = universe.len() as i64;
    // Positions: 0 = none, 1..=len = universe index + 1.
    let pos = match current {
        None => 0,
        Some(symbol) => universe
            .iter()
            .position(|s| s.eq_ignore_ascii_case(symbol))
            .map(|idx| idx as i64 + 1)
            .unwrap_or(0),
    };
    let next = (pos + delta).rem_euclid(len + 1);
    if next == 0 {
        None
    } else {
        Some(universe[(next - 1) as usize].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Vec<String> {
        vec!["AAPL".to_string(), "MSFT".to_string(), "NVDA".to_string()]
    }

    #[test]
    fn cycle_symbol_wraps_both_directions() {
        assert_eq!(cycle_symbol(&universe(), "AAPL", 1), "MSFT");
        assert_eq!(cycle_symbol(&universe(), "NVDA", 1), "AAPL");
        assert_eq!(cycle_symbol(&universe(), "AAPL", -1), "NVDA");
    }

    #[test]
    fn cycle_symbol_from_unknown_starts_at_top() {
        assert_eq!(cycle_symbol(&universe(), "ZZZZ", 1), "AAPL");
    }

    #[test]
    fn cycle_compare_passes_through_none() {
        assert_eq!(cycle_compare(&universe(), None, 1).as_deref(), Some("AAPL"));
        assert_eq!(
            cycle_compare(&universe(), Some("NVDA"), 1).as_deref(),
            None
        );
        assert_eq!(
            cycle_compare(&universe(), None, -1).as_deref(),
            Some("NVDA")
        );
    }

    #[test]
    fn axis_date_formatting_round_trips() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let label = fmt_axis_date(f64::from(date.num_days_from_ce()));
        assert_eq!(label, "14 Jun 24");
    }
}
