//! Plotters-powered price chart widget for Ratatui.
//!
//! Plotters handles axes, ticks, and line drawing better than Ratatui's
//! built-in `Chart`, and leaves room for legends or PNG/SVG export later.
//! Output lands in the Ratatui buffer via `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only description of one chart frame.
///
/// Series and bounds are computed by the caller; `render()` only draws. That
/// keeps the data prep (epoch-day conversion, bound padding) testable without
/// a terminal.
pub struct PriceChart<'a> {
    /// Close series for the primary ticker.
    pub primary: &'a [(f64, f64)],
    /// Close series for the comparison ticker (empty when none is selected).
    pub compare: &'a [(f64, f64)],
    /// X bounds (epoch days).
    pub x_bounds: [f64; 2],
    /// Y bounds (close price).
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for PriceChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters can fail to build a chart in a tiny area; show a hint
        // instead of panicking mid-draw.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // The `widget_fn` helper wraps the backend's Canvas plumbing, so this
        // code never touches its internal types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are too noisy at terminal resolution; axes and tick
            // labels carry enough structure on their own.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Cyan primary, crimson overlay: high contrast on dark terminals
            // and the two closes stay distinguishable on one chart.
            let primary_color = RGBColor(0, 255, 255);
            let compare_color = RGBColor(220, 20, 60);

            chart.draw_series(LineSeries::new(self.primary.iter().copied(), &primary_color))?;
            if !self.compare.is_empty() {
                chart.draw_series(LineSeries::new(self.compare.iter().copied(), &compare_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
