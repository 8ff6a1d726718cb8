//! Plotters-powered contribution chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `BarChart` widget?
//! - horizontal bars with a shared zero axis
//! - nicer axis + tick rendering
//! - easy to extend later (annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// Bars are magnitude-ranked top to bottom; all data prep happens outside the
/// render call, which keeps `render()` focused on drawing.
pub struct ContributionChart<'a> {
    /// `(label, contribution)` pairs, strongest first.
    pub bars: &'a [(String, f64)],
}

impl<'a> Widget for ContributionChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 30 || area.height < 8 || self.bars.is_empty() {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let n = self.bars.len();
        let max_mag = self
            .bars
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max)
            .max(1e-9);
        let x0 = -max_mag * 1.15;
        let x1 = max_mag * 1.15;

        let labels: Vec<String> = self.bars.iter().map(|(name, _)| name.clone()).collect();
        let values: Vec<f64> = self.bars.iter().map(|(_, v)| *v).collect();

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Terminal cells are low-res, so keep label areas compact but
                // leave room for the long one-hot column names on the left.
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 28)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, -0.5..(n as f64 - 0.5))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("contribution (log-odds)")
                .x_labels(5)
                .y_labels(n)
                .x_label_formatter(&|v| format!("{v:+.2}"))
                .y_label_formatter(&|v| {
                    // Row 0 is drawn at the top (highest y), so invert.
                    let i = (n as f64 - 1.0 - v).round() as usize;
                    labels.get(i).cloned().unwrap_or_default()
                })
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Keep the palette high-contrast for terminal readability: red
            // pushes toward default, blue pulls away.
            let risk_up = RGBColor(255, 80, 80);
            let risk_down = RGBColor(80, 140, 255);

            chart.draw_series(values.iter().enumerate().map(|(i, &value)| {
                let y = n as f64 - 1.0 - i as f64;
                let color = if value >= 0.0 { risk_up } else { risk_down };
                let (lo, hi) = if value >= 0.0 { (0.0, value) } else { (value, 0.0) };
                Rectangle::new([(lo, y - 0.35), (hi, y + 0.35)], color.filled())
            }))?;

            // Zero axis.
            chart.draw_series(LineSeries::new(
                [(0.0, -0.5), (0.0, n as f64 - 0.5)],
                &WHITE,
            ))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
