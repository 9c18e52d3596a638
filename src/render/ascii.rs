use std::io::Write;

use super::Renderer;
use crate::config::DisplayConfig;
use crate::error::RenderError;
use crate::stream::VisibleWindow;

/// Plots the window as a character grid with a fixed y range.
/// Points outside the range are pinned to the edge as `^` / `v`.
pub struct AsciiChartRenderer<W: Write> {
    out: W,
    title: String,
    x_label: String,
    y_label: String,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
}

impl<W: Write> AsciiChartRenderer<W> {
    pub fn new(cfg: &DisplayConfig, out: W) -> Self {
        Self {
            out,
            title: cfg.title.clone(),
            x_label: cfg.x_label.clone(),
            y_label: cfg.y_label.clone(),
            y_min: cfg.y_min,
            y_max: cfg.y_max,
            width: cfg.width.max(2),
            height: cfg.height.max(2),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render_chart(&self, window: &VisibleWindow) -> String {
        let (x_lo, x_hi) = window.range;
        let x_span = x_hi - x_lo;
        let y_span = self.y_max - self.y_min;

        let mut grid = vec![vec![' '; self.width]; self.height];
        for (&t, &v) in window.times.iter().zip(&window.values) {
            if t < x_lo || t > x_hi {
                continue;
            }
            let col = if x_span > 0.0 {
                ((t - x_lo) / x_span * (self.width - 1) as f64).round() as usize
            } else {
                self.width - 1
            };

            let (row, mark) = if v > self.y_max {
                (0, '^')
            } else if v < self.y_min {
                (self.height - 1, 'v')
            } else {
                let r = ((self.y_max - v) / y_span * (self.height - 1) as f64).round() as usize;
                (r, '*')
            };
            grid[row.min(self.height - 1)][col.min(self.width - 1)] = mark;
        }

        let mut chart = format!("{}\n{}\n", self.title, self.y_label);
        let mid = self.height / 2;
        for (i, row) in grid.iter().enumerate() {
            let label = if i == 0 {
                format!("{:>9.4}", self.y_max)
            } else if i == self.height - 1 {
                format!("{:>9.4}", self.y_min)
            } else if i == mid {
                format!("{:>9.4}", (self.y_max + self.y_min) / 2.0)
            } else {
                " ".repeat(9)
            };
            let line: String = row.iter().collect();
            chart.push_str(&format!("{} |{}\n", label, line.trim_end()));
        }

        chart.push_str(&format!("{} +{}\n", " ".repeat(9), "-".repeat(self.width)));
        let lo = format!("{:.1}", x_lo);
        let hi = format!("{:.1}", x_hi);
        let gap = self.width.saturating_sub(lo.len() + hi.len());
        chart.push_str(&format!("{}  {}{}{}  {}\n", " ".repeat(9), lo, " ".repeat(gap), hi, self.x_label));

        if window.is_empty() {
            chart.push_str("   (No samples in window yet)\n");
        }
        chart
    }
}

impl<W: Write> Renderer for AsciiChartRenderer<W> {
    fn draw(&mut self, window: &VisibleWindow) -> Result<(), RenderError> {
        let chart = self.render_chart(window);
        self.out.write_all(chart.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
