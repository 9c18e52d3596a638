use std::io::Write;

use serde::Serialize;

use super::Renderer;
use crate::error::RenderError;
use crate::stream::VisibleWindow;

#[derive(Debug, Serialize)]
struct Frame<'a> {
    frame: u64,
    x_min: f64,
    x_max: f64,
    times: &'a [f64],
    values: &'a [f64],
}

/// Writes each redraw as one JSON object per line.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    frames: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn draw(&mut self, window: &VisibleWindow) -> Result<(), RenderError> {
        self.frames += 1;
        let frame = Frame {
            frame: self.frames,
            x_min: window.range.0,
            x_max: window.range.1,
            times: &window.times,
            values: &window.values,
        };
        serde_json::to_writer(&mut self.out, &frame)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn one_numbered_frame_per_line() {
        let mut r = JsonLinesRenderer::new(Vec::new());
        let window = VisibleWindow {
            times: vec![1.5, 2.0],
            values: vec![0.25, -0.5],
            range: (0.0, 2.0),
        };
        r.draw(&window).unwrap();
        r.draw(&window).unwrap();

        let out = String::from_utf8(r.into_inner()).unwrap();
        let lines: Vec<Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["frame"], 1);
        assert_eq!(lines[1]["frame"], 2);
        assert_eq!(lines[0]["x_max"], 2.0);
        assert_eq!(lines[0]["times"], serde_json::json!([1.5, 2.0]));
        assert_eq!(lines[0]["values"], serde_json::json!([0.25, -0.5]));
    }
}
