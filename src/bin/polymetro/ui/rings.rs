//! Ring canvas - paints ensemble frames with braille circles

use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle},
        Block, Borders,
    },
    Frame,
};

use polymetro::{
    color::Rgb,
    render::{RenderError, Renderer},
};

/// How long the downbeat marker stays lit
const DOWNBEAT_FLASH: Duration = Duration::from_millis(150);

struct RingShape {
    x: f64,
    y: f64,
    radius: f64,
    color: Color,
}

/// Terminal drawing surface for the ensemble.
///
/// Rings are collected during a tick and drawn on the next terminal redraw.
/// Terminal cells have no stroke width, so every ring is one braille dot wide.
pub struct RingCanvas {
    rings: Vec<RingShape>,
    stage_size: f64,
    downbeat_at: Option<Instant>,
}

impl RingCanvas {
    pub fn new(stage_size: f64) -> Self {
        Self {
            rings: Vec::new(),
            stage_size,
            downbeat_at: None,
        }
    }

    /// Whether the reference voice sounded recently
    pub fn downbeat_lit(&self) -> bool {
        self.downbeat_at
            .is_some_and(|at| at.elapsed() < DOWNBEAT_FLASH)
    }

    /// Forget the last frame (used when the ensemble stops)
    pub fn reset(&mut self) {
        self.rings.clear();
        self.downbeat_at = None;
    }
}

impl Renderer for RingCanvas {
    fn clear_frame(&mut self) -> Result<(), RenderError> {
        self.rings.clear();
        Ok(())
    }

    fn draw_ring(
        &mut self,
        center_x: f64,
        center_y: f64,
        radius: f64,
        _stroke_width: f64,
        color: Rgb,
        alpha: f64,
    ) -> Result<(), RenderError> {
        // Fully faded rings are black on black
        if alpha <= 0.0 {
            return Ok(());
        }
        let shaded = color.over_black(alpha);
        self.rings.push(RingShape {
            x: center_x,
            // Canvas y grows upwards
            y: self.stage_size - center_y,
            radius,
            color: Color::Rgb(shaded.r, shaded.g, shaded.b),
        });
        Ok(())
    }

    fn mark_downbeat(&mut self) -> Result<(), RenderError> {
        self.downbeat_at = Some(Instant::now());
        Ok(())
    }
}

/// Render the collected rings
pub fn render_rings(frame: &mut Frame, area: Rect, rings: &RingCanvas) {
    let canvas = Canvas::default()
        .block(Block::default().title(" Rings ").borders(Borders::ALL))
        .marker(Marker::Braille)
        .background_color(Color::Black)
        .x_bounds([0.0, rings.stage_size])
        .y_bounds([0.0, rings.stage_size])
        .paint(|ctx| {
            for ring in &rings.rings {
                ctx.draw(&Circle {
                    x: ring.x,
                    y: ring.y,
                    radius: ring.radius,
                    color: ring.color,
                });
            }
        });

    frame.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_faded_rings() {
        let mut canvas = RingCanvas::new(400.0);
        let red = Rgb::new(255, 0, 0);
        canvas.draw_ring(200.0, 200.0, 190.0, 3.0, red, 0.0).unwrap();
        canvas.draw_ring(200.0, 200.0, 175.0, 3.0, red, 0.5).unwrap();
        assert_eq!(canvas.rings.len(), 1);
        assert_eq!(canvas.rings[0].radius, 175.0);
    }

    #[test]
    fn clear_drops_previous_rings() {
        let mut canvas = RingCanvas::new(400.0);
        canvas
            .draw_ring(200.0, 200.0, 190.0, 3.0, Rgb::new(0, 255, 0), 1.0)
            .unwrap();
        canvas.clear_frame().unwrap();
        assert!(canvas.rings.is_empty());
    }

    #[test]
    fn downbeat_flash() {
        let mut canvas = RingCanvas::new(400.0);
        assert!(!canvas.downbeat_lit());
        canvas.mark_downbeat().unwrap();
        assert!(canvas.downbeat_lit());
        canvas.reset();
        assert!(!canvas.downbeat_lit());
    }
}
