//! Painting frames.
//!
//! The ensemble never paints anything itself. It hands a [`Frame`] to a
//! [`FrameRenderer`], which turns each ring instruction into a
//! [`Renderer::draw_ring`] call on whatever surface is attached.

use crate::color::Rgb;
use crate::ensemble::{EnsembleConfig, Frame};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Anything the drawing surface reports.
    Backend(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Backend(reason) => write!(f, "renderer failure: {}", reason),
        }
    }
}

impl std::error::Error for RenderError {}

/// A drawing surface.
pub trait Renderer {
    fn clear_frame(&mut self) -> Result<(), RenderError>;

    /// Stroke a circle. `alpha` is in `[0, 1]`.
    fn draw_ring(
        &mut self,
        center_x: f64,
        center_y: f64,
        radius: f64,
        stroke_width: f64,
        color: Rgb,
        alpha: f64,
    ) -> Result<(), RenderError>;

    /// The reference voice just sounded.
    ///
    /// Default implementation does nothing.
    fn mark_downbeat(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Where rings go on the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub center_x: f64,
    pub center_y: f64,
    pub stroke_width: f64,
}

impl Stage {
    /// Rings centred on a square stage.
    pub fn from_config(config: &EnsembleConfig) -> Self {
        Self {
            center_x: config.stage_size / 2.0,
            center_y: config.stage_size / 2.0,
            stroke_width: config.stroke_width,
        }
    }
}

/// Adapter from frames to [`Renderer`] calls.
#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer {
    stage: Stage,
}

impl FrameRenderer {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Clear, then draw every ring in frame order.
    ///
    /// Frame order is voice-index order: outermost ring first.
    pub fn paint<R: Renderer + ?Sized>(
        &self,
        frame: &Frame,
        renderer: &mut R,
    ) -> Result<(), RenderError> {
        renderer.clear_frame()?;
        for ring in &frame.rings {
            renderer.draw_ring(
                self.stage.center_x,
                self.stage.center_y,
                ring.radius,
                self.stage.stroke_width,
                ring.color,
                ring.alpha,
            )?;
        }
        if frame.downbeat {
            renderer.mark_downbeat()?;
        }
        Ok(())
    }
}
