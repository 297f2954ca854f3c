//! Data-space to pixel-space mapping for drawing a trajectory.
//!
//! Bounds are the data extent padded by [`DATA_PADDING`] on every side,
//! mapped onto a pixel rectangle inside the canvas margins. X and Y scale
//! independently and Y is flipped (data up, pixels down).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::resolver::Planar;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Padding added to each side of the data bounds, in data units.
pub const DATA_PADDING: f64 = 0.5;

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;

/// Default margin between the canvas edge and the plot rectangle.
pub const DEFAULT_CANVAS_MARGIN: f64 = 50.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Target rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// The plot rectangle of a `width` x `height` canvas inset by `margin`.
    pub fn inset(width: f64, height: f64, margin: f64) -> Result<Self, CoreError> {
        let rect = Self {
            left: margin,
            top: margin,
            width: width - 2.0 * margin,
            height: height - 2.0 * margin,
        };
        if !(rect.width > 0.0 && rect.height > 0.0) || margin < 0.0 {
            return Err(CoreError::Validation(format!(
                "canvas {width}x{height} with margin {margin} leaves no drawing area"
            )));
        }
        Ok(rect)
    }
}

impl Default for PixelRect {
    fn default() -> Self {
        Self {
            left: DEFAULT_CANVAS_MARGIN,
            top: DEFAULT_CANVAS_MARGIN,
            width: DEFAULT_CANVAS_WIDTH - 2.0 * DEFAULT_CANVAS_MARGIN,
            height: DEFAULT_CANVAS_HEIGHT - 2.0 * DEFAULT_CANVAS_MARGIN,
        }
    }
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned extent in data space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl DataBounds {
    /// Tight bounds of `points`, or `None` if there are none.
    pub fn of<P: Planar>(points: &[P]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_x: first.x(),
            max_x: first.x(),
            min_y: first.y(),
            max_y: first.y(),
        };
        Some(points.iter().fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x()),
            max_x: b.max_x.max(p.x()),
            min_y: b.min_y.min(p.y()),
            max_y: b.max_y.max(p.y()),
        }))
    }

    pub fn padded(self, pad: f64) -> Self {
        Self {
            min_x: self.min_x - pad,
            max_x: self.max_x + pad,
            min_y: self.min_y - pad,
            max_y: self.max_y + pad,
        }
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Linear, invertible mapping from data space onto a [`PixelRect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: DataBounds,
    rect: PixelRect,
    scale_x: f64,
    scale_y: f64,
}

impl Viewport {
    /// Fit the padded extent of `points` into `rect`.
    pub fn fit<P: Planar>(points: &[P], rect: PixelRect) -> Result<Self, CoreError> {
        let bounds = DataBounds::of(points)
            .ok_or_else(|| CoreError::Validation("cannot fit a viewport to zero points".to_string()))?
            .padded(DATA_PADDING);
        Self::new(bounds, rect)
    }

    /// Map explicit data bounds into `rect`. The bounds must have positive
    /// extent on both axes.
    pub fn new(bounds: DataBounds, rect: PixelRect) -> Result<Self, CoreError> {
        let span_x = bounds.max_x - bounds.min_x;
        let span_y = bounds.max_y - bounds.min_y;
        if !(span_x > 0.0 && span_y > 0.0) || !span_x.is_finite() || !span_y.is_finite() {
            return Err(CoreError::Validation(format!(
                "viewport bounds must have positive finite extent, got {span_x}x{span_y}"
            )));
        }
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return Err(CoreError::Validation(
                "pixel rectangle must have positive size".to_string(),
            ));
        }
        Ok(Self {
            bounds,
            rect,
            scale_x: rect.width / span_x,
            scale_y: rect.height / span_y,
        })
    }

    pub fn bounds(&self) -> DataBounds {
        self.bounds
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> PixelPoint {
        PixelPoint {
            x: self.rect.left + (x - self.bounds.min_x) * self.scale_x,
            y: self.rect.top + self.rect.height - (y - self.bounds.min_y) * self.scale_y,
        }
    }

    /// Inverse of [`to_pixel`](Self::to_pixel).
    pub fn to_data(&self, px: f64, py: f64) -> (f64, f64) {
        let x = self.bounds.min_x + (px - self.rect.left) / self.scale_x;
        let y = self.bounds.min_y + (self.rect.top + self.rect.height - py) / self.scale_y;
        (x, y)
    }

    pub fn project<P: Planar + ?Sized>(&self, point: &P) -> PixelPoint {
        self.to_pixel(point.x(), point.y())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
