//! Drawing surface adapter
//!
//! The [`Surface`] trait is the only way the runtime touches pixels. It offers
//! the primitives scripts use (rectangles, circles, lines, text), a canvas-like
//! save/restore transform stack, and image blits that honour that stack.
//!
//! # Architecture
//!
//! - `Surface`: drawing primitives plus image creation (via [`ImageSource`])
//! - `Transform`: 2D affine matrix used by backends to track the transform stack
//! - `draw_figure()`: the per-sprite blit (translate, rotate, scale, draw, restore)
//!
//! Backends:
//!
//! - `recording`: captures commands in memory (tests, headless runs)
//! - `sdl`: SDL2 canvas (behind the `sdl` feature)

pub mod recording;
#[cfg(feature = "sdl")]
pub mod sdl;

pub use recording::{DrawCommand, DrawLog, RecordingSurface};

use crate::assets::{ImageHandle, ImageSource};
use crate::color::Color;
use crate::error::RenderError;
use crate::figure::Figure;
use crate::font;

/// Result of a single drawing call.
pub type DrawResult = Result<(), RenderError>;

/// Floating point rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        RectF {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// 2D affine transform, stored as the matrix
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// Operations post-multiply like a canvas context: `translate` then `rotate`
/// rotates around the translated origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn then(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Transform {
        self.then(&Transform {
            e: dx,
            f: dy,
            ..Transform::IDENTITY
        })
    }

    pub fn rotated(&self, radians: f32) -> Transform {
        let (sin, cos) = radians.sin_cos();
        self.then(&Transform {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    pub fn scaled(&self, sx: f32, sy: f32) -> Transform {
        self.then(&Transform {
            a: sx,
            d: sy,
            ..Transform::IDENTITY
        })
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Splits the matrix into (rotation radians, scale x, scale y), assuming
    /// it was built from rotations and scales only (no skew).
    pub fn decompose(&self) -> (f32, f32, f32) {
        let scale_x = self.a.hypot(self.b);
        let det = self.a * self.d - self.b * self.c;
        let scale_y = if scale_x == 0.0 { 0.0 } else { det / scale_x };
        (self.b.atan2(self.a), scale_x, scale_y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

/// A 2D raster surface the runtime draws on.
///
/// Primitives are drawn in surface pixel coordinates. Image blits honour the
/// current transform built up with `translate`/`rotate`/`scale` between a
/// `save`/`restore` pair.
pub trait Surface: ImageSource {
    /// Backing-store size in pixels, read once when the engine initializes.
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color) -> DrawResult;

    fn fill_rect(&mut self, rect: RectF, color: Color) -> DrawResult;

    fn stroke_rect(&mut self, rect: RectF, color: Color, line_width: f32) -> DrawResult;

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) -> DrawResult;

    fn line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        line_width: f32,
    ) -> DrawResult;

    /// Draws text with its baseline at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color, size: f32) -> DrawResult {
        let top = y - font::line_height(size);
        font::draw_text(self, text, x, top, color, size)
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        font::text_width(text, size)
    }

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);

    fn rotate(&mut self, radians: f32);

    fn scale(&mut self, sx: f32, sy: f32);

    fn draw_image(&mut self, image: ImageHandle, dst: RectF) -> DrawResult;

    /// Shows the finished frame. Surfaces that draw straight to the screen
    /// have nothing to do here.
    fn present(&mut self) {}
}

/// Blits one figure: translate to its center, rotate, scale, draw the image
/// centered, then restore so the transform does not leak into the next sprite.
///
/// Figures without a loaded image are skipped.
pub fn draw_figure<S: Surface + ?Sized>(surface: &mut S, figure: &Figure) -> DrawResult {
    let Some(image) = figure.image else {
        return Ok(());
    };

    let (cx, cy) = figure.bounds().center();
    surface.save();
    surface.translate(cx, cy);
    surface.rotate(figure.rotation.to_radians());
    surface.scale(figure.scale_x, figure.scale_y);
    let result = surface.draw_image(
        image,
        RectF::new(
            -figure.width() / 2.0,
            -figure.height() / 2.0,
            figure.width(),
            figure.height(),
        ),
    );
    surface.restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageInfo;
    use crate::error::AssetError;
    use crate::figure::FigureId;
    use std::path::Path;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_transform_translate_then_rotate() {
        let t = Transform::IDENTITY
            .translated(100.0, 50.0)
            .rotated(std::f32::consts::FRAC_PI_2);
        // Local +x axis points down after a quarter turn
        let (x, y) = t.apply(10.0, 0.0);
        assert!(approx(x, 100.0));
        assert!(approx(y, 60.0));
    }

    #[test]
    fn test_transform_decompose() {
        let t = Transform::IDENTITY
            .translated(5.0, 5.0)
            .rotated(0.5)
            .scaled(2.0, 3.0);
        let (angle, sx, sy) = t.decompose();
        assert!(approx(angle, 0.5));
        assert!(approx(sx, 2.0));
        assert!(approx(sy, 3.0));
    }

    #[test]
    fn test_transform_decompose_mirrored() {
        let (_, sx, sy) = Transform::IDENTITY.scaled(1.0, -1.0).decompose();
        assert!(approx(sx, 1.0));
        assert!(approx(sy, -1.0));
    }

    #[test]
    fn test_draw_figure_is_scoped() {
        let mut surface = RecordingSurface::new(800, 600);
        let log = surface.log();

        let mut figure = Figure::new(FigureId(1), 50.0, 50.0);
        figure.move_to(10.0, 20.0);
        figure.rotate_by(90.0);
        figure.scale_to(2.0);
        figure.image = Some(ImageHandle(3));

        draw_figure(&mut surface, &figure).unwrap();

        let commands = log.commands();
        assert_eq!(commands.first(), Some(&DrawCommand::Save));
        assert_eq!(commands.get(1), Some(&DrawCommand::Translate(35.0, 45.0)));
        assert_eq!(commands.get(3), Some(&DrawCommand::Scale(2.0, 2.0)));
        assert_eq!(
            commands.get(4),
            Some(&DrawCommand::Image {
                image: ImageHandle(3),
                dst: RectF::new(-25.0, -25.0, 50.0, 50.0),
            })
        );
        assert_eq!(commands.last(), Some(&DrawCommand::Restore));
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn test_draw_figure_without_image_draws_nothing() {
        let mut surface = RecordingSurface::new(800, 600);
        let log = surface.log();
        let figure = Figure::new(FigureId(1), 50.0, 50.0);

        draw_figure(&mut surface, &figure).unwrap();
        assert!(log.commands().is_empty());
    }

    #[test]
    fn test_default_text_goes_through_fill_rect() {
        struct Rects(Vec<RectF>);
        impl ImageSource for Rects {
            fn load_image(&mut self, path: &Path) -> Result<ImageInfo, AssetError> {
                Err(AssetError::NotFound(path.to_path_buf()))
            }
            fn placeholder_image(
                &mut self,
                _: u32,
                _: u32,
                _: Color,
            ) -> Result<ImageHandle, AssetError> {
                Ok(ImageHandle(0))
            }
        }
        impl Surface for Rects {
            fn size(&self) -> (u32, u32) {
                (100, 100)
            }
            fn clear(&mut self, _: Color) -> DrawResult {
                Ok(())
            }
            fn fill_rect(&mut self, rect: RectF, _: Color) -> DrawResult {
                self.0.push(rect);
                Ok(())
            }
            fn stroke_rect(&mut self, _: RectF, _: Color, _: f32) -> DrawResult {
                Ok(())
            }
            fn fill_circle(&mut self, _: f32, _: f32, _: f32, _: Color) -> DrawResult {
                Ok(())
            }
            fn line(&mut self, _: (f32, f32), _: (f32, f32), _: Color, _: f32) -> DrawResult {
                Ok(())
            }
            fn save(&mut self) {}
            fn restore(&mut self) {}
            fn translate(&mut self, _: f32, _: f32) {}
            fn rotate(&mut self, _: f32) {}
            fn scale(&mut self, _: f32, _: f32) {}
            fn draw_image(&mut self, _: ImageHandle, _: RectF) -> DrawResult {
                Ok(())
            }
        }

        let mut surface = Rects(Vec::new());
        surface.fill_text("-", 0.0, 7.0, Color::WHITE, 7.0).unwrap();
        // The dash glyph is a single row of five pixels, baseline 7 => top 0
        assert_eq!(surface.0.len(), 5);
        assert!(surface.0.iter().all(|r| r.y == 3.0));
    }
}
