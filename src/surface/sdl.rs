//! SDL2 canvas surface
//!
//! Draws into a window canvas with a fixed logical size, so the surface keeps
//! its backing-store resolution however large the window is.
//!
//! Images are uploaded as textures and referenced by index. Textures are not
//! tied to their creator's lifetime and are freed with the renderer when the
//! canvas drops. Image blits honour
//! the save/restore transform stack by decomposing it into a rotation, a
//! scaled destination rectangle and flips for `copy_ex`. Primitives are drawn
//! in surface coordinates.

use super::{DrawResult, RectF, Surface, Transform};
use crate::assets::{ImageHandle, ImageInfo, ImageSource};
use crate::color::Color;
use crate::error::{AssetError, RenderError};
use sdl2::image::LoadTexture;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::{Point, Rect};
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::surface::Surface as PixelSurface;
use sdl2::video::{Window, WindowContext};
use std::path::Path;

pub struct SdlSurface {
    textures: Vec<Texture>,
    creator: TextureCreator<WindowContext>,
    canvas: Canvas<Window>,
    current: Transform,
    stack: Vec<Transform>,
    width: u32,
    height: u32,
}

impl SdlSurface {
    /// Wraps a canvas and pins its logical size to `width` x `height`.
    pub fn new(mut canvas: Canvas<Window>, width: u32, height: u32) -> Result<Self, String> {
        canvas
            .set_logical_size(width, height)
            .map_err(|e| e.to_string())?;
        canvas.set_blend_mode(BlendMode::Blend);
        let creator = canvas.texture_creator();

        Ok(SdlSurface {
            textures: Vec::new(),
            creator,
            canvas,
            current: Transform::IDENTITY,
            stack: Vec::new(),
            width,
            height,
        })
    }

    fn store(&mut self, mut texture: Texture) -> ImageHandle {
        texture.set_blend_mode(BlendMode::Blend);
        self.textures.push(texture);
        ImageHandle((self.textures.len() - 1) as u32)
    }

    fn set_color(&mut self, color: Color) {
        self.canvas.set_draw_color(sdl2::pixels::Color::from(color));
    }
}

fn to_rect(rect: RectF) -> Rect {
    Rect::new(
        rect.x.round() as i32,
        rect.y.round() as i32,
        rect.width.max(0.0).round() as u32,
        rect.height.max(0.0).round() as u32,
    )
}

fn point(x: f32, y: f32) -> Point {
    Point::new(x.round() as i32, y.round() as i32)
}

impl ImageSource for SdlSurface {
    fn load_image(&mut self, path: &Path) -> Result<ImageInfo, AssetError> {
        if !path.is_file() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }
        let texture = self.creator.load_texture(path).map_err(|reason| AssetError::Load {
            path: path.to_path_buf(),
            reason,
        })?;
        let query = texture.query();
        let handle = self.store(texture);
        Ok(ImageInfo {
            handle,
            width: query.width,
            height: query.height,
        })
    }

    fn placeholder_image(
        &mut self,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<ImageHandle, AssetError> {
        let failed = |reason: String| AssetError::Load {
            path: "<placeholder>".into(),
            reason,
        };
        let mut pixels = PixelSurface::new(width.max(1), height.max(1), PixelFormatEnum::RGBA8888)
            .map_err(failed)?;
        pixels.fill_rect(None, color.into()).map_err(failed)?;
        let texture = self
            .creator
            .create_texture_from_surface(&pixels)
            .map_err(|e| failed(e.to_string()))?;
        Ok(self.store(texture))
    }
}

impl Surface for SdlSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) -> DrawResult {
        self.set_color(color);
        self.canvas.clear();
        Ok(())
    }

    fn fill_rect(&mut self, rect: RectF, color: Color) -> DrawResult {
        self.set_color(color);
        self.canvas.fill_rect(to_rect(rect)).map_err(RenderError)
    }

    fn stroke_rect(&mut self, rect: RectF, color: Color, line_width: f32) -> DrawResult {
        self.set_color(color);
        let rings = line_width.round().max(1.0) as i32;
        for inset in 0..rings {
            let inset = inset as f32;
            let ring = RectF::new(
                rect.x + inset,
                rect.y + inset,
                rect.width - 2.0 * inset,
                rect.height - 2.0 * inset,
            );
            if ring.width <= 0.0 || ring.height <= 0.0 {
                break;
            }
            self.canvas.draw_rect(to_rect(ring)).map_err(RenderError)?;
        }
        Ok(())
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) -> DrawResult {
        self.set_color(color);
        let r = radius.max(0.0).round() as i32;
        for dy in -r..=r {
            let half = ((r * r - dy * dy) as f32).sqrt();
            let y = cy + dy as f32;
            self.canvas
                .draw_line(point(cx - half, y), point(cx + half, y))
                .map_err(RenderError)?;
        }
        Ok(())
    }

    fn line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        line_width: f32,
    ) -> DrawResult {
        self.set_color(color);
        let steep = (to.1 - from.1).abs() > (to.0 - from.0).abs();
        let passes = line_width.round().max(1.0) as i32;
        for pass in 0..passes {
            let offset = pass as f32 - (passes - 1) as f32 / 2.0;
            let (ox, oy) = if steep { (offset, 0.0) } else { (0.0, offset) };
            self.canvas
                .draw_line(point(from.0 + ox, from.1 + oy), point(to.0 + ox, to.1 + oy))
                .map_err(RenderError)?;
        }
        Ok(())
    }

    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        if let Some(saved) = self.stack.pop() {
            self.current = saved;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.current = self.current.translated(dx, dy);
    }

    fn rotate(&mut self, radians: f32) {
        self.current = self.current.rotated(radians);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.current = self.current.scaled(sx, sy);
    }

    fn draw_image(&mut self, image: ImageHandle, dst: RectF) -> DrawResult {
        let Some(texture) = self.textures.get(image.0 as usize) else {
            return Err(RenderError(format!("unknown image {}", image.0)));
        };

        let (angle, scale_x, scale_y) = self.current.decompose();
        let (local_x, local_y) = dst.center();
        let (center_x, center_y) = self.current.apply(local_x, local_y);
        let width = dst.width * scale_x.abs();
        let height = dst.height * scale_y.abs();
        let target = RectF::new(center_x - width / 2.0, center_y - height / 2.0, width, height);

        self.canvas
            .copy_ex(
                texture,
                None,
                Some(to_rect(target)),
                angle.to_degrees() as f64,
                None,
                scale_x < 0.0,
                scale_y < 0.0,
            )
            .map_err(RenderError)
    }

    fn present(&mut self) {
        self.canvas.present();
    }
}
