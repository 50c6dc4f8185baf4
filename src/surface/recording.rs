//! In-memory surface that records drawing commands
//!
//! Used by the test suite and by hosts that run without a window. The command
//! log is shared through [`DrawLog`], so it stays readable after the surface
//! itself has been handed to the engine.

use super::{DrawResult, RectF, Surface};
use crate::assets::{ImageHandle, ImageInfo, ImageSource};
use crate::color::Color;
use crate::error::AssetError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect { rect: RectF, color: Color },
    StrokeRect { rect: RectF, color: Color, line_width: f32 },
    Circle { cx: f32, cy: f32, radius: f32, color: Color },
    Line { from: (f32, f32), to: (f32, f32), color: Color, line_width: f32 },
    Text { text: String, x: f32, y: f32, color: Color, size: f32 },
    Save,
    Restore,
    Translate(f32, f32),
    Rotate(f32),
    Scale(f32, f32),
    Image { image: ImageHandle, dst: RectF },
    Present,
}

#[derive(Debug, Default)]
struct LogInner {
    commands: Vec<DrawCommand>,
    placeholders: Vec<(ImageHandle, u32, u32, Color)>,
    loads: Vec<PathBuf>,
}

/// Shared view of everything a [`RecordingSurface`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    inner: Rc<RefCell<LogInner>>,
}

impl DrawLog {
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.inner.borrow().commands.clone()
    }

    /// Forgets recorded commands (image bookkeeping is kept).
    pub fn clear(&self) {
        self.inner.borrow_mut().commands.clear();
    }

    /// Strings drawn with `fill_text`, in order.
    pub fn texts(&self) -> Vec<String> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Images blitted, in order.
    pub fn images_drawn(&self) -> Vec<ImageHandle> {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Image { image, .. } => Some(*image),
                _ => None,
            })
            .collect()
    }

    /// Number of presented frames since the last `clear`.
    pub fn presented(&self) -> usize {
        self.count(|cmd| matches!(cmd, DrawCommand::Present))
    }

    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.inner.borrow().commands.iter().filter(|cmd| predicate(cmd)).count()
    }

    /// Placeholder images created so far: (handle, width, height, colour).
    pub fn placeholders(&self) -> Vec<(ImageHandle, u32, u32, Color)> {
        self.inner.borrow().placeholders.clone()
    }

    /// Every path passed to `load_image`, successful or not.
    pub fn loads(&self) -> Vec<PathBuf> {
        self.inner.borrow().loads.clone()
    }

    fn push(&self, command: DrawCommand) {
        self.inner.borrow_mut().commands.push(command);
    }
}

/// Surface that draws nothing and remembers everything.
///
/// Images are faked: register the ones that should "exist" with
/// [`with_image`](RecordingSurface::with_image); every other path fails to
/// load.
pub struct RecordingSurface {
    width: u32,
    height: u32,
    log: DrawLog,
    images: HashMap<PathBuf, (u32, u32)>,
    next_handle: u32,
    depth: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        RecordingSurface {
            width,
            height,
            log: DrawLog::default(),
            images: HashMap::new(),
            next_handle: 1,
            depth: 0,
        }
    }

    /// Makes `path` loadable with the given natural size. Matching is by path
    /// suffix, so `"cat.png"` matches `<root>/images/cat.png`.
    pub fn with_image(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.images.insert(path.into(), (width, height));
        self
    }

    pub fn log(&self) -> DrawLog {
        self.log.clone()
    }

    /// Current save/restore nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn allocate(&mut self) -> ImageHandle {
        let handle = ImageHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

impl ImageSource for RecordingSurface {
    fn load_image(&mut self, path: &Path) -> Result<ImageInfo, AssetError> {
        self.log.inner.borrow_mut().loads.push(path.to_path_buf());

        let size = self
            .images
            .iter()
            .find(|(known, _)| path.ends_with(known))
            .map(|(_, size)| *size);

        match size {
            Some((width, height)) => Ok(ImageInfo {
                handle: self.allocate(),
                width,
                height,
            }),
            None => Err(AssetError::NotFound(path.to_path_buf())),
        }
    }

    fn placeholder_image(
        &mut self,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<ImageHandle, AssetError> {
        let handle = self.allocate();
        self.log
            .inner
            .borrow_mut()
            .placeholders
            .push((handle, width, height, color));
        Ok(handle)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) -> DrawResult {
        self.log.push(DrawCommand::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, rect: RectF, color: Color) -> DrawResult {
        self.log.push(DrawCommand::FillRect { rect, color });
        Ok(())
    }

    fn stroke_rect(&mut self, rect: RectF, color: Color, line_width: f32) -> DrawResult {
        self.log.push(DrawCommand::StrokeRect {
            rect,
            color,
            line_width,
        });
        Ok(())
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) -> DrawResult {
        self.log.push(DrawCommand::Circle {
            cx,
            cy,
            radius,
            color,
        });
        Ok(())
    }

    fn line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        line_width: f32,
    ) -> DrawResult {
        self.log.push(DrawCommand::Line {
            from,
            to,
            color,
            line_width,
        });
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color, size: f32) -> DrawResult {
        self.log.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
            size,
        });
        Ok(())
    }

    fn save(&mut self) {
        self.depth += 1;
        self.log.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.log.push(DrawCommand::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.log.push(DrawCommand::Translate(dx, dy));
    }

    fn rotate(&mut self, radians: f32) {
        self.log.push(DrawCommand::Rotate(radians));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.log.push(DrawCommand::Scale(sx, sy));
    }

    fn draw_image(&mut self, image: ImageHandle, dst: RectF) -> DrawResult {
        self.log.push(DrawCommand::Image { image, dst });
        Ok(())
    }

    fn present(&mut self) {
        self.log.push(DrawCommand::Present);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_images_load_by_suffix() {
        let mut surface = RecordingSurface::new(100, 100).with_image("cat.png", 64, 32);

        let info = surface.load_image(Path::new("/project/images/cat.png")).unwrap();
        assert_eq!((info.width, info.height), (64, 32));

        let err = surface.load_image(Path::new("/project/dog.png")).unwrap_err();
        assert_eq!(err, AssetError::NotFound(PathBuf::from("/project/dog.png")));

        assert_eq!(surface.log().loads().len(), 2);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut surface = RecordingSurface::new(100, 100).with_image("a.png", 1, 1);
        let a = surface.load_image(Path::new("a.png")).unwrap().handle;
        let b = surface.placeholder_image(5, 5, Color::BLACK).unwrap();
        assert_ne!(a, b);
        assert_eq!(surface.log().placeholders(), vec![(b, 5, 5, Color::BLACK)]);
    }

    #[test]
    fn test_log_survives_surface_move() {
        let surface = RecordingSurface::new(10, 10);
        let log = surface.log();
        let mut boxed: Box<dyn Surface> = Box::new(surface);
        boxed.clear(Color::BLACK).unwrap();
        boxed.present();
        assert_eq!(log.commands(), vec![DrawCommand::Clear(Color::BLACK), DrawCommand::Present]);
        assert_eq!(log.presented(), 1);
    }
}
