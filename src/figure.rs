//! Figures and the entity store
//!
//! A figure is the sprite entity scripts work with: position, size, rotation,
//! scale, visibility and an optional image. Scripts hold [`FigureId`]s rather
//! than references, so a removed figure simply stops resolving and every
//! mutator on it becomes a silent no-op.
//!
//! # Size tracking
//!
//! Each axis carries a [`SizeSource`]. A fresh figure starts `Unset`; the
//! image loader moves it to `Auto` when it snaps to the image's natural size;
//! a script assignment moves it to `Manual`, after which loads never touch
//! that axis again.

use crate::assets::{ImageHandle, ImageInfo};
use crate::surface::RectF;
use std::fmt;

/// Stable identifier of a figure. Never reused within one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FigureId(pub u64);

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an axis of a figure's size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeSource {
    /// Still the creation default
    #[default]
    Unset,
    /// Taken from the loaded image
    Auto,
    /// Assigned by a script
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    id: FigureId,
    pub x: f32,
    pub y: f32,
    width: f32,
    height: f32,
    width_source: SizeSource,
    height_source: SizeSource,
    /// Rotation in degrees, clockwise on screen
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub visible: bool,
    /// Free-form velocity for scripts; the engine never reads these
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub image: Option<ImageHandle>,
}

impl Figure {
    pub fn new(id: FigureId, width: f32, height: f32) -> Self {
        Figure {
            id,
            x: 0.0,
            y: 0.0,
            width,
            height,
            width_source: SizeSource::Unset,
            height_source: SizeSource::Unset,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            visible: true,
            velocity_x: 0.0,
            velocity_y: 0.0,
            image: None,
        }
    }

    pub fn id(&self) -> FigureId {
        self.id
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn width_source(&self) -> SizeSource {
        self.width_source
    }

    pub fn height_source(&self) -> SizeSource {
        self.height_source
    }

    /// Script assignment; pins the width against later image loads.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.width_source = SizeSource::Manual;
    }

    /// Script assignment; pins the height against later image loads.
    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.height_source = SizeSource::Manual;
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Adds to the current rotation.
    pub fn rotate_by(&mut self, degrees: f32) {
        self.rotation += degrees;
    }

    /// Sets both scale factors (not cumulative).
    pub fn scale_to(&mut self, factor: f32) {
        self.scale_x = factor;
        self.scale_y = factor;
    }

    /// Unscaled, unrotated rectangle used for collisions.
    pub fn bounds(&self) -> RectF {
        RectF::new(self.x, self.y, self.width, self.height)
    }

    /// Takes a loaded image and snaps every non-manual axis to its size.
    pub fn apply_image(&mut self, info: ImageInfo) {
        self.image = Some(info.handle);
        if self.width_source != SizeSource::Manual {
            self.width = info.width as f32;
            self.width_source = SizeSource::Auto;
        }
        if self.height_source != SizeSource::Manual {
            self.height = info.height as f32;
            self.height_source = SizeSource::Auto;
        }
    }
}

/// Insertion-ordered figure collection. Store order is draw order.
#[derive(Debug, Default)]
pub struct FigureStore {
    figures: Vec<Figure>,
    next_id: u64,
}

impl FigureStore {
    pub fn new() -> Self {
        FigureStore {
            figures: Vec::new(),
            next_id: 1,
        }
    }

    pub fn create(&mut self, width: f32, height: f32) -> FigureId {
        let id = FigureId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.figures.push(Figure::new(id, width, height));
        id
    }

    pub fn get(&self, id: FigureId) -> Option<&Figure> {
        self.figures.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FigureId) -> Option<&mut Figure> {
        self.figures.iter_mut().find(|f| f.id == id)
    }

    pub fn contains(&self, id: FigureId) -> bool {
        self.get(id).is_some()
    }

    /// Removes a figure, keeping the order of the rest. Returns whether it existed.
    pub fn remove(&mut self, id: FigureId) -> bool {
        match self.figures.iter().position(|f| f.id == id) {
            Some(index) => {
                self.figures.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every figure. Ids keep counting up so late loads for old figures
    /// can never land on new ones.
    pub fn clear(&mut self) {
        self.figures.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Figure> {
        self.figures.iter()
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_figure_defaults() {
        let mut store = FigureStore::new();
        let id = store.create(50.0, 50.0);
        let figure = store.get(id).unwrap();

        assert_eq!(figure.bounds(), RectF::new(0.0, 0.0, 50.0, 50.0));
        assert!(figure.visible);
        assert_eq!((figure.scale_x, figure.scale_y), (1.0, 1.0));
        assert_eq!(figure.width_source(), SizeSource::Unset);
        assert!(figure.image.is_none());
    }

    #[test]
    fn test_convenience_operations() {
        let mut figure = Figure::new(FigureId(1), 50.0, 50.0);
        figure.move_to(10.0, 20.0);
        figure.rotate_by(30.0);
        figure.rotate_by(15.0);
        figure.scale_to(2.0);
        figure.scale_to(0.5);

        assert_eq!((figure.x, figure.y), (10.0, 20.0));
        assert_eq!(figure.rotation, 45.0);
        // Scaling sets, it does not accumulate
        assert_eq!((figure.scale_x, figure.scale_y), (0.5, 0.5));
    }

    #[test]
    fn test_apply_image_respects_manual_axes() {
        let mut figure = Figure::new(FigureId(1), 50.0, 50.0);
        figure.set_height(10.0);
        figure.apply_image(ImageInfo {
            handle: ImageHandle(1),
            width: 64,
            height: 32,
        });

        assert_eq!(figure.width(), 64.0);
        assert_eq!(figure.width_source(), SizeSource::Auto);
        assert_eq!(figure.height(), 10.0);
        assert_eq!(figure.height_source(), SizeSource::Manual);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut store = FigureStore::new();
        let a = store.create(1.0, 1.0);
        let b = store.create(1.0, 1.0);
        let c = store.create(1.0, 1.0);

        assert!(store.remove(b));
        assert!(!store.remove(b));
        let order: Vec<FigureId> = store.iter().map(|f| f.id()).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut store = FigureStore::new();
        let first = store.create(1.0, 1.0);
        store.clear();
        let second = store.create(1.0, 1.0);
        assert_ne!(first, second);
        assert!(!store.contains(first));
    }
}
