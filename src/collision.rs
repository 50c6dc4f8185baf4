/// Collision engine for figure pairs
///
/// Scripts register a handler for a pair of figures; every steady-state frame
/// the scheduler tests each registered pair with an AABB overlap check and
/// fires the handler while the pair overlaps.
///
/// # Architecture
///
/// - `aabb_intersect`: pure rectangle intersection test (strict edges)
/// - `CollisionRegistry`: insertion-ordered pair registrations, purged when a
///   figure is removed
///
/// Dispatch itself lives in the scheduler, because handlers need the whole
/// `Context`. The registry lends handlers out with `take_handler` and gets
/// them back with `restore_handler`, so a handler may freely register or
/// purge pairs while it runs.
use crate::figure::{FigureId, FigureStore};
use crate::handlers::CollisionHandler;
use crate::surface::RectF;

/// Checks if two axis-aligned bounding boxes intersect.
///
/// Two rectangles intersect if they overlap on both the X and Y axes.
/// Rectangles that only touch along an edge do not intersect.
pub fn aabb_intersect(a: &RectF, b: &RectF) -> bool {
    let x_overlap = a.x < b.x + b.width && a.x + a.width > b.x;
    let y_overlap = a.y < b.y + b.height && a.y + a.height > b.y;

    x_overlap && y_overlap
}

/// Overlap test for two figures by id. A missing figure never collides.
pub fn figures_collide(figures: &FigureStore, a: FigureId, b: FigureId) -> bool {
    match (figures.get(a), figures.get(b)) {
        (Some(a), Some(b)) => aabb_intersect(&a.bounds(), &b.bounds()),
        _ => false,
    }
}

/// Identifier of one registration. Stays valid until the registration is purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionId(pub u64);

struct Registration {
    id: CollisionId,
    a: FigureId,
    b: FigureId,
    /// `None` while the handler is lent out for dispatch
    handler: Option<CollisionHandler>,
}

#[derive(Default)]
pub struct CollisionRegistry {
    entries: Vec<Registration>,
    next_id: u64,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, a: FigureId, b: FigureId, handler: CollisionHandler) -> CollisionId {
        self.next_id += 1;
        let id = CollisionId(self.next_id);
        self.entries.push(Registration {
            id,
            a,
            b,
            handler: Some(handler),
        });
        id
    }

    /// Drops every registration naming `figure`. Returns how many were removed.
    pub fn purge(&mut self, figure: FigureId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.a != figure && entry.b != figure);
        before - self.entries.len()
    }

    /// Registration ids in insertion order.
    pub fn ids(&self) -> Vec<CollisionId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// The figure pair of a registration, if it is still present.
    pub fn pair(&self, id: CollisionId) -> Option<(FigureId, FigureId)> {
        self.find(id).map(|entry| (entry.a, entry.b))
    }

    pub fn take_handler(&mut self, id: CollisionId) -> Option<CollisionHandler> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .and_then(|entry| entry.handler.take())
    }

    /// Puts a lent handler back. Dropped if the registration was purged meanwhile.
    pub fn restore_handler(&mut self, id: CollisionId, handler: CollisionHandler) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.handler = Some(handler);
        }
    }

    /// True if any registration names `figure`.
    pub fn names(&self, figure: FigureId) -> bool {
        self.entries.iter().any(|entry| entry.a == figure || entry.b == figure)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, id: CollisionId) -> Option<&Registration> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

impl std::fmt::Debug for CollisionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (entry.id, entry.a, entry.b)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CollisionHandler {
        Box::new(|_| Ok(()))
    }

    #[test]
    fn test_aabb_intersect_overlapping() {
        let rect_a = RectF::new(0.0, 0.0, 50.0, 50.0);
        let rect_b = RectF::new(40.0, 40.0, 50.0, 50.0);

        assert!(aabb_intersect(&rect_a, &rect_b));
        assert!(aabb_intersect(&rect_b, &rect_a)); // Symmetric
    }

    #[test]
    fn test_aabb_intersect_touching_edges() {
        // Touching edges is not an overlap
        let rect_a = RectF::new(0.0, 0.0, 32.0, 32.0);
        let rect_b = RectF::new(32.0, 0.0, 32.0, 32.0);

        assert!(!aabb_intersect(&rect_a, &rect_b));
    }

    #[test]
    fn test_aabb_intersect_separated() {
        let rect_a = RectF::new(0.0, 0.0, 50.0, 50.0);
        let rect_b = RectF::new(60.0, 60.0, 50.0, 50.0);

        assert!(!aabb_intersect(&rect_a, &rect_b));
    }

    #[test]
    fn test_aabb_intersect_contained() {
        let large = RectF::new(0.0, 0.0, 100.0, 100.0);
        let small = RectF::new(25.0, 25.0, 50.0, 50.0);

        assert!(aabb_intersect(&large, &small));
        assert!(aabb_intersect(&small, &large));
    }

    #[test]
    fn test_figures_collide_follows_positions() {
        let mut figures = FigureStore::new();
        let a = figures.create(50.0, 50.0);
        let b = figures.create(50.0, 50.0);
        figures.get_mut(b).unwrap().move_to(40.0, 40.0);
        assert!(figures_collide(&figures, a, b));

        figures.get_mut(b).unwrap().move_to(60.0, 60.0);
        assert!(!figures_collide(&figures, a, b));
    }

    #[test]
    fn test_missing_figure_never_collides() {
        let mut figures = FigureStore::new();
        let a = figures.create(50.0, 50.0);
        let b = figures.create(50.0, 50.0);
        figures.remove(b);
        assert!(!figures_collide(&figures, a, b));
    }

    #[test]
    fn test_purge_removes_every_registration_naming_figure() {
        let (a, b, c) = (FigureId(1), FigureId(2), FigureId(3));
        let mut registry = CollisionRegistry::new();
        registry.register(a, b, noop());
        let kept = registry.register(b, c, noop());
        registry.register(c, a, noop());

        assert_eq!(registry.purge(a), 2);
        assert!(!registry.names(a));
        assert_eq!(registry.ids(), vec![kept]);
    }

    #[test]
    fn test_restore_after_purge_drops_handler() {
        let (a, b) = (FigureId(1), FigureId(2));
        let mut registry = CollisionRegistry::new();
        let id = registry.register(a, b, noop());

        let handler = registry.take_handler(id).unwrap();
        assert!(registry.take_handler(id).is_none());
        registry.purge(b);
        registry.restore_handler(id, handler);

        assert!(registry.is_empty());
        assert_eq!(registry.pair(id), None);
    }
}
