//! Scroll State
//!
//! Scroll positions live outside the per-frame arena, keyed by element id, and
//! are fed back into the next `finalize`. Positions are positive toward the
//! end of the content; the engine applies them as a negated child offset.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::ElementId;
use crate::primitives::Point;
use crate::snapshot::LayoutSnapshot;

/// Scroll positions for every scroll container, retained across frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffsets {
    positions: IndexMap<ElementId, Point>,
}

impl ScrollOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ElementId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    pub fn set(&mut self, id: ElementId, position: Point) {
        self.positions.insert(id, position);
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Point> {
        self.positions.shift_remove(&id)
    }

    /// Move a container's position by `delta` (positive = toward the end).
    ///
    /// Only the lower bound is enforced here; [`Self::clamp_to`] applies the
    /// upper bound once the content size is known.
    pub fn scroll_by(&mut self, id: ElementId, delta: Point) -> Point {
        let entry = self.positions.entry(id).or_insert(Point::ORIGIN);
        entry.x = (entry.x + delta.x).max(0.0);
        entry.y = (entry.y + delta.y).max(0.0);
        *entry
    }

    /// Clamp every entry into `[0, max(0, content - viewport)]` using the
    /// geometry of a finalized frame. Entries for ids that are not scroll
    /// containers in that frame are left alone.
    pub fn clamp_to(&mut self, snapshot: &LayoutSnapshot) {
        for (id, position) in self.positions.iter_mut() {
            if let Some(limit) = snapshot.scroll_limit(*id) {
                position.x = position.x.clamp(0.0, limit.x);
                position.y = position.y.clamp(0.0, limit.y);
            }
        }
    }

    /// Drop entries for elements that are no longer scroll containers.
    pub fn retain_live(&mut self, snapshot: &LayoutSnapshot) {
        self.positions.retain(|id, _| snapshot.scroll_container(*id).is_some());
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, Point)> + '_ {
        self.positions.iter().map(|(id, p)| (*id, *p))
    }
}

/// Scroll state for a single container.
///
/// Use this in app state when a panel owns its scroll position instead of
/// sharing a [`ScrollOffsets`] store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    id: ElementId,
    /// Current scroll position (0 = start).
    pub offset: Point,
    /// Maximum scroll position (set from the snapshot each frame).
    pub max: Point,
}

impl ScrollState {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            offset: Point::ORIGIN,
            max: Point::new(f32::MAX, f32::MAX),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Scroll by a wheel-style delta (positive = content moves toward the start).
    pub fn scroll_by(&mut self, delta: Point) {
        self.offset.x = (self.offset.x - delta.x).clamp(0.0, self.max.x);
        self.offset.y = (self.offset.y - delta.y).clamp(0.0, self.max.y);
    }

    /// Pick up this frame's limits and re-clamp the offset.
    pub fn update_from(&mut self, snapshot: &LayoutSnapshot) {
        if let Some(max) = snapshot.scroll_limit(self.id) {
            self.max = max;
            self.offset.x = self.offset.x.clamp(0.0, max.x);
            self.offset.y = self.offset.y.clamp(0.0, max.y);
        }
    }

    /// Write the position into a store for the next `finalize`.
    pub fn apply_to(&self, offsets: &mut ScrollOffsets) {
        offsets.set(self.id, self.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LayoutBuilder;
    use crate::layout::config::{ElementDeclaration, ScrollConfig};
    use crate::layout::sizing::{LayoutDirection, Sizing};
    use crate::primitives::Size;
    use crate::text::MonospaceMeasurer;

    fn scrolling_frame(offsets: &ScrollOffsets) -> LayoutSnapshot {
        let m = MonospaceMeasurer::default();
        let mut b = LayoutBuilder::new(Size::new(200.0, 200.0), &m);
        b.element(
            ElementDeclaration::new()
                .id("feed")
                .sizing(Sizing::fixed(100.0, 100.0))
                .direction(LayoutDirection::Column)
                .scroll(ScrollConfig::vertical()),
            |b| {
                b.element(ElementDeclaration::new().id("body").sizing(Sizing::fixed(100.0, 250.0)), |_| {});
            },
        );
        LayoutSnapshot::build(b.finish().unwrap(), &m, offsets).unwrap()
    }

    #[test]
    fn scroll_by_accumulates_from_zero() {
        let mut offsets = ScrollOffsets::new();
        let id = ElementId::named("feed");
        assert_eq!(offsets.scroll_by(id, Point::new(0.0, 30.0)), Point::new(0.0, 30.0));
        assert_eq!(offsets.scroll_by(id, Point::new(-5.0, 30.0)), Point::new(0.0, 60.0));
        assert_eq!(offsets.get(id), Some(Point::new(0.0, 60.0)));
    }

    #[test]
    fn clamp_to_content_limits() {
        let mut offsets = ScrollOffsets::new();
        offsets.set(ElementId::named("feed"), Point::new(40.0, 500.0));
        let snapshot = scrolling_frame(&offsets);
        offsets.clamp_to(&snapshot);
        assert_eq!(offsets.get(ElementId::named("feed")), Some(Point::new(0.0, 150.0)));
    }

    #[test]
    fn stored_offsets_move_content() {
        let mut offsets = ScrollOffsets::new();
        offsets.set(ElementId::named("feed"), Point::new(0.0, 50.0));
        let snapshot = scrolling_frame(&offsets);
        assert_eq!(snapshot.position(ElementId::named("body")), Some(Point::new(0.0, -50.0)));
    }

    #[test]
    fn retain_live_drops_stale_entries() {
        let mut offsets = ScrollOffsets::new();
        offsets.set(ElementId::named("feed"), Point::ORIGIN);
        offsets.set(ElementId::named("gone"), Point::ORIGIN);
        let snapshot = scrolling_frame(&offsets);
        offsets.retain_live(&snapshot);
        assert_eq!(offsets.len(), 1);
        assert!(offsets.get(ElementId::named("gone")).is_none());
    }

    #[test]
    fn scroll_state_clamps_to_snapshot() {
        let snapshot = scrolling_frame(&ScrollOffsets::new());
        let mut state = ScrollState::new("feed");
        state.scroll_by(Point::new(0.0, -400.0));
        assert_eq!(state.offset.y, 400.0);

        state.update_from(&snapshot);
        assert_eq!(state.max, Point::new(0.0, 150.0));
        assert_eq!(state.offset.y, 150.0);

        state.scroll_by(Point::new(0.0, 500.0));
        assert_eq!(state.offset.y, 0.0);

        let mut offsets = ScrollOffsets::new();
        state.apply_to(&mut offsets);
        assert_eq!(offsets.get(ElementId::named("feed")), Some(Point::ORIGIN));
    }
}
