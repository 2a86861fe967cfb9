//! Layout Snapshot
//!
//! A finalized frame: the arena with every box resolved plus the command list
//! built from it. Renderers read the commands; input handling and app code
//! query geometry by [`ElementId`].

use crate::arena::{Arena, Node, NodeHandle};
use crate::error::LayoutError;
use crate::id::ElementId;
use crate::primitives::{Point, Rect, Size};
use crate::render::{self, clip, RenderCommand};
use crate::scroll::ScrollOffsets;
use crate::text::TextMeasurer;

/// Geometry of a scroll container after layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollContainerData {
    /// The visible box.
    pub bounding_box: Rect,
    /// Extent of the flow content including padding.
    pub content_size: Size,
    /// Offset applied to the children this frame (the negated scroll position).
    pub child_offset: Point,
    pub horizontal: bool,
    pub vertical: bool,
}

impl ScrollContainerData {
    /// Largest scroll position per axis: `max(0, content - viewport)`, or 0 on
    /// an axis that does not scroll.
    pub fn max_offset(&self) -> Point {
        let limit = |enabled: bool, content: f32, visible: f32| {
            if enabled { (content - visible).max(0.0) } else { 0.0 }
        };
        Point::new(
            limit(self.horizontal, self.content_size.width, self.bounding_box.width),
            limit(self.vertical, self.content_size.height, self.bounding_box.height),
        )
    }
}

#[derive(Debug, Clone)]
pub struct LayoutSnapshot {
    arena: Arena,
    commands: Vec<RenderCommand>,
}

impl LayoutSnapshot {
    /// Finalize `arena` and keep the result for querying.
    pub fn build(
        mut arena: Arena,
        measurer: &dyn TextMeasurer,
        scroll: &ScrollOffsets,
    ) -> Result<Self, LayoutError> {
        let commands = crate::engine::finalize(&mut arena, measurer, scroll)?;
        Ok(Self { arena, commands })
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<RenderCommand> {
        self.commands
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn viewport(&self) -> Size {
        self.arena.viewport()
    }

    pub fn handle(&self, id: ElementId) -> Option<NodeHandle> {
        self.arena.handle_of(id)
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.handle(id).and_then(|h| self.arena.get(h))
    }

    pub fn bounding_box(&self, id: ElementId) -> Option<Rect> {
        self.node(id).map(|n| n.bounding_box)
    }

    /// Layout size. Differs from the bounding box only for expanded floats.
    pub fn size(&self, id: ElementId) -> Option<Size> {
        self.node(id).map(|n| n.dimensions)
    }

    pub fn position(&self, id: ElementId) -> Option<Point> {
        self.node(id).map(|n| n.bounding_box.origin())
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.node(id)?.parent?;
        Some(self.arena.at(parent).id)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.node(id)
            .map(|n| n.children.iter().map(|c| self.arena.at(*c).id).collect())
            .unwrap_or_default()
    }

    /// Every element below `id`, in pre-order.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        self.handle(id)
            .map(|h| self.arena.descendants(h).into_iter().map(|d| self.arena.at(d).id).collect())
            .unwrap_or_default()
    }

    /// Wrapped lines of a text element.
    pub fn text_lines(&self, id: ElementId) -> Option<Vec<&str>> {
        let text = self.node(id)?.text.as_ref()?;
        let lines = text.wrapped_lines.as_ref()?;
        Some(lines.iter().map(|l| l.text(&text.content)).collect())
    }

    /// Whether `point` is inside the element and not clipped away by any of
    /// its clipping ancestors.
    pub fn contains_point(&self, id: ElementId, point: Point) -> bool {
        self.handle(id).is_some_and(|h| self.visible_at(h, point))
    }

    fn visible_at(&self, handle: NodeHandle, point: Point) -> bool {
        self.arena.at(handle).bounding_box.contains(point)
            && clip::clip_chain(&self.arena, handle)
                .into_iter()
                .all(|c| self.arena.at(c).bounding_box.contains(point))
    }

    /// Elements under `point`, topmost (last painted) first.
    pub fn hit_test(&self, point: Point) -> Vec<ElementId> {
        let mut order = render::paint_order(&self.arena);
        order.sort_by_key(|(_, z)| *z);
        order
            .into_iter()
            .rev()
            .filter(|(h, _)| self.visible_at(*h, point))
            .map(|(h, _)| self.arena.at(h).id)
            .collect()
    }

    pub fn scroll_container(&self, id: ElementId) -> Option<ScrollContainerData> {
        let node = self.node(id)?;
        let scroll = node.scroll?;
        Some(ScrollContainerData {
            bounding_box: node.bounding_box,
            content_size: node.content_size,
            child_offset: node.child_offset,
            horizontal: scroll.horizontal,
            vertical: scroll.vertical,
        })
    }

    /// Maximum scroll position for a scroll container.
    pub fn scroll_limit(&self, id: ElementId) -> Option<Point> {
        self.scroll_container(id).map(|s| s.max_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LayoutBuilder;
    use crate::layout::config::{ElementDeclaration, FloatingConfig, ScrollConfig};
    use crate::layout::sizing::{LayoutDirection, Sizing};
    use crate::primitives::Color;
    use crate::text::MonospaceMeasurer;

    fn snapshot() -> LayoutSnapshot {
        let measurer = MonospaceMeasurer::default();
        let mut b = LayoutBuilder::new(Size::new(200.0, 100.0), &measurer);
        b.element(
            ElementDeclaration::new()
                .id("list")
                .sizing(Sizing::fixed(100.0, 50.0))
                .direction(LayoutDirection::Column)
                .scroll(ScrollConfig::vertical()),
            |b| {
                for i in 0..3 {
                    b.element(
                        ElementDeclaration::new()
                            .id(ElementId::indexed("item", i))
                            .sizing(Sizing::fixed(100.0, 40.0))
                            .background(Color::WHITE),
                        |_| {},
                    );
                }
            },
        );
        b.element(
            ElementDeclaration::new()
                .id("popup")
                .sizing(Sizing::fixed(30.0, 30.0))
                .floating(FloatingConfig { z_index: 5, ..FloatingConfig::default() }),
            |_| {},
        );
        let arena = b.finish().unwrap();
        LayoutSnapshot::build(arena, &measurer, &ScrollOffsets::default()).unwrap()
    }

    #[test]
    fn geometry_queries() {
        let s = snapshot();
        let second = ElementId::indexed("item", 1);
        assert_eq!(s.bounding_box(second), Some(Rect::new(0.0, 40.0, 100.0, 40.0)));
        assert_eq!(s.size(second), Some(Size::new(100.0, 40.0)));
        assert_eq!(s.position(second), Some(Point::new(0.0, 40.0)));
        assert_eq!(s.bounding_box(ElementId::named("missing")), None);
    }

    #[test]
    fn tree_queries() {
        let s = snapshot();
        let list = ElementId::named("list");
        let items: Vec<_> = (0..3).map(|i| ElementId::indexed("item", i)).collect();
        assert_eq!(s.children(list), items);
        assert_eq!(s.descendants(list), items);
        assert_eq!(s.parent(items[0]), Some(list));
        assert_eq!(s.parent(list), Some(ElementId::ROOT));
        assert_eq!(s.parent(ElementId::ROOT), None);
    }

    #[test]
    fn clipped_points_are_not_contained() {
        let s = snapshot();
        let third = ElementId::indexed("item", 2);
        // Third item spans y 80..120 but the list clips at y 50.
        assert!(!s.contains_point(third, Point::new(10.0, 90.0)));
        let second = ElementId::indexed("item", 1);
        assert!(s.contains_point(second, Point::new(10.0, 45.0)));
        assert!(!s.contains_point(second, Point::new(10.0, 60.0)));
    }

    #[test]
    fn hit_test_is_topmost_first() {
        let s = snapshot();
        let hits = s.hit_test(Point::new(10.0, 10.0));
        assert_eq!(
            hits,
            vec![
                ElementId::named("popup"),
                ElementId::indexed("item", 0),
                ElementId::named("list"),
                ElementId::ROOT
            ]
        );
    }

    #[test]
    fn scroll_container_reports_limits() {
        let s = snapshot();
        let data = s.scroll_container(ElementId::named("list")).unwrap();
        assert_eq!(data.content_size, Size::new(100.0, 120.0));
        assert_eq!(data.max_offset(), Point::new(0.0, 70.0));
        assert_eq!(s.scroll_limit(ElementId::named("popup")), None);
    }
}
