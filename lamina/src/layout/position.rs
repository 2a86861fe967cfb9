//! Depth-first placement.
//!
//! Each container lays its flow children out along its main axis, aligns them
//! on both axes and shifts them by its scroll offset. Boxes are absolute, so a
//! nested scroll container's offset reaches its own subtree exactly once.
//! Floating subtrees are placed after the flow tree, each after its reference.

use std::collections::VecDeque;

use tracing::trace;

use crate::arena::{Arena, NodeHandle};
use crate::layout::floating;
use crate::layout::sizing::Axis;
use crate::primitives::{Point, Rect, Size};
use crate::scroll::ScrollOffsets;

fn point_on(main: Axis, along: f32, across: f32) -> Point {
    match main {
        Axis::X => Point::new(along, across),
        Axis::Y => Point::new(across, along),
    }
}

fn size_on(main: Axis, along: f32, across: f32) -> Size {
    match main {
        Axis::X => Size::new(along, across),
        Axis::Y => Size::new(across, along),
    }
}

pub(crate) fn position_all(arena: &mut Arena, scroll: &ScrollOffsets) {
    let root = arena.at(NodeHandle::ROOT).dimensions;
    arena.at_mut(NodeHandle::ROOT).bounding_box = Rect::from_origin_size(Point::ORIGIN, root);

    let mut layers = VecDeque::new();
    place_subtree(arena, NodeHandle::ROOT, scroll, &mut layers);
    floating::for_each_layer(arena, layers, |arena, layer, layers| {
        floating::place(arena, layer);
        place_subtree(arena, layer, scroll, layers);
    });
}

fn place_subtree(
    arena: &mut Arena,
    start: NodeHandle,
    scroll: &ScrollOffsets,
    layers: &mut VecDeque<NodeHandle>,
) {
    let mut stack = vec![start];
    while let Some(handle) = stack.pop() {
        place_children(arena, handle, scroll);
        let node = arena.at(handle);
        for &child in &node.children {
            if arena.at(child).is_floating() {
                layers.push_back(child);
            }
        }
        stack.extend(node.children.iter().rev().copied().filter(|c| !arena.at(*c).is_floating()));
    }
}

/// Offset applied to a scroll container's children this frame.
///
/// A stored scroll position wins over the configured offset, and only moves
/// content along the axes the container actually scrolls.
fn child_offset(arena: &Arena, handle: NodeHandle, scroll: &ScrollOffsets) -> Point {
    let node = arena.at(handle);
    let Some(config) = node.scroll else {
        return Point::ORIGIN;
    };
    match scroll.get(node.id) {
        Some(position) => Point::new(
            if config.horizontal { -position.x } else { 0.0 },
            if config.vertical { -position.y } else { 0.0 },
        ),
        None => config.child_offset,
    }
}

fn place_children(arena: &mut Arena, parent: NodeHandle, scroll: &ScrollOffsets) {
    let node = arena.at(parent);
    if node.is_text() {
        return;
    }
    let layout = node.layout;
    let main = layout.direction.main_axis();
    let cross = main.cross();
    let dims = node.dimensions;
    let mut origin = node.bounding_box.origin();
    if let Some(floating) = node.floating {
        // Children stay put inside an expanded floating box.
        origin = origin + Point::new(floating.expand.width, floating.expand.height);
    }
    let offset = child_offset(arena, parent, scroll);

    let flow = arena.flow_children(parent);
    let gaps = layout.child_gap * flow.len().saturating_sub(1) as f32;
    let content_main: f32 = flow.iter().map(|c| arena.at(*c).dim(main)).sum::<f32>() + gaps;
    let content_cross = flow.iter().map(|c| arena.at(*c).dim(cross)).fold(0.0, f32::max);

    let parent_main = match main {
        Axis::X => dims.width,
        Axis::Y => dims.height,
    };
    let parent_cross = match cross {
        Axis::X => dims.width,
        Axis::Y => dims.height,
    };
    let free_main = (parent_main - layout.padding.along(main) - content_main).max(0.0);
    let mut cursor = layout.padding.start(main) + free_main * layout.child_alignment.factor(main);

    for &child in &flow {
        let child_node = arena.at(child);
        let along = child_node.dim(main);
        let across = child_node.dim(cross);
        let free_cross = parent_cross - layout.padding.along(cross) - across;
        let cross_pos = layout.padding.start(cross) + free_cross * layout.child_alignment.factor(cross);

        let local = point_on(main, cursor, cross_pos);
        let bounds = Rect::from_origin_size(origin + local + offset, child_node.dimensions);
        arena.at_mut(child).bounding_box = bounds;
        cursor += along + layout.child_gap;
    }

    let content_size = size_on(
        main,
        content_main + layout.padding.along(main),
        content_cross + layout.padding.along(cross),
    );
    let node = arena.at_mut(parent);
    node.content_size = content_size;
    node.child_offset = offset;
    if node.scroll.is_some() {
        trace!(element = %node.id, ?content_size, ?offset, "scroll container placed");
    }
}
