//! Axis sizing engine.
//!
//! Sizes every node along one axis in three sweeps:
//!
//! 1. initialize, parents first: fixed values, grow minimums, text extents
//! 2. content, children first: fit and grow containers wrap their flow
//!    children, and every node records its content-derived floor
//! 3. distribute, parents first: percent children resolve, then free space is
//!    handed to growers or a deficit is taken back from the largest children
//!
//! Floating subtrees are distributed after the flow tree, each sized against
//! its reference box.

use std::collections::VecDeque;

use tracing::trace;

use crate::arena::{Arena, Node, NodeHandle};
use crate::layout::floating;
use crate::layout::sizing::{float_eq, Axis, SizingAxis, EPSILON};
use crate::layout::text_flow;

/// Run all three sweeps for `axis`.
pub(crate) fn size_along(arena: &mut Arena, axis: Axis) {
    let order = arena.bfs_order();
    initialize(arena, &order, axis);
    resolve_content(arena, &order, axis);
    distribute(arena, axis);
}

pub(crate) fn initialize(arena: &mut Arena, order: &[NodeHandle], axis: Axis) {
    for &handle in order {
        let node = arena.at(handle);
        let size = if node.is_text() {
            text_flow::text_extent(node, axis)
        } else {
            let sizing = node.sizing(axis);
            match sizing {
                SizingAxis::Fixed { value, .. } => sizing.clamp(value),
                SizingAxis::Grow { min, .. } => min,
                SizingAxis::Percent { .. } => sizing.clamp(0.0),
                SizingAxis::Fit { .. } => sizing.clamp(node.preferred(axis)),
            }
        };
        arena.at_mut(handle).set_dim(axis, size);
    }
}

/// Bottom-up content sizing. Also used on Y to push wrapped text heights up
/// the tree.
pub(crate) fn resolve_content(arena: &mut Arena, order: &[NodeHandle], axis: Axis) {
    for &handle in order.iter().rev() {
        let node = arena.at(handle);
        if node.is_text() {
            let floor = if axis == Axis::X && text_flow::is_wrappable(node) {
                text_flow::min_text_width(node)
            } else {
                node.dim(axis)
            };
            arena.at_mut(handle).set_min_dim(axis, floor);
            continue;
        }

        let layout = node.layout;
        let sizing = node.sizing(axis);
        let along_main = layout.direction.main_axis() == axis;
        let flow = arena.flow_children(handle);

        let mut content = 0.0f32;
        let mut floor = 0.0f32;
        for &child in &flow {
            let child = arena.at(child);
            let size = if child.sizing(axis).is_percent() { 0.0 } else { child.dim(axis) };
            if along_main {
                content += size;
                floor += child.min_dim(axis);
            } else {
                content = content.max(size);
                floor = floor.max(child.min_dim(axis));
            }
        }
        let mut extra = layout.padding.along(axis);
        if along_main && flow.len() > 1 {
            extra += layout.child_gap * (flow.len() - 1) as f32;
        }
        content += extra;
        floor += extra;

        let node = arena.at_mut(handle);
        let preferred = node.preferred(axis);
        match sizing {
            SizingAxis::Fit { .. } | SizingAxis::Grow { .. } => {
                node.set_dim(axis, sizing.clamp(content.max(preferred)));
                node.set_min_dim(axis, sizing.clamp(floor.max(preferred)));
            }
            SizingAxis::Fixed { .. } => {
                let size = node.dim(axis);
                node.set_min_dim(axis, size);
            }
            SizingAxis::Percent { min, .. } => node.set_min_dim(axis, min),
        }
    }
}

/// Top-down slack distribution over the flow tree, then each floating layer
/// once its reference box is sized.
pub(crate) fn distribute(arena: &mut Arena, axis: Axis) {
    let mut layers = VecDeque::new();
    distribute_subtree(arena, NodeHandle::ROOT, axis, &mut layers);
    floating::for_each_layer(arena, layers, |arena, layer, layers| {
        floating::size_against_reference(arena, layer, axis);
        distribute_subtree(arena, layer, axis, layers);
    });
}

fn distribute_subtree(
    arena: &mut Arena,
    start: NodeHandle,
    axis: Axis,
    layers: &mut VecDeque<NodeHandle>,
) {
    let mut queue = VecDeque::from([start]);
    while let Some(handle) = queue.pop_front() {
        for &child in &arena.at(handle).children {
            if arena.at(child).is_floating() {
                layers.push_back(child);
            } else {
                queue.push_back(child);
            }
        }
        if !arena.at(handle).is_text() {
            size_children(arena, handle, axis);
        }
    }
}

fn size_children(arena: &mut Arena, parent: NodeHandle, axis: Axis) {
    let flow = arena.flow_children(parent);
    if flow.is_empty() {
        return;
    }
    let node = arena.at(parent);
    let layout = node.layout;
    let parent_size = node.dim(axis);
    let scrolls = node.scroll.is_some_and(|s| s.scrolls(axis));
    let padding = layout.padding.along(axis);
    let along_main = layout.direction.main_axis() == axis;
    let gaps = if along_main {
        layout.child_gap * (flow.len() - 1) as f32
    } else {
        0.0
    };

    // Percent children are sized first and never touched again.
    let base = (parent_size - padding - gaps).max(0.0);
    for &child in &flow {
        let sizing = arena.at(child).sizing(axis);
        if let SizingAxis::Percent { value, .. } = sizing {
            arena.at_mut(child).set_dim(axis, sizing.clamp(value * base));
        }
    }

    if along_main {
        let content: f32 = flow.iter().map(|c| arena.at(*c).dim(axis)).sum::<f32>() + gaps;
        let slack = parent_size - padding - content;
        if slack < -EPSILON {
            if !scrolls {
                compress(arena, &flow, axis, -slack);
            }
        } else if slack > EPSILON {
            expand(arena, &flow, axis, slack);
        }
    } else {
        let inner = parent_size - padding;
        let content = flow.iter().map(|c| arena.at(*c).dim(axis)).fold(0.0, f32::max);
        let limit = if scrolls { inner.max(content) } else { inner };
        for &child in &flow {
            let node = arena.at(child);
            if !is_resizable(node, axis) {
                continue;
            }
            let sizing = node.sizing(axis);
            let mut size = node.dim(axis);
            if sizing.is_grow() {
                size = limit.min(sizing.max());
            }
            let size = node.min_dim(axis).max(size.min(limit));
            arena.at_mut(child).set_dim(axis, size);
        }
    }
}

/// Children whose size on `axis` the distribution sweep may change.
fn is_resizable(node: &Node, axis: Axis) -> bool {
    match node.sizing(axis) {
        SizingAxis::Fixed { .. } | SizingAxis::Percent { .. } => false,
        _ if node.is_text() => axis == Axis::X && text_flow::is_wrappable(node),
        _ => true,
    }
}

fn compression_floor(node: &Node, axis: Axis) -> f32 {
    if node.is_text() {
        text_flow::min_text_width(node)
    } else {
        node.sizing(axis).min()
    }
}

/// Take `deficit` back from the largest resizable children, levelling them
/// down together and never below their floors.
fn compress(arena: &mut Arena, children: &[NodeHandle], axis: Axis, mut deficit: f32) {
    let mut active: Vec<(NodeHandle, f32)> = children
        .iter()
        .filter_map(|&c| {
            let node = arena.at(c);
            if !is_resizable(node, axis) {
                return None;
            }
            let floor = compression_floor(node, axis);
            (node.dim(axis) > floor + EPSILON).then_some((c, floor))
        })
        .collect();

    let mut rounds = 0u32;
    while deficit > EPSILON && !active.is_empty() {
        rounds += 1;
        let sizes: Vec<f32> = active.iter().map(|(c, _)| arena.at(*c).dim(axis)).collect();
        let largest = sizes.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let second = sizes
            .iter()
            .copied()
            .filter(|s| !float_eq(*s, largest))
            .fold(0.0, f32::max);
        let tied = sizes.iter().filter(|s| float_eq(**s, largest)).count();
        let step = (largest - second).min(deficit / tied as f32);

        let mut applied = 0.0f32;
        active.retain(|&(child, floor)| {
            let current = arena.at(child).dim(axis);
            if !float_eq(current, largest) {
                return true;
            }
            let next = (current - step).max(floor);
            arena.at_mut(child).set_dim(axis, next);
            applied += current - next;
            next > floor + EPSILON
        });
        deficit -= applied;
        // A step below the sizes' precision rounds away.
        if applied <= f32::EPSILON {
            break;
        }
    }
    trace!(?axis, rounds, residual = deficit, "compressed children");
}

/// Hand `slack` to the smallest `Grow` children, levelling them up together
/// and never past their maximums. Slack left once every grower is capped
/// stays unused.
fn expand(arena: &mut Arena, children: &[NodeHandle], axis: Axis, mut slack: f32) {
    let mut active: Vec<NodeHandle> = children
        .iter()
        .copied()
        .filter(|&c| {
            let node = arena.at(c);
            let sizing = node.sizing(axis);
            sizing.is_grow() && node.dim(axis) < sizing.max() - EPSILON
        })
        .collect();

    let mut rounds = 0u32;
    while slack > EPSILON && !active.is_empty() {
        rounds += 1;
        let sizes: Vec<f32> = active.iter().map(|c| arena.at(*c).dim(axis)).collect();
        let smallest = sizes.iter().copied().fold(f32::INFINITY, f32::min);
        let second = sizes
            .iter()
            .copied()
            .filter(|s| !float_eq(*s, smallest))
            .fold(f32::INFINITY, f32::min);
        let tied = sizes.iter().filter(|s| float_eq(**s, smallest)).count();
        let step = (second - smallest).min(slack / tied as f32);

        let mut applied = 0.0f32;
        active.retain(|&child| {
            let node = arena.at(child);
            let current = node.dim(axis);
            if !float_eq(current, smallest) {
                return true;
            }
            let max = node.sizing(axis).max();
            let next = (current + step).min(max);
            arena.at_mut(child).set_dim(axis, next);
            applied += next - current;
            next < max - EPSILON
        });
        slack -= applied;
        if applied <= f32::EPSILON {
            break;
        }
    }
    trace!(?axis, rounds, unused = slack, "expanded growers");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::{ElementDeclaration, ScrollConfig};
    use crate::layout::sizing::{LayoutDirection, Padding, Sizing};
    use crate::primitives::Size;

    fn row(arena: &mut Arena, width: f32, gap: f32) -> NodeHandle {
        let h = arena.push_container(
            ElementDeclaration::new()
                .sizing(Sizing::new(SizingAxis::fixed(width), SizingAxis::fixed(50.0)))
                .child_gap(gap),
        );
        arena.append_child(NodeHandle::ROOT, h).unwrap();
        h
    }

    fn child(arena: &mut Arena, parent: NodeHandle, width: SizingAxis) -> NodeHandle {
        let h = arena.push_container(ElementDeclaration::new().sizing(Sizing::new(width, SizingAxis::fit())));
        arena.append_child(parent, h).unwrap();
        h
    }

    fn width(arena: &Arena, h: NodeHandle) -> f32 {
        arena.at(h).dimensions.width
    }

    #[test]
    fn growers_split_free_space() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 300.0, 10.0);
        let a = child(&mut arena, r, SizingAxis::grow());
        let b = child(&mut arena, r, SizingAxis::grow());
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 145.0);
        assert_eq!(width(&arena, b), 145.0);
    }

    #[test]
    fn smallest_grower_catches_up_first() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 100.0, 0.0);
        let a = child(&mut arena, r, SizingAxis::grow_between(60.0, f32::INFINITY));
        let b = child(&mut arena, r, SizingAxis::grow());
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 60.0);
        assert_eq!(width(&arena, b), 40.0);
    }

    #[test]
    fn capped_grower_leaves_rest_to_others() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 300.0, 0.0);
        let a = child(&mut arena, r, SizingAxis::grow_between(0.0, 50.0));
        let b = child(&mut arena, r, SizingAxis::grow());
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 50.0);
        assert_eq!(width(&arena, b), 250.0);
    }

    #[test]
    fn all_growers_capped_leaves_slack() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 300.0, 0.0);
        let a = child(&mut arena, r, SizingAxis::grow_between(0.0, 40.0));
        let b = child(&mut arena, r, SizingAxis::grow_between(0.0, 40.0));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 40.0);
        assert_eq!(width(&arena, b), 40.0);
    }

    #[test]
    fn percent_is_frozen_against_growers() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 300.0, 0.0);
        let fixed = child(&mut arena, r, SizingAxis::fixed(100.0));
        let grow = child(&mut arena, r, SizingAxis::grow());
        let pct = child(&mut arena, r, SizingAxis::percent(0.5));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, fixed), 100.0);
        assert_eq!(width(&arena, pct), 150.0);
        assert_eq!(width(&arena, grow), 50.0);
    }

    #[test]
    fn percent_base_excludes_padding_and_gaps() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = arena.push_container(
            ElementDeclaration::new()
                .sizing(Sizing::fixed(220.0, 50.0))
                .padding(Padding::symmetric(10.0, 0.0))
                .child_gap(20.0),
        );
        arena.append_child(NodeHandle::ROOT, r).unwrap();
        let a = child(&mut arena, r, SizingAxis::percent(0.5));
        let b = child(&mut arena, r, SizingAxis::percent(0.5));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 90.0);
        assert_eq!(width(&arena, b), 90.0);
    }

    #[test]
    fn overflow_levels_largest_children() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 100.0, 0.0);
        let a = child(&mut arena, r, SizingAxis::fit());
        let b = child(&mut arena, r, SizingAxis::fit());
        for parent in [a, b] {
            child(&mut arena, parent, SizingAxis::fixed(80.0));
        }
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 50.0);
        assert_eq!(width(&arena, b), 50.0);
    }

    #[test]
    fn compression_takes_from_largest_first() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 100.0, 0.0);
        let big = child(&mut arena, r, SizingAxis::fit());
        let small = child(&mut arena, r, SizingAxis::fit());
        child(&mut arena, big, SizingAxis::fixed(90.0));
        child(&mut arena, small, SizingAxis::fixed(30.0));
        size_along(&mut arena, Axis::X);
        // Deficit 20 comes entirely out of the 90-wide child.
        assert_eq!(width(&arena, big), 70.0);
        assert_eq!(width(&arena, small), 30.0);
    }

    #[test]
    fn compression_respects_minimums() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 100.0, 0.0);
        let a = child(&mut arena, r, SizingAxis::fit_between(70.0, f32::INFINITY));
        let b = child(&mut arena, r, SizingAxis::fit());
        for parent in [a, b] {
            child(&mut arena, parent, SizingAxis::fixed(80.0));
        }
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 70.0);
        assert_eq!(width(&arena, b), 30.0);
    }

    #[test]
    fn fixed_children_overflow_without_error() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 100.0, 0.0);
        let a = child(&mut arena, r, SizingAxis::fixed(80.0));
        let b = child(&mut arena, r, SizingAxis::fixed(80.0));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 80.0);
        assert_eq!(width(&arena, b), 80.0);
    }

    #[test]
    fn scroll_axis_never_compresses() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = arena.push_container(
            ElementDeclaration::new()
                .sizing(Sizing::fixed(100.0, 50.0))
                .scroll(ScrollConfig::horizontal()),
        );
        arena.append_child(NodeHandle::ROOT, r).unwrap();
        let a = child(&mut arena, r, SizingAxis::fit());
        child(&mut arena, a, SizingAxis::fixed(150.0));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, a), 150.0);
    }

    #[test]
    fn cross_axis_grow_fills_inner_size() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let col = arena.push_container(
            ElementDeclaration::new()
                .sizing(Sizing::fixed(200.0, 300.0))
                .padding(Padding::all(10.0))
                .direction(LayoutDirection::Column),
        );
        arena.append_child(NodeHandle::ROOT, col).unwrap();
        let full = child(&mut arena, col, SizingAxis::grow());
        let capped = child(&mut arena, col, SizingAxis::grow_between(0.0, 120.0));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, full), 180.0);
        assert_eq!(width(&arena, capped), 120.0);
    }

    #[test]
    fn fit_wraps_children_with_padding_and_gaps() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let fit = arena.push_container(
            ElementDeclaration::new()
                .padding(Padding::symmetric(5.0, 0.0))
                .child_gap(10.0),
        );
        arena.append_child(NodeHandle::ROOT, fit).unwrap();
        child(&mut arena, fit, SizingAxis::fixed(40.0));
        child(&mut arena, fit, SizingAxis::fixed(60.0));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, fit), 120.0);
        assert_eq!(arena.at(fit).min_dimensions.width, 120.0);
    }

    #[test]
    fn fit_clamps_to_bounds() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let fit = arena.push_container(
            ElementDeclaration::new().sizing(Sizing::new(SizingAxis::fit_between(0.0, 50.0), SizingAxis::fit())),
        );
        arena.append_child(NodeHandle::ROOT, fit).unwrap();
        child(&mut arena, fit, SizingAxis::fixed(80.0));
        size_along(&mut arena, Axis::X);
        assert_eq!(width(&arena, fit), 50.0);
    }

    // 2^24: above it f32 steps by 2, just below it by 1.
    const BIG: f32 = 16_777_216.0;

    #[test]
    fn expansion_stops_when_steps_round_away() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 3.0 * BIG + 8.0, 0.0);
        let growers: Vec<_> = (0..3)
            .map(|_| child(&mut arena, r, SizingAxis::grow_between(BIG, f32::INFINITY)))
            .collect();
        size_along(&mut arena, Axis::X);
        for g in growers {
            assert_eq!(width(&arena, g), BIG + 2.0);
        }
    }

    #[test]
    fn compression_stops_when_steps_round_away() {
        let mut arena = Arena::new(Size::new(800.0, 600.0));
        let r = row(&mut arena, 3.0 * BIG - 4.0, 0.0);
        let fits: Vec<_> = (0..3)
            .map(|_| {
                let fit = child(&mut arena, r, SizingAxis::fit());
                child(&mut arena, fit, SizingAxis::fixed(BIG));
                fit
            })
            .collect();
        size_along(&mut arena, Axis::X);
        for f in fits {
            assert_eq!(width(&arena, f), BIG - 1.0);
        }
    }
}
