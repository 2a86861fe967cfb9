//! Floating positioner.
//!
//! Floating nodes sit outside normal flow. Each one is sized against and
//! anchored to a reference box: the root, its tree parent, or another element
//! found by id.

use std::collections::VecDeque;

use tracing::{trace, warn};

use crate::arena::{Arena, NodeHandle};
use crate::layout::config::AttachTo;
use crate::layout::sizing::{Axis, SizingAxis};
use crate::primitives::Rect;

/// Resolve every floating node's reference box once per frame.
///
/// An `AttachTo::Element` id that names no element falls back to the root.
pub(crate) fn resolve_references(arena: &mut Arena) {
    let floating: Vec<NodeHandle> = arena
        .nodes()
        .filter(|(_, n)| n.is_floating())
        .map(|(h, _)| h)
        .collect();

    for handle in floating {
        let node = arena.at(handle);
        let Some(config) = node.floating else { continue };
        let reference = match config.attach_to {
            AttachTo::Root => NodeHandle::ROOT,
            AttachTo::Parent => node.parent.unwrap_or(NodeHandle::ROOT),
            AttachTo::Element(id) => match arena.handle_of(id) {
                Some(target) if target != handle => target,
                _ => {
                    warn!(%id, element = %node.id, "floating target not found, attaching to root");
                    NodeHandle::ROOT
                }
            },
        };
        arena.at_mut(handle).float_reference = Some(reference);
    }
}

/// The floating node whose layer contains `handle`, or the root for nodes in
/// normal flow.
pub(crate) fn layer_of(arena: &Arena, handle: NodeHandle) -> NodeHandle {
    let mut current = handle;
    loop {
        let node = arena.at(current);
        if node.is_floating() {
            return current;
        }
        match node.parent {
            Some(parent) => current = parent,
            None => return NodeHandle::ROOT,
        }
    }
}

/// Run `visit` on every floating layer in `pending`, each one only after the
/// layer holding its reference box.
///
/// `visit` may queue the layers nested inside the one it handles. When every
/// pending layer waits on another pending layer, the first one is re-attached
/// to the root.
pub(crate) fn for_each_layer(
    arena: &mut Arena,
    mut pending: VecDeque<NodeHandle>,
    mut visit: impl FnMut(&mut Arena, NodeHandle, &mut VecDeque<NodeHandle>),
) {
    let mut done = vec![false; arena.len()];
    let mut deferred = 0usize;
    while let Some(layer) = pending.pop_front() {
        let reference = arena.at(layer).float_reference.unwrap_or(NodeHandle::ROOT);
        let holder = layer_of(arena, reference);
        if holder != NodeHandle::ROOT && !done[holder.index()] {
            if deferred <= pending.len() {
                deferred += 1;
                pending.push_back(layer);
                continue;
            }
            let node = arena.at(layer);
            warn!(element = %node.id, target = %arena.at(reference).id, "floating reference cycle, attaching to root");
            arena.at_mut(layer).float_reference = Some(NodeHandle::ROOT);
        }
        deferred = 0;
        visit(arena, layer, &mut pending);
        done[layer.index()] = true;
    }
}

/// Size a floating node's `Grow`/`Percent` axis from its reference box.
pub(crate) fn size_against_reference(arena: &mut Arena, handle: NodeHandle, axis: Axis) {
    let node = arena.at(handle);
    let reference = node.float_reference.unwrap_or(NodeHandle::ROOT);
    let available = arena.at(reference).dim(axis);
    let sizing = node.sizing(axis);
    let size = match sizing {
        SizingAxis::Grow { .. } => sizing.clamp(available),
        SizingAxis::Percent { value, .. } => sizing.clamp(value * available),
        SizingAxis::Fit { .. } | SizingAxis::Fixed { .. } => return,
    };
    arena.at_mut(handle).set_dim(axis, size);
}

/// Place a floating node over its (already positioned) reference box.
pub(crate) fn place(arena: &mut Arena, handle: NodeHandle) {
    let node = arena.at(handle);
    let Some(config) = node.floating else { return };
    let reference = node.float_reference.unwrap_or(NodeHandle::ROOT);
    let target = arena.at(reference).bounding_box;

    let anchor = target.origin() + config.attach_points.parent.offset_in(target.size());
    let own = config.attach_points.element.offset_in(node.dimensions);
    let origin = anchor - own + config.offset;
    let bounds = Rect::from_origin_size(origin, node.dimensions).expand(config.expand);

    trace!(element = %node.id, reference = %reference, ?bounds, "floating placed");
    arena.at_mut(handle).bounding_box = bounds;
}
