//! Clip marker insertion.
//!
//! Walks the painted commands in order with a stack of open clip regions.
//! Before each command the stack is brought in line with the command's clip
//! chain (its clipping ancestors, outermost first): regions the command is not
//! in are closed innermost first, missing ones are opened. Every region is
//! therefore opened and closed exactly once and pairs always nest.

use crate::arena::{Arena, NodeHandle};
use crate::render::{RenderCommand, RenderData};

/// Clipping ancestors of `handle`, outermost first.
///
/// The chain stops at a floating node: a floating layer is not clipped by the
/// regions of the tree it is declared in.
pub(crate) fn clip_chain(arena: &Arena, handle: NodeHandle) -> Vec<NodeHandle> {
    let mut chain = Vec::new();
    let node = arena.at(handle);
    if node.is_floating() {
        return chain;
    }
    let mut cursor = node.parent;
    while let Some(current) = cursor {
        let ancestor = arena.at(current);
        if ancestor.clips() {
            chain.push(current);
        }
        if ancestor.is_floating() {
            break;
        }
        cursor = ancestor.parent;
    }
    chain.reverse();
    chain
}

/// Layer z-index of a node: that of its nearest floating ancestor-or-self.
fn layer_z(arena: &Arena, handle: NodeHandle) -> i16 {
    let mut cursor = Some(handle);
    while let Some(current) = cursor {
        let node = arena.at(current);
        if let Some(floating) = node.floating {
            return floating.z_index;
        }
        cursor = node.parent;
    }
    0
}

struct ClipStack<'a> {
    arena: &'a Arena,
    open: Vec<NodeHandle>,
    out: Vec<RenderCommand>,
}

impl<'a> ClipStack<'a> {
    fn marker(&self, handle: NodeHandle, data: RenderData) -> RenderCommand {
        let node = self.arena.at(handle);
        RenderCommand {
            id: node.id,
            bounding_box: node.bounding_box,
            z_index: layer_z(self.arena, handle),
            data,
        }
    }

    fn push_clip(&mut self, handle: NodeHandle) {
        let scroll = self.arena.at(handle).scroll.unwrap_or_default();
        let start = self.marker(
            handle,
            RenderData::ClipStart {
                horizontal: scroll.horizontal,
                vertical: scroll.vertical,
            },
        );
        self.out.push(start);
        self.open.push(handle);
    }

    fn pop_clip(&mut self) {
        if let Some(handle) = self.open.pop() {
            let end = self.marker(handle, RenderData::ClipEnd);
            self.out.push(end);
        }
    }

    /// Close and open regions until exactly `chain` is open.
    fn sync(&mut self, chain: &[NodeHandle]) {
        let shared = self
            .open
            .iter()
            .zip(chain)
            .take_while(|(open, wanted)| open == wanted)
            .count();
        while self.open.len() > shared {
            self.pop_clip();
        }
        for &handle in &chain[shared..] {
            self.push_clip(handle);
        }
    }
}

pub(crate) fn insert_clips(
    arena: &Arena,
    painted: Vec<(NodeHandle, RenderCommand)>,
) -> Vec<RenderCommand> {
    let mut stack = ClipStack {
        arena,
        open: Vec::new(),
        out: Vec::with_capacity(painted.len()),
    };
    // Commands of one node are adjacent; reuse its chain.
    let mut cached: Option<(NodeHandle, Vec<NodeHandle>)> = None;

    for (handle, command) in painted {
        let chain = match cached.take() {
            Some((h, chain)) if h == handle => chain,
            _ => clip_chain(arena, handle),
        };
        stack.sync(&chain);
        stack.out.push(command);
        cached = Some((handle, chain));
    }
    stack.sync(&[]);
    stack.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::{ElementDeclaration, FloatingConfig, ScrollConfig};
    use crate::primitives::{Color, Size};
    use crate::render::RenderCommandKind;

    fn rect(arena: &Arena, handle: NodeHandle) -> (NodeHandle, RenderCommand) {
        let node = arena.at(handle);
        (
            handle,
            RenderCommand {
                id: node.id,
                bounding_box: node.bounding_box,
                z_index: 0,
                data: RenderData::Rectangle { color: Color::WHITE, corner_radius: Default::default() },
            },
        )
    }

    fn attach(arena: &mut Arena, parent: NodeHandle, decl: ElementDeclaration) -> NodeHandle {
        let h = arena.push_container(decl);
        arena.append_child(parent, h).unwrap();
        h
    }

    fn kinds(commands: &[RenderCommand]) -> Vec<RenderCommandKind> {
        commands.iter().map(RenderCommand::kind).collect()
    }

    #[test]
    fn nested_regions_close_in_reverse_order() {
        use RenderCommandKind::*;
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let outer = attach(&mut arena, NodeHandle::ROOT, ElementDeclaration::new().scroll(ScrollConfig::vertical()));
        let inner = attach(&mut arena, outer, ElementDeclaration::new().scroll(ScrollConfig::both()));
        let leaf = attach(&mut arena, inner, ElementDeclaration::new());
        let after = attach(&mut arena, outer, ElementDeclaration::new());
        let outside = attach(&mut arena, NodeHandle::ROOT, ElementDeclaration::new());

        let painted = [outer, inner, leaf, after, outside].map(|h| rect(&arena, h)).to_vec();
        let out = insert_clips(&arena, painted);
        assert_eq!(
            kinds(&out),
            vec![
                Rectangle, ClipStart, Rectangle, ClipStart, Rectangle, ClipEnd, Rectangle, ClipEnd,
                Rectangle
            ]
        );
        assert_eq!(out[1].id, arena.at(outer).id);
        assert_eq!(out[3].id, arena.at(inner).id);
        assert_eq!(out[5].id, arena.at(inner).id);
        assert_eq!(out[7].id, arena.at(outer).id);
    }

    #[test]
    fn region_without_descendant_commands_emits_nothing() {
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let scroller = attach(&mut arena, NodeHandle::ROOT, ElementDeclaration::new().scroll(ScrollConfig::vertical()));
        attach(&mut arena, scroller, ElementDeclaration::new());

        let out = insert_clips(&arena, vec![rect(&arena, scroller)]);
        assert_eq!(kinds(&out), vec![RenderCommandKind::Rectangle]);
    }

    #[test]
    fn trailing_regions_are_closed() {
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let scroller = attach(&mut arena, NodeHandle::ROOT, ElementDeclaration::new().scroll(ScrollConfig::vertical()));
        let leaf = attach(&mut arena, scroller, ElementDeclaration::new());

        let out = insert_clips(&arena, vec![rect(&arena, leaf)]);
        assert_eq!(
            kinds(&out),
            vec![RenderCommandKind::ClipStart, RenderCommandKind::Rectangle, RenderCommandKind::ClipEnd]
        );
    }

    #[test]
    fn floating_layers_escape_ancestor_clips() {
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let scroller = attach(&mut arena, NodeHandle::ROOT, ElementDeclaration::new().scroll(ScrollConfig::vertical()));
        let popup = attach(
            &mut arena,
            scroller,
            ElementDeclaration::new().floating(FloatingConfig { z_index: 2, ..FloatingConfig::default() }),
        );
        let inside = attach(&mut arena, popup, ElementDeclaration::new());

        assert!(clip_chain(&arena, popup).is_empty());
        assert!(clip_chain(&arena, inside).is_empty());
        assert_eq!(layer_z(&arena, inside), 2);
    }
}
