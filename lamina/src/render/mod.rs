//! Paint commands.
//!
//! The finalized tree is flattened into an ordered command list: each node
//! paints its background, its text lines and its border, then its
//! descendants. Floating subtrees are separate layers painted after the flow
//! tree. Clip markers are inserted afterwards and the list is
//! stably sorted by z-index.

pub(crate) mod clip;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, Node, NodeHandle};
use crate::id::ElementId;
use crate::layout::config::{BorderWidth, CornerRadius};
use crate::primitives::{Color, Rect};
use crate::text::TextAlignment;

/// Kind-specific payload of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderData {
    Rectangle {
        color: Color,
        corner_radius: CornerRadius,
    },
    Text {
        text: String,
        font_id: u16,
        font_size: f32,
        line_height: f32,
        letter_spacing: f32,
        color: Color,
    },
    Border {
        color: Color,
        width: BorderWidth,
        corner_radius: CornerRadius,
    },
    ClipStart {
        horizontal: bool,
        vertical: bool,
    },
    ClipEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderCommandKind {
    Rectangle,
    TextLine,
    Border,
    ClipStart,
    ClipEnd,
}

/// One paint instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCommand {
    /// Element that produced the command.
    pub id: ElementId,
    pub bounding_box: Rect,
    pub z_index: i16,
    pub data: RenderData,
}

impl RenderCommand {
    pub fn kind(&self) -> RenderCommandKind {
        match self.data {
            RenderData::Rectangle { .. } => RenderCommandKind::Rectangle,
            RenderData::Text { .. } => RenderCommandKind::TextLine,
            RenderData::Border { .. } => RenderCommandKind::Border,
            RenderData::ClipStart { .. } => RenderCommandKind::ClipStart,
            RenderData::ClipEnd => RenderCommandKind::ClipEnd,
        }
    }

    pub fn is_clip(&self) -> bool {
        matches!(self.data, RenderData::ClipStart { .. } | RenderData::ClipEnd)
    }
}

/// Nodes in paint order, before the z sort, each with its layer's z-index.
///
/// The flow tree comes first in pre-order; every floating subtree follows as
/// its own layer, in the order the layers were found.
pub(crate) fn paint_order(arena: &Arena) -> Vec<(NodeHandle, i16)> {
    let mut order = Vec::with_capacity(arena.len());
    let mut layers = VecDeque::from([NodeHandle::ROOT]);

    while let Some(layer) = layers.pop_front() {
        let z = arena.at(layer).floating.map_or(0, |f| f.z_index);
        let mut stack = vec![layer];
        while let Some(handle) = stack.pop() {
            order.push((handle, z));
            let node = arena.at(handle);
            for &child in &node.children {
                if arena.at(child).is_floating() {
                    layers.push_back(child);
                }
            }
            stack.extend(node.children.iter().rev().copied().filter(|c| !arena.at(*c).is_floating()));
        }
    }
    order
}

/// Build the final command list: node commands, clip markers, z sort.
pub(crate) fn build(arena: &Arena) -> Vec<RenderCommand> {
    let order = paint_order(arena);
    let viewport = Rect::from_origin_size(Default::default(), arena.viewport());
    let cull = arena.settings().cull_offscreen;

    let mut painted = Vec::new();
    for &(handle, z) in &order {
        let node = arena.at(handle);
        if cull && !node.bounding_box.intersects(&viewport) {
            continue;
        }
        emit_node(node, z, |command| painted.push((handle, command)));
    }

    let mut commands = clip::insert_clips(arena, painted);
    // Stable: equal z keeps declaration order.
    commands.sort_by_key(|c| c.z_index);
    commands
}

fn emit_node(node: &Node, z_index: i16, mut emit: impl FnMut(RenderCommand)) {
    let bounds = node.bounding_box;

    if let Some(background) = node.background.filter(|b| b.color.is_visible()) {
        emit(RenderCommand {
            id: node.id,
            bounding_box: bounds,
            z_index,
            data: RenderData::Rectangle {
                color: background.color,
                corner_radius: background.corner_radius,
            },
        });
    }

    if let Some(text) = &node.text {
        let lines = text.wrapped_lines.as_deref().unwrap_or_default();
        for (i, line) in lines.iter().enumerate() {
            if line.len == 0 {
                continue;
            }
            let x = match text.style.alignment {
                TextAlignment::Left => 0.0,
                TextAlignment::Center => (bounds.width - line.width) / 2.0,
                TextAlignment::Right => bounds.width - line.width,
            };
            emit(RenderCommand {
                id: node.id,
                bounding_box: Rect::new(
                    bounds.x + x,
                    bounds.y + i as f32 * text.line_height,
                    line.width,
                    line.height,
                ),
                z_index,
                data: RenderData::Text {
                    text: line.text(&text.content).to_string(),
                    font_id: text.style.font_id,
                    font_size: text.style.font_size,
                    line_height: text.line_height,
                    letter_spacing: text.style.letter_spacing,
                    color: text.style.color,
                },
            });
        }
    }

    if let Some(border) = node.border.filter(|b| !b.width.is_zero()) {
        emit(RenderCommand {
            id: node.id,
            bounding_box: bounds,
            z_index,
            data: RenderData::Border {
                color: border.color,
                width: border.width,
                corner_radius: border.corner_radius,
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::{ElementDeclaration, FloatingConfig};
    use crate::primitives::Size;
    use crate::text::{TextMeasurement, TextStyle, WrappedLine};

    #[test]
    fn paint_order_defers_floating_layers() {
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let a = arena.push_container(ElementDeclaration::new());
        let f = arena.push_container(ElementDeclaration::new().floating(FloatingConfig {
            z_index: 3,
            ..FloatingConfig::default()
        }));
        let a1 = arena.push_container(ElementDeclaration::new());
        let b = arena.push_container(ElementDeclaration::new());
        arena.append_child(NodeHandle::ROOT, a).unwrap();
        arena.append_child(a, f).unwrap();
        arena.append_child(a, a1).unwrap();
        arena.append_child(NodeHandle::ROOT, b).unwrap();

        let order = paint_order(&arena);
        assert_eq!(order, vec![(NodeHandle::ROOT, 0), (a, 0), (a1, 0), (b, 0), (f, 3)]);
    }

    #[test]
    fn node_emits_background_text_border_in_order() {
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let t = arena.push_text("hi there", TextStyle::default(), TextMeasurement::new(80.0, 10.0));
        arena.append_child(NodeHandle::ROOT, t).unwrap();
        let node = arena.at_mut(t);
        node.background = Some(crate::layout::config::BackgroundConfig {
            color: Color::BLUE,
            corner_radius: CornerRadius::default(),
        });
        node.border = Some(crate::layout::config::BorderConfig {
            color: Color::RED,
            width: BorderWidth::all(1.0),
            corner_radius: CornerRadius::default(),
        });
        node.bounding_box = Rect::new(0.0, 0.0, 80.0, 20.0);
        if let Some(text) = node.text.as_mut() {
            text.line_height = 10.0;
            text.wrapped_lines = Some(vec![
                WrappedLine { start: 0, len: 2, width: 20.0, height: 10.0 },
                WrappedLine { start: 3, len: 5, width: 50.0, height: 10.0 },
            ]);
        }

        let mut out = Vec::new();
        emit_node(arena.at(t), 0, |c| out.push(c));
        let kinds: Vec<_> = out.iter().map(RenderCommand::kind).collect();
        assert_eq!(
            kinds,
            vec![
                RenderCommandKind::Rectangle,
                RenderCommandKind::TextLine,
                RenderCommandKind::TextLine,
                RenderCommandKind::Border
            ]
        );
        assert_eq!(out[2].bounding_box, Rect::new(0.0, 10.0, 50.0, 10.0));
        assert!(matches!(&out[2].data, RenderData::Text { text, .. } if text == "there"));
    }

    #[test]
    fn text_lines_align_within_box() {
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let style = TextStyle::default().align(TextAlignment::Right);
        let t = arena.push_text("ab", style, TextMeasurement::new(20.0, 10.0));
        arena.append_child(NodeHandle::ROOT, t).unwrap();
        let node = arena.at_mut(t);
        node.bounding_box = Rect::new(5.0, 0.0, 100.0, 10.0);
        if let Some(text) = node.text.as_mut() {
            text.wrapped_lines = Some(vec![WrappedLine { start: 0, len: 2, width: 20.0, height: 10.0 }]);
        }

        let mut out = Vec::new();
        emit_node(arena.at(t), 0, |c| out.push(c));
        assert_eq!(out[0].bounding_box.x, 85.0);
    }

    #[test]
    fn invisible_background_and_zero_border_are_skipped() {
        let mut arena = Arena::new(Size::new(100.0, 100.0));
        let h = arena.push_container(ElementDeclaration::new().background(Color::TRANSPARENT).border(Color::RED, 0.0));
        arena.append_child(NodeHandle::ROOT, h).unwrap();
        let mut out = Vec::new();
        emit_node(arena.at(h), 0, |c| out.push(c));
        assert!(out.is_empty());
    }
}
