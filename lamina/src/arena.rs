//! Element arena: one frame's tree of nodes.
//!
//! Nodes live in a flat `Vec` addressed by [`NodeHandle`]. Handle 0 is always
//! the root, fixed to the viewport. Nodes are only ever appended; the tree
//! relation is recorded both ways (`children` plus an explicit `parent`) so
//! parent lookup never scans the arena.

use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexMap;
use tracing::warn;

use crate::engine::LayoutSettings;
use crate::error::LayoutError;
use crate::id::ElementId;
use crate::layout::config::{
    BackgroundConfig, BorderConfig, ElementDeclaration, FloatingConfig, ScrollConfig,
};
use crate::layout::sizing::{Axis, LayoutConfig, Sizing, SizingAxis};
use crate::primitives::{Point, Rect, Size};
use crate::text::{TextMeasurement, TextStyle, WrappedLine};

/// Index of a node in its arena. Only meaningful for the frame that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    pub const ROOT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    Text,
}

/// Text leaf payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    pub content: String,
    pub style: TextStyle,
    /// Measurement of the unwrapped string, taken at declaration time.
    pub measurement: TextMeasurement,
    pub line_height: f32,
    /// `None` until the wrap pass runs.
    pub wrapped_lines: Option<Vec<WrappedLine>>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: ElementId,
    pub kind: NodeKind,
    pub layout: LayoutConfig,
    pub background: Option<BackgroundConfig>,
    pub border: Option<BorderConfig>,
    pub scroll: Option<ScrollConfig>,
    pub floating: Option<FloatingConfig>,
    pub aspect_ratio: Option<f32>,
    pub children: Vec<NodeHandle>,
    pub parent: Option<NodeHandle>,
    pub dimensions: Size,
    /// Content-derived floor, clamped into the sizing bounds.
    pub min_dimensions: Size,
    /// Final box. Only valid after the position pass.
    pub bounding_box: Rect,
    /// Extent of flow children plus padding; what a scroll container scrolls over.
    pub content_size: Size,
    /// Offset actually applied to children during positioning.
    pub child_offset: Point,
    pub text: Option<TextData>,
    /// Size known at declaration time: text measurement or aspect-derived value.
    pub(crate) preferred: Size,
    /// Reference box for floating nodes, resolved once per finalize.
    pub(crate) float_reference: Option<NodeHandle>,
    explicit_id: bool,
}

impl Node {
    fn new(id: ElementId, kind: NodeKind, layout: LayoutConfig) -> Self {
        Self {
            id,
            kind,
            layout,
            background: None,
            border: None,
            scroll: None,
            floating: None,
            aspect_ratio: None,
            children: Vec::new(),
            parent: None,
            dimensions: Size::ZERO,
            min_dimensions: Size::ZERO,
            bounding_box: Rect::ZERO,
            content_size: Size::ZERO,
            child_offset: Point::ORIGIN,
            text: None,
            preferred: Size::ZERO,
            float_reference: None,
            explicit_id: false,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_floating(&self) -> bool {
        self.floating.is_some()
    }

    pub fn sizing(&self, axis: Axis) -> SizingAxis {
        self.layout.sizing.axis(axis)
    }

    #[inline]
    pub(crate) fn dim(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.dimensions.width,
            Axis::Y => self.dimensions.height,
        }
    }

    #[inline]
    pub(crate) fn set_dim(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.dimensions.width = value,
            Axis::Y => self.dimensions.height = value,
        }
    }

    #[inline]
    pub(crate) fn min_dim(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.min_dimensions.width,
            Axis::Y => self.min_dimensions.height,
        }
    }

    #[inline]
    pub(crate) fn set_min_dim(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.min_dimensions.width = value,
            Axis::Y => self.min_dimensions.height = value,
        }
    }

    #[inline]
    pub(crate) fn preferred(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.preferred.width,
            Axis::Y => self.preferred.height,
        }
    }

    /// Whether this node clips its descendants.
    pub fn clips(&self) -> bool {
        self.scroll.is_some_and(|s| s.horizontal || s.vertical)
    }
}

/// Append-only tree of nodes for one frame.
#[derive(Debug, Clone)]
pub struct Arena {
    nodes: Vec<Node>,
    viewport: Size,
    settings: LayoutSettings,
    ids: IndexMap<ElementId, NodeHandle>,
}

impl Arena {
    /// Create an arena holding only the root, fixed to `viewport`.
    pub fn new(viewport: Size) -> Self {
        Self::with_settings(viewport, LayoutSettings::default())
    }

    pub fn with_settings(viewport: Size, settings: LayoutSettings) -> Self {
        let viewport = Size::new(clean(viewport.width), clean(viewport.height));
        let layout = LayoutConfig {
            sizing: root_sizing(viewport),
            ..LayoutConfig::default()
        };
        let mut root = Node::new(ElementId::ROOT, NodeKind::Container, layout);
        root.explicit_id = true;
        root.dimensions = viewport;

        let mut ids = IndexMap::new();
        ids.insert(ElementId::ROOT, NodeHandle::ROOT);

        Self {
            nodes: vec![root],
            viewport,
            settings,
            ids,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: LayoutSettings) {
        self.settings = settings;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the root always exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    pub fn node(&self, handle: NodeHandle) -> Result<&Node, LayoutError> {
        self.nodes.get(handle.0).ok_or(LayoutError::UnknownNode(handle))
    }

    pub fn handle_of(&self, id: ElementId) -> Option<NodeHandle> {
        self.ids.get(&id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeHandle(i), n))
    }

    /// Apply a declaration's layout and configs to the root.
    ///
    /// The root's sizing stays pinned to the viewport and it never floats.
    pub fn configure_root(&mut self, declaration: ElementDeclaration) {
        let root = &mut self.nodes[0];
        root.layout = LayoutConfig {
            sizing: root_sizing(self.viewport),
            ..declaration.layout.normalized()
        };
        root.background = declaration.background;
        root.border = declaration.border;
        root.scroll = declaration.scroll;
        if declaration.floating.is_some() {
            warn!("floating config on the root element ignored");
        }
    }

    /// Append a detached container node.
    pub fn push_container(&mut self, declaration: ElementDeclaration) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        let layout = declaration.layout.normalized();
        let mut node = Node::new(placeholder_id(handle), NodeKind::Container, layout);
        node.background = declaration.background;
        node.border = declaration.border;
        node.scroll = declaration.scroll;
        node.floating = declaration.floating;
        node.aspect_ratio = declaration.aspect_ratio.filter(|r| r.is_finite() && *r > 0.0);
        node.preferred = declared_size(&layout.sizing, node.aspect_ratio);

        if let Some(id) = declaration.id {
            node.id = id;
            node.explicit_id = true;
            self.register_id(id, handle);
        }
        self.nodes.push(node);
        handle
    }

    /// Append a detached text leaf with a measurement for its unwrapped content.
    pub fn push_text(
        &mut self,
        content: impl Into<String>,
        style: TextStyle,
        measurement: TextMeasurement,
    ) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        let content = content.into();
        let measurement = sanitize_measurement(measurement);
        if measurement.is_zero() && !content.is_empty() {
            warn!(%handle, "text has no measurement, laying out as zero size");
        }
        let line_height = crate::text::resolve_line_height(
            &style,
            &measurement,
            &content,
            self.settings.default_line_height,
        );

        let mut node = Node::new(placeholder_id(handle), NodeKind::Text, LayoutConfig::default());
        node.preferred = Size::new(measurement.width, measurement.height);
        node.text = Some(TextData {
            content,
            style,
            measurement,
            line_height,
            wrapped_lines: None,
        });
        self.nodes.push(node);
        handle
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Fails on unknown handles, on a child that already has a parent, on the
    /// root as a child, on text parents and on attachments that close a cycle.
    pub fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), LayoutError> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        if child == NodeHandle::ROOT {
            return Err(LayoutError::RootAsChild);
        }
        if parent_node.is_text() {
            return Err(LayoutError::TextParent(parent));
        }
        if let Some(existing) = self.nodes[child.0].parent {
            return Err(LayoutError::DuplicateChild { child, parent: existing });
        }
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(LayoutError::Cycle { child, parent });
            }
            cursor = self.nodes[current.0].parent;
        }

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.derive_ids(child);
        Ok(())
    }

    /// Check that every node is reachable from the root.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (handle, node) in self.nodes().skip(1) {
            if node.parent.is_none() {
                return Err(LayoutError::Detached(handle));
            }
        }
        Ok(())
    }

    /// Parents before children, siblings in declaration order.
    pub fn bfs_order(&self) -> Vec<NodeHandle> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([NodeHandle::ROOT]);
        while let Some(handle) = queue.pop_front() {
            order.push(handle);
            queue.extend(self.nodes[handle.0].children.iter().copied());
        }
        order
    }

    /// Pre-order walk of the subtree under `handle`, excluding `handle` itself.
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let Some(node) = self.get(handle) else {
            return out;
        };
        let mut stack: Vec<NodeHandle> = node.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    /// Children taking part in normal flow (floating children excluded).
    pub(crate) fn flow_children(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        self.nodes[handle.0]
            .children
            .iter()
            .copied()
            .filter(|c| !self.nodes[c.0].is_floating())
            .collect()
    }

    #[inline]
    pub(crate) fn at(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle.0]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, handle: NodeHandle) -> &mut Node {
        &mut self.nodes[handle.0]
    }

    fn register_id(&mut self, id: ElementId, handle: NodeHandle) {
        if let Some(existing) = self.ids.get(&id) {
            warn!(%id, first = %existing, duplicate = %handle, "duplicate element id, keeping first");
            return;
        }
        self.ids.insert(id, handle);
    }

    /// Give anonymous nodes in a freshly attached subtree ids derived from
    /// their parent id and sibling index.
    fn derive_ids(&mut self, subtree: NodeHandle) {
        let mut stack = vec![subtree];
        while let Some(handle) = stack.pop() {
            let node = &self.nodes[handle.0];
            if !node.explicit_id {
                if let Some(parent) = node.parent {
                    let parent_node = &self.nodes[parent.0];
                    let index = parent_node.children.iter().position(|c| *c == handle).unwrap_or(0);
                    let id = parent_node.id.child(index as u64);
                    self.nodes[handle.0].id = id;
                    self.ids.entry(id).or_insert(handle);
                }
            }
            stack.extend(self.nodes[handle.0].children.iter().copied());
        }
    }
}

fn root_sizing(viewport: Size) -> Sizing {
    Sizing::fixed(viewport.width, viewport.height)
}

fn placeholder_id(handle: NodeHandle) -> ElementId {
    ElementId::from_raw(handle.0 as u64)
}

fn clean(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

fn sanitize_measurement(m: TextMeasurement) -> TextMeasurement {
    let width = clean(m.width);
    TextMeasurement {
        width,
        height: clean(m.height),
        min_width: clean(m.min_width).min(width),
    }
}

/// Size implied by the declaration alone: fixed values, with a missing
/// dimension derived through the aspect ratio.
fn declared_size(sizing: &Sizing, ratio: Option<f32>) -> Size {
    let fixed = |axis: SizingAxis| match axis {
        SizingAxis::Fixed { value, .. } => axis.clamp(value),
        _ => 0.0,
    };
    let mut size = Size::new(fixed(sizing.width), fixed(sizing.height));
    if let Some(r) = ratio {
        if size.width > 0.0 && size.height == 0.0 {
            size.height = size.width / r;
        } else if size.height > 0.0 && size.width == 0.0 {
            size.width = size.height * r;
        }
    }
    size
}
