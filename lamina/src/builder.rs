//! Declarative tree construction.
//!
//! `LayoutBuilder` drives the arena with an open/close protocol: `open` pushes
//! a container under the innermost open element, text leaves are measured on
//! the spot, `close` pops. The closure form ([`LayoutBuilder::element`]) and
//! the guard form ([`LayoutBuilder::scope`]) always close what they opened.

use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use tracing::warn;

use crate::arena::{Arena, NodeHandle};
use crate::engine::LayoutSettings;
use crate::error::LayoutError;
use crate::layout::config::ElementDeclaration;
use crate::primitives::Size;
use crate::text::{TextMeasurement, TextMeasurer, TextStyle};

/// Builds one frame's tree.
pub struct LayoutBuilder<'m> {
    arena: Arena,
    measurer: &'m dyn TextMeasurer,
    open: Vec<NodeHandle>,
    error: Option<LayoutError>,
}

impl<'m> LayoutBuilder<'m> {
    pub fn new(viewport: Size, measurer: &'m dyn TextMeasurer) -> Self {
        Self {
            arena: Arena::new(viewport),
            measurer,
            open: Vec::new(),
            error: None,
        }
    }

    /// Attach settings. Call before declaring text so the line height
    /// fallback applies.
    pub fn with_settings(mut self, settings: LayoutSettings) -> Self {
        self.arena.set_settings(settings);
        self
    }

    /// Set the root's padding, gap, direction, alignment and paint configs.
    pub fn configure_root(&mut self, declaration: ElementDeclaration) -> &mut Self {
        self.arena.configure_root(declaration);
        self
    }

    /// Innermost open element; the root when nothing is open.
    pub fn current(&self) -> NodeHandle {
        self.open.last().copied().unwrap_or(NodeHandle::ROOT)
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn open(&mut self, declaration: ElementDeclaration) -> NodeHandle {
        let handle = self.arena.push_container(declaration);
        self.attach(handle);
        self.open.push(handle);
        handle
    }

    pub fn close(&mut self) -> Result<NodeHandle, LayoutError> {
        self.open.pop().ok_or(LayoutError::UnbalancedClose)
    }

    /// Add a text leaf, measured through the builder's measurer.
    pub fn text(&mut self, content: impl Into<String>, style: TextStyle) -> NodeHandle {
        let content = content.into();
        let measurement = self.measurer.measure(&content, &style);
        self.text_measured(content, style, measurement)
    }

    /// Add a text leaf with a measurement resolved by the caller.
    pub fn text_measured(
        &mut self,
        content: impl Into<String>,
        style: TextStyle,
        measurement: TextMeasurement,
    ) -> NodeHandle {
        let handle = self.arena.push_text(content, style, measurement);
        self.attach(handle);
        handle
    }

    /// Open an element, fill it through `children`, and close it.
    pub fn element(
        &mut self,
        declaration: ElementDeclaration,
        children: impl FnOnce(&mut Self),
    ) -> NodeHandle {
        let handle = self.open(declaration);
        children(self);
        self.close_through(handle);
        handle
    }

    /// Open an element that closes when the returned guard drops.
    pub fn scope(&mut self, declaration: ElementDeclaration) -> ElementScope<'_, 'm> {
        let handle = self.open(declaration);
        ElementScope { builder: self, handle }
    }

    /// Expand a registered component at the current position.
    pub fn component(&mut self, registry: &ComponentRegistry, name: &str) -> Result<(), LayoutError> {
        let build = registry
            .get(name)
            .ok_or_else(|| LayoutError::UnknownComponent(name.to_string()))?;
        let depth = self.open.len();
        build(self);
        if self.open.len() > depth {
            warn!(component = name, left_open = self.open.len() - depth, "component left elements open, closing");
            self.open.truncate(depth);
        }
        Ok(())
    }

    /// Hand over the finished arena.
    pub fn finish(self) -> Result<Arena, LayoutError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.open.is_empty() {
            return Err(LayoutError::UnclosedElements(self.open.len()));
        }
        self.arena.validate()?;
        Ok(self.arena)
    }

    fn attach(&mut self, handle: NodeHandle) {
        let parent = self.current();
        if let Err(error) = self.arena.append_child(parent, handle) {
            warn!(%error, "element could not be attached");
            self.error.get_or_insert(error);
        }
    }

    /// Close `handle` and anything still open inside it.
    fn close_through(&mut self, handle: NodeHandle) {
        if let Some(pos) = self.open.iter().rposition(|h| *h == handle) {
            self.open.truncate(pos);
        }
    }
}

/// Guard for an open element; closes it on drop.
pub struct ElementScope<'b, 'm> {
    builder: &'b mut LayoutBuilder<'m>,
    handle: NodeHandle,
}

impl ElementScope<'_, '_> {
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }
}

impl<'m> Deref for ElementScope<'_, 'm> {
    type Target = LayoutBuilder<'m>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl DerefMut for ElementScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl Drop for ElementScope<'_, '_> {
    fn drop(&mut self) {
        self.builder.close_through(self.handle);
    }
}

/// Builds a reusable piece of tree at the builder's current position.
pub type ComponentFn = Box<dyn Fn(&mut LayoutBuilder<'_>) + Send + Sync>;

/// Named components, passed explicitly to whoever builds the tree.
#[derive(Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, ComponentFn>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `build` under `name`, replacing any earlier registration.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        build: impl Fn(&mut LayoutBuilder<'_>) + Send + Sync + 'static,
    ) -> &mut Self {
        let name = name.into();
        if self.components.insert(name.clone(), Box::new(build)).is_some() {
            warn!(component = %name, "component re-registered");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ComponentFn> {
        self.components.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
