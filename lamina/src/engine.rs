//! Frame finalization.
//!
//! `finalize` runs every layout pass over a built arena, in a fixed order, and
//! returns the paint commands. It is deterministic: the same tree, measurer and
//! scroll offsets always produce the same command list.

use tracing::{debug, debug_span};

use crate::arena::Arena;
use crate::error::LayoutError;
use crate::layout::sizing::Axis;
use crate::layout::{aspect, axis, floating, position, text_flow};
use crate::render::{self, RenderCommand};
use crate::scroll::ScrollOffsets;
use crate::text::TextMeasurer;

/// Per-frame engine options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSettings {
    /// Skip paint commands for nodes entirely outside the viewport.
    /// Their children are still visited.
    pub cull_offscreen: bool,

    /// Line height for text styles that leave it at 0 and whose measurement
    /// reports no height.
    pub default_line_height: Option<f32>,
}

/// Compute geometry for every node and produce the paint commands.
///
/// Fails only on a structurally broken tree (a node never attached).
pub fn finalize(
    arena: &mut Arena,
    measurer: &dyn TextMeasurer,
    scroll: &ScrollOffsets,
) -> Result<Vec<RenderCommand>, LayoutError> {
    let span = debug_span!("finalize", nodes = arena.len());
    let _guard = span.enter();

    arena.validate()?;
    floating::resolve_references(arena);

    axis::size_along(arena, Axis::X);
    aspect::lock_heights(arena);
    text_flow::wrap_all(arena, measurer);
    axis::size_along(arena, Axis::Y);
    aspect::apply_widths(arena);

    position::position_all(arena, scroll);
    let commands = render::build(arena);

    debug!(commands = commands.len(), "frame finalized");
    Ok(commands)
}
