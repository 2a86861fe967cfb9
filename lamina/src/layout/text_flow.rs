//! Text integration.
//!
//! Text leaves enter sizing with their unwrapped measurement. Once the X pass
//! has fixed their widths they are re-wrapped, and the Y pass starts from the
//! wrapped heights so that line count changes reach every ancestor.

use tracing::trace;

use crate::arena::{Arena, Node};
use crate::layout::sizing::Axis;
use crate::text::{wrap_text, TextMeasurer, WrapMode};

/// Size a text leaf starts from on `axis`.
///
/// On Y this is the wrapped height when the wrap pass has run.
pub(crate) fn text_extent(node: &Node, axis: Axis) -> f32 {
    match (axis, &node.text) {
        (Axis::Y, Some(text)) => match &text.wrapped_lines {
            Some(lines) => lines.len() as f32 * text.line_height,
            None => node.preferred.height,
        },
        (Axis::X, _) | (Axis::Y, None) => node.preferred(axis),
    }
}

/// Whether the X pass may narrow this text leaf below its measured width.
pub(crate) fn is_wrappable(node: &Node) -> bool {
    node.text.as_ref().is_some_and(|t| t.style.wrap == WrapMode::Words)
}

/// Smallest width a wrappable leaf can take: its widest word.
pub(crate) fn min_text_width(node: &Node) -> f32 {
    node.text.as_ref().map_or(0.0, |t| t.measurement.min_width)
}

/// Break every text leaf to its final width and set its height from the lines.
pub(crate) fn wrap_all(arena: &mut Arena, measurer: &dyn TextMeasurer) {
    let texts: Vec<_> = arena
        .nodes()
        .filter(|(_, n)| n.is_text())
        .map(|(h, _)| h)
        .collect();

    for handle in texts {
        let node = arena.at(handle);
        let Some(text) = &node.text else { continue };
        let lines = if text.measurement.is_zero() {
            Vec::new()
        } else {
            wrap_text(
                &text.content,
                &text.style,
                &text.measurement,
                node.dimensions.width,
                text.line_height,
                measurer,
            )
        };
        let height = lines.len() as f32 * text.line_height;
        trace!(%handle, lines = lines.len(), width = node.dimensions.width, height, "text wrapped");

        let node = arena.at_mut(handle);
        node.dimensions.height = height;
        if let Some(text) = node.text.as_mut() {
            text.wrapped_lines = Some(lines);
        }
    }
}
