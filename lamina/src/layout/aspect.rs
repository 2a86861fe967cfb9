//! Aspect-ratio coupling between the two axis passes.

use tracing::trace;

use crate::arena::{Arena, NodeHandle};

fn ratio_nodes(arena: &Arena) -> Vec<(NodeHandle, f32)> {
    arena
        .nodes()
        .filter_map(|(h, n)| n.aspect_ratio.map(|r| (h, r)))
        .collect()
}

/// After the X pass: derive heights from widths and pin them.
///
/// The height sizing collapses to `min == max`, so neither content nor
/// free space can move it during the Y pass.
pub(crate) fn lock_heights(arena: &mut Arena) {
    for (handle, ratio) in ratio_nodes(arena) {
        let node = arena.at_mut(handle);
        let width = node.dimensions.width;
        if width <= 0.0 {
            continue;
        }
        let height = width / ratio;
        node.dimensions.height = height;
        node.layout.sizing.height = node.layout.sizing.height.with_bounds(height, height);
        trace!(%handle, width, height, "aspect height locked");
    }
}

/// After the Y pass: re-derive widths from the final heights.
pub(crate) fn apply_widths(arena: &mut Arena) {
    for (handle, ratio) in ratio_nodes(arena) {
        let node = arena.at_mut(handle);
        if node.dimensions.height > 0.0 {
            node.dimensions.width = ratio * node.dimensions.height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::ElementDeclaration;
    use crate::layout::sizing::{SizingAxis, Axis};
    use crate::primitives::Size;

    #[test]
    fn lock_pins_height_sizing() {
        let mut arena = Arena::new(Size::new(500.0, 500.0));
        let h = arena.push_container(ElementDeclaration::new().aspect_ratio(4.0));
        arena.append_child(NodeHandle::ROOT, h).unwrap();
        arena.at_mut(h).dimensions.width = 200.0;

        lock_heights(&mut arena);
        let node = arena.at(h);
        assert_eq!(node.dimensions.height, 50.0);
        assert_eq!(node.sizing(Axis::Y), SizingAxis::Fit { min: 50.0, max: 50.0 });
    }

    #[test]
    fn zero_width_is_left_alone() {
        let mut arena = Arena::new(Size::new(500.0, 500.0));
        let h = arena.push_container(ElementDeclaration::new().aspect_ratio(2.0));
        arena.append_child(NodeHandle::ROOT, h).unwrap();

        lock_heights(&mut arena);
        assert_eq!(arena.at(h).dimensions, Size::ZERO);
        assert_eq!(arena.at(h).sizing(Axis::Y), SizingAxis::fit());
    }

    #[test]
    fn widths_follow_heights() {
        let mut arena = Arena::new(Size::new(500.0, 500.0));
        let h = arena.push_container(ElementDeclaration::new().aspect_ratio(1.5));
        arena.append_child(NodeHandle::ROOT, h).unwrap();
        arena.at_mut(h).dimensions = Size::new(10.0, 40.0);

        apply_widths(&mut arena);
        assert_eq!(arena.at(h).dimensions.width, 60.0);
    }
}
