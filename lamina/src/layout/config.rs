//! Behavior descriptors attached to elements.
//!
//! A declaration is a layout config plus any number of optional configs. The
//! arena stores them per node; the passes read whichever ones are present.

use serde::{Deserialize, Serialize};

use crate::id::ElementId;
use crate::primitives::{Color, Point, Size};

use super::sizing::LayoutConfig;

/// Per-corner radii.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadius {
    pub const fn all(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_right == 0.0
            && self.bottom_left == 0.0
    }
}

impl From<f32> for CornerRadius {
    fn from(radius: f32) -> Self {
        Self::all(radius)
    }
}

/// Per-edge border widths.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BorderWidth {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl BorderWidth {
    pub const fn all(width: f32) -> Self {
        Self { top: width, right: width, bottom: width, left: width }
    }

    pub fn is_zero(&self) -> bool {
        self.top <= 0.0 && self.right <= 0.0 && self.bottom <= 0.0 && self.left <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundConfig {
    pub color: Color,
    pub corner_radius: CornerRadius,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderConfig {
    pub color: Color,
    pub width: BorderWidth,
    pub corner_radius: CornerRadius,
}

/// Clips descendants to the element's box and offsets them by `child_offset`.
///
/// `child_offset` is the negated scroll position. It is overridden each frame
/// by the external scroll store when the store has an entry for this element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollConfig {
    pub horizontal: bool,
    pub vertical: bool,
    pub child_offset: Point,
}

impl ScrollConfig {
    pub fn vertical() -> Self {
        Self { vertical: true, ..Self::default() }
    }

    pub fn horizontal() -> Self {
        Self { horizontal: true, ..Self::default() }
    }

    pub fn both() -> Self {
        Self { horizontal: true, vertical: true, child_offset: Point::ORIGIN }
    }

    /// Whether content may extend past the box along the given direction.
    pub(crate) fn scrolls(&self, axis: super::sizing::Axis) -> bool {
        match axis {
            super::sizing::Axis::X => self.horizontal,
            super::sizing::Axis::Y => self.vertical,
        }
    }
}

/// Box a floating element is positioned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachTo {
    /// The viewport (root box).
    #[default]
    Root,
    /// The element's own tree parent.
    Parent,
    /// Another element by id. Falls back to the root box when the id is absent.
    Element(ElementId),
}

/// One of the nine anchor positions on a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPoint {
    #[default]
    LeftTop,
    LeftCenter,
    LeftBottom,
    CenterTop,
    CenterCenter,
    CenterBottom,
    RightTop,
    RightCenter,
    RightBottom,
}

impl AttachPoint {
    /// Fractions of (width, height) from the box origin to this anchor.
    pub fn fractions(self) -> (f32, f32) {
        use AttachPoint::*;
        let fx = match self {
            LeftTop | LeftCenter | LeftBottom => 0.0,
            CenterTop | CenterCenter | CenterBottom => 0.5,
            RightTop | RightCenter | RightBottom => 1.0,
        };
        let fy = match self {
            LeftTop | CenterTop | RightTop => 0.0,
            LeftCenter | CenterCenter | RightCenter => 0.5,
            LeftBottom | CenterBottom | RightBottom => 1.0,
        };
        (fx, fy)
    }

    /// Offset from a box origin to this anchor for a box of `size`.
    pub fn offset_in(self, size: Size) -> Point {
        let (fx, fy) = self.fractions();
        Point::new(size.width * fx, size.height * fy)
    }
}

/// Which anchor of the floating element lands on which anchor of its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatingAttachPoints {
    /// Anchor on the floating element itself.
    pub element: AttachPoint,
    /// Anchor on the reference box.
    pub parent: AttachPoint,
}

/// Takes an element out of normal flow and positions it over a reference box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatingConfig {
    pub attach_to: AttachTo,
    pub attach_points: FloatingAttachPoints,
    pub offset: Point,
    /// Symmetric enlargement of the final box around its center.
    pub expand: Size,
    /// Paint order only; never affects geometry.
    pub z_index: i16,
}

/// Everything needed to open one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementDeclaration {
    pub id: Option<ElementId>,
    pub layout: LayoutConfig,
    pub background: Option<BackgroundConfig>,
    pub border: Option<BorderConfig>,
    pub scroll: Option<ScrollConfig>,
    pub floating: Option<FloatingConfig>,
    /// Locked width / height ratio.
    pub aspect_ratio: Option<f32>,
}

impl ElementDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn sizing(mut self, sizing: super::sizing::Sizing) -> Self {
        self.layout.sizing = sizing;
        self
    }

    pub fn padding(mut self, padding: super::sizing::Padding) -> Self {
        self.layout.padding = padding;
        self
    }

    pub fn child_gap(mut self, gap: f32) -> Self {
        self.layout.child_gap = gap;
        self
    }

    pub fn direction(mut self, direction: super::sizing::LayoutDirection) -> Self {
        self.layout.direction = direction;
        self
    }

    pub fn align(mut self, alignment: super::sizing::ChildAlignment) -> Self {
        self.layout.child_alignment = alignment;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(BackgroundConfig { color, corner_radius: CornerRadius::default() });
        self
    }

    pub fn rounded_background(mut self, color: Color, radius: impl Into<CornerRadius>) -> Self {
        self.background = Some(BackgroundConfig { color, corner_radius: radius.into() });
        self
    }

    pub fn border(mut self, color: Color, width: f32) -> Self {
        self.border = Some(BorderConfig {
            color,
            width: BorderWidth::all(width),
            corner_radius: CornerRadius::default(),
        });
        self
    }

    pub fn scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = Some(scroll);
        self
    }

    pub fn floating(mut self, floating: FloatingConfig) -> Self {
        self.floating = Some(floating);
        self
    }

    pub fn aspect_ratio(mut self, ratio: f32) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }
}
