//! Layout sizing types and constants.
//!
//! Per-axis sizing rules, padding, direction and alignment for containers.

use tracing::warn;

/// Absolute tolerance for every float comparison in the layout passes.
pub const EPSILON: f32 = 0.01;

#[inline]
pub(crate) fn float_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn cross(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Sizing rule for one axis of an element.
///
/// `min`/`max` bound the final size for every variant. `Percent::value` is a
/// fraction in 0..=1 of the parent's inner size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingAxis {
    /// Shrink to fit content.
    Fit { min: f32, max: f32 },
    /// Expand to share the parent's free space.
    Grow { min: f32, max: f32 },
    /// Fraction of the parent's inner size.
    Percent { value: f32, min: f32, max: f32 },
    /// Exact size.
    Fixed { value: f32, min: f32, max: f32 },
}

impl Default for SizingAxis {
    fn default() -> Self {
        Self::fit()
    }
}

impl SizingAxis {
    /// Unbounded fit.
    pub const fn fit() -> Self {
        SizingAxis::Fit { min: 0.0, max: f32::INFINITY }
    }

    /// Unbounded grow.
    pub const fn grow() -> Self {
        SizingAxis::Grow { min: 0.0, max: f32::INFINITY }
    }

    pub const fn fixed(value: f32) -> Self {
        SizingAxis::Fixed { value, min: 0.0, max: f32::INFINITY }
    }

    pub const fn percent(value: f32) -> Self {
        SizingAxis::Percent { value, min: 0.0, max: f32::INFINITY }
    }

    pub const fn fit_between(min: f32, max: f32) -> Self {
        SizingAxis::Fit { min, max }
    }

    pub const fn grow_between(min: f32, max: f32) -> Self {
        SizingAxis::Grow { min, max }
    }

    pub fn min(&self) -> f32 {
        match *self {
            SizingAxis::Fit { min, .. }
            | SizingAxis::Grow { min, .. }
            | SizingAxis::Percent { min, .. }
            | SizingAxis::Fixed { min, .. } => min,
        }
    }

    pub fn max(&self) -> f32 {
        match *self {
            SizingAxis::Fit { max, .. }
            | SizingAxis::Grow { max, .. }
            | SizingAxis::Percent { max, .. }
            | SizingAxis::Fixed { max, .. } => max,
        }
    }

    /// Clamp a size into this rule's `[min, max]`.
    #[inline]
    pub fn clamp(&self, size: f32) -> f32 {
        size.max(self.min()).min(self.max())
    }

    pub fn is_fit(&self) -> bool {
        matches!(self, SizingAxis::Fit { .. })
    }

    pub fn is_grow(&self) -> bool {
        matches!(self, SizingAxis::Grow { .. })
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, SizingAxis::Percent { .. })
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, SizingAxis::Fixed { .. })
    }

    /// Replace both bounds, keeping the variant and its value.
    pub(crate) fn with_bounds(self, min: f32, max: f32) -> Self {
        match self {
            SizingAxis::Fit { .. } => SizingAxis::Fit { min, max },
            SizingAxis::Grow { .. } => SizingAxis::Grow { min, max },
            SizingAxis::Percent { value, .. } => SizingAxis::Percent { value, min, max },
            SizingAxis::Fixed { value, .. } => SizingAxis::Fixed { value, min, max },
        }
    }

    /// Repair malformed values instead of rejecting them.
    ///
    /// NaN and negative numbers become 0, a percent is clamped into 0..=1 and
    /// `min > max` collapses the range onto `min`.
    pub(crate) fn normalized(self) -> Self {
        fn clean(v: f32) -> f32 {
            if v.is_nan() || v < 0.0 { 0.0 } else { v }
        }
        let min = clean(self.min());
        let mut max = if self.max().is_nan() { f32::INFINITY } else { clean(self.max()) };
        if min > max {
            warn!(min, max, "sizing min exceeds max, clamping max to min");
            max = min;
        }
        match self {
            SizingAxis::Fit { .. } => SizingAxis::Fit { min, max },
            SizingAxis::Grow { .. } => SizingAxis::Grow { min, max },
            SizingAxis::Percent { value, .. } => SizingAxis::Percent {
                value: if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) },
                min,
                max,
            },
            SizingAxis::Fixed { value, .. } => SizingAxis::Fixed { value: clean(value), min, max },
        }
    }
}

/// Sizing rules for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sizing {
    pub width: SizingAxis,
    pub height: SizingAxis,
}

impl Sizing {
    pub const fn new(width: SizingAxis, height: SizingAxis) -> Self {
        Self { width, height }
    }

    pub const fn fixed(width: f32, height: f32) -> Self {
        Self {
            width: SizingAxis::fixed(width),
            height: SizingAxis::fixed(height),
        }
    }

    pub const fn grow() -> Self {
        Self {
            width: SizingAxis::grow(),
            height: SizingAxis::grow(),
        }
    }

    #[inline]
    pub fn axis(&self, axis: Axis) -> SizingAxis {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Padding around content.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Uniform padding on all sides.
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Symmetric padding (horizontal, vertical).
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Total padding along an axis.
    #[inline]
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.horizontal(),
            Axis::Y => self.vertical(),
        }
    }

    /// Leading (left/top) padding along an axis.
    #[inline]
    pub fn start(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.top,
        }
    }
}

/// Direction in which a container lays out its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutDirection {
    /// Children flow left to right; X is the main axis.
    #[default]
    Row,
    /// Children flow top to bottom; Y is the main axis.
    Column,
}

impl LayoutDirection {
    #[inline]
    pub fn main_axis(self) -> Axis {
        match self {
            LayoutDirection::Row => Axis::X,
            LayoutDirection::Column => Axis::Y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignX {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignY {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Where children sit inside the container's free space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildAlignment {
    pub x: AlignX,
    pub y: AlignY,
}

impl ChildAlignment {
    pub const fn new(x: AlignX, y: AlignY) -> Self {
        Self { x, y }
    }

    /// Share of the free space placed before the children on an axis.
    pub(crate) fn factor(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => match self.x {
                AlignX::Left => 0.0,
                AlignX::Center => 0.5,
                AlignX::Right => 1.0,
            },
            Axis::Y => match self.y {
                AlignY::Top => 0.0,
                AlignY::Center => 0.5,
                AlignY::Bottom => 1.0,
            },
        }
    }
}

/// Layout half of an element declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutConfig {
    pub sizing: Sizing,
    pub padding: Padding,
    pub child_gap: f32,
    pub direction: LayoutDirection,
    pub child_alignment: ChildAlignment,
}

impl LayoutConfig {
    pub(crate) fn normalized(mut self) -> Self {
        self.sizing.width = self.sizing.width.normalized();
        self.sizing.height = self.sizing.height.normalized();
        if self.child_gap.is_nan() || self.child_gap < 0.0 {
            self.child_gap = 0.0;
        }
        self
    }
}
