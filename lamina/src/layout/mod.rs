//! Layout System for Lamina
//!
//! Sizing rules and element configs, plus the passes `finalize` runs over an
//! arena:
//!
//! ```text
//! size X -> lock aspect heights -> wrap text -> size Y -> aspect widths
//!        -> place boxes (flow, then floating layers)
//! ```

pub mod config;
pub mod sizing;

pub(crate) mod aspect;
pub(crate) mod axis;
pub(crate) mod floating;
pub(crate) mod position;
pub(crate) mod text_flow;

// Re-export core types
pub use config::{
    AttachPoint, AttachTo, BackgroundConfig, BorderConfig, BorderWidth, CornerRadius,
    ElementDeclaration, FloatingAttachPoints, FloatingConfig, ScrollConfig,
};
pub use sizing::{
    AlignX, AlignY, Axis, ChildAlignment, LayoutConfig, LayoutDirection, Padding, Sizing,
    SizingAxis, EPSILON,
};
