//! Lamina: Immediate-Mode Layout Engine
//!
//! Lamina turns a declaratively built tree of boxes into pixel geometry and an
//! ordered list of paint commands. Boxes carry per-axis sizing rules (fit,
//! grow, percent, fixed), padding, gaps and alignment, and may float over
//! other elements, scroll their content or keep an aspect ratio.
//!
//! # Architecture
//!
//! A frame is built into an `Arena` (usually through `LayoutBuilder`), then a
//! single `finalize` call sizes, wraps, positions and paints it. The resulting
//! `LayoutSnapshot` answers geometry and hit-test queries. Nothing survives
//! the frame except what the caller keeps, such as `ScrollOffsets`.
//!
//! # Usage
//!
//! ```
//! use lamina::{
//!     Color, ElementDeclaration, LayoutBuilder, LayoutSnapshot, MonospaceMeasurer,
//!     ScrollOffsets, Size, Sizing, TextStyle,
//! };
//!
//! let measurer = MonospaceMeasurer::default();
//! let mut builder = LayoutBuilder::new(Size::new(800.0, 600.0), &measurer);
//! builder.element(
//!     ElementDeclaration::new().sizing(Sizing::grow()).background(Color::WHITE),
//!     |b| {
//!         b.text("hello", TextStyle::default());
//!     },
//! );
//! let arena = builder.finish().unwrap();
//! let frame = LayoutSnapshot::build(arena, &measurer, &ScrollOffsets::new()).unwrap();
//! assert!(!frame.commands().is_empty());
//! ```

// Core primitives
pub mod primitives;
pub mod id;
pub mod error;

// Tree construction
pub mod arena;
pub mod builder;

// Layout system
pub mod layout;

// Text measurement
pub mod text;
pub mod text_cache;

// Passes and output
pub mod engine;
pub mod render;
pub mod snapshot;

// State helpers
pub mod scroll;

// Re-export core types
pub use primitives::{Color, Point, Rect, Size};
pub use id::ElementId;
pub use error::LayoutError;
pub use arena::{Arena, Node, NodeHandle, NodeKind, TextData};
pub use builder::{ComponentFn, ComponentRegistry, ElementScope, LayoutBuilder};
pub use layout::{
    AlignX, AlignY, AttachPoint, AttachTo, Axis, BackgroundConfig, BorderConfig, BorderWidth,
    ChildAlignment, CornerRadius, ElementDeclaration, FloatingAttachPoints, FloatingConfig,
    LayoutConfig, LayoutDirection, Padding, ScrollConfig, Sizing, SizingAxis, EPSILON,
};
pub use text::{
    MonospaceMeasurer, TextAlignment, TextMeasurement, TextMeasurer, TextStyle, WrapMode,
    WrappedLine,
};
pub use text_cache::CachedMeasurer;
pub use engine::{finalize, LayoutSettings};
pub use render::{RenderCommand, RenderCommandKind, RenderData};
pub use snapshot::{LayoutSnapshot, ScrollContainerData};
pub use scroll::{ScrollOffsets, ScrollState};
