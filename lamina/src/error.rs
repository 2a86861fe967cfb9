//! Layout error types.
//!
//! Only structural damage to the tree is an error. Bad sizing values, missing
//! text metrics and unresolved floating targets degrade instead (see the
//! `warn!` sites in the layout passes).

use thiserror::Error;

use crate::arena::NodeHandle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unknown node handle: {0}")]
    UnknownNode(NodeHandle),

    #[error("node {child} is already a child of {parent}")]
    DuplicateChild { child: NodeHandle, parent: NodeHandle },

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { child: NodeHandle, parent: NodeHandle },

    #[error("the root node cannot be attached as a child")]
    RootAsChild,

    #[error("node {0} was never attached to the tree")]
    Detached(NodeHandle),

    #[error("text node {0} cannot have children")]
    TextParent(NodeHandle),

    #[error("close() called with no open element")]
    UnbalancedClose,

    #[error("{0} element(s) still open when the tree was finished")]
    UnclosedElements(usize),

    #[error("unknown component: {0}")]
    UnknownComponent(String),
}
