//! Error types for hero_core

use thiserror::Error;

use crate::element::ElementId;

/// Errors raised by structural tree operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The element was removed or never existed
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),

    /// Appending would make an element its own ancestor
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: ElementId, child: ElementId },

    /// The document root is fixed
    #[error("the document root cannot be moved or removed")]
    DocumentRoot,
}

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
