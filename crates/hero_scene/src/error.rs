//! Error types for hero_scene

use hero_core::{Property, TreeError};
use hero_motion::VariantError;
use thiserror::Error;

use crate::catalog::PresetKind;
use crate::view::Role;

/// Errors raised while building or mounting a scene
///
/// Every configuration problem surfaces when the scene is constructed;
/// nothing here is raised while animations run.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A cue names a preset the catalog does not have
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// A preset exists but is of the wrong kind for its cue
    #[error("preset '{name}' is a {found} preset, expected {expected}")]
    PresetKind {
        name: String,
        expected: PresetKind,
        found: PresetKind,
    },

    /// A variant preset failed validation
    #[error(transparent)]
    MalformedVariant(#[from] VariantError),

    /// A preset carries values no element can take
    #[error("preset '{0}' has non-finite values")]
    MalformedPreset(String),

    /// One property of one element is driven by both engines
    #[error("{property} of {role} is driven by both the timeline and the transition engine")]
    PropertyConflict { role: Role, property: Property },

    /// A runner was handed an effect for the other engine
    #[error("{runner} runner cannot run {effect} effects")]
    UnsupportedEffect {
        runner: &'static str,
        effect: &'static str,
    },

    /// Content failed validation
    #[error("invalid content: {0}")]
    Content(String),

    /// Element tree error
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result type for hero_scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
