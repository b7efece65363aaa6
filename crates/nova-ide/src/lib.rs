//! IDE-facing quick fixes built on Nova's expression trees.
//!
//! The add-type-cast fix lives in [`add_type_cast`]; [`qualifier_cast`] proposes casts for
//! member accesses that only resolve on a narrowed type, and [`code_action`] surfaces actions to
//! LSP clients.

pub mod add_type_cast;
pub mod code_action;
pub mod config;
pub mod qualifier_cast;

pub use add_type_cast::{
    add_type_cast, availability, create_cast_expression, is_available, CastAction, CastError,
    CastLabelKind, Priority,
};
pub use code_action::{cast_code_action, AddTypeCastArgs};
pub use config::CastFixConfig;
pub use qualifier_cast::{AccessKind, QualifierCastProposer};
