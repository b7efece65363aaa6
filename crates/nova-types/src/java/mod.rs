//! Java-specific algorithms over the [`crate::Type`] model.
//!
//! Nothing here knows about source locations: site-dependent questions (is a type
//! variable in scope, is a class name visible) are answered by callers that own
//! a syntax tree.

pub mod format;
pub mod helpers;
pub mod subtyping;
