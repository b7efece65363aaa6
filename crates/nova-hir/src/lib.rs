//! Expression trees for Java method bodies.
//!
//! Unlike the read-only syntax trees produced by the parser, an [`ExprTree`] is meant to be
//! edited: nodes live in an arena, are addressed by stable [`ExprId`]s and carry a link to the
//! slot they occupy, so a node can be swapped for another one without rebuilding its
//! ancestors. Quick fixes build their replacement nodes detached and splice them in with
//! [`ExprTree::replace`]. Ids stay valid until [`ExprTree::compact`] renumbers the arena.

mod builder;
mod expr;
mod printer;
mod scope;
mod tree;


pub use crate::expr::{BinaryOp, ExprId, ExprKind, LiteralKind, RootId, Slot, TypeRef};
pub use crate::scope::{ImportDecl, ImportScope};
pub use crate::tree::{ExprTree, TreeError, TreeMark};
