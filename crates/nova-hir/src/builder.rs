//! Shorthand constructors for detached nodes.
//!
//! Constructors that take children fail with [`TreeError`] under the same conditions as
//! [`ExprTree::alloc`].

use crate::expr::{BinaryOp, ExprId, ExprKind, LiteralKind, TypeRef};
use crate::tree::{ExprTree, TreeError};

impl ExprTree {
    pub fn literal(&mut self, kind: LiteralKind, text: impl Into<String>) -> ExprId {
        self.alloc_leaf(ExprKind::Literal {
            kind,
            text: text.into(),
        })
    }

    pub fn name(&mut self, name: impl Into<String>) -> ExprId {
        self.alloc_leaf(ExprKind::Name { name: name.into() })
    }

    pub fn field_access(
        &mut self,
        qualifier: ExprId,
        name: impl Into<String>,
    ) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::FieldAccess {
            qualifier,
            name: name.into(),
        })
    }

    pub fn method_call(
        &mut self,
        receiver: Option<ExprId>,
        name: impl Into<String>,
        args: Vec<ExprId>,
    ) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::MethodCall {
            receiver,
            name: name.into(),
            args,
        })
    }

    pub fn conditional(
        &mut self,
        condition: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    ) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::Conditional {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn cast(&mut self, ty: TypeRef, operand: Option<ExprId>) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::Cast {
            ty,
            operand,
            spaced: false,
        })
    }

    pub fn paren(&mut self, inner: Option<ExprId>) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::Parenthesized { inner })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::Binary { op, lhs, rhs })
    }

    pub fn instance_of(&mut self, expr: ExprId, ty: TypeRef) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::InstanceOf { expr, ty })
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> Result<ExprId, TreeError> {
        self.alloc(ExprKind::Assign { target, value })
    }
}
