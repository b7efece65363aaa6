use std::fmt;

use nova_types::{PrimitiveType, Type, TypeEnv};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ExprId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }

    /// Raw index, e.g. for serializing a reference to a node into a command argument.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// A top-level expression slot (statement expression, initializer, return value, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(u32);

impl RootId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        RootId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootId({})", self.0)
    }
}

/// Where a node is attached.
///
/// `index` counts the parent's child slots in source order, including empty optional ones
/// (see [`ExprKind::child_slots`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Root(RootId),
    Child { parent: ExprId, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Long,
    Char,
    Boolean,
    String,
    Null,
}

impl LiteralKind {
    /// The literal's type when it doesn't need a class lookup.
    #[must_use]
    pub fn builtin_type(self) -> Option<Type> {
        match self {
            LiteralKind::Int => Some(Type::Primitive(PrimitiveType::Int)),
            LiteralKind::Long => Some(Type::Primitive(PrimitiveType::Long)),
            LiteralKind::Char => Some(Type::Primitive(PrimitiveType::Char)),
            LiteralKind::Boolean => Some(Type::Primitive(PrimitiveType::Boolean)),
            LiteralKind::Null => Some(Type::Null),
            LiteralKind::String => None,
        }
    }

    /// The literal's type, looking up `String` in `env`.
    #[must_use]
    pub fn ty(self, env: &dyn TypeEnv) -> Option<Type> {
        match self {
            LiteralKind::String => Some(Type::class(env.well_known().string, vec![])),
            _ => self.builtin_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 3,
            BinaryOp::And => 4,
            BinaryOp::Eq | BinaryOp::Ne => 8,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 9,
            BinaryOp::Add | BinaryOp::Sub => 11,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 12,
        }
    }
}

/// A type as written in source: the resolved type plus its spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub ty: Type,
    pub text: String,
}

impl TypeRef {
    pub fn new(ty: Type, text: impl Into<String>) -> Self {
        Self {
            ty,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Literal {
        kind: LiteralKind,
        text: String,
    },
    Name {
        name: String,
    },
    FieldAccess {
        qualifier: ExprId,
        name: String,
    },
    MethodCall {
        receiver: Option<ExprId>,
        name: String,
        args: Vec<ExprId>,
    },
    Conditional {
        condition: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    Cast {
        ty: TypeRef,
        operand: Option<ExprId>,
        /// Whether a space separates `(T)` from the operand.
        spaced: bool,
    },
    Parenthesized {
        inner: Option<ExprId>,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    InstanceOf {
        expr: ExprId,
        ty: TypeRef,
    },
    Assign {
        target: ExprId,
        value: ExprId,
    },
}

pub(crate) enum SlotMut<'a> {
    Required(&'a mut ExprId),
    Optional(&'a mut Option<ExprId>),
}

impl ExprKind {
    /// Child slots in source order. `None` marks an empty optional slot.
    #[must_use]
    pub fn child_slots(&self) -> Vec<Option<ExprId>> {
        match self {
            ExprKind::Literal { .. } | ExprKind::Name { .. } => Vec::new(),
            ExprKind::FieldAccess { qualifier, .. } => vec![Some(*qualifier)],
            ExprKind::MethodCall { receiver, args, .. } => std::iter::once(*receiver)
                .chain(args.iter().copied().map(Some))
                .collect(),
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => vec![Some(*condition), Some(*then_branch), Some(*else_branch)],
            ExprKind::Cast { operand, .. } => vec![*operand],
            ExprKind::Parenthesized { inner } => vec![*inner],
            ExprKind::Binary { lhs, rhs, .. } => vec![Some(*lhs), Some(*rhs)],
            ExprKind::InstanceOf { expr, .. } => vec![Some(*expr)],
            ExprKind::Assign { target, value } => vec![Some(*target), Some(*value)],
        }
    }

    #[must_use]
    pub fn children(&self) -> Vec<ExprId> {
        self.child_slots().into_iter().flatten().collect()
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<SlotMut<'_>> {
        match self {
            ExprKind::Literal { .. } | ExprKind::Name { .. } => None,
            ExprKind::FieldAccess { qualifier, .. } => {
                (index == 0).then_some(SlotMut::Required(qualifier))
            }
            ExprKind::MethodCall { receiver, args, .. } => match index {
                0 => Some(SlotMut::Optional(receiver)),
                n => args.get_mut(n - 1).map(SlotMut::Required),
            },
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => match index {
                0 => Some(SlotMut::Required(condition)),
                1 => Some(SlotMut::Required(then_branch)),
                2 => Some(SlotMut::Required(else_branch)),
                _ => None,
            },
            ExprKind::Cast { operand, .. } => (index == 0).then_some(SlotMut::Optional(operand)),
            ExprKind::Parenthesized { inner } => (index == 0).then_some(SlotMut::Optional(inner)),
            ExprKind::Binary { lhs, rhs, .. } => match index {
                0 => Some(SlotMut::Required(lhs)),
                1 => Some(SlotMut::Required(rhs)),
                _ => None,
            },
            ExprKind::InstanceOf { expr, .. } => (index == 0).then_some(SlotMut::Required(expr)),
            ExprKind::Assign { target, value } => match index {
                0 => Some(SlotMut::Required(target)),
                1 => Some(SlotMut::Required(value)),
                _ => None,
            },
        }
    }

    /// A copy of this node with every child id passed through `f`.
    pub(crate) fn map_children(&self, f: &mut dyn FnMut(ExprId) -> ExprId) -> ExprKind {
        let mut kind = self.clone();
        for index in 0..self.child_slots().len() {
            match kind.slot_mut(index) {
                Some(SlotMut::Required(child)) => *child = f(*child),
                Some(SlotMut::Optional(Some(child))) => *child = f(*child),
                Some(SlotMut::Optional(None)) | None => {}
            }
        }
        kind
    }
}
