//! Java source rendering for expression subtrees.
//!
//! Parentheses are derived from the tree shape: a child whose precedence is lower than its
//! position requires is wrapped, so a structurally valid tree always renders to text that
//! parses back to the same structure.

use crate::expr::{ExprId, ExprKind};
use crate::tree::ExprTree;

const ASSIGN: u8 = 1;
const CONDITIONAL: u8 = 2;
const UNARY: u8 = 13;
const PRIMARY: u8 = 15;
const RELATIONAL: u8 = 9;

fn precedence(kind: &ExprKind) -> u8 {
    match kind {
        ExprKind::Assign { .. } => ASSIGN,
        ExprKind::Conditional { .. } => CONDITIONAL,
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::InstanceOf { .. } => RELATIONAL,
        ExprKind::Cast { .. } => UNARY,
        ExprKind::Literal { .. }
        | ExprKind::Name { .. }
        | ExprKind::FieldAccess { .. }
        | ExprKind::MethodCall { .. }
        | ExprKind::Parenthesized { .. } => PRIMARY,
    }
}

impl ExprTree {
    /// Render the subtree at `id` as Java source text.
    #[must_use]
    pub fn render(&self, id: ExprId) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, Some(id), ASSIGN);
        out
    }

    fn write_expr(&self, out: &mut String, id: Option<ExprId>, min_precedence: u8) {
        let Some(kind) = id.and_then(|id| self.get(id)) else {
            return;
        };
        let wrap = precedence(kind) < min_precedence;
        if wrap {
            out.push('(');
        }

        match kind {
            ExprKind::Literal { text, .. } => out.push_str(text),
            ExprKind::Name { name } => out.push_str(name),
            ExprKind::FieldAccess { qualifier, name } => {
                self.write_expr(out, Some(*qualifier), PRIMARY);
                out.push('.');
                out.push_str(name);
            }
            ExprKind::MethodCall {
                receiver,
                name,
                args,
            } => {
                if receiver.is_some() {
                    self.write_expr(out, *receiver, PRIMARY);
                    out.push('.');
                }
                out.push_str(name);
                out.push('(');
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    self.write_expr(out, Some(*arg), ASSIGN);
                }
                out.push(')');
            }
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.write_expr(out, Some(*condition), CONDITIONAL + 1);
                out.push_str(" ? ");
                self.write_expr(out, Some(*then_branch), ASSIGN);
                out.push_str(" : ");
                self.write_expr(out, Some(*else_branch), CONDITIONAL);
            }
            ExprKind::Cast {
                ty,
                operand,
                spaced,
            } => {
                out.push('(');
                out.push_str(&ty.text);
                out.push(')');
                if *spaced {
                    out.push(' ');
                }
                self.write_expr(out, *operand, UNARY);
            }
            ExprKind::Parenthesized { inner } => {
                out.push('(');
                self.write_expr(out, *inner, ASSIGN);
                out.push(')');
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                self.write_expr(out, Some(*lhs), prec);
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                self.write_expr(out, Some(*rhs), prec + 1);
            }
            ExprKind::InstanceOf { expr, ty } => {
                self.write_expr(out, Some(*expr), RELATIONAL);
                out.push_str(" instanceof ");
                out.push_str(&ty.text);
            }
            ExprKind::Assign { target, value } => {
                self.write_expr(out, Some(*target), PRIMARY);
                out.push_str(" = ");
                self.write_expr(out, Some(*value), ASSIGN);
            }
        }

        if wrap {
            out.push(')');
        }
    }
}
