//! The non-square-matrix rewriter.
//!
//! The target language has no non-square matrix type; those values travel
//! as structures of row vectors. Arithmetic on them therefore cannot stay a
//! binary operator: eligible operations become calls to the pseudo
//! intrinsics `__mulComp`, `__addComp`, `__divComp` and `__subComp`, which
//! the emitter later materializes as component-wise helper functions.
//!
//! Division and subtraction by a scalar have no helper of their own; they
//! re-enter the factory as `x * (1/s)` and `x + (-1*s)`.

use hlgl_ast::arena::Handle;
use hlgl_ast::ast::{Aggregate, Constant, Node, NodeKind, Op, Value};
use hlgl_ast::foundation::{BasicType, Precision, Qualifier, Span, Type};

use tracing::debug;

use super::IrBuilder;
use crate::diag::DiagSink;
use crate::error::BuildResult;

impl<S: DiagSink> IrBuilder<S> {
    /// Try to rewrite `left op right` into a pseudo-intrinsic call when one
    /// of the operands is an emulated non-square matrix.
    ///
    /// Returns `Ok(None)` when the combination is not eligible; the caller
    /// then proceeds with (and most likely fails) ordinary promotion.
    pub(crate) fn rewrite_non_square(
        &mut self,
        op: Op,
        left: Handle<Node>,
        right: Handle<Node>,
        span: Span,
    ) -> BuildResult<Option<Handle<Node>>> {
        let left_ty = self.operand_ty(left)?;
        let right_ty = self.operand_ty(right)?;
        let left_nsm = left_ty.is_non_square_matrix();
        let right_nsm = right_ty.is_non_square_matrix();

        let mut name = match op {
            Op::Mul => "__mulComp",
            Op::Div => "__divComp",
            Op::Add => "__addComp",
            Op::Sub => "__subComp",
            _ => return Ok(None),
        };

        let mut flip_operand = false;
        let result_ty = if left_nsm && right_nsm {
            // Matrix-with-matrix needs identical types.
            if left_ty.same_type(&right_ty) {
                Some(right_ty.clone())
            } else {
                None
            }
        } else if left_nsm {
            if !right_ty.is_array() && !right_ty.is_vector() {
                match op {
                    // x / s  ==>  __mulComp(x, 1/s)
                    Op::Div => {
                        name = "__mulComp";
                        flip_operand = true;
                    }
                    // x - s  ==>  __addComp(x, -1*s)
                    Op::Sub => {
                        name = "__addComp";
                        flip_operand = true;
                    }
                    _ => {}
                }
                Some(left_ty.clone())
            } else {
                None
            }
        } else {
            // Scalar-with-matrix only multiplies.
            if !left_ty.is_array() && !left_ty.is_vector() && op == Op::Mul {
                Some(right_ty.clone())
            } else {
                None
            }
        };

        let Some(result_ty) = result_ty else {
            return Ok(None);
        };

        let mangled_name = format!(
            "{}({}{}",
            name,
            left_ty.mangled_name(),
            right_ty.mangled_name()
        );
        debug!(call = name, mangled = %mangled_name, "rewriting non-square matrix arithmetic");

        let mut child = right;
        if flip_operand {
            let unit_ty = Type::new(BasicType::Float, Precision::Undefined);
            child = if op == Op::Div {
                let one = self.push(
                    NodeKind::Constant(Constant::scalar(unit_ty, Value::Float(1.0))),
                    span,
                );
                self.add_binary(Op::Div, one, child, span)?
            } else {
                let minus_one = self.push(
                    NodeKind::Constant(Constant::scalar(unit_ty, Value::Float(-1.0))),
                    span,
                );
                self.add_binary(Op::Mul, minus_one, child, span)?
            };
        }

        let mut call = Aggregate::new(Op::FunctionCall);
        call.ty = Some(result_ty.qualified(Qualifier::Temporary));
        call.mangled_name = Some(mangled_name);
        call.plain_name = Some(name.to_string());
        call.children = vec![left, child];
        Ok(Some(self.push(NodeKind::Aggregate(call), span)))
    }
}
