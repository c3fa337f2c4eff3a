//! The promotion engine.
//!
//! Gives unary, binary and ternary nodes their result type, picks the
//! shape-specific multiplication variants, and inserts the constructor
//! wrappers that reconcile mismatched operand shapes. Basic-type
//! unification has already happened by the time these run; promotion only
//! deals in shapes, precision and the final operator.

use hlgl_ast::arena::Handle;
use hlgl_ast::ast::{Aggregate, Binary, Constructor, Node, NodeKind, Op, Selection, Unary};
use hlgl_ast::foundation::{BasicType, Precision, Qualifier, Span, Type};

use tracing::trace;

use super::IrBuilder;
use crate::diag::DiagSink;
use crate::error::{BuildError, BuildResult};

impl<S: DiagSink> IrBuilder<S> {
    /// Check a unary operator against its operand and set the result type,
    /// which is always the operand's own type.
    pub(crate) fn promote_unary(&mut self, unary: &mut Unary) -> BuildResult<()> {
        let operand_ty = self.operand_ty(unary.operand)?;
        let ok = match unary.op {
            Op::LogicalNot => operand_ty.basic == BasicType::Bool,
            Op::BitwiseNot => operand_ty.basic == BasicType::Int,
            Op::Negative
            | Op::PostIncrement
            | Op::PostDecrement
            | Op::PreIncrement
            | Op::PreDecrement => operand_ty.basic != BasicType::Bool,
            _ => operand_ty.basic == BasicType::Float,
        };
        if !ok {
            return Err(BuildError::PromotionFailed);
        }
        unary.ty = operand_ty;
        Ok(())
    }

    /// Establish the result type of a binary operation and rewrite the
    /// operator to the variant matching the operand shapes.
    pub(crate) fn promote_binary(&mut self, binary: &mut Binary, span: Span) -> BuildResult<()> {
        let mut left_ty = self.operand_ty(binary.left)?;
        let mut right_ty = self.operand_ty(binary.right)?;

        // The working size is the smaller operand's, except that a scalar
        // operand broadcasts to the other side's size.
        let mut size = left_ty.size.min(right_ty.size);
        if size == 1 {
            size = left_ty.size.max(right_ty.size);
        }

        let mut result_basic = left_ty.basic;
        let higher = left_ty.precision.higher(right_ty.precision);

        // Arrays have to be exact matches.
        if (left_ty.is_array() || right_ty.is_array()) && !left_ty.same_type(&right_ty) {
            return Err(BuildError::ArrayOperator);
        }

        // Base assumption: the result is the left type as a temporary, at
        // the higher of the two precisions. Only deviations get coded.
        let mut ty = left_ty.clone().qualified(Qualifier::Temporary);
        ty.precision = higher;

        if left_ty.is_array() {
            match binary.op {
                Op::Equal | Op::NotEqual => {
                    ty = Type::new(BasicType::Bool, Precision::Undefined);
                }
                // The base assumption already carries the array metadata.
                Op::Assign => {}
                _ => return Err(BuildError::ArrayOperator),
            }
            binary.ty = ty;
            return Ok(());
        }

        // All scalars. Everything after this test assumes the case is gone.
        if size == 1 {
            match binary.op {
                Op::Equal
                | Op::NotEqual
                | Op::LessThan
                | Op::GreaterThan
                | Op::LessThanEqual
                | Op::GreaterThanEqual => {
                    ty = Type::new(BasicType::Bool, Precision::Undefined);
                }
                Op::LogicalAnd | Op::LogicalOr => {
                    if left_ty.basic != BasicType::Bool || right_ty.basic != BasicType::Bool {
                        return Err(BuildError::PromotionFailed);
                    }
                    ty = Type::new(BasicType::Bool, Precision::Undefined);
                }
                Op::RightShift | Op::LeftShift | Op::And | Op::InclusiveOr | Op::ExclusiveOr => {
                    if left_ty.basic != BasicType::Int || right_ty.basic != BasicType::Int {
                        return Err(BuildError::PromotionFailed);
                    }
                }
                Op::ModAssign
                | Op::AndAssign
                | Op::InclusiveOrAssign
                | Op::ExclusiveOrAssign
                | Op::LeftShiftAssign
                | Op::RightShiftAssign => {
                    if left_ty.basic != BasicType::Int || right_ty.basic != BasicType::Int {
                        return Err(BuildError::PromotionFailed);
                    }
                }
                // Everything else needs matching basic types and matching
                // matrix-ness.
                _ => {
                    if left_ty.basic != right_ty.basic
                        || left_ty.is_matrix() != right_ty.is_matrix()
                    {
                        return Err(BuildError::PromotionFailed);
                    }
                }
            }
            binary.ty = ty;
            return Ok(());
        }

        let assignment = binary.op.is_assignment();

        // Mismatched sizes where neither side is a scalar: shrink the larger
        // operand with a constructor.
        if (left_ty.size != size && left_ty.size != 1)
            || (right_ty.size != size && right_ty.size != 1)
        {
            if left_ty.size > right_ty.size {
                if assignment {
                    // The destination's shape is immutable.
                    return Err(BuildError::PromotionFailed);
                }
                let ctor = self.shrink_constructor(&left_ty, right_ty.size, span)?;
                let wrap_ty = Type::with(
                    left_ty.basic,
                    left_ty.precision,
                    Qualifier::Temporary,
                    right_ty.size,
                    left_ty.is_matrix(),
                    false,
                );
                binary.left = self.wrap_in_constructor(binary.left, ctor, wrap_ty.clone());
                left_ty = wrap_ty;
                ty = left_ty.clone();
                ty.precision = higher;
            } else {
                let ctor = self.shrink_constructor(&right_ty, left_ty.size, span)?;
                let wrap_ty = Type::with(
                    right_ty.basic,
                    right_ty.precision,
                    Qualifier::Temporary,
                    left_ty.size,
                    right_ty.is_matrix(),
                    false,
                );
                binary.right = self.wrap_in_constructor(binary.right, ctor, wrap_ty.clone());
                right_ty = wrap_ty;
            }
        }

        match binary.op {
            Op::Mul => {
                binary.op = match (left_ty.is_matrix(), right_ty.is_matrix()) {
                    (false, true) => {
                        if left_ty.is_vector() {
                            Op::VectorTimesMatrix
                        } else {
                            ty = Type::with(
                                result_basic,
                                higher,
                                Qualifier::Temporary,
                                size,
                                true,
                                false,
                            );
                            Op::MatrixTimesScalar
                        }
                    }
                    (true, false) => {
                        if right_ty.is_vector() {
                            ty = Type::with(
                                result_basic,
                                higher,
                                Qualifier::Temporary,
                                size,
                                false,
                                false,
                            );
                            Op::MatrixTimesVector
                        } else {
                            Op::MatrixTimesScalar
                        }
                    }
                    (true, true) => Op::MatrixTimesMatrix,
                    (false, false) => {
                        if left_ty.is_vector() && right_ty.is_vector() {
                            // component-wise product, operator unchanged
                            Op::Mul
                        } else if left_ty.is_vector() || right_ty.is_vector() {
                            ty = Type::with(
                                result_basic,
                                higher,
                                Qualifier::Temporary,
                                size,
                                false,
                                false,
                            );
                            Op::VectorTimesScalar
                        } else {
                            Op::Mul
                        }
                    }
                };
                trace!(op = %binary.op, "specialized multiplication");
            }
            Op::MulAssign => {
                binary.op = match (left_ty.is_matrix(), right_ty.is_matrix()) {
                    (false, true) => {
                        if left_ty.is_vector() {
                            Op::VectorTimesMatrixAssign
                        } else {
                            // A scalar destination cannot grow into a matrix.
                            return Err(BuildError::PromotionFailed);
                        }
                    }
                    (true, false) => {
                        if right_ty.is_vector() {
                            return Err(BuildError::PromotionFailed);
                        }
                        Op::MatrixTimesScalarAssign
                    }
                    (true, true) => Op::MatrixTimesMatrixAssign,
                    (false, false) => {
                        if left_ty.is_vector() && right_ty.is_vector() {
                            Op::MulAssign
                        } else if left_ty.is_vector() || right_ty.is_vector() {
                            if !left_ty.is_vector() {
                                return Err(BuildError::PromotionFailed);
                            }
                            ty = Type::with(
                                result_basic,
                                higher,
                                Qualifier::Temporary,
                                size,
                                false,
                                false,
                            );
                            Op::VectorTimesScalarAssign
                        } else {
                            Op::MulAssign
                        }
                    }
                };
            }
            Op::Assign
            | Op::Mod
            | Op::Add
            | Op::Sub
            | Op::Div
            | Op::AddAssign
            | Op::SubAssign
            | Op::DivAssign
            | Op::ModAssign => {
                if binary.op == Op::Assign && left_ty.size != right_ty.size {
                    // Broadcast the right side into the destination's shape.
                    let ctor = if left_ty.is_matrix() {
                        Constructor::Matrix(left_ty.size)
                    } else if left_ty.is_vector() {
                        Constructor::Vector(right_ty.basic, left_ty.size)
                    } else {
                        Constructor::Scalar(right_ty.basic)
                    };
                    let qualifier = if right_ty.qualifier == Qualifier::Const {
                        Qualifier::Const
                    } else {
                        Qualifier::Temporary
                    };
                    let wrap_ty = Type::with(
                        left_ty.basic,
                        left_ty.precision,
                        qualifier,
                        left_ty.size,
                        left_ty.is_matrix(),
                        false,
                    );
                    binary.right = self.wrap_in_constructor(binary.right, ctor, wrap_ty.clone());
                    right_ty = wrap_ty;
                    size = right_ty.size;
                }
                if binary.op == Op::Mod {
                    result_basic = BasicType::Float;
                }
                if (left_ty.is_matrix() && right_ty.is_vector())
                    || (left_ty.is_vector() && right_ty.is_matrix())
                    || left_ty.basic != right_ty.basic
                {
                    return Err(BuildError::PromotionFailed);
                }
                ty = Type::with(
                    result_basic,
                    higher,
                    Qualifier::Temporary,
                    size,
                    left_ty.is_matrix() || right_ty.is_matrix(),
                    false,
                );
            }
            Op::Equal
            | Op::NotEqual
            | Op::LessThan
            | Op::GreaterThan
            | Op::LessThanEqual
            | Op::GreaterThanEqual => {
                if (left_ty.is_matrix() && right_ty.is_vector())
                    || (left_ty.is_vector() && right_ty.is_matrix())
                    || left_ty.basic != right_ty.basic
                {
                    return Err(BuildError::PromotionFailed);
                }
                ty = Type::with(BasicType::Bool, higher, Qualifier::Temporary, size, false, false);
            }
            _ => return Err(BuildError::PromotionFailed),
        }

        // The result of an assignment has to match the destination exactly.
        if binary.op.is_assignment() && !ty.same_type(&left_ty) {
            return Err(BuildError::PromotionFailed);
        }
        binary.ty = ty;
        Ok(())
    }

    /// Vector-condition ternaries broadcast scalar branches to the
    /// condition's width through vector constructors.
    pub(crate) fn promote_ternary(&mut self, selection: &mut Selection) -> BuildResult<()> {
        let cond_ty = self.operand_ty(selection.cond)?;
        if !cond_ty.is_vector() {
            return Ok(());
        }
        let size = cond_ty.size;

        let (Some(true_block), Some(false_block)) = (selection.true_block, selection.false_block)
        else {
            return Err(BuildError::PromotionFailed);
        };
        let true_ty = self.operand_ty(true_block)?;
        let false_ty = self.operand_ty(false_block)?;

        if true_ty.size == size && false_ty.size == size {
            return Ok(());
        }

        // The branches share a basic type by now; lift both to the
        // condition's width at the higher of the two precisions.
        let higher = true_ty.precision.higher(false_ty.precision);
        let branch_basic = true_ty.basic;
        selection.ty = Type::with(branch_basic, higher, Qualifier::Temporary, size, false, false);

        let ctor = Constructor::vector(branch_basic, size);
        for (slot, branch_ty) in [
            (&mut selection.true_block, true_ty),
            (&mut selection.false_block, false_ty),
        ] {
            let qualifier = if branch_ty.qualifier == Qualifier::Const {
                Qualifier::Const
            } else {
                Qualifier::Temporary
            };
            let wrap_ty = Type::with(branch_basic, higher, qualifier, size, false, false);
            let wrapped =
                self.wrap_in_constructor(slot.expect("both blocks checked"), ctor, wrap_ty);
            *slot = Some(wrapped);
        }
        Ok(())
    }

    /// Wrap a node in a constructor aggregate of the given result type.
    pub(crate) fn wrap_in_constructor(
        &mut self,
        node: Handle<Node>,
        ctor: Constructor,
        ty: Type,
    ) -> Handle<Node> {
        let span = self.node(node).span;
        let mut aggregate = Aggregate::new(Op::Construct(ctor));
        aggregate.ty = Some(ty);
        aggregate.children.push(node);
        self.push(NodeKind::Aggregate(aggregate), span)
    }

    /// The constructor that shrinks `from` to `to_size` components.
    fn shrink_constructor(
        &mut self,
        from: &Type,
        to_size: u8,
        span: Span,
    ) -> BuildResult<Constructor> {
        if from.is_matrix() {
            Ok(match to_size {
                2 => Constructor::MatrixFromMatrix(2),
                3 => Constructor::MatrixFromMatrix(3),
                // never needed: nothing is wider than mat4
                _ => Constructor::Matrix(4),
            })
        } else if from.is_vector() {
            Ok(Constructor::Vector(from.basic, to_size))
        } else {
            Err(self.internal_error(span, "scalar operand reached shape resolution"))
        }
    }
}
