//! Build failures.
//!
//! A failed factory call means the operands' types or shapes violated the
//! operator's rules. The parser owns the wording of the user-facing message;
//! the variants here only tell it which rule was broken.

use thiserror::Error;

/// Why a node could not be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Operand shape (matrix, vector, array, structure) is not accepted by
    /// the operator
    #[error("operand shape is not valid for this operator")]
    InvalidOperandShape,

    /// No implicit conversion unifies the operand types
    #[error("operand types are incompatible")]
    IncompatibleOperands,

    /// Arrays only support assignment and equality, on identical types
    #[error("invalid operation on an array")]
    ArrayOperator,

    /// The requested basic-type conversion does not exist
    #[error("no conversion between these types")]
    ConversionImpossible,

    /// Operand types and shapes could not be promoted to a result type
    #[error("operand types cannot be promoted")]
    PromotionFailed,

    /// The builder reached a state it considers unreachable; details were
    /// pushed to the diagnostic sink
    #[error("internal error while building the tree")]
    Internal,
}

/// Result alias used across the builder surface.
pub type BuildResult<T> = Result<T, BuildError>;
