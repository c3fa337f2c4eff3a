//! The operator catalog.
//!
//! One closed enumeration covers every operation the IR can express. The
//! promotion pass rewrites generic operators into their shape-specific
//! variants (`Mul` into `MatrixTimesVector` and friends), so the set here is
//! wider than the source language's operator surface.
//!
//! Constructors are folded into a single [`Op::Construct`] variant carrying
//! the target basic type and nominal size; this keeps the promotion tables
//! small and makes "is this a constructor" a single pattern match.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::BasicType;

/// Constructor target shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constructor {
    /// `bool(x)`, `int(x)`, `float(x)`
    Scalar(BasicType),
    /// `vecN`, `ivecN`, `bvecN`
    Vector(BasicType, u8),
    /// `matN` built from scalars or vectors
    Matrix(u8),
    /// `matN` built by shrinking a larger matrix
    MatrixFromMatrix(u8),
    /// Structure constructor
    Struct,
}

impl Constructor {
    /// The vector constructor matching a component type and size.
    pub fn vector(basic: BasicType, size: u8) -> Self {
        debug_assert!(basic.is_component() && (2..=4).contains(&size));
        Constructor::Vector(basic, size)
    }

    /// The scalar constructor matching a component type.
    pub fn scalar(basic: BasicType) -> Self {
        debug_assert!(basic.is_component());
        Constructor::Scalar(basic)
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constructor::Scalar(basic) => write!(f, "{}", basic),
            Constructor::Vector(basic, size) => {
                let prefix = match basic {
                    BasicType::Bool => "b",
                    BasicType::Int => "i",
                    _ => "",
                };
                write!(f, "{}vec{}", prefix, size)
            }
            Constructor::Matrix(size) | Constructor::MatrixFromMatrix(size) => {
                write!(f, "mat{}", size)
            }
            Constructor::Struct => write!(f, "struct"),
        }
    }
}

/// Every operation an IR node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    /// Placeholder on aggregates still being grown
    Null,
    /// Statement list
    Sequence,
    Comma,
    FunctionCall,

    // Unary
    Negative,
    LogicalNot,
    BitwiseNot,
    PostIncrement,
    PostDecrement,
    PreIncrement,
    PreDecrement,

    // Basic-type conversions
    ConvIntToBool,
    ConvBoolToInt,
    ConvIntToFloat,
    ConvFloatToInt,
    ConvBoolToFloat,
    ConvFloatToBool,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Bitwise and shifts
    RightShift,
    LeftShift,
    And,
    InclusiveOr,
    ExclusiveOr,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,

    // Logical
    LogicalOr,
    LogicalXor,
    LogicalAnd,

    // Shape-specific multiplication, produced by promotion
    VectorTimesScalar,
    VectorTimesMatrix,
    MatrixTimesVector,
    MatrixTimesScalar,
    MatrixTimesMatrix,

    // Indexing
    IndexDirect,
    IndexIndirect,
    IndexDirectStruct,

    // Assignment family
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    InclusiveOrAssign,
    ExclusiveOrAssign,
    LeftShiftAssign,
    RightShiftAssign,
    VectorTimesScalarAssign,
    VectorTimesMatrixAssign,
    MatrixTimesScalarAssign,
    MatrixTimesMatrixAssign,

    // Constructors
    Construct(Constructor),
}

impl Op {
    /// The whole assignment family, including the shape-specific forms.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Op::Assign
                | Op::AddAssign
                | Op::SubAssign
                | Op::MulAssign
                | Op::DivAssign
                | Op::ModAssign
                | Op::AndAssign
                | Op::InclusiveOrAssign
                | Op::ExclusiveOrAssign
                | Op::LeftShiftAssign
                | Op::RightShiftAssign
                | Op::VectorTimesScalarAssign
                | Op::VectorTimesMatrixAssign
                | Op::MatrixTimesScalarAssign
                | Op::MatrixTimesMatrixAssign
        )
    }

    /// True when evaluating the operation changes the value of a variable.
    pub fn modifies_state(self) -> bool {
        self.is_assignment()
            || matches!(
                self,
                Op::PostIncrement | Op::PostDecrement | Op::PreIncrement | Op::PreDecrement
            )
    }

    pub fn is_constructor(self) -> bool {
        matches!(self, Op::Construct(_))
    }

    /// `<`, `>`, `<=`, `>=`
    pub fn is_ordered_comparison(self) -> bool {
        matches!(
            self,
            Op::LessThan | Op::GreaterThan | Op::LessThanEqual | Op::GreaterThanEqual
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Op::Equal | Op::NotEqual)
    }

    pub fn is_comparison(self) -> bool {
        self.is_ordered_comparison() || self.is_equality()
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Op::LogicalAnd | Op::LogicalOr | Op::LogicalXor)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Mod)
    }

    /// The arithmetic operator a compound assignment expands to, for the
    /// forms that are rewritten on non-square-matrix destinations.
    pub fn compound_arith(self) -> Option<Op> {
        match self {
            Op::MulAssign => Some(Op::Mul),
            Op::DivAssign => Some(Op::Div),
            Op::AddAssign => Some(Op::Add),
            Op::SubAssign => Some(Op::Sub),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Op::Null => "<null>",
            Op::Sequence => "sequence",
            Op::Comma => ",",
            Op::FunctionCall => "call",
            Op::Negative => "-",
            Op::LogicalNot => "!",
            Op::BitwiseNot => "~",
            Op::PostIncrement => "++ (post)",
            Op::PostDecrement => "-- (post)",
            Op::PreIncrement => "++ (pre)",
            Op::PreDecrement => "-- (pre)",
            Op::ConvIntToBool => "convert int to bool",
            Op::ConvBoolToInt => "convert bool to int",
            Op::ConvIntToFloat => "convert int to float",
            Op::ConvFloatToInt => "convert float to int",
            Op::ConvBoolToFloat => "convert bool to float",
            Op::ConvFloatToBool => "convert float to bool",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "%",
            Op::RightShift => ">>",
            Op::LeftShift => "<<",
            Op::And => "&",
            Op::InclusiveOr => "|",
            Op::ExclusiveOr => "^",
            Op::Equal => "==",
            Op::NotEqual => "!=",
            Op::LessThan => "<",
            Op::GreaterThan => ">",
            Op::LessThanEqual => "<=",
            Op::GreaterThanEqual => ">=",
            Op::LogicalOr => "||",
            Op::LogicalXor => "^^",
            Op::LogicalAnd => "&&",
            Op::VectorTimesScalar => "vector * scalar",
            Op::VectorTimesMatrix => "vector * matrix",
            Op::MatrixTimesVector => "matrix * vector",
            Op::MatrixTimesScalar => "matrix * scalar",
            Op::MatrixTimesMatrix => "matrix * matrix",
            Op::IndexDirect => "[] (direct)",
            Op::IndexIndirect => "[]",
            Op::IndexDirectStruct => ". (struct)",
            Op::Assign => "=",
            Op::AddAssign => "+=",
            Op::SubAssign => "-=",
            Op::MulAssign => "*=",
            Op::DivAssign => "/=",
            Op::ModAssign => "%=",
            Op::AndAssign => "&=",
            Op::InclusiveOrAssign => "|=",
            Op::ExclusiveOrAssign => "^=",
            Op::LeftShiftAssign => "<<=",
            Op::RightShiftAssign => ">>=",
            Op::VectorTimesScalarAssign => "vector *= scalar",
            Op::VectorTimesMatrixAssign => "vector *= matrix",
            Op::MatrixTimesScalarAssign => "matrix *= scalar",
            Op::MatrixTimesMatrixAssign => "matrix *= matrix",
            Op::Construct(ctor) => return write!(f, "construct {}", ctor),
        };
        write!(f, "{}", token)
    }
}

/// Loop statement flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopKind {
    While,
    DoWhile,
    For,
}

/// Control-flow transfer flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchKind {
    Return,
    Break,
    Continue,
    /// Fragment kill
    Discard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifies_state_covers_assignment_family() {
        assert!(Op::Assign.modifies_state());
        assert!(Op::MatrixTimesScalarAssign.modifies_state());
        assert!(Op::PreIncrement.modifies_state());
        assert!(Op::PostDecrement.modifies_state());
        assert!(!Op::Add.modifies_state());
        assert!(!Op::Equal.modifies_state());
        assert!(!Op::FunctionCall.modifies_state());
    }

    #[test]
    fn test_is_constructor() {
        assert!(Op::Construct(Constructor::Scalar(BasicType::Bool)).is_constructor());
        assert!(Op::Construct(Constructor::Vector(BasicType::Float, 3)).is_constructor());
        assert!(Op::Construct(Constructor::MatrixFromMatrix(2)).is_constructor());
        assert!(Op::Construct(Constructor::Struct).is_constructor());
        assert!(!Op::ConvIntToFloat.is_constructor());
    }

    #[test]
    fn test_compound_arith_mapping() {
        assert_eq!(Op::MulAssign.compound_arith(), Some(Op::Mul));
        assert_eq!(Op::DivAssign.compound_arith(), Some(Op::Div));
        assert_eq!(Op::AddAssign.compound_arith(), Some(Op::Add));
        assert_eq!(Op::SubAssign.compound_arith(), Some(Op::Sub));
        assert_eq!(Op::ModAssign.compound_arith(), None);
        assert_eq!(Op::Assign.compound_arith(), None);
    }

    #[test]
    fn test_constructor_display() {
        assert_eq!(Constructor::Vector(BasicType::Float, 2).to_string(), "vec2");
        assert_eq!(Constructor::Vector(BasicType::Int, 4).to_string(), "ivec4");
        assert_eq!(Constructor::Vector(BasicType::Bool, 3).to_string(), "bvec3");
        assert_eq!(Constructor::Scalar(BasicType::Float).to_string(), "float");
        assert_eq!(Constructor::Matrix(3).to_string(), "mat3");
    }
}
