//! Constant leaf values.
//!
//! A constant is a homogeneous run of tagged scalar cells, at most one per
//! component of its type (a `mat4` needs 16). A constant may hold fewer
//! cells than its type has components; reads past the stored run return the
//! last cell, which is how a single written scalar splats across a vector.

use serde::{Deserialize, Serialize};

use crate::foundation::{BasicType, Type};

/// Largest component count of any representable type (`mat4`).
pub const MAX_COMPONENTS: usize = 16;

/// One scalar cell of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl Value {
    /// The basic type of this cell.
    pub fn basic_type(self) -> BasicType {
        match self {
            Value::Bool(_) => BasicType::Bool,
            Value::Int(_) => BasicType::Int,
            Value::Float(_) => BasicType::Float,
        }
    }

    /// Cast to float: bools become 0.0 or 1.0.
    pub fn as_float(self) -> f32 {
        match self {
            Value::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int(i) => i as f32,
            Value::Float(f) => f,
        }
    }

    /// Cast to int: bools become 0 or 1, floats truncate.
    pub fn as_int(self) -> i32 {
        match self {
            Value::Bool(b) => b as i32,
            Value::Int(i) => i,
            Value::Float(f) => f as i32,
        }
    }

    /// Cast to bool: numeric cells test against zero.
    pub fn as_bool(self) -> bool {
        match self {
            Value::Bool(b) => b,
            Value::Int(i) => i != 0,
            Value::Float(f) => f != 0.0,
        }
    }

    /// Re-tag this cell as `basic`, applying the cast rules above.
    pub fn cast(self, basic: BasicType) -> Value {
        match basic {
            BasicType::Bool => Value::Bool(self.as_bool()),
            BasicType::Int => Value::Int(self.as_int()),
            _ => Value::Float(self.as_float()),
        }
    }
}

/// Constant node payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub ty: Type,
    cells: Vec<Value>,
}

impl Constant {
    /// An empty constant of the given type; the parser fills cells in.
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            cells: Vec::new(),
        }
    }

    /// A constant with its cells already populated.
    pub fn with_values(ty: Type, cells: Vec<Value>) -> Self {
        debug_assert!(cells.len() <= MAX_COMPONENTS);
        Self { ty, cells }
    }

    /// A single-cell constant.
    pub fn scalar(ty: Type, value: Value) -> Self {
        Self::with_values(ty, vec![value])
    }

    /// Number of stored cells.
    pub fn count(&self) -> usize {
        self.cells.len()
    }

    /// Read cell `i`; reads past the stored run splat the last cell.
    pub fn value(&self, i: usize) -> Value {
        assert!(!self.cells.is_empty(), "constant has no cells");
        self.cells[i.min(self.cells.len() - 1)]
    }

    /// Write cell `i`, extending the run by one when `i` is the next slot.
    pub fn set_value(&mut self, i: usize, value: Value) {
        debug_assert!(i < MAX_COMPONENTS);
        if i < self.cells.len() {
            self.cells[i] = value;
        } else {
            debug_assert_eq!(i, self.cells.len(), "non-contiguous constant write");
            self.cells.push(value);
        }
    }

    /// Replace all cells with one splatted value.
    pub fn splat(&mut self, value: Value) {
        self.cells.clear();
        self.cells.push(value);
    }

    pub fn values(&self) -> &[Value] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Precision;

    #[test]
    fn test_value_casts() {
        assert_eq!(Value::Int(3).as_float(), 3.0);
        assert_eq!(Value::Bool(true).as_float(), 1.0);
        assert_eq!(Value::Bool(false).as_int(), 0);
        assert_eq!(Value::Float(2.9).as_int(), 2);
        assert_eq!(Value::Float(-1.5).as_int(), -1);
        assert!(Value::Int(-4).as_bool());
        assert!(!Value::Float(0.0).as_bool());
        assert!(Value::Float(0.25).as_bool());
    }

    #[test]
    fn test_cast_retags() {
        assert_eq!(Value::Int(2).cast(BasicType::Float), Value::Float(2.0));
        assert_eq!(Value::Float(0.0).cast(BasicType::Bool), Value::Bool(false));
        assert_eq!(Value::Bool(true).cast(BasicType::Int), Value::Int(1));
    }

    #[test]
    fn test_splat_read() {
        let ty = Type::vector(BasicType::Float, 4);
        let c = Constant::scalar(ty, Value::Float(2.5));
        assert_eq!(c.count(), 1);
        for i in 0..4 {
            assert_eq!(c.value(i), Value::Float(2.5));
        }
    }

    #[test]
    fn test_set_value_extends() {
        let ty = Type::vector(BasicType::Int, 3);
        let mut c = Constant::new(ty);
        c.set_value(0, Value::Int(1));
        c.set_value(1, Value::Int(2));
        c.set_value(2, Value::Int(3));
        c.set_value(1, Value::Int(9));
        assert_eq!(c.values(), &[Value::Int(1), Value::Int(9), Value::Int(3)]);
    }

    #[test]
    fn test_scalar_constant() {
        let c = Constant::scalar(Type::new(BasicType::Bool, Precision::Undefined), Value::Bool(true));
        assert_eq!(c.value(0), Value::Bool(true));
        assert_eq!(c.count(), 1);
    }
}
