//! Type descriptors for the shader IR.
//!
//! Every typed IR node carries a [`Type`]: a basic type plus precision,
//! storage qualifier, nominal size, matrix and array metadata, and an
//! optional structure definition.
//!
//! # Non-square matrices
//!
//! The target language only has square matrices, so a source-level
//! `float3x4` is carried through the IR as a structure whose fields are the
//! row vectors. [`StructDef::matrix_dims`] records the original dimensions
//! and [`Type::is_non_square_matrix`] derives the predicate from it. The
//! rewriting of arithmetic on such values into helper calls lives in the
//! builder layer; the type system only has to identify them.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scalar classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicType {
    Void,
    Bool,
    Int,
    Float,
    Sampler1D,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Sampler1DShadow,
    Sampler2DShadow,
    /// ARB_texture_rectangle
    SamplerRect,
    /// ARB_texture_rectangle
    SamplerRectShadow,
    Struct,
}

impl BasicType {
    /// True for every sampler kind.
    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            BasicType::Sampler1D
                | BasicType::Sampler2D
                | BasicType::Sampler3D
                | BasicType::SamplerCube
                | BasicType::Sampler1DShadow
                | BasicType::Sampler2DShadow
                | BasicType::SamplerRect
                | BasicType::SamplerRectShadow
        )
    }

    /// True for the types that can form vectors and matrices.
    pub fn is_component(self) -> bool {
        matches!(self, BasicType::Bool | BasicType::Int | BasicType::Float)
    }

    /// One-or-two character code used in mangled signatures.
    pub fn mangled_code(self) -> &'static str {
        match self {
            BasicType::Void => "g",
            BasicType::Bool => "b",
            BasicType::Int => "i",
            BasicType::Float => "f",
            BasicType::Sampler1D => "s1",
            BasicType::Sampler2D => "s2",
            BasicType::Sampler3D => "s3",
            BasicType::SamplerCube => "sC",
            BasicType::Sampler1DShadow => "sS1",
            BasicType::Sampler2DShadow => "sS2",
            BasicType::SamplerRect => "sR2",
            BasicType::SamplerRectShadow => "sSR2",
            BasicType::Struct => "struct",
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BasicType::Void => "void",
            BasicType::Bool => "bool",
            BasicType::Int => "int",
            BasicType::Float => "float",
            BasicType::Sampler1D => "sampler1D",
            BasicType::Sampler2D => "sampler2D",
            BasicType::Sampler3D => "sampler3D",
            BasicType::SamplerCube => "samplerCube",
            BasicType::Sampler1DShadow => "sampler1DShadow",
            BasicType::Sampler2DShadow => "sampler2DShadow",
            BasicType::SamplerRect => "samplerRect",
            BasicType::SamplerRectShadow => "samplerRectShadow",
            BasicType::Struct => "struct",
        };
        write!(f, "{}", name)
    }
}

/// Precision lattice.
///
/// Ordered so that the precision of a binary result is the `max` of its
/// operand precisions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Precision {
    #[default]
    Undefined,
    Low,
    Medium,
    High,
}

impl Precision {
    /// The higher of two precisions.
    pub fn higher(self, other: Precision) -> Precision {
        self.max(other)
    }
}

/// Storage qualifier.
///
/// Results built by the node factories are always [`Qualifier::Temporary`];
/// everything else comes in on symbols from the declaration layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    #[default]
    Temporary,
    Const,
    In,
    Out,
    InOut,
    Uniform,
    Attribute,
    Varying,
    Global,
}

/// Structure definition shared by every value of that structure type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    /// Source-level type name, also the mangled signature of the type
    pub name: String,
    /// Ordered field table
    pub fields: IndexMap<String, Type>,
    /// Set when this structure emulates a `rows x cols` matrix
    pub matrix_dims: Option<(u8, u8)>,
}

impl StructDef {
    /// Define a plain structure.
    pub fn new(name: impl Into<String>, fields: IndexMap<String, Type>) -> Self {
        Self {
            name: name.into(),
            fields,
            matrix_dims: None,
        }
    }

    /// True when this structure stands in for a non-square matrix.
    pub fn is_non_square(&self) -> bool {
        self.matrix_dims.is_some_and(|(rows, cols)| rows != cols)
    }
}

/// Full type descriptor attached to typed IR nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub basic: BasicType,
    pub precision: Precision,
    pub qualifier: Qualifier,
    /// 1 for scalars, 2..=4 for vectors, the order N for an NxN matrix
    pub size: u8,
    pub matrix: bool,
    pub array: bool,
    pub array_size: u32,
    /// Present for structures, including emulated non-square matrices
    pub fields: Option<Arc<StructDef>>,
}

impl Type {
    /// A scalar temporary of the given basic type and precision.
    pub fn new(basic: BasicType, precision: Precision) -> Self {
        Self::with(basic, precision, Qualifier::Temporary, 1, false, false)
    }

    /// Full scalar/vector/matrix constructor.
    pub fn with(
        basic: BasicType,
        precision: Precision,
        qualifier: Qualifier,
        size: u8,
        matrix: bool,
        array: bool,
    ) -> Self {
        debug_assert!((1..=4).contains(&size), "nominal size out of range");
        debug_assert!(size == 1 || basic.is_component(), "vector of non-component type");
        Self {
            basic,
            precision,
            qualifier,
            size,
            matrix,
            array,
            array_size: 0,
            fields: None,
        }
    }

    /// A temporary vector of `size` components.
    pub fn vector(basic: BasicType, size: u8) -> Self {
        Self::with(basic, Precision::Undefined, Qualifier::Temporary, size, false, false)
    }

    /// A temporary float `size x size` matrix.
    pub fn matrix(size: u8) -> Self {
        Self::with(
            BasicType::Float,
            Precision::Undefined,
            Qualifier::Temporary,
            size,
            true,
            false,
        )
    }

    /// A structure type.
    pub fn structure(def: Arc<StructDef>) -> Self {
        Self {
            basic: BasicType::Struct,
            precision: Precision::Undefined,
            qualifier: Qualifier::Temporary,
            size: 1,
            matrix: false,
            array: false,
            array_size: 0,
            fields: Some(def),
        }
    }

    /// The structure standing in for a `rows x cols` float matrix.
    ///
    /// Fields are the row vectors `m0..m{rows-1}`, each a float vector of
    /// `cols` components.
    pub fn non_square_matrix(rows: u8, cols: u8) -> Self {
        debug_assert!((2..=4).contains(&rows) && (2..=4).contains(&cols));
        let mut fields = IndexMap::new();
        for row in 0..rows {
            fields.insert(format!("m{}", row), Type::vector(BasicType::Float, cols));
        }
        let def = StructDef {
            name: format!("mat{}x{}", rows, cols),
            fields,
            matrix_dims: Some((rows, cols)),
        };
        Self::structure(Arc::new(def))
    }

    /// Turn this type into an array of `size` elements.
    pub fn array_of(mut self, size: u32) -> Self {
        self.array = true;
        self.array_size = size;
        self
    }

    /// Replace the storage qualifier.
    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn is_scalar(&self) -> bool {
        self.size == 1 && !self.matrix
    }

    pub fn is_vector(&self) -> bool {
        self.size > 1 && !self.matrix
    }

    pub fn is_matrix(&self) -> bool {
        self.matrix
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    pub fn is_struct(&self) -> bool {
        self.basic == BasicType::Struct
    }

    /// The structure definition, when this is a structure type.
    pub fn struct_def(&self) -> Option<&StructDef> {
        self.fields.as_deref()
    }

    /// True when this type is a structure emulating a non-square matrix.
    pub fn is_non_square_matrix(&self) -> bool {
        self.fields.as_deref().is_some_and(StructDef::is_non_square)
    }

    /// Structural equality: basic type, shape, array and structure metadata.
    ///
    /// Precision and qualifier are deliberately ignored; they never make two
    /// values incompatible, they only affect the result type of an operation.
    pub fn same_type(&self, other: &Type) -> bool {
        self.basic == other.basic
            && self.size == other.size
            && self.matrix == other.matrix
            && self.array == other.array
            && (!self.array || self.array_size == other.array_size)
            && self.fields == other.fields
    }

    /// Signature fragment used to mangle helper-function call names.
    pub fn mangled_name(&self) -> String {
        let mut name = String::new();
        if let Some(def) = self.struct_def() {
            name.push_str(&def.name);
        } else {
            if self.matrix {
                name.push('m');
            } else if self.size > 1 {
                name.push('v');
            }
            name.push_str(self.basic.mangled_code());
            name.push(char::from(b'0' + self.size));
        }
        if self.array {
            name.push_str(&format!("[{}]", self.array_size));
        }
        name
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(def) = self.struct_def() {
            write!(f, "{}", def.name)?;
        } else if self.matrix {
            write!(f, "mat{}", self.size)?;
        } else if self.size > 1 {
            let prefix = match self.basic {
                BasicType::Bool => "b",
                BasicType::Int => "i",
                _ => "",
            };
            write!(f, "{}vec{}", prefix, self.size)?;
        } else {
            write!(f, "{}", self.basic)?;
        }
        if self.array {
            write!(f, "[{}]", self.array_size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_lattice() {
        assert!(Precision::Undefined < Precision::Low);
        assert!(Precision::Low < Precision::Medium);
        assert!(Precision::Medium < Precision::High);
        assert_eq!(Precision::Low.higher(Precision::High), Precision::High);
        assert_eq!(Precision::Undefined.higher(Precision::Undefined), Precision::Undefined);
    }

    #[test]
    fn test_shape_predicates() {
        assert!(Type::new(BasicType::Float, Precision::High).is_scalar());
        assert!(Type::vector(BasicType::Int, 3).is_vector());
        assert!(Type::matrix(4).is_matrix());
        assert!(!Type::matrix(4).is_vector());
        assert!(Type::vector(BasicType::Float, 2).array_of(5).is_array());
    }

    #[test]
    fn test_same_type_ignores_precision_and_qualifier() {
        let a = Type::with(
            BasicType::Float,
            Precision::High,
            Qualifier::Uniform,
            3,
            false,
            false,
        );
        let b = Type::vector(BasicType::Float, 3);
        assert!(a.same_type(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_type_checks_array_size() {
        let a = Type::new(BasicType::Float, Precision::Undefined).array_of(4);
        let b = Type::new(BasicType::Float, Precision::Undefined).array_of(8);
        assert!(!a.same_type(&b));
        assert!(a.same_type(&a.clone()));
    }

    #[test]
    fn test_non_square_matrix_predicate() {
        let m = Type::non_square_matrix(2, 3);
        assert!(m.is_non_square_matrix());
        assert!(m.is_struct());
        assert!(!m.is_matrix());
        assert_eq!(m.struct_def().unwrap().fields.len(), 2);

        // A square emulated matrix is still a structure, but not non-square.
        let mut square = Type::non_square_matrix(2, 3);
        let def = StructDef {
            matrix_dims: Some((3, 3)),
            ..square.struct_def().unwrap().clone()
        };
        square.fields = Some(Arc::new(def));
        assert!(!square.is_non_square_matrix());
    }

    #[test]
    fn test_mangled_names() {
        assert_eq!(Type::new(BasicType::Float, Precision::Undefined).mangled_name(), "f1");
        assert_eq!(Type::vector(BasicType::Float, 3).mangled_name(), "vf3");
        assert_eq!(Type::vector(BasicType::Bool, 2).mangled_name(), "vb2");
        assert_eq!(Type::matrix(4).mangled_name(), "mf4");
        assert_eq!(Type::non_square_matrix(2, 4).mangled_name(), "mat2x4");
        assert_eq!(
            Type::new(BasicType::Int, Precision::Undefined).array_of(3).mangled_name(),
            "i1[3]"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::vector(BasicType::Float, 2).to_string(), "vec2");
        assert_eq!(Type::vector(BasicType::Bool, 4).to_string(), "bvec4");
        assert_eq!(Type::vector(BasicType::Int, 3).to_string(), "ivec3");
        assert_eq!(Type::matrix(3).to_string(), "mat3");
        assert_eq!(Type::non_square_matrix(3, 4).to_string(), "mat3x4");
        assert_eq!(
            Type::new(BasicType::Float, Precision::Undefined).array_of(2).to_string(),
            "float[2]"
        );
    }
}
