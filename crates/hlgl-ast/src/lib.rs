//! # hlgl-ast
//!
//! Data model for the hlgl shader translator's intermediate representation:
//! source spans, type descriptors, the operator catalog, constant values and
//! the node graph, plus the arena the graph lives in.
//!
//! The companion crate `hlgl-ir` owns the engines that build and type this
//! graph; everything here is inert data with small query methods.

pub mod arena;
pub mod ast;
pub mod foundation;

pub use arena::{Arena, Handle};
pub use ast::{
    Aggregate, Binary, Branch, BranchKind, Constant, Constructor, Declaration, Loop, LoopKind,
    MAX_COMPONENTS, Node, NodeKind, Op, Selection, Symbol, SymbolInfo, Unary, Value,
};
pub use foundation::{BasicType, Precision, Qualifier, Span, StructDef, Type};
