//! The IR node set: operators, constants and the node graph.

pub mod constant;
pub mod node;
pub mod op;

pub use constant::{Constant, MAX_COMPONENTS, Value};
pub use node::{
    Aggregate, Binary, Branch, Declaration, Loop, Node, NodeKind, Selection, Symbol, SymbolInfo,
    Unary,
};
pub use op::{BranchKind, Constructor, LoopKind, Op};
