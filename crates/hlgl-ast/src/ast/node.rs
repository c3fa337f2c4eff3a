//! The node graph.
//!
//! Nodes form a closed set of variants; no node kind is ever added from
//! outside this crate, so the graph is a plain tagged enum and downstream
//! passes pattern match on it. Nodes live in the builder's [`Arena`] and
//! reference each other by [`Handle`].

use crate::arena::{Arena, Handle};
use crate::ast::constant::Constant;
use crate::ast::op::{BranchKind, LoopKind, Op};
use crate::foundation::{Span, Type};

/// Extra front-end information attached to a symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Source-level semantic annotation (`POSITION`, `TEXCOORD0`, ...)
    pub semantic: Option<String>,
    /// Explicit register binding, when one was written
    pub register: Option<i32>,
}

/// Identifier reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Unique id assigned by the symbol table
    pub id: i32,
    pub name: String,
    pub info: Option<SymbolInfo>,
    /// True for file-scope declarations
    pub global: bool,
    pub ty: Type,
}

/// Single-operand operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: Op,
    pub operand: Handle<Node>,
    pub ty: Type,
}

/// Two-operand operation, including the whole assignment family.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: Op,
    pub left: Handle<Node>,
    pub right: Handle<Node>,
    pub ty: Type,
}

/// Variadic node: sequences, comma chains, function calls, constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub op: Op,
    pub children: Vec<Handle<Node>>,
    /// Call name with the mangled argument signature appended
    pub mangled_name: Option<String>,
    /// Call name as written
    pub plain_name: Option<String>,
    pub ty: Option<Type>,
}

impl Aggregate {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            children: Vec::new(),
            mangled_name: None,
            plain_name: None,
            ty: None,
        }
    }
}

/// `if` statement or ternary expression.
///
/// For the statement form either block may be absent and `ty` is void; the
/// ternary form always has both blocks and a promoted result type.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub cond: Handle<Node>,
    pub true_block: Option<Handle<Node>>,
    pub false_block: Option<Handle<Node>>,
    pub ty: Type,
}

/// Loop statement. The step expression is desugared into the body by the
/// builder, so a fully built loop always has `step: None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    pub kind: LoopKind,
    pub cond: Option<Handle<Node>>,
    pub step: Option<Handle<Node>>,
    pub body: Handle<Node>,
}

/// Control-flow transfer, with an expression for `return value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub kind: BranchKind,
    pub expr: Option<Handle<Node>>,
}

/// Variable declaration.
///
/// The payload is a single symbol, a single `symbol = init` assignment, or
/// a comma aggregate of those two forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: Type,
    pub payload: Handle<Node>,
}

impl Declaration {
    /// True while the declaration holds one declarator.
    pub fn is_single(&self, nodes: &Arena<Node>) -> bool {
        !matches!(nodes[self.payload].kind, NodeKind::Aggregate(_))
    }

    /// True for the `T x = init;` form.
    pub fn is_single_initialization(&self, nodes: &Arena<Node>) -> bool {
        matches!(nodes[self.payload].kind, NodeKind::Binary(_))
    }

    /// True for `T a, b = init, c;` forms.
    pub fn is_multiple(&self, nodes: &Arena<Node>) -> bool {
        matches!(nodes[self.payload].kind, NodeKind::Aggregate(_))
    }

    /// Whether this declaration initializes an array, which the emitter has
    /// to unroll element-wise.
    pub fn contains_array_initialization(&self, nodes: &Arena<Node>) -> bool {
        if !self.ty.is_array() {
            return false;
        }
        if self.is_single_initialization(nodes) {
            return true;
        }
        if let NodeKind::Aggregate(agg) = &nodes[self.payload].kind {
            return agg
                .children
                .iter()
                .any(|&child| matches!(nodes[child].kind, NodeKind::Binary(_)));
        }
        false
    }
}

/// One IR node: a kind plus its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Closed set of node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Symbol(Symbol),
    Constant(Constant),
    Unary(Unary),
    Binary(Binary),
    Aggregate(Aggregate),
    Selection(Selection),
    Loop(Loop),
    Branch(Branch),
    Declaration(Declaration),
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The node's type, for kinds that carry one.
    pub fn ty(&self) -> Option<&Type> {
        match &self.kind {
            NodeKind::Symbol(s) => Some(&s.ty),
            NodeKind::Constant(c) => Some(&c.ty),
            NodeKind::Unary(u) => Some(&u.ty),
            NodeKind::Binary(b) => Some(&b.ty),
            NodeKind::Aggregate(a) => a.ty.as_ref(),
            NodeKind::Selection(s) => Some(&s.ty),
            NodeKind::Declaration(d) => Some(&d.ty),
            NodeKind::Loop(_) | NodeKind::Branch(_) => None,
        }
    }

    /// Overwrite the node's type.
    ///
    /// Used by index operations, where the caller knows the element type.
    ///
    /// # Panics
    /// Panics on kinds that carry no type.
    pub fn set_ty(&mut self, ty: Type) {
        match &mut self.kind {
            NodeKind::Symbol(s) => s.ty = ty,
            NodeKind::Constant(c) => c.ty = ty,
            NodeKind::Unary(u) => u.ty = ty,
            NodeKind::Binary(b) => b.ty = ty,
            NodeKind::Aggregate(a) => a.ty = Some(ty),
            NodeKind::Selection(s) => s.ty = ty,
            NodeKind::Declaration(d) => d.ty = ty,
            NodeKind::Loop(_) | NodeKind::Branch(_) => panic!("set_ty on an untyped node"),
        }
    }

    /// Handles of this node's direct children.
    pub fn children(&self) -> Vec<Handle<Node>> {
        match &self.kind {
            NodeKind::Symbol(_) | NodeKind::Constant(_) => Vec::new(),
            NodeKind::Unary(u) => vec![u.operand],
            NodeKind::Binary(b) => vec![b.left, b.right],
            NodeKind::Aggregate(a) => a.children.clone(),
            NodeKind::Selection(s) => {
                let mut out = vec![s.cond];
                out.extend(s.true_block);
                out.extend(s.false_block);
                out
            }
            NodeKind::Loop(l) => {
                let mut out = Vec::new();
                out.extend(l.cond);
                out.extend(l.step);
                out.push(l.body);
                out
            }
            NodeKind::Branch(b) => b.expr.into_iter().collect(),
            NodeKind::Declaration(d) => vec![d.payload],
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match &self.kind {
            NodeKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            NodeKind::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_constant_mut(&mut self) -> Option<&mut Constant> {
        match &mut self.kind {
            NodeKind::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match &self.kind {
            NodeKind::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match &self.kind {
            NodeKind::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_aggregate_mut(&mut self) -> Option<&mut Aggregate> {
        match &mut self.kind {
            NodeKind::Aggregate(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{BasicType, Precision};

    fn symbol(nodes: &mut Arena<Node>, name: &str, ty: Type) -> Handle<Node> {
        nodes.append(Node::new(
            NodeKind::Symbol(Symbol {
                id: 1,
                name: name.into(),
                info: None,
                global: false,
                ty,
            }),
            Span::at_line(1),
        ))
    }

    #[test]
    fn test_ty_accessor() {
        let mut nodes = Arena::new();
        let float = Type::new(BasicType::Float, Precision::Medium);
        let s = symbol(&mut nodes, "x", float.clone());
        assert_eq!(nodes[s].ty(), Some(&float));

        let branch = nodes.append(Node::new(
            NodeKind::Branch(Branch {
                kind: BranchKind::Break,
                expr: None,
            }),
            Span::unknown(),
        ));
        assert_eq!(nodes[branch].ty(), None);
    }

    #[test]
    fn test_children_cover_every_link() {
        let mut nodes = Arena::new();
        let float = Type::new(BasicType::Float, Precision::Undefined);
        let cond = symbol(&mut nodes, "c", float.clone());
        let body = symbol(&mut nodes, "b", float.clone());
        let leaf = symbol(&mut nodes, "x", float);

        assert!(nodes[leaf].children().is_empty());

        let selection = Node::new(
            NodeKind::Selection(Selection {
                cond,
                true_block: Some(body),
                false_block: None,
                ty: Type::new(BasicType::Void, Precision::Undefined),
            }),
            Span::unknown(),
        );
        assert_eq!(selection.children(), vec![cond, body]);

        let lp = Node::new(
            NodeKind::Loop(Loop {
                kind: LoopKind::While,
                cond: Some(cond),
                step: None,
                body,
            }),
            Span::unknown(),
        );
        assert_eq!(lp.children(), vec![cond, body]);
    }

    #[test]
    fn test_declaration_single_forms() {
        let mut nodes = Arena::new();
        let arr = Type::new(BasicType::Float, Precision::Undefined).array_of(3);
        let sym = symbol(&mut nodes, "a", arr.clone());
        let decl = Declaration {
            ty: arr.clone(),
            payload: sym,
        };
        assert!(decl.is_single(&nodes));
        assert!(!decl.is_single_initialization(&nodes));
        assert!(!decl.contains_array_initialization(&nodes));

        let init = nodes.append(Node::new(
            NodeKind::Binary(Binary {
                op: Op::Assign,
                left: sym,
                right: sym,
                ty: arr.clone(),
            }),
            Span::unknown(),
        ));
        let decl = Declaration {
            ty: arr,
            payload: init,
        };
        assert!(decl.is_single_initialization(&nodes));
        assert!(decl.contains_array_initialization(&nodes));
    }

    #[test]
    fn test_declaration_multiple_with_initializer() {
        let mut nodes = Arena::new();
        let arr = Type::new(BasicType::Int, Precision::Undefined).array_of(2);
        let a = symbol(&mut nodes, "a", arr.clone());
        let b = symbol(&mut nodes, "b", arr.clone());
        let init = nodes.append(Node::new(
            NodeKind::Binary(Binary {
                op: Op::Assign,
                left: b,
                right: b,
                ty: arr.clone(),
            }),
            Span::unknown(),
        ));

        let mut agg = Aggregate::new(Op::Comma);
        agg.children = vec![a, init];
        let payload = nodes.append(Node::new(NodeKind::Aggregate(agg), Span::unknown()));

        let decl = Declaration { ty: arr, payload };
        assert!(decl.is_multiple(&nodes));
        assert!(decl.contains_array_initialization(&nodes));
    }
}
