//! The node factories the parser drives.
//!
//! [`IrBuilder`] owns the node arena of one translation unit and exposes one
//! factory method per grammar production that creates IR. Each factory
//! validates its operands, lets the conversion engine wrap them where the
//! source language demands an implicit coercion, hands binary arithmetic on
//! emulated non-square matrices to the rewriter, and finally runs the
//! promotion engine to give the node its result type.
//!
//! The builder is single threaded and stateful; it is called synchronously
//! from parser reductions and never suspends. A factory either returns a
//! fully typed node or fails without touching the caller's subtrees.

mod convert;
mod promote;
mod rewrite;


use std::collections::HashSet;

use hlgl_ast::arena::{Arena, Handle};
use hlgl_ast::ast::{
    Aggregate, Binary, Branch, BranchKind, Constant, Constructor, Declaration, Loop, LoopKind,
    Node, NodeKind, Op, Selection, Symbol, SymbolInfo, Unary, Value,
};
use hlgl_ast::foundation::{BasicType, Precision, Qualifier, Span, Type};

use crate::diag::{DiagSink, Diagnostic};
use crate::error::{BuildError, BuildResult};

/// Stateful IR factory for one translation unit.
///
/// Generic over the diagnostic sink so tests can capture messages; the
/// default sink is a plain vector.
pub struct IrBuilder<S: DiagSink = Vec<Diagnostic>> {
    nodes: Arena<Node>,
    sink: S,
}

impl Default for IrBuilder<Vec<Diagnostic>> {
    fn default() -> Self {
        Self::new()
    }
}

impl IrBuilder<Vec<Diagnostic>> {
    pub fn new() -> Self {
        Self::with_sink(Vec::new())
    }
}

impl<S: DiagSink> IrBuilder<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            nodes: Arena::new(),
            sink,
        }
    }

    pub fn nodes(&self) -> &Arena<Node> {
        &self.nodes
    }

    pub fn node(&self, handle: Handle<Node>) -> &Node {
        &self.nodes[handle]
    }

    pub fn node_mut(&mut self, handle: Handle<Node>) -> &mut Node {
        &mut self.nodes[handle]
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Overwrite a node's type. Index operations use this: the factory
    /// cannot know the element type, the caller can.
    pub fn set_type(&mut self, handle: Handle<Node>, ty: Type) {
        self.nodes[handle].set_ty(ty);
    }

    /// Post-order disposer: release the tree rooted at `root`.
    ///
    /// Children are released before their parents; a node reachable through
    /// two parents (the compound-assignment expansion shares its
    /// destination) is released once. Handles into the removed tree become
    /// invalid; nodes outside it are untouched.
    pub fn remove(&mut self, root: Handle<Node>) {
        let mut stack = vec![root];
        let mut order: Vec<Handle<Node>> = Vec::new();
        let mut seen: HashSet<Handle<Node>> = HashSet::new();
        while let Some(handle) = stack.pop() {
            if !seen.insert(handle) {
                continue;
            }
            let Some(node) = self.nodes.try_get(handle) else {
                continue;
            };
            stack.extend(node.children());
            order.push(handle);
        }
        // Parents precede their children in the collection order, so the
        // reverse releases bottom-up.
        for handle in order.into_iter().rev() {
            self.nodes.remove(handle);
        }
    }

    /// Collective disposer: drop every node of the unit at once.
    ///
    /// Outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Hand the finished node graph (and the sink) to the next pass.
    pub fn finish(self) -> (Arena<Node>, S) {
        (self.nodes, self.sink)
    }

    fn push(&mut self, kind: NodeKind, span: Span) -> Handle<Node> {
        self.nodes.append(Node::new(kind, span))
    }

    /// Push an internal-error diagnostic and produce the matching failure.
    pub(crate) fn internal_error(&mut self, span: Span, message: &str) -> BuildError {
        self.sink.push(Diagnostic::internal_error(span, message));
        BuildError::Internal
    }

    /// The type of an operand node. Operands handed to the factories must
    /// be typed; an untyped one is a bug in the calling parser action.
    pub(crate) fn operand_ty(&mut self, handle: Handle<Node>) -> BuildResult<Type> {
        match self.nodes[handle].ty() {
            Some(ty) => Ok(ty.clone()),
            None => {
                let span = self.nodes[handle].span;
                Err(self.internal_error(span, "operand node carries no type"))
            }
        }
    }

    // === Leaf factories ===

    /// Terminal node for an identifier in an expression.
    pub fn add_symbol(
        &mut self,
        id: i32,
        name: impl Into<String>,
        info: Option<SymbolInfo>,
        ty: Type,
        span: Span,
    ) -> Handle<Node> {
        self.push(
            NodeKind::Symbol(Symbol {
                id,
                name: name.into(),
                info,
                global: false,
                ty,
            }),
            span,
        )
    }

    /// Terminal node for a file-scope identifier.
    pub fn add_global_symbol(
        &mut self,
        id: i32,
        name: impl Into<String>,
        info: Option<SymbolInfo>,
        ty: Type,
        span: Span,
    ) -> Handle<Node> {
        let handle = self.add_symbol(id, name, info, ty, span);
        if let NodeKind::Symbol(symbol) = &mut self.nodes[handle].kind {
            symbol.global = true;
        }
        handle
    }

    /// Constant terminal node; the caller fills cells in afterwards.
    pub fn add_constant(&mut self, ty: Type, span: Span) -> Handle<Node> {
        self.push(NodeKind::Constant(Constant::new(ty)), span)
    }

    /// Constant terminal node with its cells already populated.
    pub fn add_constant_with(&mut self, ty: Type, cells: Vec<Value>, span: Span) -> Handle<Node> {
        self.push(NodeKind::Constant(Constant::with_values(ty, cells)), span)
    }

    // === Binary math ===

    /// Connect two nodes with a binary operation, inserting the implicit
    /// conversions the source language demands.
    pub fn add_binary(
        &mut self,
        op: Op,
        left: Handle<Node>,
        right: Handle<Node>,
        span: Span,
    ) -> BuildResult<Handle<Node>> {
        let mut left = left;
        let mut right = right;
        let left_ty = self.operand_ty(left)?;
        let right_ty = self.operand_ty(right)?;
        let left_nsm = left_ty.is_non_square_matrix();
        let right_nsm = right_ty.is_non_square_matrix();

        if op.is_ordered_comparison() {
            if left_ty.is_matrix() || left_ty.is_array() || left_ty.basic == BasicType::Struct {
                return Err(BuildError::InvalidOperandShape);
            }
        } else if op.is_logical() {
            if left_ty.is_matrix() || left_ty.is_array() {
                return Err(BuildError::InvalidOperandShape);
            }
            left = self.coerce_logical_operand(left, &left_ty)?;
            if right_ty.is_matrix() || right_ty.is_array() || right_ty.is_vector() {
                return Err(BuildError::InvalidOperandShape);
            }
            right = self.coerce_logical_operand(right, &right_ty)?;
        } else if op.is_arithmetic() {
            // An emulated non-square matrix is the one structure arithmetic
            // accepts.
            if !left_nsm && left_ty.basic == BasicType::Struct {
                return Err(BuildError::InvalidOperandShape);
            }
            let mut left_to_float = left_ty.basic == BasicType::Bool;
            let mut right_to_float = right_ty.basic == BasicType::Bool;
            if op == Op::Mod {
                left_to_float |= left_ty.basic == BasicType::Int;
                right_to_float |= right_ty.basic == BasicType::Int;
            }
            if left_to_float {
                left = self.coerce_to_float(left, &left_ty)?;
            }
            if right_to_float {
                right = self.coerce_to_float(right, &right_ty)?;
            }
        }

        let left_ty = self.operand_ty(left)?;
        let right_ty = self.operand_ty(right)?;

        // Unify the operand basic types, promoting toward float > int > bool.
        if left_ty.struct_def().is_some() && right_ty.struct_def().is_some() {
            if !left_ty.same_type(&right_ty) {
                return Err(BuildError::IncompatibleOperands);
            }
        } else {
            let mut use_left = true;
            if left_ty.basic != BasicType::Float && !left_nsm {
                if right_ty.basic == BasicType::Float || right_nsm {
                    use_left = false;
                } else if left_ty.basic != BasicType::Int && right_ty.basic == BasicType::Int {
                    use_left = false;
                }
            }
            if use_left {
                // No conversion is needed toward a non-square matrix; its
                // component type is float.
                if !right_nsm {
                    let target = if left_nsm {
                        Type::new(BasicType::Float, Precision::Undefined)
                    } else {
                        left_ty.clone()
                    };
                    match self.convert(op, &target, right) {
                        Ok(converted) => right = converted,
                        Err(_) if left_nsm => return Err(BuildError::IncompatibleOperands),
                        Err(_) => {
                            left = self
                                .convert(op, &right_ty, left)
                                .map_err(|_| BuildError::IncompatibleOperands)?;
                        }
                    }
                }
            } else if !left_nsm {
                let target = if right_nsm {
                    Type::new(BasicType::Float, Precision::Undefined)
                } else {
                    right_ty.clone()
                };
                match self.convert(op, &target, left) {
                    Ok(converted) => left = converted,
                    Err(_) if right_nsm => return Err(BuildError::IncompatibleOperands),
                    Err(_) => {
                        right = self
                            .convert(op, &left_ty, right)
                            .map_err(|_| BuildError::IncompatibleOperands)?;
                    }
                }
            }
        }

        // Arithmetic on an emulated non-square matrix has no direct operator
        // in the target language; it becomes a helper call.
        if left_nsm || right_nsm {
            let left_ty = self.operand_ty(left)?;
            let right_ty = self.operand_ty(right)?;
            if !left_ty.is_array() && !right_ty.is_array() {
                if let Some(call) = self.rewrite_non_square(op, left, right, span)? {
                    return Ok(call);
                }
            }
        }

        let span = span.or(self.nodes[right].span);
        let mut binary = Binary {
            op,
            left,
            right,
            ty: Type::new(BasicType::Void, Precision::Undefined),
        };
        self.promote_binary(&mut binary, span)?;
        Ok(self.push(NodeKind::Binary(binary), span))
    }

    /// Connect two nodes through an assignment. Conversion only flows from
    /// the right side to the left: the destination's type is authoritative.
    pub fn add_assign(
        &mut self,
        op: Op,
        left: Handle<Node>,
        right: Handle<Node>,
        span: Span,
    ) -> BuildResult<Handle<Node>> {
        let left_ty = self.operand_ty(left)?;
        let right_ty = self.operand_ty(right)?;
        let left_nsm = left_ty.is_non_square_matrix();
        let right_nsm = right_ty.is_non_square_matrix();

        let mut op = op;
        let mut child = right;
        if !right_nsm {
            let target = if left_nsm {
                Type::new(BasicType::Float, Precision::Undefined)
            } else {
                left_ty.clone()
            };
            child = self.convert(op, &target, right)?;
        }

        if left_nsm && op != Op::Assign {
            // Compound assignment on an emulated matrix expands to
            // `L = L op R`; the destination handle ends up under both the
            // assignment and the expansion.
            if let Some(arith) = op.compound_arith() {
                if let Ok(expanded) = self.add_binary(arith, left, right, span) {
                    child = expanded;
                    op = Op::Assign;
                }
            }
        }

        let span = span.or(self.nodes[left].span);
        let mut binary = Binary {
            op,
            left,
            right: child,
            ty: Type::new(BasicType::Void, Precision::Undefined),
        };
        self.promote_binary(&mut binary, span)?;
        Ok(self.push(NodeKind::Binary(binary), span))
    }

    /// Connect a base and an offset through an index operation.
    ///
    /// The caller sets the type of the returned node; the element type of an
    /// indexed value is symbol-table knowledge this layer does not have.
    pub fn add_index(
        &mut self,
        op: Op,
        base: Handle<Node>,
        index: Handle<Node>,
        span: Span,
    ) -> Handle<Node> {
        let span = span.or(self.nodes[index].span);
        self.push(
            NodeKind::Binary(Binary {
                op,
                left: base,
                right: index,
                ty: Type::new(BasicType::Void, Precision::Undefined),
            }),
            span,
        )
    }

    /// Add a node as the parent of another that it operates on.
    ///
    /// The scalar constructors `bool(x)`, `int(x)` and `float(x)` are pure
    /// conversions: the converted child is returned directly, without a
    /// wrapping unary node.
    pub fn add_unary(
        &mut self,
        op: Op,
        child: Handle<Node>,
        span: Span,
    ) -> BuildResult<Handle<Node>> {
        let child_ty = self.operand_ty(child)?;

        match op {
            Op::LogicalNot => {
                if child_ty.basic != BasicType::Bool
                    || child_ty.is_matrix()
                    || child_ty.is_array()
                    || child_ty.is_vector()
                {
                    return Err(BuildError::InvalidOperandShape);
                }
            }
            Op::PostIncrement
            | Op::PreIncrement
            | Op::PostDecrement
            | Op::PreDecrement
            | Op::Negative => {
                if child_ty.basic == BasicType::Struct || child_ty.is_array() {
                    return Err(BuildError::InvalidOperandShape);
                }
            }
            _ => {}
        }

        if let Op::Construct(Constructor::Scalar(new_basic)) = op {
            let target = Type::with(
                new_basic,
                child_ty.precision,
                Qualifier::Temporary,
                child_ty.size,
                child_ty.matrix,
                child_ty.array,
            );
            return self.convert(op, &target, child);
        }

        let span = span.or(self.nodes[child].span);
        let mut unary = Unary {
            op,
            operand: child,
            ty: Type::new(BasicType::Void, Precision::Undefined),
        };
        self.promote_unary(&mut unary)?;
        Ok(self.push(NodeKind::Unary(unary), span))
    }

    // === Selection ===

    /// `if` statement node. The condition is coerced to bool the way the
    /// source language does it.
    pub fn add_selection(
        &mut self,
        cond: Handle<Node>,
        true_block: Option<Handle<Node>>,
        false_block: Option<Handle<Node>>,
        span: Span,
    ) -> BuildResult<Handle<Node>> {
        let cond_ty = self.operand_ty(cond)?;
        let cond = match cond_ty.basic {
            BasicType::Float | BasicType::Int => {
                let target = Type::with(
                    BasicType::Bool,
                    cond_ty.precision,
                    cond_ty.qualifier,
                    cond_ty.size,
                    cond_ty.matrix,
                    cond_ty.array,
                );
                self.convert(Op::Construct(Constructor::Scalar(BasicType::Bool)), &target, cond)?
            }
            _ => cond,
        };
        Ok(self.push(
            NodeKind::Selection(Selection {
                cond,
                true_block,
                false_block,
                ty: Type::new(BasicType::Void, Precision::Undefined),
            }),
            span,
        ))
    }

    /// `?:` expression node. Both branches are promoted to a common type,
    /// preferring to lift toward the more precise basic type.
    pub fn add_ternary(
        &mut self,
        cond: Handle<Node>,
        true_expr: Handle<Node>,
        false_expr: Handle<Node>,
        span: Span,
    ) -> BuildResult<Handle<Node>> {
        let cond_ty = self.operand_ty(cond)?;
        let mut cond = cond;
        if cond_ty.basic != BasicType::Bool {
            let target = Type::with(
                BasicType::Bool,
                cond_ty.precision,
                cond_ty.qualifier,
                cond_ty.size,
                cond_ty.matrix,
                cond_ty.array,
            );
            cond = self.convert(Op::Construct(Constructor::Scalar(BasicType::Bool)), &target, cond)?;
        }

        let true_ty = self.operand_ty(true_expr)?;
        let false_ty = self.operand_ty(false_expr)?;

        // Promote toward whichever branch holds the higher basic type on
        // the ladder bool < int < float; default to the true branch.
        let mut promote_from_true = true;
        match true_ty.basic {
            BasicType::Bool => {
                if matches!(false_ty.basic, BasicType::Int | BasicType::Float) {
                    promote_from_true = false;
                }
            }
            BasicType::Int => {
                if false_ty.basic == BasicType::Float {
                    promote_from_true = false;
                }
            }
            _ => {}
        }

        let mut true_expr = true_expr;
        let mut false_expr = false_expr;
        if promote_from_true {
            match self.convert(Op::Sequence, &true_ty, false_expr) {
                Ok(converted) => false_expr = converted,
                Err(_) => {
                    true_expr = self
                        .convert(Op::Sequence, &false_ty, true_expr)
                        .map_err(|_| BuildError::IncompatibleOperands)?;
                }
            }
        } else {
            match self.convert(Op::Sequence, &false_ty, true_expr) {
                Ok(converted) => true_expr = converted,
                Err(_) => {
                    false_expr = self
                        .convert(Op::Sequence, &true_ty, false_expr)
                        .map_err(|_| BuildError::IncompatibleOperands)?;
                }
            }
        }

        let result_ty = self.operand_ty(true_expr)?;
        let mut selection = Selection {
            cond,
            true_block: Some(true_expr),
            false_block: Some(false_expr),
            ty: result_ty,
        };
        self.promote_ternary(&mut selection)?;
        Ok(self.push(NodeKind::Selection(selection), span))
    }

    // === Sequencing ===

    /// Comma expression. A comma over two constants evaluates to its right
    /// operand and builds nothing.
    pub fn add_comma(
        &mut self,
        left: Handle<Node>,
        right: Handle<Node>,
        span: Span,
    ) -> BuildResult<Handle<Node>> {
        let left_ty = self.operand_ty(left)?;
        let right_ty = self.operand_ty(right)?;
        if left_ty.qualifier == Qualifier::Const && right_ty.qualifier == Qualifier::Const {
            return Ok(right);
        }
        let aggregate = self
            .grow_aggregate(Some(left), Some(right), span)
            .expect("two operands always aggregate");
        let agg = self.nodes[aggregate]
            .as_aggregate_mut()
            .expect("grow_aggregate returns an aggregate");
        agg.op = Op::Comma;
        agg.ty = Some(right_ty.qualified(Qualifier::Temporary));
        Ok(aggregate)
    }

    /// Swizzle selector: a sequence of constant component indices, consumed
    /// as the right side of a direct-index operation.
    pub fn add_swizzle(&mut self, fields: &[i32], span: Span) -> Handle<Node> {
        let mut aggregate = Aggregate::new(Op::Sequence);
        for &offset in fields {
            let ty = Type::new(BasicType::Int, Precision::Undefined).qualified(Qualifier::Const);
            let cell = self.push(NodeKind::Constant(Constant::scalar(ty, Value::Int(offset))), span);
            aggregate.children.push(cell);
        }
        self.push(NodeKind::Aggregate(aggregate), span)
    }

    // === Statements ===

    /// Loop node. A step expression is desugared into the end of the body so
    /// later passes only ever see `while`-shaped loops with bodies.
    pub fn add_loop(
        &mut self,
        kind: LoopKind,
        cond: Option<Handle<Node>>,
        step: Option<Handle<Node>>,
        body: Handle<Node>,
        span: Span,
    ) -> Handle<Node> {
        let mut body = body;
        if let Some(step) = step {
            // A step that is itself an aggregate gets flattened, not nested.
            let step_children = self.nodes[step]
                .as_aggregate()
                .map(|agg| agg.children.clone());
            if self.nodes[body].as_aggregate().is_some() {
                let agg = self.nodes[body].as_aggregate_mut().expect("checked above");
                match step_children {
                    Some(children) => agg.children.extend(children),
                    None => agg.children.push(step),
                }
            } else {
                let mut aggregate = Aggregate::new(Op::Sequence);
                aggregate.children.push(body);
                match step_children {
                    Some(children) => aggregate.children.extend(children),
                    None => aggregate.children.push(step),
                }
                body = self.push(NodeKind::Aggregate(aggregate), span);
            }
        }
        self.push(
            NodeKind::Loop(Loop {
                kind,
                cond,
                step: None,
                body,
            }),
            span,
        )
    }

    /// Control-flow transfer, with an expression for `return value`.
    pub fn add_branch(
        &mut self,
        kind: BranchKind,
        expr: Option<Handle<Node>>,
        span: Span,
    ) -> Handle<Node> {
        self.push(NodeKind::Branch(Branch { kind, expr }), span)
    }

    // === Declarations ===

    /// Declaration of one symbol, with an optional initializer.
    pub fn add_declaration(
        &mut self,
        symbol: Handle<Node>,
        initializer: Option<Handle<Node>>,
        span: Span,
    ) -> BuildResult<Handle<Node>> {
        let ty = self.operand_ty(symbol)?;
        let payload = match initializer {
            None => symbol,
            Some(init) => self.add_assign(Op::Assign, symbol, init, span)?,
        };
        Ok(self.push(NodeKind::Declaration(Declaration { ty, payload }), span))
    }

    /// Extend a declaration with another declarator (`float a, b, c;`).
    ///
    /// The first growth converts the single payload into a comma aggregate;
    /// later growths extend it.
    pub fn grow_declaration(
        &mut self,
        declaration: Handle<Node>,
        symbol: Handle<Node>,
        initializer: Option<Handle<Node>>,
    ) -> BuildResult<Handle<Node>> {
        let symbol_span = self.nodes[symbol].span;
        let added = match initializer {
            None => symbol,
            Some(init) => self.add_assign(Op::Assign, symbol, init, symbol_span)?,
        };

        let payload = match &self.nodes[declaration].kind {
            NodeKind::Declaration(decl) => decl.payload,
            _ => {
                let span = self.nodes[declaration].span;
                return Err(self.internal_error(span, "grow_declaration on a non-declaration node"));
            }
        };

        let target = if self.nodes[payload].as_aggregate().is_some() {
            // Reset the operator so the aggregate extends in place instead
            // of being wrapped again.
            self.nodes[payload].as_aggregate_mut().expect("checked above").op = Op::Null;
            payload
        } else {
            let payload_span = self.nodes[payload].span;
            self.make_aggregate(payload, payload_span)
        };

        let added_span = self.nodes[added].span;
        let aggregate = self
            .grow_aggregate(Some(target), Some(added), added_span)
            .expect("two operands always aggregate");
        self.nodes[aggregate]
            .as_aggregate_mut()
            .expect("grow_aggregate returns an aggregate")
            .op = Op::Comma;

        match &mut self.nodes[declaration].kind {
            NodeKind::Declaration(decl) => decl.payload = aggregate,
            _ => unreachable!("checked above"),
        }
        Ok(declaration)
    }

    // === Aggregate plumbing ===

    /// Turn an existing node into a one-child aggregate.
    pub fn make_aggregate(&mut self, node: Handle<Node>, span: Span) -> Handle<Node> {
        let mut aggregate = Aggregate::new(Op::Null);
        aggregate.ty = self.nodes[node].ty().cloned();
        aggregate.children.push(node);
        let span = span.or(self.nodes[node].span);
        self.push(NodeKind::Aggregate(aggregate), span)
    }

    /// Combine two nodes into an aggregate, reusing a still-growing (null
    /// operator) aggregate on the left. Safe with absent operands.
    pub fn grow_aggregate(
        &mut self,
        left: Option<Handle<Node>>,
        right: Option<Handle<Node>>,
        span: Span,
    ) -> Option<Handle<Node>> {
        if left.is_none() && right.is_none() {
            return None;
        }

        let aggregate = match left {
            Some(l) if self.nodes[l].as_aggregate().is_some_and(|a| a.op == Op::Null) => l,
            Some(l) => {
                let mut agg = Aggregate::new(Op::Null);
                agg.children.push(l);
                self.push(NodeKind::Aggregate(agg), span.or(self.nodes[l].span))
            }
            None => self.push(NodeKind::Aggregate(Aggregate::new(Op::Null)), span),
        };

        if let Some(r) = right {
            self.nodes[aggregate]
                .as_aggregate_mut()
                .expect("aggregate by construction")
                .children
                .push(r);
        }
        if !span.is_unknown() {
            self.nodes[aggregate].span = span;
        }
        Some(aggregate)
    }

    /// Set the operator on an aggregate, wrapping the node in a fresh
    /// aggregate when it is not one (or is one that is already finished).
    pub fn set_aggregate_operator(
        &mut self,
        node: Option<Handle<Node>>,
        op: Op,
        span: Span,
    ) -> Handle<Node> {
        let aggregate = match node {
            Some(n) if self.nodes[n].as_aggregate().is_some_and(|a| a.op == Op::Null) => n,
            Some(n) => {
                let mut agg = Aggregate::new(Op::Null);
                agg.children.push(n);
                self.push(NodeKind::Aggregate(agg), span.or(self.nodes[n].span))
            }
            None => self.push(NodeKind::Aggregate(Aggregate::new(Op::Null)), span),
        };
        self.nodes[aggregate]
            .as_aggregate_mut()
            .expect("aggregate by construction")
            .op = op;
        if !span.is_unknown() {
            self.nodes[aggregate].span = span;
        }
        aggregate
    }

    // === Pre-conversion helpers ===

    /// Coerce an int or float operand of a logical operator to bool.
    fn coerce_logical_operand(
        &mut self,
        operand: Handle<Node>,
        ty: &Type,
    ) -> BuildResult<Handle<Node>> {
        if ty.basic == BasicType::Bool {
            return Ok(operand);
        }
        if !matches!(ty.basic, BasicType::Int | BasicType::Float) {
            return Err(BuildError::InvalidOperandShape);
        }
        let target = Type::with(
            BasicType::Bool,
            ty.precision,
            ty.qualifier,
            ty.size,
            ty.matrix,
            ty.array,
        );
        self.convert(Op::Construct(Constructor::Scalar(BasicType::Bool)), &target, operand)
    }

    /// Coerce a bool (or, for `%`, int) arithmetic operand to float.
    fn coerce_to_float(&mut self, operand: Handle<Node>, ty: &Type) -> BuildResult<Handle<Node>> {
        let target = Type::with(
            BasicType::Float,
            ty.precision,
            ty.qualifier,
            ty.size,
            ty.matrix,
            ty.array,
        );
        self.convert(Op::Construct(Constructor::Scalar(BasicType::Float)), &target, operand)
    }
}
