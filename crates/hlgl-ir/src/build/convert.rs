//! The conversion engine.
//!
//! Converts a node to a target basic type, either by folding a constant in
//! place or by wrapping the node in the matching conversion operator. Shape
//! differences are not conversion business; the promotion engine handles
//! those afterwards.

use hlgl_ast::arena::Handle;
use hlgl_ast::ast::{Constant, Constructor, Node, NodeKind, Op, Unary};
use hlgl_ast::foundation::{BasicType, Qualifier, Type};

use tracing::trace;

use super::IrBuilder;
use crate::diag::DiagSink;
use crate::error::{BuildError, BuildResult};

impl<S: DiagSink> IrBuilder<S> {
    /// Convert `node` to the basic type of `target`.
    ///
    /// Returns the node unchanged when the basic types already agree, a
    /// folded constant when the node is one, or a new conversion node.
    /// Fails when no conversion exists: samplers and void never convert,
    /// and neither structures nor arrays do.
    ///
    /// `op` gives the context: the explicit scalar constructors force their
    /// own target basic type, every other operator converts toward
    /// `target.basic`.
    pub fn convert(
        &mut self,
        op: Op,
        target: &Type,
        node: Handle<Node>,
    ) -> BuildResult<Handle<Node>> {
        let source_ty = self.operand_ty(node)?;

        if source_ty.basic == BasicType::Void || source_ty.basic.is_sampler() {
            return Err(BuildError::ConversionImpossible);
        }
        if target.same_type(&source_ty) {
            return Ok(node);
        }
        // Identical basic types: any remaining shape difference is promotion
        // work, not conversion work.
        if target.basic == source_ty.basic {
            return Ok(node);
        }
        if target.struct_def().is_some() || source_ty.struct_def().is_some() {
            return Err(BuildError::ConversionImpossible);
        }
        if target.is_array() || source_ty.is_array() {
            return Err(BuildError::ConversionImpossible);
        }

        let promote_to = match op {
            Op::Construct(Constructor::Scalar(basic)) => basic,
            _ => target.basic,
        };

        if self.node(node).as_constant().is_some() {
            return self.promote_constant(promote_to, node);
        }

        let span = self.node(node).span;
        let conversion = match (promote_to, source_ty.basic) {
            (BasicType::Float, BasicType::Int) => Op::ConvIntToFloat,
            (BasicType::Float, BasicType::Bool) => Op::ConvBoolToFloat,
            (BasicType::Bool, BasicType::Int) => Op::ConvIntToBool,
            (BasicType::Bool, BasicType::Float) => Op::ConvFloatToBool,
            (BasicType::Int, BasicType::Bool) => Op::ConvBoolToInt,
            (BasicType::Int, BasicType::Float) => Op::ConvFloatToInt,
            _ => return Err(self.internal_error(span, "bad promotion node")),
        };
        trace!(op = %conversion, from = %source_ty, "inserting conversion");

        let ty = Type::with(
            promote_to,
            source_ty.precision,
            Qualifier::Temporary,
            source_ty.size,
            source_ty.matrix,
            source_ty.array,
        );
        Ok(self.push(
            NodeKind::Unary(Unary {
                op: conversion,
                operand: node,
                ty,
            }),
            span,
        ))
    }

    /// Fold a constant to another basic type, cell by cell.
    ///
    /// The promoted constant keeps the source's nominal size, matrix and
    /// array metadata; only the cell tags and the basic type change.
    pub(crate) fn promote_constant(
        &mut self,
        promote_to: BasicType,
        node: Handle<Node>,
    ) -> BuildResult<Handle<Node>> {
        let span = self.node(node).span;
        if !promote_to.is_component() {
            return Err(self.internal_error(span, "cannot promote constant"));
        }
        let source = self
            .node(node)
            .as_constant()
            .expect("promote_constant takes a constant node")
            .clone();

        let mut ty = source.ty.clone();
        ty.basic = promote_to;
        let cells = source.values().iter().map(|v| v.cast(promote_to)).collect();
        Ok(self.push(NodeKind::Constant(Constant::with_values(ty, cells)), span))
    }
}
