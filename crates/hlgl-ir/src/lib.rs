//! # hlgl-ir
//!
//! IR construction and type promotion for the hlgl shader translator.
//!
//! The parser drives [`IrBuilder`] from its reductions: one factory call
//! per grammar production that produces IR. The builder validates operand
//! types, inserts the implicit conversions the source language guarantees,
//! rewrites arithmetic on emulated non-square matrices into helper calls,
//! and assigns every expression node its final type.
//!
//! ## Layers
//!
//! - [`build`] owns the factories and the three engines behind them
//!   (conversion, promotion, non-square rewriting).
//! - [`diag`] is the channel for internal-error and advisory messages.
//! - [`error`] is the caller-visible build failure; a failed factory call
//!   reports *which* rule broke and the parser words the user message.
//!
//! The node data model lives in the `hlgl-ast` crate.

pub mod build;
pub mod diag;
pub mod error;

pub use build::IrBuilder;
pub use diag::{DiagSink, Diagnostic, Severity};
pub use error::{BuildError, BuildResult};
