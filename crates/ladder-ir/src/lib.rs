//! Lowers structured ladder-diagram programs into a linear instruction
//! stream for an abstract bit/integer machine.
//!
//! A caller builds an [`ast::Program`] (a tree of rungs, each a series
//! circuit of nested series/parallel nodes and leaf elements), hands it to
//! [`lower`], and gets back a flat [`ir::Instruction`] stream plus, inline in
//! that stream, [`ir::Instruction::SimulateNodeState`] markers telling a
//! simulator which bit name ends up carrying each leaf's and rung's
//! post-scan power state.

pub mod ast;
mod error;
pub mod ir;
mod lowering;

#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use error::{Error, Result};
pub use lowering::lower;
