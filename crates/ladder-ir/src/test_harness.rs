//! Test harness for ladder-ir unit tests.
//!
//! This module provides small AST builders and instruction-pattern matching
//! so tests can describe circuits and expected instruction shapes tersely. It
//! is only available when running tests (`#[cfg(test)]`) or with the
//! `test-harness` feature.
//!
//! # Example
//!
//! ```rust
//! use ladder_ir::test_harness::*;
//!
//! let program = one_rung(series(vec![
//!     contacts("X1", false),
//!     coil("Y1", false, false, false),
//! ]));
//!
//! let instructions = ladder_ir::lower(&program).expect("lowering failed");
//! assert_has_pattern(&instructions, &[
//!     InstructionPattern::IfBitClear { name: Pat::Exact("X1".to_string()) },
//!     InstructionPattern::ClearBit { name: Pat::Any },
//!     InstructionPattern::EndIf,
//!     InstructionPattern::CopyBitToBit { dst: Pat::Exact("Y1".to_string()), src: Pat::Any },
//! ]);
//! ```

#![allow(clippy::must_use_candidate)]

use crate::ast::{
    CircuitNode, Element, Leaf, ParallelCircuit, Program, Rung, SeriesCircuit,
};
use crate::ir::Instruction;

/// Wraps a single rung's series circuit into a one-rung program with a
/// 1ms cycle time, the cycle time used by most unit tests in this crate.
pub fn one_rung(circuit: SeriesCircuit) -> Program {
    program_with_cycle_time(1000, vec![circuit])
}

/// Builds a program out of a sequence of rung series circuits and an
/// explicit cycle time, for tests that need specific timer arithmetic.
pub fn program_with_cycle_time(cycle_time_us: u32, circuits: Vec<SeriesCircuit>) -> Program {
    let rungs = circuits
        .into_iter()
        .enumerate()
        .map(|(id, circuit)| Rung {
            id: id as u32,
            circuit,
        })
        .collect();
    Program {
        cycle_time_us,
        rungs,
    }
}

/// Builds a series circuit node out of a flat list of elements, assigning
/// each a distinct [`crate::ast::LeafId`] in order starting from 0.
pub fn series(elements: Vec<Element>) -> SeriesCircuit {
    SeriesCircuit(
        elements
            .into_iter()
            .enumerate()
            .map(|(id, element)| CircuitNode::Leaf(Leaf { id: id as u32, element }))
            .collect(),
    )
}

/// Builds a parallel circuit node out of a flat list of branch elements,
/// each becoming its own one-element series branch.
pub fn parallel(elements: Vec<Element>) -> CircuitNode {
    CircuitNode::Parallel(ParallelCircuit(
        elements
            .into_iter()
            .enumerate()
            .map(|(id, element)| CircuitNode::Leaf(Leaf { id: id as u32, element }))
            .collect(),
    ))
}

pub fn contacts(name: &str, negated: bool) -> Element {
    Element::Contacts {
        name: name.to_string(),
        negated,
    }
}

pub fn coil(name: &str, negated: bool, set_only: bool, reset_only: bool) -> Element {
    Element::Coil {
        name: name.to_string(),
        negated,
        set_only,
        reset_only,
    }
}

/// Pattern for matching a single field of an instruction.
#[derive(Debug, Clone)]
pub enum Pat<T> {
    Any,
    Exact(T),
    Predicate(fn(&T) -> bool),
}

impl<T: PartialEq> Pat<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Pat::Any => true,
            Pat::Exact(expected) => value == expected,
            Pat::Predicate(pred) => pred(value),
        }
    }
}

/// Pattern for matching instructions in tests, mirroring [`Instruction`]'s
/// shape but with each field expressed as a [`Pat`].
#[derive(Debug, Clone)]
pub enum InstructionPattern {
    Any,
    SetBit { name: Pat<String> },
    ClearBit { name: Pat<String> },
    CopyBitToBit { dst: Pat<String>, src: Pat<String> },
    IfBitSet { name: Pat<String> },
    IfBitClear { name: Pat<String> },
    SetVarToLiteral { name: Pat<String>, value: Pat<i16> },
    SetVarToVar { dst: Pat<String>, src: Pat<String> },
    IfVarLessLiteral { name: Pat<String>, value: Pat<i16> },
    IfVarEqVar { lhs: Pat<String>, rhs: Pat<String> },
    IfVarGreaterVar { lhs: Pat<String>, rhs: Pat<String> },
    IncrementVar { name: Pat<String> },
    Else,
    EndIf,
    Comment { text: Pat<String> },
}

impl InstructionPattern {
    pub fn matches(&self, instr: &Instruction) -> bool {
        match (self, instr) {
            (Self::Any, _) => true,
            (Self::SetBit { name: p }, Instruction::SetBit { name }) => p.matches(name),
            (Self::ClearBit { name: p }, Instruction::ClearBit { name }) => p.matches(name),
            (
                Self::CopyBitToBit { dst: pd, src: ps },
                Instruction::CopyBitToBit { dst, src },
            ) => pd.matches(dst) && ps.matches(src),
            (Self::IfBitSet { name: p }, Instruction::IfBitSet { name }) => p.matches(name),
            (Self::IfBitClear { name: p }, Instruction::IfBitClear { name }) => p.matches(name),
            (
                Self::SetVarToLiteral { name: pn, value: pv },
                Instruction::SetVarToLiteral { name, value },
            ) => pn.matches(name) && pv.matches(value),
            (
                Self::SetVarToVar { dst: pd, src: ps },
                Instruction::SetVarToVar { dst, src },
            ) => pd.matches(dst) && ps.matches(src),
            (
                Self::IfVarLessLiteral { name: pn, value: pv },
                Instruction::IfVarLessLiteral { name, value },
            ) => pn.matches(name) && pv.matches(value),
            (
                Self::IfVarEqVar { lhs: pl, rhs: pr },
                Instruction::IfVarEqVar { lhs, rhs },
            ) => pl.matches(lhs) && pr.matches(rhs),
            (
                Self::IfVarGreaterVar { lhs: pl, rhs: pr },
                Instruction::IfVarGreaterVar { lhs, rhs },
            ) => pl.matches(lhs) && pr.matches(rhs),
            (Self::IncrementVar { name: p }, Instruction::IncrementVar { name }) => {
                p.matches(name)
            }
            (Self::Else, Instruction::Else) => true,
            (Self::EndIf, Instruction::EndIf) => true,
            (Self::Comment { text: p }, Instruction::Comment { text }) => p.matches(text),
            _ => false,
        }
    }
}

/// Finds the first window of `instructions` that matches `pattern` in order,
/// allowing unrelated instructions in between pattern entries. Returns the
/// starting index of the match, if any.
pub fn find_pattern(instructions: &[Instruction], pattern: &[InstructionPattern]) -> Option<usize> {
    if pattern.is_empty() {
        return Some(0);
    }
    for start in 0..instructions.len() {
        let mut pi = 0;
        let mut ii = start;
        while pi < pattern.len() && ii < instructions.len() {
            if pattern[pi].matches(&instructions[ii]) {
                pi += 1;
            }
            ii += 1;
        }
        if pi == pattern.len() {
            return Some(start);
        }
    }
    None
}

/// Asserts that `pattern` occurs, in order, somewhere in `instructions`.
///
/// # Panics
///
/// Panics with the full instruction listing if no match is found.
pub fn assert_has_pattern(instructions: &[Instruction], pattern: &[InstructionPattern]) {
    if find_pattern(instructions, pattern).is_none() {
        panic!(
            "pattern not found in instruction stream:\n{}",
            crate::ir::render_listing(instructions)
        );
    }
}

/// Counts how many instructions in `instructions` are the given variant,
/// identified with a predicate since `Instruction` carries no free-standing
/// opcode tag to compare against.
pub fn count_matching(instructions: &[Instruction], pred: impl Fn(&Instruction) -> bool) -> usize {
    instructions.iter().filter(|i| pred(i)).count()
}
