use std::fmt;
use std::io::{self, Write};

use super::Instruction;

impl fmt::Display for Instruction {
    /// Canonical one-line rendering of a single instruction, with no
    /// indentation and no instruction index — see [`write_listing`] for the
    /// full pretty-printed form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetBit { name } => write!(f, "set bit '{name}'"),
            Self::ClearBit { name } => write!(f, "clear bit '{name}'"),
            Self::CopyBitToBit { dst, src } => write!(f, "let bit '{dst}' := '{src}'"),

            Self::SetVarToLiteral { name, value } => write!(f, "let var '{name}' := {value}"),
            Self::SetVarToVar { dst, src } => write!(f, "let var '{dst}' := '{src}'"),
            Self::SetVarAdd { dst, lhs, rhs } => {
                write!(f, "let var '{dst}' := '{lhs}' + '{rhs}'")
            }
            Self::SetVarSub { dst, lhs, rhs } => {
                write!(f, "let var '{dst}' := '{lhs}' - '{rhs}'")
            }
            Self::SetVarMul { dst, lhs, rhs } => {
                write!(f, "let var '{dst}' := '{lhs}' * '{rhs}'")
            }
            Self::SetVarDiv { dst, lhs, rhs } => {
                write!(f, "let var '{dst}' := '{lhs}' / '{rhs}'")
            }
            Self::IncrementVar { name } => write!(f, "increment '{name}'"),
            Self::IfVarLessLiteral { name, value } => write!(f, "if '{name}' < {value} {{"),
            Self::IfVarEqVar { lhs, rhs } => write!(f, "if '{lhs}' == '{rhs}' {{"),
            Self::IfVarGreaterVar { lhs, rhs } => write!(f, "if '{lhs}' > '{rhs}' {{"),

            Self::Else => write!(f, "}} else {{"),
            Self::EndIf => write!(f, "}}"),

            Self::ReadAdc { name } => write!(f, "read adc '{name}'"),
            Self::SetPwm { name, freq_text } => write!(f, "set pwm '{name}' {freq_text} Hz"),
            Self::EepromBusyCheck { name } => write!(f, "set bit '{name}' if EEPROM busy"),
            Self::EepromRead { name, addr } => {
                write!(f, "read EEPROM[{addr},{addr}+1] into '{name}'")
            }
            Self::EepromWrite { name, addr } => {
                write!(f, "write '{name}' into EEPROM[{addr},{addr}+1]")
            }
            Self::UartSend { name, done } => {
                write!(f, "uart send from '{name}', done? into '{done}'")
            }
            Self::UartRecv { name, have } => {
                write!(f, "uart recv int '{name}', have? into '{have}'")
            }

            Self::Comment { text } => write!(f, "# {text}"),
            Self::IfBitSet { name } => write!(f, "if '{name}' {{"),
            Self::IfBitClear { name } => write!(f, "if not '{name}' {{"),

            // Simulation-only; the real back-ends don't care, and per the
            // external interface contract this produces no output line at
            // all (handled in `write_listing`, not here).
            Self::SimulateNodeState { .. } => Ok(()),
        }
    }
}

/// Pretty-print the instruction stream the way a back-end author would read
/// it while debugging: one line per instruction, indented 4 spaces per
/// nesting level, prefixed with the instruction's index in the stream.
/// `SimulateNodeState` entries are simulation bookkeeping only and produce no
/// output line at all (their index is simply absent from the listing).
///
/// # Errors
///
/// Propagates any I/O error from `out`.
pub fn write_listing<W: Write>(instructions: &[Instruction], mut out: W) -> io::Result<()> {
    let mut indent: usize = 0;
    for (index, instr) in instructions.iter().enumerate() {
        if matches!(instr, Instruction::SimulateNodeState { .. }) {
            continue;
        }
        if instr.closes_block() {
            indent = indent.saturating_sub(1);
        }
        write!(out, "{index:3}:")?;
        for _ in 0..indent {
            write!(out, "    ")?;
        }
        writeln!(out, "{instr}")?;
        if instr.opens_block() {
            indent += 1;
        }
    }
    Ok(())
}

/// Convenience wrapper around [`write_listing`] that renders to a `String`.
#[must_use]
pub fn render_listing(instructions: &[Instruction]) -> String {
    let mut buf = Vec::new();
    write_listing(instructions, &mut buf).expect("writing to a Vec<u8> never fails");
    String::from_utf8(buf).expect("listing is ASCII-only")
}
