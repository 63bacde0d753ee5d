//! The single-pass recursive lowering from the ladder AST to the abstract
//! machine's instruction stream.
//!
//! [`Lowerer`] owns everything lowering needs — the instruction buffer, the
//! symbol minter, and the EEPROM free-address cursor — fresh for every
//! invocation. Nothing here is process-wide or shared across calls, unlike
//! the C original this is grounded on (`ldmicro/intcode.cpp`), which kept all
//! of this in static globals reset by `GenerateIntermediateCode`.

mod elements;
mod format_string;
mod literal;
mod symbols;
mod timing;

use crate::ast::Program;
use crate::error::Result;
use crate::ir::Instruction;
use symbols::SymbolMinter;

/// Lower an entire ladder program to its instruction stream.
///
/// # Errors
///
/// Returns the first fatal diagnostic encountered (see [`crate::Error`]); no
/// partial buffer is exposed to the caller on failure.
pub fn lower(program: &Program) -> Result<Vec<Instruction>> {
    let mut lowerer = Lowerer::new(program.cycle_time_us);
    lowerer.lower_program(program)?;
    Ok(lowerer.buffer)
}

pub(crate) struct Lowerer {
    buffer: Vec<Instruction>,
    symbols: SymbolMinter,
    eeprom_next_addr: u16,
    cycle_time_us: u32,
}

impl Lowerer {
    fn new(cycle_time_us: u32) -> Self {
        Self {
            buffer: Vec::new(),
            symbols: SymbolMinter::default(),
            eeprom_next_addr: 0,
            cycle_time_us,
        }
    }

    pub(crate) fn emit(&mut self, instr: Instruction) {
        self.buffer.push(instr);
    }

    fn period(&self, delay_us: u32) -> Result<i16> {
        timing::period_for_delay(delay_us, self.cycle_time_us)
    }

    /// If `expr` is a literal token, emit `SetVarToLiteral(temp, value)` and
    /// return `temp`; otherwise return `expr` unchanged. Named after the
    /// `VarFromExpr` helper it is grounded on.
    fn var_from_expr(&mut self, expr: &str, temp: &str) -> Result<String> {
        if literal::is_literal_token(expr) {
            let value = literal::parse_literal(expr)?;
            self.emit(Instruction::SetVarToLiteral {
                name: temp.to_string(),
                value,
            });
            Ok(temp.to_string())
        } else {
            Ok(expr.to_string())
        }
    }

    fn lower_program(&mut self, program: &Program) -> Result<()> {
        self.emit(Instruction::SetBit {
            name: "$mcr".to_string(),
        });

        for rung in &program.rungs {
            if rung.is_comment_only() {
                tracing::debug!(rung = rung.id, "skipping comment-only rung");
                continue;
            }
            self.emit(Instruction::Comment {
                text: String::new(),
            });
            self.emit(Instruction::Comment {
                text: format!("start rung {}", rung.id + 1),
            });
            self.emit(Instruction::CopyBitToBit {
                dst: "$rung_top".to_string(),
                src: "$mcr".to_string(),
            });
            self.emit(Instruction::SimulateNodeState {
                node: crate::ir::SimNodeId::Rung(rung.id),
                name: "$rung_top".to_string(),
            });
            self.lower_series(&rung.circuit, "$rung_top")?;
        }

        Ok(())
    }
}
