use crate::ast::{LeafId, RungId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which simulator node a [`Instruction::SimulateNodeState`] reports on: a
/// leaf element's post-scan power state, or a whole rung's.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimNodeId {
    Leaf(LeafId),
    Rung(RungId),
}

/// One instruction of the abstract machine.
///
/// Each variant carries exactly the operands its opcode uses — no shared
/// `name1..3`/`literal` record, per the "sum types" redesign note: back-ends
/// consuming this stream match on the variant directly instead of switching
/// on a tag byte.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // === Bit ===
    SetBit { name: String },
    ClearBit { name: String },
    CopyBitToBit { dst: String, src: String },
    IfBitSet { name: String },
    IfBitClear { name: String },

    // === Integer ===
    SetVarToLiteral { name: String, value: i16 },
    SetVarToVar { dst: String, src: String },
    SetVarAdd { dst: String, lhs: String, rhs: String },
    SetVarSub { dst: String, lhs: String, rhs: String },
    SetVarMul { dst: String, lhs: String, rhs: String },
    SetVarDiv { dst: String, lhs: String, rhs: String },
    IncrementVar { name: String },
    IfVarLessLiteral { name: String, value: i16 },
    IfVarEqVar { lhs: String, rhs: String },
    IfVarGreaterVar { lhs: String, rhs: String },

    // === Control ===
    Else,
    EndIf,

    // === Device ===
    ReadAdc { name: String },
    SetPwm { name: String, freq_text: String },
    EepromBusyCheck { name: String },
    EepromRead { name: String, addr: u16 },
    EepromWrite { name: String, addr: u16 },
    UartSend { name: String, done: String },
    UartRecv { name: String, have: String },

    // === Meta ===
    Comment { text: String },
    /// No effect on any back-end; tells the caller's simulator which bit
    /// name ended up carrying `node`'s post-scan power state.
    SimulateNodeState { node: SimNodeId, name: String },
}

impl Instruction {
    /// True for the five opcodes that open a conditional block
    /// (`IfBitSet`/`IfBitClear`/`IfVarLessLiteral`/`IfVarEqVar`/
    /// `IfVarGreaterVar`) plus `Else`, which re-opens one.
    #[must_use]
    pub const fn opens_block(&self) -> bool {
        matches!(
            self,
            Self::IfBitSet { .. }
                | Self::IfBitClear { .. }
                | Self::IfVarLessLiteral { .. }
                | Self::IfVarEqVar { .. }
                | Self::IfVarGreaterVar { .. }
                | Self::Else
        )
    }

    /// True for the opcodes that close a conditional block (`EndIf`, and
    /// `Else` which closes the preceding arm before opening its own).
    #[must_use]
    pub const fn closes_block(&self) -> bool {
        matches!(self, Self::EndIf | Self::Else)
    }
}
