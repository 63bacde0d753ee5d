//! The ladder AST: the input this crate lowers.
//!
//! Owned and constructed by the caller (the editor/loader, out of scope for
//! this crate). A `Program` is an ordered sequence of rungs; each rung is a
//! series sub-circuit of circuit nodes, which are themselves either nested
//! sub-circuits or leaf elements.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity for a leaf element, used only so the lowering can tell the
/// caller's simulator which rung-state name ended up carrying that leaf's
/// post-scan power state. The caller owns the actual flag storage (e.g. an
/// arena of `Cell<bool>` indexed by this id); this crate never dereferences
/// it.
pub type LeafId = u32;

/// Stable identity for a rung, used the same way as [`LeafId`] but for the
/// rung's own "did power reach the end of this rung" flag.
pub type RungId = u32;

/// A name-or-literal token, exactly as the editor would hand it to us: either
/// a user variable name, or a literal written as a decimal integer (`"-12"`)
/// or a single-character literal (`"'A'"`). Classification happens at
/// lowering time — see `lowering::literal`.
pub type Expr = String;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Duration of one scan, in microseconds. Every timer delay is expressed
    /// as a whole number of scans against this value.
    pub cycle_time_us: u32,
    pub rungs: Vec<Rung>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Rung {
    pub id: RungId,
    /// Even a rung with a single element is wrapped as a one-element series.
    pub circuit: SeriesCircuit,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesCircuit(pub Vec<CircuitNode>);

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParallelCircuit(pub Vec<CircuitNode>);

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitNode {
    Series(SeriesCircuit),
    Parallel(ParallelCircuit),
    Leaf(Leaf),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub id: LeafId,
    pub element: Element,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    Grt,
    Geq,
    Les,
    Leq,
    Equ,
    Neq,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Contacts {
        name: String,
        negated: bool,
    },
    Coil {
        name: String,
        negated: bool,
        set_only: bool,
        reset_only: bool,
    },
    /// Retentive on-delay timer.
    Rto {
        name: String,
        delay_us: u32,
    },
    /// Reset: zeroes `name` while the rung is powered.
    Res {
        name: String,
    },
    /// On-delay timer.
    Ton {
        name: String,
        delay_us: u32,
    },
    /// Off-delay timer.
    Tof {
        name: String,
        delay_us: u32,
    },
    /// Up counter.
    Ctu {
        name: String,
        max: i16,
    },
    /// Down counter.
    Ctd {
        name: String,
        max: i16,
    },
    /// Circular (wrapping) counter.
    Ctc {
        name: String,
        max: i16,
    },
    Compare {
        kind: CompareKind,
        lhs: Expr,
        rhs: Expr,
    },
    OneShotRising,
    OneShotFalling,
    Move {
        dest: Expr,
        src: Expr,
    },
    Math {
        op: MathOp,
        dest: Expr,
        lhs: Expr,
        rhs: Expr,
    },
    ReadAdc {
        name: String,
    },
    SetPwm {
        pin: String,
        target_freq_hz: u32,
    },
    /// EEPROM-backed variable; two bytes are reserved for it at lowering
    /// time, in source order.
    Persist {
        var: String,
    },
    UartSend {
        name: String,
    },
    UartRecv {
        name: String,
    },
    MasterRelay,
    ShiftRegister {
        name: String,
        stages: u32,
    },
    LookUpTable {
        index: String,
        dest: String,
        values: Vec<i16>,
    },
    /// Points are `(x, y)` pairs; `x` must be strictly increasing.
    PiecewiseLinear {
        index: String,
        dest: String,
        points: Vec<(i16, i16)>,
    },
    FormattedString {
        /// Variable interpolated into the `\N`/`\-N` slot, if any. Empty if
        /// the format string has no placeholder.
        var: String,
        format: String,
    },
    /// Dead branch: always cuts the rung.
    Open,
    /// Passes straight through.
    Short,
    /// Empty row; always a fatal diagnostic when lowered.
    Placeholder,
    /// Structural trace only; never lowered to an instruction of its own.
    Comment {
        text: String,
    },
}

impl Rung {
    /// A rung that is nothing but a single `Comment` leaf contributes no
    /// instructions and is skipped entirely by the driver.
    pub(crate) fn is_comment_only(&self) -> bool {
        matches!(
            self.circuit.0.as_slice(),
            [CircuitNode::Leaf(Leaf {
                element: Element::Comment { .. },
                ..
            })]
        )
    }
}
