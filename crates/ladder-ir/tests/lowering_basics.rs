//! End-to-end lowering scenarios over small programs.

use ladder_ir::ast::{CircuitNode, Element, Leaf, Program, Rung, SeriesCircuit};
use ladder_ir::ir::Instruction;
use ladder_ir::test_harness::*;

#[test]
fn empty_program_just_sets_the_master_relay_bit() {
    let program = Program {
        cycle_time_us: 1000,
        rungs: vec![],
    };
    let instructions = ladder_ir::lower(&program).expect("lowering failed");
    assert_eq!(
        instructions,
        vec![Instruction::SetBit {
            name: "$mcr".to_string()
        }]
    );
}

#[test]
fn contact_feeding_coil() {
    let program = one_rung(series(vec![
        contacts("X1", false),
        coil("Y1", false, false, false),
    ]));

    let instructions = ladder_ir::lower(&program).expect("lowering failed");

    assert_has_pattern(
        &instructions,
        &[
            InstructionPattern::IfBitClear {
                name: Pat::Exact("X1".to_string()),
            },
            InstructionPattern::ClearBit { name: Pat::Any },
            InstructionPattern::EndIf,
            InstructionPattern::CopyBitToBit {
                dst: Pat::Exact("Y1".to_string()),
                src: Pat::Any,
            },
        ],
    );

    // One SimulateNodeState per leaf (2 leaves), plus one for the rung.
    let sim_states = count_matching(&instructions, |i| {
        matches!(i, Instruction::SimulateNodeState { .. })
    });
    assert_eq!(sim_states, 3);
}

#[test]
fn negated_contact_uses_if_bit_set() {
    let program = one_rung(series(vec![
        contacts("X1", true),
        coil("Y1", false, false, false),
    ]));
    let instructions = ladder_ir::lower(&program).expect("lowering failed");
    assert_has_pattern(
        &instructions,
        &[InstructionPattern::IfBitSet {
            name: Pat::Exact("X1".to_string()),
        }],
    );
}

#[test]
fn on_delay_timer_uses_the_computed_period() {
    // delay=5000us, cycle=1000us => period = 5000/1000 - 1 = 4
    let program = one_rung(series(vec![
        contacts("X1", false),
        Element::Ton {
            name: "T1".to_string(),
            delay_us: 5000,
        },
    ]));
    let instructions = ladder_ir::lower(&program).expect("lowering failed");
    assert_has_pattern(
        &instructions,
        &[InstructionPattern::IfVarLessLiteral {
            name: Pat::Exact("T1".to_string()),
            value: Pat::Exact(4),
        }],
    );
}

#[test]
fn up_counter_compares_against_its_max() {
    let program = one_rung(series(vec![
        contacts("X1", false),
        Element::Ctu {
            name: "C1".to_string(),
            max: 3,
        },
    ]));
    let instructions = ladder_ir::lower(&program).expect("lowering failed");
    assert_has_pattern(
        &instructions,
        &[InstructionPattern::IfVarLessLiteral {
            name: Pat::Exact("C1".to_string()),
            value: Pat::Exact(3),
        }],
    );
}

#[test]
fn master_relay_after_a_de_energized_rung_latches_off() {
    let program = Program {
        cycle_time_us: 1000,
        rungs: vec![
            Rung {
                id: 0,
                circuit: series(vec![Element::Open, Element::MasterRelay]),
            },
            Rung {
                id: 1,
                circuit: series(vec![coil("Y1", false, false, false)]),
            },
        ],
    };
    let instructions = ladder_ir::lower(&program).expect("lowering failed");

    // The second rung's top-of-rung copy reads $mcr, which the first rung's
    // MasterRelay element just cleared by copying the (now-false) rung state
    // into it.
    let mcr_writes = count_matching(&instructions, |i| {
        matches!(i, Instruction::CopyBitToBit { dst, .. } if dst == "$mcr")
    });
    assert_eq!(mcr_writes, 1);
}

#[test]
fn placeholder_element_is_a_fatal_diagnostic() {
    let program = one_rung(series(vec![Element::Placeholder]));
    let err = ladder_ir::lower(&program).unwrap_err();
    assert!(matches!(err, ladder_ir::Error::Placeholder));
}

#[test]
fn comment_only_rung_contributes_no_instructions() {
    let program = Program {
        cycle_time_us: 1000,
        rungs: vec![
            Rung {
                id: 0,
                circuit: series(vec![Element::Comment {
                    text: "just a note".to_string(),
                }]),
            },
            Rung {
                id: 1,
                circuit: series(vec![coil("Y1", false, false, false)]),
            },
        ],
    };
    let instructions = ladder_ir::lower(&program).expect("lowering failed");

    let rung_starts = count_matching(&instructions, |i| {
        matches!(i, Instruction::Comment { text } if text.starts_with("start rung"))
    });
    assert_eq!(rung_starts, 1);
}

#[test]
fn pretty_printed_listing_is_deterministic() {
    let program = one_rung(series(vec![
        contacts("X1", false),
        coil("Y1", false, false, false),
    ]));
    let instructions = ladder_ir::lower(&program).expect("lowering failed");
    let a = ladder_ir::ir::render_listing(&instructions);
    let b = ladder_ir::ir::render_listing(&instructions);
    assert_eq!(a, b);
    assert!(a.contains("if not 'X1' {"));
}

#[test]
fn piecewise_linear_table_reaching_the_top_of_the_i16_range_does_not_panic() {
    // x values strictly increasing up to i16::MAX must not overflow when the
    // lowering computes `x_hi + 1` for the segment guard.
    let program = one_rung(series(vec![Element::PiecewiseLinear {
        index: "X".to_string(),
        dest: "Y".to_string(),
        points: vec![(32766, 0), (32767, 10)],
    }]));
    assert!(ladder_ir::lower(&program).is_ok());
}

#[test]
fn piecewise_linear_table_with_overflowing_dx_dy_product_is_fatal() {
    // dx = dy = 60000 overflows i32 when multiplied directly; must be
    // computed in a wider type and rejected as PiecewiseLinearOverflow,
    // not panic or silently wrap.
    let program = one_rung(series(vec![Element::PiecewiseLinear {
        index: "X".to_string(),
        dest: "Y".to_string(),
        points: vec![(-30000, -30000), (30000, 30000)],
    }]));
    let err = ladder_ir::lower(&program).unwrap_err();
    assert!(matches!(err, ladder_ir::Error::PiecewiseLinearOverflow));
}

#[test]
fn series_and_parallel_nesting_stays_balanced() {
    let program = one_rung(SeriesCircuit(vec![
        CircuitNode::Leaf(Leaf {
            id: 0,
            element: contacts("X1", false),
        }),
        parallel(vec![contacts("X2", false), contacts("X3", false)]),
        CircuitNode::Leaf(Leaf {
            id: 3,
            element: coil("Y1", false, false, false),
        }),
    ]));
    let instructions = ladder_ir::lower(&program).expect("lowering failed");

    let mut depth = 0i32;
    for instr in &instructions {
        if instr.closes_block() {
            depth -= 1;
        }
        assert!(depth >= 0, "unbalanced block nesting");
        if instr.opens_block() {
            depth += 1;
        }
    }
    assert_eq!(depth, 0, "blocks left open at end of listing");
}
