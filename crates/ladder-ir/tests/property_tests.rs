//! Property-based tests for the ladder lowering pass.
//!
//! Uses `proptest` to generate random series circuits and check invariants
//! that must hold regardless of the specific program: lowering never panics,
//! block nesting always balances, and every leaf gets exactly one
//! `SimulateNodeState` marker.

use ladder_ir::ast::Element;
use ladder_ir::ir::Instruction;
use ladder_ir::test_harness::*;
use proptest::prelude::*;

fn arb_simple_element() -> impl Strategy<Value = Element> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9]{0,4}"
            .prop_map(|name| contacts(&name, false)),
        "[A-Za-z][A-Za-z0-9]{0,4}"
            .prop_map(|name| contacts(&name, true)),
        "[A-Za-z][A-Za-z0-9]{0,4}"
            .prop_map(|name| coil(&name, false, false, false)),
        Just(Element::OneShotRising),
        Just(Element::OneShotFalling),
        Just(Element::Open),
        Just(Element::Short),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any series circuit built only from the simple (no-fallible-lowering)
    /// elements lowers without error.
    #[test]
    fn simple_series_circuits_always_lower(elements in prop::collection::vec(arb_simple_element(), 1..8)) {
        let program = one_rung(series(elements));
        let result = ladder_ir::lower(&program);
        prop_assert!(result.is_ok(), "lowering failed: {:?}", result.err());
    }

    /// Block nesting in the resulting instruction stream is always balanced,
    /// regardless of how deeply circuits are nested.
    #[test]
    fn block_nesting_is_always_balanced(elements in prop::collection::vec(arb_simple_element(), 1..8)) {
        let program = one_rung(series(elements));
        let instructions = ladder_ir::lower(&program).expect("lowering failed");

        let mut depth = 0i32;
        for instr in &instructions {
            if instr.closes_block() {
                depth -= 1;
            }
            prop_assert!(depth >= 0);
            if instr.opens_block() {
                depth += 1;
            }
        }
        prop_assert_eq!(depth, 0);
    }

    /// Every leaf in the circuit produces exactly one `SimulateNodeState`
    /// marker, regardless of how many elements the rung contains.
    #[test]
    fn one_simulate_node_state_per_leaf(elements in prop::collection::vec(arb_simple_element(), 1..8)) {
        let count = elements.len();
        let program = one_rung(series(elements));
        let instructions = ladder_ir::lower(&program).expect("lowering failed");

        let leaf_states = count_matching(&instructions, |i| {
            matches!(i, Instruction::SimulateNodeState { node: ladder_ir::ir::SimNodeId::Leaf(_), .. })
        });
        prop_assert_eq!(leaf_states, count);
    }

    /// Timer periods just inside the valid range always lower to the exact
    /// expected comparison literal.
    #[test]
    fn timer_period_matches_closed_form(multiple in 2u32..1000) {
        let cycle_time_us = 1000;
        let delay_us = cycle_time_us * multiple;
        let program = one_rung(series(vec![
            contacts("X1", false),
            Element::Ton { name: "T1".to_string(), delay_us },
        ]));
        let instructions = ladder_ir::lower(&program).expect("lowering failed");
        let expected = (multiple - 1) as i16;
        prop_assert!(instructions.iter().any(|i| matches!(
            i,
            Instruction::IfVarLessLiteral { name, value } if name == "T1" && *value == expected
        )));
    }
}
