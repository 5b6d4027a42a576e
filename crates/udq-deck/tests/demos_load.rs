use std::path::Path;

use udq_deck::QuantityValue;

#[test]
fn demos_load_and_run() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    let demos = ["field_totals.yaml"];

    for name in demos {
        let path = root.join(name);
        let deck = udq_deck::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        let run = udq_deck::run_seeded(&deck, None)
            .unwrap_or_else(|e| panic!("Failed to run {}: {}", name, e));
        assert_eq!(run.steps.len(), deck.steps.len());
        assert!(run.is_clean(), "{name} reported diagnostics");
    }
}

#[test]
fn field_totals_values() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/field_totals.yaml");
    let deck = udq_deck::load(&path).unwrap();
    let run = udq_deck::run_seeded(&deck, None).unwrap();

    let scalar = |step: usize, name: &str| match &run.snapshot(step).unwrap().values[name] {
        QuantityValue::Scalar(v) => *v,
        QuantityValue::Entities(_) => panic!("{name} is per entity"),
    };

    assert_eq!(scalar(0, "FUOPR"), Some(200.0));
    assert_eq!(scalar(0, "FU_HIGH"), Some(1.0));
    assert_eq!(scalar(1, "FUOPR"), Some(230.0));
    // NEXT only re-evaluates once
    assert_eq!(scalar(2, "FUOPR"), Some(230.0));
    assert_eq!(scalar(2, "FU_STEPS"), Some(3.0));
    assert_eq!(scalar(2, "FU_HIGH"), None);

    match &run.snapshot(0).unwrap().values["WUBHP"] {
        QuantityValue::Entities(values) => {
            assert_eq!(values["OP1"], Some(150.0));
            assert_eq!(values["WI1"], Some(200.0));
        }
        QuantityValue::Scalar(_) => panic!("WUBHP is per well"),
    }
}
