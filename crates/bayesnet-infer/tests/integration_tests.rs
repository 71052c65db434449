//! Integration tests for bayesnet-infer

use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use bayesnet_infer::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn alarm() -> NetworkStructure {
    load_network(fixture("alarm_net.xml")).unwrap()
}

/// Burglary / earthquake / alarm network loaded from XMLBIF
#[test]
fn test_load_alarm_network() {
    let network = alarm();
    assert_eq!(network.num_variables(), 5);

    let a = network.id("A").unwrap();
    let b = network.id("B").unwrap();
    let e = network.id("E").unwrap();
    assert_eq!(network.parents(a), &[b, e]);
    assert!(network.precedes(b, a));
    assert!(network.precedes(a, network.id("J").unwrap()));
}

#[test]
fn test_alarm_burglary_posterior() {
    let network = alarm();
    let engine = InferenceEngine::new(&network);

    let enumeration = engine
        .conditional_probability("P(B=T|J=T,M=T)", 1)
        .unwrap();
    assert_eq!(format!("{:.5}", enumeration.probability), "0.28417");
    // 2 values x 4 hidden assignments x 4 multiplications; 2 x 3 + 1 additions
    assert_eq!(enumeration.cost(), OperationCost::new(7, 32));

    for selector in [2, 3] {
        let ve = engine
            .conditional_probability("P(B=T|J=T,M=T)", selector)
            .unwrap();
        assert_abs_diff_eq!(ve.probability, enumeration.probability, epsilon = 1e-9);
        assert_eq!(ve.cost(), OperationCost::new(13, 16));
    }
}

#[test]
fn test_alarm_orderings_differ_in_cost() {
    let network = alarm();
    let engine = InferenceEngine::new(&network);

    let enumeration = engine.conditional_probability("P(J=T|B=T)", 1).unwrap();
    let lexicographic = engine.conditional_probability("P(J=T|B=T)", 2).unwrap();
    let min_weight = engine.conditional_probability("P(J=T|B=T)", 3).unwrap();

    assert_eq!(format!("{:.5}", enumeration.probability), "0.84902");
    assert_abs_diff_eq!(lexicographic.probability, enumeration.probability, epsilon = 1e-9);
    assert_abs_diff_eq!(min_weight.probability, enumeration.probability, epsilon = 1e-9);

    assert_eq!(enumeration.cost(), OperationCost::new(15, 64));
    assert_eq!(lexicographic.cost(), OperationCost::new(29, 32));
    assert_eq!(min_weight.cost(), OperationCost::new(13, 10));
}

#[test]
fn test_alarm_joint_probability() {
    let network = alarm();
    let engine = InferenceEngine::new(&network);

    let result = engine
        .joint_probability("P(B=T,E=F,A=T,J=T,M=F)")
        .unwrap();
    assert_abs_diff_eq!(
        result.probability,
        0.001 * 0.998 * 0.94 * 0.9 * 0.3,
        epsilon = 1e-15
    );
    assert_eq!(format!("{:.5}", result.probability), "0.00025");
    assert_eq!(result.cost(), OperationCost::new(0, 4));
}

#[test]
fn test_joint_query_order_independent() {
    let network = alarm();
    let engine = InferenceEngine::new(&network);

    let a = engine.joint_probability("P(M=F,J=T,A=T,E=F,B=T)").unwrap();
    let b = engine.joint_probability("P(B=T,E=F,A=T,J=T,M=F)").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_joint_marginalizes_to_one() {
    let network = alarm();
    let processor = QueryProcessor::new(&network);
    let all: Vec<VarId> = network.variables().ids().collect();

    let total: f64 = processor
        .indexed_assignments(&all)
        .map(|coords| {
            let assignment: IndexedAssignment = all.iter().copied().zip(coords).collect();
            joint_probability(&network, &assignment).unwrap().0
        })
        .sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
}

#[test]
fn test_posteriors_sum_to_one() {
    let network = alarm();
    let engine = InferenceEngine::new(&network);

    for selector in 1..=3 {
        let t = engine.conditional_probability("P(A=T|J=T,M=F)", selector).unwrap();
        let f = engine.conditional_probability("P(A=F|J=T,M=F)", selector).unwrap();
        assert_abs_diff_eq!(t.probability + f.probability, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_rain_scenario_from_file() {
    let network = load_network(fixture("rain_net.xml")).unwrap();
    let engine = InferenceEngine::new(&network);

    let direct = engine
        .conditional_probability("P(WetGrass=T|Rain=T)", 2)
        .unwrap();
    assert_eq!(format!("{:.5}", direct.probability), "0.90000");
    assert_eq!(direct.cost(), OperationCost::default());

    for selector in 1..=3 {
        let result = engine
            .conditional_probability("P(Rain=T|WetGrass=T)", selector)
            .unwrap();
        assert_eq!(format!("{:.5}", result.probability), "0.69231");
    }
}

#[test]
fn test_cyclic_network_rejected() {
    assert!(matches!(
        load_network(fixture("cyclic_net.xml")),
        Err(BnError::CyclicNetwork { .. })
    ));
}

#[test]
fn test_errors_are_per_query() {
    let network = alarm();
    let engine = InferenceEngine::new(&network);

    for line in [
        "P(B=T|J=T,M=T),7",
        "P(B=maybe|J=T),1",
        "P(Q=T|J=T),2",
        "P(B=T,J=T|M=T),3",
        "B=T",
    ] {
        let err = engine.evaluate_line(line).unwrap_err();
        assert!(err.is_per_query(), "{} gave {}", line, err);
    }
}

#[test]
fn test_strategies_agree_on_alarm() {
    let network = alarm();
    let processor = QueryProcessor::new(&network);
    let query = processor.parse_conditional("P(E=T|J=T,M=T)").unwrap();
    let (expected, _) = enumerate(&network, &query).unwrap();

    for strategy in [
        EliminationStrategy::Lexicographic,
        EliminationStrategy::MinWeight,
        EliminationStrategy::MinDegree,
        EliminationStrategy::MinFill,
    ] {
        let (p, _) = VariableElimination::with_strategy(strategy)
            .probability(&network, &query)
            .unwrap();
        assert_abs_diff_eq!(p, expected, epsilon = 1e-9);
    }
}

/// Evidence with zero prior probability fails the same way for every
/// algorithm, even when the query variable is independent of it
#[test]
fn test_impossible_evidence_is_degenerate() {
    let mut builder = NetworkBuilder::new();
    builder
        .variable("A", ["T", "F"])
        .variable("B", ["T", "F"])
        .variable("C", ["T", "F"])
        .cpt("A", Vec::<String>::new(), vec![1.0, 0.0])
        .cpt("B", ["A"], vec![0.5, 0.5, 0.5, 0.5])
        .cpt("C", Vec::<String>::new(), vec![0.3, 0.7]);
    let network = builder.build().unwrap();
    let engine = InferenceEngine::new(&network);

    for selector in [1, 2, 3] {
        let result = engine.conditional_probability("P(C=T|A=F)", selector);
        assert!(
            matches!(result, Err(BnError::DegenerateFactor)),
            "algorithm {}: {:?}",
            selector,
            result
        );
    }

    // possible evidence still answers
    for selector in [1, 2, 3] {
        let result = engine.conditional_probability("P(C=T|A=T)", selector).unwrap();
        assert_abs_diff_eq!(result.probability, 0.3, epsilon = 1e-12);
    }
}
