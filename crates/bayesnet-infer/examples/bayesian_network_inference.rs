//! Bayesian Network Example: Student Performance Model
//!
//! This example builds a small Bayesian Network in code and compares the
//! exact inference algorithms on the same queries.

use bayesnet_infer::{EliminationStrategy, InferenceEngine, NetworkBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Bayesian Network: Student Performance Model ===\n");

    // Structure: Difficulty → Grade ← Intelligence
    //                          ↓
    //                        SAT ← Intelligence
    let mut builder = NetworkBuilder::new();
    builder
        .variable("Difficulty", ["easy", "hard"])
        .variable("Intelligence", ["low", "high"])
        .variable("Grade", ["A", "B", "C"])
        .variable("SAT", ["low", "high"])
        .cpt("Difficulty", Vec::<String>::new(), vec![0.6, 0.4])
        .cpt("Intelligence", Vec::<String>::new(), vec![0.7, 0.3])
        // Order: [Difficulty, Intelligence, Grade]
        .cpt(
            "Grade",
            ["Difficulty", "Intelligence"],
            vec![
                0.3, 0.4, 0.3, // easy, low
                0.9, 0.08, 0.02, // easy, high
                0.05, 0.25, 0.7, // hard, low
                0.5, 0.3, 0.2, // hard, high
            ],
        )
        .cpt("SAT", ["Intelligence"], vec![0.95, 0.05, 0.2, 0.8]);

    let network = builder.build()?;
    let engine = InferenceEngine::new(&network);

    let order: Vec<&str> = network
        .topological_order()
        .iter()
        .map(|&v| network.variables().name(v))
        .collect();
    println!("Topological order: {}\n", order.join(" → "));

    // Joint query
    let joint = engine.joint_probability("P(Difficulty=easy,Intelligence=high,Grade=A,SAT=high)")?;
    println!(
        "P(easy, high, A, high) = {:.5}  ({} additions, {} multiplications)\n",
        joint.probability, joint.additions, joint.multiplications
    );

    // Same conditional query with every algorithm
    let query = "P(Intelligence=high|Grade=A,SAT=high)";
    println!("{}", query);
    for (label, selector) in [("enumeration", 1), ("VE lexicographic", 2), ("VE min-weight", 3)] {
        let result = engine.conditional_probability(query, selector)?;
        println!(
            "  {:<18} {:.5}  ({} additions, {} multiplications)",
            label, result.probability, result.additions, result.multiplications
        );
    }

    // Full posterior
    println!("\nP(Grade | SAT=high):");
    for (label, p) in engine.distribution("Grade", "SAT=high", EliminationStrategy::MinFill)? {
        println!("  Grade={}: {:.4}", label, p);
    }

    Ok(())
}
