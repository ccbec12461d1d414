//! Provides an example of how to use the factor engine to answer queries on a Bayesian Network.
//!
//! Run with `RUST_LOG=debug` to see each factor transformation.

use jerome_factor as j;

use tracing_subscriber::EnvFilter;

fn main() -> j::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    /////////////////////////////////////////////////////
    // Step 1: Build Model
    let rain = j::Variable::enumerated("Rain", &["no", "yes"])?;
    let sprinkler = j::Variable::enumerated("Sprinkler", &["off", "on"])?;
    let grass = j::Variable::enumerated("WetGrass", &["dry", "wet"])?;

    let mut builder = j::BayesNetBuilder::new();
    builder.with_variable(rain, &[], j::Initialization::Table(vec![0.8, 0.2]))
           .with_variable(sprinkler.clone(), &["Rain"], j::Initialization::Table(vec![0.6, 0.4, 0.99, 0.01]))
           .with_variable(grass.clone(), &["Sprinkler", "Rain"], j::Initialization::Table(vec![
               1.0, 0.0,
               0.1, 0.9,
               0.2, 0.8,
               0.01, 0.99
           ]));
    let net = builder.build()?;

    /////////////////////////////////////////////////////
    // Step 2: Marginal of the sprinkler
    let mut joint = net.factor("Rain")?;
    joint.multiply(&net.factor("Sprinkler")?)?;
    println!("P(Rain, Sprinkler) = {}", joint.table());

    joint.sum_out_variable("Rain")?;
    for (i, value) in sprinkler.values().enumerate() {
        println!("P(Sprinkler = {}) = {:.4}", value, joint.table()[i]);
    }

    /////////////////////////////////////////////////////
    // Step 3: Condition on rain and query the grass
    let mut factors = net.factors()?;
    for f in factors.iter_mut().filter(|f| f.contains("Rain")) {
        f.reduce_factor("Rain", "yes")?;
    }

    let mut query = j::Factor::unit(&grass);
    for f in &factors {
        query.multiply(f)?;
    }
    query.sum_over_variable("WetGrass")?;

    for assignment in j::all_assignments(&[grass.clone()]) {
        let value = assignment.get("WetGrass").and_then(|i| grass.value_name(i)).unwrap_or("?");
        println!("P(WetGrass = {} | Rain = yes) = {:.4}", value, query.value(&assignment)?);
    }

    /////////////////////////////////////////////////////
    // Step 4: Most probable explanation of the sprinkler
    let mut mpe = net.factor("Rain")?;
    mpe.multiply(&net.factor("Sprinkler")?)?;
    mpe.max_out_variable("Rain")?;
    println!("max-marginal over Sprinkler = {}", mpe.table());

    Ok(())
}
