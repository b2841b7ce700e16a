//! # Students
//!
//! Runs the same roster through a sequential and a parallel pipeline.
//!
//! ```text
//! [roster] → filter → map → sorted → collect
//! [roster] → flat_map(scores) → filter → sorted → limit → collect
//! [roster] ⇉ map(age) ⇉ reduce          (one worker per student)
//! ```
//!
//! Run: `RUST_LOG=chainflow=debug cargo run --example students`

use chainflow::observability::{TracingConfig, init_metrics};
use chainflow::prelude::*;

#[derive(Debug, Clone)]
struct Student {
    name: &'static str,
    age: u32,
    scores: Vec<u32>,
}

fn student(name: &'static str, age: u32, scores: [u32; 3]) -> Student {
    Student {
        name,
        age,
        scores: scores.to_vec(),
    }
}

fn roster() -> Vec<Student> {
    vec![
        student("Tom", 21, [88, 92, 75]),
        student("Kate", 17, [95, 67, 81]),
        student("Lucy", 24, [72, 99, 90]),
        student("Jim", 19, [61, 84, 93]),
        student("Jack", 23, [79, 70, 88]),
        student("King", 15, [91, 94, 62]),
    ]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    init_metrics();

    let config = StreamConfig::sequential()
        .with_name("roster")
        .with_tracing(TracingConfig::all());

    let adults = Stream::with_config(roster(), config.clone())
        .filter(|s| s.age >= 18)
        .map(|s| s.name)
        .sorted(|a, b| a < b)?
        .to_vec()?;
    println!("adults: {adults:?}");

    let top = Stream::with_config(roster(), config.clone())
        .flat_map(|s| s.scores)?
        .filter(|score| *score >= 90)
        .sorted(|a, b| a > b)?
        .limit(3)?
        .to_vec()?;
    println!("top scores: {top:?}");

    let youngest = Stream::with_config(roster(), config)
        .max_min(|a, b| a.age < b.age)?
        .map(|s| s.name);
    println!("youngest: {youngest:?}");

    let total_age = Stream::parallel(roster())
        .map(|s| s.age)
        .reduce(|a, b| a + b)?;
    println!("total age (parallel): {total_age:?}");

    Ok(())
}
