use serde::Serialize;
use triage_core::{SeriesPair, TriageConfig};

#[derive(Serialize)]
struct SeriesReport<'a> {
    seed: u32,
    steps: usize,
    loss: &'a [f64],
    score: &'a [f64],
}

pub fn run(config: &TriageConfig, seed: Option<u32>, steps: Option<usize>, output: Option<&str>) {
    let seed = seed.unwrap_or(config.seed);
    let steps = steps.unwrap_or(config.steps);
    let series = SeriesPair::from_seed(seed, steps);

    println!("Synthetic series  seed={seed}  steps={steps}\n");
    println!("  {:>5} {:>10} {:>10}", "step", "loss", "auc");
    println!("  {}", "-".repeat(27));
    for (i, (l, a)) in series.loss().iter().zip(series.score()).enumerate() {
        if i < 5 || i + 3 >= steps || i % 10 == 0 {
            println!("  {i:>5} {l:>10.6} {a:>10.6}");
        }
    }

    if let Some(path) = output {
        let report = SeriesReport {
            seed,
            steps,
            loss: series.loss(),
            score: series.score(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    eprintln!("Failed to write {path}: {e}");
                    std::process::exit(1);
                }
                println!("\nSeries written to {path}");
            }
            Err(e) => {
                eprintln!("Failed to serialize series: {e}");
                std::process::exit(1);
            }
        }
    }
}
