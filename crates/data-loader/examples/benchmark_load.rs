use data_loader::{Dataset, LoadOptions};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let data_dir = Path::new("data/ml-latest-small");

    println!("Loading MovieLens latest-small dataset (all rows)...\n");

    let start = Instant::now();
    let options = LoadOptions::default().with_max_rows(None);
    let dataset = Dataset::load_from_dir(data_dir, &options)?;
    let elapsed = start.elapsed();

    let (movies, ratings, tags) = dataset.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", movies);
    println!("Ratings: {}", ratings);
    println!("Tags: {}", tags);
    println!(
        "\nPerformance: {:.0} ratings/second",
        ratings as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
