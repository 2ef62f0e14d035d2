//! Print the cache geometry the scheduler sees and the row blocks it would use

use clap::Parser;
use wildfire_ca_core::platform;
use wildfire_ca_core::{BlockPlan, GridDims};

#[derive(Parser, Debug)]
#[command(name = "cache-probe", about = "Show cache levels and the resulting row-block size")]
struct Args {
    /// Grid rows to plan for
    #[arg(long, default_value_t = 1024)]
    rows: usize,

    /// Grid columns to plan for
    #[arg(long, default_value_t = 1024)]
    cols: usize,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let geometry = platform::detect();
    let levels = geometry.cache_levels();
    let dims = GridDims::new(args.rows, args.cols);
    let rows_per_block = BlockPlan::from_levels(&levels, dims).rows_per_block(dims);

    if args.json {
        let report = serde_json::json!({
            "vendor": geometry.vendor(),
            "levels": levels,
            "rows_per_block": rows_per_block,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Vendor: {}", geometry.vendor().as_deref().unwrap_or("unknown"));
    if levels.is_empty() {
        println!("No cache information available");
    }
    for level in &levels {
        println!(
            "L{} {:<11} {:>8} KiB  line {:>3} B  {:>2}-way  {:>5} sets  {} partition(s)",
            level.level,
            level.kind,
            level.size() / 1024,
            level.line_size,
            level.ways,
            level.sets,
            level.partitions
        );
    }
    println!(
        "Row block for a {}x{} grid: {} rows",
        dims.rows, dims.cols, rows_per_block
    );
    Ok(())
}
