use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use product_aggregator::{Aggregator, Config, ProductRecord, Source, archiver, logging};

#[derive(Debug, Parser)]
#[command(
    name = "product-aggregator",
    version,
    about = "Search Amazon and eBay and merge the listings"
)]
struct Cli {
    /// Search terms, joined with spaces
    #[arg(required = true)]
    query: Vec<String>,

    /// Write the merged records as JSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Upstream proxy applied to every request
    #[arg(long)]
    proxy: Option<String>,

    /// Directory for raw HTML dumps
    #[arg(long)]
    debug_html: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(secs) = cli.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if cli.proxy.is_some() {
        config.proxy = cli.proxy;
    }
    if cli.debug_html.is_some() {
        config.debug_html_dir = cli.debug_html;
    }

    let query = cli.query.join(" ");
    let aggregator = Aggregator::from_config(&config)?;
    let records = aggregator.aggregate(&query).await;

    if records.is_empty() {
        println!("No data found for '{query}'.");
        return Ok(());
    }

    print_summary(&records);
    print_table(&records);

    if let Some(path) = cli.output {
        archiver::save_to_file(&records, &path)?;
        println!("Saved {} records to {}", records.len(), path.display());
    }
    Ok(())
}

fn print_summary(records: &[ProductRecord]) {
    for source in [Source::Amazon, Source::Ebay] {
        let batch: Vec<&ProductRecord> = records.iter().filter(|r| r.source() == source).collect();
        let priced: Vec<f64> = batch.iter().map(|r| r.price()).filter(|p| *p > 0.0).collect();
        let rated: Vec<f64> = batch.iter().filter_map(|r| r.rating()).collect();
        let name = source.as_str();
        println!(
            "{name:<7} {:>4} products | avg price {:>9} | avg rating {}",
            batch.len(),
            mean(&priced).map_or("-".to_string(), |p| format!("{p:.2}")),
            mean(&rated).map_or("-".to_string(), |r| format!("{r:.2}")),
        );
    }
    println!();
}

fn print_table(records: &[ProductRecord]) {
    println!("{:<7} {:>10} {:>6}  TITLE", "SOURCE", "PRICE", "RATING");
    for record in records {
        let rating = record.rating().map_or("-".to_string(), |r| format!("{r:.1}"));
        let title: String = record.title().chars().take(70).collect();
        println!(
            "{:<7} {:>10.2} {:>6}  {title}",
            record.source().as_str(),
            record.price(),
            rating
        );
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
