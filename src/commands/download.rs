//! Download command - fetch daily closes from Yahoo Finance into CSV files

use anyhow::Result;
use grid_signals::data::YahooDataFetcher;
use grid_signals::{Period, Symbol};
use tracing::info;

pub fn run(symbols: String, period: Period, output: String) -> Result<()> {
    info!("Starting data download from Yahoo Finance");

    // Create a tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let symbols: Vec<Symbol> = symbols
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(Symbol::new)
        .collect();

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOADING DAILY CLOSES FROM YAHOO FINANCE");
    println!("{}", "=".repeat(60));
    println!("  Symbols:    {:?}", symbols.iter().map(Symbol::as_str).collect::<Vec<_>>());
    println!("  Period:     {}", period);
    println!("  Output:     {}", output);
    println!("{}\n", "=".repeat(60));

    let fetcher = YahooDataFetcher::new(&output)?;
    let mut total_closes = 0;
    let mut success_count = 0;

    for symbol in &symbols {
        print!("  Downloading {} {}... ", symbol, period);

        match rt.block_on(fetcher.download(symbol, period)) {
            Ok((filepath, closes)) => {
                total_closes += closes;
                success_count += 1;
                println!("✓ {} closes -> {}", closes, filepath.display());
            }
            Err(e) => {
                println!("✗ Error: {:#}", e);
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOAD COMPLETE");
    println!("{}", "=".repeat(60));
    println!("  Successful: {}/{}", success_count, symbols.len());
    println!("  Total closes: {}", total_closes);
    println!("{}", "=".repeat(60));

    info!(
        "Download finished: {}/{} symbols, {} closes",
        success_count,
        symbols.len(),
        total_closes
    );

    Ok(())
}
