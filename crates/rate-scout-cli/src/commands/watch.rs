use super::BatchArgs;
use crate::{OutputFormat, csv_field};
use anyhow::Result;
use rate_scout_core::{ExchangeCache, LatestExchangeInfo};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Re-scrape every `interval_secs` and print the cached rate after each batch.
///
/// The cache lives for the whole command, so a failed batch keeps showing the
/// last good reading. Ctrl-C stops the loop; a batch in flight is dropped and
/// its pages are cleaned up by the browser session.
pub fn execute(args: &BatchArgs, interval_secs: u64, format: OutputFormat) -> Result<()> {
    tracing::info!(
        "Watching {} page(s) every {}s",
        args.urls.len(),
        interval_secs
    );

    let pipeline = args.pipeline();
    let mut cache = ExchangeCache::new();

    let runtime = super::runtime()?;
    runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut batches = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => break,
            }

            let outcome = tokio::select! {
                outcome = pipeline.run(&args.urls, &mut cache) => outcome,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted during batch");
                    break;
                }
            };
            batches += 1;

            match outcome {
                Ok(report) => {
                    let summary = report.summary();
                    tracing::info!(
                        "Batch {} finished: {}/{} pages succeeded",
                        batches,
                        summary.succeeded,
                        summary.total
                    );
                }
                // Nothing will ever work if the very first launch fails
                Err(e) if batches == 1 => return Err(anyhow::Error::from(e)),
                Err(e) => tracing::warn!("Batch {} failed, keeping cached rate: {}", batches, e),
            }

            output_cache(cache.latest(), format)?;
        }

        tracing::info!("Stopped after {} batch(es)", batches);
        Ok::<(), anyhow::Error>(())
    })
}

fn output_cache(info: &LatestExchangeInfo, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(info)?),
        OutputFormat::Table => output_table(info),
        OutputFormat::Pretty => output_pretty(info),
    }
    Ok(())
}

fn output_pretty(info: &LatestExchangeInfo) {
    use console::style;

    println!("\n{}", style("Latest Exchange Rate").bold().cyan());
    println!("{}", style("====================").cyan());

    let rate = if info.is_populated() {
        style(info.rate.as_str()).green().bold()
    } else {
        style(info.rate.as_str()).yellow()
    };
    println!("  Rate:       {}", rate);
    println!("  Updated:    {}", info.timestamp);
    println!("  Source:     {}", info.source_url);
    if !info.error.is_empty() {
        println!("  {}      {}", style("Note:").yellow(), info.error);
    }
}

fn output_table(info: &LatestExchangeInfo) {
    println!("rate,timestamp,source_url,error");
    println!(
        "{},{},{},{}",
        csv_field(&info.rate),
        csv_field(&info.timestamp),
        csv_field(&info.source_url),
        csv_field(&info.error)
    );
}
