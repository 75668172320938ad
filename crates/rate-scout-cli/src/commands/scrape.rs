use super::BatchArgs;
use crate::{OutputFormat, csv_field};
use anyhow::{Result, anyhow};
use rate_scout_core::{BatchReport, ExchangeCache, ScrapeResult};

/// Longest post excerpt shown in pretty output
const EXCERPT_CHARS: usize = 200;

pub fn execute(args: &BatchArgs, format: OutputFormat) -> Result<()> {
    tracing::info!("Scraping {} page(s)", args.urls.len());

    let pipeline = args.pipeline();
    let mut cache = ExchangeCache::new();

    let runtime = super::runtime()?;
    let report = runtime.block_on(async {
        tokio::select! {
            report = pipeline.run(&args.urls, &mut cache) => report.map_err(anyhow::Error::from),
            _ = tokio::signal::ctrl_c() => Err(anyhow!("Interrupted")),
        }
    })?;

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn output_pretty(report: &BatchReport) {
    use console::style;

    let summary = report.summary();

    println!("\n{}", style("Scrape Report").bold().cyan());
    println!("{}", style("=============").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Pages:        {}", summary.total);
    println!("  Succeeded:    {}", summary.succeeded);
    println!("  Failed:       {}", summary.failed);
    println!("  With posts:   {}", summary.with_posts);

    println!("\n{}", style("Results:").bold());
    for (i, result) in report.results.iter().enumerate() {
        print_result(i + 1, result);
    }

    println!();
    match &report.selected_rate {
        Some(rate) => println!(
            "{} {}",
            style("Selected rate:").bold(),
            style(rate).green().bold()
        ),
        None => println!(
            "{} {}",
            style("Selected rate:").bold(),
            style("unavailable").yellow()
        ),
    }
    println!();
}

fn print_result(index: usize, result: &ScrapeResult) {
    use console::style;

    println!("  {}. {}", index, style(&result.url).underlined());
    if let Some(title) = &result.title {
        println!("     Title:  {}", title);
    }
    if let Some(timestamp) = &result.timestamp {
        println!("     Posted: {}", timestamp);
    }
    if let Some(text) = result.post_text() {
        println!("     Post:   {}", excerpt(text));
    }
    if let Some(error) = &result.error {
        println!("     {} {}", style("Error:").red(), error);
    }
}

/// First line of the post, cut to a readable length
fn excerpt(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() > EXCERPT_CHARS {
        let cut: String = line.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

fn output_json(report: &BatchReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_table(report: &BatchReport) {
    println!("url,title,timestamp,latest_post_text,error");
    for result in &report.results {
        println!(
            "{},{},{},{},{}",
            csv_field(&result.url),
            csv_field(result.title.as_deref().unwrap_or("")),
            csv_field(result.timestamp.as_deref().unwrap_or("")),
            csv_field(result.latest_post_text.as_deref().unwrap_or("")),
            csv_field(result.error.as_deref().unwrap_or("")),
        );
    }
    println!(
        "selected_rate,{}",
        csv_field(report.selected_rate.as_deref().unwrap_or(""))
    );
}
