use std::sync::Arc;

use indicator_dashboard_lib::access::views::build_indicator_view;
use indicator_dashboard_lib::config::AppConfig;
use indicator_dashboard_lib::fetcher::fred::FredProvider;
use indicator_dashboard_lib::{logging, Catalog, DateWindow, Orchestrator, SubscriptionTier};

/// Usage: preview [TIER] [INDICATOR_ID...]
///
/// Prints the payload summary each indicator would get for the given tier.
/// Without a FRED_API_KEY every indicator falls back to mock data.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_level, config.log_format);

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin(),
    };
    for issue in catalog.validate() {
        tracing::warn!(%issue, "catalog issue");
    }

    let mut args = std::env::args().skip(1);
    let tier = SubscriptionTier::parse(args.next().as_deref());
    let ids: Vec<String> = args.collect();
    let ids: Vec<&str> = if ids.is_empty() {
        vec!["UNRATE", "CPIAUCSL", "GDP", "SP500"]
    } else {
        ids.iter().map(String::as_str).collect()
    };

    let provider = FredProvider::new(
        config.fred_api_key.clone().unwrap_or_default(),
        config.fred_base_url.clone(),
        config.fetch_timeout,
    );
    let orchestrator = Orchestrator::new(Arc::new(provider));

    let payloads = orchestrator.fetch_many(&catalog, &ids, &DateWindow::default()).await;

    println!("\nTier: {}", tier);
    println!(
        "{:<12} | {:<16} | {:>5} | {:<10} | {:>10} | {:>10} | {:>8}",
        "Indicator", "Origin", "Count", "Latest", "Value", "Mean", "MA"
    );
    println!("{}", "-".repeat(90));

    for payload in payloads {
        let view = build_indicator_view(Some(&tier), payload, config.ma_window);
        let p = &view.payload;
        let latest = p.latest();
        let ma = view
            .moving_average
            .as_ref()
            .and_then(|ma| ma.last())
            .map(|pt| format!("{:.2}", pt.value))
            .unwrap_or_else(|| "locked".to_string());

        println!(
            "{:<12} | {:<16} | {:>5} | {:<10} | {:>10} | {:>10} | {:>8}",
            p.indicator_id,
            format!("{:?}", p.origin),
            p.statistics.count,
            latest.map(|pt| pt.date.to_string()).unwrap_or_else(|| "-".to_string()),
            latest.map(|pt| format!("{:.2}", pt.value)).unwrap_or_else(|| "-".to_string()),
            p.statistics.mean.map(|m| format!("{:.2}", m)).unwrap_or_else(|| "-".to_string()),
            ma,
        );
    }
    println!("\nDone.");

    Ok(())
}
