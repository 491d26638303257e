use anyhow::Result;

use subtrack_core::motion::SegmentPlan;
use subtrack_core::stats::{weighted_items, CategoryFilter, ChartItem};
use subtrack_core::{AppConfig, Period, StatsClient};

/// Width of the longest textual bar
const BAR_WIDTH: usize = 30;

pub async fn run(
    config: &AppConfig,
    period: Period,
    category: CategoryFilter,
    by_category: bool,
) -> Result<()> {
    let client = StatsClient::new(&config.api)?;

    let (symbol, items) = if by_category {
        let stats = client.by_category(period).await?;
        (stats.currency_symbol.clone(), stats.chart_items())
    } else {
        let summary = client.summary(period, category).await?;
        (summary.currency_symbol.clone(), summary.chart_items())
    };

    let total: f64 = items.iter().map(|item| item.value.max(0.0)).sum();
    println!("Expenses {}: {}{:.2}", period.label(), symbol, total);

    if items.is_empty() {
        println!("No spend in this period.");
        return Ok(());
    }

    let name_width = items.iter().map(|item| item.label.chars().count()).max().unwrap_or(0);
    for line in breakdown_lines(&items, &symbol, name_width) {
        println!("{}", line);
    }

    Ok(())
}

/// One line per item with a bar scaled to its share of the total
fn breakdown_lines(items: &[ChartItem], symbol: &str, name_width: usize) -> Vec<String> {
    let plan = SegmentPlan::new(&weighted_items(items));
    plan.segments()
        .iter()
        .filter_map(|segment| {
            let item = items.iter().find(|item| item.key == segment.key)?;
            let bar_len = (segment.span() / 100.0 * BAR_WIDTH as f64).round() as usize;
            Some(format!(
                "  {:<name_width$}  {:<bar_width$}  {:>5.1}%  {}{:.2}",
                item.label,
                "█".repeat(bar_len.max(1)),
                segment.span(),
                symbol,
                item.value,
                name_width = name_width,
                bar_width = BAR_WIDTH,
            ))
        })
        .collect()
}
