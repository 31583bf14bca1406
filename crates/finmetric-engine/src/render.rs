//! Rendering comparison results and stock reports for display

use crate::error::AggregateFetchError;
use crate::format::{Category, PLACEHOLDER, UnitFormatter, statement_title};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use finmetric_core::{ComparisonResult, Metric, StockMetricSet, StockReport};
use serde::{Deserialize, Serialize};

/// Display unit of a canonical comparison metric
///
/// Chosen per metric rather than by label: "P/E Ratio" is a multiple even
/// though its label contains "Ratio".
pub fn metric_category(metric: Metric) -> Category {
    match metric {
        Metric::CurrentPrice | Metric::MarketCap => Category::CurrencyScaled,
        Metric::PeRatio => Category::Multiple,
    }
}

/// Output format selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub trait Renderer: Send + Sync {
    fn format(&self) -> OutputFormat;
    fn render_comparison(&self, result: &ComparisonResult) -> String;
    fn render_report(&self, report: &StockReport) -> String;
    fn render_fetch_errors(&self, error: &AggregateFetchError) -> String;
}

/// Terminal tables
pub struct TableRenderer;

impl TableRenderer {
    fn table() -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    fn metrics_table(sets: &[&StockMetricSet]) -> Table {
        let mut table = Self::table();
        let mut header = vec!["Metric".to_string()];
        header.extend(sets.iter().map(|s| s.company_name.clone()));
        table.set_header(header);

        for metric in Metric::ALL {
            let mut row = vec![metric.label().to_string()];
            row.extend(
                sets.iter()
                    .map(|s| UnitFormatter::format_metric(s.metric(metric), metric_category(metric))),
            );
            table.add_row(row);
        }
        table
    }
}

impl Renderer for TableRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Table
    }

    fn render_comparison(&self, result: &ComparisonResult) -> String {
        let mut table = Self::table();
        let mut header = vec!["Metric".to_string()];
        header.extend(result.series.iter().map(|s| s.name.clone()));
        table.set_header(header);

        for metric in Metric::ALL {
            let mut row = vec![metric.label().to_string()];
            row.extend(result.series.iter().map(|s| {
                UnitFormatter::format_metric(s.value(metric).into(), metric_category(metric))
            }));
            table.add_row(row);
        }

        let mut output = table.to_string();
        let missing = result.missing_count();
        if missing > 0 {
            output.push_str(&format!(
                "\n{missing} value(s) unavailable from the provider are shown as {PLACEHOLDER}"
            ));
        }
        output
    }

    fn render_report(&self, report: &StockReport) -> String {
        let metrics = &report.metrics;
        let profile = &report.profile;
        let mut output = format!("{} ({})\n", metrics.company_name, report.symbol);
        if let Some(industry) = &profile.industry {
            output.push_str(&format!("Industry: {industry}\n"));
        }

        if let Some(description) = &profile.description {
            output.push('\n');
            output.push_str(description);
            output.push('\n');
        }

        output.push_str("\nStock Performance\n");
        output.push_str(&Self::metrics_table(&[metrics]).to_string());
        output.push('\n');

        if !metrics.technical_averages.is_empty() {
            let mut table = Self::table();
            table.set_header(vec!["Window", "Average Price"]);
            for avg in &metrics.technical_averages {
                table.add_row(vec![
                    format!("{} Day Average", avg.window_days),
                    UnitFormatter::format_metric(avg.price, Category::CurrencyScaled),
                ]);
            }
            output.push_str("\nTechnical Averages\n");
            output.push_str(&table.to_string());
            output.push('\n');
        }

        if !profile.officers.is_empty() {
            let mut table = Self::table();
            table.set_header(vec!["Name", "Position", "Since"]);
            for officer in &profile.officers {
                table.add_row(vec![
                    officer.name.clone(),
                    officer.title.clone().unwrap_or_default(),
                    officer.since.clone().unwrap_or_default(),
                ]);
            }
            output.push_str("\nLeadership Team\n");
            output.push_str(&table.to_string());
            output.push('\n');
        }

        for (category, items) in &metrics.financial_line_items {
            if items.is_empty() {
                continue;
            }
            let mut table = Self::table();
            table.set_header(vec!["Item", "Value"]);
            for item in items {
                table.add_row(vec![
                    item.display_name.clone(),
                    UnitFormatter::format_metric(
                        item.value,
                        Category::classify(&item.display_name),
                    ),
                ]);
            }
            output.push('\n');
            output.push_str(statement_title(category));
            output.push('\n');
            output.push_str(&table.to_string());
            output.push('\n');
        }

        if !metrics.peers.is_empty() {
            let mut table = Self::table();
            table.set_header(vec!["Company", "Current Price", "Market Cap", "P/E Ratio", "Rating"]);
            for (i, peer) in metrics.peers.iter().enumerate() {
                let rating = profile
                    .peer_ratings
                    .get(i)
                    .and_then(|r| r.overall_rating.clone())
                    .unwrap_or_else(|| PLACEHOLDER.to_string());
                let mut row = vec![peer.company_name.clone()];
                row.extend(Metric::ALL.iter().map(|m| {
                    UnitFormatter::format_metric(peer.metric(*m), metric_category(*m))
                }));
                row.push(rating);
                table.add_row(row);
            }
            output.push_str("\nPeer Companies\n");
            output.push_str(&table.to_string());
            output.push('\n');
        }

        output
    }

    fn render_fetch_errors(&self, error: &AggregateFetchError) -> String {
        let mut table = Self::table();
        table.set_header(vec!["Symbol", "Error"]);
        for failure in &error.failures {
            table.add_row(vec![failure.symbol.clone(), failure.cause.to_string()]);
        }
        format!("Comparison failed; retry the symbols below.\n{table}")
    }
}

/// Pretty-printed JSON with the model's camelCase keys
pub struct JsonRenderer;

impl JsonRenderer {
    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

impl Renderer for JsonRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render_comparison(&self, result: &ComparisonResult) -> String {
        Self::to_json(result)
    }

    fn render_report(&self, report: &StockReport) -> String {
        Self::to_json(report)
    }

    fn render_fetch_errors(&self, error: &AggregateFetchError) -> String {
        let failures: Vec<_> = error
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "symbol": f.symbol,
                    "kind": f.kind(),
                    "message": f.cause.to_string(),
                })
            })
            .collect();
        Self::to_json(&serde_json::json!({ "failures": failures }))
    }
}

pub struct RendererFactory;

impl RendererFactory {
    pub fn create(format: OutputFormat) -> Box<dyn Renderer> {
        match format {
            OutputFormat::Table => Box::new(TableRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}
