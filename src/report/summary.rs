//! Study summary tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{
    ContinuousSummary, DatasetOverview, FeatureCorrelation, HypothesisVerdict, ProportionTable,
    SelectionReport, TestResult,
};

/// Format a p-value, switching to scientific notation for tiny values
pub fn format_p_value(p: f64) -> String {
    if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}

fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_infinite() => "inf".to_string(),
        Some(v) if v.is_nan() => "n/a".to_string(),
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(icon).cyan(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn result_row(result: &TestResult) -> Vec<Cell> {
    let verdict = if result.significant {
        Cell::new("significant")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("not significant").fg(Color::White)
    };
    vec![
        Cell::new(&result.feature),
        Cell::new(result.test.to_string()),
        Cell::new(format!("{:.3}", result.statistic)),
        Cell::new(format_p_value(result.p_value)),
        Cell::new(format_optional(result.odds_ratio)),
        verdict,
    ]
}

pub fn display_overview(overview: &DatasetOverview, no_asthma: usize, asthma: usize) {
    print_section("📋", "DATASET OVERVIEW");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Metric", "Value"]));
    table.add_row(vec![Cell::new("Patients"), Cell::new(overview.rows)]);
    table.add_row(vec![Cell::new("Columns"), Cell::new(overview.columns)]);
    table.add_row(vec![
        Cell::new("Memory"),
        Cell::new(format!("{:.2} MB", overview.memory_mb)),
    ]);
    table.add_row(vec![Cell::new("No asthma"), Cell::new(no_asthma)]);
    table.add_row(vec![
        Cell::new("Asthma"),
        Cell::new(asthma).fg(Color::Yellow),
    ]);
    print_indented(&table);
}

/// Print test results split into continuous and categorical features
pub fn display_selection_report(report: &SelectionReport) {
    let columns = ["Feature", "Test", "Statistic", "p-value", "Odds ratio", "Result"];

    print_section("📊", "CONTINUOUS FEATURES");
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&columns));
    for result in report.continuous() {
        table.add_row(result_row(result));
    }
    print_indented(&table);

    print_section("📊", "CATEGORICAL FEATURES");
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&columns));
    for result in report.categorical() {
        table.add_row(result_row(result));
    }
    print_indented(&table);

    if !report.failures.is_empty() {
        println!();
        println!(
            "      {} {}:",
            style("Not tested").yellow(),
            style(format!("({})", report.failures.len())).dim()
        );
        for failure in &report.failures {
            println!(
                "        {} {} {}",
                style("•").dim(),
                failure.feature,
                style(&failure.reason).dim()
            );
        }
    }
}

/// Print correlations with the diagnosis, strongest first
pub fn display_correlations(ranked: &[FeatureCorrelation]) {
    print_section("🔗", "CORRELATION WITH DIAGNOSIS");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Feature", "Pearson r"]));
    for correlation in ranked {
        let color = match correlation.coefficient {
            Some(r) if r > 0.0 => Color::Green,
            Some(r) if r < 0.0 => Color::Red,
            _ => Color::White,
        };
        table.add_row(vec![
            Cell::new(&correlation.feature),
            Cell::new(format_optional(correlation.coefficient)).fg(color),
        ]);
    }
    print_indented(&table);
}

pub fn display_continuous_summaries(summaries: &[ContinuousSummary]) {
    print_section("📈", "CONTINUOUS FEATURES BY DIAGNOSIS");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&[
        "Feature", "Group", "Count", "Mean", "Std", "Min", "Median", "Max",
    ]));
    for summary in summaries {
        for (group, stats) in [("No asthma", &summary.no_asthma), ("Asthma", &summary.asthma)] {
            let mut row = vec![Cell::new(&summary.feature), Cell::new(group)];
            match stats {
                Some(s) => row.extend([
                    Cell::new(s.count),
                    Cell::new(format!("{:.2}", s.mean)),
                    Cell::new(format!("{:.2}", s.std)),
                    Cell::new(format!("{:.2}", s.min)),
                    Cell::new(format!("{:.2}", s.median)),
                    Cell::new(format!("{:.2}", s.max)),
                ]),
                None => row.extend((0..6).map(|_| Cell::new("-"))),
            }
            table.add_row(row);
        }
    }
    print_indented(&table);
}

pub fn display_proportion_tables(tables: &[ProportionTable]) {
    print_section("🧮", "CATEGORICAL FEATURES BY DIAGNOSIS (%)");

    for proportions in tables {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        let mut columns = vec![Cell::new(&proportions.feature).add_attribute(Attribute::Bold)];
        columns.extend(
            proportions
                .levels
                .iter()
                .map(|level| Cell::new(level).add_attribute(Attribute::Bold)),
        );
        table.set_header(columns);
        for (diagnosis, pct) in &proportions.rows {
            let mut row = vec![Cell::new(format!("Diagnosis {}", diagnosis))];
            row.extend(pct.iter().map(|p| Cell::new(format!("{:.1}", p))));
            table.add_row(row);
        }
        print_indented(&table);
        println!();
    }
}

pub fn display_hypotheses(verdicts: &[HypothesisVerdict]) {
    print_section("🧪", "HYPOTHESES");

    for verdict in verdicts {
        let status = if verdict.supported {
            style("SUPPORTED").green().bold()
        } else {
            style("NOT SUPPORTED").red().bold()
        };
        println!(
            "      {} {} {}",
            style(&verdict.id).cyan().bold(),
            status,
            style(&verdict.statement).dim()
        );
        if !verdict.significant_features.is_empty() {
            println!(
                "        {} significant: {}",
                style("•").dim(),
                verdict.significant_features.join(", ")
            );
        }
        if !verdict.untested_features.is_empty() {
            println!(
                "        {} untested: {}",
                style("•").dim(),
                verdict.untested_features.join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_p_value() {
        assert_eq!(format_p_value(0.04321), "0.0432");
        assert_eq!(format_p_value(0.00001234), "1.23e-5");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(f64::INFINITY)), "inf");
        assert_eq!(format_optional(None), "-");
        assert_eq!(format_optional(Some(375.0)), "375.000");
    }
}
