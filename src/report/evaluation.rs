//! Classifier performance tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{ConfusionSummary, CriteriaAssessment, SuccessCriteria};

fn confusion_table(summary: &ConfusionSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![Cell::new("")];
    header.extend(
        summary
            .labels
            .iter()
            .map(|label| Cell::new(format!("Predicted {}", label)).add_attribute(Attribute::Bold)),
    );
    table.set_header(header);

    for (i, (label, row)) in summary.labels.iter().zip(&summary.matrix).enumerate() {
        let mut cells = vec![Cell::new(format!("Actual {}", label)).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().enumerate().map(|(j, count)| {
            let color = if i == j { Color::Green } else { Color::Red };
            Cell::new(count).fg(color)
        }));
        table.add_row(cells);
    }
    table
}

fn metrics_table(summary: &ConfusionSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Class").add_attribute(Attribute::Bold),
        Cell::new("Precision").add_attribute(Attribute::Bold),
        Cell::new("Recall").add_attribute(Attribute::Bold),
        Cell::new("Support").add_attribute(Attribute::Bold),
    ]);
    for metrics in &summary.report {
        table.add_row(vec![
            Cell::new(&metrics.class),
            Cell::new(format!("{:.2}", metrics.precision)),
            Cell::new(format!("{:.2}", metrics.recall)),
            Cell::new(metrics.support),
        ]);
    }
    table.add_row(vec![
        Cell::new("accuracy").add_attribute(Attribute::Italic),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{:.2}", summary.accuracy)),
    ]);
    table
}

/// Print the confusion matrix and precision/recall of one split
pub fn display_confusion_summary(summary: &ConfusionSummary) {
    println!();
    println!(
        "    {} {}",
        style("🧾").cyan(),
        style(format!("{} SET", summary.split.to_uppercase()))
            .white()
            .bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    for line in confusion_table(summary).to_string().lines() {
        println!("    {}", line);
    }
    println!();
    for line in metrics_table(summary).to_string().lines() {
        println!("    {}", line);
    }
}

pub fn display_assessments(criteria: &SuccessCriteria, assessments: &[CriteriaAssessment]) {
    println!();
    println!(
        "    {} {} {}",
        style("🎯").cyan(),
        style("SUCCESS CRITERIA").white().bold(),
        style(format!(
            "({}: recall >= {:.2}, precision >= {:.2})",
            criteria.class, criteria.min_recall, criteria.min_precision
        ))
        .dim()
    );
    println!("    {}", style("─".repeat(50)).dim());

    for assessment in assessments {
        let status = if assessment.passed() {
            style("MET").green().bold()
        } else {
            style("NOT MET").red().bold()
        };
        println!(
            "      {:<6} {} recall = {:.2}, precision = {:.2}",
            assessment.split, status, assessment.recall, assessment.precision
        );
    }
}
