//! asthmastat: asthma study CLI
//!
//! `study` tests every patient feature for association with the asthma
//! diagnosis; `evaluate` scores a trained classifier on its splits.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use asthmastat::cli::{AnalysisConfig, Cli, Commands, EvaluationConfig};
use asthmastat::pipeline::{
    consolidate, count_diagnoses, dataset_overview, default_rules, describe_continuous,
    evaluate_classifier, load_artifacts, proportion_tables, rank_by_strength,
    run_statistical_tests, target_correlations, validate_hypotheses, DatasetSchema,
    FilePatientSource, LabelMap, PatientRepository, SelectorConfig, STUDY_HYPOTHESES,
};
use asthmastat::report::{
    build_evaluation_export, build_study_export, display_assessments,
    display_confusion_summary, display_continuous_summaries, display_correlations,
    display_hypotheses, display_overview, display_proportion_tables, display_selection_report,
    export_json, to_json, StudyParts,
};
use asthmastat::utils::progress::{create_spinner, finish_with_success, finish_with_warning};
use asthmastat::utils::styling::{
    print_banner, print_completion, print_config, print_count, print_info, print_saved,
    print_step_header, print_step_time,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Study {
            input,
            schema,
            alpha,
            no_consolidate,
            infer_schema_length,
            json,
            export,
        } => {
            let mut config = AnalysisConfig::new(input);
            if let Some(path) = schema {
                config.schema = DatasetSchema::from_json_file(&path)
                    .with_context(|| format!("Failed to load schema from {}", path.display()))?;
            }
            config.selector = SelectorConfig::with_alpha(alpha);
            config.consolidate = !no_consolidate;
            config.infer_schema_length = infer_schema_length;
            run_study(&config, json, export.as_deref())
        }
        Commands::Evaluate {
            artifacts,
            version,
            min_recall,
            min_precision,
            json,
            export,
        } => {
            let mut config = EvaluationConfig::new(artifacts, version);
            config.criteria.min_recall = min_recall;
            config.criteria.min_precision = min_precision;
            run_evaluate(&config, json, export.as_deref())
        }
    }
}

fn run_study(config: &AnalysisConfig, json: bool, export: Option<&Path>) -> Result<()> {
    let quiet = json;
    let schema = &config.schema;

    if !quiet {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            &config.input,
            &schema.target,
            &[
                ("Significance level", format!("{:.3}", config.selector.alpha)),
                (
                    "Min expected count",
                    format!("{:.1}", config.selector.min_expected_count),
                ),
                ("Consolidate levels", config.consolidate.to_string()),
            ],
        );
    }

    // Step 1: Load dataset
    let step_start = Instant::now();
    if !quiet {
        print_step_header(1, "Load patient data");
    }
    let spinner = create_spinner("Loading dataset...", quiet);
    let repository = PatientRepository::new(
        FilePatientSource {
            path: config.input.clone(),
            infer_schema_length: config.infer_schema_length,
        },
        schema.clone(),
    );
    let mut df = repository
        .patients()
        .with_context(|| format!("Failed to load {}", config.input.display()))?;
    if config.consolidate {
        df = consolidate(&df, &default_rules())?;
    }
    finish_with_success(&spinner, "Dataset loaded");

    let overview = dataset_overview(&df);
    let (no_asthma, asthma) = count_diagnoses(&df, &schema.target)?;
    if !quiet {
        display_overview(&overview, no_asthma, asthma);
        print_step_time(step_start.elapsed());
    }

    // Step 2: Descriptive summaries
    let step_start = Instant::now();
    if !quiet {
        print_step_header(2, "Describe features by diagnosis");
    }
    let continuous_summaries = describe_continuous(&df, schema)?;
    let proportions = proportion_tables(&df, schema)?;
    if !quiet {
        display_continuous_summaries(&continuous_summaries);
        display_proportion_tables(&proportions);
        print_step_time(step_start.elapsed());
    }

    // Step 3: Hypothesis tests
    let step_start = Instant::now();
    if !quiet {
        print_step_header(3, "Test features against diagnosis");
    }
    let spinner = create_spinner("Running statistical tests...", quiet);
    let report = run_statistical_tests(&df, schema, &config.selector);
    if report.failures.is_empty() {
        finish_with_success(&spinner, "All features tested");
    } else {
        finish_with_warning(
            &spinner,
            &format!("{} features could not be tested", report.failures.len()),
        );
    }
    if !quiet {
        print_count(
            "significant features",
            report.significant().count(),
            Some(format!("(alpha = {})", config.selector.alpha).as_str()),
        );
        display_selection_report(&report);
        print_step_time(step_start.elapsed());
    }

    // Step 4: Correlation
    let step_start = Instant::now();
    if !quiet {
        print_step_header(4, "Correlate features with diagnosis");
    }
    let correlations = target_correlations(&df, schema)?;
    let ranked = rank_by_strength(&correlations);
    if !quiet {
        display_correlations(&ranked);
        print_step_time(step_start.elapsed());
    }

    // Step 5: Hypotheses
    if !quiet {
        print_step_header(5, "Validate study hypotheses");
    }
    let verdicts = validate_hypotheses(&STUDY_HYPOTHESES, &report);
    if !quiet {
        display_hypotheses(&verdicts);
    }

    let export_report = build_study_export(StudyParts {
        source: &config.input,
        config: &config.selector,
        overview,
        report: &report,
        correlations: &ranked,
        continuous_summaries: &continuous_summaries,
        proportions: &proportions,
        hypotheses: &verdicts,
    });

    if json {
        println!("{}", to_json(&export_report)?);
    }
    if let Some(path) = export {
        export_json(&export_report, path)?;
        if !quiet {
            print_saved(path);
        }
    }
    if !quiet {
        print_completion("Study complete!");
    }
    Ok(())
}

fn run_evaluate(config: &EvaluationConfig, json: bool, export: Option<&Path>) -> Result<()> {
    let quiet = json;
    let layout = &config.layout;

    if !quiet {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            &layout.dir(),
            &config.criteria.class,
            &[
                ("Version", layout.version.clone()),
                ("Min recall", format!("{:.2}", config.criteria.min_recall)),
                ("Min precision", format!("{:.2}", config.criteria.min_precision)),
            ],
        );
        print_step_header(1, "Load model artifacts");
    }

    let step_start = Instant::now();
    let spinner = create_spinner("Loading artifacts...", quiet);
    let artifacts = load_artifacts(layout, config.infer_schema_length)
        .with_context(|| format!("Failed to load artifacts from {}", layout.dir().display()))?;
    finish_with_success(&spinner, "Artifacts loaded");
    if !quiet {
        print_info(&format!(
            "Model uses {} features, {} cleaning steps",
            artifacts.train.features.width(),
            artifacts.cleaning.steps.len()
        ));
        print_step_time(step_start.elapsed());
        print_step_header(2, "Evaluate classifier");
    }

    let performance = evaluate_classifier(
        &artifacts.train,
        &artifacts.test,
        &artifacts.model,
        &LabelMap::default(),
    )?;
    let assessments: Vec<_> = [&performance.train, &performance.test]
        .into_iter()
        .filter_map(|summary| config.criteria.assess(summary))
        .collect();

    if !quiet {
        display_confusion_summary(&performance.train);
        display_confusion_summary(&performance.test);
        display_assessments(&config.criteria, &assessments);
    }

    let export_report = build_evaluation_export(
        &layout.root,
        &layout.version,
        &performance,
        &assessments,
    );
    if json {
        println!("{}", to_json(&export_report)?);
    }
    if let Some(path) = export {
        export_json(&export_report, path)?;
        if !quiet {
            print_saved(path);
        }
    }
    if !quiet {
        print_completion("Evaluation complete!");
    }
    Ok(())
}
