//! Study hypotheses and their validation against test results

use serde::Serialize;

use super::selector::SelectionReport;

/// A study hypothesis tied to the features that test it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hypothesis {
    pub id: &'static str,
    pub statement: &'static str,
    pub features: &'static [&'static str],
}

/// The four hypotheses of the asthma status study.
pub const STUDY_HYPOTHESES: [Hypothesis; 4] = [
    Hypothesis {
        id: "H1",
        statement: "Poorer lung function (lower FEV1 or FVC) is associated with asthma",
        features: &["LungFunctionFEV1", "LungFunctionFVC"],
    },
    Hypothesis {
        id: "H2",
        statement: "Presence of respiratory symptoms is associated with asthma",
        features: &[
            "Wheezing",
            "ShortnessOfBreath",
            "ChestTightness",
            "Coughing",
            "NighttimeSymptoms",
        ],
    },
    Hypothesis {
        id: "H3",
        statement: "Smoking exposure is associated with asthma",
        features: &["Smoking"],
    },
    Hypothesis {
        id: "H4",
        statement: "Higher exposure to dust or pollutants is associated with asthma",
        features: &["PollutionExposure", "PollenExposure", "DustExposure"],
    },
];

/// Outcome of checking one hypothesis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisVerdict {
    pub id: String,
    pub statement: String,
    /// Features with a significant test result
    pub significant_features: Vec<String>,
    /// Features without any test result (missing or failed)
    pub untested_features: Vec<String>,
    /// At least one feature was significant
    pub supported: bool,
}

/// Check each hypothesis against the selection report.
pub fn validate_hypotheses(
    hypotheses: &[Hypothesis],
    report: &SelectionReport,
) -> Vec<HypothesisVerdict> {
    hypotheses
        .iter()
        .map(|h| {
            let mut significant_features = Vec::new();
            let mut untested_features = Vec::new();
            for feature in h.features {
                match report.get(feature) {
                    Some(result) if result.significant => {
                        significant_features.push(feature.to_string())
                    }
                    Some(_) => {}
                    None => untested_features.push(feature.to_string()),
                }
            }
            HypothesisVerdict {
                id: h.id.to_string(),
                statement: h.statement.to_string(),
                supported: !significant_features.is_empty(),
                significant_features,
                untested_features,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::selector::{TestDetails, TestKind, TestResult};

    fn result(feature: &str, significant: bool) -> TestResult {
        TestResult {
            feature: feature.to_string(),
            test: TestKind::MannWhitneyU,
            statistic: 0.0,
            p_value: if significant { 0.01 } else { 0.5 },
            significant,
            odds_ratio: None,
            details: TestDetails::Continuous {
                n_no_asthma: 10,
                n_asthma: 10,
                normality_p_no_asthma: 0.0,
                normality_p_asthma: 0.0,
            },
        }
    }

    #[test]
    fn test_supported_when_any_feature_significant() {
        let report = SelectionReport {
            results: vec![
                result("LungFunctionFEV1", false),
                result("LungFunctionFVC", true),
                result("Smoking", false),
            ],
            failures: vec![],
        };
        let verdicts = validate_hypotheses(&STUDY_HYPOTHESES, &report);

        assert_eq!(verdicts.len(), 4);
        assert!(verdicts[0].supported);
        assert_eq!(verdicts[0].significant_features, vec!["LungFunctionFVC"]);
        assert!(!verdicts[2].supported);
        assert!(verdicts[2].untested_features.is_empty());
        assert_eq!(verdicts[3].untested_features.len(), 3);
    }
}
