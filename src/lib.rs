//! asthmastat: statistical analysis of asthma patient data
//!
//! Loads a patient dataset, tests every feature for association with the
//! asthma diagnosis (choosing the test from the data), correlates features
//! with the diagnosis and evaluates pre-trained classifiers.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod utils;
