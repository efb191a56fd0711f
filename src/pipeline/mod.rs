//! Pipeline module - loading, testing and evaluation steps

pub mod consolidate;
pub mod correlation;
pub mod describe;
pub mod error;
pub mod evaluate;
pub mod hypothesis;
pub mod loader;
pub mod model;
pub mod schema;
pub mod selector;
pub mod target;

pub use consolidate::*;
pub use correlation::*;
pub use describe::*;
pub use error::{AnalysisError, AnalysisResult};
pub use evaluate::*;
pub use hypothesis::*;
pub use loader::*;
pub use model::*;
pub use schema::*;
pub use selector::*;
pub use target::*;
