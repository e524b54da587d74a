/// Services - the extraction pipeline assembled from domain logic and ports
pub mod analyst;
pub mod inference;

pub use analyst::{ActionItemReport, Analyst, AnalystSettings};
pub use inference::{InferenceClient, ModelSettings};
