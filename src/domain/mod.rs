/// Domain layer - extraction pipeline logic
///
/// These modules are pure: no I/O, no engine, no configuration.
pub mod models;
pub mod parsing;
pub mod prompts;
pub mod schema;
pub mod validation;

pub use models::{
    ActionItem, ChatFormat, DecisionList, MeetingAnalysis, SamplingConfig, TaskKind,
};
pub use parsing::ParseFailure;
pub use prompts::{Prompt, PromptTemplates};
pub use schema::{EntityKind, SchemaDescription, SchemaRegistry};
pub use validation::{ValidationRejection, ValidationReport, Validator};
