/// Adapters - concrete inference engines
///
/// These modules implement the port traits for specific runtimes.
pub mod llama;

pub use llama::{LlamaServerEngine, SpawnOptions};
