// ============================================================================
// lib.rs — Library API (used by the CLI and by tests)
// ============================================================================

pub mod config;
pub mod controller;
pub mod error;
pub mod options;
pub mod placeholder;
pub mod renderer;
pub mod resolver;
pub mod utils;

pub use config::{Color, GeneratorConfig, IconSpec, PlaceholderStyle, SourceMode};
pub use controller::{generate_icon, IconGenerationResult, RunController, RunReport};
pub use error::{IconError, IconResult};
pub use options::{IconOptions, Verbosity};
pub use placeholder::PlaceholderRenderer;
pub use renderer::{write_png, IconOutput, IconRenderer, ResizeRenderer};
pub use resolver::{
    resolve_source, CandidateList, ChainResolver, Discovery, NewestMatching, ResolvedSource, SourceResolver,
};

/// Runs the generator and returns the process exit code:
/// 0 when every icon was written, 1 otherwise.
pub fn run(config: &GeneratorConfig, verbosity: Verbosity) -> i32 {
    match RunController::new(config, verbosity).generate() {
        Ok(report) => report.exit_code(),
        Err(e) => {
            controller::print_fatal(&e);
            1
        }
    }
}
