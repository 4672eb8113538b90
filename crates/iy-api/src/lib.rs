use std::collections::BTreeMap;

use iy_compiler::compile_bundle_from_source_map;
pub use iy_compiler::{CompileBundleResult, RejectedSource};
use iy_core::{GameSnapshot, IdleError};
use iy_runtime::{GameConfig, IdleEngine, IdleEngineOptions};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CreateEngineOptions {
    pub sources: BTreeMap<String, String>,
    pub config: GameConfig,
}

#[derive(Debug, Clone)]
pub struct ResumeEngineOptions {
    pub sources: BTreeMap<String, String>,
    pub config: GameConfig,
    pub snapshot: GameSnapshot,
}

/// An engine plus the sources that were skipped while loading it.
pub struct LoadedEngine {
    pub engine: IdleEngine,
    pub rejected: Vec<RejectedSource>,
}

pub fn compile_sources(sources: &BTreeMap<String, String>) -> Result<CompileBundleResult, IdleError> {
    let compiled = compile_bundle_from_source_map(sources);
    if !sources.is_empty() && compiled.rejected.len() == sources.len() {
        let first = &compiled.rejected[0];
        return Err(IdleError {
            code: "API_NO_SOURCE_LOADED".to_string(),
            message: format!(
                "Every script source was rejected; first: {}: {}",
                first.path, first.error
            ),
            span: first.error.span.clone(),
        });
    }
    Ok(compiled)
}

pub fn create_engine_from_sources(options: CreateEngineOptions) -> Result<LoadedEngine, IdleError> {
    let compiled = compile_sources(&options.sources)?;
    info!(
        events = compiled.events.len(),
        rejected = compiled.rejected.len(),
        "sources loaded"
    );
    let engine = IdleEngine::new(IdleEngineOptions {
        events: compiled.events,
        config: options.config,
    })?;
    Ok(LoadedEngine {
        engine,
        rejected: compiled.rejected,
    })
}

pub fn resume_engine_from_sources(options: ResumeEngineOptions) -> Result<LoadedEngine, IdleError> {
    let LoadedEngine {
        mut engine,
        rejected,
    } = create_engine_from_sources(CreateEngineOptions {
        sources: options.sources,
        config: options.config,
    })?;
    engine.from_snapshot(options.snapshot)?;
    Ok(LoadedEngine { engine, rejected })
}
