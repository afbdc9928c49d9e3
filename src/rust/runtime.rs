use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::Result as OrtResult;
use std::sync::Once;

static INIT: Once = Once::new();

/// How aggressively ONNX Runtime rewrites the graph before running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Optimization {
    Disable,
    Basic,
    Extended,
    #[default]
    All,
}

impl Optimization {
    fn level(self) -> GraphOptimizationLevel {
        match self {
            Self::Disable => GraphOptimizationLevel::Disable,
            Self::Basic => GraphOptimizationLevel::Level1,
            Self::Extended => GraphOptimizationLevel::Level2,
            Self::All => GraphOptimizationLevel::Level3,
        }
    }
}

/// ONNX Runtime settings used when opening a model artifact.
///
/// A thread count of 0 leaves the choice to ONNX Runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization: Optimization,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        // One row through a tree ensemble gains nothing from a pool
        Self {
            inter_threads: 1,
            intra_threads: 1,
            optimization: Optimization::All,
        }
    }
}

impl RuntimeConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.intra_threads = threads;
        self
    }

    pub fn with_optimization(mut self, optimization: Optimization) -> Self {
        self.optimization = optimization;
        self
    }
}

/// Commits the process-wide ONNX Runtime environment once.
pub fn ensure_initialized() {
    INIT.call_once(|| {
        if let Err(e) = ort::init().with_name("perfrating").commit() {
            log::warn!("ONNX Runtime environment setup failed, falling back to defaults: {}", e);
        }
    });
}

/// Session builder for one model, configured from `config`.
pub fn create_session_builder(config: &RuntimeConfig) -> OrtResult<SessionBuilder> {
    ensure_initialized();
    log::debug!("Creating ONNX session with {:?}", config);

    let mut builder = Session::builder()?.with_optimization_level(config.optimization.level())?;
    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }
    Ok(builder)
}
