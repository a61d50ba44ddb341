use crate::config::EngineConfig;
use crate::corpus::{Corpus, CorpusDigest};
use crate::engine::SimilarityEngine;
use crate::error::ConfigError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    digest: CorpusDigest,
    config: String,
}

/// Memoized engine builds, keyed by corpus content and engine config.
///
/// Owned by the hosting application. Building the same corpus twice returns the
/// engine from the first build.
#[derive(Debug, Default)]
pub struct EngineCache {
    engines: Mutex<HashMap<CacheKey, Arc<SimilarityEngine>>>,
}

impl EngineCache {
    pub fn new() -> Self { Self::default() }

    pub fn get_or_build(&self, corpus: Arc<Corpus>, config: EngineConfig) -> Result<Arc<SimilarityEngine>, ConfigError> {
        let key = CacheKey { digest: corpus.digest().clone(), config: config.fingerprint() };
        // held across the build so concurrent callers never compute the same key twice
        let mut engines = self.engines.lock();
        if let Some(engine) = engines.get(&key) {
            tracing::debug!(digest = %key.digest, "engine cache hit");
            return Ok(engine.clone());
        }
        let engine = Arc::new(SimilarityEngine::build(corpus, config)?);
        engines.insert(key, engine.clone());
        Ok(engine)
    }

    pub fn len(&self) -> usize { self.engines.lock().len() }
    pub fn is_empty(&self) -> bool { self.engines.lock().is_empty() }
    pub fn clear(&self) { self.engines.lock().clear() }
}
