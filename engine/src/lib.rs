pub mod cache;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod similarity;
pub mod tokenizer;
pub mod vectorize;

pub use cache::EngineCache;
pub use config::{EngineConfig, IdfMode, Scoring};
pub use corpus::{Corpus, CorpusDigest, Genres, MovieId, MovieRecord, RawMovie};
pub use engine::{Recommendation, SimilarityEngine, DEFAULT_K};
pub use error::{ConfigError, DataLoadError, NotFoundError};
pub use similarity::SimilarityMatrix;
pub use vectorize::{DocumentVector, TermId, VocabularyIndex};
