use crate::config::{EngineConfig, Scoring};
use crate::corpus::{Corpus, MovieId, MovieRecord};
use crate::error::{ConfigError, NotFoundError};
use crate::similarity::{jaccard, SimilarityMatrix};
use crate::tokenizer::Tokenizer;
use crate::vectorize::{DocumentVector, TfIdfVectorizer, VocabularyIndex};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: MovieId,
    pub title: String,
    pub score: f32,
    pub genres: Vec<String>,
    pub poster: Option<String>,
}

/// Built vector space and similarity matrix for one corpus.
#[derive(Debug)]
pub struct SimilarityEngine {
    corpus: Arc<Corpus>,
    config: EngineConfig,
    vocabulary: VocabularyIndex,
    vectors: Vec<DocumentVector>,
    matrix: SimilarityMatrix,
}

impl SimilarityEngine {
    /// Vectorize the corpus and compute all pairwise scores.
    pub fn build(corpus: Arc<Corpus>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let start = Instant::now();
        let vectorizer = TfIdfVectorizer::new(Tokenizer::new(config.stemming), config.idf, config.sublinear_tf);
        let ids: Vec<MovieId> = corpus.records().iter().map(|r| r.id).collect();

        let (vocabulary, vectors, matrix) = match config.scoring {
            Scoring::Combined => {
                let texts: Vec<&str> = corpus.records().iter().map(MovieRecord::combined_text).collect();
                let (vocabulary, vectors) = vectorizer.fit_transform(&texts);
                let matrix = SimilarityMatrix::cosine(ids, &vectors);
                (vocabulary, vectors, matrix)
            }
            Scoring::Hybrid { overview_weight, genre_weight } => {
                let texts: Vec<&str> = corpus.records().iter().map(|r| r.overview.as_str()).collect();
                let (vocabulary, vectors) = vectorizer.fit_transform(&texts);
                let overview = SimilarityMatrix::cosine(ids.clone(), &vectors);
                let tags: Vec<Vec<String>> = corpus.records().iter().map(|r| r.genres.tags()).collect();
                let genre = SimilarityMatrix::from_pairwise(ids, |i, j| jaccard(&tags[i], &tags[j]));
                let matrix = SimilarityMatrix::blend(&overview, overview_weight, &genre, genre_weight);
                (vocabulary, vectors, matrix)
            }
        };

        tracing::info!(
            num_docs = corpus.len(),
            num_terms = vocabulary.len(),
            took_ms = start.elapsed().as_millis() as u64,
            "similarity engine built"
        );
        Ok(Self { corpus, config, vocabulary, vectors, matrix })
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }
    pub fn config(&self) -> &EngineConfig { &self.config }
    pub fn vocabulary(&self) -> &VocabularyIndex { &self.vocabulary }
    pub fn matrix(&self) -> &SimilarityMatrix { &self.matrix }

    pub fn vector(&self, id: MovieId) -> Option<&DocumentVector> {
        self.matrix.ids().iter().position(|x| *x == id).map(|i| &self.vectors[i])
    }

    /// Top `k` movies most similar to `title`, best first.
    ///
    /// The query movie is never part of the result. Equal scores keep corpus order.
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Recommendation>, NotFoundError> {
        let query = self.corpus.id_of(title).ok_or_else(|| NotFoundError { title: title.to_string() })?;
        let row = self.matrix.row(query).ok_or_else(|| NotFoundError { title: title.to_string() })?;

        let mut scored: Vec<(MovieId, f32)> = self
            .matrix
            .ids()
            .iter()
            .copied()
            .zip(row.iter().copied())
            .filter(|(id, _)| *id != query)
            .collect();
        // stable: ties keep corpus order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .filter_map(|(id, score)| {
                let movie = self.corpus.get(id)?;
                Some(Recommendation {
                    id,
                    title: movie.title.clone(),
                    score,
                    genres: movie.genres.tags(),
                    poster: movie.poster.clone(),
                })
            })
            .collect())
    }

    pub fn recommend_titles(&self, title: &str, k: usize) -> Result<Vec<String>, NotFoundError> {
        Ok(self.recommend(title, k)?.into_iter().map(|r| r.title).collect())
    }
}
