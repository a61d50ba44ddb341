use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OVERVIEW_WEIGHT: f32 = 0.7;
pub const DEFAULT_GENRE_WEIGHT: f32 = 0.3;

/// Inverse document frequency variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfMode {
    /// `ln(N / df)`. Terms present in every document get zero weight.
    Plain,
    /// `ln(1 + N / df)`. Every term keeps a positive weight.
    #[default]
    Smoothed,
}

impl IdfMode {
    pub fn idf(self, num_docs: usize, df: u32) -> f32 {
        let n = num_docs.max(1) as f32;
        let df = df.max(1) as f32;
        match self {
            IdfMode::Plain => (n / df).ln(),
            IdfMode::Smoothed => (1.0 + n / df).ln(),
        }
    }
}

/// How pairwise scores are derived.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Scoring {
    /// Cosine over TF-IDF of `genres + " " + overview`.
    #[default]
    Combined,
    /// `overview_weight * cosine(overview) + genre_weight * jaccard(genre tags)`.
    Hybrid { overview_weight: f32, genre_weight: f32 },
}

impl Scoring {
    pub fn hybrid() -> Self {
        Scoring::Hybrid { overview_weight: DEFAULT_OVERVIEW_WEIGHT, genre_weight: DEFAULT_GENRE_WEIGHT }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub idf: IdfMode,
    /// Use `1 + ln(count)` instead of the raw count as term frequency.
    pub sublinear_tf: bool,
    pub stemming: bool,
    pub scoring: Scoring,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { idf: IdfMode::default(), sublinear_tf: true, stemming: true, scoring: Scoring::default() }
    }
}

impl EngineConfig {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_idf(mut self, idf: IdfMode) -> Self {
        self.idf = idf;
        self
    }

    #[must_use]
    pub fn with_sublinear_tf(mut self, enable: bool) -> Self {
        self.sublinear_tf = enable;
        self
    }

    #[must_use]
    pub fn with_stemming(mut self, enable: bool) -> Self {
        self.stemming = enable;
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Scoring::Hybrid { overview_weight, genre_weight } = self.scoring {
            let valid = |w: f32| w.is_finite() && w >= 0.0;
            if !valid(overview_weight) || !valid(genre_weight) {
                return Err(ConfigError::NegativeWeight { overview: overview_weight, genre: genre_weight });
            }
            let sum = overview_weight + genre_weight;
            if (sum - 1.0).abs() > 1e-4 {
                return Err(ConfigError::WeightSum(sum));
            }
        }
        Ok(())
    }

    /// Stable textual fingerprint, mixed into cache keys.
    pub(crate) fn fingerprint(&self) -> String {
        let scoring = match self.scoring {
            Scoring::Combined => "combined".to_string(),
            Scoring::Hybrid { overview_weight, genre_weight } => {
                format!("hybrid:{:08x}:{:08x}", overview_weight.to_bits(), genre_weight.to_bits())
            }
        };
        format!("{:?}|{}|{}|{}", self.idf, self.sublinear_tf, self.stemming, scoring)
    }
}
