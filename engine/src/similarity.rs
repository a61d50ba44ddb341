use crate::corpus::MovieId;
use crate::vectorize::DocumentVector;
use std::collections::HashMap;

/// Dense `N × N` similarity scores addressed by [`MovieId`].
///
/// Built once, never mutated. The upper triangle is computed and mirrored so the
/// matrix is exactly symmetric; the diagonal is 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    ids: Vec<MovieId>,
    slot: HashMap<MovieId, usize>,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Fill the matrix from a pairwise score function evaluated on slots `i < j`.
    pub fn from_pairwise<F>(ids: Vec<MovieId>, mut score: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let n = ids.len();
        let mut scores = vec![0.0f32; n * n];
        for i in 0..n {
            scores[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let s = score(i, j);
                let s = if s.is_finite() { s } else { 0.0 };
                scores[i * n + j] = s;
                scores[j * n + i] = s;
            }
        }
        let slot = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Self { ids, slot, scores }
    }

    /// Pairwise cosine similarity over document vectors.
    pub fn cosine(ids: Vec<MovieId>, vectors: &[DocumentVector]) -> Self {
        debug_assert_eq!(ids.len(), vectors.len());
        Self::from_pairwise(ids, |i, j| vectors[i].cosine(&vectors[j]))
    }

    /// Element-wise `a * wa + b * wb`. Both matrices must cover the same ids.
    pub fn blend(a: &SimilarityMatrix, wa: f32, b: &SimilarityMatrix, wb: f32) -> Self {
        debug_assert_eq!(a.ids, b.ids);
        let n = a.ids.len();
        Self::from_pairwise(a.ids.clone(), |i, j| wa * a.scores[i * n + j] + wb * b.scores[i * n + j])
    }

    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
    pub fn ids(&self) -> &[MovieId] { &self.ids }

    pub fn score(&self, a: MovieId, b: MovieId) -> Option<f32> {
        let i = *self.slot.get(&a)?;
        let j = *self.slot.get(&b)?;
        Some(self.scores[i * self.len() + j])
    }

    /// Scores of `id` against every movie, in id order of [`Self::ids`].
    pub fn row(&self, id: MovieId) -> Option<&[f32]> {
        let i = *self.slot.get(&id)?;
        let n = self.len();
        Some(&self.scores[i * n..(i + 1) * n])
    }
}

/// `|a ∩ b| / |a ∪ b|` over sorted, deduplicated tag lists; 0.0 when both are empty.
pub fn jaccard(a: &[String], b: &[String]) -> f32 {
    let (mut i, mut j, mut shared) = (0, 0, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    let union = a.len() + b.len() - shared;
    if union == 0 { 0.0 } else { shared as f32 / union as f32 }
}
