use crate::config::IdfMode;
use crate::tokenizer::Tokenizer;
use std::collections::HashMap;

pub type TermId = u32;

/// Term → column mapping, in first-occurrence order over the corpus.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    df: Vec<u32>,
}

impl VocabularyIndex {
    pub fn len(&self) -> usize { self.terms.len() }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }
    pub fn term(&self, id: TermId) -> Option<&str> { self.terms.get(id as usize).map(String::as_str) }

    /// Number of documents containing the term.
    pub fn df(&self, id: TermId) -> u32 { self.df.get(id as usize).copied().unwrap_or(0) }

    fn intern(&mut self, term: String) -> TermId {
        if let Some(&id) = self.dictionary.get(&term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(term.clone());
        self.df.push(0);
        self.dictionary.insert(term, id);
        id
    }
}

/// Sparse TF-IDF weights, sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentVector {
    entries: Vec<(TermId, f32)>,
    norm: f32,
}

impl DocumentVector {
    fn new(mut entries: Vec<(TermId, f32)>) -> Self {
        entries.sort_by_key(|(t, _)| *t);
        entries.retain(|(_, w)| *w != 0.0);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        Self { entries, norm }
    }

    pub fn entries(&self) -> &[(TermId, f32)] { &self.entries }
    pub fn norm(&self) -> f32 { self.norm }
    pub fn is_zero(&self) -> bool { self.norm == 0.0 }

    pub fn weight(&self, term: TermId) -> f32 {
        self.entries
            .binary_search_by_key(&term, |(t, _)| *t)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub fn dot(&self, other: &DocumentVector) -> f32 {
        let (mut i, mut j, mut acc) = (0, 0, 0.0f32);
        while i < self.entries.len() && j < other.entries.len() {
            let (ta, wa) = self.entries[i];
            let (tb, wb) = other.entries[j];
            if ta == tb {
                acc += wa * wb;
                i += 1;
                j += 1;
            } else if ta < tb {
                i += 1;
            } else {
                j += 1;
            }
        }
        acc
    }

    /// Cosine similarity; 0.0 when either vector is zero.
    pub fn cosine(&self, other: &DocumentVector) -> f32 {
        if self.is_zero() || other.is_zero() {
            return 0.0;
        }
        (self.dot(other) / (self.norm * other.norm)).clamp(-1.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TfIdfVectorizer {
    tokenizer: Tokenizer,
    idf: IdfMode,
    sublinear_tf: bool,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self { Self::new(Tokenizer::default(), IdfMode::default(), true) }
}

impl TfIdfVectorizer {
    pub fn new(tokenizer: Tokenizer, idf: IdfMode, sublinear_tf: bool) -> Self {
        Self { tokenizer, idf, sublinear_tf }
    }

    fn tf(&self, raw: u32) -> f32 {
        match raw {
            0 => 0.0,
            n if self.sublinear_tf => 1.0 + (n as f32).ln(),
            n => n as f32,
        }
    }

    /// Learn the vocabulary and document frequencies, then weight every document.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> (VocabularyIndex, Vec<DocumentVector>) {
        let mut vocab = VocabularyIndex::default();
        let mut counts: Vec<Vec<(TermId, u32)>> = Vec::with_capacity(documents.len());

        for doc in documents {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in self.tokenizer.tokenize(doc.as_ref()) {
                let tid = vocab.intern(term);
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for tid in tf_counts.keys() {
                vocab.df[*tid as usize] += 1;
            }
            let mut doc_counts: Vec<(TermId, u32)> = tf_counts.into_iter().collect();
            doc_counts.sort_by_key(|(t, _)| *t);
            counts.push(doc_counts);
        }

        let n = documents.len();
        let idf: Vec<f32> = vocab.df.iter().map(|&df| self.idf.idf(n, df)).collect();
        let vectors = counts
            .into_iter()
            .map(|doc| DocumentVector::new(doc.into_iter().map(|(t, c)| (t, self.tf(c) * idf[t as usize])).collect()))
            .collect();
        (vocab, vectors)
    }
}
