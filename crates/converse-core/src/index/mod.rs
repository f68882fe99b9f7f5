//! TF-IDF vector space index over the training corpus.
//!
//! Each pattern becomes one L2-normalized sparse vector of unigram and
//! bigram weights; queries are projected into the same vocabulary
//! (out-of-vocabulary terms contribute zero weight) and compared by cosine
//! similarity. The index is a read-only artifact over one corpus snapshot:
//! retraining builds a whole new index off to the side, the orchestrator
//! swaps it in atomically, and queries never observe a half-built state.
//!
//! Weighting follows the usual smoothed scheme: raw term frequency times
//! `ln((1+n)/(1+df)) + 1`, rows L2-normalized, so the dot product of two
//! stored vectors is their cosine similarity.

mod stopwords;

use std::collections::HashMap;

use converse_types::corpus::TrainingCorpus;
use converse_types::error::CorpusError;

use stopwords::STOP_WORDS;

/// Sparse vector: (dimension, weight) pairs sorted by dimension.
type SparseVector = Vec<(usize, f32)>;

/// Where a pattern row came from.
#[derive(Debug, Clone)]
pub struct RowMeta {
    pub application: String,
    pub tag: String,
    /// Index of the pattern within its application's parallel arrays.
    pub row_in_app: usize,
}

/// Read-only TF-IDF index over one corpus snapshot.
pub struct VectorSpaceIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    rows: Vec<SparseVector>,
    meta: Vec<RowMeta>,
}

impl VectorSpaceIndex {
    /// Build an index from the corpus, capping the vocabulary at
    /// `max_features` terms (highest total frequency first, alphabetical
    /// on ties).
    ///
    /// Applications whose pattern/tag arrays are mismatched are skipped
    /// with a warning; the rest of the corpus still loads. Fails only
    /// when zero usable patterns remain across all applications.
    pub fn build(corpus: &TrainingCorpus, max_features: usize) -> Result<Self, CorpusError> {
        let mut docs: Vec<Vec<String>> = Vec::new();
        let mut meta: Vec<RowMeta> = Vec::new();

        for (app, data) in &corpus.applications {
            if !data.is_consistent() {
                tracing::warn!(
                    application = %app,
                    patterns = data.patterns.len(),
                    tags = data.tags.len(),
                    "patterns/tags count mismatch, skipping application"
                );
                continue;
            }
            for (i, (pattern, tag)) in data.patterns.iter().zip(&data.tags).enumerate() {
                docs.push(extract_features(pattern));
                meta.push(RowMeta {
                    application: app.clone(),
                    tag: tag.clone(),
                    row_in_app: i,
                });
            }
        }

        if docs.is_empty() {
            return Err(CorpusError::Empty);
        }

        // Vocabulary selection: total term frequency, capped at max_features.
        let mut total_counts: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            for term in doc {
                *total_counts.entry(term).or_insert(0) += 1;
            }
        }
        let mut terms: Vec<(&str, usize)> = total_counts.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(max_features.max(1));

        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(dim, (term, _))| (term.to_string(), dim))
            .collect();

        // Document frequency per retained term.
        let mut df = vec![0usize; vocabulary.len()];
        for doc in &docs {
            let mut seen = vec![false; vocabulary.len()];
            for term in doc {
                if let Some(&dim) = vocabulary.get(term.as_str()) {
                    if !seen[dim] {
                        seen[dim] = true;
                        df[dim] += 1;
                    }
                }
            }
        }

        let n = docs.len() as f32;
        let idf: Vec<f32> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
            .collect();

        let rows: Vec<SparseVector> = docs
            .iter()
            .map(|doc| weigh(doc, &vocabulary, &idf))
            .collect();

        tracing::info!(
            patterns = rows.len(),
            vocabulary = vocabulary.len(),
            "vector space index built"
        );

        Ok(Self {
            vocabulary,
            idf,
            rows,
            meta,
        })
    }

    /// Best-matching pattern row for the text, with its cosine similarity.
    ///
    /// Returns `None` when the text shares no vocabulary with the corpus.
    /// Ties resolve to the first-occurring row in corpus order.
    pub fn query(&self, text: &str) -> Option<(usize, f32)> {
        let query = self.project(text);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f32)> = None;
        for (row, vector) in self.rows.iter().enumerate() {
            let sim = dot(&query, vector);
            match best {
                Some((_, best_sim)) if sim <= best_sim => {}
                _ if sim > 0.0 => best = Some((row, sim)),
                _ => {}
            }
        }
        best
    }

    /// Top-k rows by similarity descending, excluding zero-similarity
    /// rows. Ties resolve to first-occurrence corpus order.
    pub fn top_k(&self, text: &str, k: usize) -> Vec<(usize, f32)> {
        let query = self.project(text);
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, vector)| (row, dot(&query, vector)))
            .filter(|&(_, sim)| sim > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Project text into the index's vocabulary space, L2-normalized.
    fn project(&self, text: &str) -> SparseVector {
        weigh(&extract_features(text), &self.vocabulary, &self.idf)
    }

    pub fn meta(&self, row: usize) -> &RowMeta {
        &self.meta[row]
    }

    pub fn pattern_count(&self) -> usize {
        self.rows.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Tokenize text the way the vectorizer expects: lowercase, strip
/// punctuation, drop single-character tokens and stop words, then emit
/// unigrams plus bigrams over the surviving tokens.
fn extract_features(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    let tokens: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !STOP_WORDS.contains(t))
        .collect();

    let mut features: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    for pair in tokens.windows(2) {
        features.push(format!("{} {}", pair[0], pair[1]));
    }
    features
}

/// TF-IDF weigh a feature list against a vocabulary, L2-normalized.
fn weigh(features: &[String], vocabulary: &HashMap<String, usize>, idf: &[f32]) -> SparseVector {
    let mut counts: HashMap<usize, f32> = HashMap::new();
    for feature in features {
        if let Some(&dim) = vocabulary.get(feature.as_str()) {
            *counts.entry(dim).or_insert(0.0) += 1.0;
        }
    }

    let mut vector: SparseVector = counts
        .into_iter()
        .map(|(dim, tf)| (dim, tf * idf[dim]))
        .collect();
    vector.sort_by_key(|&(dim, _)| dim);

    let norm = vector.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut vector {
            *w /= norm;
        }
    }
    vector
}

/// Dot product of two sorted sparse vectors.
///
/// Both sides are L2-normalized, so this is their cosine similarity;
/// an empty side contributes zero, matching the "0 if either magnitude
/// is 0" convention.
fn dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
