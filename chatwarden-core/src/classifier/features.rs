// File: src/classifier/features.rs
//
// Feature extraction for the spam classifier: word/bigram tokens over
// normalized text, TF-IDF weighting fit from the labeled corpus.

use std::collections::HashMap;

use crate::text::lists::CLASSIFIER_STOP_WORDS;

/// Unigrams plus adjacent bigrams over the normalized text, function words
/// removed. Tokens shorter than two characters carry no signal and are
/// dropped before n-gram assembly.
pub fn tokenize(normalized: &str) -> Vec<String> {
    let words: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !CLASSIFIER_STOP_WORDS.contains(w))
        .collect();

    let mut tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

/// Vocabulary plus smoothed inverse document frequencies, fit once per
/// training run. Immutable afterwards; lives inside the model snapshot.
#[derive(Debug, Clone)]
pub struct Vectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl Vectorizer {
    pub fn fit(documents: &[Vec<String>]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for tokens in documents {
            let mut seen_in_doc: Vec<usize> = Vec::new();
            for token in tokens {
                let index = match vocabulary.get(token) {
                    Some(&i) => i,
                    None => {
                        let i = vocabulary.len();
                        vocabulary.insert(token.clone(), i);
                        document_frequency.push(0);
                        i
                    }
                };
                if !seen_in_doc.contains(&index) {
                    seen_in_doc.push(index);
                    document_frequency[index] += 1;
                }
            }
        }

        let n_docs = documents.len() as f32;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Sparse L2-normalized TF-IDF vector as (index, weight) pairs sorted
    /// by index. Tokens outside the vocabulary are ignored.
    pub fn transform(&self, tokens: &[String]) -> Vec<(usize, f32)> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm: f32 = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in vector.iter_mut() {
                *w /= norm;
            }
        }

        vector.sort_unstable_by_key(|(index, _)| *index);
        vector
    }
}
