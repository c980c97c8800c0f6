// File: src/classifier/model.rs
//
// Linear classifier over sparse TF-IDF vectors, trained with plain SGD.
// Deliberately small: the corpus is thousands of short messages, not a
// research dataset.

/// Logistic regression weights. Immutable once trained.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Vec<f32>,
    bias: f32,
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticRegression {
    /// Train on sparse samples (feature vector, is_spam). Samples are
    /// visited in corpus order each epoch, which keeps training
    /// deterministic for a given corpus.
    pub fn train(
        samples: &[(Vec<(usize, f32)>, bool)],
        dimension: usize,
        epochs: usize,
        learning_rate: f32,
        l2_penalty: f32,
    ) -> Self {
        let mut weights = vec![0.0f32; dimension];
        let mut bias = 0.0f32;

        for _ in 0..epochs {
            for (vector, is_spam) in samples {
                let target = if *is_spam { 1.0 } else { 0.0 };
                let z = bias
                    + vector
                        .iter()
                        .map(|(index, value)| weights[*index] * value)
                        .sum::<f32>();
                let error = sigmoid(z) - target;

                for (index, value) in vector {
                    let w = weights[*index];
                    weights[*index] = w - learning_rate * (error * value + l2_penalty * w);
                }
                bias -= learning_rate * error;
            }
        }

        Self { weights, bias }
    }

    /// Probability that the vector is spam.
    pub fn predict_proba(&self, vector: &[(usize, f32)]) -> f32 {
        let z = self.bias
            + vector
                .iter()
                .filter(|(index, _)| *index < self.weights.len())
                .map(|(index, value)| self.weights[*index] * value)
                .sum::<f32>();
        sigmoid(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::features::{tokenize, Vectorizer};

    fn build(samples: &[(&str, bool)]) -> (Vectorizer, LogisticRegression) {
        let documents: Vec<Vec<String>> = samples.iter().map(|(t, _)| tokenize(t)).collect();
        let vectorizer = Vectorizer::fit(&documents);
        let training: Vec<(Vec<(usize, f32)>, bool)> = documents
            .iter()
            .zip(samples.iter())
            .map(|(tokens, (_, is_spam))| (vectorizer.transform(tokens), *is_spam))
            .collect();
        let model = LogisticRegression::train(&training, vectorizer.dimension(), 50, 0.5, 1e-4);
        (vectorizer, model)
    }

    #[test]
    fn separates_obvious_classes() {
        let (vectorizer, model) = build(&[
            ("заработок крипта доход схема деньги", true),
            ("крипта инвестиции доход быстро деньги", true),
            ("заработок схема быстро деньги пассивно", true),
            ("погода сегодня отличная гуляем парке", false),
            ("встретимся вечером кафе обсудим проект", false),
            ("спасибо помощь проект получился отличный", false),
        ]);

        let spam = model.predict_proba(&vectorizer.transform(&tokenize("крипта доход схема")));
        let ham = model.predict_proba(&vectorizer.transform(&tokenize("погода отличная гуляем")));
        assert!(spam > 0.5, "spam proba {}", spam);
        assert!(ham < 0.5, "ham proba {}", ham);
    }

    #[test]
    fn empty_vector_falls_back_to_bias() {
        let (_, model) = build(&[
            ("заработок крипта", true),
            ("погода парк", false),
            ("схема доход", true),
            ("кафе вечер", false),
        ]);
        let proba = model.predict_proba(&[]);
        assert!((0.0..=1.0).contains(&proba));
    }
}
