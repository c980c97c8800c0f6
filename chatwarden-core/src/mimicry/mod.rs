// File: src/mimicry/mod.rs
//
// Heuristic estimate that a user's first messages are templated/low-effort,
// typical of scripted actors warming an account up. Pure function over the
// three probation messages; no I/O, no state.

use std::collections::HashSet;

use crate::text::lists::{AGREEMENT_WORDS, COMPARATIVE_PHRASES, TEMPLATE_GREETINGS};
use crate::text::normalize;

const WEIGHT_LENGTH: f32 = 0.25;
const WEIGHT_TEMPLATE: f32 = 0.35;
const WEIGHT_DIVERSITY: f32 = 0.25;
const WEIGHT_CONTEXT: f32 = 0.15;

/// Score the three captured probation messages. Returns 0.0 for any input
/// that is not exactly three messages; the heuristic is calibrated for that
/// window and meaningless outside it.
pub fn score(messages: &[String]) -> f32 {
    if messages.len() != 3 {
        return 0.0;
    }

    let normalized: Vec<String> = messages.iter().map(|m| normalize(m)).collect();

    let combined = length_score(&normalized) * WEIGHT_LENGTH
        + template_score(&normalized) * WEIGHT_TEMPLATE
        + diversity_score(&normalized) * WEIGHT_DIVERSITY
        + context_score(&normalized) * WEIGHT_CONTEXT;

    combined.clamp(0.0, 1.0)
}

/// Very short messages are the cheapest to script.
fn length_score(messages: &[String]) -> f32 {
    let total: usize = messages.iter().map(|m| m.trim().chars().count()).sum();
    let avg = total as f32 / messages.len() as f32;
    if avg <= 2.0 {
        1.0
    } else if avg <= 5.0 {
        0.7
    } else if avg <= 10.0 {
        0.3
    } else {
        0.0
    }
}

/// Fraction of messages that are (or contain) a stock greeting phrase.
fn template_score(messages: &[String]) -> f32 {
    let matched = messages
        .iter()
        .filter(|m| TEMPLATE_GREETINGS.iter().any(|g| m.contains(g)))
        .count();
    matched as f32 / messages.len() as f32
}

/// Repetition across the window. All-identical is the strongest signal;
/// otherwise the unique-word ratio is bucketed, low ratio meaning high
/// suspicion.
fn diversity_score(messages: &[String]) -> f32 {
    if messages.iter().all(|m| m == &messages[0]) {
        return 1.0;
    }

    let mut total = 0usize;
    let mut unique: HashSet<&str> = HashSet::new();
    for m in messages {
        for word in m.split_whitespace() {
            total += 1;
            unique.insert(word);
        }
    }
    if total == 0 {
        return 0.0;
    }

    let ratio = unique.len() as f32 / total as f32;
    if ratio < 0.3 {
        0.8
    } else if ratio < 0.5 {
        0.5
    } else if ratio < 0.7 {
        0.2
    } else {
        0.0
    }
}

/// Mentions, agreement words and comparative phrases mean the user is
/// reacting to the room; their absence across all three messages is
/// suspicious.
fn context_score(messages: &[String]) -> f32 {
    let indicator_count = messages.iter().filter(|m| has_indicator(m)).count();
    1.0 - indicator_count as f32 / 3.0
}

fn has_indicator(message: &str) -> bool {
    if message.contains('@') {
        return true;
    }
    if message
        .split_whitespace()
        .any(|w| AGREEMENT_WORDS.contains(&w))
    {
        return true;
    }
    COMPARATIVE_PHRASES.iter().any(|p| message.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msgs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_anything_but_three_messages() {
        assert_eq!(score(&msgs(&[])), 0.0);
        assert_eq!(score(&msgs(&["a"])), 0.0);
        assert_eq!(score(&msgs(&["a", "b"])), 0.0);
        assert_eq!(score(&msgs(&["a", "b", "c", "d"])), 0.0);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let m = msgs(&["привет", "ок", "да нормально"]);
        let first = score(&m);
        for _ in 0..10 {
            assert_eq!(score(&m), first);
        }
    }

    #[test]
    fn short_template_burst_scores_above_half() {
        let s = score(&msgs(&["!", "?", "ок"]));
        assert!(s > 0.5, "expected > 0.5, got {}", s);
    }

    #[test]
    fn identical_messages_hit_the_diversity_ceiling() {
        let s = score(&msgs(&["привет", "привет", "привет"]));
        // length 0.3, template 1.0, diversity 1.0, context 1.0 -> 0.825
        assert!(s > 0.8, "expected > 0.8, got {}", s);
    }

    #[test]
    fn conversational_replies_score_low() {
        let s = score(&msgs(&[
            "да, у меня такая же проблема была с обновлением прошивки",
            "@admin подскажите пожалуйста где лежит инструкция по настройке",
            "спасибо большое, тоже попробую этот вариант сегодня вечером",
        ]));
        assert!(s < 0.3, "expected < 0.3, got {}", s);
    }

    #[test]
    fn score_is_always_in_unit_interval() {
        let cases = [
            msgs(&["", "", ""]),
            msgs(&["a", "a", "a"]),
            msgs(&["привет", "hello", "ку"]),
            msgs(&["разные", "слова", "везде"]),
        ];
        for case in &cases {
            let s = score(case);
            assert!((0.0..=1.0).contains(&s), "out of range: {}", s);
        }
    }
}
