// tests/classifier_tests.rs
//
// Training guards, snapshot swaps, the untrained fallback and corpus
// persistence for the online spam classifier.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use chatwarden_core::classifier::SpamClassifier;
use chatwarden_core::config::ClassifierConfig;
use chatwarden_core::repositories::sqlite::SqliteSpamCorpusRepository;
use chatwarden_core::test_utils::helpers::*;
use chatwarden_core::{Database, Error};

const SPAM_CORPUS: [&str; 6] = [
    "получай деньги каждый день просто пиши мне в телегу",
    "набираю людей для простой подработки деньги сразу",
    "деньги без усилий первые выплаты уже сегодня",
    "подработка для всех деньги каждый день пиши мне",
    "срочно нужны люди выплаты деньги сразу на карту",
    "простая подработка деньги на карту каждый день",
];

const HAM_CORPUS: [&str; 6] = [
    "кто знает когда откроют новую станцию метро",
    "вчера отличный концерт был в парке всем рекомендую",
    "подскажите хорошую кофейню рядом с вокзалом",
    "сегодня отличная погода пойдем гулять в парк",
    "спасибо за совет про стоматолога все прошло хорошо",
    "кто то потерял ключи у подъезда забрала консьержка",
];

fn fast_config() -> ClassifierConfig {
    ClassifierConfig {
        ready_wait: Duration::from_millis(100),
        ..ClassifierConfig::default()
    }
}

fn classifier_over(db: &Database, config: ClassifierConfig) -> SpamClassifier {
    SpamClassifier::new(
        Arc::new(SqliteSpamCorpusRepository::new(db.pool().clone())),
        config,
    )
}

async fn setup_classifier(
    config: ClassifierConfig,
) -> Result<(SpamClassifier, Database), Error> {
    init_test_tracing();
    let db = setup_test_database().await?;
    let classifier = classifier_over(&db, config);
    Ok((classifier, db))
}

async fn fill_corpus(classifier: &SpamClassifier) -> Result<(), Error> {
    for text in SPAM_CORPUS {
        classifier.add_labeled_example(text, true).await?;
    }
    for text in HAM_CORPUS {
        classifier.add_labeled_example(text, false).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_untrained_predict_is_clean_and_bounded() -> Result<(), Error> {
    let (classifier, _db) = setup_classifier(fast_config()).await?;

    let verdict = timeout(
        Duration::from_secs(1),
        classifier.predict("любой текст без модели"),
    )
    .await
    .expect("untrained predict must return within ready_wait");

    assert!(!verdict.is_spam);
    assert_eq!(verdict.score, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_training_requires_enough_samples_of_both_labels() -> Result<(), Error> {
    let (classifier, _db) = setup_classifier(fast_config()).await?;

    // One-sided and below the minimum: both guards skip training.
    for text in SPAM_CORPUS {
        classifier.add_labeled_example(text, true).await?;
    }
    assert!(!classifier.train().await?);
    assert!(classifier.is_stale(), "skipped training leaves the model stale");

    for text in HAM_CORPUS {
        classifier.add_labeled_example(text, false).await?;
    }
    assert!(classifier.train().await?);
    assert!(!classifier.is_stale());
    Ok(())
}

#[tokio::test]
async fn test_trained_model_separates_the_corpus() -> Result<(), Error> {
    let (classifier, _db) = setup_classifier(fast_config()).await?;
    fill_corpus(&classifier).await?;
    assert!(classifier.train().await?);

    let spam = classifier
        .predict("деньги каждый день простая подработка пиши мне")
        .await;
    assert!(spam.is_spam);
    assert!(spam.score >= classifier.config().spam_threshold);

    let ham = classifier
        .predict("подскажите когда откроют станцию метро рядом с парком")
        .await;
    assert!(!ham.is_spam);
    assert!(ham.score < classifier.config().spam_threshold);
    Ok(())
}

#[tokio::test]
async fn test_text_with_no_known_tokens_is_clean() -> Result<(), Error> {
    let (classifier, _db) = setup_classifier(fast_config()).await?;
    fill_corpus(&classifier).await?;
    assert!(classifier.train().await?);

    let verdict = classifier.predict("").await;
    assert!(!verdict.is_spam);
    assert_eq!(verdict.score, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_train_skips_until_corpus_changes() -> Result<(), Error> {
    let (classifier, _db) = setup_classifier(fast_config()).await?;
    fill_corpus(&classifier).await?;

    assert!(classifier.train().await?);
    assert!(!classifier.train().await?, "nothing changed, nothing to do");

    classifier
        .add_labeled_example("новый подтвержденный спам про деньги", true)
        .await?;
    assert!(classifier.is_stale());
    assert!(classifier.train().await?);
    Ok(())
}

#[tokio::test]
async fn test_corpus_survives_restart() -> Result<(), Error> {
    let (classifier, db) = setup_classifier(fast_config()).await?;
    fill_corpus(&classifier).await?;
    assert!(classifier.train().await?);

    // A fresh instance starts stale and rebuilds from the stored corpus.
    let reborn = classifier_over(&db, fast_config());
    assert!(reborn.is_stale());
    assert!(reborn.train().await?);

    let verdict = reborn
        .predict("деньги сразу на карту простая подработка")
        .await;
    assert!(verdict.is_spam);
    Ok(())
}
