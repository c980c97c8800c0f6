// tests/violation_tests.rs
//
// Threshold signalling, the sliding window, ban cleanup and persistence of
// the per-(user, chat, kind) violation counters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chatwarden_common::models::violation::ViolationKind;
use chatwarden_core::config::ViolationConfig;
use chatwarden_core::repositories::sqlite::SqliteViolationRepository;
use chatwarden_core::services::violation_service::ViolationService;
use chatwarden_core::test_utils::helpers::*;
use chatwarden_core::{Database, Error};

async fn setup_violations(
    config: ViolationConfig,
) -> Result<(ViolationService, Database), Error> {
    init_test_tracing();
    let db = setup_test_database().await?;
    let service = violations_over(&db, config);
    Ok((service, db))
}

fn violations_over(db: &Database, config: ViolationConfig) -> ViolationService {
    ViolationService::new(
        Arc::new(SqliteViolationRepository::new(db.pool().clone())),
        config,
    )
}

#[tokio::test]
async fn test_threshold_signals_exactly_once() -> Result<(), Error> {
    let (service, _db) = setup_violations(ViolationConfig::default()).await?;

    let mut signals = Vec::new();
    for _ in 0..4 {
        signals.push(
            service
                .register_violation(10, 1, ViolationKind::StopWords)
                .await?,
        );
    }
    // Threshold for stop words is 3: only the crossing registration signals.
    assert_eq!(signals, vec![false, false, true, false]);
    assert_eq!(service.get_count(10, 1, ViolationKind::StopWords), 4);
    Ok(())
}

#[tokio::test]
async fn test_kinds_count_independently() -> Result<(), Error> {
    let (service, _db) = setup_violations(ViolationConfig::default()).await?;

    service
        .register_violation(11, 1, ViolationKind::StopWords)
        .await?;
    service
        .register_violation(11, 1, ViolationKind::StopWords)
        .await?;
    let breached = service
        .register_violation(11, 1, ViolationKind::TooManyEmojis)
        .await?;

    assert!(!breached, "emoji count is 1, its own threshold is 3");
    assert_eq!(service.get_count(11, 1, ViolationKind::StopWords), 2);
    assert_eq!(service.get_count(11, 1, ViolationKind::TooManyEmojis), 1);
    assert_eq!(service.get_count(11, 2, ViolationKind::StopWords), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_threshold_counts_but_never_signals() -> Result<(), Error> {
    let config = ViolationConfig {
        thresholds: HashMap::new(),
        ..ViolationConfig::default()
    };
    let (service, _db) = setup_violations(config).await?;

    for _ in 0..5 {
        let breached = service
            .register_violation(12, 1, ViolationKind::MlSpam)
            .await?;
        assert!(!breached);
    }
    assert_eq!(service.get_count(12, 1, ViolationKind::MlSpam), 5);
    Ok(())
}

#[tokio::test]
async fn test_window_expiry_restarts_the_count() -> Result<(), Error> {
    let config = ViolationConfig {
        ttl: Duration::from_millis(50),
        ..ViolationConfig::default()
    };
    let (service, _db) = setup_violations(config).await?;

    service
        .register_violation(13, 1, ViolationKind::LookalikeChars)
        .await?;
    assert_eq!(service.get_count(13, 1, ViolationKind::LookalikeChars), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        service.get_count(13, 1, ViolationKind::LookalikeChars),
        0,
        "expired counter reads as zero"
    );

    // The next registration starts a fresh window at one, so the lookalike
    // threshold of two is not treated as crossed.
    let breached = service
        .register_violation(13, 1, ViolationKind::LookalikeChars)
        .await?;
    assert!(!breached);
    assert_eq!(service.get_count(13, 1, ViolationKind::LookalikeChars), 1);
    Ok(())
}

#[tokio::test]
async fn test_reset_clears_every_kind_for_the_pair() -> Result<(), Error> {
    let (service, db) = setup_violations(ViolationConfig::default()).await?;

    for kind in ViolationKind::ALL {
        service.register_violation(14, 1, kind).await?;
    }
    service
        .register_violation(14, 2, ViolationKind::StopWords)
        .await?;

    service.reset_violations(14, 1).await?;
    for kind in ViolationKind::ALL {
        assert_eq!(service.get_count(14, 1, kind), 0);
    }
    // Another chat's counter is untouched.
    assert_eq!(service.get_count(14, 2, ViolationKind::StopWords), 1);

    // The reset reached the table too.
    let reloaded = violations_over(&db, ViolationConfig::default());
    assert_eq!(reloaded.load().await?, 1);
    assert_eq!(reloaded.get_count(14, 2, ViolationKind::StopWords), 1);
    Ok(())
}

#[tokio::test]
async fn test_counters_survive_restart() -> Result<(), Error> {
    let (service, db) = setup_violations(ViolationConfig::default()).await?;

    service
        .register_violation(15, 1, ViolationKind::StopWords)
        .await?;
    service
        .register_violation(15, 1, ViolationKind::StopWords)
        .await?;

    let reloaded = violations_over(&db, ViolationConfig::default());
    assert_eq!(reloaded.load().await?, 1);
    assert_eq!(reloaded.get_count(15, 1, ViolationKind::StopWords), 2);

    // The reloaded count continues toward the threshold.
    let breached = reloaded
        .register_violation(15, 1, ViolationKind::StopWords)
        .await?;
    assert!(breached);
    Ok(())
}

#[tokio::test]
async fn test_load_skips_rows_already_past_their_window() -> Result<(), Error> {
    let config = ViolationConfig {
        ttl: Duration::from_millis(50),
        ..ViolationConfig::default()
    };
    let (service, db) = setup_violations(config.clone()).await?;

    service
        .register_violation(16, 1, ViolationKind::MlSpam)
        .await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let reloaded = violations_over(&db, config);
    assert_eq!(reloaded.load().await?, 0);
    assert_eq!(reloaded.get_count(16, 1, ViolationKind::MlSpam), 0);
    Ok(())
}

#[tokio::test]
async fn test_prune_drops_expired_rows_and_keeps_live_ones() -> Result<(), Error> {
    let config = ViolationConfig {
        ttl: Duration::from_millis(50),
        ..ViolationConfig::default()
    };
    let (service, db) = setup_violations(config).await?;

    service
        .register_violation(17, 1, ViolationKind::StopWords)
        .await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // A fresh counter registered after the old one ran out.
    let live = violations_over(&db, ViolationConfig::default());
    live.register_violation(18, 1, ViolationKind::StopWords)
        .await?;

    assert_eq!(live.prune_expired().await?, 1);
    assert_eq!(live.get_count(18, 1, ViolationKind::StopWords), 1);
    assert_eq!(live.prune_expired().await?, 0);
    Ok(())
}
