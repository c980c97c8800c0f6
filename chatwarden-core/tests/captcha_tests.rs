// tests/captcha_tests.rs
//
// Challenge lifecycle: creation, single-use validation, timer expiry, the
// reconciliation sweep, and reload after a restart.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use chatwarden_common::models::action::ActionRequest;
use chatwarden_core::config::CaptchaConfig;
use chatwarden_core::eventbus::{EventBus, GuardEvent};
use chatwarden_core::repositories::sqlite::SqliteCaptchaRepository;
use chatwarden_core::services::captcha_service::{CaptchaService, CATALOG};
use chatwarden_core::test_utils::helpers::*;
use chatwarden_core::{Database, Error};

/// Timers far enough out that they never fire during a test.
fn long_config() -> CaptchaConfig {
    CaptchaConfig {
        expiry: Duration::from_secs(3600),
        sweep_grace: Duration::from_secs(3900),
        sweep_interval: Duration::from_secs(3600),
        temp_ban: Duration::from_secs(1200),
        options_per_challenge: 8,
    }
}

async fn setup_captcha(
    config: CaptchaConfig,
) -> Result<(Arc<CaptchaService>, EventBus, Database), Error> {
    init_test_tracing();
    let db = setup_test_database().await?;
    let event_bus = EventBus::new();
    let service = Arc::new(CaptchaService::new(
        Arc::new(SqliteCaptchaRepository::new(db.pool().clone())),
        event_bus.clone(),
        config,
    ));
    Ok((service, event_bus, db))
}

fn captcha_over(db: &Database, config: CaptchaConfig) -> (Arc<CaptchaService>, EventBus) {
    let event_bus = EventBus::new();
    let service = Arc::new(CaptchaService::new(
        Arc::new(SqliteCaptchaRepository::new(db.pool().clone())),
        event_bus.clone(),
        config,
    ));
    (service, event_bus)
}

async fn next_event(rx: &mut mpsc::Receiver<GuardEvent>) -> GuardEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no event within deadline")
        .expect("bus closed")
}

#[tokio::test]
async fn test_challenge_shape_and_correct_validation() -> Result<(), Error> {
    let (service, _bus, _db) = setup_captcha(long_config()).await?;

    let challenge = service.create_challenge(1, 10, Some(111)).await?;
    assert_eq!(challenge.options.len(), 8);
    let distinct: HashSet<usize> = challenge.options.iter().copied().collect();
    assert_eq!(distinct.len(), 8);
    assert!(challenge.options.contains(&challenge.correct_index));
    assert!(challenge.options.iter().all(|i| *i < CATALOG.len()));

    assert!(service.validate(1, 10, challenge.correct_index).await);
    // Consumed: any further answer for the key reports no match.
    assert!(!service.validate(1, 10, challenge.correct_index).await);
    Ok(())
}

#[tokio::test]
async fn test_wrong_answer_consumes_challenge() -> Result<(), Error> {
    let (service, _bus, _db) = setup_captcha(long_config()).await?;

    let challenge = service.create_challenge(2, 20, None).await?;
    let wrong = challenge
        .options
        .iter()
        .copied()
        .find(|i| *i != challenge.correct_index)
        .expect("eight options always include a wrong one");

    assert!(!service.validate(2, 20, wrong).await);
    // Even the right answer no longer matches once consumed.
    assert!(!service.validate(2, 20, challenge.correct_index).await);
    Ok(())
}

#[tokio::test]
async fn test_validate_unknown_key_reports_no_match() -> Result<(), Error> {
    let (service, _bus, _db) = setup_captcha(long_config()).await?;
    assert!(!service.validate(99, 99, 0).await);
    Ok(())
}

#[tokio::test]
async fn test_validate_is_at_most_once_under_concurrency() -> Result<(), Error> {
    let (service, _bus, _db) = setup_captcha(long_config()).await?;
    let challenge = service.create_challenge(3, 30, None).await?;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        let answer = challenge.correct_index;
        handles.push(tokio::spawn(async move { service.validate(3, 30, answer).await }));
    }

    let mut matched = 0;
    for handle in handles {
        if handle.await.expect("validate task panicked") {
            matched += 1;
        }
    }
    assert_eq!(matched, 1, "exactly one concurrent validate may match");
    Ok(())
}

#[tokio::test]
async fn test_new_challenge_replaces_previous() -> Result<(), Error> {
    let (service, _bus, _db) = setup_captcha(long_config()).await?;

    service.create_challenge(4, 40, None).await?;
    let second = service.create_challenge(4, 40, None).await?;

    let live = service.challenge_for(4, 40).expect("live challenge");
    assert_eq!(live.created_at, second.created_at);
    assert_eq!(live.correct_index, second.correct_index);

    assert!(service.validate(4, 40, second.correct_index).await);
    assert!(!service.validate(4, 40, second.correct_index).await);
    Ok(())
}

#[tokio::test]
async fn test_expiry_emits_ban_cleanup_and_delayed_unban() -> Result<(), Error> {
    let config = CaptchaConfig {
        expiry: Duration::from_millis(80),
        sweep_grace: Duration::from_millis(160),
        sweep_interval: Duration::from_secs(3600),
        temp_ban: Duration::from_millis(120),
        options_per_challenge: 8,
    };
    let (service, bus, _db) = setup_captcha(config).await?;
    let mut rx = bus.subscribe(None).await;

    service.create_challenge(5, 50, Some(111)).await?;
    service.set_challenge_message(5, 50, 222).await?;

    let mut ban_until_seen = false;
    let mut deleted = HashSet::new();
    let mut expired_seen = false;
    for _ in 0..4 {
        match next_event(&mut rx).await {
            GuardEvent::Action(ActionRequest::BanUser { chat_id, user_id, until }) => {
                assert_eq!((chat_id, user_id), (5, 50));
                assert!(until.is_some(), "captcha ban must be temporary");
                ban_until_seen = true;
            }
            GuardEvent::Action(ActionRequest::DeleteMessage { chat_id, message_id }) => {
                assert_eq!(chat_id, 5);
                deleted.insert(message_id);
            }
            GuardEvent::CaptchaExpired { chat_id, user_id } => {
                assert_eq!((chat_id, user_id), (5, 50));
                expired_seen = true;
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert!(ban_until_seen);
    assert!(expired_seen);
    assert_eq!(deleted, HashSet::from([111, 222]));

    // The challenge is gone; late answers report no match.
    assert!(!service.validate(5, 50, 0).await);

    // The unban request follows once the temporary ban runs out.
    match next_event(&mut rx).await {
        GuardEvent::Action(ActionRequest::UnbanUser { chat_id, user_id }) => {
            assert_eq!((chat_id, user_id), (5, 50));
        }
        other => panic!("expected unban, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_sweep_catches_challenge_whose_timer_never_fired() -> Result<(), Error> {
    let config = CaptchaConfig {
        // Timer armed far in the future; only the sweep can expire it.
        expiry: Duration::from_secs(3600),
        sweep_grace: Duration::from_millis(80),
        sweep_interval: Duration::from_secs(3600),
        temp_ban: Duration::from_secs(1200),
        options_per_challenge: 8,
    };
    let (service, bus, _db) = setup_captcha(config).await?;
    let mut rx = bus.subscribe(None).await;

    service.create_challenge(6, 60, None).await?;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(service.ban_expired_challenges().await, 1);
    assert!(service.challenge_for(6, 60).is_none());
    // Idempotent: a second sweep finds nothing.
    assert_eq!(service.ban_expired_challenges().await, 0);

    let mut expired_seen = false;
    for _ in 0..2 {
        if let GuardEvent::CaptchaExpired { chat_id, user_id } = next_event(&mut rx).await {
            assert_eq!((chat_id, user_id), (6, 60));
            expired_seen = true;
            break;
        }
    }
    assert!(expired_seen);
    Ok(())
}

#[tokio::test]
async fn test_reload_rearms_live_challenge() -> Result<(), Error> {
    let (first, _bus, db) = setup_captcha(long_config()).await?;
    let created = first.create_challenge(7, 70, Some(333)).await?;

    let (second, _bus2) = captcha_over(&db, long_config());
    assert_eq!(second.load().await?, 1);

    let reloaded = second.challenge_for(7, 70).expect("challenge after reload");
    assert_eq!(reloaded.correct_index, created.correct_index);
    assert_eq!(reloaded.join_message_id, Some(333));

    assert!(second.validate(7, 70, created.correct_index).await);
    Ok(())
}

#[tokio::test]
async fn test_reload_expires_challenge_that_ran_out_while_down() -> Result<(), Error> {
    let (first, _bus, db) = setup_captcha(long_config()).await?;
    first.create_challenge(8, 80, None).await?;
    tokio::time::sleep(Duration::from_millis(120)).await;

    let (second, bus2) = captcha_over(
        &db,
        CaptchaConfig {
            expiry: Duration::from_millis(80),
            sweep_grace: Duration::from_millis(160),
            sweep_interval: Duration::from_secs(3600),
            temp_ban: Duration::from_secs(1200),
            options_per_challenge: 8,
        },
    );
    let mut rx = bus2.subscribe(None).await;

    // Too old for the new deadline: expired during load, not re-armed.
    assert_eq!(second.load().await?, 0);
    assert!(second.challenge_for(8, 80).is_none());

    let mut expired_seen = false;
    for _ in 0..3 {
        if let GuardEvent::CaptchaExpired { chat_id, user_id } = next_event(&mut rx).await {
            assert_eq!((chat_id, user_id), (8, 80));
            expired_seen = true;
            break;
        }
    }
    assert!(expired_seen);

    // The row is gone for good: a fresh reload has nothing to re-arm.
    let (third, _bus3) = captcha_over(&db, long_config());
    assert_eq!(third.load().await?, 0);
    Ok(())
}
