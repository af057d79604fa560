use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use mockall::mock;
use std::sync::Arc;

use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::handlers::SignInGate;
use crate::application::commands::sign_in_commands::SignInCommand;
use attendance_domain::clock::FixedClock;
use attendance_domain::session::Session;
use attendance_domain::shared::DomainError;
use attendance_domain::sign_in::{
    SignInKey, SignInOutcome, SignInRecord, SignInScope, SignInStore, PERSISTENCE_FAILURE_MESSAGE,
};
use attendance_infrastructure::persistence::repositories::InMemorySignInStore;

mock! {
    pub Store {}

    #[async_trait]
    impl SignInStore for Store {
        async fn exists(&self, key: &SignInKey) -> Result<bool, DomainError>;
        async fn insert(&self, key: &SignInKey, record: &SignInRecord) -> Result<(), DomainError>;
        async fn find(&self, key: &SignInKey) -> Result<Option<SignInRecord>, DomainError>;
        async fn find_all(&self) -> Result<Vec<(SignInKey, SignInRecord)>, DomainError>;
        async fn clear(&self) -> Result<u64, DomainError>;
    }
}

/// Store that yields to the scheduler after every existence check, so
/// concurrent requests interleave between `exists` and `insert`
struct YieldingStore {
    inner: InMemorySignInStore,
}

#[async_trait]
impl SignInStore for YieldingStore {
    async fn exists(&self, key: &SignInKey) -> Result<bool, DomainError> {
        let exists = self.inner.exists(key).await;
        tokio::task::yield_now().await;
        exists
    }

    async fn insert(&self, key: &SignInKey, record: &SignInRecord) -> Result<(), DomainError> {
        self.inner.insert(key, record).await
    }

    async fn find(&self, key: &SignInKey) -> Result<Option<SignInRecord>, DomainError> {
        self.inner.find(key).await
    }

    async fn find_all(&self) -> Result<Vec<(SignInKey, SignInRecord)>, DomainError> {
        self.inner.find_all().await
    }

    async fn clear(&self) -> Result<u64, DomainError> {
        self.inner.clear().await
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn clock_at(hour: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::at(day(), hour, 0).unwrap())
}

fn gate_with(store: Arc<dyn SignInStore>, clock: Arc<FixedClock>) -> SignInGate {
    SignInGate::new(store, clock, SignInScope::Lifetime)
}

fn key(session: Session) -> SignInKey {
    SignInKey::from_string(session.as_str())
}

#[tokio::test]
async fn test_sign_in_for_current_session_commits() {
    let store = Arc::new(InMemorySignInStore::new());
    let gate = gate_with(store.clone(), clock_at(14));

    let result = gate.request_sign_in(Session::Afternoon).await;

    assert_eq!(
        result.outcome,
        SignInOutcome::Committed {
            session: Session::Afternoon
        }
    );
    let reply = result.reply();
    assert!(reply.success);
    assert_eq!(reply.message, "Successfully signed in for the afternoon session.");

    let record = result.record.expect("committed result carries the record");
    assert_eq!(record.session, Session::Afternoon);
    assert!(store.exists(&key(Session::Afternoon)).await.unwrap());
    assert_eq!(store.find(&key(Session::Afternoon)).await.unwrap(), Some(record));
}

#[tokio::test]
async fn test_scenario_a_second_sign_in_is_duplicate() {
    let store = Arc::new(InMemorySignInStore::new());
    let clock = clock_at(10);
    let gate = gate_with(store.clone(), clock.clone());

    let first = gate.request_sign_in(Session::Morning).await;
    assert!(first.reply().success);
    let stored = store.find(&key(Session::Morning)).await.unwrap();

    clock.advance(Duration::minutes(30));
    let second = gate.request_sign_in(Session::Morning).await;

    assert_eq!(
        second.reply().message,
        "You have already signed in for the morning session."
    );
    assert!(!second.reply().success);
    assert!(second.record.is_none());
    assert_eq!(store.find(&key(Session::Morning)).await.unwrap(), stored);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_scenario_b_future_session_rejected() {
    let store = Arc::new(InMemorySignInStore::new());
    let gate = gate_with(store.clone(), clock_at(10));

    let reply = gate.request_sign_in(Session::Night).await.reply();

    assert!(!reply.success);
    assert_eq!(
        reply.message,
        "You can't sign in for a future session. Please wait until the night session."
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_morning_clock_rejects_afternoon_as_future() {
    let store = Arc::new(InMemorySignInStore::new());
    let gate = gate_with(store.clone(), clock_at(9));

    let reply = gate.request_sign_in(Session::Afternoon).await.reply();

    assert!(!reply.success);
    assert!(reply.message.contains("future session"));
    assert!(reply.message.contains("afternoon"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_scenario_c_past_session_names_current() {
    let store = Arc::new(InMemorySignInStore::new());
    let gate = gate_with(store.clone(), clock_at(19));

    let reply = gate.request_sign_in(Session::Morning).await.reply();

    assert!(!reply.success);
    assert_eq!(
        reply.message,
        "You can only sign in for the night session at this time."
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_temporal_rejection_never_touches_store() {
    let mut store = MockStore::new();
    store.expect_exists().never();
    store.expect_insert().never();

    let gate = gate_with(Arc::new(store), clock_at(13));
    let result = gate.request_sign_in(Session::Morning).await;

    assert_eq!(
        result.outcome,
        SignInOutcome::OutsideWindow {
            current: Session::Afternoon
        }
    );
}

#[tokio::test]
async fn test_unknown_label_names_current_session_without_store_access() {
    let mut store = MockStore::new();
    store.expect_exists().never();
    store.expect_insert().never();

    let gate = gate_with(Arc::new(store), clock_at(19));

    for label in ["evening", "Morning", "", "null"] {
        let result = gate.request_sign_in_label(label).await;
        assert_eq!(
            result.outcome,
            SignInOutcome::OutsideWindow {
                current: Session::Night
            }
        );
        assert_eq!(
            result.reply().message,
            "You can only sign in for the night session at this time."
        );
    }
}

#[tokio::test]
async fn test_known_label_goes_through_gate() {
    let store = Arc::new(InMemorySignInStore::new());
    let gate = gate_with(store.clone(), clock_at(10));

    assert!(gate.request_sign_in_label("morning").await.reply().success);
    assert_eq!(
        gate.request_sign_in_label("morning").await.outcome,
        SignInOutcome::Duplicate {
            session: Session::Morning
        }
    );
    assert!(gate
        .request_sign_in_label("night")
        .await
        .reply()
        .message
        .contains("future session"));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_rejections_are_idempotent() {
    let store = Arc::new(InMemorySignInStore::new());
    let gate = gate_with(store.clone(), clock_at(10));
    gate.request_sign_in(Session::Morning).await;
    let snapshot = store.find_all().await.unwrap();

    for requested in [Session::Morning, Session::Afternoon, Session::Night] {
        let first = gate.request_sign_in(requested).await.reply();
        for _ in 0..5 {
            assert_eq!(gate.request_sign_in(requested).await.reply(), first);
        }
        assert!(!first.success);
    }

    assert_eq!(store.find_all().await.unwrap(), snapshot);
}

#[tokio::test]
async fn test_exists_failure_becomes_generic_reply() {
    let mut store = MockStore::new();
    store
        .expect_exists()
        .times(1)
        .returning(|_| Err(DomainError::Repository("database is locked".to_string())));
    store.expect_insert().never();

    let gate = gate_with(Arc::new(store), clock_at(10));
    let result = gate.request_sign_in(Session::Morning).await;

    assert_eq!(result.outcome, SignInOutcome::PersistenceFailure);
    assert_eq!(result.reply().message, PERSISTENCE_FAILURE_MESSAGE);
    assert!(!result.reply().success);
}

#[tokio::test]
async fn test_insert_failure_becomes_generic_reply() {
    let mut store = MockStore::new();
    store.expect_exists().returning(|_| Ok(false));
    store
        .expect_insert()
        .times(1)
        .returning(|_, _| Err(DomainError::Repository("disk I/O error".to_string())));

    let gate = gate_with(Arc::new(store), clock_at(20));
    let result = gate.request_sign_in(Session::Night).await;

    assert_eq!(result.outcome, SignInOutcome::PersistenceFailure);
    assert!(result.record.is_none());
}

#[tokio::test]
async fn test_insert_conflict_is_reported_as_duplicate() {
    let mut store = MockStore::new();
    store.expect_exists().returning(|_| Ok(false));
    store
        .expect_insert()
        .withf(|key, record| key.as_str() == "night" && record.session == Session::Night)
        .returning(|key, _| Err(DomainError::Conflict(key.to_string())));

    let gate = gate_with(Arc::new(store), clock_at(22));
    let result = gate.request_sign_in(Session::Night).await;

    assert_eq!(
        result.outcome,
        SignInOutcome::Duplicate {
            session: Session::Night
        }
    );
}

#[tokio::test]
async fn test_concurrent_sign_ins_commit_once() {
    let store = Arc::new(YieldingStore {
        inner: InMemorySignInStore::new(),
    });
    let gate = gate_with(store.clone(), clock_at(10));

    let (first, second) = futures::join!(
        gate.request_sign_in(Session::Morning),
        gate.request_sign_in(Session::Morning)
    );

    let successes = [&first, &second]
        .iter()
        .filter(|r| r.outcome.is_success())
        .count();
    assert_eq!(successes, 1);

    let loser = if first.outcome.is_success() { &second } else { &first };
    assert_eq!(
        loser.outcome,
        SignInOutcome::Duplicate {
            session: Session::Morning
        }
    );
    assert_eq!(store.inner.len().await, 1);
}

#[tokio::test]
async fn test_lifetime_scope_blocks_next_day() {
    let store = Arc::new(InMemorySignInStore::new());
    let clock = clock_at(10);
    let gate = gate_with(store.clone(), clock.clone());

    assert!(gate.request_sign_in(Session::Morning).await.reply().success);

    clock.advance(Duration::days(1));
    let reply = gate.request_sign_in(Session::Morning).await.reply();
    assert!(!reply.success);
    assert!(reply.message.contains("already signed in"));
}

#[tokio::test]
async fn test_daily_scope_resets_next_day() {
    let store = Arc::new(InMemorySignInStore::new());
    let clock = clock_at(10);
    let gate = SignInGate::new(store.clone(), clock.clone(), SignInScope::Daily);

    assert!(gate.request_sign_in(Session::Morning).await.reply().success);
    assert!(!gate.request_sign_in(Session::Morning).await.reply().success);

    clock.advance(Duration::days(1));
    assert!(gate.request_sign_in(Session::Morning).await.reply().success);

    let keys: Vec<String> = store
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|(k, _)| k.to_string())
        .collect();
    assert_eq!(keys, vec!["2025-03-10:morning", "2025-03-11:morning"]);
}

#[tokio::test]
async fn test_command_handler_delegates_to_gate() {
    let store = Arc::new(InMemorySignInStore::new());
    let gate = gate_with(store, clock_at(18));

    let result = gate
        .handle(SignInCommand {
            session: Session::Night,
        })
        .await
        .unwrap();

    assert!(result.outcome.is_success());
    assert_eq!(gate.scope(), SignInScope::Lifetime);
}
