//! Review service running against SQLite

use std::sync::Arc;

use roster_core::{Error, PrStatus, ReviewService, RngSource, Team, User};
use roster_db::{Database, DatabaseConfig};
use tempfile::TempDir;

async fn setup(max_connections: u32) -> (ReviewService, Database, TempDir) {
    let temp = TempDir::new().unwrap();
    let config = DatabaseConfig::new(temp.path().join("roster.db")).with_max_connections(max_connections);
    let db = Database::connect(config).await.unwrap();
    db.migrate().await.unwrap();

    let service = ReviewService::new(
        Arc::new(db.teams()),
        Arc::new(db.users()),
        Arc::new(db.pull_requests()),
    )
    .with_rng_source(RngSource::seeded(42));

    let team = Team::new("backend")
        .with_member(User::new("author", "Author", ""))
        .with_member(User::new("a", "Ann", ""))
        .with_member(User::new("b", "Ben", ""))
        .with_member(User::new("c", "Cat", ""));
    service.create_team(team).await.unwrap();

    (service, db, temp)
}

#[tokio::test]
async fn test_pull_request_lifecycle() {
    let (service, _db, _temp) = setup(5).await;

    let pr = service
        .create_pull_request("pr-1", "Add search", "author")
        .await
        .unwrap();
    assert_eq!(pr.status, PrStatus::Open);
    assert_eq!(pr.reviewers.len(), 2);
    assert!(!pr.has_reviewer("author"));

    let old = pr.reviewers[0].clone();
    let (updated, new) = service.reassign_reviewer("pr-1", &old).await.unwrap();
    assert_ne!(new, old);
    assert_ne!(new, "author");
    assert!(!pr.has_reviewer(&new));
    assert_eq!(updated.reviewers[0], new);
    assert_eq!(updated.reviewers[1], pr.reviewers[1]);

    let reloaded = service.get_user_reviews(&new).await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].id, "pr-1");
    assert!(service.get_user_reviews(&old).await.unwrap().is_empty());

    let merged = service.merge_pull_request("pr-1").await.unwrap();
    assert_eq!(merged.status, PrStatus::Merged);
    assert_eq!(merged.reviewers, updated.reviewers);

    let again = service.merge_pull_request("pr-1").await.unwrap();
    assert_eq!(again.merged_at, merged.merged_at);

    let err = service.reassign_reviewer("pr-1", &new).await.unwrap_err();
    assert!(matches!(err, Error::PrMerged(_)));
}

#[tokio::test]
async fn test_inactive_users_are_not_assigned() {
    let (service, _db, _temp) = setup(5).await;
    service.set_user_active("a", false).await.unwrap();
    service.set_user_active("b", false).await.unwrap();

    let pr = service
        .create_pull_request("pr-1", "Solo review", "author")
        .await
        .unwrap();
    assert_eq!(pr.reviewers, vec!["c"]);

    let err = service.reassign_reviewer("pr-1", "c").await.unwrap_err();
    assert!(matches!(err, Error::NoCandidate(_)));

    service.set_user_active("c", false).await.unwrap();
    let err = service
        .create_pull_request("pr-2", "Nobody home", "author")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoCandidate(_)));
    assert!(service.get_user_reviews("c").await.unwrap().len() == 1);
}

#[tokio::test]
async fn test_duplicate_ids_are_rejected() {
    let (service, _db, _temp) = setup(5).await;

    service
        .create_pull_request("pr-1", "First", "author")
        .await
        .unwrap();
    let err = service
        .create_pull_request("pr-1", "Second", "a")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PrExists(_)));

    let err = service
        .create_team(Team::new("backend"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TeamExists(_)));
    assert_eq!(service.get_team("backend").await.unwrap().members.len(), 4);
}

#[tokio::test]
async fn test_unknown_entities() {
    let (service, _db, _temp) = setup(5).await;

    assert!(matches!(
        service.create_pull_request("pr-1", "x", "ghost").await.unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        service.merge_pull_request("pr-9").await.unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        service.reassign_reviewer("pr-9", "a").await.unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        service.get_user_reviews("ghost").await.unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        service.get_team("frontend").await.unwrap_err(),
        Error::NotFound(_)
    ));
}

#[tokio::test]
async fn test_reassigning_a_non_reviewer() {
    let (service, _db, _temp) = setup(5).await;
    let pr = service
        .create_pull_request("pr-1", "Feature", "author")
        .await
        .unwrap();
    let outsider = ["a", "b", "c"]
        .into_iter()
        .find(|id| !pr.has_reviewer(id))
        .unwrap();

    let err = service.reassign_reviewer("pr-1", outsider).await.unwrap_err();
    assert!(matches!(err, Error::NotAssigned { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reassignments_apply_once() {
    // One connection serializes the write transactions
    let (service, db, _temp) = setup(1).await;
    let service = Arc::new(service);

    // A wider team so that every racer has someone to pick
    let extra = Team::new("platform")
        .with_member(User::new("d", "Dan", ""))
        .with_member(User::new("e", "Eve", ""));
    service.create_team(extra).await.unwrap();
    for id in ["d", "e"] {
        sqlx::query("UPDATE users SET team_name = 'backend' WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    let pr = service
        .create_pull_request("pr-1", "Race", "author")
        .await
        .unwrap();
    let target = pr.reviewers[0].clone();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            let target = target.clone();
            tokio::spawn(async move { service.reassign_reviewer("pr-1", &target).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(Error::Conflict(_)) | Err(Error::NotAssigned { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    let stored = service.get_user_reviews(&target).await.unwrap();
    assert!(stored.is_empty());
}
