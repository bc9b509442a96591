use chrono::Duration;
use group_types::{GroupError, GroupStatus, JoinRequest, Outcome, UserId};

use super::{request, tomorrow_at_seven, user_ids, World};
use crate::MirrorStore;

#[tokio::test]
async fn create_then_match_records_outcomes() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let t = tomorrow_at_seven();

    let created = alice.create_or_match(&request("easy", t)).await.unwrap();
    assert_eq!(created.outcome, Outcome::Created);
    assert!(created.is_joined);

    let matched = bob
        .create_or_match(&request("easy", t + Duration::minutes(20)))
        .await
        .unwrap();
    assert_eq!(matched.outcome, Outcome::Matched);
    assert_eq!(matched.group.id, created.group.id);
    assert_eq!(user_ids(&matched.participants), vec!["alice", "bob"]);
    assert_eq!(bob.cached(&matched.group.id).unwrap(), Some(matched));
}

#[tokio::test]
async fn join_writes_server_view() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    let joined = bob
        .join(&created.group.id, &JoinRequest::default())
        .await
        .unwrap();
    assert!(joined.is_joined);
    assert_eq!(joined.outcome, Outcome::Matched);
    assert_eq!(user_ids(&joined.participants), vec!["alice", "bob"]);
}

#[tokio::test]
async fn rejected_join_leaves_mirror_untouched() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();
    let id = created.group.id.clone();
    let before = bob.get_group(&id).await.unwrap().value;

    world.coordinator.cancel(&id).unwrap();
    let err = bob.join(&id, &JoinRequest::default()).await.unwrap_err();
    assert_eq!(err, GroupError::Terminal(id.clone()));
    assert_eq!(bob.cached(&id).unwrap(), Some(before));
}

#[tokio::test]
async fn offline_write_fails_without_local_mutation() {
    let world = World::new();
    let alice = world.device("alice");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    world.go_offline();
    let err = alice.leave(&created.group.id).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(alice.cached(&created.group.id).unwrap(), Some(created));
}

#[tokio::test]
async fn leave_clears_membership_locally() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();
    let id = created.group.id.clone();
    bob.join(&id, &JoinRequest::default()).await.unwrap();

    let after = bob.leave(&id).await.unwrap().unwrap();
    assert!(!after.is_joined);
    assert_eq!(user_ids(&after.participants), vec!["alice"]);
    assert!(after.updated_at >= created.updated_at);
    assert!(!world
        .coordinator
        .group(&id)
        .unwrap()
        .is_joined(&UserId::from("bob")));

    // No entry to update.
    let carol = world.device("carol");
    assert!(carol.leave(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn upcoming_refreshes_known_entries_only() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let t = tomorrow_at_seven();
    let mine = alice.create_or_match(&request("easy", t)).await.unwrap();
    bob.create_or_match(&request("tempo", t + Duration::hours(1)))
        .await
        .unwrap();

    world.coordinator.cancel(&mine.group.id).unwrap();

    let upcoming = alice.upcoming().await.unwrap();
    assert!(!upcoming.is_cached());
    assert_eq!(upcoming.value.len(), 2);
    assert_eq!(upcoming.value[0].id, mine.group.id);

    let entries = alice.mirror().list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].group.status, GroupStatus::Cancelled);
}

#[tokio::test]
async fn upcoming_falls_back_to_cache_offline() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let t = tomorrow_at_seven();
    let later = alice
        .create_or_match(&request("long", t + Duration::hours(2)))
        .await
        .unwrap();
    let sooner = alice.create_or_match(&request("easy", t)).await.unwrap();

    world.go_offline();
    let upcoming = alice.upcoming().await.unwrap();
    assert!(upcoming.is_cached());
    let ids: Vec<_> = upcoming.value.iter().map(|g| g.id.clone()).collect();
    assert_eq!(ids, vec![sooner.group.id, later.group.id]);

    assert!(bob.upcoming().await.unwrap_err().is_retryable());
}
