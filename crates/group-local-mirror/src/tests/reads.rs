use group_types::{GroupError, GroupId, JoinRequest, Outcome, UserId};

use super::{request, tomorrow_at_seven, user_ids, World};
use crate::MirrorStore;

#[tokio::test]
async fn remote_participants_replace_stale_local_list() {
    let world = World::new();
    let alice = world.device("alice");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();
    let id = created.group.id.clone();

    // Bob joins behind alice's back.
    world
        .coordinator
        .join(&id, &UserId::from("bob"), &JoinRequest::default())
        .unwrap();
    assert_eq!(user_ids(&alice.cached(&id).unwrap().unwrap().participants), vec!["alice"]);

    let read = alice.get_group(&id).await.unwrap();
    assert!(!read.is_cached());
    let remote = world.coordinator.group(&id).unwrap();
    assert_eq!(read.value.participants, remote.participants);
    assert_eq!(
        alice.cached(&id).unwrap().unwrap().participants,
        remote.participants
    );
    assert_eq!(read.value.outcome, Outcome::Created);
    assert!(read.value.is_joined);
}

#[tokio::test]
async fn fetched_list_wins_over_local_join_flag() {
    let world = World::new();
    let alice = world.device("alice");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();
    let id = created.group.id.clone();
    assert!(created.is_joined);

    world.coordinator.leave(&id, &UserId::from("alice")).unwrap();

    let read = alice.get_group(&id).await.unwrap();
    assert!(!read.value.is_joined);
    assert!(read.value.participants.is_empty());
}

#[tokio::test]
async fn first_read_of_unseen_group_is_pending_and_not_joined() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    let read = bob.get_group(&created.group.id).await.unwrap();
    assert_eq!(read.value.outcome, Outcome::Pending);
    assert!(!read.value.is_joined);
    assert!(bob.cached(&created.group.id).unwrap().is_some());
}

#[tokio::test]
async fn transient_failure_serves_cached_entry_with_warning() {
    let world = World::new();
    let alice = world.device("alice");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    world.go_offline();
    let read = alice.get_group(&created.group.id).await.unwrap();
    assert!(read.is_cached());
    assert!(matches!(read.warning, Some(GroupError::Transient(_))));
    assert_eq!(read.value, created);
}

#[tokio::test]
async fn server_error_serves_cached_entry_with_warning() {
    let world = World::new();
    let alice = world.device("alice");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    let failure = GroupError::Internal("500: database is locked".to_string());
    world.fail_with(failure.clone());
    let read = alice.get_group(&created.group.id).await.unwrap();
    assert_eq!(read.warning, Some(failure.clone()));
    assert_eq!(read.value, created);

    let upcoming = alice.upcoming().await.unwrap();
    assert_eq!(upcoming.warning, Some(failure));
    assert_eq!(upcoming.value, vec![created.group]);
}

#[tokio::test]
async fn server_error_without_cache_is_hard() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    world.fail_with(GroupError::Internal("500".to_string()));
    let err = bob.get_group(&created.group.id).await.unwrap_err();
    assert_eq!(err, GroupError::Internal("500".to_string()));
}

#[tokio::test]
async fn transient_failure_without_cache_is_hard() {
    let world = World::new();
    let alice = world.device("alice");
    let bob = world.device("bob");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    world.go_offline();
    let err = bob.get_group(&created.group.id).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn not_found_is_not_masked_by_cache() {
    let world = World::new();
    let alice = world.device("alice");
    let created = alice
        .create_or_match(&request("easy", tomorrow_at_seven()))
        .await
        .unwrap();

    // An entry the server has never heard of.
    let mut ghost = created.clone();
    ghost.group.id = GroupId::from("ghost");
    alice.mirror().put(&ghost).unwrap();

    let err = alice.get_group(&GroupId::from("ghost")).await.unwrap_err();
    assert_eq!(err, GroupError::NotFound(GroupId::from("ghost")));
    // Pruning is left to the user.
    assert!(alice.cached(&GroupId::from("ghost")).unwrap().is_some());
    assert!(alice.forget(&GroupId::from("ghost")).unwrap());
    assert!(alice.cached(&GroupId::from("ghost")).unwrap().is_none());
}
