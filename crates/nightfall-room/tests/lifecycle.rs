//! Integration tests for the room lifecycle over the in-memory store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use nightfall_protocol::{Role, RoomCode, RoomPhase, Settings, UserId, Username};
use nightfall_room::{
    CodeGenerator, ErrorKind, LifecycleConfig, RoleAssigner, RoomError, RoomKey, RoomLifecycle,
};
use nightfall_store::{MemoryRoomStore, RoomStore};

// =========================================================================
// Helpers
// =========================================================================

fn uid(s: &str) -> UserId {
    UserId::new(s)
}

fn name(s: &str) -> Username {
    Username::new(s)
}

fn lifecycle() -> RoomLifecycle<MemoryRoomStore> {
    RoomLifecycle::new(MemoryRoomStore::new())
}

fn settings(werewolf_ratio: f64, owner_is_playing: bool) -> Settings {
    Settings {
        werewolf_ratio,
        owner_is_playing,
    }
}

/// Hands out a fixed list of codes, then repeats the last one.
struct ScriptedCodes(Mutex<VecDeque<&'static str>>);

impl ScriptedCodes {
    fn new(codes: &[&'static str]) -> Self {
        Self(Mutex::new(codes.iter().copied().collect()))
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&self) -> RoomCode {
        let mut codes = self.0.lock().unwrap();
        let code = if codes.len() > 1 {
            codes.pop_front().unwrap()
        } else {
            *codes.front().unwrap()
        };
        RoomCode::new(code)
    }
}

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test]
async fn test_lobby_to_round_and_back() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    assert_eq!(room.code.as_str().len(), 6);
    assert_eq!(room.owner_id, uid("O"));
    assert!(room.players.is_empty());
    assert_eq!(room.phase(), RoomPhase::Lobby);

    rooms.join_room(&room.code, &uid("A"), &name("Alice")).await.unwrap();
    rooms.join_room(&room.code, &uid("B"), &name("Bob")).await.unwrap();
    rooms.join_room(&room.code, &uid("C"), &name("Cara")).await.unwrap();

    let started = rooms
        .start_game(&uid("O"), settings(0.25, true))
        .await
        .unwrap();
    assert_eq!(started.phase(), RoomPhase::Active);
    assert_eq!(started.players.len(), 4);
    assert_eq!(started.count_role(Role::Werewolf), 1);
    assert_eq!(started.count_role(Role::Villager), 3);
    assert_eq!(
        rooms.get_players(&room.code).await.unwrap(),
        vec![uid("A"), uid("B"), uid("C"), uid("O")]
    );

    let alice = rooms.get_role(&uid("A")).await.unwrap();
    assert_eq!(Some(alice), started.player(&uid("A")).unwrap().role);

    let ended = rooms.end_game(&uid("O")).await.unwrap();
    assert_eq!(ended.phase(), RoomPhase::Lobby);
    assert_eq!(ended.player_ids(), vec![uid("A"), uid("B"), uid("C")]);
    assert!(ended.players.iter().all(|p| p.role.is_none()));

    let err = rooms.get_role(&uid("A")).await.unwrap_err();
    assert!(matches!(err, RoomError::GameNotStarted(_)));
}

#[tokio::test]
async fn test_join_room_duplicate_username_across_rooms_rejected() {
    let rooms = lifecycle();
    let first = rooms.create_room(&uid("O1"), &name("Olive")).await.unwrap();
    let second = rooms.create_room(&uid("O2"), &name("Otto")).await.unwrap();
    rooms.join_room(&first.code, &uid("A"), &name("Alice")).await.unwrap();

    let err = rooms
        .join_room(&second.code, &uid("Z"), &name("Alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::UsernameTaken(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(rooms.get_players(&second.code).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_room_during_round_rejected() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    rooms.join_room(&room.code, &uid("A"), &name("Alice")).await.unwrap();
    rooms.start_game(&uid("O"), Settings::default()).await.unwrap();

    let err = rooms
        .join_room(&room.code, &uid("D"), &name("Dan"))
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::GameInProgress(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(rooms.get_players(&room.code).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_role_non_playing_owner_game_not_started() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    rooms.join_room(&room.code, &uid("A"), &name("Alice")).await.unwrap();
    rooms.join_room(&room.code, &uid("B"), &name("Bob")).await.unwrap();

    let started = rooms
        .start_game(&uid("O"), settings(0.5, false))
        .await
        .unwrap();
    assert_eq!(started.player_ids(), vec![uid("A"), uid("B")]);
    assert_eq!(started.count_role(Role::Werewolf), 1);

    let err = rooms.get_role(&uid("O")).await.unwrap_err();
    assert!(matches!(err, RoomError::GameNotStarted(_)));

    // Ending leaves the roster alone when the owner never played.
    let ended = rooms.end_game(&uid("O")).await.unwrap();
    assert_eq!(ended.player_ids(), vec![uid("A"), uid("B")]);
}

#[tokio::test]
async fn test_start_game_owner_username_taken_wraps_failure() {
    let rooms = lifecycle();
    let other = rooms.create_room(&uid("X"), &name("Xena")).await.unwrap();
    rooms.join_room(&other.code, &uid("P"), &name("Olive")).await.unwrap();
    rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();

    let err = rooms
        .start_game(&uid("O"), settings(0.5, true))
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::OwnerJoinFailed(_)));
    assert!(matches!(err.inner(), Some(RoomError::UsernameTaken(_))));
    assert_eq!(err.kind(), ErrorKind::DependentOperationFailed);

    // Settings were written before the join failed; the round did not start.
    let room = rooms.get_owned_room(&uid("O")).await.unwrap();
    assert_eq!(room.settings, settings(0.5, true));
    assert_eq!(room.phase(), RoomPhase::Lobby);
    assert!(room.players.is_empty());
}

// =========================================================================
// Lookups and deletion
// =========================================================================

#[tokio::test]
async fn test_create_room_second_room_for_owner_rejected() {
    let rooms = lifecycle();
    rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();

    let err = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap_err();
    assert!(matches!(err, RoomError::OwnerAlreadyHasRoom(_)));
    assert_eq!(rooms.store().len().await, 1);
}

#[tokio::test]
async fn test_lookups_round_trip() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();

    assert_eq!(rooms.get_owner(&room.code).await.unwrap(), uid("O"));
    assert_eq!(rooms.get_owned_room(&uid("O")).await.unwrap(), room);
    assert!(rooms.get_players(&room.code).await.unwrap().is_empty());

    let missing = RoomCode::new("zzzzzz");
    assert!(matches!(
        rooms.get_owner(&missing).await.unwrap_err(),
        RoomError::RoomNotFound(RoomKey::Code(_))
    ));
    assert!(matches!(
        rooms.get_owned_room(&uid("nobody")).await.unwrap_err(),
        RoomError::RoomNotFound(RoomKey::Owner(_))
    ));
}

#[tokio::test]
async fn test_delete_room_mid_round_frees_everything() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    rooms.join_room(&room.code, &uid("A"), &name("Alice")).await.unwrap();
    rooms.start_game(&uid("O"), Settings::default()).await.unwrap();

    let deleted = rooms.delete_room(&room.code).await.unwrap();
    assert_eq!(deleted.code, room.code);
    assert!(rooms.store().is_empty().await);

    let err = rooms.delete_room(&room.code).await.unwrap_err();
    assert!(matches!(err, RoomError::RoomNotFound(_)));

    // Owner and players are free again.
    let again = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    rooms.join_room(&again.code, &uid("A"), &name("Alice")).await.unwrap();
}

#[tokio::test]
async fn test_leave_room_mid_round_allowed() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    rooms.join_room(&room.code, &uid("A"), &name("Alice")).await.unwrap();
    rooms.join_room(&room.code, &uid("B"), &name("Bob")).await.unwrap();
    rooms.start_game(&uid("O"), Settings::default()).await.unwrap();

    let after = rooms.leave_room(&uid("B")).await.unwrap();
    assert_eq!(after.player_ids(), vec![uid("A"), uid("O")]);
    assert!(matches!(
        rooms.get_role(&uid("B")).await.unwrap_err(),
        RoomError::NotInRoom(_)
    ));
}

#[tokio::test]
async fn test_end_game_owner_already_left_still_ends() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    rooms.join_room(&room.code, &uid("A"), &name("Alice")).await.unwrap();
    rooms.start_game(&uid("O"), Settings::default()).await.unwrap();
    rooms.leave_room(&uid("O")).await.unwrap();

    let ended = rooms.end_game(&uid("O")).await.unwrap();
    assert_eq!(ended.phase(), RoomPhase::Lobby);
    assert_eq!(ended.player_ids(), vec![uid("A")]);
}

#[tokio::test]
async fn test_end_game_in_lobby_not_in_progress() {
    let rooms = lifecycle();
    rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();

    let err = rooms.end_game(&uid("O")).await.unwrap_err();
    assert!(matches!(err, RoomError::NotInProgress(_)));
    assert!(matches!(
        rooms.end_game(&uid("nobody")).await.unwrap_err(),
        RoomError::RoomNotFound(_)
    ));
}

#[tokio::test]
async fn test_join_room_twice_already_in_room() {
    let rooms = lifecycle();
    let first = rooms.create_room(&uid("O1"), &name("Olive")).await.unwrap();
    let second = rooms.create_room(&uid("O2"), &name("Otto")).await.unwrap();
    rooms.join_room(&first.code, &uid("A"), &name("Alice")).await.unwrap();

    let err = rooms
        .join_room(&second.code, &uid("A"), &name("Alicia"))
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInRoom(_)));
}

// =========================================================================
// Roles
// =========================================================================

#[tokio::test]
async fn test_get_role_is_stable_within_round() {
    let rooms = lifecycle();
    let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
    for i in 0..7 {
        rooms
            .join_room(&room.code, &uid(&format!("p{i}")), &name(&format!("player{i}")))
            .await
            .unwrap();
    }
    rooms.start_game(&uid("O"), Settings::default()).await.unwrap();

    for i in 0..7 {
        let user = uid(&format!("p{i}"));
        let first = rooms.get_role(&user).await.unwrap();
        let second = rooms.get_role(&user).await.unwrap();
        assert_eq!(first, second);
    }
    assert!(matches!(
        rooms.get_role(&uid("stranger")).await.unwrap_err(),
        RoomError::NotInRoom(_)
    ));
}

#[tokio::test]
async fn test_start_game_werewolf_count_matches_ratio() {
    for (joiners, ratio, owner_plays) in [(0, 0.99, true), (4, 0.25, false), (7, 0.25, true), (9, 0.5, true)] {
        let rooms = lifecycle();
        let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
        for i in 0..joiners {
            rooms
                .join_room(&room.code, &uid(&format!("p{i}")), &name(&format!("player{i}")))
                .await
                .unwrap();
        }

        let started = rooms
            .start_game(&uid("O"), settings(ratio, owner_plays))
            .await
            .unwrap();
        let expected = RoleAssigner::werewolf_count(started.players.len(), ratio);
        assert_eq!(started.count_role(Role::Werewolf), expected);
        assert_eq!(
            started.count_role(Role::Villager),
            started.players.len() - expected
        );
    }
}

// =========================================================================
// Code collisions
// =========================================================================

#[tokio::test]
async fn test_create_room_retries_on_code_collision() {
    let rooms = RoomLifecycle::with_generator(
        MemoryRoomStore::new(),
        ScriptedCodes::new(&["AAAAAA", "AAAAAA", "BBBBBB"]),
        LifecycleConfig::default(),
    );

    let first = rooms.create_room(&uid("O1"), &name("Olive")).await.unwrap();
    let second = rooms.create_room(&uid("O2"), &name("Otto")).await.unwrap();
    assert_eq!(first.code, RoomCode::new("AAAAAA"));
    assert_eq!(second.code, RoomCode::new("BBBBBB"));
}

#[tokio::test]
async fn test_create_room_exhausted_retries() {
    let config = LifecycleConfig {
        max_code_attempts: 3,
        ..LifecycleConfig::default()
    };
    let rooms = RoomLifecycle::with_generator(
        MemoryRoomStore::new(),
        ScriptedCodes::new(&["AAAAAA"]),
        config,
    );
    rooms.create_room(&uid("O1"), &name("Olive")).await.unwrap();

    let err = rooms.create_room(&uid("O2"), &name("Otto")).await.unwrap_err();
    assert!(matches!(err, RoomError::ExhaustedRetries { attempts: 3 }));
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(rooms.store().len().await, 1);
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_same_username_one_wins() {
    let rooms = Arc::new(lifecycle());
    let first = rooms.create_room(&uid("O1"), &name("Olive")).await.unwrap();
    let second = rooms.create_room(&uid("O2"), &name("Otto")).await.unwrap();

    let mut handles = Vec::new();
    for (i, code) in [first.code.clone(), second.code.clone()].into_iter().cycle().take(8).enumerate() {
        let rooms = Arc::clone(&rooms);
        handles.push(tokio::spawn(async move {
            rooms
                .join_room(&code, &uid(&format!("u{i}")), &name("Same"))
                .await
        }));
    }

    let mut joined = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => joined += 1,
            Err(err) => assert!(matches!(err, RoomError::UsernameTaken(_)), "{err}"),
        }
    }
    assert_eq!(joined, 1);

    let store = rooms.store();
    let holder = store.find_by_player_username(&name("Same")).await.unwrap();
    assert!(holder.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_join_and_start_never_leaves_roleless_player() {
    for _ in 0..20 {
        let rooms = Arc::new(lifecycle());
        let room = rooms.create_room(&uid("O"), &name("Olive")).await.unwrap();
        rooms.join_room(&room.code, &uid("A"), &name("Alice")).await.unwrap();

        let joiner = {
            let rooms = Arc::clone(&rooms);
            let code = room.code.clone();
            tokio::spawn(async move { rooms.join_room(&code, &uid("B"), &name("Bob")).await })
        };
        let starter = {
            let rooms = Arc::clone(&rooms);
            tokio::spawn(async move { rooms.start_game(&uid("O"), settings(0.5, false)).await })
        };

        let joined = joiner.await.unwrap();
        starter.await.unwrap().unwrap();

        let room = rooms.get_owned_room(&uid("O")).await.unwrap();
        assert_eq!(room.phase(), RoomPhase::Active);
        assert!(room.players.iter().all(|p| p.role.is_some()));
        match joined {
            Ok(_) => assert!(room.has_player(&uid("B"))),
            Err(err) => {
                assert!(matches!(err, RoomError::GameInProgress(_)), "{err}");
                assert!(!room.has_player(&uid("B")));
            }
        }
    }
}
