//! End-to-end scenarios for admission and the match lifecycle, run against the
//! in-memory rules without a database.

use chrono::Utc;
use tennis_tournament::matches::{Match, MatchRound, MatchStatus, StatusAction};
use tennis_tournament::tournament::{
    AdmissionPolicy, AdmissionRejection, Tournament, TournamentFormat, TournamentStatus,
};

fn open_tournament(max_participants: i32) -> Tournament {
    let now = Utc::now();
    Tournament {
        id: 1,
        organizer_id: 1,
        name: "Two Player Open".to_string(),
        description: Some("Scenario fixture".to_string()),
        format: TournamentFormat::SingleElimination,
        status: TournamentStatus::RegistrationOpen,
        max_participants,
        entry_fee: 0,
        prize_pool: 0,
        registration_deadline: None,
        start_date: None,
        end_date: None,
        venue_name: None,
        venue_address: None,
        best_of_sets: 3,
        tiebreak_games: 6,
        match_duration_limit: None,
        is_public: true,
        allow_registration: true,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_open_tournament_admits_first_player() {
    let t = open_tournament(2);
    assert!(AdmissionPolicy::default().can_register(&t, 0, Utc::now()));
}

#[test]
fn test_tournament_with_two_confirmed_is_full() {
    let t = open_tournament(2);
    assert!(!AdmissionPolicy::default().can_register(&t, 2, Utc::now()));
    assert_eq!(
        AdmissionPolicy::default().check(&t, 2, Utc::now()),
        Err(AdmissionRejection::Full {
            confirmed: 2,
            capacity: 2
        })
    );
}

#[test]
fn test_disallowed_registration_is_rejected() {
    let mut t = open_tournament(2);
    t.allow_registration = false;
    assert!(!AdmissionPolicy::default().can_register(&t, 0, Utc::now()));
}

#[test]
fn test_forfeit_by_player1_before_start() {
    let mut game = Match::scheduled(1, 1, MatchRound::Final, 10, Some(20));

    game.forfeit(10, Utc::now()).unwrap();

    assert_eq!(game.status, MatchStatus::Forfeit);
    assert_eq!(game.winner_id, Some(20));
    assert_eq!(game.forfeit_by, Some(10));
}

#[test]
fn test_restart_of_completed_match_is_rejected() {
    let mut game = Match::scheduled(1, 1, MatchRound::Final, 10, Some(20));
    game.apply(StatusAction::Start, Utc::now()).unwrap();
    game.apply(StatusAction::Complete { winner_id: 20 }, Utc::now())
        .unwrap();
    let before = game.clone();

    assert!(game.start(Utc::now()).is_err());
    assert_eq!(game, before);
}

#[test]
fn test_full_match_lifecycle() {
    let mut game = Match::scheduled(3, 1, MatchRound::QuarterFinal, 10, Some(20));

    assert!(game.complete(10, Utc::now()).is_err());
    game.start(Utc::now()).unwrap();
    assert!(game.start(Utc::now()).is_err());
    game.complete(10, Utc::now()).unwrap();

    assert_eq!(game.status, MatchStatus::Completed);
    assert_eq!(game.winner_id, Some(10));
    assert!(game.started_at <= game.completed_at);
    assert!(game.forfeit(20, Utc::now()).is_err());
}
