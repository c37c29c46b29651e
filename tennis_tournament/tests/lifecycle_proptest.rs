/// Property-based tests for the match lifecycle and registration admission
///
/// Transitions are checked from every status with arbitrary participants, and
/// admission against arbitrary capacities and confirmed counts.
use chrono::{Duration, Utc};
use proptest::prelude::*;
use tennis_tournament::matches::{Match, MatchRound, MatchStatus, StatusAction};
use tennis_tournament::tournament::{
    AdmissionPolicy, AdmissionRejection, Tournament, TournamentFormat, TournamentStatus,
};

fn status_strategy() -> impl Strategy<Value = MatchStatus> {
    prop_oneof![
        Just(MatchStatus::Scheduled),
        Just(MatchStatus::InProgress),
        Just(MatchStatus::Completed),
        Just(MatchStatus::Forfeit),
        Just(MatchStatus::Cancelled),
    ]
}

fn tournament_status_strategy() -> impl Strategy<Value = TournamentStatus> {
    prop_oneof![
        Just(TournamentStatus::Draft),
        Just(TournamentStatus::RegistrationOpen),
        Just(TournamentStatus::RegistrationClosed),
        Just(TournamentStatus::InProgress),
        Just(TournamentStatus::Completed),
        Just(TournamentStatus::Cancelled),
    ]
}

// Two distinct player ids plus an optional bye
fn match_strategy() -> impl Strategy<Value = Match> {
    (
        status_strategy(),
        1i64..1000,
        1i64..1000,
        any::<bool>(),
        proptest::option::of(1i64..1000),
    )
        .prop_filter("players must differ", |(_, p1, p2, _, _)| p1 != p2)
        .prop_map(|(status, p1, p2, bye, winner)| {
            let mut game =
                Match::scheduled(1, 1, MatchRound::RoundRobin, p1, (!bye).then_some(p2));
            game.status = status;
            game.winner_id = winner;
            game
        })
}

fn tournament(status: TournamentStatus, capacity: i32, allow: bool) -> Tournament {
    let now = Utc::now();
    Tournament {
        id: 1,
        organizer_id: 1,
        name: "Property Open".to_string(),
        description: None,
        format: TournamentFormat::RoundRobin,
        status,
        max_participants: capacity,
        entry_fee: 0,
        prize_pool: 0,
        registration_deadline: Some(now - Duration::days(1)),
        start_date: None,
        end_date: None,
        venue_name: None,
        venue_address: None,
        best_of_sets: 3,
        tiebreak_games: 6,
        match_duration_limit: None,
        is_public: true,
        allow_registration: allow,
        created_at: now,
        updated_at: now,
    }
}

proptest! {
    #[test]
    fn prop_start_succeeds_iff_scheduled(mut game in match_strategy()) {
        let before = game.clone();
        let result = game.start(Utc::now());

        prop_assert_eq!(result.is_ok(), before.status == MatchStatus::Scheduled);
        if result.is_ok() {
            prop_assert_eq!(game.status, MatchStatus::InProgress);
            prop_assert!(game.started_at.is_some());
        } else {
            prop_assert_eq!(game, before);
        }
    }

    #[test]
    fn prop_complete_succeeds_iff_in_progress(mut game in match_strategy(), winner in 1i64..2000) {
        let before = game.clone();
        let result = game.complete(winner, Utc::now());

        prop_assert_eq!(result.is_ok(), before.status == MatchStatus::InProgress);
        if result.is_ok() {
            prop_assert_eq!(game.status, MatchStatus::Completed);
            prop_assert_eq!(game.winner_id, Some(winner));
            prop_assert!(game.completed_at.is_some());
        } else {
            prop_assert_eq!(game, before);
        }
    }

    #[test]
    fn prop_forfeit_infers_winner(mut game in match_strategy(), outsider in 1000i64..2000, pick in 0usize..3) {
        let before = game.clone();
        let forfeiter = match pick {
            0 => before.player1_id,
            1 => before.player2_id.unwrap_or(outsider),
            _ => outsider,
        };
        let result = game.forfeit(forfeiter, Utc::now());

        let action = StatusAction::Forfeit { player_id: forfeiter };
        prop_assert_eq!(before.ensure_forfeiter(&action).is_ok(), before.is_participant(forfeiter));

        let allowed = matches!(before.status, MatchStatus::Scheduled | MatchStatus::InProgress);
        prop_assert_eq!(result.is_ok(), allowed);
        if !allowed {
            prop_assert_eq!(game, before);
            return Ok(());
        }

        prop_assert_eq!(game.status, MatchStatus::Forfeit);
        prop_assert_eq!(game.forfeit_by, Some(forfeiter));
        if forfeiter == before.player1_id {
            prop_assert_eq!(game.winner_id, before.player2_id);
        } else if Some(forfeiter) == before.player2_id {
            prop_assert_eq!(game.winner_id, Some(before.player1_id));
        } else {
            prop_assert_eq!(game.winner_id, before.winner_id);
        }
    }

    #[test]
    fn prop_terminal_states_reject_every_action(mut game in match_strategy(), id in 1i64..1000) {
        prop_assume!(matches!(
            game.status,
            MatchStatus::Completed | MatchStatus::Forfeit | MatchStatus::Cancelled
        ));
        let before = game.clone();

        for action in [
            StatusAction::Start,
            StatusAction::Complete { winner_id: id },
            StatusAction::Forfeit { player_id: id },
        ] {
            prop_assert!(game.apply(action, Utc::now()).is_err());
            prop_assert_eq!(&game, &before);
        }
    }

    #[test]
    fn prop_admission_matches_rules(
        status in tournament_status_strategy(),
        capacity in 1i32..64,
        confirmed in 0i64..80,
        allow in any::<bool>(),
    ) {
        let t = tournament(status, capacity, allow);
        let admitted = AdmissionPolicy::default().can_register(&t, confirmed, Utc::now());

        let expected = allow
            && matches!(status, TournamentStatus::Draft | TournamentStatus::RegistrationOpen)
            && confirmed < i64::from(capacity);
        prop_assert_eq!(admitted, expected);
    }

    #[test]
    fn prop_deadline_policy_only_narrows(
        capacity in 1i32..64,
        confirmed in 0i64..80,
    ) {
        let t = tournament(TournamentStatus::RegistrationOpen, capacity, true);
        let now = Utc::now();

        let lenient = AdmissionPolicy::default().check(&t, confirmed, now);
        let strict = AdmissionPolicy::new(true).check(&t, confirmed, now);

        if lenient.is_ok() {
            prop_assert!(matches!(strict, Err(AdmissionRejection::DeadlinePassed(_))));
        } else {
            prop_assert_eq!(strict, lenient);
        }
    }
}
