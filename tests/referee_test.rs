//! Tests for the referee driving whole rounds through a gateway.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use strictly_werewolf::werewolf_core::{
    Event, GameState, KillOutcome, Participant, ParticipantId, Role, SeerCheck, Winner,
};
use strictly_werewolf::{
    Decision, GatewayError, GatewayErrorKind, MatchAbort, MemorySink, ParticipantGateway, Phase,
    Question, QuestionKind, Referee, RefereeErrorKind, RetryPolicy, Scripted, ScriptedGateway,
    night_summary,
};

fn roster(entries: &[(&str, Role)]) -> Vec<Participant> {
    entries
        .iter()
        .map(|(id, role)| Participant::new(*id, format!("http://{id}.local"), *role))
        .collect()
}

fn state(entries: &[(&str, Role)], turns: u32) -> GameState {
    GameState::new(roster(entries), turns).expect("Valid roster")
}

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_attempts(attempts)
        .with_timeout(Duration::from_millis(50))
}

fn id(s: &str) -> ParticipantId {
    ParticipantId::from(s)
}

fn votes(gateway: ScriptedGateway, ballots: &[(&str, &str)]) -> ScriptedGateway {
    ballots.iter().fold(gateway, |gateway, (voter, target)| {
        gateway.answers(*voter, QuestionKind::Vote, [Decision::target(*target, "suspicious")])
    })
}

async fn step_until(referee: &mut Referee, phase: Phase) {
    while referee.phase() != phase {
        referee.step().await.expect("Phase should complete");
    }
}

#[tokio::test]
async fn test_seer_finds_werewolf_and_village_wins() {
    let gateway = ScriptedGateway::new()
        .answers("wolf", QuestionKind::Eliminate, [Decision::target("villager_1", "easy prey")])
        .answers("seer", QuestionKind::Investigate, [Decision::target("wolf", "too quiet")]);
    let gateway = votes(
        gateway,
        &[
            ("wolf", "villager_2"),
            ("seer", "wolf"),
            ("villager_2", "wolf"),
            ("villager_3", "wolf"),
        ],
    );
    let sink = Arc::new(MemorySink::new());
    let referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
                ("villager_3", Role::Villager),
            ],
            1,
        ),
        Arc::new(gateway),
    )
    .with_policy(fast_policy(3))
    .with_sink(sink.clone());

    let record = referee.run().await.expect("Match should finish");

    assert_eq!(*record.winner(), Some(Winner::Villagers));
    assert_eq!(*record.final_round(), 1);
    assert_eq!(record.scores().len(), 5);

    let events = &record.events()[&1];
    assert!(events.contains(&Event::SeerInvestigation {
        seer: id("seer"),
        target: id("wolf"),
        was_werewolf: true,
        rationale: "too quiet".into(),
    }));
    assert!(events.contains(&Event::VillageElimination {
        target: id("wolf"),
        votes: 3,
    }));

    let tail: Vec<_> = events.iter().rev().take(2).collect();
    assert_eq!(*tail[0], Event::GameEnd { winner: Winner::Villagers });
    assert_eq!(
        *tail[1],
        Event::RoundEnd {
            werewolves: 0,
            villagers: 3,
        }
    );

    let lines = sink.lines();
    assert_eq!(lines[0], "Round 1: night");
    assert!(lines.contains(&"villager_1 was eliminated during the night".to_string()));
    assert!(lines.contains(&"wolf was voted out with 3 votes".to_string()));
    assert!(lines.contains(&"Round 1 ends with 0 werewolves and 3 villagers".to_string()));
    assert!(lines.contains(&"The villagers win".to_string()));
}

#[tokio::test]
async fn test_fallback_match_ends_with_werewolf_win() {
    let referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
            ],
            1,
        ),
        Arc::new(ScriptedGateway::new()),
    )
    .with_policy(fast_policy(1));

    let record = referee.run().await.expect("Match should finish");

    // Night kill takes villager_1, then the tied vote goes to villager_2.
    assert_eq!(*record.winner(), Some(Winner::Werewolves));
    assert_eq!(*record.final_round(), 1);
    assert!(record.all_events().any(|e| *e
        == Event::VillageElimination {
            target: id("villager_2"),
            votes: 1,
        }));
}

#[tokio::test]
async fn test_doctor_save_blocks_kill() {
    let gateway = ScriptedGateway::new()
        .answers("doctor", QuestionKind::Protect, [Decision::target("villager_1", "hunch")])
        .answers("wolf", QuestionKind::Eliminate, [Decision::target("villager_1", "")]);
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("doctor", Role::Doctor),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
            ],
            1,
        ),
        Arc::new(gateway),
    )
    .with_policy(fast_policy(1));

    let next = referee.step().await.expect("Night should complete");
    assert_eq!(next, Phase::Bidding);

    let state = referee.state();
    assert!(state.roster().iter().all(|p| p.is_alive()));
    assert!(state.current().eliminations().is_empty());
    assert_eq!(state.current().doctor_save().as_ref(), Some(&id("villager_1")));
    assert_eq!(
        *state.latest_werewolf_kill().expect("Kill recorded").outcome(),
        KillOutcome::Failed
    );
    assert!(state.current().events().contains(&Event::WerewolfEliminationFailure {
        werewolf: id("wolf"),
        target: id("villager_1"),
    }));
    assert_eq!(
        night_summary(state.current()),
        "The werewolves attacked, but the doctor saved their target. Nobody was eliminated."
    );
}

#[tokio::test]
async fn test_doctor_self_protect_forfeits_after_three_tries() {
    let gateway = Arc::new(ScriptedGateway::new().answers(
        "doctor",
        QuestionKind::Protect,
        std::iter::repeat_n(Decision::target("doctor", "me first"), 3),
    ));
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("doctor", Role::Doctor),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
            ],
            1,
        ),
        gateway.clone(),
    )
    .with_policy(fast_policy(3));

    referee.step().await.expect("Night should complete");

    assert_eq!(gateway.calls(&id("doctor"), QuestionKind::Protect), 3);
    let state = referee.state();
    assert!(state.current().doctor_save().is_none());
    assert!(!state.current().events().iter().any(|e| matches!(e, Event::DoctorSave { .. })));
    assert!(state.current().events().iter().any(|e| matches!(
        e,
        Event::Warning { participant: Some(p), .. } if *p == id("doctor")
    )));
    // Fallback werewolf goes for the first non-werewolf, and nobody saved them.
    assert!(!state.is_alive(&id("doctor")));
    assert!(state.doctor().is_none());
}

#[tokio::test]
async fn test_secondary_werewolf_takes_over_the_kill() {
    let gateway = Arc::new(votes(
        ScriptedGateway::new()
            .answers("wolf_a", QuestionKind::Eliminate, [Decision::target("villager_3", "")]),
        &[
            ("seer", "wolf_a"),
            ("doctor", "wolf_a"),
            ("villager_1", "wolf_a"),
            ("villager_2", "wolf_a"),
        ],
    ));
    let mut referee = Referee::new(
        state(
            &[
                ("wolf_a", Role::WerewolfPrimary),
                ("wolf_b", Role::WerewolfSecondary),
                ("seer", Role::Seer),
                ("doctor", Role::Doctor),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
                ("villager_3", Role::Villager),
            ],
            1,
        ),
        gateway.clone(),
    )
    .with_policy(fast_policy(1));

    step_until(&mut referee, Phase::RoundEnd).await;
    assert_eq!(referee.state().primary_werewolf(), Some(&id("wolf_b")));
    assert!(referee.state().secondary_werewolf().is_none());

    let next = referee.step().await.expect("Round end should complete");
    assert_eq!(next, Phase::Night);
    assert_eq!(referee.state().current_round(), 2);

    // The round-end event lands in round 1, before round 2 opens.
    let round_one = referee.state().round(1).expect("Round 1 exists");
    assert_eq!(
        round_one.events().last(),
        Some(&Event::RoundEnd {
            werewolves: 1,
            villagers: 4,
        })
    );
    assert!(referee.state().current().events().is_empty());

    referee.step().await.expect("Second night should complete");
    assert_eq!(gateway.calls(&id("wolf_b"), QuestionKind::Eliminate), 1);
    assert_eq!(gateway.calls(&id("wolf_a"), QuestionKind::Eliminate), 1);
}

#[tokio::test]
async fn test_vote_tie_goes_to_first_to_reach_max() {
    let gateway = votes(
        ScriptedGateway::new().without_fallback(),
        &[
            ("wolf", "villager_1"),
            ("seer", "villager_2"),
            ("villager_1", "villager_2"),
            ("villager_2", "villager_1"),
        ],
    );
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
            ],
            1,
        ),
        Arc::new(gateway),
    )
    .with_policy(fast_policy(1));

    step_until(&mut referee, Phase::RoundEnd).await;

    let state = referee.state();
    assert_eq!(state.current().votes().len(), 4);
    assert!(!state.is_alive(&id("villager_2")));
    assert!(state.is_alive(&id("villager_1")));
    assert!(state.current().events().contains(&Event::VillageElimination {
        target: id("villager_2"),
        votes: 2,
    }));
}

#[tokio::test]
async fn test_votes_for_eliminated_participants_are_rejected() {
    let gateway = votes(
        ScriptedGateway::new()
            .without_fallback()
            .answers("wolf", QuestionKind::Eliminate, [Decision::target("villager_1", "")]),
        &[
            ("wolf", "villager_2"),
            ("seer", "villager_1"),
            ("villager_2", "villager_1"),
        ],
    );
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
            ],
            1,
        ),
        Arc::new(gateway),
    )
    .with_policy(fast_policy(1));

    step_until(&mut referee, Phase::RoundEnd).await;

    let state = referee.state();
    assert_eq!(state.current().votes().len(), 1);
    assert!(!state.is_alive(&id("villager_2")));
    let ledger: Vec<_> = state
        .current()
        .eliminations()
        .iter()
        .map(|e| e.participant().as_str())
        .collect();
    assert_eq!(ledger, ["villager_1", "villager_2"]);
}

#[tokio::test]
async fn test_bids_order_speakers_and_negative_bids_count_as_zero() {
    let gateway = Arc::new(
        ScriptedGateway::new()
            .without_fallback()
            .answers("wolf", QuestionKind::Bid, [Decision::bid(5, "")])
            .answers("seer", QuestionKind::Bid, [Decision::bid(-3, "")])
            .answers("villager_1", QuestionKind::Bid, [Decision::bid(5, "")])
            .answers("villager_2", QuestionKind::Bid, [Decision::bid(9, "")]),
    );
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
            ],
            1,
        ),
        gateway.clone(),
    )
    .with_policy(fast_policy(1));

    step_until(&mut referee, Phase::Discussion).await;

    let round = referee.state().current();
    let order: Vec<_> = round.speaking_order().iter().map(|p| p.as_str()).collect();
    assert_eq!(order, ["villager_2", "wolf", "villager_1", "seer"]);
    assert!(round.events().contains(&Event::BidPlaced {
        participant: id("seer"),
        amount: 0,
    }));
    assert!(round.events().iter().any(|e| matches!(
        e,
        Event::Warning { participant: Some(p), detail } if *p == id("seer") && detail.contains("negative")
    )));
    assert!(round.events().contains(&Event::SpeakingOrderSet {
        order: vec![id("villager_2"), id("wolf"), id("villager_1"), id("seer")],
    }));
}

#[tokio::test]
async fn test_eliminated_participants_are_not_asked() {
    let gateway = Arc::new(ScriptedGateway::new().answers(
        "wolf",
        QuestionKind::Eliminate,
        [Decision::target("villager_1", "")],
    ));
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
                ("villager_3", Role::Villager),
            ],
            1,
        ),
        gateway.clone(),
    )
    .with_policy(fast_policy(1));

    step_until(&mut referee, Phase::RoundEnd).await;

    for kind in [QuestionKind::Bid, QuestionKind::Speak, QuestionKind::Vote] {
        assert_eq!(gateway.calls(&id("villager_1"), kind), 0, "{kind}");
        assert_eq!(gateway.calls(&id("villager_2"), kind), 1, "{kind}");
    }
}

/// Records what every speaker could see and stays silent otherwise.
#[derive(Default)]
struct Recorder {
    spoken: Mutex<Vec<(ParticipantId, u32, usize)>>,
}

#[async_trait]
impl ParticipantGateway for Recorder {
    async fn ask(&self, participant: &Participant, question: &Question) -> Result<Decision, GatewayError> {
        match question {
            Question::Bid { .. } => Ok(Decision::bid(0, "")),
            Question::Speak {
                pass, chat_history, ..
            } => {
                self.spoken
                    .lock()
                    .expect("Recorder lock")
                    .push((participant.id().clone(), *pass, chat_history.len()));
                Ok(Decision::message(format!("{} on pass {}", participant.id(), pass)))
            }
            _ => Err(GatewayError::transport("abstaining")),
        }
    }
}

#[tokio::test]
async fn test_speakers_see_earlier_messages_across_passes() {
    let recorder = Arc::new(Recorder::default());
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
            ],
            2,
        ),
        recorder.clone(),
    )
    .with_policy(fast_policy(1));

    step_until(&mut referee, Phase::RoundEnd).await;

    let spoken = recorder.spoken.lock().expect("Recorder lock").clone();
    let expected: Vec<(ParticipantId, u32, usize)> = vec![
        (id("wolf"), 0, 0),
        (id("seer"), 0, 1),
        (id("villager_1"), 0, 2),
        (id("wolf"), 1, 3),
        (id("seer"), 1, 4),
        (id("villager_1"), 1, 5),
    ];
    assert_eq!(spoken, expected);

    let round = referee.state().current();
    assert_eq!(round.chat_history().len(), 6);
    assert_eq!(round.chat_history()[3].content(), "wolf on pass 1");
    let statements = round
        .events()
        .iter()
        .filter(|e| matches!(e, Event::Statement { .. }))
        .count();
    assert_eq!(statements, 6);

    // Nobody voted.
    assert!(round.votes().is_empty());
    assert!(round.eliminations().is_empty());
    assert!(round.events().contains(&Event::notice("no valid votes; nobody eliminated")));
}

#[tokio::test]
async fn test_round_limit_aborts_with_partial_record() {
    let gateway = ScriptedGateway::new().without_fallback();
    let referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
            ],
            1,
        ),
        Arc::new(gateway),
    )
    .with_policy(fast_policy(1))
    .with_max_rounds(2);

    let aborted = referee.run().await.unwrap_err();

    assert_eq!(aborted.reason.kind, RefereeErrorKind::RoundLimit);
    assert_eq!(*aborted.record.winner(), None);
    assert_eq!(*aborted.record.final_round(), 2);
    assert!(aborted.record.scores().is_empty());
    assert_eq!(aborted.record.events().len(), 2);
    assert!(aborted.record.events()[&2].contains(&Event::RoundEnd {
        werewolves: 1,
        villagers: 2,
    }));
    assert!(aborted.record.summary().contains("round limit"));
}

#[tokio::test]
async fn test_abort_stops_before_next_phase() {
    let abort = MatchAbort::new();
    let referee = Referee::new(
        state(
            &[("wolf", Role::WerewolfPrimary), ("villager_1", Role::Villager)],
            1,
        ),
        Arc::new(ScriptedGateway::new()),
    )
    .with_abort(&abort);

    abort.abort();
    let aborted = referee.run().await.unwrap_err();

    assert_eq!(aborted.reason.kind, RefereeErrorKind::Aborted);
    assert_eq!(*aborted.record.final_round(), 1);
    assert!(aborted.record.all_events().next().is_none());
}

#[tokio::test]
async fn test_gateway_failures_become_warnings() {
    let gateway = ScriptedGateway::new()
        .without_fallback()
        .script("wolf", QuestionKind::Eliminate, [Scripted::Fail(GatewayErrorKind::Timeout)]);
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
            ],
            1,
        ),
        Arc::new(gateway),
    )
    .with_policy(fast_policy(1));

    referee.step().await.expect("Night should complete");

    let round = referee.state().current();
    assert!(round.eliminations().is_empty());
    assert!(referee.state().latest_werewolf_kill().is_none());
    let warned: Vec<_> = round
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Warning {
                participant: Some(p),
                ..
            } => Some(p.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(warned, ["wolf", "seer"]);
    assert_eq!(round.events().last(), Some(&Event::NightEnd));
    assert_eq!(
        night_summary(round),
        "Nobody was attacked during the night."
    );
}

/// Passes questions to a scripted gateway and keeps a copy of each.
struct QuestionLog {
    inner: ScriptedGateway,
    asked: Mutex<Vec<(ParticipantId, Question)>>,
}

impl QuestionLog {
    fn new(inner: ScriptedGateway) -> Self {
        Self {
            inner,
            asked: Mutex::new(Vec::new()),
        }
    }

    fn find(&self, participant: &str, kind: QuestionKind) -> Option<Question> {
        self.asked
            .lock()
            .expect("QuestionLog lock")
            .iter()
            .find(|(asked, question)| asked.as_str() == participant && question.kind() == kind)
            .map(|(_, question)| question.clone())
    }
}

#[async_trait]
impl ParticipantGateway for QuestionLog {
    async fn ask(&self, participant: &Participant, question: &Question) -> Result<Decision, GatewayError> {
        self.asked
            .lock()
            .expect("QuestionLog lock")
            .push((participant.id().clone(), question.clone()));
        self.inner.ask(participant, question).await
    }
}

#[tokio::test]
async fn test_seer_carries_its_findings_into_the_day() {
    let gateway = ScriptedGateway::new()
        .answers("wolf", QuestionKind::Eliminate, [Decision::target("villager_1", "")])
        .answers("seer", QuestionKind::Investigate, [Decision::target("wolf", "hunch")]);
    let log = Arc::new(QuestionLog::new(gateway));
    let mut referee = Referee::new(
        state(
            &[
                ("wolf", Role::WerewolfPrimary),
                ("seer", Role::Seer),
                ("villager_1", Role::Villager),
                ("villager_2", Role::Villager),
                ("villager_3", Role::Villager),
            ],
            1,
        ),
        log.clone(),
    )
    .with_policy(fast_policy(1));

    step_until(&mut referee, Phase::RoundEnd).await;

    let expected = vec![SeerCheck::new(id("wolf"), true)];
    let vote = log.find("seer", QuestionKind::Vote).expect("Seer was asked to vote");
    assert_eq!(vote.context().round(), &1);
    assert_eq!(vote.context().known_checks(), &expected);
    let speak = log.find("seer", QuestionKind::Speak).expect("Seer was asked to speak");
    assert_eq!(speak.context().known_checks(), &expected);

    let villager_vote = log
        .find("villager_2", QuestionKind::Vote)
        .expect("Villager was asked to vote");
    assert!(villager_vote.context().known_checks().is_empty());
    let wolf_vote = log.find("wolf", QuestionKind::Vote).expect("Wolf was asked to vote");
    assert!(wolf_vote.context().known_checks().is_empty());
}

#[tokio::test]
async fn test_no_survivors_aborts_with_partial_record() {
    // The wolf kills the only villager, then is the only voter left and votes itself out.
    let gateway = ScriptedGateway::new()
        .answers("wolf", QuestionKind::Eliminate, [Decision::target("villager_1", "")])
        .answers("wolf", QuestionKind::Vote, [Decision::target("wolf", "")]);
    let referee = Referee::new(
        state(
            &[("wolf", Role::WerewolfPrimary), ("villager_1", Role::Villager)],
            1,
        ),
        Arc::new(gateway),
    )
    .with_policy(fast_policy(1));

    let aborted = referee.run().await.unwrap_err();

    assert_eq!(aborted.reason.kind, RefereeErrorKind::NoSurvivors);
    assert_eq!(*aborted.record.winner(), None);
    assert!(aborted.record.scores().is_empty());
    assert_eq!(*aborted.record.final_round(), 1);

    let events = &aborted.record.events()[&1];
    assert!(events.contains(&Event::NightEnd));
    assert!(events.contains(&Event::VillageElimination {
        target: id("wolf"),
        votes: 1,
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::WerewolfElimination { target, .. } if *target == id("villager_1")
    )));
    assert!(!events.iter().any(|e| matches!(e, Event::RoundEnd { .. })));
    assert!(!events.iter().any(|e| matches!(e, Event::GameEnd { .. })));
}

#[tokio::test]
async fn test_broken_invariant_aborts_the_match() {
    let healthy = state(
        &[
            ("wolf", Role::WerewolfPrimary),
            ("villager_1", Role::Villager),
            ("villager_2", Role::Villager),
        ],
        1,
    );
    // A seer slot naming a villager.
    let mut value = serde_json::to_value(&healthy).expect("State serializes");
    value["seer"] = "villager_1".into();
    let broken: GameState = serde_json::from_value(value).expect("State deserializes");

    let gateway = ScriptedGateway::new()
        .answers("wolf", QuestionKind::Eliminate, [Decision::target("villager_2", "")]);
    let referee = Referee::new(broken, Arc::new(gateway)).with_policy(fast_policy(1));

    let aborted = referee.run().await.unwrap_err();

    assert_eq!(aborted.reason.kind, RefereeErrorKind::State);
    assert!(aborted.reason.message.contains("Role slots"));
    assert_eq!(*aborted.record.winner(), None);
    assert_eq!(aborted.record.events()[&1].last(), Some(&Event::NightEnd));
}
