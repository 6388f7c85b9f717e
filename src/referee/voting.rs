//! Voting: everyone votes at once, the tally eliminates one participant.

use super::{Referee, RefereeError, night_summary};
use crate::gateway::{Decision, Question};
use tracing::{info, instrument};
use werewolf_core::rules::tally;
use werewolf_core::{EliminationKind, Event};

impl Referee {
    #[instrument(skip(self), fields(round = self.state.current_round()))]
    pub(super) async fn voting(&mut self) -> Result<(), RefereeError> {
        let summary = night_summary(self.state.current());
        let chat_history = self.state.current().chat_history().clone();
        let asks: Vec<_> = self
            .alive_snapshot()
            .into_iter()
            .map(|participant| {
                let question = Question::Vote {
                    context: self.context(&participant),
                    chat_history: chat_history.clone(),
                    night_summary: summary.clone(),
                };
                (participant, question)
            })
            .collect();

        let answers = self.ask_all(&asks).await;

        // Roster order is submission order.
        for ((voter, _), answer) in asks.iter().zip(answers) {
            let id = voter.id();
            match answer {
                Ok(Decision::Target { target, rationale }) => {
                    if self.state.has_voted(id) {
                        self.reject(id, "already voted this round; vote dropped");
                    } else if !self.state.is_alive(&target) {
                        self.reject(id, format!("cannot vote for {}: unknown or eliminated", target));
                    } else {
                        self.state.cast_vote(id, &target, rationale.clone());
                        self.state.log_current(Event::Vote {
                            voter: id.clone(),
                            target,
                            rationale,
                        });
                    }
                }
                Ok(other) => self.reject(id, format!("vote answered with {:?}; abstains", other)),
                Err(e) => self.reject(id, format!("no vote ({}); abstains", e.message)),
            }
        }

        match tally(self.state.current().votes()) {
            Some(result) => {
                let target = result.leader().clone();
                let votes = *result.votes();
                self.state.eliminate(&target, EliminationKind::VotedOut);
                self.state.log_current(Event::VillageElimination {
                    target: target.clone(),
                    votes,
                });
                self.diagnose(format!("{} was voted out with {} votes", target, votes));
            }
            None => {
                info!("No valid votes, nobody eliminated");
                self.state
                    .log_current(Event::notice("no valid votes; nobody eliminated"));
                self.diagnose("Nobody was voted out");
            }
        }
        Ok(())
    }
}
