//! Discussion: sequential passes over the speaking order.

use super::{Referee, RefereeError, night_summary};
use crate::gateway::{Decision, Question};
use tracing::{debug, instrument};
use werewolf_core::Event;

impl Referee {
    #[instrument(skip(self), fields(round = self.state.current_round(), passes = self.state.turns_to_speak_per_round()))]
    pub(super) async fn discussion(&mut self) -> Result<(), RefereeError> {
        let order = self.state.current().speaking_order().clone();
        let summary = night_summary(self.state.current());

        for pass in 0..self.state.turns_to_speak_per_round() {
            for id in &order {
                let Some(speaker) = self.state.participant(id).filter(|p| p.is_alive()).cloned() else {
                    continue;
                };
                let question = Question::Speak {
                    context: self.context(&speaker),
                    pass,
                    speaking_order: order.clone(),
                    chat_history: self.state.current().chat_history().clone(),
                    night_summary: summary.clone(),
                };

                match self.ask(&speaker, &question).await {
                    Ok(Decision::Message { text }) => {
                        debug!(speaker = %id, pass, "Statement");
                        self.state.append_chat(id, text);
                        self.state.log_current(Event::Statement {
                            speaker: id.clone(),
                            pass,
                        });
                    }
                    Ok(other) => self.reject(id, format!("speak answered with {:?}; turn skipped", other)),
                    Err(e) => self.reject(id, format!("no statement ({}); turn skipped", e.message)),
                }
            }
        }
        Ok(())
    }
}
