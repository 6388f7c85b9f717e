//! Bidding: everyone bids at once, the speaking order follows the bids.

use super::{Referee, RefereeError, night_summary};
use crate::gateway::{Decision, Question};
use tracing::{info, instrument};
use werewolf_core::Event;
use werewolf_core::rules::speaking_order;

impl Referee {
    #[instrument(skip(self), fields(round = self.state.current_round()))]
    pub(super) async fn bidding(&mut self) -> Result<(), RefereeError> {
        let summary = night_summary(self.state.current());
        let asks: Vec<_> = self
            .alive_snapshot()
            .into_iter()
            .map(|participant| {
                let question = Question::Bid {
                    context: self.context(&participant),
                    night_summary: summary.clone(),
                };
                (participant, question)
            })
            .collect();

        let answers = self.ask_all(&asks).await;

        for ((participant, _), answer) in asks.iter().zip(answers) {
            let id = participant.id();
            let (amount, rationale) = match answer {
                Ok(Decision::Bid { amount, rationale }) => match u64::try_from(amount) {
                    Ok(amount) => (amount, rationale),
                    Err(_) => {
                        self.reject(id, format!("negative bid {} counted as 0", amount));
                        (0, rationale)
                    }
                },
                Ok(other) => {
                    self.reject(id, format!("bid answered with {:?}; counted as 0", other));
                    (0, String::new())
                }
                Err(e) => {
                    self.reject(id, format!("no bid ({}); counted as 0", e.message));
                    (0, String::new())
                }
            };
            self.state.place_bid(id, amount, rationale);
            self.state.log_current(Event::BidPlaced {
                participant: id.clone(),
                amount,
            });
        }

        let order = speaking_order(self.state.alive(), self.state.current().bids());
        self.state.set_speaking_order(order.clone())?;
        info!(?order, "Speaking order set");
        self.state.log_current(Event::SpeakingOrderSet { order });
        Ok(())
    }
}
