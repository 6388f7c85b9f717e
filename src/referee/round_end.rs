//! Round end: win conditions, then either another night or the end.

use super::{Phase, Referee, RefereeError, RefereeErrorKind};
use tracing::{info, instrument};
use werewolf_core::Event;
use werewolf_core::rules::{SideCount, Verdict, check_winner};

impl Referee {
    #[instrument(skip(self), fields(round = self.state.current_round()))]
    pub(super) fn round_end(&mut self) -> Result<Phase, RefereeError> {
        let count = SideCount::of(&self.state);
        self.diagnose(format!(
            "Round {} ends with {} werewolves and {} villagers",
            self.state.current_round(),
            count.werewolves(),
            count.villagers()
        ));

        let verdict = check_winner(count);
        if verdict == Verdict::NoSurvivors {
            return Err(RefereeError::new(
                RefereeErrorKind::NoSurvivors,
                format!("nobody is alive at the end of round {}", self.state.current_round()),
            ));
        }

        self.state.log_current(Event::RoundEnd {
            werewolves: *count.werewolves(),
            villagers: *count.villagers(),
        });

        match verdict {
            Verdict::Winner(winner) => {
                info!(%winner, "Winner declared");
                self.state.declare_winner(winner);
                self.diagnose(format!("The {} win", winner));
                Ok(Phase::GameEnd)
            }
            _ if self.state.current_round() >= self.max_rounds => Err(RefereeError::new(
                RefereeErrorKind::RoundLimit,
                format!("no winner after {} rounds", self.max_rounds),
            )),
            _ => {
                self.state.advance_round();
                Ok(Phase::Night)
            }
        }
    }
}
