//! Night: doctor save, werewolf kill, seer investigation.

use super::{Referee, RefereeError};
use crate::gateway::{Decision, Question};
use tracing::{debug, info, instrument};
use werewolf_core::{EliminationKind, Event, KillOutcome, ParticipantId, RoundRecord};

/// Self-protection attempts before the doctor forfeits the save.
const PROTECT_ATTEMPTS: u32 = 3;

/// Describes what happened during the night of `round`.
///
/// Speakers and voters get this instead of the raw event log.
pub fn night_summary(round: &RoundRecord) -> String {
    round
        .events()
        .iter()
        .find_map(|event| match event {
            Event::WerewolfElimination { target, .. } => {
                Some(format!("{} was eliminated during the night.", target))
            }
            Event::WerewolfEliminationFailure { .. } => Some(
                "The werewolves attacked, but the doctor saved their target. Nobody was eliminated."
                    .to_string(),
            ),
            _ => None,
        })
        .unwrap_or_else(|| "Nobody was attacked during the night.".to_string())
}

impl Referee {
    /// Resolves the night actions in order, each one skippable.
    #[instrument(skip(self), fields(round = self.state.current_round()))]
    pub(super) async fn night(&mut self) -> Result<(), RefereeError> {
        let save = self.doctor_save().await?;
        self.werewolf_kill(save.as_ref()).await;
        self.seer_investigation().await;
        self.state.log_current(Event::NightEnd);
        Ok(())
    }

    async fn doctor_save(&mut self) -> Result<Option<ParticipantId>, RefereeError> {
        let Some(doctor) = self.state.doctor().and_then(|id| self.state.participant(id)).cloned() else {
            debug!("No living doctor");
            return Ok(None);
        };
        let mut context = self.context(&doctor);

        for attempt in 1..=PROTECT_ATTEMPTS {
            let question = Question::Protect {
                context: context.clone(),
            };
            let (target, rationale) = match self.ask(&doctor, &question).await {
                Ok(Decision::Target { target, rationale }) => (target, rationale),
                Ok(other) => {
                    self.reject(doctor.id(), format!("protect answered with {:?}; no save tonight", other));
                    return Ok(None);
                }
                Err(e) => {
                    self.reject(doctor.id(), format!("no protect decision ({}); no save tonight", e.message));
                    return Ok(None);
                }
            };

            if &target == doctor.id() {
                debug!(attempt, "Doctor tried to protect themselves");
                context = context.with_note("You cannot protect yourself. Choose another player.");
                continue;
            }
            if !self.state.is_alive(&target) {
                self.reject(doctor.id(), format!("cannot protect {}: unknown or eliminated", target));
                return Ok(None);
            }

            self.state.record_doctor_save(&target)?;
            self.state.log_current(Event::DoctorSave {
                doctor: doctor.id().clone(),
                target: target.clone(),
                rationale,
            });
            info!(doctor = %doctor.id(), %target, "Doctor protects");
            return Ok(Some(target));
        }

        self.reject(
            doctor.id(),
            format!("tried to self-protect {} times; no save tonight", PROTECT_ATTEMPTS),
        );
        Ok(None)
    }

    async fn werewolf_kill(&mut self, save: Option<&ParticipantId>) {
        let Some(werewolf) = self
            .state
            .primary_werewolf()
            .and_then(|id| self.state.participant(id))
            .cloned()
        else {
            debug!("No living primary werewolf");
            return;
        };

        let question = Question::Eliminate {
            context: self.context(&werewolf),
        };
        let (target, rationale) = match self.ask(&werewolf, &question).await {
            Ok(Decision::Target { target, rationale }) => (target, rationale),
            Ok(other) => {
                self.reject(werewolf.id(), format!("eliminate answered with {:?}; no kill tonight", other));
                return;
            }
            Err(e) => {
                self.reject(werewolf.id(), format!("no eliminate decision ({}); no kill tonight", e.message));
                return;
            }
        };

        if !self.state.is_alive(&target) {
            self.reject(werewolf.id(), format!("cannot eliminate {}: unknown or eliminated", target));
            return;
        }

        if save == Some(&target) {
            self.state.log_current(Event::WerewolfEliminationFailure {
                werewolf: werewolf.id().clone(),
                target: target.clone(),
            });
            self.state.record_werewolf_kill(&target, KillOutcome::Failed);
            self.diagnose(format!("{} was attacked but saved by the doctor", target));
            return;
        }

        self.state.eliminate(&target, EliminationKind::NightKill);
        self.state.log_current(Event::WerewolfElimination {
            werewolf: werewolf.id().clone(),
            target: target.clone(),
            rationale,
        });
        self.state.record_werewolf_kill(&target, KillOutcome::Success);
        self.diagnose(format!("{} was eliminated during the night", target));
    }

    async fn seer_investigation(&mut self) {
        let Some(seer) = self.state.seer().and_then(|id| self.state.participant(id)).cloned() else {
            debug!("No living seer");
            return;
        };

        let question = Question::Investigate {
            context: self.context(&seer),
            previous_checks: self.state.seer_checks().to_vec(),
        };
        let (target, rationale) = match self.ask(&seer, &question).await {
            Ok(Decision::Target { target, rationale }) => (target, rationale),
            Ok(other) => {
                self.reject(seer.id(), format!("investigate answered with {:?}; skipped", other));
                return;
            }
            Err(e) => {
                self.reject(seer.id(), format!("no investigate decision ({}); skipped", e.message));
                return;
            }
        };

        if !self.state.is_alive(&target) {
            self.reject(seer.id(), format!("cannot investigate {}: unknown or eliminated", target));
            return;
        }

        let was_werewolf = self.state.primary_werewolf() == Some(&target)
            || self.state.secondary_werewolf() == Some(&target);
        self.state.record_seer_check(&target, was_werewolf);
        self.state.log_current(Event::SeerInvestigation {
            seer: seer.id().clone(),
            target: target.clone(),
            was_werewolf,
            rationale,
        });
        info!(seer = %seer.id(), %target, was_werewolf, "Seer investigates");
    }
}
