//! Speaking order derived from bids.

use crate::types::{Bid, ParticipantId};
use tracing::instrument;

/// Orders speakers by bid, highest first.
///
/// `roster` is the canonical join order. Participants without a bid count as
/// bidding 0, and equal bids keep their roster order.
#[instrument(skip_all, fields(speakers = roster.len()))]
pub fn speaking_order(roster: &[ParticipantId], bids: &[Bid]) -> Vec<ParticipantId> {
    let amount = |id: &ParticipantId| {
        bids.iter()
            .find(|b| b.participant() == id)
            .map(|b| *b.amount())
            .unwrap_or(0)
    };

    let mut order: Vec<(u64, &ParticipantId)> = roster.iter().map(|id| (amount(id), id)).collect();
    // `sort_by` is stable, so ties stay in join order.
    order.sort_by(|a, b| b.0.cmp(&a.0));
    order.into_iter().map(|(_, id)| id.clone()).collect()
}
