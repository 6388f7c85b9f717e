//! Vote tallying.

use crate::types::{ParticipantId, Vote};
use derive_getters::Getters;
use std::collections::HashMap;
use tracing::instrument;

/// Result of counting a round's votes.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Tally {
    /// Participant to eliminate.
    leader: ParticipantId,
    /// Votes the leader received.
    votes: usize,
}

/// Counts votes and picks the participant to eliminate.
///
/// The leader is the first target to reach the highest count, walking votes in
/// submission order. A later target that only ties the count does not take
/// the lead. Returns `None` when no votes were cast.
#[instrument(skip(votes), fields(votes = votes.len()))]
pub fn tally(votes: &[Vote]) -> Option<Tally> {
    let mut counts: HashMap<&ParticipantId, usize> = HashMap::new();
    let mut leader: Option<(&ParticipantId, usize)> = None;

    for vote in votes {
        let count = counts.entry(vote.target()).or_insert(0);
        *count += 1;
        if leader.is_none_or(|(_, best)| *count > best) {
            leader = Some((vote.target(), *count));
        }
    }

    leader.map(|(id, votes)| Tally {
        leader: id.clone(),
        votes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(targets: &[&str]) -> Vec<Vote> {
        targets
            .iter()
            .enumerate()
            .map(|(i, t)| Vote::new(format!("voter_{i}").into(), (*t).into(), String::new()))
            .collect()
    }

    #[test]
    fn test_no_votes_no_leader() {
        assert_eq!(tally(&[]), None);
    }

    #[test]
    fn test_simple_majority() {
        let result = tally(&votes(&["v2", "v2", "v2", "v1", "v1"])).unwrap();
        assert_eq!(result.leader(), &ParticipantId::from("v2"));
        assert_eq!(*result.votes(), 3);
    }

    #[test]
    fn test_tie_goes_to_first_to_reach_max() {
        // A reaches 2 on the third vote, B only on the fifth.
        let result = tally(&votes(&["A", "B", "A", "C", "B"])).unwrap();
        assert_eq!(result.leader(), &ParticipantId::from("A"));
        assert_eq!(*result.votes(), 2);
    }

    #[test]
    fn test_tie_order_matters() {
        let result = tally(&votes(&["B", "A", "B", "A"])).unwrap();
        assert_eq!(result.leader(), &ParticipantId::from("B"));
    }

    #[test]
    fn test_late_majority_overtakes() {
        let result = tally(&votes(&["A", "B", "B"])).unwrap();
        assert_eq!(result.leader(), &ParticipantId::from("B"));
    }
}
