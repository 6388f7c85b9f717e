//! Prompt text for LLM participants.

use crate::gateway::{Question, QuestionKind, RoundContext};
use werewolf_core::{ChatMessage, SeerCheck};

const GAME_RULES: &str = "\
This is a game of Werewolf. Villagers try to find the werewolves; werewolves try to avoid \
detection through deception and persuasion.

ROLES:
- Werewolves: the primary werewolf picks a victim each night. If the primary is eliminated, \
the secondary takes over.
- Seer: investigates one player each night and learns whether they are a werewolf.
- Doctor: protects one player each night from the werewolves, never themselves.
- Villagers: find and vote out the werewolves through discussion.

Each round has a NIGHT (doctor protects, werewolf kills, seer investigates), then BIDDING for \
speaking order, DISCUSSION in bid order, and a VOTE. The player with the most votes is removed.

WIN CONDITIONS:
- Villagers win once every werewolf is eliminated.
- Werewolves win once they equal or outnumber the remaining villagers.";

/// Builds the system prompt for `question`.
pub fn system_prompt(question: &Question) -> String {
    let context = question.context();
    format!(
        "{}\n\nYou are {}. Your role: {}.\n\n{}",
        GAME_RULES,
        context.you(),
        context.role().describe(),
        response_format(question.kind())
    )
}

fn response_format(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::Protect | QuestionKind::Eliminate | QuestionKind::Investigate | QuestionKind::Vote => {
            "Respond only with JSON: {\"player_id\": \"<participant id>\", \"reason\": \"<short explanation>\"}"
        }
        QuestionKind::Bid => {
            "Respond only with JSON: {\"amount\": <non-negative integer>, \"reason\": \"<short explanation>\"}"
        }
        QuestionKind::Speak => "Respond only with JSON: {\"message\": \"<what you say to the table>\"}",
    }
}

fn header(out: &mut String, context: &RoundContext, title: &str) {
    out.push_str(&format!("ROUND {}: {}\n", context.round(), title));
    out.push_str(&format!("Alive players: {}\n", join(context.alive())));
    if !context.allies().is_empty() {
        out.push_str(&format!("Your fellow werewolves: {}\n", join(context.allies())));
    }
    if let Some(note) = context.note() {
        out.push_str(&format!("NOTE: {}\n", note));
    }
}

fn checks(out: &mut String, checks: &[SeerCheck]) {
    for check in checks {
        out.push_str(&format!("- {} is werewolf: {}\n", check.target(), check.was_werewolf()));
    }
}

fn investigations(out: &mut String, context: &RoundContext) {
    if !context.known_checks().is_empty() {
        out.push_str("Your investigations so far:\n");
        checks(out, context.known_checks());
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn chat(out: &mut String, history: &[ChatMessage]) {
    if history.is_empty() {
        out.push_str("Nobody has spoken yet.\n");
    }
    for message in history {
        out.push_str(&format!("{}: {}\n", message.sender(), message.content()));
    }
}

/// Builds the user message describing the round for `question`.
pub fn user_message(question: &Question) -> String {
    let mut out = String::new();
    match question {
        Question::Protect { context } => {
            header(&mut out, context, "choose one player to protect tonight.");
        }
        Question::Eliminate { context } => {
            header(&mut out, context, "choose one player to eliminate tonight.");
        }
        Question::Investigate {
            context,
            previous_checks,
        } => {
            header(&mut out, context, "choose one player to investigate tonight.");
            checks(&mut out, previous_checks);
        }
        Question::Bid {
            context,
            night_summary,
        } => {
            header(&mut out, context, "bid for your place in the speaking order.");
            out.push_str(&format!("Last night: {}\n", night_summary));
            investigations(&mut out, context);
            out.push_str("Higher bids speak earlier.\n");
        }
        Question::Speak {
            context,
            pass,
            speaking_order,
            chat_history,
            night_summary,
        } => {
            header(&mut out, context, "it is your turn to speak.");
            out.push_str(&format!("Speaking order: {} (pass {})\n", join(speaking_order), pass + 1));
            out.push_str(&format!("Last night: {}\n", night_summary));
            investigations(&mut out, context);
            out.push_str("Discussion so far:\n");
            chat(&mut out, chat_history);
        }
        Question::Vote {
            context,
            chat_history,
            night_summary,
        } => {
            header(&mut out, context, "vote for one player to eliminate.");
            out.push_str(&format!("Last night: {}\n", night_summary));
            investigations(&mut out, context);
            out.push_str("Discussion:\n");
            chat(&mut out, chat_history);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use werewolf_core::Role;

    #[test]
    fn test_speak_prompt_includes_history() {
        let context = RoundContext::new(
            1,
            "v2".into(),
            Role::Villager,
            vec!["v1".into(), "v2".into()],
            vec![],
        );
        let question = Question::Speak {
            context,
            pass: 0,
            speaking_order: vec!["v1".into(), "v2".into()],
            chat_history: vec![ChatMessage::new("v1".into(), "I trust nobody".into())],
            night_summary: "Nobody died.".into(),
        };
        let message = user_message(&question);
        assert!(message.contains("v1: I trust nobody"));
        assert!(message.contains("Nobody died."));
        assert!(system_prompt(&question).contains("\"message\""));
    }

    #[test]
    fn test_note_is_rendered() {
        let context = RoundContext::new(1, "doc".into(), Role::Doctor, vec![], vec![])
            .with_note("You cannot protect yourself.");
        let message = user_message(&Question::Protect { context });
        assert!(message.contains("NOTE: You cannot protect yourself."));
    }

    #[test]
    fn test_seer_vote_prompt_lists_investigations() {
        let context = RoundContext::new(
            1,
            "seer".into(),
            Role::Seer,
            vec!["seer".into(), "wolf".into(), "v1".into()],
            vec![],
        )
        .with_known_checks(vec![SeerCheck::new("wolf".into(), true)]);
        let message = user_message(&Question::Vote {
            context,
            chat_history: vec![],
            night_summary: "Nobody died.".into(),
        });
        assert!(message.contains("Your investigations so far:\n- wolf is werewolf: true"));
    }

    #[test]
    fn test_villager_prompt_has_no_investigations() {
        let context = RoundContext::new(1, "v1".into(), Role::Villager, vec!["v1".into()], vec![]);
        let message = user_message(&Question::Vote {
            context,
            chat_history: vec![],
            night_summary: "Nobody died.".into(),
        });
        assert!(!message.contains("investigations"));
    }
}
