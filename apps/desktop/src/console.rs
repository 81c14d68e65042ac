//! Terminal stand-in for the picker UI: parses typed commands into actions
//! and renders published events as text.

use client_core::{UiAction, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(UiAction),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => Command::Action(UiAction::SearchChanged(rest.to_string())),
        "add" | "a" if !rest.is_empty() => {
            Command::Action(UiAction::SuggestionClicked(rest.to_string()))
        }
        "spin" => Command::Action(UiAction::SpinClicked),
        "reset" => Command::Action(UiAction::ResetClicked),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

pub const HELP: &str = "\
commands:
  search <text>   list roster names containing <text>
  add <name>      put <name> on the wheel (max 5)
  spin            spin once at least two names are on the wheel
  reset           clear the wheel after a result
  quit";

/// Text for one event, or `None` when the event has nothing to show.
pub fn describe(event: &UiEvent) -> Option<String> {
    let text = match event {
        UiEvent::RosterInstalled { participants: 0 } => {
            "roster unavailable; the wheel has no one to pick from".to_string()
        }
        UiEvent::RosterInstalled { participants } => {
            format!("roster ready: {participants} participants")
        }
        UiEvent::MatchesUpdated(matches) if matches.is_empty() => "no matches".to_string(),
        UiEvent::MatchesUpdated(matches) => matches
            .iter()
            .map(|participant| format!("  - {}", participant.name))
            .collect::<Vec<_>>()
            .join("\n"),
        UiEvent::SelectionChanged(names) if names.is_empty() => "wheel cleared".to_string(),
        UiEvent::SelectionChanged(names) => format!("on the wheel: {}", names.join(", ")),
        UiEvent::SpinEnabled => "wheel ready, type 'spin'".to_string(),
        UiEvent::SpinStarted => "spinning...".to_string(),
        UiEvent::WinnerAnnounced {
            winner: Some(participant),
        } => format!("You have won {}!", participant.name),
        UiEvent::WinnerAnnounced { winner: None } => {
            "the wheel stopped without a winner".to_string()
        }
        UiEvent::ResetEnabled => "type 'reset' to start over".to_string(),
        UiEvent::SpinDisabled | UiEvent::ResetHidden => return None,
    };
    Some(text)
}
