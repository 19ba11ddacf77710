//! Picks exactly one dispatch path per message.

use crate::commands::ParsedCommand;

use super::classifier::IntentSignals;

/// Where a message goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Registered command prefix; the AI responder is skipped.
    Command(ParsedCommand),
    /// At least one intent signal fired.
    Respond(IntentSignals),
    Ignore,
}

/// First match wins: registered command, then any intent signal, then no-op.
#[must_use]
pub fn resolve(content: &str, signals: IntentSignals) -> Route {
    if let Some(command) = ParsedCommand::parse(content) {
        return Route::Command(command);
    }
    if signals.wants_response() {
        Route::Respond(signals)
    } else {
        Route::Ignore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandName;

    fn keyword_signals() -> IntentSignals {
        IntentSignals {
            is_keyword_trigger: true,
            is_direct_call: true,
            ..IntentSignals::default()
        }
    }

    #[test]
    fn command_wins_over_keywords() {
        let route = resolve(".clear 5 love money mepa", keyword_signals());
        let Route::Command(command) = route else {
            panic!("expected command route, got {route:?}");
        };
        assert_eq!(command.name, CommandName::Clear);
    }

    #[test]
    fn unknown_prefix_falls_through_to_signals() {
        let route = resolve(".banana love", keyword_signals());
        assert!(matches!(route, Route::Respond(_)));
    }

    #[test]
    fn keyword_message_routes_to_responder() {
        let signals = IntentSignals {
            is_keyword_trigger: true,
            ..IntentSignals::default()
        };
        assert!(matches!(
            resolve("I need love advice today", signals),
            Route::Respond(s) if s.is_keyword_trigger
        ));
    }

    #[test]
    fn quiet_message_is_ignored() {
        assert_eq!(resolve("hello all", IntentSignals::default()), Route::Ignore);
    }
}
