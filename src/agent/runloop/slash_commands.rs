/// What a `/command` line asks the REPL to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommandOutcome {
    Exit,
    ClearConversation,
    ToggleMode,
    Compact,
    ShowHelp,
    Unknown(String),
}

/// Commands listed by `/help`, in display order.
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/quit", "exit (also /exit, /q)"),
    ("/clear", "forget the conversation and reset the token display"),
    ("/mode", "switch between normal and advanced display"),
    ("/compact", "summarize the conversation to free context"),
    ("/help", "show this list"),
];

/// Parse a line that starts with `/`. Other input is not a command.
pub fn parse_slash_command(input: &str) -> Option<SlashCommandOutcome> {
    let trimmed = input.trim();
    let command = trimmed.strip_prefix('/')?;
    let name = command.split_whitespace().next().unwrap_or_default();

    let outcome = match name.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => SlashCommandOutcome::Exit,
        "clear" => SlashCommandOutcome::ClearConversation,
        "mode" => SlashCommandOutcome::ToggleMode,
        "compact" => SlashCommandOutcome::Compact,
        "help" | "?" => SlashCommandOutcome::ShowHelp,
        _ => SlashCommandOutcome::Unknown(trimmed.to_owned()),
    };
    Some(outcome)
}

pub fn render_help() -> String {
    SLASH_COMMANDS
        .iter()
        .map(|(name, summary)| format!("  {name:<10} {summary}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exit_aliases() {
        for input in ["/quit", "/exit", "/q", "  /QUIT  "] {
            assert_eq!(parse_slash_command(input), Some(SlashCommandOutcome::Exit), "{input}");
        }
    }

    #[test]
    fn session_commands() {
        assert_eq!(
            parse_slash_command("/clear"),
            Some(SlashCommandOutcome::ClearConversation)
        );
        assert_eq!(parse_slash_command("/mode"), Some(SlashCommandOutcome::ToggleMode));
        assert_eq!(parse_slash_command("/compact"), Some(SlashCommandOutcome::Compact));
        assert_eq!(parse_slash_command("/help"), Some(SlashCommandOutcome::ShowHelp));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_slash_command("fix the build"), None);
        assert_eq!(parse_slash_command("path/to/file"), None);
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(
            parse_slash_command("/deploy now"),
            Some(SlashCommandOutcome::Unknown("/deploy now".into()))
        );
    }

    #[test]
    fn help_lists_every_command() {
        let help = render_help();
        for (name, _) in SLASH_COMMANDS {
            assert!(help.contains(name));
        }
    }
}
