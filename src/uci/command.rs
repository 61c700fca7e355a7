//! UCI command grammar: tokenizing a line into a [`UciCommand`] and the
//! `go`-specific parameter bag, per spec.md §6's command table.

#[derive(Debug, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(GoParams),
    SetOption { name: String, value: Option<String> },
    Debug(bool),
    Display,
    Perft(u32),
    Stop,
    Quit,
    /// Unrecognised verb or unparsable token structure (spec.md §7,
    /// `MalformedCommand`): logged in debug mode, otherwise ignored.
    Unknown(String),
}

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    pub infinite: bool,
}

fn parse_go_params(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                params.depth = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "movetime" => {
                params.movetime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "wtime" => {
                params.wtime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "btime" => {
                params.btime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "winc" => {
                params.winc = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "binc" => {
                params.binc = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "movestogo" => {
                params.movestogo = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    params
}

/// Parse `name <N> [value <V>]` out of a `setoption` line's remaining
/// tokens. Buttons (e.g. `Clear Hash`) have no `value`.
fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    let mut name_parts = Vec::new();
    let mut value_parts = Vec::new();
    let mut mode = "";
    for &part in &parts[1..] {
        match part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }
    if name_parts.is_empty() {
        return None;
    }
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };
    Some((name_parts.join(" "), value))
}

/// Tokenize one line of UCI input. `None` for a blank line.
#[must_use]
pub fn parse_command(line: &str) -> Option<UciCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    Some(match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(parts.iter().map(|s| (*s).to_string()).collect()),
        "go" => UciCommand::Go(parse_go_params(&parts)),
        "setoption" => match parse_setoption(&parts) {
            Some((name, value)) => UciCommand::SetOption { name, value },
            None => UciCommand::Unknown(trimmed.to_string()),
        },
        "debug" => UciCommand::Debug(parts.get(1) == Some(&"on")),
        "d" => UciCommand::Display,
        "perft" => match parts.get(1).and_then(|v| v.parse().ok()) {
            Some(depth) => UciCommand::Perft(depth),
            None => UciCommand::Unknown(trimmed.to_string()),
        },
        "stop" => UciCommand::Stop,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_depth() {
        match parse_command("go depth 6").unwrap() {
            UciCommand::Go(params) => assert_eq!(params.depth, Some(6)),
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn parses_setoption_with_value() {
        match parse_command("setoption name Hash value 128").unwrap() {
            UciCommand::SetOption { name, value } => {
                assert_eq!(name, "Hash");
                assert_eq!(value.as_deref(), Some("128"));
            }
            other => panic!("expected SetOption, got {other:?}"),
        }
    }

    #[test]
    fn parses_setoption_button_without_value() {
        match parse_command("setoption name Clear Hash").unwrap() {
            UciCommand::SetOption { name, value } => {
                assert_eq!(name, "Clear Hash");
                assert_eq!(value, None);
            }
            other => panic!("expected SetOption, got {other:?}"),
        }
    }

    #[test]
    fn unknown_verb_is_unknown() {
        assert!(matches!(parse_command("frobnicate"), Some(UciCommand::Unknown(_))));
    }

    #[test]
    fn blank_line_is_none() {
        assert!(parse_command("   ").is_none());
    }
}
