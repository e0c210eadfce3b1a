use converter_core::{Msg, OutputFormat};

pub const HELP_TEXT: &str = "\
Commands:
  count <n>           set the number of link fields, 1 to 100 (clears them)
  link <n> <url>      fill link field n (1-based)
  format <mp3|mp4>    choose the output format
  submit              start converting
  show                print the form
  help                print this help
  quit                leave (waits for a running conversion)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Show,
    Help,
    Quit,
    /// Not understood; carries a hint for the user.
    Invalid(String),
}

/// Parse one line typed on the form. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "count" => Command::Dispatch(Msg::LinkCountChanged(rest.to_string())),
        "link" => parse_link(rest),
        "format" => match rest.parse::<OutputFormat>() {
            Ok(format) => Command::Dispatch(Msg::FormatSelected(format)),
            Err(err) => Command::Invalid(err.to_string()),
        },
        "submit" => Command::Dispatch(Msg::SubmitClicked),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command {other:?}; type `help`")),
    };
    Some(command)
}

fn parse_link(rest: &str) -> Command {
    let (number, value) = match rest.split_once(char::is_whitespace) {
        Some((number, value)) => (number, value.trim()),
        None => (rest, ""),
    };
    match number.parse::<usize>() {
        Ok(position) if position >= 1 => Command::Dispatch(Msg::LinkEdited {
            index: position - 1,
            value: value.to_string(),
        }),
        _ => Command::Invalid("usage: link <n> <url> (fields are numbered from 1)".to_string()),
    }
}
