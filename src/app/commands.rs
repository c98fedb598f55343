use std::path::PathBuf;

use crate::config::PipelineMode;

/// One line typed into the terminal session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Help,
    /// Optional port number or name.
    Connect(Option<String>),
    Disconnect,
    Status,
    Capture,
    Cancel,
    Text(String),
    /// `None` accepts the recognized text unchanged.
    Commit(Option<String>),
    Dismiss,
    Mode(PipelineMode),
    Sample(PathBuf),
    Quit,
}

pub const HELP: &str = "\
Commands:
  connect [n|port]   open the plotter link
  disconnect         close the plotter link
  capture            count down, take a snapshot and draw it
  cancel             stop the countdown or drop recognized text
  text <words>       draw typed text
  commit [text]      accept (or replace) recognized text and draw it
  dismiss            clear a failure
  mode <direct|two-step>
  sample <file>      upload a handwriting sample (JSON strokes)
  status             show pipeline and connection state
  quit               leave the session";

impl SessionCommand {
    /// `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        let command = match word.to_lowercase().as_str() {
            "help" | "?" => SessionCommand::Help,
            "connect" => SessionCommand::Connect(argument),
            "disconnect" => SessionCommand::Disconnect,
            "status" => SessionCommand::Status,
            "capture" | "c" | "go" => SessionCommand::Capture,
            "cancel" => SessionCommand::Cancel,
            "text" | "write" => {
                SessionCommand::Text(argument.ok_or("usage: text <words to draw>")?)
            }
            "commit" => SessionCommand::Commit(argument),
            "dismiss" | "ok" => SessionCommand::Dismiss,
            "mode" => {
                let mode = argument.ok_or("usage: mode <direct|two-step>")?;
                SessionCommand::Mode(mode.parse()?)
            }
            "sample" => {
                SessionCommand::Sample(PathBuf::from(argument.ok_or("usage: sample <file>")?))
            }
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(format!("unknown command '{}', try `help`", other)),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(SessionCommand::parse("   "), Ok(None));
    }

    #[test]
    fn arguments_keep_inner_spacing() {
        assert_eq!(
            SessionCommand::parse("text  hello   there "),
            Ok(Some(SessionCommand::Text("hello   there".into())))
        );
        assert_eq!(
            SessionCommand::parse("commit"),
            Ok(Some(SessionCommand::Commit(None)))
        );
        assert_eq!(
            SessionCommand::parse("COMMIT abcd"),
            Ok(Some(SessionCommand::Commit(Some("abcd".into()))))
        );
    }

    #[test]
    fn mode_and_connect_arguments() {
        assert_eq!(
            SessionCommand::parse("mode two-step"),
            Ok(Some(SessionCommand::Mode(PipelineMode::TwoStep)))
        );
        assert!(SessionCommand::parse("mode").is_err());
        assert!(SessionCommand::parse("mode sideways").is_err());
        assert_eq!(
            SessionCommand::parse("connect 2"),
            Ok(Some(SessionCommand::Connect(Some("2".into()))))
        );
    }

    #[test]
    fn unknown_and_incomplete_commands_are_errors() {
        assert!(SessionCommand::parse("dance").is_err());
        assert!(SessionCommand::parse("text").is_err());
        assert!(SessionCommand::parse("sample").is_err());
    }
}
