//! Line commands understood by the terminal front end.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{MadeStatus, ProfileField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    SendImage { path: PathBuf, text: String },
    New,
    List,
    Open(i64),
    Close,
    Profile,
    Edit {
        field: ProfileField,
        index: usize,
        value: String,
    },
    Add { field: ProfileField, value: String },
    Remove { field: ProfileField, index: usize },
    Save,
    Cancel,
    Setup,
    Feedback {
        rating: u8,
        status: MadeStatus,
        comments: String,
    },
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: /{0}")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown profile field: {0}")]
    Field(String),
}

pub const HELP: &str = "\
Type a message to send it, or:
  /image <path> [text]        send a fridge photo
  /new                        start a new conversation
  /list                       list conversations
  /open <id>                  open a conversation
  /close                      leave the current conversation
  /profile                    show the profile
  /edit <field> <index> <v>   change an entry in the profile editor
  /add <field> <value>        add an entry in the profile editor
  /remove <field> <index>     remove an entry in the profile editor
  /save                       save profile edits
  /cancel                     discard profile edits
  /setup                      run first-time setup
  /feedback <1-10> <made|not_made|planned> [comments]
  /reset                      delete all data
  /quit";

/// Parse one input line. Returns `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Send(line.to_string())));
    };

    let (name, args) = split_word(rest);
    let command = match name {
        "image" => {
            let (path, text) = split_word(args);
            if path.is_empty() {
                return Err(ParseError::Usage("/image <path> [text]"));
            }
            Command::SendImage {
                path: PathBuf::from(path),
                text: text.to_string(),
            }
        }
        "new" => Command::New,
        "list" | "ls" => Command::List,
        "open" => Command::Open(
            args.parse()
                .map_err(|_| ParseError::Usage("/open <id>"))?,
        ),
        "close" => Command::Close,
        "profile" => Command::Profile,
        "edit" => {
            let (field, rest) = split_word(args);
            let (index, value) = split_word(rest);
            let index = index
                .parse()
                .map_err(|_| ParseError::Usage("/edit <field> <index> <value>"))?;
            Command::Edit {
                field: parse_field(field)?,
                index,
                value: value.to_string(),
            }
        }
        "add" => {
            let (field, value) = split_word(args);
            Command::Add {
                field: parse_field(field)?,
                value: value.to_string(),
            }
        }
        "remove" | "rm" => {
            let (field, index) = split_word(args);
            let index = index
                .parse()
                .map_err(|_| ParseError::Usage("/remove <field> <index>"))?;
            Command::Remove {
                field: parse_field(field)?,
                index,
            }
        }
        "save" => Command::Save,
        "cancel" => Command::Cancel,
        "setup" => Command::Setup,
        "feedback" => {
            const USAGE: &str = "/feedback <1-10> <made|not_made|planned> [comments]";
            let (rating, rest) = split_word(args);
            let (status, comments) = split_word(rest);
            Command::Feedback {
                rating: rating.parse().map_err(|_| ParseError::Usage(USAGE))?,
                status: MadeStatus::from_str(status).ok_or(ParseError::Usage(USAGE))?,
                comments: comments.to_string(),
            }
        }
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (s, ""),
    }
}

fn parse_field(name: &str) -> Result<ProfileField, ParseError> {
    ProfileField::from_str(name).ok_or_else(|| ParseError::Field(name.to_string()))
}
