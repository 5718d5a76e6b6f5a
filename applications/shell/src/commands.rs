//! Line commands understood by the shell

use crate::error::{Result, ShellError};
use std::str::FromStr;
use std::time::Duration;

/// One parsed input line
///
/// Track and playlist numbers are 1-based positions in the listings the
/// shell prints.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Play(usize),
    Pause,
    Resume,
    Toggle,
    Next,
    Prev,
    Seek(Duration),
    FastForward,
    Rewind,
    Shuffle,
    Repeat,
    Status,
    Queue,
    Playlists,
    PlaylistNew(String),
    PlaylistAdd { playlist: usize, track: usize },
    PlaylistRemove { playlist: usize, track: usize },
    PlaylistDelete(usize),
    PlaylistPlay(usize),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  list                      show the library
  play <n>                  play library track n (queues the whole library)
  pause | resume | toggle   transport control
  next | prev               skip within the queue
  seek <secs>               jump to a position
  ff | rw                   jump 10s forward / back
  shuffle                   toggle shuffle
  repeat                    cycle repeat off -> all -> one
  status                    show what is playing
  queue                     show the play queue
  playlists                 list playlists
  playlist new <name>       create a playlist
  playlist add <p> <n>      add library track n to playlist p
  playlist remove <p> <n>   remove track n of playlist p
  playlist delete <p>       delete playlist p
  playlist play <p>         play playlist p from the start
  help                      this text
  quit                      stop playback and exit";

impl FromStr for Command {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "play" => Self::Play(position(rest, "track")?),
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "toggle" => Self::Toggle,
            "next" => Self::Next,
            "prev" | "previous" => Self::Prev,
            "seek" => Self::Seek(seconds(rest)?),
            "ff" => Self::FastForward,
            "rw" => Self::Rewind,
            "shuffle" => Self::Shuffle,
            "repeat" => Self::Repeat,
            "status" => Self::Status,
            "queue" => Self::Queue,
            "playlists" => Self::Playlists,
            "playlist" => parse_playlist(rest)?,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "" => return Err(ShellError::parse("Empty command")),
            other => {
                return Err(ShellError::parse(format!(
                    "Unknown command '{other}', try 'help'"
                )))
            }
        };

        let takes_args = matches!(
            command,
            Self::Play(_)
                | Self::Seek(_)
                | Self::PlaylistNew(_)
                | Self::PlaylistAdd { .. }
                | Self::PlaylistRemove { .. }
                | Self::PlaylistDelete(_)
                | Self::PlaylistPlay(_)
        );
        if !takes_args && !rest.is_empty() {
            return Err(ShellError::parse(format!("'{word}' takes no arguments")));
        }
        Ok(command)
    }
}

fn parse_playlist(args: &str) -> Result<Command> {
    let (action, rest) = match args.split_once(char::is_whitespace) {
        Some((action, rest)) => (action, rest.trim()),
        None => (args, ""),
    };

    match action {
        "new" => {
            if rest.is_empty() {
                return Err(ShellError::parse("Usage: playlist new <name>"));
            }
            Ok(Command::PlaylistNew(rest.to_string()))
        }
        "add" => {
            let (playlist, track) = two_positions(rest, "playlist add <p> <n>")?;
            Ok(Command::PlaylistAdd { playlist, track })
        }
        "remove" => {
            let (playlist, track) = two_positions(rest, "playlist remove <p> <n>")?;
            Ok(Command::PlaylistRemove { playlist, track })
        }
        "delete" => Ok(Command::PlaylistDelete(position(rest, "playlist")?)),
        "play" => Ok(Command::PlaylistPlay(position(rest, "playlist")?)),
        _ => Err(ShellError::parse(
            "Usage: playlist new|add|remove|delete|play ...",
        )),
    }
}

/// Parse a 1-based position
fn position(arg: &str, kind: &str) -> Result<usize> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ShellError::parse(format!(
            "Expected a {kind} number (1 or more), got '{arg}'"
        ))),
    }
}

fn two_positions(args: &str, usage: &str) -> Result<(usize, usize)> {
    let mut parts = args.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(n), None) => Ok((position(p, "playlist")?, position(n, "track")?)),
        _ => Err(ShellError::parse(format!("Usage: {usage}"))),
    }
}

fn seconds(arg: &str) -> Result<Duration> {
    arg.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| ShellError::parse(format!("Expected seconds (0 or more), got '{arg}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("list"), Command::List);
        assert_eq!(parse("  PAUSE "), Command::Pause);
        assert_eq!(parse("prev"), Command::Prev);
        assert_eq!(parse("ff"), Command::FastForward);
        assert_eq!(parse("rw"), Command::Rewind);
        assert_eq!(parse("quit"), Command::Quit);
    }

    #[test]
    fn positional_arguments() {
        assert_eq!(parse("play 3"), Command::Play(3));
        assert_eq!(parse("seek 12.5"), Command::Seek(Duration::from_millis(12_500)));
        assert_eq!(
            parse("playlist add 1 4"),
            Command::PlaylistAdd {
                playlist: 1,
                track: 4
            }
        );
        assert_eq!(parse("playlist delete 2"), Command::PlaylistDelete(2));
        assert_eq!(parse("playlist play 1"), Command::PlaylistPlay(1));
    }

    #[test]
    fn playlist_name_keeps_spaces() {
        assert_eq!(
            parse("playlist new  Late night drive "),
            Command::PlaylistNew("Late night drive".to_string())
        );
    }

    #[test]
    fn rejects_bad_input() {
        for line in [
            "",
            "dance",
            "play",
            "play 0",
            "play x",
            "seek -1",
            "seek 1e30",
            "seek NaN",
            "seek inf",
            "seek soon",
            "pause now",
            "playlist",
            "playlist new",
            "playlist add 1",
            "playlist add 1 2 3",
            "playlist rename 1",
        ] {
            assert!(line.parse::<Command>().is_err(), "accepted '{line}'");
        }
    }
}
