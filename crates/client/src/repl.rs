//! A tiny hand-rolled tokenizer for the five terminal commands (§6). These
//! are live stdin input during an interactive session, not process argv,
//! so `clap` (used for the binary's own config-path argument) doesn't fit
//! here.

use frame::MediaClass;

/// A parsed terminal command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `CONNECT` — dial the coordinator and register.
    Connect,
    /// `LOGOUT` — disconnect gracefully.
    Logout,
    /// `LIST TEXT|MEDIA` — list local files of the given class.
    List(MediaClass),
    /// `DISTORT <file> <factor>` — request distortion of a local file.
    Distort { file: String, factor: String },
    /// `CHECK STATUS` — print the current session state (local only).
    CheckStatus,
}

/// Tokenizes one line of user input into a [`Command`], case-insensitively.
pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or_else(|| "empty command".to_string())?;

    match verb.to_ascii_uppercase().as_str() {
        "CONNECT" => Ok(Command::Connect),
        "LOGOUT" => Ok(Command::Logout),
        "LIST" => {
            let class = words
                .next()
                .ok_or_else(|| "usage: LIST TEXT|MEDIA".to_string())?;
            match class.to_ascii_uppercase().as_str() {
                "TEXT" => Ok(Command::List(MediaClass::Text)),
                "MEDIA" => Ok(Command::List(MediaClass::Media)),
                other => Err(format!("unknown class '{other}', expected TEXT or MEDIA")),
            }
        }
        "DISTORT" => {
            let file = words
                .next()
                .ok_or_else(|| "usage: DISTORT <file> <factor>".to_string())?;
            let factor = words
                .next()
                .ok_or_else(|| "usage: DISTORT <file> <factor>".to_string())?;
            Ok(Command::Distort {
                file: file.to_string(),
                factor: factor.to_string(),
            })
        }
        "CHECK" => {
            let what = words
                .next()
                .ok_or_else(|| "usage: CHECK STATUS".to_string())?;
            if what.eq_ignore_ascii_case("STATUS") {
                Ok(Command::CheckStatus)
            } else {
                Err(format!("unknown CHECK target '{what}'"))
            }
        }
        other => Err(format!("unknown command '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect_and_logout_case_insensitively() {
        assert_eq!(parse("connect").unwrap(), Command::Connect);
        assert_eq!(parse("LogOut").unwrap(), Command::Logout);
    }

    #[test]
    fn parses_list_with_class() {
        assert_eq!(parse("list text").unwrap(), Command::List(MediaClass::Text));
        assert_eq!(
            parse("LIST MEDIA").unwrap(),
            Command::List(MediaClass::Media)
        );
        assert!(parse("list audio").is_err());
    }

    #[test]
    fn parses_distort_with_file_and_factor() {
        let command = parse("DISTORT photo.jpg 2.5").unwrap();
        assert_eq!(
            command,
            Command::Distort {
                file: "photo.jpg".to_string(),
                factor: "2.5".to_string()
            }
        );
    }

    #[test]
    fn parses_check_status() {
        assert_eq!(parse("check status").unwrap(), Command::CheckStatus);
        assert!(parse("check progress").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse("flibbertigibbet").is_err());
    }

    #[test]
    fn empty_line_is_an_error() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }
}
