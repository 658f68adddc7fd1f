use std::io::BufRead;

use anyhow::{anyhow, bail};
use stickwork_domain::Hand;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Stroke { hand: Hand, velocity: Option<f32> },
    Level(u32),
    Status,
    Quit,
    Empty,
}

pub fn parse(line: &str) -> anyhow::Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Empty);
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "l" | "a" | "left" => stroke(Hand::Left, words.next())?,
        "r" | "d" | "right" => stroke(Hand::Right, words.next())?,
        "level" | "goto" => {
            let level = words
                .next()
                .ok_or_else(|| anyhow!("usage: level <number>"))?
                .parse::<u32>()
                .map_err(|_| anyhow!("level must be a positive number"))?;
            Command::Level(level)
        }
        "status" | "s" => Command::Status,
        "quit" | "q" | "exit" => Command::Quit,
        other => bail!("unknown command `{other}`"),
    };
    if let Some(extra) = words.next() {
        bail!("unexpected `{extra}`");
    }
    Ok(command)
}

/// Reads the next line, replacing invalid UTF-8. `None` at end of input.
pub fn next_line<R: BufRead>(reader: &mut R, raw: &mut Vec<u8>) -> Option<String> {
    raw.clear();
    match reader.read_until(b'\n', raw) {
        Ok(0) => None,
        Ok(_) => Some(String::from_utf8_lossy(raw).into_owned()),
        Err(err) => {
            warn!(error = %err, "failed to read input");
            None
        }
    }
}

fn stroke(hand: Hand, velocity: Option<&str>) -> anyhow::Result<Command> {
    let velocity = match velocity {
        Some(raw) => {
            let value: f32 = raw
                .parse()
                .map_err(|_| anyhow!("velocity must be a number, got `{raw}`"))?;
            if !(0.0..=1.0).contains(&value) {
                bail!("velocity must be between 0 and 1");
            }
            Some(value)
        }
        None => None,
    };
    Ok(Command::Stroke { hand, velocity })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strokes() {
        assert_eq!(
            parse("r").unwrap(),
            Command::Stroke {
                hand: Hand::Right,
                velocity: None
            }
        );
        assert_eq!(
            parse("  A ").unwrap(),
            Command::Stroke {
                hand: Hand::Left,
                velocity: None
            }
        );
        assert_eq!(
            parse("left 0.5").unwrap(),
            Command::Stroke {
                hand: Hand::Left,
                velocity: Some(0.5)
            }
        );
    }

    #[test]
    fn parses_navigation_and_control() {
        assert_eq!(parse("level 3").unwrap(), Command::Level(3));
        assert_eq!(parse("status").unwrap(), Command::Status);
        assert_eq!(parse("q").unwrap(), Command::Quit);
        assert_eq!(parse("").unwrap(), Command::Empty);
    }

    #[test]
    fn invalid_utf8_line_does_not_end_input() {
        let mut reader = std::io::Cursor::new(b"r\n\xff\xfe\nl\n".to_vec());
        let mut raw = Vec::new();
        let lines: Vec<String> = std::iter::from_fn(|| next_line(&mut reader, &mut raw)).collect();
        assert_eq!(lines.len(), 3);
        assert!(parse(&lines[1]).is_err());
        assert_eq!(
            parse(&lines[2]).unwrap(),
            Command::Stroke {
                hand: Hand::Left,
                velocity: None
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse("x").is_err());
        assert!(parse("level").is_err());
        assert!(parse("level -2").is_err());
        assert!(parse("r 1.5").is_err());
        assert!(parse("r loud").is_err());
        assert!(parse("r 0.5 extra").is_err());
    }
}
