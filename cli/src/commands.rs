//! Line commands for the headless driver.

use std::fmt;
use std::str::{FromStr, SplitWhitespace};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Panes(usize),
    Switch { pane: usize, provider: String },
    Reset,
    Toggle,
    Show,
    Hide,
    Resize(f64),
    Anchor(f64),
    Window { width: u32, height: u32 },
    Fail { pane: usize, code: i32 },
    Crash(usize),
    Finish(usize),
    Stop(usize),
    Focus(usize),
    Blur,
    Enter,
    State,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    Usage(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::Unknown(name) => write!(f, "unknown command `{name}` (try `help`)"),
            ParseError::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

pub const HELP: &str = "\
panes N              set pane count (1-4)
switch P KEY         switch pane P to provider KEY
reset                reset every pane to its provider home
toggle | show | hide quick prompt visibility
resize H             quick prompt height
anchor N             quick prompt anchor pane
window W H           host window size
fail P CODE          simulate a main-frame load failure on pane P
crash P              simulate a renderer crash on pane P
finish P             simulate pane P finishing its load
stop P               simulate pane P stopping all loading
focus P              simulate the user clicking into pane P
blur                 simulate the quick prompt losing focus
enter                press Enter in the quick prompt
state                print engine state
quit                 exit";

fn arg<T: FromStr>(
    parts: &mut SplitWhitespace<'_>,
    usage: &'static str,
) -> Result<T, ParseError> {
    parts
        .next()
        .and_then(|raw| raw.parse().ok())
        .ok_or(ParseError::Usage(usage))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(ParseError::Empty);
        };
        let command = match name.to_ascii_lowercase().as_str() {
            "panes" => Command::Panes(arg(&mut parts, "panes N")?),
            "switch" => {
                let pane = arg(&mut parts, "switch P KEY")?;
                let provider = parts.next().ok_or(ParseError::Usage("switch P KEY"))?;
                Command::Switch {
                    pane,
                    provider: provider.to_string(),
                }
            }
            "reset" => Command::Reset,
            "toggle" => Command::Toggle,
            "show" => Command::Show,
            "hide" => Command::Hide,
            "resize" => Command::Resize(arg(&mut parts, "resize H")?),
            "anchor" => Command::Anchor(arg(&mut parts, "anchor N")?),
            "window" => Command::Window {
                width: arg(&mut parts, "window W H")?,
                height: arg(&mut parts, "window W H")?,
            },
            "fail" => Command::Fail {
                pane: arg(&mut parts, "fail P CODE")?,
                code: arg(&mut parts, "fail P CODE")?,
            },
            "crash" => Command::Crash(arg(&mut parts, "crash P")?),
            "finish" => Command::Finish(arg(&mut parts, "finish P")?),
            "stop" => Command::Stop(arg(&mut parts, "stop P")?),
            "focus" => Command::Focus(arg(&mut parts, "focus P")?),
            "blur" => Command::Blur,
            "enter" => Command::Enter,
            "state" => Command::State,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
