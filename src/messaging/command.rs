// Types de commandes - Communication REPL → Session
// Une commande par ligne : un mot-clé suivi de ses arguments, séparés par des espaces.

use crate::generator::{GeneratorKind, IntervalSlider, NoteValue};
use crate::sequencer::SlotId;
use crate::theory::{Mode, Pitch, TheoryError};
use std::str::FromStr;

/// Every control the performer can reach
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetTempo(u32),
    SetIntensity(f32),
    SetHumanize(bool),
    SetTimingVariation(u32),
    SetRestProbability(u8),
    SetIntervalWeight(IntervalSlider, u32),
    SetDurationWeight(NoteValue, u32),
    SetLowNote(Pitch),
    SetHighNote(Pitch),
    /// Raw key label; unrecognized labels resolve to C
    SetRoot(String),
    SetMode(Mode),
    SelectSlot(SlotId),
    StartRecording,
    StopRecording,
    PlayPattern,
    ClearPattern,
    StartLoop(GeneratorKind),
    StopLoop,
    PlayRandomNote,
    PlayChord,
    PressKey(Pitch),
    StartCapture,
    StopCapture,
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: String,
        expected: &'static str,
    },

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: String, value: String },

    #[error(transparent)]
    Pitch(#[from] TheoryError),
}

/// Usage lines printed by the `help` command of the REPL
pub const COMMAND_HELP: &[&str] = &[
    "tempo <bpm>              intensity <0..1>        humanize on|off",
    "variation <ms>           rest <0..100>",
    "interval unison|2nd|3rd|4th|5th|6th <weight>",
    "duration whole|half|quarter|eighth|sixteenth|dotted-quarter <weight>",
    "low <pitch>              high <pitch>            root <key>      mode <name>",
    "slot A|B|C|D             record start|stop       pattern play|clear",
    "loop note|chord|stop     note                    chord           key <pitch>",
    "capture start|stop       status                  quit",
];

struct Args<'a> {
    command: &'a str,
    rest: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self, expected: &'static str) -> Result<&'a str, CommandParseError> {
        self.rest.next().ok_or_else(|| CommandParseError::MissingArgument {
            command: self.command.to_string(),
            expected,
        })
    }

    fn parse<T: FromStr>(&mut self, expected: &'static str) -> Result<T, CommandParseError> {
        let raw = self.next(expected)?;
        raw.parse().map_err(|_| self.invalid(raw))
    }

    fn invalid(&self, value: &str) -> CommandParseError {
        CommandParseError::InvalidArgument {
            command: self.command.to_string(),
            value: value.to_string(),
        }
    }
}

fn parse_switch(args: &mut Args<'_>, expected: &'static str) -> Result<bool, CommandParseError> {
    let raw = args.next(expected)?;
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(args.invalid(raw)),
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let keyword = words.next().ok_or(CommandParseError::Empty)?;
        let command = keyword.to_ascii_lowercase();
        let mut args = Args {
            command: keyword,
            rest: words,
        };

        let parsed = match command.as_str() {
            "tempo" | "bpm" => Command::SetTempo(args.parse("a tempo in BPM")?),
            "intensity" | "velocity" => {
                let value: f32 = args.parse("an intensity between 0 and 1")?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(args.invalid(&value.to_string()));
                }
                Command::SetIntensity(value)
            }
            "humanize" => Command::SetHumanize(parse_switch(&mut args, "on or off")?),
            "variation" | "timing" => {
                Command::SetTimingVariation(args.parse("a variation in milliseconds")?)
            }
            "rest" => {
                let value: u8 = args.parse("a percentage between 0 and 100")?;
                if value > 100 {
                    return Err(args.invalid(&value.to_string()));
                }
                Command::SetRestProbability(value)
            }
            "interval" => {
                let raw = args.next("an interval slider and a weight")?;
                let slider = IntervalSlider::from_name(raw).ok_or_else(|| args.invalid(raw))?;
                Command::SetIntervalWeight(slider, args.parse("a weight")?)
            }
            "duration" => {
                let raw = args.next("a note value and a weight")?;
                let value = NoteValue::from_name(raw).ok_or_else(|| args.invalid(raw))?;
                Command::SetDurationWeight(value, args.parse("a weight")?)
            }
            "low" => Command::SetLowNote(args.next("a pitch such as C4")?.parse()?),
            "high" => Command::SetHighNote(args.next("a pitch such as C5")?.parse()?),
            "root" => Command::SetRoot(args.next("a key such as C#/Db")?.to_string()),
            "mode" => Command::SetMode(Mode::from_name_or_default(args.next("a mode name")?)),
            "slot" => {
                let raw = args.next("a slot letter A-D")?;
                Command::SelectSlot(raw.parse().map_err(|_| args.invalid(raw))?)
            }
            "record" => match args.next("start or stop")?.to_ascii_lowercase().as_str() {
                "start" => Command::StartRecording,
                "stop" => Command::StopRecording,
                other => return Err(args.invalid(other)),
            },
            "pattern" => match args.next("play or clear")?.to_ascii_lowercase().as_str() {
                "play" => Command::PlayPattern,
                "clear" => Command::ClearPattern,
                other => return Err(args.invalid(other)),
            },
            "loop" => match args.next("note, chord or stop")?.to_ascii_lowercase().as_str() {
                "note" => Command::StartLoop(GeneratorKind::Note),
                "chord" => Command::StartLoop(GeneratorKind::Chord),
                "stop" => Command::StopLoop,
                other => return Err(args.invalid(other)),
            },
            "note" => Command::PlayRandomNote,
            "chord" => Command::PlayChord,
            "key" | "press" => Command::PressKey(args.next("a pitch such as E4")?.parse()?),
            "capture" => match args.next("start or stop")?.to_ascii_lowercase().as_str() {
                "start" => Command::StartCapture,
                "stop" => Command::StopCapture,
                other => return Err(args.invalid(other)),
            },
            "status" => Command::Status,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandParseError::UnknownCommand(keyword.to_string())),
        };
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameters() {
        assert_eq!("tempo 120".parse::<Command>(), Ok(Command::SetTempo(120)));
        assert_eq!("intensity 0.5".parse::<Command>(), Ok(Command::SetIntensity(0.5)));
        assert_eq!("humanize on".parse::<Command>(), Ok(Command::SetHumanize(true)));
        assert_eq!("rest 25".parse::<Command>(), Ok(Command::SetRestProbability(25)));
        assert_eq!(
            "interval 2nd 40".parse::<Command>(),
            Ok(Command::SetIntervalWeight(IntervalSlider::Second, 40))
        );
        assert_eq!(
            "duration dotted-quarter 7".parse::<Command>(),
            Ok(Command::SetDurationWeight(NoteValue::DottedQuarter, 7))
        );
    }

    #[test]
    fn test_parse_transport() {
        assert_eq!("slot c".parse::<Command>(), Ok(Command::SelectSlot(SlotId::C)));
        assert_eq!("record start".parse::<Command>(), Ok(Command::StartRecording));
        assert_eq!("pattern play".parse::<Command>(), Ok(Command::PlayPattern));
        assert_eq!("loop chord".parse::<Command>(), Ok(Command::StartLoop(GeneratorKind::Chord)));
        assert_eq!("LOOP stop".parse::<Command>(), Ok(Command::StopLoop));
        assert_eq!("capture stop".parse::<Command>(), Ok(Command::StopCapture));
    }

    #[test]
    fn test_parse_pitches_and_keys() {
        let e4: Pitch = "E4".parse().unwrap();
        assert_eq!("key E4".parse::<Command>(), Ok(Command::PressKey(e4)));
        assert_eq!("root C#/Db".parse::<Command>(), Ok(Command::SetRoot("C#/Db".to_string())));
        assert_eq!("mode nonsense".parse::<Command>(), Ok(Command::SetMode(Mode::Ionian)));
        assert!(matches!(
            "low H4".parse::<Command>(),
            Err(CommandParseError::Pitch(TheoryError::UnknownPitch(_)))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandParseError::Empty));
        assert!(matches!(
            "dance".parse::<Command>(),
            Err(CommandParseError::UnknownCommand(_))
        ));
        assert!(matches!(
            "tempo".parse::<Command>(),
            Err(CommandParseError::MissingArgument { .. })
        ));
        assert!(matches!(
            "rest 150".parse::<Command>(),
            Err(CommandParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            "intensity 2".parse::<Command>(),
            Err(CommandParseError::InvalidArgument { .. })
        ));
    }
}
