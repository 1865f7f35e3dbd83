use std::path::PathBuf;

use clap::{value_parser, Arg, ArgMatches, Command};
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::mesh::PrimitiveShape;

/// A structural edit requested by the UI, applied between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    AddPrimitive(PrimitiveShape),
    /// Out-of-range and negative indices are no-ops.
    Remove(i64),
    ImportModel(String),
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
    SetRotating { index: usize, rotating: bool },
    List,
    Echo(String),
}

fn console() -> Command {
    Command::new("console")
        .no_binary_name(true)
        .subcommand_required(true)
        .disable_help_flag(true)
        .subcommand(
            Command::new("add")
                .about("Adds a primitive shape at the origin")
                .arg(Arg::new("shape").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("remove")
                .about("Removes the instance at an index")
                .arg(
                    Arg::new("index")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Imports a known model by name")
                .arg(Arg::new("model").required(true).num_args(1..)),
        )
        .subcommand(
            Command::new("save")
                .about("Saves the scene")
                .arg(Arg::new("path").value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("load")
                .about("Replaces the scene with a saved one")
                .arg(Arg::new("path").value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("rotate")
                .about("Turns continuous rotation on or off")
                .arg(
                    Arg::new("index")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(Arg::new("state").required(true).value_parser(["on", "off"])),
        )
        .subcommand(Command::new("list").about("Lists the scene's instances"))
        .subcommand(
            Command::new("echo")
                .about("Prints text")
                .arg(Arg::new("text").required(true).num_args(1..)),
        )
}

fn joined(matches: &ArgMatches, id: &str) -> String {
    matches
        .get_many::<String>(id)
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Parses one console line. Errors are ready to print.
pub fn parse_console_command(line: &str) -> Result<EditorCommand, String> {
    let args = shell_words::split(line).map_err(|e| format!("Error parsing command: {}", e))?;

    let matches = console()
        .try_get_matches_from(args)
        .map_err(|e| e.to_string().trim_end().to_string())?;

    match matches.subcommand() {
        Some(("add", sub)) => {
            let name = joined(sub, "shape");
            PrimitiveShape::from_name(&name)
                .map(EditorCommand::AddPrimitive)
                .ok_or_else(|| format!("Unknown shape {:?}", name))
        }
        Some(("remove", sub)) => {
            let index = sub.get_one::<i64>("index").copied().unwrap_or(-1);
            Ok(EditorCommand::Remove(index))
        }
        Some(("import", sub)) => Ok(EditorCommand::ImportModel(joined(sub, "model"))),
        Some(("save", sub)) => Ok(EditorCommand::Save(sub.get_one::<PathBuf>("path").cloned())),
        Some(("load", sub)) => Ok(EditorCommand::Load(sub.get_one::<PathBuf>("path").cloned())),
        Some(("rotate", sub)) => {
            let index = sub.get_one::<usize>("index").copied().unwrap_or_default();
            let rotating = sub.get_one::<String>("state").map(String::as_str) == Some("on");
            Ok(EditorCommand::SetRotating { index, rotating })
        }
        Some(("list", _)) => Ok(EditorCommand::List),
        Some(("echo", sub)) => Ok(EditorCommand::Echo(joined(sub, "text"))),
        _ => Err("Unknown command or syntax error".to_string()),
    }
}

/// Edits queued by the UI during a frame and drained by the frame loop.
pub struct CommandQueue {
    tx: Sender<EditorCommand>,
    rx: Receiver<EditorCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<EditorCommand> {
        self.tx.clone()
    }

    pub fn push(&self, command: EditorCommand) {
        // Both ends live in self, so the channel cannot be disconnected.
        let _ = self.tx.send(command);
    }

    pub fn drain(&self) -> Vec<EditorCommand> {
        self.rx.try_iter().collect()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_word_shapes_and_models() {
        assert_eq!(
            parse_console_command("add tapered cylinder"),
            Ok(EditorCommand::AddPrimitive(PrimitiveShape::TaperedCylinder))
        );
        assert_eq!(
            parse_console_command("import Stanford Bunny"),
            Ok(EditorCommand::ImportModel("Stanford Bunny".into()))
        );
        assert_eq!(
            parse_console_command("import \"Stanford Bunny\""),
            Ok(EditorCommand::ImportModel("Stanford Bunny".into()))
        );
    }

    #[test]
    fn negative_removal_indices_parse() {
        assert_eq!(parse_console_command("remove -1"), Ok(EditorCommand::Remove(-1)));
        assert_eq!(parse_console_command("remove 3"), Ok(EditorCommand::Remove(3)));
        assert!(parse_console_command("remove first").is_err());
    }

    #[test]
    fn optional_paths() {
        assert_eq!(parse_console_command("save"), Ok(EditorCommand::Save(None)));
        assert_eq!(
            parse_console_command("load 'my scenes/den.json'"),
            Ok(EditorCommand::Load(Some(PathBuf::from("my scenes/den.json"))))
        );
    }

    #[test]
    fn rotate_takes_on_or_off() {
        assert_eq!(
            parse_console_command("rotate 2 on"),
            Ok(EditorCommand::SetRotating { index: 2, rotating: true })
        );
        assert_eq!(
            parse_console_command("rotate 0 off"),
            Ok(EditorCommand::SetRotating { index: 0, rotating: false })
        );
        assert!(parse_console_command("rotate 0 sideways").is_err());
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse_console_command("").is_err());
        assert!(parse_console_command("fly away").is_err());
        assert!(parse_console_command("echo \"unterminated").is_err());
        assert_eq!(
            parse_console_command("add hexagon"),
            Err("Unknown shape \"hexagon\"".to_string())
        );
        assert_eq!(
            parse_console_command("echo hello   world"),
            Ok(EditorCommand::Echo("hello world".into()))
        );
    }

    #[test]
    fn queue_drains_in_order() {
        let queue = CommandQueue::new();
        let sender = queue.sender();
        queue.push(EditorCommand::List);
        sender.send(EditorCommand::Remove(0)).unwrap();

        assert_eq!(queue.drain(), vec![EditorCommand::List, EditorCommand::Remove(0)]);
        assert!(queue.drain().is_empty());
    }
}
