use anyhow::Result;
use clap::{Parser, Subcommand};
use pomo_ipc::Command;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pomoctl")]
#[command(about = "Control the pomo timer", long_about = None)]
struct Cli {
    /// Control socket path (defaults to pomo.sock next to this executable)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resume after a pause
    Continue,
    /// Pause the timer
    Pause,
    /// Restart the current interval from zero
    Reset,
    /// Minutes spent in the current interval
    Time,
    /// End the current interval and start the next one
    Skip,
    /// Show or change the task description
    Set {
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Shut the daemon down
    Kill,
    /// Send text to the daemon as-is
    Raw {
        #[arg(required = true)]
        text: Vec<String>,
    },
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Continue => Command::Continue,
            Commands::Pause => Command::Pause,
            Commands::Reset => Command::Reset,
            Commands::Time => Command::Time,
            Commands::Skip => Command::Skip,
            Commands::Set { description } => Command::Set { description },
            Commands::Kill => Command::Kill,
            Commands::Raw { text } => Command::Other(text.join(" ")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let socket_path = match cli.socket {
        Some(path) => path,
        None => pomo_ipc::default_socket_path()?,
    };

    let command: Command = cli.command.into();
    let response = pomo_ipc::send(&socket_path, &command).await?;
    if !response.is_empty() {
        println!("{}", response);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        let cli = Cli::try_parse_from(std::iter::once("pomoctl").chain(args.iter().copied()))
            .unwrap();
        cli.command.into()
    }

    #[test]
    fn subcommands_map_to_wire_commands() {
        assert_eq!(parse(&["continue"]), Command::Continue);
        assert_eq!(parse(&["kill"]), Command::Kill);
        assert_eq!(parse(&["set"]), Command::Set { description: None });
        assert_eq!(
            parse(&["set", "--description", "write tests"]),
            Command::Set {
                description: Some("write tests".to_string())
            }
        );
        assert_eq!(
            parse(&["raw", "hello", "there"]),
            Command::Other("hello there".to_string())
        );
    }

    #[test]
    fn socket_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["pomoctl", "time", "--socket", "/tmp/p.sock"]).unwrap();
        assert_eq!(cli.socket, Some(PathBuf::from("/tmp/p.sock")));
    }
}
