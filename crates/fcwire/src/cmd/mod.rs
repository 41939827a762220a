use std::path::PathBuf;

use clap::{Args, Subcommand};
use fcwire_client::PeerVehicle;
use fcwire_protocol::SessionConfig;
use fcwire_transport::PeerCommand;

use crate::exit::{client_error, CliResult};
use crate::output::OutputFormat;

pub mod exec;
pub mod mission;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single command to the peer and print the reply.
    Exec(ExecArgs),
    /// Fly the scripted demo mission (take off, waypoints, land).
    Mission(MissionArgs),
    /// Show version information.
    Version,
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Exec(args) => exec::run(args, format),
        Command::Mission(args) => mission::run(args),
        Command::Version => version::run(format),
    }
}

/// How to reach the peer; shared by every subcommand that talks to it.
#[derive(Args, Debug)]
pub struct PeerArgs {
    /// Folder containing the bridge script (launched with python2 -u).
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub module_folder: Option<PathBuf>,

    /// Launch this program instead of the bridge script.
    #[arg(long, value_name = "PATH", conflicts_with = "module_folder")]
    pub peer_program: Option<PathBuf>,

    /// Extra argument for --peer-program (repeatable).
    #[arg(long, value_name = "ARG", requires = "peer_program")]
    pub peer_arg: Vec<String>,

    /// Maximum inbound lines per command before declaring a timeout.
    #[arg(long, value_name = "N", default_value_t = fcwire_protocol::DEFAULT_LINE_BUDGET)]
    pub line_budget: usize,
}

impl PeerArgs {
    pub fn peer_command(&self) -> PeerCommand {
        match &self.peer_program {
            Some(program) => {
                let mut command = PeerCommand::new(program.clone());
                for arg in &self.peer_arg {
                    command = command.arg(arg.clone());
                }
                command
            }
            None => PeerCommand::bridge_script(self.module_folder.clone().unwrap_or_default()),
        }
    }

    pub fn launch(&self) -> CliResult<PeerVehicle> {
        let config = SessionConfig {
            line_budget: self.line_budget,
        };
        PeerVehicle::launch_with_config(&self.peer_command(), config)
            .map_err(|err| client_error("failed to launch peer", err))
    }
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub peer: PeerArgs,

    /// Command name and arguments, written as one line.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MissionArgs {
    #[command(flatten)]
    pub peer: PeerArgs,

    /// Number of waypoints to fly before landing.
    #[arg(long, default_value_t = 5)]
    pub waypoints: u32,

    /// Distance between consecutive waypoints, in metres east.
    #[arg(long, default_value_t = 20.0)]
    pub step_metres: f64,

    /// Delay between position polls, in milliseconds.
    #[arg(long, default_value_t = 250)]
    pub poll_interval_ms: u64,
}
