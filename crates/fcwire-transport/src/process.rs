use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};

/// How to launch the flight-controller bridge process.
#[derive(Debug, Clone)]
pub struct PeerCommand {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments passed before the bridge script path.
    pub args: Vec<String>,
}

impl PeerCommand {
    /// Launch an arbitrary program with the given arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Launch the standard bridge script from a module folder.
    ///
    /// Runs `python2 -u <folder>/dronekit_functions.py`. Unbuffered mode is
    /// required: the protocol depends on the peer flushing every line as it
    /// is produced.
    pub fn bridge_script(module_folder: impl Into<PathBuf>) -> Self {
        let script = module_folder.into().join("dronekit_functions.py");
        Self::new("python2")
            .arg("-u")
            .arg(script.to_string_lossy().into_owned())
    }
}

impl Default for PeerCommand {
    fn default() -> Self {
        Self::bridge_script("")
    }
}

/// The stdin/stdout pipe ends of a running peer, taken once.
#[derive(Debug)]
pub struct PeerStdio {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// A running peer process with piped stdin/stdout.
///
/// The child is killed and reaped on drop. Use [`PeerProcess::take_stdio`]
/// to obtain the pipe ends for a line reader/writer pair.
pub struct PeerProcess {
    child: Child,
    program: PathBuf,
}

impl PeerProcess {
    /// Spawn the peer with piped stdin/stdout.
    pub fn spawn(command: &PeerCommand) -> Result<Self> {
        debug!(program = %command.program.display(), args = ?command.args, "spawning peer");
        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        info!(program = %command.program.display(), pid = child.id(), "peer started");
        Ok(Self {
            child,
            program: command.program.clone(),
        })
    }

    /// Take the stdin/stdout pipe ends. Can only be called once.
    pub fn take_stdio(&mut self) -> Result<PeerStdio> {
        match (self.child.stdin.take(), self.child.stdout.take()) {
            (Some(stdin), Some(stdout)) => Ok(PeerStdio { stdin, stdout }),
            (None, None) => Err(TransportError::StdioTaken),
            (None, _) => Err(TransportError::MissingPipe("stdin")),
            (_, None) => Err(TransportError::MissingPipe("stdout")),
        }
    }

    /// OS process id of the peer.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// True if the peer has exited.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kill the peer and reap it.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(program = %self.program.display(), %status, "peer already exited");
                return Ok(());
            }
            Ok(None) => {}
            Err(err) => return Err(TransportError::Io(err)),
        }
        self.child.kill()?;
        let status = self.child.wait()?;
        info!(program = %self.program.display(), %status, "peer stopped");
        Ok(())
    }
}

impl Drop for PeerProcess {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "failed to stop peer on drop");
        }
    }
}

impl std::fmt::Debug for PeerProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerProcess")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::line::{LineReader, LineWriter};

    use super::*;

    #[test]
    fn spawn_nonexistent_program_fails() {
        let cmd = PeerCommand::new("/nonexistent/fcwire-test-peer");
        let err = PeerProcess::spawn(&cmd).unwrap_err();
        assert!(matches!(err, TransportError::Spawn { .. }));
    }

    #[test]
    fn cat_peer_echoes_lines() {
        let cmd = PeerCommand::new("cat");
        let mut peer = PeerProcess::spawn(&cmd).expect("cat should spawn");
        let stdio = peer.take_stdio().expect("pipes should be present");

        let mut writer = LineWriter::new(stdio.stdin);
        let mut reader = LineReader::new(stdio.stdout);

        writer.write_line("getAltitude").unwrap();
        assert_eq!(reader.read_line().unwrap(), "getAltitude");

        peer.shutdown().expect("peer should stop");
    }

    #[test]
    fn take_stdio_twice_fails() {
        let cmd = PeerCommand::new("cat");
        let mut peer = PeerProcess::spawn(&cmd).expect("cat should spawn");
        let _stdio = peer.take_stdio().expect("first take should succeed");
        let err = peer.take_stdio().unwrap_err();
        assert!(matches!(err, TransportError::StdioTaken));
    }

    #[test]
    fn reader_sees_closed_after_peer_exit() {
        let cmd = PeerCommand::new("true");
        let mut peer = PeerProcess::spawn(&cmd).expect("true should spawn");
        let stdio = peer.take_stdio().expect("pipes should be present");

        let mut reader = LineReader::new(stdio.stdout);
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[test]
    fn bridge_script_builds_unbuffered_python_invocation() {
        let cmd = PeerCommand::bridge_script("/opt/fc");
        assert_eq!(cmd.program, PathBuf::from("python2"));
        assert_eq!(cmd.args[0], "-u");
        assert!(cmd.args[1].ends_with("dronekit_functions.py"));
    }
}
