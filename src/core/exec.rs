//! Running external programs with streamed standard I/O.
//!
//! Everything that talks to git goes through the [`Execer`] trait so the
//! process machinery can be swapped out in tests.

use crate::utils::cancel::CancelToken;
use async_trait::async_trait;
use log::debug;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command}: {status}{}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{command}: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command}: operation cancelled")]
    Cancelled { command: String },
    #[error("{command}: no output")]
    NoOutput { command: String },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl ExecError {
    /// Exit code of the process, if it ran to completion and failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::Failed { status, .. } => status.code(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled { .. })
    }
}

/// A single invocation of an external program.
#[derive(Debug, Clone)]
pub struct GitCmd {
    program: OsString,
    args: Vec<String>,
    dir: Option<PathBuf>,
    interactive: bool,
}

impl GitCmd {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Connect the program to the terminal instead of capturing its output.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    #[cfg(test)]
    pub(crate) fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Run the command to completion, discarding its output.
    pub async fn run(&self, exec: &dyn Execer, cancel: &CancelToken) -> Result<(), ExecError> {
        exec.run(self, CmdIo::default(), cancel).await
    }

    /// Run the command and return its standard output with surrounding
    /// whitespace removed.
    pub async fn output_string(
        &self,
        exec: &dyn Execer,
        cancel: &CancelToken,
    ) -> Result<String, ExecError> {
        let mut out: Vec<u8> = Vec::new();
        exec.run(
            self,
            CmdIo {
                stdin: None,
                stdout: Some(&mut out),
            },
            cancel,
        )
        .await?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

impl fmt::Display for GitCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Standard streams for a command.
///
/// A missing stdin means the program reads from an empty input.
/// A missing stdout means its output is discarded.
#[derive(Default)]
pub struct CmdIo<'a> {
    pub stdin: Option<&'a mut (dyn AsyncRead + Unpin + Send)>,
    pub stdout: Option<&'a mut (dyn AsyncWrite + Unpin + Send)>,
}

#[async_trait]
pub trait Execer: Send + Sync {
    /// Run `cmd`, streaming `io` while the program runs.
    ///
    /// Returns once the program has exited. If `cancel` fires first,
    /// the program is killed and [`ExecError::Cancelled`] is returned.
    async fn run(
        &self,
        cmd: &GitCmd,
        io: CmdIo<'_>,
        cancel: &CancelToken,
    ) -> Result<(), ExecError>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecer;

#[async_trait]
impl Execer for SystemExecer {
    async fn run(
        &self,
        cmd: &GitCmd,
        io: CmdIo<'_>,
        cancel: &CancelToken,
    ) -> Result<(), ExecError> {
        let command = cmd.to_string();
        if cancel.is_cancelled() {
            return Err(ExecError::Cancelled { command });
        }
        debug!("exec: {}", command);

        let mut process = tokio::process::Command::new(&cmd.program);
        process.args(&cmd.args).kill_on_drop(true);
        if let Some(dir) = &cmd.dir {
            process.current_dir(dir);
        }
        if cmd.interactive {
            process
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            process
                .stdin(piped_if(io.stdin.is_some()))
                .stdout(piped_if(io.stdout.is_some()))
                .stderr(Stdio::piped());
        }

        let mut child = process.spawn().map_err(|source| ExecError::Spawn {
            command: command.clone(),
            source,
        })?;

        let outcome = tokio::select! {
            res = drive(&mut child, io) => Some(res),
            () = cancel.cancelled() => None,
        };

        match outcome {
            Some(Ok((status, _))) if status.success() => Ok(()),
            Some(Ok((status, stderr))) => Err(ExecError::Failed {
                command,
                status,
                stderr,
            }),
            Some(Err(source)) => Err(ExecError::Io { command, source }),
            None => {
                let _ = child.kill().await;
                debug!("killed after cancellation: {}", command);
                Err(ExecError::Cancelled { command })
            }
        }
    }
}

fn piped_if(piped: bool) -> Stdio {
    if piped {
        Stdio::piped()
    } else {
        Stdio::null()
    }
}

/// Pumps the child's standard streams concurrently and waits for it to exit.
async fn drive(child: &mut Child, io: CmdIo<'_>) -> io::Result<(ExitStatus, String)> {
    let CmdIo { stdin, stdout } = io;
    let stdin_pipe = child.stdin.take();
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let feed = async move {
        if let (Some(src), Some(mut pipe)) = (stdin, stdin_pipe) {
            match tokio::io::copy(&mut *src, &mut pipe).await {
                Ok(_) => {}
                // The program stopped reading; its exit status tells the story.
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
                Err(err) => return Err(err),
            }
            drop(pipe);
        }
        Ok::<(), io::Error>(())
    };

    let drain = async move {
        if let (Some(sink), Some(mut pipe)) = (stdout, stdout_pipe) {
            tokio::io::copy(&mut pipe, &mut *sink).await?;
            sink.flush().await?;
        }
        Ok::<(), io::Error>(())
    };

    let errors = async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stderr_pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok::<String, io::Error>(String::from_utf8_lossy(&buf).trim().to_string())
    };

    let ((), (), stderr) = tokio::try_join!(feed, drain, errors)?;
    let status = child.wait().await?;
    Ok((status, stderr))
}
