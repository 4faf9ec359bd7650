use std::path::PathBuf;
use std::process::Stdio;

use crate::command::CommandError;

/// Abstraction over external CLI execution (`npm`, `docker`, `aws`) for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command and capture stdout.
    async fn exec(&self, program: &str, args: &[String]) -> Result<String, CommandError>;

    /// Execute a command, streaming output to the terminal.
    async fn exec_streaming(&self, program: &str, args: &[String]) -> Result<(), CommandError>;

    /// Execute a command with data piped to stdin, capturing stdout.
    async fn exec_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, CommandError>;
}

impl<E: CommandExecutor> CommandExecutor for &E {
    async fn exec(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        (**self).exec(program, args).await
    }

    async fn exec_streaming(&self, program: &str, args: &[String]) -> Result<(), CommandError> {
        (**self).exec_streaming(program, args).await
    }

    async fn exec_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, CommandError> {
        (**self).exec_with_stdin(program, args, stdin_data).await
    }
}

/// Spawns real processes in a fixed working directory with a fixed set of
/// extra environment variables.
#[derive(Default)]
pub struct RealExecutor {
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl RealExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn envs(mut self, envs: Vec<(String, String)>) -> Self {
        self.envs = envs;
        self
    }

    fn command(&self, program: &str, args: &[String]) -> tokio::process::Command {
        tracing::debug!(program, ?args, "exec");

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

impl CommandExecutor for RealExecutor {
    async fn exec(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let output = self
            .command(program, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(program, e))?;

        capture(program, args, output)
    }

    async fn exec_streaming(&self, program: &str, args: &[String]) -> Result<(), CommandError> {
        let status = self
            .command(program, args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                program: program.to_owned(),
                args: args.to_vec(),
                stderr: format!("exit code: {status}"),
            })
        }
    }

    async fn exec_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<String, CommandError> {
        use tokio::io::AsyncWriteExt;

        let mut child = self
            .command(program, args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(stdin_data)
                .await
                .map_err(|e| stdin_error(program, e))?;
            stdin.shutdown().await.map_err(|e| stdin_error(program, e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| spawn_error(program, e))?;

        capture(program, args, output)
    }
}

fn capture(
    program: &str,
    args: &[String],
    output: std::process::Output,
) -> Result<String, CommandError> {
    if output.status.success() {
        String::from_utf8(output.stdout).map_err(|e| CommandError::InvalidUtf8 {
            program: program.to_owned(),
            source: e,
        })
    } else {
        Err(CommandError::Failed {
            program: program.to_owned(),
            args: args.to_vec(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn spawn_error(program: &str, source: std::io::Error) -> CommandError {
    CommandError::Spawn {
        program: program.to_owned(),
        source,
    }
}

fn stdin_error(program: &str, source: std::io::Error) -> CommandError {
    CommandError::StdinWrite {
        program: program.to_owned(),
        source,
    }
}
