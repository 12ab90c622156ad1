use std::path::Path;
use std::process::Command;

/// Captured outcome of one external process invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

impl CommandOutput {
    /// Spawn-level failure, normalized into an ordinary failed output so it
    /// never propagates past the dispatcher.
    pub fn spawn_error(e: impl std::fmt::Display) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("Command error: {}", e),
            success: false,
            exit_code: -1,
        }
    }
}

/// Trait for spawning external processes - the single boundary through which
/// every trigger action reaches the outside world. Tests substitute a
/// recording implementation to count and inspect invocations.
pub trait ProcessRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> CommandOutput;
}

/// Local subprocess implementation.
pub struct LocalRunner;

impl LocalRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for LocalRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> CommandOutput {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        match cmd.output() {
            Ok(out) => CommandOutput {
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                success: out.status.success(),
                exit_code: out.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput::spawn_error(e),
        }
    }
}
