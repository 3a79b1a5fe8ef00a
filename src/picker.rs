use futures::future::{self, BoxFuture, FutureExt};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Exit status a picker uses to report that the user closed it.
const CANCEL_STATUS: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Cancelled,
    Failed(String),
    Selected(String),
}

#[derive(Debug, Error)]
pub enum PickError {
    #[error("no photo picker configured")]
    Unconfigured,
    #[error("failed to launch photo picker '{command}': {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
    #[error("photo picker '{command}' returned a path that is not UTF-8")]
    NotUtf8 { command: String },
    #[error("photo picker '{command}' exited with {status}: {stderr}")]
    Exited {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

impl From<PickError> for PickOutcome {
    fn from(err: PickError) -> Self {
        PickOutcome::Failed(err.to_string())
    }
}

/// Asks the user for one photo. The returned future resolves exactly once.
pub trait PhotoPicker {
    fn pick(&self) -> BoxFuture<'static, PickOutcome>;
}

pub struct UnconfiguredPicker;

impl PhotoPicker for UnconfiguredPicker {
    fn pick(&self) -> BoxFuture<'static, PickOutcome> {
        future::ready(PickError::Unconfigured.into()).boxed()
    }
}

/// Runs an external program (e.g. `zenity --file-selection`) and reads the
/// chosen path from its stdout. The program must not draw on the terminal.
#[derive(Debug, Clone)]
pub struct CommandPicker {
    program: String,
    args: Vec<String>,
}

impl CommandPicker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandPicker {
            program: program.into(),
            args,
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self) -> Result<Option<String>, PickError> {
        tracing::debug!(command = %self.command_line(), "launching photo picker");
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| PickError::Launch {
                command: self.command_line(),
                source,
            })?;

        if output.status.success() {
            let path = String::from_utf8(output.stdout).map_err(|_| PickError::NotUtf8 {
                command: self.command_line(),
            })?;
            let path = path.trim();
            return Ok(Some(path.to_string()).filter(|p| !p.is_empty()));
        }
        if output.status.code() == Some(CANCEL_STATUS) {
            return Ok(None);
        }
        Err(PickError::Exited {
            command: self.command_line(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl PhotoPicker for CommandPicker {
    fn pick(&self) -> BoxFuture<'static, PickOutcome> {
        let picker = self.clone();
        async move {
            match picker.run().await {
                Ok(Some(path)) => PickOutcome::Selected(path),
                Ok(None) => PickOutcome::Cancelled,
                Err(err) => err.into(),
            }
        }
        .boxed()
    }
}

/// Builds the picker for a configured command line; an empty one means none.
pub fn from_command(command: &[String]) -> Box<dyn PhotoPicker> {
    match command.split_first() {
        Some((program, args)) => Box::new(CommandPicker::new(program.clone(), args.to_vec())),
        None => Box::new(UnconfiguredPicker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandPicker {
        CommandPicker::new("sh", vec!["-c".into(), script.into()])
    }

    #[tokio::test]
    async fn unconfigured_picker_fails() {
        let outcome = from_command(&[]).pick().await;
        assert_eq!(outcome, PickOutcome::Failed("no photo picker configured".into()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn selected_path_is_trimmed() {
        let outcome = sh("echo '  /tmp/monstera.jpg  '").pick().await;
        assert_eq!(outcome, PickOutcome::Selected("/tmp/monstera.jpg".into()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancel_status_and_empty_output_cancel() {
        assert_eq!(sh("exit 1").pick().await, PickOutcome::Cancelled);
        assert_eq!(sh("true").pick().await, PickOutcome::Cancelled);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn other_failures_carry_stderr() {
        match sh("echo broken >&2; exit 3").pick().await {
            PickOutcome::Failed(reason) => assert!(reason.contains("broken"), "{reason}"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_path_fails_instead_of_being_mangled() {
        match sh("printf '/tmp/\\377.jpg'").pick().await {
            PickOutcome::Failed(reason) => assert!(reason.contains("not UTF-8"), "{reason}"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_fails_to_launch() {
        let picker = from_command(&["plant-diary-no-such-picker".to_string()]);
        match picker.pick().await {
            PickOutcome::Failed(reason) => assert!(reason.starts_with("failed to launch")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
