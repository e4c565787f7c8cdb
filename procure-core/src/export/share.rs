//! Share targets: where a finished card is handed off first.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("No share target available")]
    Unavailable,

    #[error("Failed to launch share command '{0}': {1}")]
    Spawn(String, #[source] std::io::Error),

    #[error("Share command exited with {0}")]
    Status(ExitStatus),
}

/// What gets shared.
#[derive(Debug, Clone, Copy)]
pub struct SharePayload<'a> {
    pub file: &'a Path,
    pub title: &'a str,
    pub text: &'a str,
}

/// A platform share surface.
///
/// Availability is checked with [`ShareTarget::can_share`] before every
/// attempt; a failed [`ShareTarget::share`] is not retried.
#[allow(async_fn_in_trait)]
pub trait ShareTarget {
    fn can_share(&self, file: &Path) -> bool;

    async fn share(&self, payload: SharePayload<'_>) -> Result<(), ShareError>;
}

/// Shares by running an external command.
///
/// Arguments may contain `{file}`, `{title}` and `{caption}` placeholders.
/// If none of them mentions `{file}`, the file path is appended as the last
/// argument.
#[derive(Debug, Clone, Default)]
pub struct CommandShare {
    command: Option<Vec<String>>,
}

impl CommandShare {
    pub fn new(command: Option<Vec<String>>) -> Self {
        let command = command.filter(|c| c.first().is_some_and(|p| !p.trim().is_empty()));
        Self { command }
    }

    /// A target that is never available.
    pub fn disabled() -> Self {
        Self { command: None }
    }

    pub fn is_configured(&self) -> bool {
        self.command.is_some()
    }

    /// Command line with placeholders filled in.
    pub fn build_args(&self, payload: &SharePayload<'_>) -> Option<(String, Vec<String>)> {
        let (program, rest) = self.command.as_ref()?.split_first()?;
        let file = payload.file.display().to_string();

        let mut args: Vec<String> = rest
            .iter()
            .map(|arg| {
                arg.replace("{file}", &file)
                    .replace("{title}", payload.title)
                    .replace("{caption}", payload.text)
            })
            .collect();
        if !rest.iter().any(|a| a.contains("{file}")) {
            args.push(file);
        }

        Some((program.clone(), args))
    }
}

impl ShareTarget for CommandShare {
    fn can_share(&self, file: &Path) -> bool {
        let Some(program) = self.command.as_ref().and_then(|c| c.first()) else {
            return false;
        };
        file.is_file() && resolve_program(program).is_some()
    }

    async fn share(&self, payload: SharePayload<'_>) -> Result<(), ShareError> {
        let (program, args) = self.build_args(&payload).ok_or(ShareError::Unavailable)?;
        tracing::debug!("Running share command {} {:?}", program, args);

        let status = tokio::process::Command::new(&program)
            .args(&args)
            .status()
            .await
            .map_err(|e| ShareError::Spawn(program.clone(), e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ShareError::Status(status))
        }
    }
}

/// Resolves a program name against `PATH`, or checks an explicit path.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
