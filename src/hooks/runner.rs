//! Runs configured hooks inside a freshly created worktree.

use std::path::Path;

use tokio::process::Command;

/// Errors from hook execution.
#[derive(thiserror::Error, Debug)]
pub enum HookError {
    /// The hook program could not be launched.
    #[error("failed to launch hook '{command}': {source}")]
    Spawn {
        /// The hook argv, joined for display.
        command: String,
        /// The spawn failure.
        source: std::io::Error,
    },

    /// The hook ran but exited non-zero.
    #[error("hook '{command}' exited with code {code}")]
    Failed {
        /// The hook argv, joined for display.
        command: String,
        /// Exit code, `-1` when terminated by signal.
        code: i32,
    },
}

/// Executes configured hook commands in order.
///
/// Each hook is an argv vector run directly (never through a shell) with the
/// worktree as its working directory, output streamed to the terminal.
#[derive(Debug, Clone, Default)]
pub struct HookRunner {
    hooks: Vec<Vec<String>>,
}

impl HookRunner {
    /// Create a runner over the configured hook argv vectors.
    #[must_use]
    pub fn new(hooks: Vec<Vec<String>>) -> Self {
        Self { hooks }
    }

    /// Whether any hooks are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook in `worktree_dir`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first hook that could not be launched or exited non-zero.
    pub async fn run(&self, worktree_dir: &Path) -> Result<(), HookError> {
        for argv in &self.hooks {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            let command_line = argv.join(" ");
            tracing::info!(command = %command_line, cwd = %worktree_dir.display(), "running hook");

            let status = Command::new(program)
                .args(args)
                .current_dir(worktree_dir)
                .status()
                .await
                .map_err(|source| HookError::Spawn {
                    command: command_line.clone(),
                    source,
                })?;

            if !status.success() {
                return Err(HookError::Failed {
                    command: command_line,
                    code: status.code().unwrap_or(-1),
                });
            }
        }
        Ok(())
    }
}
