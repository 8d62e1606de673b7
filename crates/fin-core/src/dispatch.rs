//! Turning a selected result into an external effect.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use fin_types::{Action, EntryKind, SearchResult};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::{Error, Result};

/// What activating a result does to the outside world
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open the application (or document) at the path
    Launch(PathBuf),
    /// Show the path in the file manager
    Reveal(PathBuf),
    /// Put text on the system clipboard
    Copy(String),
}

impl Effect {
    #[must_use]
    pub fn for_action(action: &Action) -> Self {
        match action {
            Action::LaunchApplication(path) => Effect::Launch(path.clone()),
            Action::Open(path) => Effect::Reveal(path.clone()),
            Action::Copy(text) => Effect::Copy(text.clone()),
            Action::FsEntry(entry) => match entry.kind {
                EntryKind::Application => Effect::Launch(entry.path.clone()),
                EntryKind::File | EntryKind::Directory | EntryKind::Unknown => {
                    Effect::Reveal(entry.path.clone())
                }
            },
            Action::Calculation(value) => Effect::Copy(value.to_string()),
        }
    }

    async fn apply<S: Shell>(&self, shell: &S) -> Result<()> {
        match self {
            Effect::Launch(path) => shell.launch(path).await,
            Effect::Reveal(path) => shell.reveal(path).await,
            Effect::Copy(text) => shell.copy_to_clipboard(text).await,
        }
    }
}

/// OS integration used by the dispatcher
pub trait Shell: Send + Sync + 'static {
    fn launch(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;

    fn reveal(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;

    fn copy_to_clipboard(&self, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Runs effects on a background task so the caller never waits on I/O
#[derive(Debug)]
pub struct ActionDispatcher<S> {
    shell: Arc<S>,
    tasks: TaskTracker,
}

impl<S> Clone for ActionDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            shell: Arc::clone(&self.shell),
            tasks: self.tasks.clone(),
        }
    }
}

impl<S: Shell> ActionDispatcher<S> {
    #[must_use]
    pub fn new(shell: Arc<S>) -> Self {
        Self {
            shell,
            tasks: TaskTracker::new(),
        }
    }

    /// Number of effects still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait until every effect dispatched so far has finished.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Fire the effect for `result`. Failures are logged, never returned.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, result: &SearchResult) -> JoinHandle<()> {
        let effect = Effect::for_action(&result.action);
        let title = result.title.clone();
        let shell = Arc::clone(&self.shell);
        debug!("Dispatching {effect:?} for {title:?}");

        self.tasks.spawn(async move {
            if let Err(e) = effect.apply(shell.as_ref()).await {
                warn!("Action for {title:?} failed: {e}");
            }
        })
    }
}

/// Shell backed by the platform's launcher and clipboard tools.
///
/// `apps` overrides take precedence. Without them macOS uses `open`,
/// `open -R` and `pbcopy`; other platforms use `xdg-open` and try `wl-copy`
/// before `xclip`.
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    apps: AppConfig,
}

impl SystemShell {
    #[must_use]
    pub fn new(apps: AppConfig) -> Self {
        Self { apps }
    }
}

impl Shell for SystemShell {
    async fn launch(&self, path: &Path) -> Result<()> {
        let line = self
            .apps
            .launcher
            .as_deref()
            .unwrap_or(if cfg!(target_os = "macos") { "open" } else { "xdg-open" });
        let mut cmd = command(line)?;
        cmd.arg(path);
        run(cmd, line).await
    }

    async fn reveal(&self, path: &Path) -> Result<()> {
        if let Some(line) = self.apps.file_manager.as_deref() {
            let mut cmd = command(line)?;
            cmd.arg(path);
            return run(cmd, line).await;
        }

        if cfg!(target_os = "macos") {
            let mut cmd = command("open -R")?;
            cmd.arg(path);
            return run(cmd, "open -R").await;
        }

        // xdg-open cannot select a file, so show its folder
        let is_dir = tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir());
        let target = if is_dir {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        let mut cmd = command("xdg-open")?;
        cmd.arg(target);
        run(cmd, "xdg-open").await
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let candidates: Vec<&str> = match self.apps.clipboard.as_deref() {
            Some(line) => vec![line],
            None if cfg!(target_os = "macos") => vec!["pbcopy"],
            None => vec!["wl-copy", "xclip -selection clipboard"],
        };

        let mut last_err = None;
        for line in candidates {
            match pipe(command(line)?, line, text).await {
                Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    debug!("Clipboard command {line:?} not found");
                    last_err = Some(Error::Io(e));
                }
                other => return other,
            }
        }
        Err(last_err.unwrap_or_else(|| Error::Action("No clipboard command available".into())))
    }
}

/// Build a command from a whitespace-separated command line.
fn command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::Action("Empty command line".into()))?;
    let mut cmd = Command::new(program);
    cmd.args(parts);
    Ok(cmd)
}

async fn run(mut cmd: Command, line: &str) -> Result<()> {
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Action(format!("{line} exited with {status}")))
    }
}

async fn pipe(mut cmd: Command, line: &str, input: &str) -> Result<()> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await?;
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Action(format!("{line} exited with {status}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fin_types::FsEntry;

    fn fs_entry(kind: EntryKind) -> Action {
        Action::FsEntry(FsEntry {
            name: "Figma".to_string(),
            path: PathBuf::from("/Applications/Figma.app"),
            kind,
            ctime: 0,
            mtime: 0,
            atime: 0,
        })
    }

    #[test]
    fn test_effect_mapping() {
        let path = PathBuf::from("/Applications/Finder.app");
        assert_eq!(
            Effect::for_action(&Action::LaunchApplication(path.clone())),
            Effect::Launch(path.clone())
        );
        assert_eq!(
            Effect::for_action(&Action::Open(path.clone())),
            Effect::Reveal(path)
        );
        assert_eq!(
            Effect::for_action(&Action::Copy("hello".into())),
            Effect::Copy("hello".into())
        );
    }

    #[test]
    fn test_fs_entry_effects_follow_kind() {
        let path = PathBuf::from("/Applications/Figma.app");
        assert_eq!(
            Effect::for_action(&fs_entry(EntryKind::Application)),
            Effect::Launch(path.clone())
        );
        for kind in [EntryKind::File, EntryKind::Directory, EntryKind::Unknown] {
            assert_eq!(
                Effect::for_action(&fs_entry(kind)),
                Effect::Reveal(path.clone())
            );
        }
    }

    #[test]
    fn test_calculation_copies_number_string() {
        assert_eq!(
            Effect::for_action(&Action::Calculation(42.0)),
            Effect::Copy("42".into())
        );
        assert_eq!(
            Effect::for_action(&Action::Calculation(0.5)),
            Effect::Copy("0.5".into())
        );
    }

    #[tokio::test]
    async fn test_wait_idle_awaits_dispatched_effects() {
        let dispatcher = ActionDispatcher::new(Arc::new(SystemShell::new(AppConfig {
            clipboard: Some("cat".into()),
            ..AppConfig::default()
        })));
        dispatcher.dispatch(&SearchResult::new("42", Action::Calculation(42.0)));
        dispatcher.wait_idle().await;
        assert_eq!(dispatcher.in_flight(), 0);

        // Still usable afterwards
        dispatcher
            .dispatch(&SearchResult::new("43", Action::Calculation(43.0)))
            .await
            .unwrap();
    }

    #[test]
    fn test_command_rejects_empty_line() {
        assert!(matches!(command("   "), Err(Error::Action(_))));
    }

    #[tokio::test]
    async fn test_launcher_override_status() {
        let ok = SystemShell::new(AppConfig {
            launcher: Some("true".into()),
            ..AppConfig::default()
        });
        ok.launch(Path::new("/tmp")).await.unwrap();

        let failing = SystemShell::new(AppConfig {
            launcher: Some("false".into()),
            ..AppConfig::default()
        });
        let err = failing.launch(Path::new("/tmp")).await.unwrap_err();
        assert!(matches!(err, Error::Action(msg) if msg.starts_with("false exited")));
    }

    #[tokio::test]
    async fn test_clipboard_override_receives_text() {
        let shell = SystemShell::new(AppConfig {
            clipboard: Some("cat".into()),
            ..AppConfig::default()
        });
        shell.copy_to_clipboard("42").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_clipboard_command_is_io_error() {
        let shell = SystemShell::new(AppConfig {
            clipboard: Some("fin-no-such-clipboard-tool".into()),
            ..AppConfig::default()
        });
        let err = shell.copy_to_clipboard("42").await.unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == ErrorKind::NotFound));
    }
}
