//! Notification sound played when the floor passes to the next speaker.

use std::io::Write;
use std::process::Stdio;
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Fire-and-forget notification. Implementations must not block and must
/// swallow their own failures.
pub trait Chime: Send + Sync {
    fn play(&self);
}

/// Rings the terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self) {
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            debug!("Failed to ring terminal bell: {}", e);
        }
    }
}

/// Runs a shell command (e.g. `paplay ding.oga`) without waiting for it.
#[derive(Debug, Clone)]
pub struct CommandChime {
    command: String,
}

impl CommandChime {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Chime for CommandChime {
    fn play(&self) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime to play chime `{}`", self.command);
            return;
        };
        // Spawning registers the child with the runtime's process driver.
        let _guard = runtime.enter();

        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to play chime `{}`: {}", self.command, e);
                return;
            }
        };

        let command = self.command.clone();
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    debug!("Chime `{}` exited with {}", command, status)
                }
                Ok(_) => {}
                Err(e) => debug!("Failed to wait for chime `{}`: {}", command, e),
            }
        });
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_chime_creation() {
        let chime = CommandChime::new("true");
        assert_eq!(chime.command, "true");
    }

    #[tokio::test]
    async fn test_command_chime_failure_is_swallowed() {
        // A command that fails still returns normally.
        CommandChime::new("exit 3").play();
        SilentChime.play();
    }

    #[test]
    fn test_command_chime_without_runtime() {
        CommandChime::new("true").play();
    }

    /// Children of this process that have exited but were never waited on.
    #[cfg(target_os = "linux")]
    fn zombie_children(comm: &str) -> usize {
        let me = std::process::id().to_string();
        let Ok(entries) = std::fs::read_dir("/proc") else {
            return 0;
        };
        entries
            .filter_map(|entry| std::fs::read_to_string(entry.ok()?.path().join("stat")).ok())
            .filter(|stat| {
                let Some((head, rest)) = stat.rsplit_once(')') else {
                    return false;
                };
                let name = head.split_once('(').map(|(_, n)| n).unwrap_or_default();
                let mut fields = rest.split_whitespace();
                let state = fields.next();
                let ppid = fields.next();
                name == comm && state == Some("Z") && ppid == Some(me.as_str())
            })
            .count()
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_command_chime_reaps_children() {
        let chime = CommandChime::new("exec true");
        for _ in 0..5 {
            chime.play();
        }

        let mut zombies = usize::MAX;
        for _ in 0..40 {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            zombies = zombie_children("true");
            if zombies == 0 {
                break;
            }
        }
        assert_eq!(zombies, 0);
    }
}
