//! The execution runner.
//!
//! [`ExecutionRunner::execute`] is the whole lifecycle of one run:
//!
//! 1. reject an empty code sequence
//! 2. write `code[0]` to a fresh [`Artifact`]
//! 3. run the interpreter with the artifact path as its only argument
//! 4. capture stdout, or collapse any failure into a generic marker
//! 5. remove the artifact, logging and counting a failed removal
//!
//! On unix the interpreter leads its own process group. A run that times out
//! or is cancelled takes the whole group down, including anything the
//! submitted code spawned.
//!
//! Nothing is retried. The caller awaits the whole run.

use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::process::Command;

use crate::artifact::Artifact;
use crate::config::RunnerConfig;
use crate::error::ExecError;

/// Why a run produced no output.
///
/// Compile errors, runtime exceptions and launch failures are not
/// distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-zero exit, or the interpreter could not be launched.
    SyntaxOrRuntimeError,
    /// The run exceeded the configured wall-clock limit and was killed.
    Timeout,
}

impl FailureKind {
    /// Human-readable marker returned to callers in place of output.
    pub fn marker(&self) -> &'static str {
        match self {
            FailureKind::SyntaxOrRuntimeError => "Syntax error",
            FailureKind::Timeout => "Execution timed out",
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Captured standard output of a successful run.
    Output(String),
    /// The code did not run to a successful exit.
    Failure(FailureKind),
}

/// Runs code fragments through a fixed external interpreter.
#[derive(Debug)]
pub struct ExecutionRunner {
    config: RunnerConfig,
    cleanup_failures: AtomicU64,
}

impl ExecutionRunner {
    /// Builds a runner, validating the config up front.
    pub fn new(config: RunnerConfig) -> Result<Self, ExecError> {
        config.validate()?;
        Ok(ExecutionRunner {
            config,
            cleanup_failures: AtomicU64::new(0),
        })
    }

    /// The runner's configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Number of artifacts whose removal failed since startup.
    pub fn cleanup_failures(&self) -> u64 {
        self.cleanup_failures.load(Ordering::Relaxed)
    }

    /// Executes the first fragment of `code`.
    ///
    /// Only `code[0]` is run; later fragments are ignored. The artifact is
    /// gone by the time this returns, whatever the outcome.
    pub async fn execute(&self, code: &[String]) -> Result<ExecutionResult, ExecError> {
        let source = code.first().ok_or_else(|| {
            ExecError::InvalidInput("code must contain at least one fragment".to_string())
        })?;

        let artifact = Artifact::create(&self.config, source)?;
        tracing::debug!(artifact = %artifact.path().display(), "created execution artifact");

        let result = self.invoke(artifact.path()).await;

        let path = artifact.path().to_path_buf();
        if let Err(err) = artifact.remove() {
            let total = self.cleanup_failures.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(
                artifact = %path.display(),
                error = %err,
                cleanup_failures = total,
                "failed to remove execution artifact"
            );
        }

        Ok(result)
    }

    async fn invoke(&self, artifact: &Path) -> ExecutionResult {
        let mut command = Command::new(&self.config.interpreter);
        command
            .arg(artifact)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(
                    interpreter = %self.config.interpreter.display(),
                    error = %err,
                    "failed to launch interpreter"
                );
                return ExecutionResult::Failure(FailureKind::SyntaxOrRuntimeError);
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        // The guard then kills whatever else is left in its group.
        let mut group = GroupGuard::new(child.id());
        let waited = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    tracing::warn!(timeout = ?limit, "interpreter timed out, killed");
                    return ExecutionResult::Failure(FailureKind::Timeout);
                }
            },
            None => child.wait_with_output().await,
        };
        group.disarm();

        match waited {
            Ok(output) if output.status.success() => {
                ExecutionResult::Output(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::debug!(
                    status = %output.status,
                    stderr = %stderr.trim(),
                    "interpreter exited unsuccessfully"
                );
                ExecutionResult::Failure(FailureKind::SyntaxOrRuntimeError)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed waiting on interpreter");
                ExecutionResult::Failure(FailureKind::SyntaxOrRuntimeError)
            }
        }
    }
}

/// Kills the interpreter's process group when dropped while armed.
struct GroupGuard {
    #[cfg(unix)]
    pgid: Option<nix::unistd::Pid>,
}

impl GroupGuard {
    #[cfg(unix)]
    fn new(leader: Option<u32>) -> Self {
        GroupGuard {
            pgid: leader
                .and_then(|pid| i32::try_from(pid).ok())
                .map(nix::unistd::Pid::from_raw),
        }
    }

    #[cfg(not(unix))]
    fn new(_leader: Option<u32>) -> Self {
        GroupGuard {}
    }

    /// Leaves the group alone: the interpreter exited on its own.
    #[cfg(unix)]
    fn disarm(&mut self) {
        self.pgid = None;
    }

    #[cfg(not(unix))]
    fn disarm(&mut self) {}

    #[cfg(unix)]
    fn kill(&mut self) {
        use nix::sys::signal::{killpg, Signal};

        if let Some(pgid) = self.pgid.take() {
            match killpg(pgid, Signal::SIGKILL) {
                Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => {
                    tracing::warn!(pgid = %pgid, error = %e, "failed to kill process group")
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn kill(&mut self) {}
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sh_runner(dir: &Path) -> ExecutionRunner {
        let config = RunnerConfig::new("/bin/sh", dir, "archivoPrueba").with_extension("sh");
        ExecutionRunner::new(config).unwrap()
    }

    fn scratch_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    fn code(source: &str) -> Vec<String> {
        vec![source.to_string()]
    }

    #[tokio::test]
    async fn successful_run_returns_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let runner = sh_runner(dir.path());

        let result = runner.execute(&code("printf ok")).await.unwrap();
        assert_eq!(result, ExecutionResult::Output("ok".to_string()));
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn only_first_fragment_runs() {
        let dir = tempfile::tempdir().unwrap();
        let runner = sh_runner(dir.path());

        let fragments = vec!["echo first".to_string(), "echo second".to_string()];
        let result = runner.execute(&fragments).await.unwrap();
        assert_eq!(result, ExecutionResult::Output("first\n".to_string()));
    }

    #[tokio::test]
    async fn nonzero_exit_is_generic_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = sh_runner(dir.path());

        let result = runner
            .execute(&code("echo partial; echo boom >&2; exit 3"))
            .await
            .unwrap();
        assert_eq!(
            result,
            ExecutionResult::Failure(FailureKind::SyntaxOrRuntimeError)
        );
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn unparseable_source_is_generic_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = sh_runner(dir.path());

        let result = runner.execute(&code("if then fi (")).await.unwrap();
        assert_eq!(
            result,
            ExecutionResult::Failure(FailureKind::SyntaxOrRuntimeError)
        );
    }

    #[tokio::test]
    async fn missing_interpreter_is_generic_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunnerConfig::new(dir.path().join("no-such-interpreter"), dir.path(), "p");
        let runner = ExecutionRunner::new(config).unwrap();

        let result = runner.execute(&code("anything")).await.unwrap();
        assert_eq!(
            result,
            ExecutionResult::Failure(FailureKind::SyntaxOrRuntimeError)
        );
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn empty_code_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let runner = sh_runner(dir.path());

        assert!(matches!(
            runner.execute(&[]).await,
            Err(ExecError::InvalidInput(_))
        ));
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn unwritable_scratch_dir_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunnerConfig::new("/bin/sh", dir.path().join("missing"), "p");
        let runner = ExecutionRunner::new(config).unwrap();

        assert!(matches!(
            runner.execute(&code("echo hi")).await,
            Err(ExecError::ArtifactCreate(_))
        ));
    }

    #[tokio::test]
    async fn runaway_interpreter_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunnerConfig::new("/bin/sh", dir.path(), "p")
            .with_timeout(Some(Duration::from_millis(200)));
        let runner = ExecutionRunner::new(config).unwrap();

        let started = std::time::Instant::now();
        let result = runner.execute(&code("sleep 30")).await.unwrap();
        assert_eq!(result, ExecutionResult::Failure(FailureKind::Timeout));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(scratch_entries(dir.path()), 0);
    }

    /// True once `pid` has exited (gone, or a zombie awaiting its reaper).
    #[cfg(target_os = "linux")]
    fn has_exited(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .map_or(true, |rest| rest.trim_start().starts_with('Z')),
            Err(_) => true,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_kills_processes_spawned_by_the_code() {
        let dir = tempfile::tempdir().unwrap();
        let pid_dir = tempfile::tempdir().unwrap();
        let pid_file = pid_dir.path().join("background.pid");
        let config = RunnerConfig::new("/bin/sh", dir.path(), "p")
            .with_timeout(Some(Duration::from_millis(300)));
        let runner = ExecutionRunner::new(config).unwrap();

        let source = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());
        let result = runner.execute(&code(&source)).await.unwrap();
        assert_eq!(result, ExecutionResult::Failure(FailureKind::Timeout));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let pid = pid.trim();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !has_exited(pid) && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(has_exited(pid), "background process {pid} outlived the run");
    }

    #[tokio::test]
    async fn failed_cleanup_is_counted_not_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let runner = sh_runner(dir.path());

        // The script deletes its own artifact, so the runner's removal fails.
        let result = runner.execute(&code("rm -f \"$0\"; echo gone")).await.unwrap();
        assert_eq!(result, ExecutionResult::Output("gone\n".to_string()));
        assert_eq!(runner.cleanup_failures(), 1);
    }

    #[tokio::test]
    async fn concurrent_runs_see_their_own_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let runner = std::sync::Arc::new(sh_runner(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let runner = runner.clone();
                tokio::spawn(async move {
                    let result = runner
                        .execute(&[format!("sleep 0.1; echo payload-{i}")])
                        .await
                        .unwrap();
                    (i, result)
                })
            })
            .collect();

        for handle in handles {
            let (i, result) = handle.await.unwrap();
            assert_eq!(result, ExecutionResult::Output(format!("payload-{i}\n")));
        }
        assert_eq!(scratch_entries(dir.path()), 0);
        assert_eq!(runner.cleanup_failures(), 0);
    }

    #[test]
    fn failure_markers() {
        assert_eq!(FailureKind::SyntaxOrRuntimeError.marker(), "Syntax error");
        assert_eq!(FailureKind::Timeout.marker(), "Execution timed out");
    }
}
