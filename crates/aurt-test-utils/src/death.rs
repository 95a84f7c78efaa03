//! Death tests: run a test body in a child process and inspect its exit.
//!
//! A death test is an ordinary `#[test]` that branches on [`in_child`]:
//!
//! ```no_run
//! use aurt_test_utils::death::{in_child, DeathTest};
//!
//! #[test]
//! fn aborts_on_bad_index() {
//!     if in_child("aborts_on_bad_index") {
//!         // code expected to terminate the process
//!         return;
//!     }
//!     DeathTest::new("aborts_on_bad_index")
//!         .run()
//!         .assert_exit_code(1)
//!         .assert_stderr_contains("out of bounds");
//! }
//! ```
//!
//! The parent re-executes the current test binary filtered to exactly that
//! test, with [`CHILD_ENV`] set so the child takes the other branch.

use std::process::{Command, ExitStatus};

use aurt_core::config::{ABORT_ENV, EXIT_CODE_ENV, LOG_ENV};

/// Environment variable naming the test a child process should run.
pub const CHILD_ENV: &str = "AURT_DEATH_TEST";

/// Whether this process is the child spawned for `test_name`.
pub fn in_child(test_name: &str) -> bool {
    std::env::var(CHILD_ENV).is_ok_and(|v| v == test_name)
}

/// Builder for one child run.
#[derive(Debug)]
pub struct DeathTest {
    test_name: String,
    envs: Vec<(String, String)>,
}

impl DeathTest {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            envs: Vec::new(),
        }
    }

    /// Set an environment variable in the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Spawn the child and wait for it.
    ///
    /// Runtime configuration variables inherited from the parent are
    /// cleared so each child starts from defaults plus [`env`](Self::env).
    ///
    /// # Panics
    ///
    /// If the current executable cannot be located or spawned.
    pub fn run(self) -> Death {
        let exe = std::env::current_exe().expect("locate test binary");
        let mut cmd = Command::new(exe);
        cmd.args([self.test_name.as_str(), "--exact", "--nocapture", "--test-threads=1"])
            .env(CHILD_ENV, &self.test_name)
            .env_remove(ABORT_ENV)
            .env_remove(EXIT_CODE_ENV)
            .env_remove(LOG_ENV);
        for (k, v) in &self.envs {
            cmd.env(k, v);
        }
        let output = cmd.output().expect("spawn death-test child");
        Death {
            test_name: self.test_name,
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// How a child process ended.
#[derive(Debug)]
pub struct Death {
    pub test_name: String,
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Death {
    /// Exit code, or `None` if the child was killed by a signal.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Assert the child exited normally with `code`.
    #[track_caller]
    pub fn assert_exit_code(&self, code: i32) -> &Self {
        assert_eq!(
            self.code(),
            Some(code),
            "{}: unexpected exit status {:?}\nstderr:\n{}",
            self.test_name,
            self.status,
            self.stderr_text()
        );
        self
    }

    /// Assert the child did not exit successfully.
    #[track_caller]
    pub fn assert_failed(&self) -> &Self {
        assert!(
            !self.status.success(),
            "{}: child exited successfully\nstdout:\n{}",
            self.test_name,
            self.stdout_text()
        );
        self
    }

    /// Assert the child was terminated by a signal rather than exiting.
    #[track_caller]
    pub fn assert_signalled(&self) -> &Self {
        assert!(
            self.code().is_none(),
            "{}: expected a signal, got {:?}",
            self.test_name,
            self.status
        );
        self
    }

    #[track_caller]
    pub fn assert_stderr_contains(&self, needle: &str) -> &Self {
        let text = self.stderr_text();
        assert!(
            text.contains(needle),
            "{}: stderr does not contain {needle:?}\nstderr:\n{text}",
            self.test_name
        );
        self
    }

    #[track_caller]
    pub fn assert_stdout_contains(&self, needle: &str) -> &Self {
        let text = self.stdout_text();
        assert!(
            text.contains(needle),
            "{}: stdout does not contain {needle:?}\nstdout:\n{text}",
            self.test_name
        );
        self
    }
}
