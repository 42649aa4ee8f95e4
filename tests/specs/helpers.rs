use assert_cmd::Command;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch proxy workspace: a tempdir plus a per-repo stand-in "child"
/// program that `cidx` shells out to instead of a real `cidx` binary
/// (wired via `CIDX_PROXY_CHILD_PROGRAM`, see commands::child_program).
pub struct Workspace {
    dir: TempDir,
    stand_in: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let stand_in = dir.path().join("stand-in.sh");
        Self { dir, stand_in }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Mark `repo` (relative to the workspace root) as a discoverable
    /// sub-repository by creating its `.code-indexer` marker.
    pub fn mark_repo(&self, repo: &str) -> &Self {
        std::fs::create_dir_all(self.path().join(repo).join(".code-indexer")).expect("mkdir marker");
        self
    }

    /// Install a POSIX shell script as the stand-in child program; every
    /// `cidx` subprocess invocation runs this instead of a real `cidx`.
    pub fn set_stand_in(&self, script: &str) -> &Self {
        let mut file = std::fs::File::create(&self.stand_in).expect("create stand-in");
        write!(file, "#!/bin/sh\n{script}\n").expect("write stand-in");
        drop(file);
        std::fs::set_permissions(&self.stand_in, std::fs::Permissions::from_mode(0o755)).expect("chmod stand-in");
        self
    }

    /// Build a `cidx` invocation rooted at this workspace, with the stand-in
    /// wired in if one was installed.
    pub fn cidx(&self, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("cidx").expect("cidx binary built");
        cmd.arg("-C").arg(self.path()).args(args);
        if self.stand_in.is_file() {
            cmd.env("CIDX_PROXY_CHILD_PROGRAM", &self.stand_in);
        }
        cmd
    }
}
