/// Shared helpers for acceptance tests.
///
/// Tasks run against a stub interpreter instead of a real Julia install:
/// a small shell script that validates interpreter options, honors the
/// `--` separator, and then executes the "script" with the serialized
/// context path as its first argument.
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn taskjl(&self) -> Command {
        let mut cmd = Command::new(std::env!("CARGO_BIN_EXE_taskjl"));
        cmd.current_dir(self.path());
        cmd.env("TASKJL_LOG_FORMAT", "compact");
        cmd
    }

    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file_path, content).unwrap();
        file_path
    }

    /// Write the stub interpreter and return its absolute path.
    ///
    /// It rejects any option outside a small allow-list (mimicking an
    /// interpreter bailing on a bogus flag before touching the script),
    /// then runs the script through `sh` with the context path as `$1`.
    pub fn write_stub_interpreter(&self) -> PathBuf {
        let stub = self.create_file(
            "bin/julia-stub",
            r#"#!/bin/sh
while [ "$#" -gt 0 ] && [ "$1" != "--" ]; do
  case "$1" in
    --project=*|--threads=*|-O*) ;;
    *) echo "unknown option: $1" >&2; exit 1 ;;
  esac
  shift
done
if [ "$1" != "--" ]; then
  echo "missing separator" >&2
  exit 1
fi
shift
script="$1"
context="$2"
exec sh "$script" "$context"
"#,
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&stub).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&stub, perms).unwrap();
        }

        stub
    }
}
