#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

// Logs every invocation, records the selections read from stdin and fails on request.
const FAKE_GMX: &str = r#"#!/bin/sh
echo "$*" >> calls.log
case "$1" in
  pdb2gmx|genion)
    read selection
    echo "$1 $selection" >> selections.log
    ;;
esac
if [ "$1" = "$FAKE_GMX_FAIL" ]; then
  echo "Fatal error: $1 could not continue" >&2
  exit 2
fi
exit 0
"#;

struct Workspace {
    dir: TempDir,
    gmx: PathBuf,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("abc.pdb"), "ATOM      1  N   MET A   1\n").unwrap();

        let gmx = dir.path().join("fake-gmx");
        fs::write(&gmx, FAKE_GMX).unwrap();
        fs::set_permissions(&gmx, fs::Permissions::from_mode(0o755)).unwrap();

        let config = dir.path().join("groauto.toml");
        fs::write(&config, "").unwrap();

        Self { dir, gmx, config }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn groauto(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_groauto"));
        cmd.args(args)
            .arg("-c")
            .arg(&self.config)
            .arg("-w")
            .arg(self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env_remove("FAKE_GMX_FAIL");
        cmd
    }

    fn run(&self, extra: &[&str]) -> Command {
        let mut cmd = self.groauto(&["run", "--no-prompt", "-s", "abc"]);
        cmd.arg("--gmx").arg(&self.gmx).args(extra);
        cmd
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).unwrap()
    }
}

fn output(cmd: &mut Command) -> Output {
    cmd.stdin(Stdio::null()).output().unwrap()
}

#[test]
fn full_pipeline_runs_every_step_in_order() {
    let ws = Workspace::new();

    let out = output(&mut ws.run(&["-t", "310", "-l", "0.5"]));
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let subcommands: Vec<String> = ws
        .calls()
        .iter()
        .map(|line| line.split_whitespace().next().unwrap_or("").to_string())
        .collect();
    assert_eq!(
        subcommands,
        [
            "pdb2gmx", "editconf", "solvate", "grompp", "genion", "grompp", "mdrun", "grompp",
            "mdrun", "grompp", "mdrun", "grompp", "mdrun",
        ]
    );
    assert!(ws.calls()[0].starts_with("pdb2gmx -f abc.pdb -o protein_processed.gro"));
    assert_eq!(ws.calls()[12], "mdrun -v -deffnm md_0.5ns");
    assert_eq!(ws.read("selections.log"), "pdb2gmx 8\ngenion 13\n");

    let md = ws.read("md.mdp");
    assert!(md.contains("500000"));
    assert!(ws.read("nvt.mdp").contains("310     310"));
}

#[test]
fn failing_step_stops_the_pipeline_with_exit_code_one() {
    let ws = Workspace::new();

    let out = output(ws.run(&[]).env("FAKE_GMX_FAIL", "solvate"));

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(ws.calls().len(), 3);
    assert!(ws.calls()[2].starts_with("solvate"));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("Step 'solvate' failed with exit code 2").count(), 1);
    assert_eq!(stderr.matches("could not continue").count(), 1);
}

#[test]
fn malformed_flag_exits_with_code_one() {
    let ws = Workspace::new();

    let out = output(&mut ws.run(&["-t", "warm"]));

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("warm"));
    assert!(ws.calls().is_empty());
}

#[test]
fn help_still_exits_with_code_zero() {
    let out = output(Command::new(env!("CARGO_BIN_EXE_groauto")).arg("--help"));

    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("run"));
}

#[test]
fn missing_gmx_binary_fails_before_later_steps() {
    let ws = Workspace::new();

    let out = output(
        ws.groauto(&["run", "--no-prompt", "-s", "abc"])
            .args(["--gmx", "groauto-no-such-gmx"]),
    );

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to launch 'groauto-no-such-gmx' for step 'pdb2gmx'"));
}

#[test]
fn missing_structure_writes_nothing() {
    let ws = Workspace::new();
    fs::remove_file(ws.path().join("abc.pdb")).unwrap();

    let out = output(&mut ws.run(&[]));

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Input structure not found"));
    assert!(!ws.path().join("md.mdp").exists());
    assert!(ws.calls().is_empty());
}

#[test]
fn prompts_read_answers_from_stdin() {
    let ws = Workspace::new();

    let mut child = ws
        .groauto(&["run"])
        .arg("--gmx")
        .arg(&ws.gmx)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"\n\nabc.pdb\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Enter the temperature in Kelvin"));
    assert!(ws.read("md.mdp").contains("50000000"));
    assert!(ws.read("md.mdp").contains("298     298"));
    assert_eq!(ws.calls().last().map(String::as_str), Some("mdrun -v -deffnm md_50ns"));
}

#[test]
fn dry_run_prints_the_plan_and_touches_nothing() {
    let ws = Workspace::new();

    let out = output(&mut ws.run(&["--dry-run"]));

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("pdb2gmx -f abc.pdb"));
    assert!(stdout.contains("[13/13]"));
    assert!(stdout.contains("genion"));
    assert!(ws.calls().is_empty());
    assert!(!ws.path().join("ions.mdp").exists());
}

#[test]
fn mdp_subcommand_only_writes_parameter_files() {
    let ws = Workspace::new();

    let out = output(&mut ws.groauto(&["mdp", "--no-prompt", "-l", "2"]));

    assert!(out.status.success());
    for name in ["ions.mdp", "minim.mdp", "nvt.mdp", "npt.mdp", "md.mdp"] {
        assert!(ws.path().join(name).is_file(), "{name} missing");
    }
    assert!(ws.read("md.mdp").contains("2000000"));
    assert!(ws.calls().is_empty());
}
