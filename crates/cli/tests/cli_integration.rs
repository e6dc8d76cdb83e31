use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("subcli-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

/// Empty working directory shared by the tests of this binary.
fn run_dir() -> &'static Path {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| make_temp_dir("run"))
}

/// Runs in an empty directory with no inherited greeter settings, so a stray
/// `.env` or `GREETER_*` variable cannot leak into the assertions.
fn greeter() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_subcli-demo"));
    cmd.current_dir(run_dir())
        .env_remove("GREETER_CONFIG")
        .env_remove("GREETER_NAME")
        .env_remove("GREETER_SHOUT")
        .env_remove("GREETER_VERBOSE")
        .env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run subcli-demo")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn help_prints_root_usage() {
    let out = run(greeter().arg("help"));
    assert!(
        out.status.success(),
        "help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let text = stdout(&out);
    assert!(
        text.starts_with("usage: greeter") && text.contains("greet") && text.contains("echo"),
        "unexpected help output:\n{text}"
    );
}

#[test]
fn help_for_command_and_alias() {
    let by_name = run(greeter().args(["help", "greet"]));
    let by_alias = run(greeter().args(["help", "hi"]));
    assert!(by_name.status.success(), "stderr:\n{}", stderr(&by_name));
    assert!(stdout(&by_name).starts_with("usage: greeter greet"));
    assert_eq!(stdout(&by_name), stdout(&by_alias));
}

#[test]
fn version_matches_package() {
    let out = run(greeter().arg("version"));
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert_eq!(stdout(&out).trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn greet_uses_default_then_env_then_flag() {
    let out = run(greeter().arg("greet"));
    assert_eq!(stdout(&out), "Hello, world!\n");

    let out = run(greeter().arg("greet").env("GREETER_NAME", "env"));
    assert_eq!(stdout(&out), "Hello, env!\n");

    let out = run(
        greeter()
            .args(["greet", "--name=flag"])
            .env("GREETER_NAME", "env"),
    );
    assert_eq!(stdout(&out), "Hello, flag!\n");
}

#[test]
fn default_run_dir_has_no_env_file() {
    assert!(!run_dir().join(".env").exists());
    assert_ne!(run_dir(), std::env::temp_dir().as_path());
    let out = run(greeter().arg("greet"));
    assert_eq!(stdout(&out), "Hello, world!\n");
}

#[test]
fn alias_and_switch() {
    let out = run(greeter().args(["hi", "-s", "-name", "ann"]));
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert_eq!(stdout(&out), "HELLO, ANN!\n");
}

#[test]
fn extra_arguments_print_command_usage() {
    let out = run(greeter().args(["greet", "extra"]));
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("usage: greeter greet"));
    assert_eq!(stdout(&out), "");
}

#[test]
fn echo_passes_flags_through() {
    let out = run(greeter().args(["echo", "-n", "--x=1", "y"]));
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert_eq!(stdout(&out), "-n --x=1 y\n");
}

#[test]
fn verbose_reports_command() {
    let out = run(greeter().args(["-v", "greet"]));
    assert!(out.status.success());
    assert!(
        stderr(&out).contains("running greet with 0 argument(s)"),
        "stderr:\n{}",
        stderr(&out)
    );
}

#[test]
fn unknown_command_suggests_similar() {
    let out = run(greeter().arg("gret"));
    assert_eq!(out.status.code(), Some(2));
    let err = stderr(&out);
    assert!(
        err.contains("greeter: unknown command 'gret'")
            && err.contains("Did you mean?")
            && err.contains("    greet\n"),
        "stderr:\n{err}"
    );
}

#[test]
fn undefined_flag_is_a_usage_error() {
    let out = run(greeter().args(["greet", "-bogus"]));
    assert_eq!(out.status.code(), Some(2));
    assert_eq!(stderr(&out), "greeter: Flag 'bogus' is undefined.\n");
}

#[test]
fn missing_flag_value() {
    let out = run(greeter().args(["greet", "-name"]));
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("Flag 'name' requires an argument."));
}

#[test]
fn no_command_prints_usage_and_fails() {
    let out = run(&mut greeter());
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("usage: greeter"));
}

#[test]
fn command_error_is_reported() {
    let out = run(greeter().arg("fail"));
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "greeter: something went wrong\n");
}

#[test]
fn config_file_disables_strict_mode() {
    let dir = make_temp_dir("config");
    let config = dir.join("greeter.json");
    fs::write(&config, r#"{ "strict": false }"#).expect("failed to write config");

    let out = run(
        greeter()
            .args(["greet", "-bogus", "-name", "cfg"])
            .env("GREETER_CONFIG", &config),
    );
    assert!(out.status.success(), "stderr:\n{}", stderr(&out));
    assert_eq!(stdout(&out), "Hello, cfg!\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn dotenv_file_supplies_values() {
    let dir = make_temp_dir("dotenv");
    fs::write(dir.join(".env"), "GREETER_NAME=dotenv\n").expect("failed to write .env");

    let out = run(greeter().current_dir(&dir).arg("greet"));
    assert_eq!(stdout(&out), "Hello, dotenv!\n");

    let out = run(
        greeter()
            .current_dir(&dir)
            .arg("greet")
            .env("GREETER_NAME", "process"),
    );
    assert_eq!(stdout(&out), "Hello, process!\n");

    let _ = fs::remove_dir_all(&dir);
}
