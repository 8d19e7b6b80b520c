//! Workspace build commands (`cargo xtask`).
//!
//! The worker bundle is a module service worker: `wasm-bindgen --target web` output plus the
//! `static/service-worker.js` loader. `--target no-modules` cannot be used because the browser
//! bridge ships inline JS snippets.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

const WASM_TARGET: &str = "wasm32-unknown-unknown";
const WORKER_PACKAGE: &str = "service_worker";
const WORKER_LOADER: &str = "crates/service_worker/static/service-worker.js";
const DEFAULT_DIST: &str = "target/worker-dist";

fn main() -> ExitCode {
    let mut args = env::args().skip(1);

    let Some(cmd) = args.next() else {
        print_usage();
        return ExitCode::from(2);
    };

    let rest: Vec<String> = args.collect();

    let result = workspace_root().and_then(|root| match cmd.as_str() {
        "setup-worker" => setup_worker(&root),
        "build-worker" => parse_build_args(rest).and_then(|build| build_worker(&root, &build)),
        "check-worker" => check_worker(&root),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("unknown xtask command: {other}")),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn workspace_root() -> Result<PathBuf, String> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| "xtask must live under the workspace root".to_string())
}

fn print_usage() {
    eprintln!(
        "Usage: cargo xtask <command> [args]\n\
         \n\
         Commands:\n\
           setup-worker             Install the wasm target and wasm-bindgen-cli (if missing)\n\
           build-worker [--dev] [--dist DIR]\n\
                                    Build the module worker bundle (default: {DEFAULT_DIST})\n\
           check-worker             Compile-check the worker for wasm32\n\
         \n\
         Register the bundle with `navigator.serviceWorker.register('/service-worker.js', \
         {{ type: 'module' }})`.\n"
    );
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BuildProfile {
    Dev,
    Release,
}

impl BuildProfile {
    fn target_subdir(self) -> &'static str {
        match self {
            Self::Dev => "debug",
            Self::Release => "release",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct WorkerBuild {
    profile: BuildProfile,
    dist: PathBuf,
}

fn parse_build_args(args: Vec<String>) -> Result<WorkerBuild, String> {
    let mut build = WorkerBuild {
        profile: BuildProfile::Release,
        dist: PathBuf::from(DEFAULT_DIST),
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dev" => build.profile = BuildProfile::Dev,
            "--release" => build.profile = BuildProfile::Release,
            "--dist" => {
                let dir = args
                    .next()
                    .ok_or_else(|| "`--dist` expects a directory".to_string())?;
                build.dist = PathBuf::from(dir);
            }
            other => match other.strip_prefix("--dist=") {
                Some(dir) if !dir.is_empty() => build.dist = PathBuf::from(dir),
                _ => return Err(format!("unknown build-worker argument: {other}")),
            },
        }
    }
    Ok(build)
}

fn setup_worker(root: &Path) -> Result<(), String> {
    run(root, "rustup", vec!["target", "add", WASM_TARGET])?;

    if command_available("wasm-bindgen") {
        println!("wasm-bindgen already installed");
        return Ok(());
    }

    run(root, "cargo", vec!["install", "wasm-bindgen-cli"])
}

fn build_worker(root: &Path, build: &WorkerBuild) -> Result<(), String> {
    ensure_command(
        "wasm-bindgen",
        "Install it with `cargo xtask setup-worker` (or `cargo install wasm-bindgen-cli`)",
    )?;

    let mut cargo_args = vec!["build", "--package", WORKER_PACKAGE, "--target", WASM_TARGET];
    if build.profile == BuildProfile::Release {
        cargo_args.push("--release");
    }
    run(root, "cargo", cargo_args)?;

    let dist = root.join(&build.dist);
    let wasm = wasm_artifact(root, build.profile);
    run_owned(
        root,
        "wasm-bindgen",
        vec![
            "--target".to_string(),
            "web".to_string(),
            "--out-dir".to_string(),
            dist.join("pkg").display().to_string(),
            "--out-name".to_string(),
            WORKER_PACKAGE.to_string(),
            wasm.display().to_string(),
        ],
    )?;

    let loader = dist.join("service-worker.js");
    fs::copy(root.join(WORKER_LOADER), &loader)
        .map_err(|err| format!("failed to copy worker loader to {}: {err}", loader.display()))?;
    println!("worker bundle ready: {}", dist.display());
    Ok(())
}

fn check_worker(root: &Path) -> Result<(), String> {
    run(
        root,
        "cargo",
        vec!["check", "--package", WORKER_PACKAGE, "--target", WASM_TARGET],
    )
}

fn wasm_artifact(root: &Path, profile: BuildProfile) -> PathBuf {
    let target_dir = env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join("target"));
    target_dir
        .join(WASM_TARGET)
        .join(profile.target_subdir())
        .join(format!("{WORKER_PACKAGE}.wasm"))
}

fn command_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn ensure_command(program: &str, hint: &str) -> Result<(), String> {
    if command_available(program) {
        Ok(())
    } else {
        Err(format!("required command `{program}` not found. {hint}"))
    }
}

fn run(root: &Path, program: &str, args: Vec<&str>) -> Result<(), String> {
    let owned = args.into_iter().map(ToString::to_string).collect();
    run_owned(root, program, owned)
}

fn run_owned(root: &Path, program: &str, args: Vec<String>) -> Result<(), String> {
    print_command(program, &args);
    let status = Command::new(program)
        .current_dir(root)
        .args(&args)
        .status()
        .map_err(|err| format!("failed to start `{program}`: {err}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("`{program}` exited with status {status}"))
    }
}

fn print_command(program: &str, args: &[String]) {
    if args.is_empty() {
        println!("+ {program}");
        return;
    }

    println!("+ {program} {}", args.join(" "));
}
