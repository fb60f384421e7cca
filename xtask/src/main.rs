use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

const WASM_TARGET: &str = "wasm32-unknown-unknown";

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for ribbit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, wasm build, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Build the browser backend for wasm32 and, if wasm-bindgen is
    /// installed, generate JS bindings
    Wasm {
        /// Directory for the generated bindings
        #[arg(long, default_value = "target/web")]
        out_dir: String,
        #[arg(long)]
        debug: bool,
    },
    /// Render a few demo frames to an image through ribbit-cli
    Demo {
        #[arg(long, default_value = "120")]
        frames: u32,
        #[arg(long, default_value = "target/demo.png")]
        out: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_wasm("target/web", false)?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Doc => run_doc()?,
        Commands::Build => cargo("cargo build", &["build", "--workspace"])?,
        Commands::Wasm { out_dir, debug } => run_wasm(&out_dir, debug)?,
        Commands::Demo { frames, out } => {
            let frames = frames.to_string();
            cargo(
                "ribbit-cli render",
                &[
                    "run", "-p", "ribbit-cli", "--", "render", "--frames", &frames, "--out", &out,
                    "--hold", "ArrowRight",
                ],
            )?;
        }
    }

    Ok(())
}

fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> Running {label}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("{label} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("cargo fmt --check", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    cargo(
        "cargo clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn run_tests() -> Result<()> {
    cargo("cargo test", &["test", "--workspace"])
}

fn run_doc() -> Result<()> {
    cargo("cargo doc", &["doc", "--workspace", "--no-deps"])
}

fn run_wasm(out_dir: &str, debug: bool) -> Result<()> {
    let mut args = vec!["build", "-p", "ribbit-web", "--target", WASM_TARGET];
    if !debug {
        args.push("--release");
    }
    cargo("wasm32 build", &args)?;

    let profile = if debug { "debug" } else { "release" };
    let wasm = format!("target/{WASM_TARGET}/{profile}/ribbit_web.wasm");
    let bindgen = Command::new("wasm-bindgen")
        .args(["--target", "web", "--out-dir", out_dir, &wasm])
        .status();
    match bindgen {
        Ok(status) if status.success() => println!("==> Bindings written to {out_dir}"),
        Ok(_) => bail!("wasm-bindgen failed"),
        Err(_) => println!("==> wasm-bindgen not found; skipping bindings for {wasm}"),
    }
    Ok(())
}
