use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for trigon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests, shader check, and doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Validate the built-in WGSL program
    Shaders,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
}

/// One `cargo` invocation in the pipeline.
struct Step {
    name: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    name: "cargo fmt --check",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    name: "cargo clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    name: "cargo test",
    args: &["test", "--workspace"],
};
const SHADERS: Step = Step {
    name: "shader check",
    args: &["run", "--quiet", "-p", "trigon-cli", "--", "check-shader"],
};
const DOC: Step = Step {
    name: "cargo doc",
    args: &["doc", "--workspace", "--no-deps"],
};
const BUILD: Step = Step {
    name: "cargo build",
    args: &["build", "--workspace"],
};

fn run(step: &Step) -> Result<()> {
    println!("==> Running {}", step.name);
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed", step.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps: &[&Step] = match cli.command {
        Commands::Check => &[&FMT, &CLIPPY, &TEST, &SHADERS, &DOC],
        Commands::Fmt => &[&FMT],
        Commands::Clippy => &[&CLIPPY],
        Commands::Test => &[&TEST],
        Commands::Shaders => &[&SHADERS],
        Commands::Doc => &[&DOC],
        Commands::Build => &[&BUILD],
    };
    for step in steps {
        run(step)?;
    }

    Ok(())
}
