//! Development tasks for sckrec
//!
//! Usage:
//!   cargo xtask install     Install release binary to /usr/local/bin (requires sudo)
//!   cargo xtask uninstall   Remove binary from /usr/local/bin (requires sudo)
//!   cargo xtask dist        Build release binary for distribution

use std::env;
use std::path::PathBuf;
use std::process::{Command, ExitCode};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    let result = match args[0].as_str() {
        "install" => install(),
        "uninstall" => uninstall(),
        "dist" => dist(),
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_help();
            Err(anyhow::anyhow!("Unknown command"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    eprintln!(
        r#"
sckrec development tasks

Usage: cargo xtask <COMMAND>

Commands:
  install    Build release binary and install to /usr/local/bin (requires sudo)
  uninstall  Remove sckrec from /usr/local/bin (requires sudo)
  dist       Build optimized release binary for distribution
"#
    );
}

/// Get the project root directory
fn project_root() -> PathBuf {
    let dir = env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::current_dir().unwrap());

    // xtask is in a subdirectory, go up one level
    dir.parent().unwrap_or(&dir).to_path_buf()
}

/// Build release binary and install to /usr/local/bin
fn install() -> anyhow::Result<()> {
    let root = project_root();

    println!("==> Building release binary...");

    let status = Command::new("cargo")
        .args(["build", "--release"])
        .current_dir(&root)
        .status()?;

    if !status.success() {
        anyhow::bail!("Build failed");
    }

    let binary = root.join("target/release/sckrec");
    if !binary.exists() {
        anyhow::bail!("Binary not found at {:?}", binary);
    }

    println!("==> Installing to /usr/local/bin/sckrec...");

    let status = Command::new("sudo")
        .args([
            "install",
            "-Dm755",
            binary.to_str().unwrap(),
            "/usr/local/bin/sckrec",
        ])
        .status()?;

    if !status.success() {
        anyhow::bail!("Install failed (sudo required)");
    }

    println!("==> Installed: /usr/local/bin/sckrec");
    Ok(())
}

/// Remove sckrec from /usr/local/bin
fn uninstall() -> anyhow::Result<()> {
    println!("==> Removing /usr/local/bin/sckrec...");

    let status = Command::new("sudo")
        .args(["rm", "-f", "/usr/local/bin/sckrec"])
        .status()?;

    if !status.success() {
        anyhow::bail!("Uninstall failed (sudo required)");
    }

    println!("==> Uninstalled successfully!");
    Ok(())
}

/// Build optimized release binary for distribution
fn dist() -> anyhow::Result<()> {
    let root = project_root();

    println!("==> Building distribution binary...");

    let status = Command::new("cargo")
        .args(["build", "--release"])
        .current_dir(&root)
        .status()?;

    if !status.success() {
        anyhow::bail!("Build failed");
    }

    println!("==> Built: {:?}", root.join("target/release/sckrec"));
    Ok(())
}
