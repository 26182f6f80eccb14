use std::process;

use anyhow::Result;
use clap::{ArgMatches, Command};

const SERVICE_NAME: &str = "syncsafe";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install syncsafe binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run syncsafe with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to syncsafe")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run all tests for the entire project"))
                .subcommand(Command::new("core").about("Run tests for syncsafe-core"))
                .subcommand(Command::new("bin").about("Run tests for syncsafe-bin"))
                .subcommand(Command::new("integration").about("Run integration tests"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", args)) => handle_install_command(args),
        Some(("run", args)) => handle_run_command(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn handle_install_command(_args: &ArgMatches) -> Result<()> {
    println!("Installing {}...", SERVICE_NAME);
    let status = process::Command::new("cargo")
        .args(["install", "--path", "crates/syncsafe-bin"])
        .status()?;

    if status.success() {
        println!("{} installed successfully", SERVICE_NAME);
    } else {
        anyhow::bail!("Failed to install {}", SERVICE_NAME);
    }

    Ok(())
}

fn handle_run_command(args: &ArgMatches) -> Result<()> {
    println!("Building and running {}...", SERVICE_NAME);

    // Get any additional arguments passed to run command
    let run_args: Vec<String> = args
        .get_many::<String>("args")
        .map_or(Vec::new(), |vals| vals.cloned().collect());

    let mut command = process::Command::new("cargo");
    command.args(["run", "--bin", "syncsafe", "--"]);

    if !run_args.is_empty() {
        command.args(&run_args);
    }

    let status = command.status()?;

    if !status.success() {
        anyhow::bail!("Failed to run {}", SERVICE_NAME);
    }

    Ok(())
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => test_core(),
        Some(("bin", _args)) => test_bin(),
        Some(("integration", _args)) => test_integration(),
        _ => {
            println!("Available test commands:");
            println!("  all          - Run all tests for the entire project");
            println!("  core         - Run tests for syncsafe-core");
            println!("  bin          - Run tests for syncsafe-bin");
            println!("  integration  - Run integration tests");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    println!("Running all tests for the {} project...\n", SERVICE_NAME);

    let mut all_passed = true;

    println!("Running syncsafe-core tests...");
    if let Err(e) = test_core_internal() {
        all_passed = false;
        println!("Core tests failed: {:?}", e);
    } else {
        println!("Core tests passed");
    }
    println!();

    println!("Running syncsafe-bin tests...");
    if let Err(e) = test_bin_internal() {
        all_passed = false;
        println!("Binary tests failed: {:?}", e);
    } else {
        println!("Binary tests passed");
    }
    println!();

    println!("Running workspace tests...");
    if let Err(e) = test_workspace_internal() {
        all_passed = false;
        println!("Workspace tests failed: {:?}", e);
    } else {
        println!("Workspace tests passed");
    }
    println!();

    println!("Running integration tests...");
    if let Err(e) = test_integration_internal() {
        all_passed = false;
        println!("Integration tests failed: {:?}", e);
    } else {
        println!("Integration tests passed");
    }
    println!();

    if all_passed {
        println!("All tests passed successfully!");
    } else {
        anyhow::bail!("Test suite failed");
    }

    Ok(())
}

fn test_core() -> Result<()> {
    println!("Running syncsafe-core tests...");
    test_core_internal()
}

fn test_bin() -> Result<()> {
    println!("Running syncsafe-bin tests...");
    test_bin_internal()
}

fn test_integration() -> Result<()> {
    println!("Running integration tests...");
    test_integration_internal()
}

fn test_core_internal() -> Result<()> {
    let status = process::Command::new("cargo")
        .args(["test", "--package", "syncsafe-core"])
        .status()?;

    if !status.success() {
        anyhow::bail!("Core tests failed");
    }
    Ok(())
}

fn test_bin_internal() -> Result<()> {
    let status = process::Command::new("cargo")
        .args(["test", "--package", "syncsafe-bin"])
        .status()?;

    if !status.success() {
        anyhow::bail!("Binary tests failed");
    }
    Ok(())
}

fn test_workspace_internal() -> Result<()> {
    let status = process::Command::new("cargo")
        .args(["test", "--workspace"])
        .status()?;

    if !status.success() {
        anyhow::bail!("Workspace tests failed");
    }
    Ok(())
}

fn test_integration_internal() -> Result<()> {
    // Build the binary first
    let build_status = process::Command::new("cargo")
        .args(["build", "--bin", "syncsafe"])
        .status()?;

    if !build_status.success() {
        anyhow::bail!("Failed to build {} binary", SERVICE_NAME);
    }

    // Test basic CLI functionality
    let help_status = process::Command::new("cargo")
        .args(["run", "--bin", "syncsafe", "--", "--help"])
        .status()?;

    if !help_status.success() {
        anyhow::bail!("CLI help command failed");
    }

    let version_status = process::Command::new("cargo")
        .args(["run", "--bin", "syncsafe", "--", "--version"])
        .status()?;

    if !version_status.success() {
        anyhow::bail!("CLI version command failed");
    }

    Ok(())
}
