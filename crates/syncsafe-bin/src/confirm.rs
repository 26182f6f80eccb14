use anyhow::Result;
use inquire::Confirm;
use std::path::Path;

pub fn confirm_target(target: &Path) -> Result<bool> {
    println!("\nRenaming files and folders under: {}", target.display());

    let proceed = Confirm::new("Continue and rename on disk?")
        .with_default(false)
        .with_help_message("Run without --rename first to preview the changes")
        .prompt()?;

    Ok(proceed)
}
