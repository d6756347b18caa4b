use super::prompts;
use crate::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;

pub async fn run_clear(all: bool, watched: bool, credentials: bool, yes: bool, output: &Output) -> Result<()> {
    if !all && !watched && !credentials {
        output.warn("No clear option specified. Use --watched, --credentials, or --all");
        output.info("\nExample: popcorn clear --watched");
        return Ok(());
    }

    let ctx = AppContext::load()?;

    match confirmation(all || watched, yes, output.is_human()) {
        Confirmation::NotNeeded => {}
        Confirmation::Prompt => {
            let confirmed = prompts::prompt_yes_no("Delete your whole watched list?", false)?;
            if !confirmed {
                output.info("Nothing cleared");
                return Ok(());
            }
        }
        Confirmation::Refuse => {
            return Err(eyre!("Clearing the watched list without a terminal prompt needs --yes"));
        }
    }

    if all || watched {
        clear_watched(&ctx, output)?;
    }
    if all || credentials {
        clear_credentials(&ctx, output)?;
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Confirmation {
    NotNeeded,
    Prompt,
    /// Machine-readable output has nobody to ask.
    Refuse,
}

fn confirmation(clears_watched: bool, yes: bool, human: bool) -> Confirmation {
    match (clears_watched && !yes, human) {
        (false, _) => Confirmation::NotNeeded,
        (true, true) => Confirmation::Prompt,
        (true, false) => Confirmation::Refuse,
    }
}

fn clear_watched(ctx: &AppContext, output: &Output) -> Result<()> {
    let mut store = ctx.watched_store()?;
    let removed = store
        .clear()
        .map_err(|e| eyre!("Failed to clear watched list: {}", e))?;
    output.success(format!("Removed {} movies from your watched list", removed));
    Ok(())
}

fn clear_credentials(ctx: &AppContext, output: &Output) -> Result<()> {
    let credentials_file = ctx.paths.credentials_file();
    if credentials_file.exists() {
        fs::remove_file(&credentials_file).map_err(|e| {
            eyre!(
                "Failed to remove credentials at {}: {}",
                credentials_file.display(),
                e
            )
        })?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No stored credentials found to clear");
    }
    Ok(())
}
