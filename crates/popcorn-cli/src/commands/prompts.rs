use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};
use popcorn_models::UserRating;

/// Prompt for a secret (masked input)
pub fn prompt_secret(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| eyre!("Failed to read input: {}", e))
}

/// Prompt for yes/no with a default
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| eyre!("Failed to read confirmation: {}", e))
}

/// Prompt for a 1-10 rating until a valid one is entered
pub fn prompt_rating(prompt: &str) -> Result<UserRating> {
    let value = Input::<u8>::new()
        .with_prompt(prompt)
        .validate_with(|value: &u8| -> std::result::Result<(), String> {
            UserRating::try_from(*value).map(|_| ())
        })
        .interact_text()
        .map_err(|e| eyre!("Failed to read rating: {}", e))?;

    UserRating::try_from(value).map_err(|e| eyre!(e))
}
