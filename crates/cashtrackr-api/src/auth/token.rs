// Confirmation and password-reset codes
// Decision: A code is only handed out while no other user holds it

use anyhow::{bail, Result};
use cashtrackr_storage::UserRepository;
use rand::Rng;

/// Draws before giving up on finding a free code
const MAX_TOKEN_ATTEMPTS: usize = 20;

/// Generate a 6-digit numeric code
pub fn generate_confirmation_token() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Generate a code that no user currently holds
pub async fn generate_unused_token(users: &dyn UserRepository) -> Result<String> {
    draw_unused_token(users, generate_confirmation_token).await
}

async fn draw_unused_token(
    users: &dyn UserRepository,
    mut generate: impl FnMut() -> String,
) -> Result<String> {
    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let candidate = generate();
        if users.get_user_by_token(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        tracing::debug!("Confirmation code already in use, drawing again");
    }
    bail!("No unused confirmation code after {} attempts", MAX_TOKEN_ATTEMPTS)
}
