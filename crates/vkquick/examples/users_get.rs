use serde::Deserialize;
use tracing::info;
use vkquick::error::{Result, VkError};
use vkquick::prelude::*;

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    first_name: String,
    last_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().map_err(|e| VkError::Config(e.to_string()))?;
    // Initialize logger
    vkquick::logging::init()?;
    info!("Starting...");
    // Token from VKQUICK_TOKEN, owner detected with one request
    let api = Api::from_env().await?;
    info!(
        "Token owner: {}, delay between requests: {:?}",
        api.token_owner(),
        api.request_delay()
    );

    let users: Vec<User> = api
        .method("users.get")
        .param("user_ids", [1, 2])
        .param("name_case", "nom")
        .send_as()
        .await?;
    for user in users {
        info!("  {}: {} {}", user.id, user.first_name, user.last_name);
    }

    // Same call, name built segment by segment
    let raw = api.path("users").path("get").param("user_ids", 1).send().await?;
    info!("Raw response: {}", raw);
    Ok(())
}
