use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::api::ApiClient;
use crate::context::{AppContext, Session};

/// Prompts for staff username and password
pub fn prompt_for_login() -> Result<(String, String)> {
    print!("Username: ");
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut username = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut username)
        .context("Failed to read username")?;
    let username = username.trim().to_string();

    if username.is_empty() {
        anyhow::bail!("Username cannot be empty");
    }

    let password =
        rpassword::prompt_password("Password: ").context("Failed to read password from stdin")?;

    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    Ok((username, password))
}

/// Prompt for credentials, exchange them for a token and store the session
pub async fn sign_in_interactive(ctx: &mut AppContext) -> Result<Session> {
    let (username, password) = prompt_for_login()?;

    let client = ApiClient::new(&ctx.config().api, None)?;
    let token = client
        .login(&username, &password)
        .await
        .with_context(|| format!("Sign-in failed: {}", client.base_url()))?;

    let session = Session::new(&username, &token);
    ctx.sign_in(session.clone())
        .context("Failed to store session")?;

    Ok(session)
}
