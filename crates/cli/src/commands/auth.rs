//! Session commands.

use std::io::{BufRead, Write};

use anyhow::Context;

use shopfront_client::Registration;

use crate::app::App;

/// `shopfront login <username> [--password <password>]`
///
/// The signed-in session takes effect from the next invocation on: the
/// cart gateway is wired with the stored token at startup.
pub async fn login(app: &App, username: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let session = app.customers.login(username, &password).await?;
    let owner = session.owner();
    app.session
        .sign_in(session)
        .context("failed to persist the session")?;

    println!("signed in as {username} (customer {owner})");
    Ok(())
}

/// `shopfront register --email .. --username ..`
pub async fn register(
    app: &App,
    email: String,
    username: String,
    password: Option<String>,
    customer_type: String,
    phone_number: String,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let registration = Registration {
        email,
        username: username.clone(),
        password: password.clone(),
        password2: password,
        customer_type,
        phone_number,
    };
    app.customers.register(&registration).await?;

    println!("registered {username}; sign in with `shopfront login {username}`");
    Ok(())
}

/// `shopfront logout`
pub fn logout(app: &App) -> anyhow::Result<()> {
    app.session
        .sign_out()
        .context("failed to clear the stored session")?;
    println!("signed out");
    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    eprint!("password: ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read the password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
