//! Session commands.

use std::io::BufRead;

use secrecy::SecretString;
use vitrine_storefront::{AppError, AppState};

use crate::output;

/// Use the password given on the command line, or read one line from stdin.
fn password(given: Option<String>) -> Result<SecretString, AppError> {
    if let Some(password) = given {
        return Ok(SecretString::from(password));
    }

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| AppError::InvalidInput(format!("failed to read password: {e}")))?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(AppError::InvalidInput("Informe a senha".to_string()));
    }
    Ok(SecretString::from(password.to_string()))
}

/// Log in and store the session.
///
/// # Errors
///
/// Fails if the password cannot be read or the API rejects the login.
pub async fn login(state: &AppState, email: &str, given: Option<String>) -> Result<(), AppError> {
    let password = password(given)?;
    let session = state.api().login(email, &password).await?;
    output::message("Login realizado com sucesso");
    output::session(Some(&session));
    Ok(())
}

/// Create an account and store the session.
///
/// # Errors
///
/// Fails if the password cannot be read or the API rejects the registration.
pub async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    given: Option<String>,
) -> Result<(), AppError> {
    let password = password(given)?;
    let session = state.api().register(name, email, &password).await?;
    output::message("Conta criada com sucesso");
    output::session(Some(&session));
    Ok(())
}

/// Forget the stored session.
///
/// # Errors
///
/// Fails if the session file cannot be removed.
pub fn logout(state: &AppState) -> Result<(), AppError> {
    state.api().logout()?;
    output::message("Sessão encerrada");
    Ok(())
}

pub fn whoami(state: &AppState) {
    output::session(state.sessions().current().as_ref());
}
