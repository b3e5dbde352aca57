use serde_json::json;

use crate::auth::Identity;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::services::ServiceError;
use crate::state::AppState;

pub async fn handle(
    config: AppConfig,
    username: &str,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let state = AppState::open(config).await?;

    let user = match state.identity.verify_credentials(username, password).await {
        Ok(user) => user,
        Err(ServiceError::InvalidCredentials) => {
            output_error(&output_format, "Invalid credentials")?;
            anyhow::bail!("could not issue a token for {}", username);
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.tokens.issue(&Identity::from(&user))?;
    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Token issued for {}", user.username),
            Some(json!({ "token": token })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
