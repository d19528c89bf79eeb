use anyhow::Result;
use std::env;
use tracing::{error, info};

use crate::config::{CardAction, HookConfig};

/// Environment variable that carries an action input, following the CI
/// runner convention: `INPUT_` prefix, uppercased, spaces to underscores.
fn input_var(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

fn required_input(name: &str) -> Result<String> {
    let var = input_var(name);
    match env::var(&var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => {
            error!(input = name, var = %var, "Required input is empty");
            Err(anyhow::anyhow!("required input '{name}' is empty"))
        }
        Err(e) => {
            error!(error = ?e, input = name, var = %var, "Required input not set");
            Err(anyhow::anyhow!("required input '{name}' is not set"))
        }
    }
}

fn optional_input(name: &str) -> Option<String> {
    env::var(input_var(name))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Resolves the full hook configuration from action inputs in the
/// environment. Fails with the name of the first missing required input.
pub fn load_config() -> Result<HookConfig> {
    let api_key = required_input("trello-api-key")?;
    let auth_token = required_input("trello-auth-token")?;
    let board_id = required_input("trello-board-id")?;
    let card_action = CardAction::from(required_input("trello-card-action")?.as_str());
    let list_name_commit = required_input("trello-list-name-commit")?;
    let list_name_pr_open = optional_input("trello-list-name-pr-open");
    let list_name_pr_closed = optional_input("trello-list-name-pr-closed");
    let card_id_pattern =
        optional_input("trello-card-id-pattern").unwrap_or_else(|| "#".to_string());

    info!("All action inputs resolved");

    let config = HookConfig {
        api_key,
        auth_token,
        board_id,
        card_action,
        list_name_commit,
        list_name_pr_open,
        list_name_pr_closed,
        card_id_pattern,
    };
    config.trace_loaded();
    Ok(config)
}
