//! # Session Bootstrap
//!
//! Resolves the bot user, the home team and the debug channel, in that order.
//! The bot user and team must already exist; the debug channel is created on
//! first run. Any failure other than a missing debug channel is fatal.

use log::{error, info};
use thiserror::Error;

use super::state::Session;
use crate::api::model::CHANNEL_OPEN;
use crate::api::{ChatApi, NewChannel};
use crate::core::{ApiError, Config};

pub const DEBUG_CHANNEL_DISPLAY_NAME: &str = "Debugging For Inclusive Bot";
pub const DEBUG_CHANNEL_PURPOSE: &str =
    "This is used as a channel for logging bot debug messages";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("bot identity not found: '{0}'")]
    BotNotFound(String),

    #[error("team not found or bot not a member: '{0}'")]
    TeamNotFound(String),

    #[error("{step} failed: {source}")]
    Api {
        step: &'static str,
        #[source]
        source: ApiError,
    },
}

impl BootstrapError {
    /// Log the error with operator hints and the platform diagnostic
    pub fn log_details(&self) {
        match self {
            BootstrapError::BotNotFound(name) => {
                error!("There was a problem finding the bot user '{name}'.");
                error!("Make sure the bot account exists and BOT_NAME matches its username.");
            }
            BootstrapError::TeamNotFound(team) => {
                error!("We failed to get the team '{team}'");
                error!("or we do not appear to be a member of it.");
            }
            BootstrapError::Api { step, source } => {
                source.log_details(&format!("Bootstrap step '{step}' failed"));
            }
        }
    }
}

/// Build the session for `config`, creating the debug channel if it is missing
pub async fn bootstrap(api: &dyn ChatApi, config: &Config) -> Result<Session, BootstrapError> {
    if config.bot_name.is_empty() {
        return Err(BootstrapError::BotNotFound(String::new()));
    }

    let bot = match api.get_user_by_username(&config.bot_name).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            e.log_details("Bot user lookup returned not found");
            return Err(BootstrapError::BotNotFound(config.bot_name.clone()));
        }
        Err(e) => {
            return Err(BootstrapError::Api {
                step: "bot user lookup",
                source: e,
            })
        }
    };
    info!("🤖 Bot user '{}' resolved ({})", config.bot_name, bot.id);

    let team = match api.get_team_by_name(&config.team_name).await {
        Ok(team) => team,
        // Non-members get a 403 rather than a 404
        Err(e) if e.is_not_found() || e.status() == Some(403) => {
            e.log_details("Team lookup failed");
            return Err(BootstrapError::TeamNotFound(config.team_name.clone()));
        }
        Err(e) => {
            return Err(BootstrapError::Api {
                step: "team lookup",
                source: e,
            })
        }
    };
    info!("👥 Team '{}' resolved ({})", config.team_name, team.id);

    let debug_channel_id =
        resolve_debug_channel(api, &team.id, &config.debug_channel_name).await?;

    Ok(Session::new(
        bot.id,
        config.bot_name.clone(),
        team.id,
        config.team_name.clone(),
        debug_channel_id,
    ))
}

/// Look up the debug channel, creating it when absent.
///
/// A failed creation is logged and yields `None`: the bot keeps running
/// without a debug sink.
async fn resolve_debug_channel(
    api: &dyn ChatApi,
    team_id: &str,
    name: &str,
) -> Result<Option<String>, BootstrapError> {
    match api.get_channel_by_name(team_id, name).await {
        Ok(channel) => {
            info!("🔧 Debug channel '{}' resolved ({})", name, channel.id);
            Ok(Some(channel.id))
        }
        Err(e) if e.is_not_found() => {
            let channel = NewChannel {
                team_id: team_id.to_string(),
                name: name.to_string(),
                display_name: DEBUG_CHANNEL_DISPLAY_NAME.to_string(),
                purpose: DEBUG_CHANNEL_PURPOSE.to_string(),
                channel_type: CHANNEL_OPEN.to_string(),
            };
            match api.create_channel(&channel).await {
                Ok(created) => {
                    info!(
                        "Looks like this might be the first run so we've created the channel {name}"
                    );
                    Ok(Some(created.id))
                }
                Err(e) => {
                    e.log_details(&format!("We failed to create the channel {name}"));
                    Ok(None)
                }
            }
        }
        Err(e) => Err(BootstrapError::Api {
            step: "debug channel lookup",
            source: e,
        }),
    }
}
