use serde::{Deserialize, Serialize};

pub const RELAY_ADDRESS_ENV: &str = "CHAINBOARD_RELAY_ADDRESS";
pub const GAME_ID_ENV: &str = "CHAINBOARD_GAME_ID";

/// Process configuration for the contract session. Values are taken as-is:
/// nothing is validated here, a missing value surfaces when the deployment
/// is rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub relay_address: Option<String>,
    pub game_id: Option<String>,
}

impl ContractConfig {
    pub fn from_env() -> Self {
        Self {
            relay_address: std::env::var(RELAY_ADDRESS_ENV).ok(),
            game_id: std::env::var(GAME_ID_ENV).ok(),
        }
    }

    /// Explicit values win over the environment.
    pub fn with_overrides(mut self, relay_address: Option<String>, game_id: Option<String>) -> Self {
        if relay_address.is_some() { self.relay_address = relay_address; }
        if game_id.is_some() { self.game_id = game_id; }
        self
    }
}
