//! Blockchain client collaborator and the session wrapped around it.
//!
//! `ContractClient` and `LiveContract` are the only surface the rest of the
//! crate sees of a chain: deploy, wait for the deployment, attach to the
//! address, call a method, subscribe to an event. Payloads cross the boundary
//! as encoded strings (see [`wire`]).

pub mod local;
pub mod session;
pub mod wire;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::Sender;
use crate::config::ContractConfig;
use crate::error::Result;

pub use local::LocalChain;
pub use session::{ContractSession, SessionState};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Constructor arguments. Passed through as read from the environment,
/// missing values included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployArgs {
    pub relay_address: Option<String>,
    pub game_id: Option<String>,
}

impl From<&ContractConfig> for DeployArgs {
    fn from(c: &ContractConfig) -> Self {
        Self { relay_address: c.relay_address.clone(), game_id: c.game_id.clone() }
    }
}

/// A submitted but not yet mined deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDeployment {
    pub tx_hash: String,
}

/// Listener for an event stream; receives encoded event payloads.
pub type EventListener = Sender<String>;

pub trait ContractClient {
    fn deploy(&mut self, args: &DeployArgs) -> Result<PendingDeployment>;

    fn await_deployment(&mut self, pending: PendingDeployment) -> Result<Address>;

    fn attach(&mut self, address: &Address) -> Result<Box<dyn LiveContract>>;
}

pub trait LiveContract {
    fn address(&self) -> &Address;

    fn call(&mut self, method: &str, args: &str) -> Result<()>;

    fn subscribe(&mut self, event: &str, listener: EventListener) -> Result<()>;
}
