use log::{debug, error, info, warn};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use super::wire::{self, BoardUpdate, MakeMove, BOARD_UPDATED, MAKE_MOVE};
use super::{Address, ContractClient, DeployArgs, LiveContract};
use crate::config::ContractConfig;
use crate::error::{Error, Result};
use crate::rules::UserMove;

/// Uninitialized -> Deploying -> Active, or Error from Deploying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Deploying,
    Active,
    Error(String),
}

/// Contract-backed arbitration for one game. Owns the live contract handle
/// and is the only writer of on-chain moves.
pub struct ContractSession {
    state: SessionState,
    handle: Option<Box<dyn LiveContract>>,
    events: Option<Receiver<String>>,
}

impl Default for ContractSession {
    fn default() -> Self { Self::new() }
}

impl ContractSession {
    pub fn new() -> Self {
        Self { state: SessionState::Uninitialized, handle: None, events: None }
    }

    /// Deploy, attach and subscribe. Failure leaves the session in `Error`
    /// for good; there is no retry.
    pub fn start(&mut self, client: &mut dyn ContractClient, config: &ContractConfig) -> &SessionState {
        if self.state != SessionState::Uninitialized {
            warn!("contract session already started ({:?})", self.state);
            return &self.state;
        }
        self.state = SessionState::Deploying;
        match Self::deploy(client, config) {
            Ok((handle, events)) => {
                info!("contract session active at {}", handle.address());
                self.handle = Some(handle);
                self.events = Some(events);
                self.state = SessionState::Active;
            }
            Err(e) => {
                error!("contract deployment failed: {e}");
                self.state = SessionState::Error(e.to_string());
            }
        }
        &self.state
    }

    /// `start` with the process configuration read from the environment at
    /// the moment the session begins deploying. Values set in `overrides` win.
    pub fn start_from_env(&mut self, client: &mut dyn ContractClient, overrides: &ContractConfig) -> &SessionState {
        let config = ContractConfig::from_env().with_overrides(overrides.relay_address.clone(), overrides.game_id.clone());
        self.start(client, &config)
    }

    fn deploy(client: &mut dyn ContractClient, config: &ContractConfig) -> Result<(Box<dyn LiveContract>, Receiver<String>)> {
        let pending = client.deploy(&DeployArgs::from(config))?;
        debug!("waiting for deployment {}", pending.tx_hash);
        let address = client.await_deployment(pending)?;
        let mut handle = client.attach(&address)?;
        let (tx, rx) = channel();
        handle.subscribe(BOARD_UPDATED, tx)?;
        Ok((handle, rx))
    }

    pub fn state(&self) -> &SessionState { &self.state }

    pub fn is_active(&self) -> bool { self.state == SessionState::Active }

    pub fn address(&self) -> Option<&Address> { self.handle.as_ref().map(|h| h.address()) }

    /// Forward a player's move for arbitration. Failures are logged and the
    /// move is dropped; returns whether the call went through.
    pub fn submit_move(&mut self, board_fen: &str, mv: &UserMove) -> bool {
        match self.try_submit(board_fen, mv) {
            Ok(()) => { debug!("submitted {}", mv); true }
            Err(e) => { warn!("move {} not submitted: {e}", mv); false }
        }
    }

    fn try_submit(&mut self, board_fen: &str, mv: &UserMove) -> Result<()> {
        let handle = match (&self.state, self.handle.as_mut()) {
            (SessionState::Active, Some(h)) => h,
            (SessionState::Error(_), _) => return Err(Error::NotActive("deployment failed")),
            _ => return Err(Error::NotActive("not deployed")),
        };
        let args = wire::encode(&MakeMove { board_state: board_fen.to_string(), player_move: wire::encode_move(mv) })?;
        handle.call(MAKE_MOVE, &args)
    }

    /// Drain delivered `BoardUpdated` events in arrival order. Undecodable
    /// payloads are logged and skipped.
    pub fn poll(&mut self) -> Vec<BoardUpdate> {
        let mut out = Vec::new();
        let mut closed = false;
        let Some(rx) = self.events.as_ref() else { return out };
        loop {
            match rx.try_recv() {
                Ok(raw) => match wire::decode::<BoardUpdate>(&raw) {
                    Ok(update) => out.push(update),
                    Err(e) => warn!("dropping malformed {} event: {e}", BOARD_UPDATED),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("{} subscription closed", BOARD_UPDATED);
                    closed = true;
                    break;
                }
            }
        }
        if closed { self.events = None; }
        out
    }
}
