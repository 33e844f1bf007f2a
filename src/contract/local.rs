use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use super::wire::{self, MakeMove, BOARD_UPDATED, MAKE_MOVE};
use super::{Address, ContractClient, DeployArgs, EventListener, LiveContract, PendingDeployment};
use crate::arbiter::{arbitrate, ArbiterParams};
use crate::error::{Error, Result};

struct Deployed {
    game_id: String,
    listeners: Vec<(String, EventListener)>,
}

struct ChainState {
    rng: SmallRng,
    params: ArbiterParams,
    reachable: bool,
    fail_calls: bool,
    pending: HashMap<String, DeployArgs>,
    contracts: HashMap<Address, Deployed>,
}

/// In-process chain hosting the chess arbiter contract. Clones share the
/// same chain, so a test can keep a handle while a session owns another.
#[derive(Clone)]
pub struct LocalChain {
    inner: Rc<RefCell<ChainState>>,
}

impl LocalChain {
    pub fn new(params: ArbiterParams, seed: u64) -> Self {
        let state = ChainState {
            rng: SmallRng::seed_from_u64(seed),
            params,
            reachable: true,
            fail_calls: false,
            pending: HashMap::new(),
            contracts: HashMap::new(),
        };
        Self { inner: Rc::new(RefCell::new(state)) }
    }

    /// A chain every request to which fails, as if the RPC endpoint were down.
    pub fn unreachable() -> Self {
        let chain = Self::new(ArbiterParams::default(), 0);
        chain.inner.borrow_mut().reachable = false;
        chain
    }

    /// Make subsequent contract calls fail while deployment keeps working.
    pub fn set_call_failures(&self, fail: bool) { self.inner.borrow_mut().fail_calls = fail; }

    pub fn game_id(&self, address: &Address) -> Option<String> {
        self.inner.borrow().contracts.get(address).map(|c| c.game_id.clone())
    }

    fn check_reachable(&self) -> Result<()> {
        if self.inner.borrow().reachable { Ok(()) } else { Err(Error::Deploy("connection refused".into())) }
    }
}

fn hex(rng: &mut SmallRng, bytes: usize) -> String {
    (0..bytes).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

impl ContractClient for LocalChain {
    fn deploy(&mut self, args: &DeployArgs) -> Result<PendingDeployment> {
        self.check_reachable()?;
        let mut st = self.inner.borrow_mut();
        let tx_hash = format!("0x{}", hex(&mut st.rng, 32));
        debug!("deploy tx {} with {:?}", tx_hash, args);
        st.pending.insert(tx_hash.clone(), args.clone());
        Ok(PendingDeployment { tx_hash })
    }

    fn await_deployment(&mut self, pending: PendingDeployment) -> Result<Address> {
        self.check_reachable()?;
        let mut st = self.inner.borrow_mut();
        let args = st.pending.remove(&pending.tx_hash)
            .ok_or_else(|| Error::Deploy(format!("unknown transaction {}", pending.tx_hash)))?;
        // The constructor requires both values; missing ones revert here.
        let (Some(relay), Some(game_id)) = (args.relay_address, args.game_id) else {
            return Err(Error::Deploy("execution reverted: missing constructor argument".into()));
        };
        let address = Address(format!("0x{}", hex(&mut st.rng, 20)));
        info!("contract deployed at {} (relay {}, game {})", address, relay, game_id);
        st.contracts.insert(address.clone(), Deployed { game_id, listeners: Vec::new() });
        Ok(address)
    }

    fn attach(&mut self, address: &Address) -> Result<Box<dyn LiveContract>> {
        self.check_reachable()?;
        if !self.inner.borrow().contracts.contains_key(address) {
            return Err(Error::Deploy(format!("no contract at {address}")));
        }
        Ok(Box::new(LocalContract { chain: self.clone(), address: address.clone() }))
    }
}

pub struct LocalContract {
    chain: LocalChain,
    address: Address,
}

impl LiveContract for LocalContract {
    fn address(&self) -> &Address { &self.address }

    fn call(&mut self, method: &str, args: &str) -> Result<()> {
        let fail = |reason: String| Error::Call { method: method.to_string(), reason };
        let params = {
            let st = self.chain.inner.borrow();
            if !st.reachable || st.fail_calls { return Err(fail("network unreachable".into())); }
            st.params
        };
        if method != MAKE_MOVE { return Err(fail("unknown method".into())); }
        let req: MakeMove = wire::decode(args)?;
        let update = arbitrate(&req.board_state, &req.player_move, &params)
            .map_err(|e| fail(format!("execution reverted: {e}")))?;
        let data = wire::encode(&update)?;

        let mut st = self.chain.inner.borrow_mut();
        let contract = st.contracts.get_mut(&self.address).ok_or_else(|| fail("contract vanished".into()))?;
        // Listeners whose receiver is gone are dropped.
        contract.listeners.retain(|(name, tx)| name != BOARD_UPDATED || tx.send(data.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&mut self, event: &str, listener: EventListener) -> Result<()> {
        let mut st = self.chain.inner.borrow_mut();
        let contract = st.contracts.get_mut(&self.address)
            .ok_or_else(|| Error::Deploy(format!("no contract at {}", self.address)))?;
        contract.listeners.push((event.to_string(), listener));
        Ok(())
    }
}
