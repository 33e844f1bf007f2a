use chainboard::arbiter::ArbiterParams;
use chainboard::config::{ContractConfig, GAME_ID_ENV, RELAY_ADDRESS_ENV};
use chainboard::contract::{ContractSession, LocalChain, SessionState};

// Own test binary: the only test here that touches the process environment.
#[test]
fn environment_is_read_when_deployment_starts() {
    std::env::set_var(RELAY_ADDRESS_ENV, "0x00000000000000000000000000000000000000bb");
    std::env::set_var(GAME_ID_ENV, "from-env");
    let mut chain = LocalChain::new(ArbiterParams::default(), 5);

    let mut session = ContractSession::new();
    assert_eq!(session.start_from_env(&mut chain, &ContractConfig::default()), &SessionState::Active);
    let addr = session.address().expect("attached").clone();
    assert_eq!(chain.game_id(&addr).as_deref(), Some("from-env"));

    let overrides = ContractConfig { relay_address: None, game_id: Some("from-cli".into()) };
    let mut second = ContractSession::new();
    second.start_from_env(&mut chain, &overrides);
    let addr = second.address().expect("attached").clone();
    assert_eq!(chain.game_id(&addr).as_deref(), Some("from-cli"));
}
