use chainboard::arbiter::ArbiterParams;
use chainboard::config::ContractConfig;
use chainboard::contract::{ContractSession, LocalChain, SessionState};
use chainboard::widget::{BoardWidget, DragOutcome, TextBoard};
use chainboard::BoardController;
use clap::Parser;
use cozy_chess::GameStatus;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(name = "chainboard-demo", about = "Random player against the contract arbiter")]
struct Args {
    /// Number of player moves to submit
    #[arg(long, default_value_t = 20)]
    moves: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 2)]
    depth: u32,
    #[arg(long, default_value = "0x0000000000000000000000000000000000000001")]
    relay: String,
    #[arg(long, default_value = "demo")]
    game_id: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let a = Args::parse();

    let mut chain = LocalChain::new(ArbiterParams { depth: a.depth }, a.seed);
    let config = ContractConfig { relay_address: Some(a.relay), game_id: Some(a.game_id) };
    let mut session = ContractSession::new();
    if let SessionState::Error(e) = session.start(&mut chain, &config) {
        anyhow::bail!("deployment failed: {e}");
    }
    let mut ctrl = BoardController::new(TextBoard::headless(), None)?.with_session(session);
    let mut rng = SmallRng::seed_from_u64(a.seed);

    for ply in 0..a.moves {
        if ctrl.position().status() != GameStatus::Ongoing { break; }
        let legal = ctrl.position().legal_moves();
        let mv = legal[rng.gen_range(0..legal.len())];
        if ctrl.widget_mut().drag_move(mv) != DragOutcome::Moved {
            eprintln!("widget refused {} at ply {}", mv, ply);
            break;
        }
        ctrl.pump();
        println!("{:>3}. {}  ->  {}", ply + 1, mv, ctrl.widget().state().last_move.as_ref().map(|(f, t)| format!("{f}{t}")).unwrap_or_default());
    }

    println!("{}", ctrl.widget().render_frame());
    println!("final: {} ({:?})", ctrl.position().fen(), ctrl.position().status());
    Ok(())
}
