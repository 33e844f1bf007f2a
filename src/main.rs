use anyhow::Result;
use chainboard::arbiter::ArbiterParams;
use chainboard::config::ContractConfig;
use chainboard::contract::{ContractSession, LocalChain};
use chainboard::render::{self, GameOverNotice};
use chainboard::widget::{DragOutcome, TextBoard};
use chainboard::{BoardController, UserMove};
use clap::Parser;
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive chessboard with local or contract arbitration", long_about = None)]
struct Args {
    /// Starting FEN position
    #[arg(long)]
    fen: Option<String>,

    /// Arbitrate moves through the contract instead of locally
    #[arg(long)]
    contract: bool,

    /// Relay address passed to the contract constructor (default: $CHAINBOARD_RELAY_ADDRESS)
    #[arg(long)]
    relay: Option<String>,

    /// Game identifier passed to the contract constructor (default: $CHAINBOARD_GAME_ID)
    #[arg(long)]
    game_id: Option<String>,

    /// Search depth of the contract's engine reply
    #[arg(long, default_value_t = 2)]
    search_depth: u32,

    /// Seed for deployment addresses
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let widget = TextBoard::new(Box::new(io::stdout()));
    let mut ctrl = BoardController::new(widget, args.fen.as_deref())?;

    if args.contract {
        let overrides = ContractConfig { relay_address: args.relay.clone(), game_id: args.game_id.clone() };
        let mut chain = LocalChain::new(ArbiterParams { depth: args.search_depth }, args.seed);
        let mut session = ContractSession::new();
        session.start_from_env(&mut chain, &overrides);
        ctrl = ctrl.with_session(session);
    }

    let mut stdout = io::stdout();
    render::run_once(&mut ctrl, &mut stdout)?;
    let mut game_over = GameOverNotice::default();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line { Ok(s) => s.trim().to_string(), Err(_) => break };
        if line.is_empty() { continue; }
        match line.as_str() {
            "quit" => break,
            "flip" => ctrl.toggle_orientation(),
            "fen" => println!("{}", ctrl.position().fen()),
            "dests" => println!("{}", serde_json::to_string(&ctrl.dests())?),
            "debug" => println!("{}", ctrl.debug_snapshot()?),
            other => match other.parse::<UserMove>() {
                Ok(mv) => match ctrl.widget_mut().drag_move(mv) {
                    DragOutcome::Rejected => println!("Illegal move!"),
                    DragOutcome::Premoved | DragOutcome::Moved => {}
                },
                Err(_) => println!("Invalid move format! Use format like 'e2e4'"),
            },
        }
        ctrl.pump();
        if game_over.check(ctrl.position().status()) {
            println!("Game over.");
        }
        stdout.flush()?;
    }
    Ok(())
}
