use cozy_chess::GameStatus;
use std::io::{self, Write};
use crate::controller::BoardController;
use crate::widget::BoardWidget;

pub const CONTROLS: &str = "commands: <move> (e.g. e2e4, e7e8q) | flip | dests | fen | debug | quit";

/// Draw the first frame. The widget redraws itself after every later change,
/// so this runs once at startup.
pub fn run_once<W: BoardWidget>(ctrl: &mut BoardController<W>, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "chainboard")?;
    ctrl.widget_mut().redraw();
    writeln!(out, "{CONTROLS}")?;
    out.flush()
}

/// Reports the end of the game once, however many commands follow it.
#[derive(Debug, Default)]
pub struct GameOverNotice {
    shown: bool,
}

impl GameOverNotice {
    /// True the first time `status` is no longer ongoing.
    pub fn check(&mut self, status: GameStatus) -> bool {
        if self.shown || status == GameStatus::Ongoing { return false; }
        self.shown = true;
        true
    }
}
