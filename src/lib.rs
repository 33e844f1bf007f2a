pub mod adapter;
pub mod arbiter;
pub mod config;
pub mod contract;
pub mod controller;
pub mod error;
pub mod render;
pub mod rules;
pub mod widget;

pub use adapter::{to_color, to_dests, DestinationMap, Side};
pub use controller::BoardController;
pub use error::{Error, Result};
pub use rules::{Position, UserMove};
