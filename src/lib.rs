pub mod equity;
pub mod logs;
pub mod ratings;
pub mod rng;
pub mod rules;
pub mod shared;
pub mod state;
pub mod tournament;
pub mod view;

pub use shared::*;
pub use state::{HandState, SeatState, simulate_hand};
pub use tournament::{MatchConfig, run_match};
pub use view::{LegalAction, VisibleState, make_visible_state, normalize_action};
