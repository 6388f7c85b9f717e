//! Pure game rules: vote tally, speaking order, win conditions.

mod order;
mod tally;
mod win;

pub use order::speaking_order;
pub use tally::{tally, Tally};
pub use win::{check_winner, SideCount, Verdict};
