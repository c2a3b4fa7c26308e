mod attendance;
mod auction;
mod bid;
mod high_bid;

pub use {
    attendance::*,
    auction::*,
    bid::*,
    high_bid::*,
};
