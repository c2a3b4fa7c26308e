use {
    crate::kernel::entities::{
        AuctionId,
        UserId,
    },
    strum::{
        Display,
        EnumString,
    },
    time::OffsetDateTime,
};

/// Whether a user is an active observer of an auction. Consumed to scope
/// notification fan-out and to clean up on logout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceState {
    Attending,
    Left,
    AuctionComplete,
    /// Tag for rows that fail validation on read.
    BadRecord,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attendance {
    pub user_id:     UserId,
    pub auction_id:  AuctionId,
    pub attend_time: OffsetDateTime,
    pub state:       AttendanceState,
}
