use {
    super::Service,
    crate::{
        api::RestError,
        kernel::entities::UserId,
    },
};

pub struct LeaveAuctionInput {
    pub user_id: UserId,
}

impl Service {
    /// Logout cleanup: flip every auction the user was attending to left.
    #[tracing::instrument(skip_all, fields(user_id = %input.user_id))]
    pub async fn leave_auctions(&self, input: LeaveAuctionInput) -> Result<u64, RestError> {
        let left = self.repo.mark_attendance_left(input.user_id).await?;
        tracing::debug!(left, "Observer left their auctions.");
        Ok(left)
    }
}
