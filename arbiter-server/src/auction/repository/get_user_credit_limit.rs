use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::{
            BidAmount,
            UserId,
        },
    },
};

impl Repository {
    /// The identity collaborator's contribution to arbitration: a known
    /// bidder and their credit limit.
    pub async fn get_user_credit_limit(
        &self,
        user_id: UserId,
    ) -> Result<Option<BidAmount>, RestError> {
        self.db.get_user_credit_limit(user_id).await
    }
}
