use {
    super::Repository,
    crate::{
        api::RestError,
        kernel::entities::UserId,
    },
};

impl Repository {
    /// Logout cleanup: every auction the user was attending is marked left.
    pub async fn mark_attendance_left(&self, user_id: UserId) -> Result<u64, RestError> {
        self.db.mark_attendance_left(user_id).await
    }
}
