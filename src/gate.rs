use crate::models::UserRecord;

/// Votes every visitor gets before tasks are required.
pub const FREE_VOTES: u64 = 2;
/// Completed tasks that lift the free-vote limit.
pub const TASKS_TO_UNLOCK: u64 = 1;

pub fn can_vote(user: &UserRecord) -> bool {
    if user.votes_cast < FREE_VOTES {
        return true;
    }
    user.tasks_completed >= TASKS_TO_UNLOCK
}
