use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Net position of a user within a group.
///
/// Derived, never stored: the sum of everything the user paid for, minus
/// their share of every expense, adjusted by completed settlements.
/// Positive means the user is owed money; negative means they owe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub net_cents: i64,
}

impl Balance {
    pub fn new(user_id: Uuid, group_id: Uuid, net_cents: i64) -> Self {
        Self {
            user_id,
            group_id,
            net_cents,
        }
    }

    /// Whether the user is square with the group
    pub fn is_settled(&self) -> bool {
        self.net_cents == 0
    }

    /// Amount the user is owed (zero if they owe)
    pub fn owed_cents(&self) -> i64 {
        self.net_cents.max(0)
    }

    /// Amount the user owes (zero if they are owed)
    pub fn owes_cents(&self) -> i64 {
        (-self.net_cents).max(0)
    }
}
