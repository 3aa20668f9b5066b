//! Role/status counts over a set of users.

use crate::model::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts per observed value. Values with no users are absent, not zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub roles: BTreeMap<String, u64>,
    pub statuses: BTreeMap<String, u64>,
}

pub fn aggregate(users: &[User]) -> UserStats {
    users.iter().fold(UserStats::default(), |mut acc, u| {
        *acc.roles.entry(u.role.to_string()).or_default() += 1;
        *acc.statuses.entry(u.status.to_string()).or_default() += 1;
        acc
    })
}
