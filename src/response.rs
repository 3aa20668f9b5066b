//! Response bodies for the users API.

use crate::model::User;
use serde::{Deserialize, Serialize};

/// One page of a listing, with the totals needed for page navigation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllUsers {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message {
            message: message.into(),
        }
    }
}
