//! Identity Commands

use serde::Deserialize;
use taskboard_core::UserId;

use super::call;

/// The signed-in user as reported by the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CurrentUser {
    /// Name for greetings: first name, else email, else the id
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

pub async fn current_user() -> Result<CurrentUser, String> {
    call("current_user", &()).await
}
