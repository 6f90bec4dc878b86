//! Account details

use crate::client::{Params, UptimeRobotClient};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountDetails {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub monitor_limit: u32,
    #[serde(default)]
    pub monitor_interval: u32,
    #[serde(default)]
    pub up_monitors: u32,
    #[serde(default)]
    pub down_monitors: u32,
    #[serde(default)]
    pub paused_monitors: u32,
}

#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn get_account_details(&self) -> Result<AccountDetails>;
}

#[derive(Deserialize)]
struct GetAccountDetailsResponse {
    account: AccountDetails,
}

#[async_trait]
impl AccountApi for UptimeRobotClient {
    async fn get_account_details(&self) -> Result<AccountDetails> {
        let response: GetAccountDetailsResponse =
            self.request("getAccountDetails", Params::new()).await?;
        Ok(response.account)
    }
}
