//! Account adapter
//!
//! Accounts are read-only: nothing is created or edited remotely, the
//! declared object only mirrors the account details.

use super::remote_error;
use uptime_operator_core::{AccountStatus, Result};
use uptimerobot_client::{AccountApi, AccountDetails};

pub fn account_status(details: &AccountDetails) -> AccountStatus {
    AccountStatus {
        email: details.email.clone(),
        monitor_limit: details.monitor_limit,
        monitor_interval: details.monitor_interval,
        up_monitors: details.up_monitors,
        down_monitors: details.down_monitors,
        paused_monitors: details.paused_monitors,
    }
}

/// Current account status as reported by the API
pub async fn fetch_account_status<G: AccountApi + ?Sized>(api: &G) -> Result<AccountStatus> {
    let details = api.get_account_details().await.map_err(remote_error)?;
    Ok(account_status(&details))
}
