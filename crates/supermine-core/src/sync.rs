//! Account sync boundary.
//!
//! Only the data shapes live here. Moving them over the network is the
//! caller's business.

use serde::{Deserialize, Serialize};

/// Account state returned by the backend on login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteAccount {
    #[serde(default)]
    pub coin: f64,
    #[serde(default)]
    pub mine: f64,
    #[serde(default)]
    pub daily_reward: u8,
}

/// Local state pushed back to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub user_id: u64,
    /// 1 while a mining session is active, else 0.
    pub is_active: u8,
    pub coin: f64,
    pub mine: f64,
    pub converted: f64,
    pub daily_reward: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_account_fills_missing_fields() {
        let account: RemoteAccount = serde_json::from_str(r#"{"coin": 120.5}"#).unwrap();
        assert_eq!(account.coin, 120.5);
        assert_eq!(account.mine, 0.0);
        assert_eq!(account.daily_reward, 0);
    }

    #[test]
    fn payload_field_names() {
        let payload = SyncPayload {
            user_id: 7,
            is_active: 1,
            coin: 10.0,
            mine: 2.0,
            converted: 0.5,
            daily_reward: 3,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["user_id"], 7);
        assert_eq!(json["is_active"], 1);
        assert_eq!(json["daily_reward"], 3);
    }
}
