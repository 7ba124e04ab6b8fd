//! Game session data model
//!
//! One `GameSession` is persisted per played stage. The stored form adds a
//! store-generated `_id` and the insertion timestamp.
//!
//! # Invariants
//!
//! - All four allocation buckets are always present
//! - Every scalar field carries a value (its default when omitted)
//! - Records are never edited after insertion
//! - Numbers keep the form they arrived in (`1200` stays an integer)

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

pub const DEFAULT_STAGE_NAME: &str = "defaultStage";
pub const DEFAULT_DATE: &str = "defaultDate";
pub const DEFAULT_TIME: &str = "defaultTime";
pub const DEFAULT_USER_ID: &str = "defaultUser";
pub const DEFAULT_SPECIFIC_OPTION: &str = "defaultOption";

/// Names of the four allocation buckets, in wire order.
pub const ALLOCATION_BUCKETS: [&str; 4] = ["essentials", "transport", "lifestyle", "savings"];

/// One allocation bucket: a running total plus itemized sub-options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionAllocation {
    pub total: Number,
    /// Keys vary by category, so this stays an open map.
    pub options: Map<String, Value>,
}

impl Default for OptionAllocation {
    fn default() -> Self {
        Self {
            total: Number::from(0),
            options: Map::new(),
        }
    }
}

/// The fixed set of allocation buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocatedOptions {
    pub essentials: OptionAllocation,
    pub transport: OptionAllocation,
    pub lifestyle: OptionAllocation,
    pub savings: OptionAllocation,
}

/// A validated, fully-populated game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub stage_name: String,
    pub date: String,
    pub time: String,
    pub user_id: String,
    pub total_amount: Number,
    pub shock_amount: Number,
    pub total_earning: Number,
    pub speed_bonus: Number,
    pub pre_shock_earnings: Number,
    pub specific_option: String,
    pub is_post_shock: bool,
    pub allocated_options: AllocatedOptions,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            stage_name: DEFAULT_STAGE_NAME.to_string(),
            date: DEFAULT_DATE.to_string(),
            time: DEFAULT_TIME.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            total_amount: Number::from(0),
            shock_amount: Number::from(0),
            total_earning: Number::from(0),
            speed_bonus: Number::from(0),
            pre_shock_earnings: Number::from(0),
            specific_option: DEFAULT_SPECIFIC_OPTION.to_string(),
            is_post_shock: false,
            allocated_options: AllocatedOptions::default(),
        }
    }
}

/// A game session as persisted by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub session: GameSession,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl StoredSession {
    /// Assigns a fresh identifier and insertion timestamp.
    pub fn assign(session: GameSession) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session,
            created_at: Utc::now(),
        }
    }
}

/// Ordering used by the sorted listing: `stageName` ascending, then
/// `isPostShock` with `false` first.
pub fn sorted_order(a: &StoredSession, b: &StoredSession) -> Ordering {
    a.session
        .stage_name
        .as_bytes()
        .cmp(b.session.stage_name.as_bytes())
        .then(a.session.is_post_shock.cmp(&b.session.is_post_shock))
}

/// Sorts sessions in place. The sort is stable, so ties keep store order.
pub fn sort_sessions(sessions: &mut [StoredSession]) {
    sessions.sort_by(sorted_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(stage: &str, post_shock: bool) -> StoredSession {
        StoredSession::assign(GameSession {
            stage_name: stage.to_string(),
            is_post_shock: post_shock,
            ..GameSession::default()
        })
    }

    #[test]
    fn test_default_session_matches_documented_defaults() {
        let session = GameSession::default();
        assert_eq!(session.stage_name, "defaultStage");
        assert_eq!(session.date, "defaultDate");
        assert_eq!(session.time, "defaultTime");
        assert_eq!(session.user_id, "defaultUser");
        assert_eq!(session.specific_option, "defaultOption");
        assert_eq!(session.total_amount, Number::from(0));
        assert!(!session.is_post_shock);
        assert!(session.allocated_options.savings.options.is_empty());
    }

    #[test]
    fn test_stored_session_wire_format() {
        let record = StoredSession::assign(GameSession::default());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["_id"], json!(record.id));
        assert_eq!(value["stageName"], "defaultStage");
        assert_eq!(value["isPostShock"], false);
        assert!(value["createdAt"].is_string());
        assert_eq!(value["allocatedOptions"]["essentials"]["total"], 0.0);
        assert!(value["allocatedOptions"]["lifestyle"]["options"].is_object());
    }

    #[test]
    fn test_stored_session_json_round_trip() {
        let mut session = GameSession::default();
        session
            .allocated_options
            .transport
            .options
            .insert("bus".into(), json!({"cost": 40, "picked": true}));
        let record = StoredSession::assign(session);

        let text = serde_json::to_string(&record).unwrap();
        let back: StoredSession = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_assign_generates_distinct_ids() {
        let a = StoredSession::assign(GameSession::default());
        let b = StoredSession::assign(GameSession::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sort_by_stage_then_post_shock() {
        let mut sessions = vec![
            stored("stage2", false),
            stored("stage1", true),
            stored("stage1", false),
            stored("Stage3", true),
        ];
        sort_sessions(&mut sessions);

        let order: Vec<_> = sessions
            .iter()
            .map(|s| (s.session.stage_name.as_str(), s.session.is_post_shock))
            .collect();
        // Byte-wise comparison puts uppercase before lowercase
        assert_eq!(
            order,
            vec![
                ("Stage3", true),
                ("stage1", false),
                ("stage1", true),
                ("stage2", false),
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let first = stored("stage1", false);
        let second = stored("stage1", false);
        let mut sessions = vec![first.clone(), second.clone()];
        sort_sessions(&mut sessions);
        assert_eq!(sessions[0].id, first.id);
        assert_eq!(sessions[1].id, second.id);
    }
}
