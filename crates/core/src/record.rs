use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Metadata row pointing at a stored portrait image.
///
/// A record exists only after a successful save; its absence is the normal
/// "no portrait yet" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortraitRecord {
    /// Normalized wallet address (primary key).
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "0xabc0000000000000000000000000000000000001"))]
    pub address: Address,
    /// Reference path served by the image retrieval route.
    #[cfg_attr(feature = "openapi", schema(example = "/api/image/portraits/0xabc0000000000000000000000000000000000001.webp"))]
    pub image_url: String,
    /// Prompt used to generate the image, if one was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated. Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl PortraitRecord {
    /// Build a fresh record with both timestamps set to `now`.
    pub fn new(address: Address, image_url: String, prompt: Option<String>, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            address,
            image_url,
            prompt,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a subsequent save: replace the image, keep the old prompt unless
    /// a new one is given, and advance `updated_at`.
    pub fn apply_save(&mut self, image_url: String, prompt: Option<String>, now: DateTime<Utc>) {
        self.image_url = image_url;
        if prompt.is_some() {
            self.prompt = prompt;
        }
        self.updated_at = next_updated_at(self.updated_at, now);
    }
}

/// Timestamp for an update: `now`, but always at least one microsecond after
/// `previous`. Timestamps are kept at microsecond precision to match the
/// database column.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    let floor = previous.trunc_subsecs(6) + TimeDelta::microseconds(1);
    now.max(floor)
}

/// Treat a blank optional prompt as absent.
pub fn normalize_prompt(prompt: Option<&str>) -> Option<String> {
    prompt
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        Address::parse("0xabc").unwrap()
    }

    #[test]
    fn new_record_has_equal_timestamps() {
        let now = Utc::now();
        let record = PortraitRecord::new(addr(), "/api/image/x.webp".into(), None, now);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn apply_save_keeps_prompt_when_absent() {
        let now = Utc::now();
        let mut record =
            PortraitRecord::new(addr(), "/a".into(), Some("a fox".into()), now);
        record.apply_save("/b".into(), None, now);
        assert_eq!(record.image_url, "/b");
        assert_eq!(record.prompt.as_deref(), Some("a fox"));
    }

    #[test]
    fn apply_save_replaces_prompt_when_given() {
        let now = Utc::now();
        let mut record =
            PortraitRecord::new(addr(), "/a".into(), Some("a fox".into()), now);
        record.apply_save("/a".into(), Some("an owl".into()), now);
        assert_eq!(record.prompt.as_deref(), Some("an owl"));
    }

    #[test]
    fn updated_at_strictly_increases_within_same_tick() {
        let now = Utc::now();
        let mut record = PortraitRecord::new(addr(), "/a".into(), None, now);
        let first = record.updated_at;
        record.apply_save("/a".into(), None, now);
        assert!(record.updated_at > first);
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn next_updated_at_uses_now_when_later() {
        let previous = Utc::now().trunc_subsecs(6);
        let now = previous + TimeDelta::seconds(5);
        assert_eq!(next_updated_at(previous, now), now);
    }

    #[test]
    fn next_updated_at_handles_clock_skew() {
        let previous = Utc::now().trunc_subsecs(6);
        let earlier = previous - TimeDelta::seconds(5);
        assert_eq!(
            next_updated_at(previous, earlier),
            previous + TimeDelta::microseconds(1)
        );
    }

    #[test]
    fn normalize_prompt_blank_is_none() {
        assert_eq!(normalize_prompt(None), None);
        assert_eq!(normalize_prompt(Some("")), None);
        assert_eq!(normalize_prompt(Some("   ")), None);
        assert_eq!(normalize_prompt(Some(" a fox ")).as_deref(), Some("a fox"));
    }

    #[test]
    fn serializes_camel_case() {
        let record = PortraitRecord::new(addr(), "/a".into(), Some("p".into()), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["address"], "0xabc");
        assert_eq!(json["imageUrl"], "/a");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
