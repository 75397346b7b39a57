//! Push-notification tagging port.
//!
//! The push service segments users by an external id plus string tags.

use crate::model::profile::UserRecord;
use crate::platform::{PlatformInfo, PlatformResult};
use std::collections::BTreeMap;

pub const TAG_CITY: &str = "city";
pub const TAG_GROUP: &str = "group";
pub const TAG_SCHOOL_UNIT_ID: &str = "school_unit_id";
pub const TAG_PLATFORM: &str = "platform";
pub const TAG_PLATFORM_VERSION: &str = "platform_version";
pub const TAG_SCORE: &str = "score";

/// Tags deleted on sign-out. Platform tags describe the device and stay.
pub const USER_TAGS: &[&str] = &[TAG_CITY, TAG_GROUP, TAG_SCHOOL_UNIT_ID, TAG_SCORE];

/// Tag set sent in one call. Absent values are omitted, not blanked.
pub type PushTags = BTreeMap<String, String>;

pub trait PushTagger: Send + Sync {
    fn set_external_user_id(&self, external_id: &str) -> PlatformResult<()>;
    fn remove_external_user_id(&self) -> PlatformResult<()>;
    fn send_tags(&self, tags: &PushTags) -> PlatformResult<()>;
    fn delete_tags(&self, keys: &[&str]) -> PlatformResult<()>;
}

/// Builds identity tags for a freshly signed-in user.
pub fn identity_tags(user: &UserRecord, platform: &PlatformInfo) -> PushTags {
    let mut tags = PushTags::new();
    if let Some(city) = user.city.as_deref() {
        tags.insert(TAG_CITY.to_string(), city.to_string());
    }
    if let Some(group) = user.group_segment() {
        tags.insert(TAG_GROUP.to_string(), group.to_string());
    }
    if let Some(school_unit_id) = user.school_unit_id.as_ref() {
        tags.insert(TAG_SCHOOL_UNIT_ID.to_string(), school_unit_id.to_string());
    }
    tags.insert(TAG_PLATFORM.to_string(), platform.os.as_str().to_string());
    tags.insert(TAG_PLATFORM_VERSION.to_string(), platform.version.clone());
    tags
}

pub fn score_tags(score: u32) -> PushTags {
    PushTags::from([(TAG_SCORE.to_string(), score.to_string())])
}

#[cfg(test)]
mod tests {
    use super::{identity_tags, score_tags};
    use crate::model::profile::{LooseId, UserRecord};
    use crate::platform::{Os, PlatformInfo};

    #[test]
    fn identity_tags_skip_missing_fields() {
        let user = UserRecord::new(9);
        let tags = identity_tags(&user, &PlatformInfo::new(Os::Ios, "17.4"));
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["platform"], "ios");
        assert_eq!(tags["platform_version"], "17.4");
    }

    #[test]
    fn identity_tags_carry_group_segment_and_school_as_string() {
        let mut user = UserRecord::new(9);
        user.city = Some("Gama".to_string());
        user.group = Some("/brasil/df/unb/fga".to_string());
        user.school_unit_id = Some(LooseId::from(1203));

        let tags = identity_tags(&user, &PlatformInfo::new(Os::Android, "33"));
        assert_eq!(tags["city"], "Gama");
        assert_eq!(tags["group"], "unb");
        assert_eq!(tags["school_unit_id"], "1203");
        assert_eq!(tags["platform"], "android");
    }

    #[test]
    fn score_tags_hold_only_score() {
        let tags = score_tags(5);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["score"], "5");
    }
}
