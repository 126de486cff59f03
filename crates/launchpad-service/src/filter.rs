//! Post-processing of resolved user lists.

use launchpad_core::UserInfo;

/// Drop bot accounts unless `include_bot` is set.
///
/// Keeps the input order and never touches the input, so the cached
/// superset stays unfiltered.
pub fn filter_bots(users: &[UserInfo], include_bot: bool) -> Vec<UserInfo> {
    if include_bot {
        return users.to_vec();
    }
    users.iter().filter(|user| !user.is_bot()).cloned().collect()
}
