//! Parameter-name normalization shared by the constraint and mapping registries.
//!
//! Both registries are keyed by case-insensitive parameter name. Storage and
//! lookup go through [`normalize_key`] so the two paths can never drift apart.

use std::borrow::Cow;

/// Fold a parameter name into its registry key.
///
/// Returns the input unchanged (borrowed) when it is already lower-case, so
/// lookups with canonical names do not allocate.
///
/// ```
/// use paramroute::key::normalize_key;
///
/// assert_eq!(normalize_key("UserId"), "userid");
/// assert_eq!(normalize_key("page"), "page");
/// ```
#[must_use]
pub fn normalize_key(name: &str) -> Cow<'_, str> {
    if name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}
