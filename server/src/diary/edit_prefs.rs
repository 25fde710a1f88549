//! Per-session preferences for the diary edit views, stored client-side in a cookie.

use log::debug;
use programme_api_types::EditPreferences;
use std::collections::HashMap;

pub const DEFAULT_DAYS_AHEAD: u32 = 90;

pub fn default_preferences() -> EditPreferences {
    EditPreferences {
        popups: true,
        daysahead: DEFAULT_DAYS_AHEAD,
    }
}

/// Apply a submitted string map to the preferences. Unknown keys and unparseable values are
/// ignored, so a stale or partial submission never breaks the session.
pub fn apply_updates(preferences: &mut EditPreferences, updates: &HashMap<String, String>) {
    for (key, value) in updates {
        match key.as_str() {
            "popups" => match value.parse() {
                Ok(popups) => preferences.popups = popups,
                Err(_) => debug!("Ignoring invalid popups preference value '{}'", value),
            },
            "daysahead" => match value.parse() {
                Ok(daysahead) if daysahead > 0 => preferences.daysahead = daysahead,
                _ => debug!("Ignoring invalid daysahead preference value '{}'", value),
            },
            _ => debug!("Ignoring unknown preference key '{}'", key),
        }
    }
}

/// Restore preferences from the session cookie value, falling back to the defaults when the
/// cookie is missing or does not parse.
pub fn from_cookie_value(value: Option<&str>) -> EditPreferences {
    value
        .and_then(|value| serde_json::from_str(value).ok())
        .unwrap_or_else(default_preferences)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updates(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let preferences = default_preferences();
        assert!(preferences.popups);
        assert_eq!(preferences.daysahead, 90);
    }

    #[test]
    fn test_apply_updates() {
        let mut preferences = default_preferences();
        apply_updates(
            &mut preferences,
            &updates(&[("popups", "false"), ("daysahead", "30")]),
        );
        assert!(!preferences.popups);
        assert_eq!(preferences.daysahead, 30);
    }

    #[test]
    fn test_unknown_keys_and_bad_values_are_ignored() {
        let mut preferences = default_preferences();
        apply_updates(
            &mut preferences,
            &updates(&[
                ("popups", "yes please"),
                ("daysahead", "0"),
                ("colourscheme", "dark"),
            ]),
        );
        assert_eq!(preferences, default_preferences());
    }

    #[test]
    fn test_cookie_round_trip() {
        let mut preferences = default_preferences();
        preferences.daysahead = 185;
        let cookie = serde_json::to_string(&preferences).unwrap();
        assert_eq!(from_cookie_value(Some(&cookie)), preferences);
        assert_eq!(from_cookie_value(None), default_preferences());
        assert_eq!(from_cookie_value(Some("not json")), default_preferences());
    }
}
