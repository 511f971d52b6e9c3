use log::trace;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tag set attached to an alert event, and the shape of a rule's tag filter
pub type Tags = HashMap<String, String>;

/// A single inhibition condition
///
/// An inhibition rule pairs an alert name with a fixed subset of tags. While the
/// rule is active, any alert with the same name whose tags contain every
/// key/value pair of the filter is considered inhibited.
///
/// The name and filter never change after construction. The active flag is an
/// atomic and can be flipped from any thread without touching the registry that
/// holds the rule. Rules are shared as `Arc<InhibitionRule>` and registries
/// compare them by pointer, so two rules with identical contents are still
/// distinct entries.
#[derive(Debug)]
pub struct InhibitionRule {
    /// Alert name this rule can suppress
    name: String,
    /// Required key/value pairs
    tags: Tags,
    /// Whether the rule currently suppresses matching alerts
    active: AtomicBool,
}

impl InhibitionRule {
    /// Create a new inhibition rule with an explicit initial state
    ///
    /// # Arguments
    ///
    /// * `name` - Alert name the rule applies to
    /// * `tags` - Tag filter; an empty filter matches every alert with this name
    /// * `active` - Whether the rule starts out suppressing alerts
    pub fn new(name: impl Into<String>, tags: Tags, active: bool) -> Self {
        Self {
            name: name.into(),
            tags,
            active: AtomicBool::new(active),
        }
    }

    /// Create a rule that starts out dormant
    pub fn inactive(name: impl Into<String>, tags: Tags) -> Self {
        Self::new(name, tags, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Turn the rule on or off
    ///
    /// Safe to call concurrently with lookups and with other toggles; the last
    /// store wins.
    pub fn set_active(&self, active: bool) {
        let previous = self.active.swap(active, Ordering::AcqRel);
        if previous != active {
            trace!("Inhibition rule '{}' active: {} -> {}", self.name, previous, active);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Check whether this rule currently inhibits the given alert
    ///
    /// Dormant rules return `false` without evaluating the tag filter.
    pub fn is_inhibiting(&self, name: &str, tags: &Tags) -> bool {
        if !self.is_active() {
            return false;
        }
        self.matches(name, tags)
    }

    /// Check whether the alert falls under this rule, ignoring the active flag
    ///
    /// The name must be equal and every filter pair must be present in `tags`
    /// with an equal value. Extra tags on the alert are ignored. A required key
    /// missing from `tags` never matches, even when the required value is empty.
    pub fn matches(&self, name: &str, tags: &Tags) -> bool {
        if name != self.name {
            return false;
        }
        self.tags
            .iter()
            .all(|(key, value)| tags.get(key).is_some_and(|actual| actual == value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rule_initial_state_is_explicit() {
        let on = InhibitionRule::new("cpu_high", Tags::new(), true);
        let off = InhibitionRule::new("cpu_high", Tags::new(), false);

        assert!(on.is_active());
        assert!(!off.is_active());
        assert!(!InhibitionRule::inactive("cpu_high", Tags::new()).is_active());
    }

    #[test]
    fn test_rule_accessors() {
        let rule = InhibitionRule::inactive("disk_full", tags(&[("mount", "/var")]));

        assert_eq!(rule.name(), "disk_full");
        assert_eq!(rule.tags().get("mount").map(String::as_str), Some("/var"));
    }

    #[test]
    fn test_matches_subset_of_tags() {
        let rule = InhibitionRule::inactive("deploy", tags(&[("env", "prod")]));

        assert!(rule.matches("deploy", &tags(&[("env", "prod"), ("region", "us")])));
        assert!(rule.matches("deploy", &tags(&[("env", "prod")])));
        assert!(!rule.matches("deploy", &tags(&[("env", "staging")])));
        assert!(!rule.matches("deploy", &tags(&[("region", "us")])));
    }

    #[test]
    fn test_matches_requires_same_name() {
        let rule = InhibitionRule::inactive("deploy", tags(&[("env", "prod")]));

        assert!(!rule.matches("deploy_failed", &tags(&[("env", "prod")])));
        assert!(!rule.matches("", &tags(&[("env", "prod")])));
    }

    #[test]
    fn test_matches_missing_key_with_empty_required_value() {
        let rule = InhibitionRule::inactive("deploy", tags(&[("owner", "")]));

        assert!(!rule.matches("deploy", &Tags::new()));
        assert!(!rule.matches("deploy", &tags(&[("env", "prod")])));
        assert!(rule.matches("deploy", &tags(&[("owner", "")])));
    }

    #[test]
    fn test_empty_filter_matches_any_tags() {
        let rule = InhibitionRule::inactive("heartbeat", Tags::new());

        assert!(rule.matches("heartbeat", &Tags::new()));
        assert!(rule.matches("heartbeat", &tags(&[("host", "a"), ("dc", "b")])));
        assert!(!rule.matches("other", &Tags::new()));
    }

    #[test]
    fn test_empty_tag_set_only_satisfies_empty_filter() {
        let rule = InhibitionRule::inactive("cpu_high", tags(&[("host", "db1")]));
        assert!(!rule.matches("cpu_high", &Tags::new()));
    }

    #[test]
    fn test_is_inhibiting_follows_active_flag() {
        let rule = InhibitionRule::inactive("cpu_high", tags(&[("host", "db1")]));
        let alert = tags(&[("host", "db1")]);

        assert!(!rule.is_inhibiting("cpu_high", &alert));

        rule.set_active(true);
        assert!(rule.is_inhibiting("cpu_high", &alert));
        assert!(!rule.is_inhibiting("cpu_high", &tags(&[("host", "db2")])));

        rule.set_active(false);
        assert!(!rule.is_inhibiting("cpu_high", &alert));
    }

    #[test]
    fn test_set_active_is_idempotent() {
        let rule = InhibitionRule::inactive("cpu_high", Tags::new());

        rule.set_active(true);
        rule.set_active(true);
        assert!(rule.is_active());

        rule.set_active(false);
        rule.set_active(false);
        assert!(!rule.is_active());
    }

    #[test]
    fn test_set_active_from_other_threads() {
        let rule = std::sync::Arc::new(InhibitionRule::inactive("cpu_high", Tags::new()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let rule = rule.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        rule.set_active(i % 2 == 0);
                        let _ = rule.is_inhibiting("cpu_high", &Tags::new());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        rule.set_active(true);
        assert!(rule.is_inhibiting("cpu_high", &Tags::new()));
    }
}
