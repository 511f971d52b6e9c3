use crate::inhibit::rule::{InhibitionRule, Tags};
use log::{debug, trace};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrent index of inhibition rules keyed by alert name
///
/// The registry answers "is this alert currently inhibited?" on the hot path of
/// alert evaluation while rules are added and removed from other threads.
///
/// The whole name -> rules map sits behind a single readers-writer lock: lookups
/// share it, `add` and `remove` take it exclusively. Rule activation lives in
/// each rule's own atomic flag, so toggling a rule never contends with the lock.
///
/// The registry is meant to be created once by the owning alerting subsystem and
/// shared as `Arc<InhibitorRegistry>` with every component that needs a
/// suppression decision.
#[derive(Debug, Default)]
pub struct InhibitorRegistry {
    /// Rules per alert name, in insertion order
    index: RwLock<HashMap<String, Vec<Arc<InhibitionRule>>>>,
}

impl InhibitorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Check whether an alert is currently inhibited
    ///
    /// Returns `true` if at least one rule registered under `name` is active and
    /// matches `tags`. Unknown names are simply not inhibited.
    ///
    /// # Arguments
    ///
    /// * `name` - Alert name being evaluated
    /// * `tags` - Tags attached to the alert event
    pub fn is_inhibited(&self, name: &str, tags: &Tags) -> bool {
        let index = self.index.read();
        match index.get(name) {
            Some(rules) => rules.iter().any(|rule| rule.is_inhibiting(name, tags)),
            None => false,
        }
    }

    /// Register a rule under its alert name
    ///
    /// The rule is appended after any rules already registered for that name.
    /// Adding the same rule twice registers it twice; callers pair every `add`
    /// with one `remove`.
    pub fn add(&self, rule: Arc<InhibitionRule>) {
        let mut index = self.index.write();
        let rules = index.entry(rule.name().to_string()).or_default();
        debug!(
            "Added inhibition rule for '{}' ({} registered for this alert)",
            rule.name(),
            rules.len() + 1
        );
        rules.push(rule);
    }

    /// Unregister a rule
    ///
    /// Removes the first entry that is the same `Arc` as `rule`, keeping the order
    /// of the remaining entries. Removing a rule that is not registered does
    /// nothing, so concurrent removals of the same rule are harmless.
    pub fn remove(&self, rule: &Arc<InhibitionRule>) {
        let mut index = self.index.write();

        let Some(rules) = index.get_mut(rule.name()) else {
            trace!("No inhibition rules registered for '{}'", rule.name());
            return;
        };

        match rules.iter().position(|registered| Arc::ptr_eq(registered, rule)) {
            Some(position) => {
                rules.remove(position);
                let remaining = rules.len();
                if remaining == 0 {
                    index.remove(rule.name());
                }
                debug!(
                    "Removed inhibition rule for '{}' ({} remaining for this alert)",
                    rule.name(),
                    remaining
                );
            }
            None => trace!("Inhibition rule for '{}' was not registered", rule.name()),
        }
    }

    /// Snapshot of the rules registered under `name`, in insertion order
    pub fn rules_for(&self, name: &str) -> Vec<Arc<InhibitionRule>> {
        self.index.read().get(name).cloned().unwrap_or_default()
    }

    /// Whether this exact rule is currently registered
    pub fn contains(&self, rule: &Arc<InhibitionRule>) -> bool {
        self.index
            .read()
            .get(rule.name())
            .is_some_and(|rules| rules.iter().any(|registered| Arc::ptr_eq(registered, rule)))
    }

    /// Total number of registered entries across all alert names
    pub fn len(&self) -> usize {
        self.index.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }
}
