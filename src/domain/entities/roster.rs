use std::collections::HashSet;
use chrono::{DateTime, Utc};

/// Snapshot of who is in the channel and who holds a privileged role
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub chatter_count: u64,
    moderators: HashSet<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_moderators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.moderators = names.into_iter().map(|n| n.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_chatter_count(mut self, count: u64) -> Self {
        self.chatter_count = count;
        self
    }

    pub fn fetched_now(mut self) -> Self {
        self.fetched_at = Some(Utc::now());
        self
    }

    /// Channel names are case-insensitive
    pub fn is_moderator(&self, name: &str) -> bool {
        self.moderators.contains(&name.to_lowercase())
    }

    pub fn moderator_count(&self) -> usize {
        self.moderators.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderator_lookup_ignores_case() {
        let roster = Roster::new().with_moderators(["Alice", "bob"]);
        assert!(roster.is_moderator("alice"));
        assert!(roster.is_moderator("BOB"));
        assert!(!roster.is_moderator("mallory"));
        assert_eq!(roster.moderator_count(), 2);
    }

    #[test]
    fn test_empty_roster_has_no_privileged_members() {
        let roster = Roster::default();
        assert!(!roster.is_moderator(""));
        assert_eq!(roster.chatter_count, 0);
        assert!(roster.fetched_at.is_none());
    }
}
