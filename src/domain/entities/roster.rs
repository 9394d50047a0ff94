use serde::{Deserialize, Serialize};

/// One participant allowed to appear on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub id: u32,
}

/// Display name to user id mapping. Results of names missing here are never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<RosterEntry>);

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Roster(entries)
    }

    pub fn user_id(&self, name: &str) -> Option<u32> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.0.iter().find(|e| e.name == name).map(|e| e.id)
    }

    /// Names in display order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            RosterEntry { name: "Park".into(), id: 3 },
            RosterEntry { name: "Ahn".into(), id: 1 },
        ])
    }

    #[test]
    fn user_id_trims_the_name() {
        assert_eq!(roster().user_id("  Park "), Some(3));
    }

    #[test]
    fn unknown_or_blank_names_have_no_id() {
        assert_eq!(roster().user_id("Nobody"), None);
        assert_eq!(roster().user_id("   "), None);
    }

    #[test]
    fn names_are_listed_alphabetically() {
        assert_eq!(roster().sorted_names(), vec!["Ahn", "Park"]);
    }
}
