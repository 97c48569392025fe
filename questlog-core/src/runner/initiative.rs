//! Initiative order and turn pointer for combat.

use serde::Serialize;
use std::collections::BTreeSet;

use super::Rejected;

/// One combatant in the initiative order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitiativeEntry {
    pub id: String,
    pub name: String,
    /// Higher acts first; ties are allowed
    pub initiative: i32,
    pub is_player_character: bool,
    pub hp: Option<i32>,
    pub max_hp: Option<i32>,
    pub conditions: BTreeSet<String>,
}

/// Combatants sorted by descending initiative, plus whose turn it is
#[derive(Debug, Clone, Default)]
pub struct Initiative {
    entries: Vec<InitiativeEntry>,
    current: usize,
}

impl Initiative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[InitiativeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the combatant whose turn it is
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&InitiativeEntry> {
        self.entries.get(self.current)
    }

    pub fn get(&self, id: &str) -> Option<&InitiativeEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Add a combatant and re-sort.
    ///
    /// Equal scores keep insertion order. The turn pointer keeps its index.
    pub fn add(
        &mut self,
        name: &str,
        initiative: i32,
        is_player_character: bool,
    ) -> Result<&InitiativeEntry, Rejected> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejected::EmptyName);
        }

        // Behind every entry with an equal or higher score.
        let position = self
            .entries
            .iter()
            .take_while(|e| e.initiative >= initiative)
            .count();
        self.entries.insert(
            position,
            InitiativeEntry {
                id: crate::types::new_id(),
                name: name.to_string(),
                initiative,
                is_player_character,
                hp: None,
                max_hp: None,
                conditions: BTreeSet::new(),
            },
        );

        Ok(&self.entries[position])
    }

    /// Add a combatant from unvalidated text input
    pub fn add_from_input(
        &mut self,
        name: &str,
        initiative: &str,
        is_player_character: bool,
    ) -> Result<&InitiativeEntry, Rejected> {
        if name.trim().is_empty() {
            return Err(Rejected::EmptyName);
        }
        let score = initiative
            .trim()
            .parse::<i32>()
            .map_err(|_| Rejected::InvalidScore(initiative.to_string()))?;
        self.add(name, score, is_player_character)
    }

    /// Remove a combatant.
    ///
    /// Survivors keep their order. If the pointer falls off the end of the
    /// shorter list it resets to 0, which loses whose turn it was.
    pub fn remove(&mut self, id: &str) -> Result<InitiativeEntry, Rejected> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Rejected::UnknownCombatant(id.to_string()))?;

        let removed = self.entries.remove(index);
        if self.current >= self.entries.len() {
            self.current = 0;
        }
        Ok(removed)
    }

    /// Move the pointer to the next combatant, wrapping around.
    ///
    /// Returns `None` without changing anything when the list is empty.
    pub fn advance(&mut self) -> Option<&InitiativeEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.entries.len();
        self.entries.get(self.current)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = 0;
    }

    pub fn set_hp(&mut self, id: &str, hp: i32, max_hp: Option<i32>) -> Result<(), Rejected> {
        let entry = self.entry_mut(id)?;
        entry.hp = Some(hp);
        if max_hp.is_some() {
            entry.max_hp = max_hp;
        }
        Ok(())
    }

    /// Returns false if the condition was already present
    pub fn add_condition(&mut self, id: &str, condition: &str) -> Result<bool, Rejected> {
        let entry = self.entry_mut(id)?;
        Ok(entry.conditions.insert(condition.trim().to_lowercase()))
    }

    /// Returns false if the condition was not present
    pub fn remove_condition(&mut self, id: &str, condition: &str) -> Result<bool, Rejected> {
        let entry = self.entry_mut(id)?;
        Ok(entry.conditions.remove(&condition.trim().to_lowercase()))
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut InitiativeEntry, Rejected> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Rejected::UnknownCombatant(id.to_string()))
    }
}
