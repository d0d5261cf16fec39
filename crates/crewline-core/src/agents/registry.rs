//! Specialist registry
//!
//! Name-keyed lookup that keeps registration order, so capability-score
//! ties resolve to the first registered specialist.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::roster::RosterKind;
use super::specialist::{LlmSpecialist, Specialist};
use crate::llm::LlmClient;
use crate::tool::ToolManager;

#[derive(Default)]
pub struct SpecialistRegistry {
    specialists: Vec<Arc<dyn Specialist>>,
    /// Name to position in `specialists`
    index: HashMap<String, usize>,
}

impl SpecialistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every specialist of a roster as an [`LlmSpecialist`]
    pub fn from_roster(
        roster: RosterKind,
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolManager>,
    ) -> Self {
        let mut registry = Self::new();
        for profile in roster.profiles() {
            registry.register(Arc::new(LlmSpecialist::new(
                profile,
                llm.clone(),
                tools.clone(),
            )));
        }
        registry
    }

    /// Register a specialist.
    ///
    /// Re-registering a name replaces the specialist in place.
    pub fn register(&mut self, specialist: Arc<dyn Specialist>) {
        let name = specialist.name().to_string();
        info!("Registering specialist: {} ({})", name, specialist.role());

        match self.index.get(&name) {
            Some(&pos) => self.specialists[pos] = specialist,
            None => {
                self.index.insert(name, self.specialists.len());
                self.specialists.push(specialist);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Specialist>> {
        self.index.get(name).map(|&pos| self.specialists[pos].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.specialists.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Specialist>> {
        self.specialists.iter()
    }

    pub fn len(&self) -> usize {
        self.specialists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specialists.is_empty()
    }
}
