use std::collections::HashMap;

use tracing::debug;

use crate::error::{CamcorderError, Result};
use crate::grade::profile::{ColorProfile, FilmSimulation};

/// Registry of named color profiles
///
/// Starts out with every [`FilmSimulation`]; custom profiles can be added
/// on top and are looked up exactly like the built-ins.
pub struct ProfileRegistry {
    profiles: HashMap<String, ColorProfile>,
}

impl ProfileRegistry {
    /// Create a new registry with all built-in simulations
    pub fn new() -> Self {
        let mut registry = Self {
            profiles: HashMap::new(),
        };
        for sim in FilmSimulation::ALL {
            registry.profiles.insert(sim.name().to_string(), sim.profile());
        }
        registry
    }

    /// Register a custom profile, replacing any profile of the same name
    pub fn register(&mut self, profile: ColorProfile) -> Result<()> {
        profile.validate()?;
        debug!("Registering color profile '{}'", profile.name);
        self.profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<ColorProfile> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| CamcorderError::InvalidProfile {
                name: name.to_string(),
                available: self.available_profiles(),
            })
    }

    /// All registered names, sorted
    pub fn available_profiles(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
