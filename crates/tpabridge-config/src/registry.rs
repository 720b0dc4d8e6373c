use std::collections::HashMap;

use tpabridge_core::ProviderId;

use crate::profile::ProviderProfile;
use crate::{ConfigError, Result};

/// Static, process-wide catalog of every supported provider.
///
/// Pure and read-only after construction; every other gateway component
/// consults it to decide which request builder, normalizer and credential
/// strategy applies. An id that does not resolve here is a configuration
/// error surfaced immediately to the caller, never retried.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    profiles: HashMap<ProviderId, ProviderProfile>,
}

impl ProviderRegistry {
    /// Build a registry, rejecting duplicate ids and invalid profiles.
    pub fn new(profiles: Vec<ProviderProfile>) -> Result<Self> {
        let mut map = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            profile.validate().map_err(ConfigError::validation)?;
            let id = profile.id;
            if map.insert(id, profile).is_some() {
                return Err(ConfigError::DuplicateProvider(id));
            }
        }
        Ok(Self { profiles: map })
    }

    /// The built-in roster with placeholder endpoints.
    pub fn builtin() -> Self {
        Self::new(crate::defaults::default_profiles())
            .expect("built-in provider roster is valid")
    }

    pub fn lookup(&self, id: ProviderId) -> Option<&ProviderProfile> {
        self.profiles.get(&id)
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.profiles.contains_key(&id)
    }

    /// Profiles in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &ProviderProfile> {
        let mut profiles: Vec<&ProviderProfile> = self.profiles.values().collect();
        profiles.sort_by_key(|p| p.id);
        profiles.into_iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_hit_and_miss() {
        let registry = ProviderRegistry::new(vec![
            ProviderProfile::new(1u16, "Medserve Health TPA"),
            ProviderProfile::new(2u16, "CarePlus Assist"),
        ])
        .unwrap();

        assert_eq!(
            registry.lookup(ProviderId(1)).map(|p| p.name.as_str()),
            Some("Medserve Health TPA")
        );
        assert!(registry.lookup(ProviderId(99)).is_none());
        assert!(registry.contains(ProviderId(2)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = ProviderRegistry::new(vec![
            ProviderProfile::new(3u16, "Sentinel TPA"),
            ProviderProfile::new(3u16, "Sentinel TPA (again)"),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateProvider(_))));
    }

    #[test]
    fn test_iter_is_id_ordered() {
        let registry = ProviderRegistry::new(vec![
            ProviderProfile::new(9u16, "Pinnacle Care TPA"),
            ProviderProfile::new(1u16, "Medserve Health TPA"),
            ProviderProfile::new(5u16, "Horizon General Insurance"),
        ])
        .unwrap();
        let ids: Vec<u16> = registry.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 5, 9]);
    }

    #[test]
    fn test_builtin_roster_loads() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.len(), 13);
        assert!(registry.contains(ProviderId(1)));
        assert!(registry.contains(ProviderId(13)));
    }
}
