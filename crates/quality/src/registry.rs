//! Domain quality-dimension registry.

use std::collections::HashMap;

use crate::profile::DomainProfile;

/// Registry of dimension profiles by domain.
#[derive(Debug, Clone)]
pub struct DimensionRegistry {
    profiles: HashMap<String, DomainProfile>,
}

impl DimensionRegistry {
    /// Registry preloaded with the `code`, `debug` and `refactor` profiles.
    pub fn builtin() -> Self {
        let profiles = [DomainProfile::code(), DomainProfile::debug(), DomainProfile::refactor()]
            .into_iter()
            .map(|profile| (profile.domain.clone(), profile))
            .collect();
        Self { profiles }
    }

    /// Get a profile by domain.
    pub fn get(&self, domain: &str) -> Option<&DomainProfile> {
        self.profiles.get(domain)
    }

    /// Registered domains, sorted.
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<_> = self.profiles.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }
}

impl Default for DimensionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_domains() {
        let registry = DimensionRegistry::builtin();
        assert_eq!(registry.domains(), vec!["code", "debug", "refactor"]);
        assert_eq!(registry.get("code").unwrap().dimensions[0].name, "correctness");
        assert!(registry.get("docs").is_none());
    }
}
