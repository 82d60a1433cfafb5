use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix of seed-derived addresses.
const SEED_PREFIX: &str = "agent1";
/// Hex characters of the seed digest kept in the address.
const SEED_DIGEST_LEN: usize = 40;

/// Where an agent can be reached on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a raw address string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derive a stable address from a secret seed phrase.
    ///
    /// The same seed always yields the same address, so an agent keeps its
    /// address across restarts.
    pub fn from_seed(seed: &str) -> Self {
        let digest = hex::encode(Sha256::digest(seed.as_bytes()));
        Self(format!("{SEED_PREFIX}{}", &digest[..SEED_DIGEST_LEN]))
    }

    /// Address for a participant that is not a registered agent (e.g. the REST API).
    pub fn named(name: &str) -> Self {
        Self(format!("agent://{name}"))
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_address_is_deterministic() {
        let a = Address::from_seed("scheduling_agent_secret_seed_phrase");
        let b = Address::from_seed("scheduling_agent_secret_seed_phrase");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("agent1"));
        assert_eq!(a.as_str().len(), SEED_PREFIX.len() + SEED_DIGEST_LEN);
    }

    #[test]
    fn test_different_seeds_differ() {
        assert_ne!(Address::from_seed("one"), Address::from_seed("two"));
    }

    #[test]
    fn test_named_address() {
        assert_eq!(Address::named("rest_api").to_string(), "agent://rest_api");
    }
}
