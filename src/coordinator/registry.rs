//! Storage node registry
//!
//! Membership is a set, but snapshots come out in registration order so
//! placement over them is reproducible.

use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct NodeRegistry {
    /// Addresses in the order they first registered
    order: Vec<String>,
    members: HashSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns `false` when the address was already known.
    pub fn register(&mut self, address: &str) -> bool {
        if !self.members.insert(address.to_string()) {
            return false;
        }
        self.order.push(address.to_string());
        true
    }

    pub fn contains(&self, address: &str) -> bool {
        self.members.contains(address)
    }

    /// Registered addresses in registration order
    pub fn snapshot(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = NodeRegistry::new();
        assert!(registry.register("10.0.0.1:7000"));
        assert!(!registry.register("10.0.0.1:7000"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot(), vec!["10.0.0.1:7000".to_string()]);
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let mut registry = NodeRegistry::new();
        for addr in ["c:1", "a:1", "b:1", "a:1"] {
            registry.register(addr);
        }

        assert_eq!(registry.snapshot(), vec!["c:1", "a:1", "b:1"]);
        assert_eq!(registry.snapshot(), registry.snapshot());
        assert!(registry.contains("b:1"));
        assert!(!registry.contains("d:1"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = NodeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }
}
