//! Resource components: collectable water, wood and ore deposits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Water,
    Wood,
    Ore,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Water => "water",
            ResourceKind::Wood => "wood",
            ResourceKind::Ore => "ore",
        }
    }
}

/// A deposit sitting in one cell. Inert once `quantity` hits zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub quantity: u32,
}

impl Resource {
    pub fn new(kind: ResourceKind, quantity: u32) -> Self {
        Self { kind, quantity }
    }

    pub fn is_depleted(&self) -> bool {
        self.quantity == 0
    }

    /// Take up to `amount` units; returns how many were actually taken
    pub fn take(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.quantity);
        self.quantity -= taken;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_caps_at_quantity() {
        let mut ore = Resource::new(ResourceKind::Ore, 1);
        assert_eq!(ore.take(2), 1);
        assert!(ore.is_depleted());
        assert_eq!(ore.take(1), 0);
        assert_eq!(ore.quantity, 0);
    }
}
