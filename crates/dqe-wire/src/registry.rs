//! Wire-shape registry.
//!
//! The source's generic codec required every concrete `Value` shape (Row,
//! TableSchema, Dataset, Predicate list) to be registered before the
//! first RPC; in this port that registration is `serde`'s static derive,
//! so nothing here performs encoding. The registry still enumerates the
//! shapes (teacher's `ConnectorRegistry` listing-of-entries pattern, see
//! `kalla-connectors::factory`) so that parity with the external contract
//! in §6 is visible and checkable at startup rather than left implicit.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireShape {
    pub name: &'static str,
}

pub struct WireRegistry {
    shapes: Vec<WireShape>,
}

impl WireRegistry {
    pub fn is_registered(&self, name: &str) -> bool {
        self.shapes.iter().any(|s| s.name == name)
    }

    pub fn shapes(&self) -> &[WireShape] {
        &self.shapes
    }
}

/// The shapes every RPC surface in §6 depends on.
pub fn default_registry() -> WireRegistry {
    WireRegistry {
        shapes: vec![
            WireShape { name: "Row" },
            WireShape { name: "TableSchema" },
            WireShape { name: "Dataset" },
            WireShape { name: "Predicate" },
        ],
    }
}
