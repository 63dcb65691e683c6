//! Edge records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::NodeId;

/// Closed set of edge types. Edge types must be members of
/// `KNOWN_EDGE_TYPES`; unknown edge types fail at insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Contains,
    Calls,
    CallsOn,
    HandledBy,
    ImportsFrom,
    Extends,
    Implements,
    HasProperty,
    HasElement,
    AssignedFrom,
    DerivesFrom,
    IteratesOver,
    Captures,
    Shadows,
    WritesTo,
    Modifies,
    PassesArgument,
    SpreadsFrom,
    AccessesPrivate,
    DecoratedBy,
    Uses,
}

impl EdgeKind {
    pub const ALL: &'static [EdgeKind] = &[
        EdgeKind::Contains,
        EdgeKind::Calls,
        EdgeKind::CallsOn,
        EdgeKind::HandledBy,
        EdgeKind::ImportsFrom,
        EdgeKind::Extends,
        EdgeKind::Implements,
        EdgeKind::HasProperty,
        EdgeKind::HasElement,
        EdgeKind::AssignedFrom,
        EdgeKind::DerivesFrom,
        EdgeKind::IteratesOver,
        EdgeKind::Captures,
        EdgeKind::Shadows,
        EdgeKind::WritesTo,
        EdgeKind::Modifies,
        EdgeKind::PassesArgument,
        EdgeKind::SpreadsFrom,
        EdgeKind::AccessesPrivate,
        EdgeKind::DecoratedBy,
        EdgeKind::Uses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::Calls => "CALLS",
            EdgeKind::CallsOn => "CALLS_ON",
            EdgeKind::HandledBy => "HANDLED_BY",
            EdgeKind::ImportsFrom => "IMPORTS_FROM",
            EdgeKind::Extends => "EXTENDS",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::HasProperty => "HAS_PROPERTY",
            EdgeKind::HasElement => "HAS_ELEMENT",
            EdgeKind::AssignedFrom => "ASSIGNED_FROM",
            EdgeKind::DerivesFrom => "DERIVES_FROM",
            EdgeKind::IteratesOver => "ITERATES_OVER",
            EdgeKind::Captures => "CAPTURES",
            EdgeKind::Shadows => "SHADOWS",
            EdgeKind::WritesTo => "WRITES_TO",
            EdgeKind::Modifies => "MODIFIES",
            EdgeKind::PassesArgument => "PASSES_ARGUMENT",
            EdgeKind::SpreadsFrom => "SPREADS_FROM",
            EdgeKind::AccessesPrivate => "ACCESSES_PRIVATE",
            EdgeKind::DecoratedBy => "DECORATED_BY",
            EdgeKind::Uses => "USES",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub src: NodeId,
    pub dst: NodeId,
    pub metadata: Map<String, Value>,
}

impl Edge {
    pub fn new(kind: EdgeKind, src: impl Into<NodeId>, dst: impl Into<NodeId>) -> Self {
        Self {
            kind,
            src: src.into(),
            dst: dst.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Non-destructive merge into this edge's metadata (mirrors
    /// [`super::node::Node::upsert_metadata`]; used by the cardinality
    /// enricher to add `cardinality` while preserving existing fields like
    /// `iterates`).
    pub fn upsert_metadata(&mut self, updates: Map<String, Value>) {
        for (k, v) in updates {
            self.metadata.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_edge_types_round_trip_through_as_str() {
        for kind in EdgeKind::ALL {
            let s = kind.as_str();
            assert_eq!(EdgeKind::from_str(s), Some(*kind));
        }
    }

    #[test]
    fn unknown_edge_type_string_is_none() {
        assert_eq!(EdgeKind::from_str("NOT_A_REAL_EDGE"), None);
    }

    #[test]
    fn upsert_metadata_preserves_existing_fields() {
        let mut edge = Edge::new(EdgeKind::IteratesOver, "a", "b");
        edge.metadata.insert("iterates".into(), Value::from("values"));
        let mut updates = Map::new();
        updates.insert("cardinality".into(), serde_json::json!({"scale": "nodes"}));
        edge.upsert_metadata(updates);
        assert_eq!(edge.metadata.get("iterates"), Some(&Value::from("values")));
        assert!(edge.metadata.get("cardinality").is_some());
    }
}
