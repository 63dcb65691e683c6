//! Deserializable configuration models for `cardinality.yaml` and
//! `guarantees.yaml`. Both are plain `serde`/`serde_yaml` structs rather
//! than a hand-rolled parser.

use serde::Deserialize;

/// One `cardinality.yaml` entry point: a name pattern (exact or glob) that
/// the cardinality enricher matches a loop's originating
/// CALL against, ahead of the built-in naming heuristics.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EntryPoint {
    pub pattern: String,
    pub returns: String,
    #[serde(default)]
    pub interval: Option<(u64, u64)>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardinalityConfig {
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
}

impl CardinalityConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// First entry point whose pattern matches `name`, exact match taking
    /// priority over glob. Glob support is limited to a single trailing `*`,
    /// which is all `entryPoints` patterns in practice use.
    pub fn match_name(&self, name: &str) -> Option<&EntryPoint> {
        self.entry_points
            .iter()
            .find(|e| e.pattern == name)
            .or_else(|| {
                self.entry_points.iter().find(|e| match e.pattern.strip_suffix('*') {
                    Some(prefix) => name.starts_with(prefix),
                    None => false,
                })
            })
    }
}

/// One `guarantees.yaml` entry: a named Datalog rule (inline or by
/// reference to a standard library rule) that governs a glob of files at a
/// given severity.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Guarantee {
    pub id: String,
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    pub governs: Vec<String>,
    pub severity: String,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct GuaranteesConfig {
    #[serde(default)]
    pub guarantees: Vec<Guarantee>,
}

impl GuaranteesConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cardinality_yaml_entry_points() {
        let yaml = r#"
entryPoints:
  - pattern: "query*"
    returns: nodes
  - pattern: "getUserById"
    returns: constant
    interval: [1, 1]
"#;
        let cfg = CardinalityConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.entry_points.len(), 2);
        assert_eq!(cfg.entry_points[1].interval, Some((1, 1)));
    }

    #[test]
    fn exact_match_wins_over_glob() {
        let mut cfg = CardinalityConfig::default();
        cfg.entry_points.push(EntryPoint {
            pattern: "query*".into(),
            returns: "nodes".into(),
            interval: None,
        });
        cfg.entry_points.push(EntryPoint {
            pattern: "queryExact".into(),
            returns: "constant".into(),
            interval: None,
        });
        let m = cfg.match_name("queryExact").unwrap();
        assert_eq!(m.returns, "constant");
    }

    #[test]
    fn glob_pattern_matches_prefix() {
        let mut cfg = CardinalityConfig::default();
        cfg.entry_points.push(EntryPoint {
            pattern: "fetch*".into(),
            returns: "nodes".into(),
            interval: None,
        });
        assert!(cfg.match_name("fetchAllUsers").is_some());
        assert!(cfg.match_name("other").is_none());
    }

    #[test]
    fn parses_guarantees_yaml() {
        let yaml = r#"
guarantees:
  - id: no-quadratic-loops
    uses: "standard:n-squared-same-scale"
    governs: ["src/**/*.ts"]
    severity: error
"#;
        let cfg = GuaranteesConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.guarantees.len(), 1);
        assert_eq!(cfg.guarantees[0].uses.as_deref(), Some("standard:n-squared-same-scale"));
    }
}
