use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::coordinate::Artifact;

/// A dependency: an artifact plus scope/optional/exclusions.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub artifact: Artifact,
    pub scope: DependencyScope,
    pub optional: bool,
    pub exclusions: BTreeSet<Exclusion>,
}

impl Dependency {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            scope: DependencyScope::default(),
            optional: false,
            exclusions: BTreeSet::new(),
        }
    }

    pub fn with_scope(mut self, scope: DependencyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn excludes(&self, group_id: &str, artifact_id: &str) -> bool {
        self.exclusions.iter().any(|e| {
            (e.group_id == "*" || e.group_id == group_id)
                && (e.artifact_id == "*" || e.artifact_id == artifact_id)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

/// Dependency scope, lowest-to-highest visibility per the scope-derivation
/// widening order `compile > runtime > provided > test`, plus `system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    Compile,
    Runtime,
    Provided,
    Test,
    System,
}

impl Default for DependencyScope {
    fn default() -> Self {
        Self::Compile
    }
}

impl DependencyScope {
    /// Widening rank used by `deriveScope`: higher is wider. `System` is
    /// intentionally excluded from the ranking — it is sticky, not widened.
    fn widening_rank(self) -> u8 {
        match self {
            Self::Compile => 3,
            Self::Runtime => 2,
            Self::Provided => 1,
            Self::Test => 0,
            Self::System => 0,
        }
    }

    /// The wider of two scopes among `{compile, runtime, provided, test}`.
    /// `system` always wins regardless of the other operand.
    pub fn widest(self, other: Self) -> Self {
        if self == Self::System || other == Self::System {
            return Self::System;
        }
        if self.widening_rank() >= other.widening_rank() {
            self
        } else {
            other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::Test => "test",
            Self::System => "system",
        }
    }
}
