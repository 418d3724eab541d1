//! Built-in version/scope/optionality selection strategies.
//!
//! Modeled as plain functions over a tagged enum rather than trait objects:
//! the session only ever needs one of a small, closed set of strategies, so
//! there is no pluggable escape hatch here beyond the documented variants.

use aether_core::dependency::DependencyScope;
use aether_core::session::VersionSelectorKind;
use aether_core::version::{MavenVersion, VersionRange};

/// One route reaching a node in a conflict group.
#[derive(Debug, Clone)]
pub struct ConflictItem {
    pub path_idx: usize,
    pub version: String,
    /// The raw version-constraint text this route declared, if any (a range).
    pub constraint: Option<String>,
    pub depth: usize,
    pub scope: DependencyScope,
    pub optional: bool,
}

/// Pick the winning item's index within `items`, honoring every range seen in
/// the group. Returns `None` if no candidate satisfies every range.
pub fn select_version(items: &[ConflictItem], kind: VersionSelectorKind) -> Option<usize> {
    let ranges: Vec<VersionRange> = items
        .iter()
        .filter_map(|i| i.constraint.as_deref().and_then(VersionRange::parse))
        .collect();

    let mut ordered: Vec<usize> = (0..items.len()).collect();
    match kind {
        VersionSelectorKind::Nearest => ordered.sort_by(|&a, &b| {
            items[a]
                .depth
                .cmp(&items[b].depth)
                .then_with(|| MavenVersion::parse(&items[b].version).cmp(&MavenVersion::parse(&items[a].version)))
        }),
        VersionSelectorKind::HigherVersion => ordered.sort_by(|&a, &b| {
            MavenVersion::parse(&items[b].version).cmp(&MavenVersion::parse(&items[a].version))
        }),
    }

    ordered
        .into_iter()
        .find(|&idx| VersionRange::satisfies_all(&MavenVersion::parse(&items[idx].version), &ranges))
}

/// `deriveScope`: among `{compile, runtime, provided, test}` pick the widest
/// present; a direct dependency (depth <= 1) overrides with its own scope.
pub fn derive_scope(parent_scope: DependencyScope, declared_scope: DependencyScope, depth: usize) -> DependencyScope {
    if depth <= 1 {
        return declared_scope;
    }
    parent_scope.widest(declared_scope)
}

/// The effective scope for a winner across every route that reaches it:
/// a direct route overrides, otherwise the widest derived scope wins.
pub fn select_scope(items: &[ConflictItem]) -> DependencyScope {
    if let Some(direct) = items.iter().find(|i| i.depth <= 1) {
        return direct.scope;
    }
    items
        .iter()
        .skip(1)
        .fold(items[0].scope, |acc, item| acc.widest(item.scope))
}

/// Effective optionality: the artifact is only truly optional if every route
/// that reaches it is optional; a single non-optional route makes it required.
pub fn select_optionality(items: &[ConflictItem]) -> bool {
    items.iter().all(|i| i.optional)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(version: &str, depth: usize) -> ConflictItem {
        ConflictItem {
            path_idx: 0,
            version: version.to_string(),
            constraint: None,
            depth,
            scope: DependencyScope::Compile,
            optional: false,
        }
    }

    #[test]
    fn nearest_prefers_smaller_depth() {
        let items = vec![item("1.0", 2), item("2.0", 1)];
        assert_eq!(select_version(&items, VersionSelectorKind::Nearest), Some(1));
    }

    #[test]
    fn nearest_breaks_ties_with_higher_version() {
        let items = vec![item("1.0", 1), item("2.0", 1)];
        assert_eq!(select_version(&items, VersionSelectorKind::Nearest), Some(1));
    }

    #[test]
    fn higher_version_ignores_depth() {
        let items = vec![item("2.0", 3), item("1.0", 1)];
        assert_eq!(select_version(&items, VersionSelectorKind::HigherVersion), Some(0));
    }

    #[test]
    fn range_constraint_excludes_incompatible_winner() {
        let mut items = vec![item("1.0", 1), item("2.5", 2)];
        items[0].constraint = Some("[2.0,3.0)".to_string());
        // nearest would pick depth=1 (1.0), but it violates the range from the other item.
        assert_eq!(select_version(&items, VersionSelectorKind::Nearest), Some(1));
    }

    #[test]
    fn no_candidate_satisfies_every_range_returns_none() {
        let mut items = vec![item("1.0", 1), item("5.0", 2)];
        items[0].constraint = Some("[4.0,6.0)".to_string());
        items[1].constraint = Some("[0.0,2.0)".to_string());
        assert_eq!(select_version(&items, VersionSelectorKind::Nearest), None);
    }

    #[test]
    fn direct_dependency_overrides_scope() {
        let items = vec![
            ConflictItem { depth: 1, scope: DependencyScope::Test, ..item("1.0", 1) },
            ConflictItem { depth: 2, scope: DependencyScope::Compile, ..item("1.0", 2) },
        ];
        assert_eq!(select_scope(&items), DependencyScope::Test);
    }

    #[test]
    fn widest_scope_wins_without_a_direct_route() {
        let items = vec![
            ConflictItem { depth: 2, scope: DependencyScope::Test, ..item("1.0", 2) },
            ConflictItem { depth: 3, scope: DependencyScope::Compile, ..item("1.0", 3) },
        ];
        assert_eq!(select_scope(&items), DependencyScope::Compile);
    }

    #[test]
    fn optionality_requires_every_route_optional() {
        let items = vec![
            ConflictItem { optional: true, ..item("1.0", 2) },
            ConflictItem { optional: false, ..item("1.0", 3) },
        ];
        assert!(!select_optionality(&items));
    }
}
