//! Case catalog: which checks exist for a resource and how they are named.

use std::fmt;
use std::sync::Arc;

use pulse_kernel::{Resource, ResourceRegistry};

use crate::utils::case_name;

/// Checks that need no record of their own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// POST the sample with one required field emptied
    CreateBlankField(&'static str),
    /// POST the sample with one required field left out
    CreateMissingField(&'static str),
    /// POST the sample with every field emptied
    CreateAllBlank,
    /// POST an empty form
    CreateEmpty,
    /// POST the sample to a misspelled collection
    CreateWrongUrl,
    /// GET an id assumed absent
    ReadUnknownId,
}

/// Checks that run against a record the case creates itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureCase {
    /// The fixture creation itself is the check
    Create,
    Read,
    /// GET twice; bodies must be identical
    ReadRepeat,
    ReadWrongUrl,
    Update,
    UpdateWrongUrl,
    UpdateUnknownId,
    UpdateUnknownField,
    UpdateEmpty,
    /// DELETE, then the listing must not hold the record
    Delete,
}

impl FixtureCase {
    /// Whether the case removes the fixture on the happy path
    pub fn consumes_fixture(self) -> bool {
        matches!(self, Self::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Probe(Probe),
    Fixture(FixtureCase),
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe(Probe::CreateBlankField(field)) => write!(f, "create-blank-{field}"),
            Self::Probe(Probe::CreateMissingField(field)) => write!(f, "create-missing-{field}"),
            Self::Probe(Probe::CreateAllBlank) => f.write_str("create-all-blank"),
            Self::Probe(Probe::CreateEmpty) => f.write_str("create-empty"),
            Self::Probe(Probe::CreateWrongUrl) => f.write_str("create-wrong-url"),
            Self::Probe(Probe::ReadUnknownId) => f.write_str("read-unknown-id"),
            Self::Fixture(FixtureCase::Create) => f.write_str("create"),
            Self::Fixture(FixtureCase::Read) => f.write_str("read"),
            Self::Fixture(FixtureCase::ReadRepeat) => f.write_str("read-repeat"),
            Self::Fixture(FixtureCase::ReadWrongUrl) => f.write_str("read-wrong-url"),
            Self::Fixture(FixtureCase::Update) => f.write_str("update"),
            Self::Fixture(FixtureCase::UpdateWrongUrl) => f.write_str("update-wrong-url"),
            Self::Fixture(FixtureCase::UpdateUnknownId) => f.write_str("update-unknown-id"),
            Self::Fixture(FixtureCase::UpdateUnknownField) => f.write_str("update-unknown-field"),
            Self::Fixture(FixtureCase::UpdateEmpty) => f.write_str("update-empty"),
            Self::Fixture(FixtureCase::Delete) => f.write_str("delete"),
        }
    }
}

/// One runnable check against one resource
#[derive(Clone)]
pub struct Case {
    pub resource: Arc<dyn Resource>,
    pub kind: CaseKind,
}

impl Case {
    /// `<resource>/<case>`
    pub fn name(&self) -> String {
        case_name(self.resource.name(), &self.kind.to_string())
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("resource", &self.resource.name())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Every case for one resource, in create/read/update/delete order
pub fn catalog(resource: &Arc<dyn Resource>) -> Vec<Case> {
    let mut kinds = vec![CaseKind::Fixture(FixtureCase::Create)];
    kinds.extend(
        resource
            .required_fields()
            .iter()
            .map(|field| CaseKind::Probe(Probe::CreateBlankField(*field))),
    );
    kinds.extend(
        resource
            .required_fields()
            .iter()
            .map(|field| CaseKind::Probe(Probe::CreateMissingField(*field))),
    );
    kinds.extend([
        CaseKind::Probe(Probe::CreateAllBlank),
        CaseKind::Probe(Probe::CreateEmpty),
        CaseKind::Probe(Probe::CreateWrongUrl),
        CaseKind::Fixture(FixtureCase::Read),
        CaseKind::Fixture(FixtureCase::ReadRepeat),
        CaseKind::Probe(Probe::ReadUnknownId),
        CaseKind::Fixture(FixtureCase::ReadWrongUrl),
        CaseKind::Fixture(FixtureCase::Update),
        CaseKind::Fixture(FixtureCase::UpdateWrongUrl),
        CaseKind::Fixture(FixtureCase::UpdateUnknownId),
        CaseKind::Fixture(FixtureCase::UpdateUnknownField),
        CaseKind::Fixture(FixtureCase::UpdateEmpty),
        CaseKind::Fixture(FixtureCase::Delete),
    ]);

    kinds
        .into_iter()
        .map(|kind| Case {
            resource: Arc::clone(resource),
            kind,
        })
        .collect()
}

/// Restricts a run to a resource and/or case names containing a substring
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub resource: Option<String>,
    pub name_contains: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        let resource_ok = self
            .resource
            .as_deref()
            .map_or(true, |name| name == case.resource.name());
        let name_ok = self
            .name_contains
            .as_deref()
            .map_or(true, |needle| case.name().contains(needle));
        resource_ok && name_ok
    }
}

/// Cases across the registry that pass `filter`, in registry order
pub fn select(registry: &ResourceRegistry, filter: &CaseFilter) -> Vec<Case> {
    registry
        .resources()
        .iter()
        .flat_map(catalog)
        .filter(|case| filter.matches(case))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules;

    #[test]
    fn book_catalog_names() {
        let registry = modules::default_registry();
        let books = registry.get("books").unwrap();
        let names: Vec<String> = catalog(books).iter().map(Case::name).collect();

        assert_eq!(
            names,
            vec![
                "books/create",
                "books/create-blank-title",
                "books/create-blank-author",
                "books/create-missing-title",
                "books/create-missing-author",
                "books/create-all-blank",
                "books/create-empty",
                "books/create-wrong-url",
                "books/read",
                "books/read-repeat",
                "books/read-unknown-id",
                "books/read-wrong-url",
                "books/update",
                "books/update-wrong-url",
                "books/update-unknown-id",
                "books/update-unknown-field",
                "books/update-empty",
                "books/delete",
            ]
        );
    }

    #[test]
    fn select_filters_by_resource_and_substring() {
        let registry = modules::default_registry();
        assert_eq!(select(&registry, &CaseFilter::default()).len(), 36);

        let filter = CaseFilter {
            resource: Some("roles".to_string()),
            name_contains: Some("update".to_string()),
        };
        let names: Vec<String> = select(&registry, &filter).iter().map(Case::name).collect();
        assert_eq!(names.len(), 5);
        assert!(names.iter().all(|name| name.starts_with("roles/update")));
    }

    #[test]
    fn unknown_resource_selects_nothing() {
        let registry = modules::default_registry();
        let filter = CaseFilter {
            resource: Some("authors".to_string()),
            name_contains: None,
        };
        assert!(select(&registry, &filter).is_empty());
    }

    #[test]
    fn only_delete_consumes_its_fixture() {
        assert!(FixtureCase::Delete.consumes_fixture());
        assert!(!FixtureCase::UpdateEmpty.consumes_fixture());
    }
}
