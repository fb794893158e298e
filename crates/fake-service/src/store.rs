//! In-memory record store with per-collection field schemas.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::anyhow;
use serde_json::{json, Map, Value};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Required non-empty string
    Text,
    /// Optional integer, empty or absent means null
    Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Field layout of one collection
#[derive(Debug, Clone, Copy)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

pub const BOOKS: CollectionSchema = CollectionSchema {
    name: "books",
    fields: &[
        FieldSpec {
            name: "title",
            kind: FieldKind::Text,
        },
        FieldSpec {
            name: "author",
            kind: FieldKind::Text,
        },
    ],
};

pub const ROLES: CollectionSchema = CollectionSchema {
    name: "roles",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::Text,
        },
        FieldSpec {
            name: "type",
            kind: FieldKind::Text,
        },
        FieldSpec {
            name: "level",
            kind: FieldKind::Integer,
        },
        FieldSpec {
            name: "book",
            kind: FieldKind::Integer,
        },
    ],
};

/// Stored in place of an absent text field under `default_absent_fields`
pub const ABSENT_PLACEHOLDER: &str = "Unknown";

/// Deliberate contract violations, used to prove the checker notices them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Empty required text fields are stored as empty strings.
    pub accept_blank_fields: bool,
    /// Absent required text fields are filled with [`ABSENT_PLACEHOLDER`].
    pub default_absent_fields: bool,
    /// Invalid creates answer 400 but the record is stored anyway.
    pub reject_but_persist: bool,
    /// Created records come back with their first text field upper-cased.
    pub create_mangles_field: bool,
    /// Every read of a record after the first carries a read counter.
    pub unstable_reads: bool,
    /// GET and PUT on an absent id answer 200 with a bare record.
    pub unknown_ids_found: bool,
    /// Unknown collections answer 400 instead of 404.
    pub unknown_collection_bad_request: bool,
    /// Deleted records keep showing up in listings.
    pub keep_deleted_in_listing: bool,
    /// Unknown form fields are stored on the record.
    pub echo_unknown_fields: bool,
    /// PUT answers 200 without applying the change.
    pub ignore_updates: bool,
    /// PUT with an empty form blanks every text field.
    pub empty_update_clears: bool,
}

#[derive(Debug)]
struct Entry {
    record: Map<String, Value>,
    deleted: bool,
    reads: u64,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    collections: BTreeMap<&'static str, BTreeMap<u64, Entry>>,
}

/// Shared store behind the fake service
#[derive(Debug)]
pub struct Store {
    schemas: Vec<CollectionSchema>,
    faults: Faults,
    inner: Mutex<Inner>,
}

impl Store {
    pub fn new(faults: Faults) -> Self {
        Self {
            schemas: vec![BOOKS, ROLES],
            faults,
            inner: Mutex::new(Inner {
                next_id: 1,
                collections: BTreeMap::new(),
            }),
        }
    }

    /// Resolve a collection path segment to its schema
    pub fn schema(&self, collection: &str) -> Result<CollectionSchema, ServiceError> {
        if let Some(schema) = self.schemas.iter().find(|schema| schema.name == collection) {
            return Ok(*schema);
        }
        if self.faults.unknown_collection_bad_request {
            return Err(ServiceError::BadRequest {
                fields: Map::new(),
                message: format!("unknown collection '{collection}'"),
            });
        }
        Err(ServiceError::not_found("Not found."))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, ServiceError> {
        self.inner
            .lock()
            .map_err(|_| ServiceError::Internal(anyhow!("store lock poisoned")))
    }

    pub fn list(&self, schema: CollectionSchema) -> Result<Vec<Value>, ServiceError> {
        let inner = self.lock()?;
        let records = inner
            .collections
            .get(schema.name)
            .map(|entries| {
                entries
                    .values()
                    .filter(|entry| !entry.deleted || self.faults.keep_deleted_in_listing)
                    .map(|entry| Value::Object(entry.record.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    pub fn create(
        &self,
        schema: CollectionSchema,
        form: &[(String, String)],
    ) -> Result<Value, ServiceError> {
        let mut record = Map::new();
        let mut rejection = None;
        for field in schema.fields {
            let raw = lookup(form, field.name);
            match self.parse(field, raw) {
                Ok(value) => {
                    record.insert(field.name.to_string(), value);
                }
                Err(err) => {
                    record.insert(
                        field.name.to_string(),
                        Value::String(raw.unwrap_or_default().to_string()),
                    );
                    if rejection.is_none() {
                        rejection = Some(err);
                    }
                }
            }
        }
        self.absorb_unknown(schema, form, &mut record);

        if let Some(err) = rejection {
            if self.faults.reject_but_persist {
                let id = self.insert(schema, record)?;
                tracing::debug!(collection = schema.name, id, "rejected record stored");
            }
            return Err(err);
        }

        if self.faults.create_mangles_field {
            if let Some(field) = schema.fields.iter().find(|f| f.kind == FieldKind::Text) {
                if let Some(Value::String(text)) = record.get_mut(field.name) {
                    *text = text.to_uppercase();
                }
            }
        }

        let id = self.insert(schema, record.clone())?;
        record.insert("id".to_string(), Value::from(id));
        tracing::debug!(collection = schema.name, id, "record created");
        Ok(Value::Object(record))
    }

    fn insert(
        &self,
        schema: CollectionSchema,
        mut record: Map<String, Value>,
    ) -> Result<u64, ServiceError> {
        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.next_id += 1;
        record.insert("id".to_string(), Value::from(id));
        inner.collections.entry(schema.name).or_default().insert(
            id,
            Entry {
                record,
                deleted: false,
                reads: 0,
            },
        );
        Ok(id)
    }

    pub fn read(&self, schema: CollectionSchema, id: u64) -> Result<Value, ServiceError> {
        let mut inner = self.lock()?;
        let entry = match live_mut(&mut inner, schema, id) {
            Ok(entry) => entry,
            Err(_) if self.faults.unknown_ids_found => return Ok(json!({ "id": id })),
            Err(err) => return Err(err),
        };
        entry.reads += 1;
        let mut record = entry.record.clone();
        if self.faults.unstable_reads && entry.reads > 1 {
            record.insert("reads".to_string(), Value::from(entry.reads));
        }
        Ok(Value::Object(record))
    }

    pub fn update(
        &self,
        schema: CollectionSchema,
        id: u64,
        form: &[(String, String)],
    ) -> Result<Value, ServiceError> {
        let mut changes = Map::new();
        for field in schema.fields {
            if let Some(raw) = lookup(form, field.name) {
                changes.insert(field.name.to_string(), self.parse(field, Some(raw))?);
            }
        }
        self.absorb_unknown(schema, form, &mut changes);
        if form.is_empty() && self.faults.empty_update_clears {
            for field in schema.fields.iter().filter(|f| f.kind == FieldKind::Text) {
                changes.insert(field.name.to_string(), Value::String(String::new()));
            }
        }

        let mut inner = self.lock()?;
        let entry = match live_mut(&mut inner, schema, id) {
            Ok(entry) => entry,
            Err(_) if self.faults.unknown_ids_found => return Ok(json!({ "id": id })),
            Err(err) => return Err(err),
        };
        if !self.faults.ignore_updates {
            entry.record.extend(changes);
        }
        Ok(Value::Object(entry.record.clone()))
    }

    pub fn delete(&self, schema: CollectionSchema, id: u64) -> Result<(), ServiceError> {
        let mut inner = self.lock()?;
        live_mut(&mut inner, schema, id)?.deleted = true;
        tracing::debug!(collection = schema.name, id, "record deleted");
        Ok(())
    }

    /// Records not yet deleted, across all collections
    pub fn live_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| {
                inner
                    .collections
                    .values()
                    .flat_map(BTreeMap::values)
                    .filter(|entry| !entry.deleted)
                    .count()
            })
            .unwrap_or(0)
    }

    fn parse(&self, field: &FieldSpec, raw: Option<&str>) -> Result<Value, ServiceError> {
        match (field.kind, raw) {
            (FieldKind::Text, Some(text)) if !text.is_empty() => {
                Ok(Value::String(text.to_string()))
            }
            (FieldKind::Text, Some(_)) if self.faults.accept_blank_fields => {
                Ok(Value::String(String::new()))
            }
            (FieldKind::Text, Some(_)) => {
                Err(ServiceError::field(field.name, "This field may not be blank."))
            }
            (FieldKind::Text, None) if self.faults.default_absent_fields => {
                Ok(Value::String(ABSENT_PLACEHOLDER.to_string()))
            }
            (FieldKind::Text, None) => {
                Err(ServiceError::field(field.name, "This field is required."))
            }
            (FieldKind::Integer, None | Some("")) => Ok(Value::Null),
            (FieldKind::Integer, Some(text)) => text
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| ServiceError::field(field.name, "A valid integer is required.")),
        }
    }

    fn absorb_unknown(
        &self,
        schema: CollectionSchema,
        form: &[(String, String)],
        record: &mut Map<String, Value>,
    ) {
        if !self.faults.echo_unknown_fields {
            return;
        }
        for (key, value) in form {
            let known = key == "id" || schema.fields.iter().any(|field| field.name == key);
            if !known {
                record.insert(key.clone(), Value::String(value.clone()));
            }
        }
    }
}

fn lookup<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
    form.iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn live_mut<'a>(
    inner: &'a mut Inner,
    schema: CollectionSchema,
    id: u64,
) -> Result<&'a mut Entry, ServiceError> {
    inner
        .collections
        .get_mut(schema.name)
        .and_then(|entries| entries.get_mut(&id))
        .filter(|entry| !entry.deleted)
        .ok_or_else(|| ServiceError::not_found("Not found."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn role_integers_are_parsed() {
        let store = Store::new(Faults::default());
        let created = store
            .create(
                ROLES,
                &form(&[
                    ("name", "Roland Deschain"),
                    ("type", "The Gunslinger"),
                    ("level", "80"),
                    ("book", "422"),
                ]),
            )
            .unwrap();
        assert_eq!(created["level"], 80);
        assert_eq!(created["book"], 422);
        assert_eq!(created["id"], 1);
    }

    #[test]
    fn blank_required_text_is_rejected() {
        let store = Store::new(Faults::default());
        let err = store
            .create(BOOKS, &form(&[("title", ""), ("author", "Orson Scott Card")]))
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest { .. }));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn accept_blank_fields_fault_persists_blank_records() {
        let store = Store::new(Faults {
            accept_blank_fields: true,
            ..Faults::default()
        });
        let created = store
            .create(BOOKS, &form(&[("title", ""), ("author", "")]))
            .unwrap();
        assert_eq!(created["title"], "");
        assert_eq!(store.live_count(), 1);

        let err = store.create(BOOKS, &[]).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest { .. }));
    }

    #[test]
    fn default_absent_fields_fault_fills_placeholders() {
        let store = Store::new(Faults {
            default_absent_fields: true,
            ..Faults::default()
        });
        let created = store.create(BOOKS, &form(&[("title", "Ender's Game")])).unwrap();
        assert_eq!(created["author"], ABSENT_PLACEHOLDER);
        assert!(store
            .create(BOOKS, &form(&[("title", "Ender's Game"), ("author", "")]))
            .is_err());
    }

    #[test]
    fn reject_but_persist_stores_rejected_records() {
        let store = Store::new(Faults {
            reject_but_persist: true,
            ..Faults::default()
        });
        let err = store
            .create(
                ROLES,
                &form(&[("name", ""), ("type", ""), ("level", ""), ("book", "")]),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest { .. }));

        let listed = store.list(ROLES).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], 1);
        assert_eq!(listed[0]["level"], Value::Null);
    }

    #[test]
    fn create_mangles_field_fault_changes_stored_record() {
        let store = Store::new(Faults {
            create_mangles_field: true,
            ..Faults::default()
        });
        let created = store
            .create(BOOKS, &form(&[("title", "Ender's Game"), ("author", "Orson Scott Card")]))
            .unwrap();
        assert_eq!(created["title"], "ENDER'S GAME");
        assert_eq!(created["author"], "Orson Scott Card");
        assert_eq!(store.read(BOOKS, 1).unwrap(), created);
    }

    #[test]
    fn unstable_reads_fault_changes_repeat_reads_only() {
        let store = Store::new(Faults {
            unstable_reads: true,
            ..Faults::default()
        });
        let created = store
            .create(BOOKS, &form(&[("title", "a"), ("author", "b")]))
            .unwrap();
        assert_eq!(store.read(BOOKS, 1).unwrap(), created);
        assert_eq!(store.read(BOOKS, 1).unwrap()["reads"], 2);
    }

    #[test]
    fn unknown_ids_found_fault_answers_absent_ids() {
        let store = Store::new(Faults {
            unknown_ids_found: true,
            ..Faults::default()
        });
        assert_eq!(store.read(BOOKS, 99999).unwrap(), json!({"id": 99999}));
        assert!(store.update(BOOKS, 99999, &form(&[("title", "x")])).is_ok());
        assert!(matches!(store.delete(BOOKS, 99999), Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn empty_update_clears_fault_blanks_text_fields() {
        let store = Store::new(Faults {
            empty_update_clears: true,
            ..Faults::default()
        });
        store
            .create(BOOKS, &form(&[("title", "a"), ("author", "b")]))
            .unwrap();
        let updated = store.update(BOOKS, 1, &[]).unwrap();
        assert_eq!(updated["title"], "");
        assert_eq!(updated["author"], "");

        let untouched = store.update(BOOKS, 1, &form(&[("year", "1986")])).unwrap();
        assert_eq!(untouched["title"], "");
    }

    #[test]
    fn update_merges_known_fields_only() {
        let store = Store::new(Faults::default());
        store
            .create(BOOKS, &form(&[("title", "Ender's Game"), ("author", "Orson Scott Card")]))
            .unwrap();
        let updated = store
            .update(BOOKS, 1, &form(&[("title", "Speaker for the Dead"), ("year", "1986")]))
            .unwrap();
        assert_eq!(updated["title"], "Speaker for the Dead");
        assert_eq!(updated["author"], "Orson Scott Card");
        assert!(updated.get("year").is_none());
    }

    #[test]
    fn deleted_records_vanish_unless_faulted() {
        let store = Store::new(Faults::default());
        store
            .create(BOOKS, &form(&[("title", "a"), ("author", "b")]))
            .unwrap();
        store.delete(BOOKS, 1).unwrap();
        assert!(store.list(BOOKS).unwrap().is_empty());
        assert!(matches!(store.read(BOOKS, 1), Err(ServiceError::NotFound { .. })));

        let faulty = Store::new(Faults {
            keep_deleted_in_listing: true,
            ..Faults::default()
        });
        faulty
            .create(BOOKS, &form(&[("title", "a"), ("author", "b")]))
            .unwrap();
        faulty.delete(BOOKS, 1).unwrap();
        assert_eq!(faulty.list(BOOKS).unwrap().len(), 1);
    }

    #[test]
    fn unknown_collection_is_not_found() {
        let store = Store::new(Faults::default());
        assert!(matches!(store.schema("boooks"), Err(ServiceError::NotFound { .. })));

        let faulty = Store::new(Faults {
            unknown_collection_bad_request: true,
            ..Faults::default()
        });
        assert!(matches!(faulty.schema("boooks"), Err(ServiceError::BadRequest { .. })));
        assert!(faulty.schema("books").is_ok());
    }
}
