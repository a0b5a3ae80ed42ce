//! Resource definitions.
//!
//! Bookmarks, folders and notes share one CRUD surface. Each is described by
//! a static [`ResourceDef`] that names its table, its fields and the messages
//! its router emits. The generic service and router read everything they need
//! from here, so the three resources cannot drift apart.

use serde_json::{Map, Value};

// ============================================================================
// Types
// ============================================================================

/// A row as it travels between router, service and store: column name to
/// JSON value. Rows returned by the store always carry an `id`.
pub type Record = Map<String, Value>;

/// Server-generated row identifier.
pub type ResourceId = i64;

/// How a field is stored in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `TEXT` column. Non-string values are stored by their JSON text.
    Text,
    /// `BIGINT` column.
    Integer,
}

/// A client-writable column of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }

    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
        }
    }
}

/// Static description of one resource.
#[derive(Debug)]
pub struct ResourceDef {
    /// Path segment under `/api`, e.g. `"bookmarks"`.
    pub name: &'static str,
    /// Backing table.
    pub table: &'static str,
    /// Every client-writable column, in serialization order. `id` is implied.
    pub fields: &'static [Field],
    /// Fields checked on create, in this order.
    pub required: &'static [&'static str],
    /// Fields accepted by a partial update.
    pub patchable: &'static [&'static str],
    /// 404 message of the existence check.
    pub not_found_message: &'static str,
    /// 400 message for a partial update without any usable field.
    pub empty_patch_message: &'static str,
}

// ============================================================================
// Definitions
// ============================================================================

pub static BOOKMARKS: ResourceDef = ResourceDef {
    name: "bookmarks",
    table: "bookmarks",
    fields: &[
        Field::text("title"),
        Field::text("url"),
        Field::text("description"),
        Field::text("rating"),
    ],
    required: &["title", "url", "description", "rating"],
    patchable: &["title", "url", "description", "rating"],
    not_found_message: "Bookmark doesn't exist",
    empty_patch_message: "Request body must contain either 'title', 'url', 'description', or 'rating'",
};

pub static FOLDERS: ResourceDef = ResourceDef {
    name: "folders",
    table: "folders",
    fields: &[Field::text("title")],
    required: &["title"],
    patchable: &["title"],
    not_found_message: "Folder doesn't exist",
    empty_patch_message: "Request body must contain the folder's new 'title'",
};

pub static NOTES: ResourceDef = ResourceDef {
    name: "notes",
    table: "notes",
    fields: &[
        Field::text("title"),
        Field::text("content"),
        Field::text("modified"),
        Field::integer("folderid"),
    ],
    required: &["title", "content", "modified", "folderid"],
    // folderid is fixed at creation.
    patchable: &["title", "content", "modified"],
    not_found_message: "Note doesn't exist",
    empty_patch_message: "Request body must contain either 'title', 'content', or 'modified'",
};

/// All resources mounted by the server.
pub static RESOURCES: [&ResourceDef; 3] = [&BOOKMARKS, &FOLDERS, &NOTES];

// ============================================================================
// Helpers
// ============================================================================

/// JavaScript-style truthiness: `null`, `false`, `0` and `""` are falsy.
///
/// Used for both required-field and partial-update checks, so a legitimate
/// empty string or zero is indistinguishable from an absent field.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl ResourceDef {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Singular label used in log lines, e.g. `"bookmark"`.
    pub fn label(&self) -> &'static str {
        self.name.strip_suffix('s').unwrap_or(self.name)
    }

    /// First required field that is absent or falsy in `body`.
    pub fn first_missing_required(&self, body: &Record) -> Option<&'static str> {
        self.required
            .iter()
            .copied()
            .find(|name| !body.get(*name).is_some_and(is_truthy))
    }

    /// Keep only this resource's fields from a create body.
    pub fn new_entity(&self, body: &Record) -> Record {
        pick(body, self.fields.iter().map(|f| f.name))
    }

    /// Extract the partial update carried by `body`.
    ///
    /// Returns `None` when no patchable field holds a truthy value. Otherwise
    /// every patchable key present in the body is kept, falsy ones included;
    /// unknown keys are dropped.
    pub fn patch_fields(&self, body: &Record) -> Option<Record> {
        let patch = pick(body, self.patchable.iter().copied());
        patch.values().any(is_truthy).then_some(patch)
    }

    /// Outbound form of a row: `id` verbatim, every field sanitized to a string.
    pub fn serialize(&self, row: &Record) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 1);
        out.insert(
            "id".to_string(),
            row.get("id").cloned().unwrap_or(Value::Null),
        );
        for field in self.fields {
            let value = row.get(field.name).unwrap_or(&Value::Null);
            out.insert(
                field.name.to_string(),
                Value::String(crate::sanitize::sanitize_value(value)),
            );
        }
        Value::Object(out)
    }
}

fn pick<'a>(body: &Record, keys: impl Iterator<Item = &'a str>) -> Record {
    keys.filter_map(|key| body.get(key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
