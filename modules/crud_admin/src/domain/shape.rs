use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Column name reserved for the store-assigned identifier.
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Date,
    Boolean,
}

fn default_true() -> bool {
    true
}

/// One scalar field of an entity shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub required: bool,
    /// Whether the field gets a column in the list view.
    #[serde(default = "default_true")]
    pub in_list: bool,
}

impl FieldSpec {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            kind,
            required: true,
            in_list: true,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn date(name: &str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn hidden_in_list(mut self) -> Self {
        self.in_list = false;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Human title: the explicit one, else the name with underscores as spaces
    /// and each word capitalized (`date_create` → `Date Create`).
    pub fn display_title(&self) -> String {
        if let Some(t) = &self.title {
            return t.clone();
        }
        self.name
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Schema of one entity kind, shared by the validator, the store and the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeDescriptor {
    /// URL segment, e.g. `user` in `/api/user/`.
    pub slug: String,
    /// Backing table; defaults to the slug.
    #[serde(default)]
    pub table: String,
    /// Singular title; defaults to the capitalized slug.
    #[serde(default)]
    pub title: String,
    /// Plural title; defaults to the title with an `s` appended.
    #[serde(default)]
    pub plural_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field used as the detail heading and the clickable list column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_field: Option<String>,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("no entity shapes configured")]
    NoEntities,

    #[error("invalid {what} '{value}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { what: &'static str, value: String },

    #[error("entity '{slug}' has no fields")]
    NoFields { slug: String },

    #[error("entity '{slug}' declares reserved field 'id'")]
    ReservedField { slug: String },

    #[error("entity '{slug}' declares field '{field}' twice")]
    DuplicateField { slug: String, field: String },

    #[error("entity '{slug}' names unknown primary field '{field}'")]
    UnknownPrimaryField { slug: String, field: String },

    #[error("entity slug '{slug}' is registered twice")]
    DuplicateSlug { slug: String },
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn ensure_identifier(what: &'static str, value: &str) -> Result<(), ShapeError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ShapeError::InvalidIdentifier {
            what,
            value: value.to_string(),
        })
    }
}

impl ShapeDescriptor {
    pub fn new(slug: &str, title: &str, plural_title: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            slug: slug.to_string(),
            table: slug.to_string(),
            title: title.to_string(),
            plural_title: plural_title.to_string(),
            description: None,
            primary_field: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_primary_field(mut self, field: &str) -> Self {
        self.primary_field = Some(field.to_string());
        self
    }

    /// Fill defaulted table and titles.
    fn normalized(mut self) -> Self {
        if self.table.trim().is_empty() {
            self.table = self.slug.clone();
        }
        if self.title.trim().is_empty() {
            self.title = FieldSpec::text(&self.slug).display_title();
        }
        if self.plural_title.trim().is_empty() {
            self.plural_title = format!("{}s", self.title);
        }
        self
    }

    /// Validate names and references.
    pub fn check(&self) -> Result<(), ShapeError> {
        ensure_identifier("entity slug", &self.slug)?;
        ensure_identifier("table name", &self.table)?;

        if self.fields.is_empty() {
            return Err(ShapeError::NoFields {
                slug: self.slug.clone(),
            });
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            ensure_identifier("field name", &field.name)?;
            if field.name.eq_ignore_ascii_case(ID_COLUMN) {
                return Err(ShapeError::ReservedField {
                    slug: self.slug.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ShapeError::DuplicateField {
                    slug: self.slug.clone(),
                    field: field.name.clone(),
                });
            }
        }

        if let Some(primary) = &self.primary_field {
            if self.field(primary).is_none() {
                return Err(ShapeError::UnknownPrimaryField {
                    slug: self.slug.clone(),
                    field: primary.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Explicit primary field, else the first text field, else the first field.
    pub fn primary_field(&self) -> Option<&FieldSpec> {
        self.primary_field
            .as_deref()
            .and_then(|name| self.field(name))
            .or_else(|| self.fields.iter().find(|f| f.kind == FieldKind::Text))
            .or_else(|| self.fields.first())
    }

    pub fn list_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.in_list)
    }
}

/// Built-in `user` shape: `name` (text), `dob` (date).
pub fn user_shape() -> ShapeDescriptor {
    ShapeDescriptor::new(
        "user",
        "User",
        "Users",
        vec![
            FieldSpec::text("name"),
            FieldSpec::date("dob").with_title("Date of Birth"),
        ],
    )
    .with_description("Add a user to the system")
}

/// Built-in `task` shape.
pub fn task_shape() -> ShapeDescriptor {
    ShapeDescriptor::new(
        "task",
        "Task",
        "Tasks",
        vec![
            FieldSpec::date("dob"),
            FieldSpec::text("name"),
            FieldSpec::text("task"),
            FieldSpec::date("date_create"),
            FieldSpec::text("who_cook"),
            FieldSpec::text("who_comp"),
            FieldSpec::boolean("result"),
        ],
    )
    .with_description("Add a task to the system")
}

pub fn builtin_shapes() -> Vec<ShapeDescriptor> {
    vec![user_shape(), task_shape()]
}

/// Ordered set of checked shapes. The first entry is the default entity.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    shapes: Vec<ShapeDescriptor>,
}

impl EntityRegistry {
    pub fn new(shapes: Vec<ShapeDescriptor>) -> Result<Self, ShapeError> {
        if shapes.is_empty() {
            return Err(ShapeError::NoEntities);
        }
        let shapes: Vec<ShapeDescriptor> =
            shapes.into_iter().map(ShapeDescriptor::normalized).collect();

        let mut slugs = HashSet::new();
        for shape in &shapes {
            shape.check()?;
            if !slugs.insert(shape.slug.as_str()) {
                return Err(ShapeError::DuplicateSlug {
                    slug: shape.slug.clone(),
                });
            }
        }
        Ok(Self { shapes })
    }

    pub fn builtin() -> Self {
        Self {
            shapes: builtin_shapes(),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&ShapeDescriptor> {
        self.shapes.iter().find(|s| s.slug == slug)
    }

    pub fn default_shape(&self) -> &ShapeDescriptor {
        // `new` rejects an empty list
        &self.shapes[0]
    }

    pub fn shapes(&self) -> &[ShapeDescriptor] {
        &self.shapes
    }
}
