use serde::{Deserialize, Serialize};

use crate::domain::shape::{builtin_shapes, ShapeDescriptor};

fn default_title() -> String {
    "FastUI Admin".to_string()
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024
}

/// Admin module configuration, read from `modules.crud_admin`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrudAdminConfig {
    /// Title of the HTML shell page.
    #[serde(default = "default_title")]
    pub title: String,
    /// Entity kinds to administer. The first one backs `/api/`.
    #[serde(default = "builtin_shapes")]
    pub entities: Vec<ShapeDescriptor>,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for CrudAdminConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            entities: builtin_shapes(),
            cors_enabled: false,
            body_limit_bytes: default_body_limit(),
        }
    }
}
