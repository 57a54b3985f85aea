//! FastUI component model.
//!
//! Only the subset the admin pages use. Serialized with a `type` tag and
//! camelCase keys; `None` fields are omitted, matching what the prebuilt
//! FastUI client expects.

use serde::Serialize;

use crate::contract::model::StoredRecord;

/// Client-side event triggered by clicks or emitted by `FireEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Navigate to a client route. `{field}` placeholders are filled per table row.
    #[serde(rename = "go-to")]
    GoTo { url: String },
    #[serde(rename = "back")]
    Back,
}

impl Event {
    pub fn go_to(url: impl Into<String>) -> Self {
        Event::GoTo { url: url.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Date,
}

/// Column of a `Table` or row of a `Details` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLookup {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DisplayMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_click: Option<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputHtmlType {
    Text,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum FormField {
    #[serde(rename = "FormFieldInput")]
    Input {
        name: String,
        title: Vec<String>,
        required: bool,
        locked: bool,
        html_type: InputHtmlType,
    },
    #[serde(rename = "FormFieldBoolean")]
    Boolean {
        name: String,
        title: Vec<String>,
        required: bool,
        locked: bool,
        mode: String,
    },
}

impl FormField {
    pub fn input(name: &str, title: &str, required: bool, html_type: InputHtmlType) -> Self {
        FormField::Input {
            name: name.to_string(),
            title: vec![title.to_string()],
            required,
            locked: false,
            html_type,
        }
    }

    pub fn checkbox(name: &str, title: &str, required: bool) -> Self {
        FormField::Boolean {
            name: name.to_string(),
            title: vec![title.to_string()],
            required,
            locked: false,
            mode: "checkbox".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Component {
    Page {
        components: Vec<Component>,
    },
    Heading {
        text: String,
        level: u8,
    },
    Paragraph {
        text: String,
    },
    Text {
        text: String,
    },
    Button {
        text: String,
    },
    Link {
        components: Vec<Component>,
        #[serde(skip_serializing_if = "Option::is_none")]
        on_click: Option<Event>,
    },
    Div {
        components: Vec<Component>,
        #[serde(skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
    },
    Table {
        data: Vec<StoredRecord>,
        columns: Vec<DisplayLookup>,
    },
    Details {
        data: StoredRecord,
        fields: Vec<DisplayLookup>,
    },
    ModelForm {
        submit_url: String,
        method: String,
        form_fields: Vec<FormField>,
        #[serde(skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
    },
    FireEvent {
        event: Event,
    },
}

impl Component {
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Component::Heading {
            text: text.into(),
            level,
        }
    }

    pub fn link(components: Vec<Component>, on_click: Event) -> Self {
        Component::Link {
            components,
            on_click: Some(on_click),
        }
    }

    pub fn div(components: Vec<Component>, class_name: Option<&str>) -> Self {
        Component::Div {
            components,
            class_name: class_name.map(str::to_string),
        }
    }

    pub fn form(submit_url: impl Into<String>, form_fields: Vec<FormField>) -> Self {
        Component::ModelForm {
            submit_url: submit_url.into(),
            method: "POST".to_string(),
            form_fields,
            class_name: None,
        }
    }
}

/// The complete response body: a list of top-level components
/// (one `Page`, or a single `FireEvent` for redirects).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageDescription(pub Vec<Component>);

impl PageDescription {
    pub fn page(components: Vec<Component>) -> Self {
        Self(vec![Component::Page { components }])
    }

    /// Instruct the client to navigate to `url` instead of rendering a body.
    pub fn redirect(url: impl Into<String>) -> Self {
        Self(vec![Component::FireEvent {
            event: Event::go_to(url),
        }])
    }
}
