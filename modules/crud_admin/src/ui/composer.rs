use crate::contract::model::{RecordId, StoredRecord};
use crate::domain::shape::{EntityRegistry, FieldKind, FieldSpec, ShapeDescriptor, ID_COLUMN};
use crate::ui::components::{
    Component, DisplayLookup, DisplayMode, Event, FormField, InputHtmlType, PageDescription,
};

/// What to render for one entity.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    List(&'a [StoredRecord]),
    Detail(&'a StoredRecord),
    AddForm,
    DeleteConfirm(RecordId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    List,
    Detail,
    AddForm,
    DeleteConfirm,
}

impl View<'_> {
    pub fn kind(&self) -> ViewKind {
        match self {
            View::List(_) => ViewKind::List,
            View::Detail(_) => ViewKind::Detail,
            View::AddForm => ViewKind::AddForm,
            View::DeleteConfirm(_) => ViewKind::DeleteConfirm,
        }
    }
}

#[derive(Debug, Clone)]
struct NavEntry {
    slug: String,
    plural_title: String,
}

/// Builds page descriptions. Pure: same inputs give the same output, no I/O.
#[derive(Debug, Clone)]
pub struct PageComposer {
    nav: Vec<NavEntry>,
}

pub const CONFIRM_FIELD: &str = "confirm";

fn list_url(slug: &str) -> String {
    format!("/{slug}/")
}

fn lookup(field: &FieldSpec) -> DisplayLookup {
    DisplayLookup {
        field: field.name.clone(),
        title: Some(field.display_title()),
        mode: (field.kind == FieldKind::Date).then_some(DisplayMode::Date),
        on_click: None,
    }
}

fn form_field(field: &FieldSpec) -> FormField {
    let title = field.display_title();
    match field.kind {
        FieldKind::Text => {
            FormField::input(&field.name, &title, field.required, InputHtmlType::Text)
        }
        FieldKind::Date => {
            FormField::input(&field.name, &title, field.required, InputHtmlType::Date)
        }
        // An unchecked box submits nothing, so it can never be "required" client-side.
        FieldKind::Boolean => FormField::checkbox(&field.name, &title, false),
    }
}

fn confirm_form(shape: &ShapeDescriptor, id: RecordId) -> Component {
    Component::form(
        format!("/api/{}/{}/delete/", shape.slug, id),
        vec![FormField::checkbox(CONFIRM_FIELD, "Confirm", true)],
    )
}

impl PageComposer {
    pub fn new(registry: &EntityRegistry) -> Self {
        Self {
            nav: registry
                .shapes()
                .iter()
                .map(|s| NavEntry {
                    slug: s.slug.clone(),
                    plural_title: s.plural_title.clone(),
                })
                .collect(),
        }
    }

    pub fn compose(&self, shape: &ShapeDescriptor, view: View<'_>) -> PageDescription {
        match view {
            View::List(records) => self.list(shape, records),
            View::Detail(record) => Self::detail(shape, record),
            View::AddForm => Self::add_form(shape),
            View::DeleteConfirm(id) => Self::delete_confirm(shape, id),
        }
    }

    fn nav_links(&self, current: &str) -> Option<Component> {
        let links: Vec<Component> = self
            .nav
            .iter()
            .filter(|n| n.slug != current)
            .map(|n| {
                Component::link(
                    vec![Component::Text {
                        text: n.plural_title.clone(),
                    }],
                    Event::go_to(list_url(&n.slug)),
                )
            })
            .collect();
        (!links.is_empty()).then(|| Component::div(links, Some("mb-3")))
    }

    fn list(&self, shape: &ShapeDescriptor, records: &[StoredRecord]) -> PageDescription {
        let primary = shape.primary_field().map(|f| f.name.as_str());
        let columns = shape
            .list_fields()
            .map(|f| {
                let mut col = lookup(f);
                if Some(f.name.as_str()) == primary {
                    col.on_click = Some(Event::go_to(format!("/{}/{{{}}}/", shape.slug, ID_COLUMN)));
                }
                col
            })
            .collect();

        let mut components = vec![Component::heading(&shape.plural_title, 2)];
        components.extend(self.nav_links(&shape.slug));
        components.push(Component::Table {
            data: records.to_vec(),
            columns,
        });
        components.push(Component::div(
            vec![Component::link(
                vec![Component::Button {
                    text: format!("Add {}", shape.title),
                }],
                Event::go_to(format!("/{}/add/", shape.slug)),
            )],
            None,
        ));
        PageDescription::page(components)
    }

    fn detail(shape: &ShapeDescriptor, record: &StoredRecord) -> PageDescription {
        let heading = shape
            .primary_field()
            .and_then(|f| record.get(&f.name))
            .map(|v| v.to_string())
            .unwrap_or_else(|| format!("{} #{}", shape.title, record.id));

        let mut fields = vec![DisplayLookup {
            field: ID_COLUMN.to_string(),
            title: Some("ID".to_string()),
            mode: None,
            on_click: None,
        }];
        fields.extend(shape.fields.iter().map(lookup));

        let mut delete_form = confirm_form(shape, record.id);
        if let Component::ModelForm { class_name, .. } = &mut delete_form {
            *class_name = Some("text-left".to_string());
        }

        PageDescription::page(vec![
            Component::heading(heading, 2),
            Component::link(
                vec![Component::Text {
                    text: "Back".to_string(),
                }],
                Event::Back,
            ),
            Component::Details {
                data: record.clone(),
                fields,
            },
            Component::div(
                vec![
                    Component::heading(format!("Delete {}?", shape.title), 4),
                    delete_form,
                ],
                Some("card p-4 col-4"),
            ),
        ])
    }

    fn add_form(shape: &ShapeDescriptor) -> PageDescription {
        let description = shape
            .description
            .clone()
            .unwrap_or_else(|| format!("Add a {} to the system", shape.title.to_lowercase()));

        PageDescription::page(vec![
            Component::heading(format!("Add {}", shape.title), 2),
            Component::Paragraph { text: description },
            Component::form(
                format!("/api/{}/add/", shape.slug),
                shape.fields.iter().map(form_field).collect(),
            ),
        ])
    }

    fn delete_confirm(shape: &ShapeDescriptor, id: RecordId) -> PageDescription {
        PageDescription::page(vec![
            Component::heading(format!("Delete {}?", shape.title), 2),
            Component::link(
                vec![Component::Text {
                    text: "Back".to_string(),
                }],
                Event::Back,
            ),
            confirm_form(shape, id),
        ])
    }

    /// Redirect signal to the entity's list view.
    pub fn redirect_to_list(shape: &ShapeDescriptor) -> PageDescription {
        PageDescription::redirect(list_url(&shape.slug))
    }
}
