//! Render trees for the contact form, stat cards and toasts.
//!
//! Every function here is a pure mapping from state to a [`ViewNode`]; nothing
//! is retained between calls.

use std::collections::BTreeMap;

use crate::counter::DisplayKind;
use crate::feedback::Notification;
use crate::form::{ContactFieldError, ContactForm, FieldKey, FormSnapshot};
use crate::stats::StatItem;

pub const INVALID_CLASS: &str = "p-invalid";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ViewNode {
    Element {
        tag: &'static str,
        classes: Vec<String>,
        attrs: BTreeMap<&'static str, String>,
        children: Vec<ViewNode>,
    },
    Text(String),
}

impl ViewNode {
    pub fn element(tag: &'static str) -> Self {
        ViewNode::Element {
            tag,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        ViewNode::Text(value.into())
    }

    /// Adds whitespace-separated classes. Ignored on text nodes.
    pub fn class(mut self, value: &str) -> Self {
        if let ViewNode::Element { classes, .. } = &mut self {
            classes.extend(value.split_whitespace().map(str::to_string));
        }
        self
    }

    pub fn class_if(self, condition: bool, value: &str) -> Self {
        if condition { self.class(value) } else { self }
    }

    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        if let ViewNode::Element { attrs, .. } = &mut self {
            attrs.insert(key, value.into());
        }
        self
    }

    pub fn attr_if(self, condition: bool, key: &'static str, value: &str) -> Self {
        if condition { self.attr(key, value) } else { self }
    }

    pub fn child(mut self, node: ViewNode) -> Self {
        if let ViewNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = ViewNode>) -> Self {
        if let ViewNode::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            ViewNode::Element { tag, .. } => Some(tag),
            ViewNode::Text(_) => None,
        }
    }

    pub fn has_class(&self, value: &str) -> bool {
        match self {
            ViewNode::Element { classes, .. } => classes.iter().any(|class| class == value),
            ViewNode::Text(_) => false,
        }
    }

    pub fn attr_value(&self, key: &str) -> Option<&str> {
        match self {
            ViewNode::Element { attrs, .. } => attrs.get(key).map(String::as_str),
            ViewNode::Text(_) => None,
        }
    }

    /// Depth-first search for the first element whose `id` attribute matches.
    pub fn find_by_id(&self, id: &str) -> Option<&ViewNode> {
        if self.attr_value("id") == Some(id) {
            return Some(self);
        }
        match self {
            ViewNode::Element { children, .. } => {
                children.iter().find_map(|child| child.find_by_id(id))
            }
            ViewNode::Text(_) => None,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ViewNode::Text(value) => out.push_str(value),
            ViewNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

struct FieldView {
    key: FieldKey,
    label: &'static str,
    placeholder: &'static str,
    multiline: bool,
}

const CONTACT_FIELDS: [FieldView; 3] = [
    FieldView {
        key: FieldKey::new("name"),
        label: "Your Name",
        placeholder: "John Doe",
        multiline: false,
    },
    FieldView {
        key: FieldKey::new("email"),
        label: "Email Address",
        placeholder: "john@example.com",
        multiline: false,
    },
    FieldView {
        key: FieldKey::new("message"),
        label: "Your Message",
        placeholder: "Tell us about your project or ask us anything...",
        multiline: true,
    },
];

pub fn contact_form_view(snapshot: &FormSnapshot<ContactForm, ContactFieldError>) -> ViewNode {
    let fields = CONTACT_FIELDS.iter().map(|field| {
        let value = match field.key.as_str() {
            "name" => snapshot.model.name.as_str(),
            "email" => snapshot.model.email.as_str(),
            _ => snapshot.model.message.as_str(),
        };
        field_view(field, value, snapshot.error(field.key))
    });

    let loading = snapshot.is_submitting();
    let button = ViewNode::element("button")
        .attr("type", "submit")
        .attr("icon", if loading { "pi pi-spin pi-spinner" } else { "pi pi-send" })
        .class("w-full p-button-lg")
        .class_if(loading, "p-button-loading")
        .attr_if(loading, "disabled", "true")
        .child(ViewNode::text("Send Message"));

    ViewNode::element("form")
        .class("space-y-6")
        .children(fields)
        .child(button)
}

fn field_view(field: &FieldView, value: &str, error: Option<&ContactFieldError>) -> ViewNode {
    let id = field.key.as_str();
    let input = if field.multiline {
        ViewNode::element("textarea")
            .attr("rows", "6")
            .child(ViewNode::text(value))
    } else {
        ViewNode::element("input")
            .attr("type", if id == "email" { "email" } else { "text" })
            .attr("value", value)
    };
    let input = input
        .attr("id", id)
        .attr("name", id)
        .attr("placeholder", field.placeholder)
        .class("w-full")
        .class_if(error.is_some(), INVALID_CLASS);

    let mut node = ViewNode::element("div")
        .class("p-field")
        .child(
            ViewNode::element("label")
                .attr("for", id)
                .child(ViewNode::text(field.label)),
        )
        .child(input);
    if let Some(error) = error {
        node = node.child(
            ViewNode::element("small")
                .attr("id", format!("{id}-error"))
                .attr("severity", "error")
                .class("p-error mt-1")
                .child(ViewNode::text(error.to_string())),
        );
    }
    node
}

/// A stat card showing `display`, the counter's current text.
pub fn stat_card_view(item: &StatItem, display: &str) -> ViewNode {
    let body = match item.counter.kind {
        DisplayKind::Counter => ViewNode::element("span")
            .class("text-3xl font-bold")
            .class(&item.color)
            .child(ViewNode::text(display)),
        DisplayKind::Progress => ViewNode::element("div")
            .class("space-y-4")
            .child(value_text(item, display))
            .child(gauge_node("progressbar", item)),
        DisplayKind::Knob => ViewNode::element("div")
            .class("flex flex-col items-center space-y-4")
            .child(gauge_node("knob", item))
            .child(value_text(item, display)),
    };

    ViewNode::element("article")
        .class("card text-center")
        .child(
            ViewNode::element("i")
                .class(&item.icon)
                .class(&item.color),
        )
        .child(body)
        .child(
            ViewNode::element("p")
                .class("text-gray-600 font-medium")
                .child(ViewNode::text(item.label.as_str())),
        )
}

fn value_text(item: &StatItem, display: &str) -> ViewNode {
    ViewNode::element("div")
        .class(&item.color)
        .class("font-bold")
        .child(ViewNode::text(display))
}

fn gauge_node(tag: &'static str, item: &StatItem) -> ViewNode {
    let reading = item.counter.gauge(item.counter.target);
    ViewNode::element(tag)
        .attr("value", reading.value.to_string())
        .attr("max", reading.max.to_string())
        .attr("color", item.accent_hex())
}

pub fn toast_view(notification: &Notification) -> ViewNode {
    let mut node = ViewNode::element("div")
        .class("p-toast-message")
        .class(&format!("p-toast-message-{}", notification.severity.as_str()))
        .attr("role", "alert")
        .child(
            ViewNode::element("span")
                .class("p-toast-summary")
                .child(ViewNode::text(notification.summary.as_str())),
        )
        .child(
            ViewNode::element("div")
                .class("p-toast-detail")
                .child(ViewNode::text(notification.detail.as_str())),
        );
    if let Some(id) = notification.id {
        node = node.attr("id", format!("toast-{}", id.0));
    }
    node
}
