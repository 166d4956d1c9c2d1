//! In-memory document tree and the builder that lays class descriptors out as
//!
//! ```text
//! <assembly name="...">
//!   <namespace name="...">
//!     <class>Name</class>
//!     <inheritors><inheritor>Base</inheritor>*</inheritors>
//!     <fields>usual fields, then child-class fields</fields>
//!     <methods><method ...><params><param .../>*</params></method>*</methods>
//!   </namespace>*
//! </assembly>
//! ```

use crate::model::{ChildField, ClassMembers, Field, Method};

/// One element of the document: a name, ordered attributes, optional text and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute, replacing an existing one of the same name in place
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child with the given element name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().map_or(true, str::is_empty)
    }
}

/// A complete document: the root `assembly` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

/// Build the document for a module's class descriptors
pub fn build_document(module_name: &str, classes: &[ClassMembers]) -> Document {
    let mut builder = TreeBuilder::new(module_name);
    for class in classes {
        builder.append_class(class);
    }
    builder.finish()
}

/// Appends class subtrees to a root element, then hands the finished document back
pub struct TreeBuilder {
    root: Element,
}

impl TreeBuilder {
    pub fn new(module_name: &str) -> Self {
        TreeBuilder {
            root: Element::new("assembly").with_attr("name", module_name),
        }
    }

    pub fn append_class(&mut self, class: &ClassMembers) {
        self.root.push(class_element(class));
    }

    pub fn finish(self) -> Document {
        Document { root: self.root }
    }
}

fn class_element(class: &ClassMembers) -> Element {
    let mut namespace = Element::new("namespace").with_attr("name", class.namespace.as_str());
    namespace.push(Element::new("class").with_text(class.class_name.as_str()));
    namespace.push(inheritors_element(&class.inheritors));
    namespace.push(fields_element(class));
    namespace.push(methods_element(&class.methods));
    namespace
}

fn inheritors_element(inheritors: &[String]) -> Element {
    let mut element = Element::new("inheritors");
    for name in inheritors {
        element.push(Element::new("inheritor").with_text(name.as_str()));
    }
    element
}

/// Usual fields always precede child-class fields
fn fields_element(class: &ClassMembers) -> Element {
    let mut element = Element::new("fields");
    for field in &class.usual_fields {
        element.push(usual_field_element(field));
    }
    for field in &class.child_class_fields {
        element.push(child_field_element(field));
    }
    element
}

fn usual_field_element(field: &Field) -> Element {
    Element::new("field")
        .with_attr("name", field.name.as_str())
        .with_attr("type", field.type_name.as_str())
        .with_attr("access_modifier", field.access_modifier.as_str())
}

fn child_field_element(field: &ChildField) -> Element {
    let mut element = Element::new("field")
        .with_attr("name", field.name.as_str())
        .with_attr("access_modifier", field.access_modifier.as_str());
    if let Some(class) = &field.class_type {
        element.push(class_element(class));
    }
    element
}

fn methods_element(methods: &[Method]) -> Element {
    let mut element = Element::new("methods");
    for method in methods {
        let mut method_element = Element::new("method")
            .with_attr("name", method.name.as_str())
            .with_attr("access_modifier", method.access_modifier.as_str())
            .with_attr("return_type", method.return_type.as_str());

        let mut params = Element::new("params");
        for param in &method.params {
            params.push(
                Element::new("param")
                    .with_attr("name", param.name.as_str())
                    .with_attr("type", param.type_name.as_str()),
            );
        }
        method_element.push(params);
        element.push(method_element);
    }
    element
}
