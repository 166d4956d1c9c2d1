use serde::{Deserialize, Serialize};

/// Structural summary of one class
/// Format:
///   namespace: <dotted namespace>
///   class_name: <simple name>
///   inheritors: [<base or interface>]
///   usual_fields / child_class_fields / methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClassMembers {
    pub namespace: String,
    pub class_name: String,
    pub inheritors: Vec<String>,
    pub usual_fields: Vec<Field>,
    pub child_class_fields: Vec<ChildField>,
    pub methods: Vec<Method>,
}

/// A field whose type is a primitive, framework or otherwise unexpanded type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub access_modifier: String,
}

/// A field whose declared type is a class of the same module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildField {
    pub name: String,
    pub access_modifier: String,

    /// Expanded structure of the field's class; `None` when expansion stopped
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub class_type: Option<Box<ClassMembers>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub access_modifier: String,
    pub return_type: String,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Top-level output for the json/yaml renderings
#[derive(Debug, Serialize)]
pub struct AssemblyOutput<'a> {
    pub assembly: &'a str,
    pub classes: &'a [ClassMembers],
}

impl ClassMembers {
    /// Namespace-qualified name, or the bare class name in the global namespace
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.class_name)
        }
    }
}
