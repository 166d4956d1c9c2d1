//! Turns a loaded module's type tables into class descriptors.
//!
//! Fields whose type is a class of the same module are expanded in place.
//! Expansion follows the chain of types currently being described, so a
//! type never expands inside itself and the depth stays bounded.

use crate::error::MetadataError;
use crate::metadata::{LoadedModule, TypeDef, TypeKind};
use crate::model::{ChildField, ClassMembers, Field, Method, Param};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Default limit on nested child-class expansion
pub const DEFAULT_MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Nested levels a child-class field may expand to below a top-level class
    pub max_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Produce one descriptor per class of the module, in module order
pub fn extract(module: &LoadedModule, options: ExtractOptions) -> Result<Vec<ClassMembers>, MetadataError> {
    Ok(Extractor::new(module, options)?.classes())
}

pub struct Extractor<'a> {
    module: &'a LoadedModule,
    options: ExtractOptions,
    by_full_name: HashMap<String, usize>,
    by_simple_name: HashMap<&'a str, Vec<usize>>,
}

impl<'a> Extractor<'a> {
    /// Index the module's types, rejecting metadata that cannot be described
    pub fn new(module: &'a LoadedModule, options: ExtractOptions) -> Result<Self, MetadataError> {
        let mut by_full_name = HashMap::new();
        let mut by_simple_name: HashMap<&str, Vec<usize>> = HashMap::new();

        for (index, ty) in module.types.iter().enumerate() {
            validate(ty)?;
            let full_name = ty.full_name();
            if by_full_name.insert(full_name.clone(), index).is_some() {
                return Err(MetadataError::reflection(full_name, "type is defined more than once"));
            }
            by_simple_name.entry(ty.name.as_str()).or_default().push(index);
        }

        Ok(Extractor {
            module,
            options,
            by_full_name,
            by_simple_name,
        })
    }

    pub fn classes(&self) -> Vec<ClassMembers> {
        let mut chain = Vec::new();
        self.module
            .types
            .iter()
            .enumerate()
            .filter(|(_, ty)| ty.kind == TypeKind::Class)
            .map(|(index, _)| self.describe(index, &mut chain))
            .collect()
    }

    /// Describe one type; `chain` holds the types being expanded above it
    fn describe(&self, index: usize, chain: &mut Vec<usize>) -> ClassMembers {
        let ty = &self.module.types[index];
        chain.push(index);

        let mut usual_fields = Vec::new();
        let mut child_class_fields = Vec::new();

        for field in &ty.fields {
            match self.resolve(&field.type_name, ty) {
                Some(target) => {
                    let class_type = if chain.contains(&target) {
                        debug!(class = %ty.full_name(), field = %field.name, "cyclic field type not expanded");
                        None
                    } else if chain.len() > self.options.max_depth {
                        warn!(
                            class = %ty.full_name(),
                            field = %field.name,
                            max_depth = self.options.max_depth,
                            "child class expansion truncated"
                        );
                        None
                    } else {
                        Some(Box::new(self.describe(target, chain)))
                    };
                    child_class_fields.push(ChildField {
                        name: field.name.clone(),
                        access_modifier: field.access.clone(),
                        class_type,
                    });
                }
                None => usual_fields.push(Field {
                    name: field.name.clone(),
                    type_name: field.type_name.clone(),
                    access_modifier: field.access.clone(),
                }),
            }
        }

        let methods = ty
            .methods
            .iter()
            .map(|m| Method {
                name: m.name.clone(),
                access_modifier: m.access.clone(),
                return_type: m.return_type.clone(),
                params: m
                    .params
                    .iter()
                    .map(|p| Param {
                        name: p.name.clone(),
                        type_name: p.type_name.clone(),
                    })
                    .collect(),
            })
            .collect();

        chain.pop();

        ClassMembers {
            namespace: ty.namespace.clone(),
            class_name: ty.name.clone(),
            inheritors: ty.bases.clone(),
            usual_fields,
            child_class_fields,
            methods,
        }
    }

    /// Find the class a field type names, if it is one of this module's classes.
    /// Lookup order: full name, a type nested in the referencing class or one
    /// of its enclosing classes, unique qualified suffix (dotted names), simple
    /// name in the referencing namespace, unique simple name anywhere.
    fn resolve(&self, type_name: &str, from: &TypeDef) -> Option<usize> {
        let name = type_name.trim().trim_matches(|c| c == '"' || c == '\'');
        if name.is_empty() {
            return None;
        }

        let found = if let Some(&index) = self.by_full_name.get(name) {
            Some(index)
        } else if let Some(index) = self.resolve_nested(name, from) {
            Some(index)
        } else if name.contains('.') {
            let suffix = format!(".{}", name);
            let mut matches = self
                .by_full_name
                .iter()
                .filter(|(full, _)| full.ends_with(&suffix))
                .map(|(_, &index)| index);
            match (matches.next(), matches.next()) {
                (Some(index), None) => Some(index),
                _ => None,
            }
        } else {
            let candidates = self.by_simple_name.get(name)?;
            candidates
                .iter()
                .copied()
                .find(|&i| self.module.types[i].namespace == from.namespace)
                .or(match candidates.as_slice() {
                    [only] => Some(*only),
                    _ => None,
                })
        };

        found.filter(|&i| self.module.types[i].kind == TypeKind::Class)
    }

    /// `Inner` seen from `Outer` (or from `Outer.Other`) names `Outer.Inner`
    fn resolve_nested(&self, name: &str, from: &TypeDef) -> Option<usize> {
        let mut scope = Some(from.name.as_str());
        while let Some(current) = scope {
            let candidate = if from.namespace.is_empty() {
                format!("{}.{}", current, name)
            } else {
                format!("{}.{}.{}", from.namespace, current, name)
            };
            if let Some(&index) = self.by_full_name.get(&candidate) {
                return Some(index);
            }
            scope = current.rsplit_once('.').map(|(outer, _)| outer);
        }
        None
    }
}

fn validate(ty: &TypeDef) -> Result<(), MetadataError> {
    let owner = || {
        if ty.name.is_empty() {
            format!("{}.<unnamed>", ty.namespace)
        } else {
            ty.full_name()
        }
    };

    if ty.name.trim().is_empty() {
        return Err(MetadataError::reflection(owner(), "type has no name"));
    }
    for (i, field) in ty.fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            return Err(MetadataError::reflection(owner(), format!("field #{} has no name", i + 1)));
        }
        if field.type_name.trim().is_empty() {
            return Err(MetadataError::reflection(owner(), format!("field {} has no type", field.name)));
        }
    }
    for (i, method) in ty.methods.iter().enumerate() {
        if method.name.trim().is_empty() {
            return Err(MetadataError::reflection(owner(), format!("method #{} has no name", i + 1)));
        }
        for (j, param) in method.params.iter().enumerate() {
            if param.name.trim().is_empty() {
                return Err(MetadataError::reflection(
                    owner(),
                    format!("parameter #{} of {} has no name", j + 1, method.name),
                ));
            }
            if param.type_name.trim().is_empty() {
                return Err(MetadataError::reflection(
                    owner(),
                    format!("parameter {} of {} has no type", param.name, method.name),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{self, FieldDef, MethodDef, ParamDef};
    use std::path::PathBuf;

    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    fn class(namespace: &str, name: &str, fields: &[(&str, &str)]) -> TypeDef {
        TypeDef {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind: TypeKind::Class,
            bases: vec![],
            fields: fields
                .iter()
                .map(|(n, t)| FieldDef {
                    name: n.to_string(),
                    type_name: t.to_string(),
                    access: "public".to_string(),
                })
                .collect(),
            methods: vec![],
        }
    }

    fn module(types: Vec<TypeDef>) -> LoadedModule {
        LoadedModule {
            name: "Test".to_string(),
            types,
        }
    }

    fn find<'c>(classes: &'c [ClassMembers], name: &str) -> &'c ClassMembers {
        classes.iter().find(|c| c.class_name == name).unwrap()
    }

    /// Number of nested class levels below a descriptor, following the first child field
    fn nesting(class: &ClassMembers) -> usize {
        match class.child_class_fields.first().and_then(|f| f.class_type.as_deref()) {
            Some(inner) => 1 + nesting(inner),
            None => 0,
        }
    }

    #[test]
    fn test_empty_module() {
        let classes = extract(&module(vec![]), ExtractOptions::default()).unwrap();
        assert!(classes.is_empty());
    }

    #[test]
    fn test_partitions_usual_and_child_fields() {
        let m = module(vec![
            class("G", "Point", &[("X", "Int32"), ("Y", "Int32")]),
            class("G", "Line", &[("Start", "Point"), ("Name", "String"), ("End", "G.Point")]),
        ]);
        let classes = extract(&m, ExtractOptions::default()).unwrap();
        let line = find(&classes, "Line");

        let usual: Vec<&str> = line.usual_fields.iter().map(|f| f.name.as_str()).collect();
        let child: Vec<&str> = line.child_class_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(usual, vec!["Name"]);
        assert_eq!(child, vec!["Start", "End"]);

        let start = line.child_class_fields[0].class_type.as_deref().unwrap();
        assert_eq!(start.class_name, "Point");
        assert_eq!(start.usual_fields.len(), 2);
    }

    #[test]
    fn test_non_class_types_are_skipped_and_not_expanded() {
        let mut color = class("G", "Color", &[]);
        color.kind = TypeKind::Enum;
        let mut shape = class("G", "IShape", &[]);
        shape.kind = TypeKind::Interface;
        let m = module(vec![color, shape, class("G", "Pen", &[("Ink", "Color"), ("Tip", "IShape")])]);

        let classes = extract(&m, ExtractOptions::default()).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].usual_fields.len(), 2);
        assert!(classes[0].child_class_fields.is_empty());
    }

    #[test]
    fn test_self_reference_is_not_expanded() {
        let m = module(vec![class("", "Node", &[("Value", "Int32"), ("Next", "Node")])]);
        let classes = extract(&m, ExtractOptions::default()).unwrap();
        let next = &classes[0].child_class_fields[0];
        assert_eq!(next.name, "Next");
        assert!(next.class_type.is_none());
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let m = module(vec![
            class("Hr", "Employee", &[("Dept", "Department")]),
            class("Hr", "Department", &[("Head", "Employee")]),
        ]);
        let classes = extract(&m, ExtractOptions::default()).unwrap();

        let employee = find(&classes, "Employee");
        let dept = employee.child_class_fields[0].class_type.as_deref().unwrap();
        assert_eq!(dept.class_name, "Department");
        assert!(dept.child_class_fields[0].class_type.is_none());

        let department = find(&classes, "Department");
        let head = department.child_class_fields[0].class_type.as_deref().unwrap();
        assert_eq!(head.class_name, "Employee");
        assert!(head.child_class_fields[0].class_type.is_none());
    }

    #[test]
    fn test_depth_limit() {
        let m = module(vec![
            class("", "A", &[("b", "B")]),
            class("", "B", &[("c", "C")]),
            class("", "C", &[("d", "D")]),
            class("", "D", &[("n", "int")]),
        ]);

        let full = extract(&m, ExtractOptions::default()).unwrap();
        assert_eq!(nesting(&full[0]), 3);

        let limited = extract(&m, ExtractOptions { max_depth: 1 }).unwrap();
        assert_eq!(nesting(&limited[0]), 1);
        let b = limited[0].child_class_fields[0].class_type.as_deref().unwrap();
        assert_eq!(b.child_class_fields[0].name, "c");
        assert!(b.child_class_fields[0].class_type.is_none());

        let none = extract(&m, ExtractOptions { max_depth: 0 }).unwrap();
        assert!(none[0].child_class_fields[0].class_type.is_none());
    }

    #[test]
    fn test_resolution_prefers_own_namespace() {
        let m = module(vec![
            class("a", "Item", &[("x", "int")]),
            class("b", "Item", &[("y", "int")]),
            class("b", "Box", &[("item", "Item")]),
            class("c", "Crate", &[("item", "Item")]),
        ]);
        let classes = extract(&m, ExtractOptions::default()).unwrap();

        let boxed = find(&classes, "Box");
        let item = boxed.child_class_fields[0].class_type.as_deref().unwrap();
        assert_eq!(item.namespace, "b");

        // Ambiguous from a third namespace: treated as a plain field
        let crate_ = find(&classes, "Crate");
        assert_eq!(crate_.usual_fields[0].type_name, "Item");
    }

    #[test]
    fn test_resolution_by_qualified_suffix_and_quotes() {
        let m = module(vec![
            class("shop.models", "Customer", &[("name", "str")]),
            class("shop.orders", "Order", &[("buyer", "models.Customer"), ("seller", "'Customer'")]),
        ]);
        let classes = extract(&m, ExtractOptions::default()).unwrap();
        let order = find(&classes, "Order");
        assert_eq!(order.child_class_fields.len(), 2);
        assert!(order.child_class_fields.iter().all(|f| f.class_type.is_some()));
    }

    #[test]
    fn test_resolution_of_nested_class_from_enclosing_scopes() {
        let m = module(vec![
            class("m", "Outer", &[("inner", "Inner")]),
            class("m", "Outer.Inner", &[("v", "int")]),
            class("m", "Outer.Other", &[("sibling", "'Inner'")]),
            class("m", "Elsewhere", &[("ref", "Outer.Inner")]),
        ]);
        let classes = extract(&m, ExtractOptions::default()).unwrap();

        let outer = find(&classes, "Outer");
        let inner = outer.child_class_fields[0].class_type.as_deref().unwrap();
        assert_eq!(inner.full_name(), "m.Outer.Inner");
        assert_eq!(inner.usual_fields[0].name, "v");

        let other = find(&classes, "Outer.Other");
        assert!(other.child_class_fields[0].class_type.is_some());

        let elsewhere = find(&classes, "Elsewhere");
        assert_eq!(
            elsewhere.child_class_fields[0].class_type.as_deref().unwrap().class_name,
            "Outer.Inner"
        );
    }

    #[test]
    fn test_generic_field_stays_usual() {
        let m = module(vec![
            class("", "Point", &[]),
            class("", "Path", &[("points", "List[Point]")]),
        ]);
        let classes = extract(&m, ExtractOptions::default()).unwrap();
        assert_eq!(find(&classes, "Path").usual_fields[0].type_name, "List[Point]");
    }

    #[test]
    fn test_methods_and_inheritors_copied_in_order() {
        let mut calc = class("M", "Calc", &[]);
        calc.bases = vec!["Object".to_string(), "IDisposable".to_string()];
        calc.methods.push(MethodDef {
            name: "Add".to_string(),
            access: "public".to_string(),
            return_type: "Int32".to_string(),
            params: vec![
                ParamDef {
                    name: "b".to_string(),
                    type_name: "Int32".to_string(),
                },
                ParamDef {
                    name: "a".to_string(),
                    type_name: "Int64".to_string(),
                },
            ],
        });
        let classes = extract(&module(vec![calc]), ExtractOptions::default()).unwrap();
        let calc = &classes[0];
        assert_eq!(calc.inheritors, vec!["Object", "IDisposable"]);
        assert_eq!(calc.methods[0].params[0].name, "b");
        assert_eq!(calc.methods[0].params[1].type_name, "Int64");
    }

    #[test]
    fn test_duplicate_type_is_reflection_error() {
        let m = module(vec![class("G", "Point", &[]), class("G", "Point", &[])]);
        let err = extract(&m, ExtractOptions::default()).unwrap_err();
        assert!(err.is_reflection());
        assert!(err.to_string().contains("G.Point"));
    }

    #[test]
    fn test_unnamed_member_is_reflection_error() {
        let m = module(vec![class("G", "Point", &[("", "Int32")])]);
        let err = extract(&m, ExtractOptions::default()).unwrap_err();
        assert!(err.is_reflection());
        assert!(err.to_string().contains("field #1 has no name"));
    }

    #[test]
    fn test_untyped_param_is_reflection_error() {
        let mut calc = class("", "Calc", &[]);
        calc.methods.push(MethodDef {
            name: "Neg".to_string(),
            access: "public".to_string(),
            return_type: "Int32".to_string(),
            params: vec![ParamDef {
                name: "x".to_string(),
                type_name: " ".to_string(),
            }],
        });
        let err = extract(&module(vec![calc]), ExtractOptions::default()).unwrap_err();
        assert!(err.is_reflection());
    }

    #[test]
    fn test_python_fixture_expands_forward_references() {
        let m = metadata::load(&fixtures_dir().join("geometry.py"), None).unwrap();
        let classes = extract(&m, ExtractOptions::default()).unwrap();

        let names: Vec<&str> = classes.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(names, vec!["Point", "Segment", "Polygon"]);

        let segment = find(&classes, "Segment");
        let usual: Vec<&str> = segment.usual_fields.iter().map(|f| f.name.as_str()).collect();
        let child: Vec<&str> = segment.child_class_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(usual, vec!["label", "color"]);
        assert_eq!(child, vec!["start", "end"]);
    }

    #[test]
    fn test_yaml_fixture_nested_expansion() {
        let m = metadata::load(&fixtures_dir().join("library.yaml"), None).unwrap();
        let classes = extract(&m, ExtractOptions::default()).unwrap();
        let names: Vec<&str> = classes.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(names, vec!["Book", "Author", "Member"]);

        let member = find(&classes, "Member");
        let referrer = &member.child_class_fields[0];
        assert_eq!(referrer.name, "Referrer");
        assert!(referrer.class_type.is_none());

        let favorite = member.child_class_fields[1].class_type.as_deref().unwrap();
        assert_eq!(favorite.class_name, "Book");
        let author = favorite.child_class_fields[0].class_type.as_deref().unwrap();
        assert_eq!(author.full_name(), "Library.People.Author");
    }
}
