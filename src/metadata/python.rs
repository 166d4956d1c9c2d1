//! Python modules and packages as a metadata source.

use super::{FieldDef, LoadedModule, MethodDef, TypeDef, TypeKind};
use crate::error::MetadataError;
use crate::parser::{annotation_to_string, expr_to_string, extract_params, infer_value_type, parse_file};
use crate::walk::{collect_python_files, module_path};
use rustpython_parser::ast::{self, Stmt};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Return type of a method without a return annotation
const NO_RETURN: &str = "None";

/// Bases that make a class an enum
const ENUM_BASES: [&str; 5] = ["Enum", "IntEnum", "StrEnum", "Flag", "IntFlag"];

/// Load a Python module file or package directory
pub fn load(root: &Path) -> Result<LoadedModule, MetadataError> {
    // Resolve "." and friends so the package name is known
    let root = root
        .canonicalize()
        .map_err(|e| MetadataError::load_with(root, "cannot resolve path", e))?;
    let files = collect_python_files(&root)?;
    if root.is_file() && files.is_empty() {
        return Err(MetadataError::load(&root, "not a Python source file"));
    }

    let name = root
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut types = Vec::new();
    for file in &files {
        let namespace = module_path(&root, file);
        let module = parse_file(file)?;
        let before = types.len();
        types.extend(extract_types(&module.body, &namespace));
        debug!(file = %file.display(), %namespace, classes = types.len() - before, "parsed");
    }

    // `pkg/sub.py` and `pkg/sub/__init__.py` share a namespace
    Ok(LoadedModule {
        name,
        types: merge_redefinitions(types),
    })
}

/// Extract the class definitions of one source file, nested classes included.
/// A nested class is named by its enclosing chain (`Outer.Inner`) and follows
/// its enclosing class.
pub fn extract_types(body: &[Stmt], namespace: &str) -> Vec<TypeDef> {
    let mut types = Vec::new();
    for stmt in body {
        if let Stmt::ClassDef(class) = stmt {
            collect_class(class, namespace, None, &mut types);
        }
    }
    merge_redefinitions(types)
}

fn collect_class(class: &ast::StmtClassDef, namespace: &str, outer: Option<&str>, types: &mut Vec<TypeDef>) {
    let name = match outer {
        Some(outer) => format!("{}.{}", outer, class.name),
        None => class.name.to_string(),
    };
    types.push(extract_type(class, namespace, &name));

    for stmt in &class.body {
        if let Stmt::ClassDef(nested) = stmt {
            collect_class(nested, namespace, Some(&name), types);
        }
    }
}

/// A redefined class replaces the earlier definition in place
fn merge_redefinitions(types: Vec<TypeDef>) -> Vec<TypeDef> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<TypeDef> = Vec::with_capacity(types.len());

    for ty in types {
        let full_name = ty.full_name();
        match positions.get(&full_name) {
            Some(&index) => {
                debug!(class = %full_name, "redefinition replaces earlier class");
                merged[index] = ty;
            }
            None => {
                positions.insert(full_name, merged.len());
                merged.push(ty);
            }
        }
    }
    merged
}

fn extract_type(class: &ast::StmtClassDef, namespace: &str, name: &str) -> TypeDef {
    let bases: Vec<String> = class.bases.iter().map(expr_to_string).collect();
    let kind = classify(&bases);

    let mut fields = Vec::new();
    let mut methods = Vec::new();

    for stmt in &class.body {
        match stmt {
            Stmt::AnnAssign(assign) => {
                if let ast::Expr::Name(target) = assign.target.as_ref() {
                    let type_name = annotation_to_string(Some(&*assign.annotation));
                    push_field(&mut fields, target.id.as_str(), type_name);
                }
            }
            Stmt::Assign(assign) => {
                for target in &assign.targets {
                    if let ast::Expr::Name(target) = target {
                        push_field(&mut fields, target.id.as_str(), infer_value_type(&assign.value));
                    }
                }
            }
            Stmt::FunctionDef(func) => {
                if func.name.as_str() == "__init__" {
                    collect_instance_fields(&func.args, &func.body, &mut fields);
                }
                methods.push(build_method(
                    func.name.as_str(),
                    &func.args,
                    func.returns.as_deref(),
                    &func.decorator_list,
                ));
            }
            Stmt::AsyncFunctionDef(func) => {
                methods.push(build_method(
                    func.name.as_str(),
                    &func.args,
                    func.returns.as_deref(),
                    &func.decorator_list,
                ));
            }
            _ => {}
        }
    }

    TypeDef {
        namespace: namespace.to_string(),
        name: name.to_string(),
        kind,
        bases,
        fields,
        methods,
    }
}

/// Enum subclasses are enums, Protocol subclasses are interfaces
fn classify(bases: &[String]) -> TypeKind {
    if bases.iter().any(|base| ENUM_BASES.contains(&base_name(base))) {
        TypeKind::Enum
    } else if bases.iter().any(|base| base_name(base) == "Protocol") {
        TypeKind::Interface
    } else {
        TypeKind::Class
    }
}

/// Last dotted segment of a base, subscript dropped: `typing.Protocol[T]` -> `Protocol`
fn base_name(base: &str) -> &str {
    let base = base.split('[').next().unwrap_or(base);
    base.rsplit('.').next().unwrap_or(base).trim()
}

/// `self.x = ...` and `self.x: T = ...` at the top level of `__init__`
fn collect_instance_fields(args: &ast::Arguments, body: &[Stmt], fields: &mut Vec<FieldDef>) {
    let receiver = match args.posonlyargs.iter().chain(args.args.iter()).next() {
        Some(arg) => arg.def.arg.as_str(),
        None => return,
    };

    for stmt in body {
        match stmt {
            Stmt::AnnAssign(assign) => {
                if let Some(name) = receiver_attribute(&assign.target, receiver) {
                    push_field(fields, name, annotation_to_string(Some(&*assign.annotation)));
                }
            }
            Stmt::Assign(assign) => {
                for target in &assign.targets {
                    if let Some(name) = receiver_attribute(target, receiver) {
                        push_field(fields, name, infer_value_type(&assign.value));
                    }
                }
            }
            _ => {}
        }
    }
}

fn receiver_attribute<'a>(target: &'a ast::Expr, receiver: &str) -> Option<&'a str> {
    match target {
        ast::Expr::Attribute(attr) => match attr.value.as_ref() {
            ast::Expr::Name(name) if name.id.as_str() == receiver => Some(attr.attr.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// First declaration of a name wins; dunder attributes are not fields
fn push_field(fields: &mut Vec<FieldDef>, name: &str, type_name: String) {
    if is_dunder(name) || fields.iter().any(|f| f.name == name) {
        return;
    }
    fields.push(FieldDef {
        name: name.to_string(),
        type_name,
        access: access_modifier(name).to_string(),
    });
}

fn build_method(
    name: &str,
    args: &ast::Arguments,
    returns: Option<&ast::Expr>,
    decorators: &[ast::Expr],
) -> MethodDef {
    let is_static = decorators
        .iter()
        .any(|d| matches!(d, ast::Expr::Name(n) if n.id.as_str() == "staticmethod"));
    let return_type = match returns {
        Some(_) => annotation_to_string(returns),
        None => NO_RETURN.to_string(),
    };

    MethodDef {
        name: name.to_string(),
        access: access_modifier(name).to_string(),
        return_type,
        params: extract_params(args, !is_static),
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Python naming convention: `__x` is private, `_x` is protected
pub fn access_modifier(name: &str) -> &'static str {
    if is_dunder(name) {
        "public"
    } else if name.starts_with("__") {
        "private"
    } else if name.starts_with('_') {
        "protected"
    } else {
        "public"
    }
}
