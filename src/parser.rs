use crate::error::MetadataError;
use crate::metadata::ParamDef;
use rustpython_parser::{Parse, ast};
use std::fs;
use std::path::Path;

/// Type name used when a parameter or field carries no annotation
pub const UNKNOWN_TYPE: &str = "Any";

/// Parse a Python file into its AST module
pub fn parse_file(path: &Path) -> Result<ast::ModModule, MetadataError> {
    let source =
        fs::read_to_string(path).map_err(|e| MetadataError::load_with(path, "cannot read file", e))?;
    ast::ModModule::parse(&source, path.to_string_lossy().as_ref())
        .map_err(|e| MetadataError::load_with(path, "invalid Python source", e))
}

/// Extract parameters in declaration order, dropping the first positional
/// parameter when `skip_receiver` is set (the `self`/`cls` of a method)
pub fn extract_params(args: &ast::Arguments, skip_receiver: bool) -> Vec<ParamDef> {
    let mut params = Vec::new();

    let positional = args
        .posonlyargs
        .iter()
        .chain(args.args.iter())
        .skip(usize::from(skip_receiver));
    for arg_with_default in positional {
        params.push(param(&arg_with_default.def, ""));
    }

    // *args
    if let Some(vararg) = &args.vararg {
        params.push(param(vararg, "*"));
    }

    // Keyword-only args
    for arg_with_default in args.kwonlyargs.iter() {
        params.push(param(&arg_with_default.def, ""));
    }

    // **kwargs
    if let Some(kwarg) = &args.kwarg {
        params.push(param(kwarg, "**"));
    }

    params
}

fn param(arg: &ast::Arg, prefix: &str) -> ParamDef {
    ParamDef {
        name: format!("{}{}", prefix, arg.arg),
        type_name: annotation_to_string(arg.annotation.as_deref()),
    }
}

/// Render a type annotation; string forward references lose their quotes
pub fn annotation_to_string(annotation: Option<&ast::Expr>) -> String {
    match annotation {
        Some(ast::Expr::Constant(ast::ExprConstant {
            value: ast::Constant::Str(s),
            ..
        })) => s.trim().to_string(),
        Some(expr) => expr_to_string(expr),
        None => UNKNOWN_TYPE.to_string(),
    }
}

/// Best-effort type of an assigned value: literals and constructor calls
pub fn infer_value_type(value: &ast::Expr) -> String {
    match value {
        ast::Expr::Constant(c) => match &c.value {
            ast::Constant::None => "None",
            ast::Constant::Bool(_) => "bool",
            ast::Constant::Str(_) => "str",
            ast::Constant::Bytes(_) => "bytes",
            ast::Constant::Int(_) => "int",
            ast::Constant::Float(_) => "float",
            ast::Constant::Complex { .. } => "complex",
            _ => UNKNOWN_TYPE,
        }
        .to_string(),
        ast::Expr::List(_) | ast::Expr::ListComp(_) => "list".to_string(),
        ast::Expr::Dict(_) | ast::Expr::DictComp(_) => "dict".to_string(),
        ast::Expr::Set(_) | ast::Expr::SetComp(_) => "set".to_string(),
        ast::Expr::Tuple(_) => "tuple".to_string(),
        ast::Expr::Call(call) => match call.func.as_ref() {
            ast::Expr::Name(_) | ast::Expr::Attribute(_) => expr_to_string(&call.func),
            _ => UNKNOWN_TYPE.to_string(),
        },
        _ => UNKNOWN_TYPE.to_string(),
    }
}

/// Convert an expression to a string representation
pub fn expr_to_string(expr: &ast::Expr) -> String {
    match expr {
        ast::Expr::Name(name) => name.id.to_string(),

        ast::Expr::Constant(c) => match &c.value {
            ast::Constant::None => "None".to_string(),
            ast::Constant::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            ast::Constant::Str(s) => format!("\"{}\"", s),
            ast::Constant::Int(i) => i.to_string(),
            ast::Constant::Float(f) => f.to_string(),
            ast::Constant::Ellipsis => "...".to_string(),
            _ => "...".to_string(),
        },

        ast::Expr::Attribute(attr) => {
            format!("{}.{}", expr_to_string(&attr.value), attr.attr)
        }

        ast::Expr::Subscript(sub) => {
            format!("{}[{}]", expr_to_string(&sub.value), expr_to_string(&sub.slice))
        }

        ast::Expr::Tuple(tuple) => {
            let elts: Vec<_> = tuple.elts.iter().map(expr_to_string).collect();
            elts.join(", ")
        }

        ast::Expr::List(list) => {
            let elts: Vec<_> = list.elts.iter().map(expr_to_string).collect();
            format!("[{}]", elts.join(", "))
        }

        ast::Expr::BinOp(binop) => {
            let op = match binop.op {
                ast::Operator::BitOr => " | ",
                _ => " ? ",
            };
            format!("{}{}{}", expr_to_string(&binop.left), op, expr_to_string(&binop.right))
        }

        ast::Expr::Call(call) => {
            let func = expr_to_string(&call.func);
            let args: Vec<_> = call.args.iter().map(expr_to_string).collect();
            format!("{}({})", func, args.join(", "))
        }

        _ => "...".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(source: &str) -> ast::Expr {
        ast::Expr::parse(source, "<test>").unwrap()
    }

    fn first_function(source: &str) -> ast::StmtFunctionDef {
        let module = ast::ModModule::parse(source, "<test>").unwrap();
        match module.body.into_iter().next() {
            Some(ast::Stmt::FunctionDef(func)) => func,
            _ => panic!("expected a function definition"),
        }
    }

    #[test]
    fn test_expr_to_string_generic() {
        assert_eq!(expr_to_string(&parse_expr("Dict[str, int]")), "Dict[str, int]");
        assert_eq!(expr_to_string(&parse_expr("typing.Optional[Point]")), "typing.Optional[Point]");
        assert_eq!(expr_to_string(&parse_expr("int | None")), "int | None");
    }

    #[test]
    fn test_annotation_forward_reference() {
        let expr = parse_expr("'Point'");
        assert_eq!(annotation_to_string(Some(&expr)), "Point");
    }

    #[test]
    fn test_annotation_missing() {
        assert_eq!(annotation_to_string(None), "Any");
    }

    #[test]
    fn test_infer_value_type_literals() {
        assert_eq!(infer_value_type(&parse_expr("0")), "int");
        assert_eq!(infer_value_type(&parse_expr("1.5")), "float");
        assert_eq!(infer_value_type(&parse_expr("'x'")), "str");
        assert_eq!(infer_value_type(&parse_expr("True")), "bool");
        assert_eq!(infer_value_type(&parse_expr("None")), "None");
        assert_eq!(infer_value_type(&parse_expr("[]")), "list");
        assert_eq!(infer_value_type(&parse_expr("{}")), "dict");
    }

    #[test]
    fn test_infer_value_type_constructor() {
        assert_eq!(infer_value_type(&parse_expr("Point(0, 0)")), "Point");
        assert_eq!(infer_value_type(&parse_expr("shapes.Point()")), "shapes.Point");
        assert_eq!(infer_value_type(&parse_expr("a + b")), "Any");
    }

    #[test]
    fn test_extract_params_in_order() {
        let func = first_function("def f(self, b: int, a, /, *rest: str, key: bool, **opts): pass\n");
        let params = extract_params(&func.args, true);
        let rendered: Vec<(String, String)> = params.into_iter().map(|p| (p.name, p.type_name)).collect();
        // posonly args come first; "self" is the receiver
        assert_eq!(
            rendered,
            vec![
                ("b".to_string(), "int".to_string()),
                ("a".to_string(), "Any".to_string()),
                ("*rest".to_string(), "str".to_string()),
                ("key".to_string(), "bool".to_string()),
                ("**opts".to_string(), "Any".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_params_keeps_first_when_not_receiver() {
        let func = first_function("def f(x: int, y: int): pass\n");
        let params = extract_params(&func.args, false);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "x");
    }
}
