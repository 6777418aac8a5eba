//! Routine classification.
//!
//! Walks the parsed AST of one routine-source module and derives a
//! [`RoutineDescriptor`] for every top-level `export function`. Two facts
//! are extracted per routine:
//!
//! * the shape of its returned value — a bare identifier reference is
//!   scalar-like (`"out"`), anything else is pointer-like and tagged with
//!   its syntactic kind name;
//! * whether the body constructs a fixed-size output buffer via
//!   `new glMatrix.ARRAY_TYPE(<literal>)`, whose literal length becomes
//!   the `allocation`.
//!
//! Returns inside nested function bodies belong to the nested function and
//! are never attributed to the enclosing routine.

use glw_parser::parse_source;
use glw_types::ast::*;
use glw_types::{
    AnalyzeError, ErrorCode, ModuleInterface, Result, ReturnShape, RoutineDescriptor, SourceFile,
};

/// Classify every exported routine of one source module.
///
/// Fails with the first syntax error when the source does not parse, and
/// with [`ErrorCode::MISSING_RETURN`] when an exported routine has no
/// value-carrying `return` statement.
pub fn classify(source_file: &SourceFile) -> Result<ModuleInterface> {
    let parsed = parse_source(source_file);
    let program = match parsed.program {
        Some(program) => program,
        None => {
            let error = parsed.errors.into_first().unwrap_or_else(|| {
                AnalyzeError::bare(
                    source_file.name.clone(),
                    ErrorCode::UNEXPECTED_EOF,
                    "source did not parse",
                )
            });
            return Err(error);
        }
    };

    let mut interface = ModuleInterface::new();
    for item in &program.items {
        // Exported const/let aliases parse but produce no descriptor.
        let func = match &item.kind {
            ItemKind::ExportFunction(func) => func,
            _ => continue,
        };
        interface.insert(func.name.name.clone(), classify_routine(source_file, func)?);
    }
    Ok(interface)
}

fn classify_routine(source_file: &SourceFile, func: &FunctionDecl) -> Result<RoutineDescriptor> {
    let mut returns = Vec::new();
    collect_returns(&func.body, &mut returns);

    let first = returns.first().ok_or_else(|| {
        AnalyzeError::new(
            source_file,
            ErrorCode::MISSING_RETURN,
            format!("routine '{}' has no return statement", func.name.name),
            func.name.span,
        )
    })?;

    let shape = match &first.kind {
        ExprKind::Ident(_) => ReturnShape::Out,
        other => ReturnShape::Pointer(other.syntax_name().to_string()),
    };
    let allocation = find_allocation_in_block(&func.body);

    let descriptor = RoutineDescriptor::new(&func.name.name, shape, allocation);
    if returns.len() > 1 {
        Ok(descriptor.flag_multi_return())
    } else {
        Ok(descriptor)
    }
}

// ── Return collection ─────────────────────────────────────────────────────────

/// Collect every value-carrying `return` in source order, skipping nested
/// function bodies. Bare `return;` carries no value shape and is ignored.
fn collect_returns<'a>(block: &'a Block, out: &mut Vec<&'a Expr>) {
    for stmt in &block.stmts {
        collect_returns_stmt(stmt, out);
    }
}

fn collect_returns_stmt<'a>(stmt: &'a Stmt, out: &mut Vec<&'a Expr>) {
    match &stmt.kind {
        StmtKind::Return(Some(expr)) => out.push(expr),
        StmtKind::Return(None) => {}
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_returns_stmt(then_branch, out);
            if let Some(else_branch) = else_branch {
                collect_returns_stmt(else_branch, out);
            }
        }
        StmtKind::For { body, .. }
        | StmtKind::ForEach { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. } => collect_returns_stmt(body, out),
        StmtKind::Block(block) => collect_returns(block, out),
        // A nested function's returns are its own.
        StmtKind::Function(_) => {}
        StmtKind::Var(_)
        | StmtKind::Expr(_)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Empty => {}
    }
}

// ── Allocation detection ──────────────────────────────────────────────────────

/// Find the first `new glMatrix.ARRAY_TYPE(<integer literal>)` in source
/// order, again skipping nested function bodies.
fn find_allocation_in_block(block: &Block) -> Option<u32> {
    block.stmts.iter().find_map(find_allocation_in_stmt)
}

fn find_allocation_in_stmt(stmt: &Stmt) -> Option<u32> {
    match &stmt.kind {
        StmtKind::Var(decl) => decl
            .declarators
            .iter()
            .find_map(|d| d.init.as_ref().and_then(find_allocation_in_expr)),
        StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => find_allocation_in_expr(expr),
        StmtKind::Return(None) => None,
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => find_allocation_in_expr(cond)
            .or_else(|| find_allocation_in_stmt(then_branch))
            .or_else(|| else_branch.as_deref().and_then(find_allocation_in_stmt)),
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            let in_init = init.as_deref().and_then(|init| match init {
                ForInit::Var(decl) => decl
                    .declarators
                    .iter()
                    .find_map(|d| d.init.as_ref().and_then(find_allocation_in_expr)),
                ForInit::Expr(expr) => find_allocation_in_expr(expr),
            });
            in_init
                .or_else(|| test.as_ref().and_then(find_allocation_in_expr))
                .or_else(|| update.as_ref().and_then(find_allocation_in_expr))
                .or_else(|| find_allocation_in_stmt(body))
        }
        StmtKind::ForEach { right, body, .. } => {
            find_allocation_in_expr(right).or_else(|| find_allocation_in_stmt(body))
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { cond, body } => {
            find_allocation_in_expr(cond).or_else(|| find_allocation_in_stmt(body))
        }
        StmtKind::Block(block) => find_allocation_in_block(block),
        StmtKind::Function(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Empty => None,
    }
}

fn find_allocation_in_expr(expr: &Expr) -> Option<u32> {
    match &expr.kind {
        ExprKind::New { callee, args } => {
            if let Some(len) = array_type_literal(callee, args) {
                return Some(len);
            }
            find_allocation_in_expr(callee)
                .or_else(|| args.iter().find_map(find_allocation_in_expr))
        }
        ExprKind::Array(elements) | ExprKind::Sequence(elements) => {
            elements.iter().find_map(find_allocation_in_expr)
        }
        ExprKind::Object(props) => props.iter().find_map(|p| find_allocation_in_expr(&p.value)),
        ExprKind::Unary { expr, .. } => find_allocation_in_expr(expr),
        ExprKind::Update { target, .. } => find_allocation_in_expr(target),
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            find_allocation_in_expr(left).or_else(|| find_allocation_in_expr(right))
        }
        ExprKind::Assign { target, value, .. } => {
            find_allocation_in_expr(target).or_else(|| find_allocation_in_expr(value))
        }
        ExprKind::Conditional { cond, then, other } => find_allocation_in_expr(cond)
            .or_else(|| find_allocation_in_expr(then))
            .or_else(|| find_allocation_in_expr(other)),
        ExprKind::Call { callee, args } => find_allocation_in_expr(callee)
            .or_else(|| args.iter().find_map(find_allocation_in_expr)),
        ExprKind::Member { object, property } => {
            find_allocation_in_expr(object).or_else(|| match property {
                MemberKey::Computed(index) => find_allocation_in_expr(index),
                MemberKey::Ident(_) => None,
            })
        }
        // Nested function bodies are skipped, like return collection.
        ExprKind::Function { .. } | ExprKind::Arrow { .. } => None,
        ExprKind::Ident(_)
        | ExprKind::Number(_)
        | ExprKind::Str(_)
        | ExprKind::Template(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::This => None,
    }
}

/// `new glMatrix.ARRAY_TYPE(<n>)` with a non-computed property access and
/// an integer first argument.
fn array_type_literal(callee: &Expr, args: &[Expr]) -> Option<u32> {
    let ExprKind::Member { object, property } = &callee.kind else {
        return None;
    };
    let ExprKind::Ident(object_name) = &object.kind else {
        return None;
    };
    let MemberKey::Ident(property_name) = property else {
        return None;
    };
    if object_name != "glMatrix" || property_name.name != "ARRAY_TYPE" {
        return None;
    }
    match args.first().map(|a| &a.kind) {
        Some(&ExprKind::Number(n)) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
            Some(n as u32)
        }
        _ => None,
    }
}
