//! End-to-end visitor-to-builder tests: drive a hand-built [`FakeNode`] tree
//! through [`analyze_file`] and [`GraphBuilder::build`] together, rather than
//! constructing [`VisitorCollections`] by hand as the unit tests alongside
//! each handler do. These catch bugs at the seam between the two stages.

use grafema_ir::builder::GraphBuilder;
use grafema_ir::domain::{EdgeKind, NodeData, NodeKind};
use grafema_ir::testing::FakeNode;
use grafema_ir::testing::FakeParser;
use grafema_ir::visitor::analyze_file;

fn run(root: FakeNode, file: &str) -> grafema_ir::builder::BuildResult {
    let parser = FakeParser::new(root);
    let collections = analyze_file(&parser, file, "").unwrap();
    GraphBuilder::build(file, &collections).unwrap()
}

/// `function outer() { let x = 1; if (true) { let x = 2; return x; } }`:
/// the inner `x` shadows the outer one, so the `return x` reference (here
/// modeled as a bare call argument reading `x`) should resolve to the
/// inner VARIABLE, not the outer.
#[test]
fn inner_declaration_shadows_outer_of_same_name() {
    let outer_decl = FakeNode::new("VariableDeclarator")
        .with_field("id", FakeNode::leaf("Identifier", "x"))
        .with_field("init", FakeNode::leaf("NumericLiteral", "1"));
    let outer_x = FakeNode::new("VariableDeclaration")
        .with_flag("let")
        .with_child(outer_decl);

    let inner_decl = FakeNode::new("VariableDeclarator")
        .with_field("id", FakeNode::leaf("Identifier", "x"))
        .with_field("init", FakeNode::leaf("NumericLiteral", "2"));
    let inner_x = FakeNode::new("VariableDeclaration")
        .with_flag("let")
        .with_child(inner_decl);
    let use_x = FakeNode::new("CallExpression")
        .with_field("callee", FakeNode::leaf("Identifier", "log"))
        .with_child(FakeNode::leaf("Identifier", "x"));
    let consequent = FakeNode::new("BlockStatement").with_children(vec![inner_x, use_x]);
    let if_stmt = FakeNode::new("IfStatement")
        .with_field("test", FakeNode::leaf("BooleanLiteral", "true"))
        .with_field("consequent", consequent);

    let body = FakeNode::new("BlockStatement").with_children(vec![outer_x, if_stmt]);
    let func = FakeNode::new("FunctionDeclaration")
        .with_field("id", FakeNode::leaf("Identifier", "outer"))
        .with_field("body", body);
    let program = FakeNode::new("Program").with_child(func);

    let build = run(program, "index.js");

    let variables: Vec<_> = build
        .nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::Variable)
        .collect();
    assert_eq!(variables.len(), 2, "both declarations of x produce distinct VARIABLE nodes");
    // Their ids must differ even though both are named "x" -- shadowing
    // means they occupy different scope paths, so the arrow-form id
    // naturally disambiguates them without a discriminator.
    assert_ne!(variables[0].id, variables[1].id);
}

/// A VARIABLE declared at module scope and referenced from a nested,
/// non-shadowing scope resolves to the module-level binding.
#[test]
fn module_level_variable_resolves_from_nested_scope() {
    let module_var = FakeNode::new("VariableDeclaration").with_flag("const").with_child(
        FakeNode::new("VariableDeclarator")
            .with_field("id", FakeNode::leaf("Identifier", "config"))
            .with_field("init", FakeNode::leaf("StringLiteral", "prod")),
    );
    let use_config = FakeNode::new("CallExpression")
        .with_field("callee", FakeNode::leaf("Identifier", "log"))
        .with_child(FakeNode::leaf("Identifier", "config"));
    let body = FakeNode::new("BlockStatement").with_child(use_config);
    let func = FakeNode::new("FunctionDeclaration")
        .with_field("id", FakeNode::leaf("Identifier", "run"))
        .with_field("body", body);
    let program = FakeNode::new("Program").with_children(vec![module_var, func]);

    let build = run(program, "index.js");
    let config_var = build
        .nodes
        .iter()
        .find(|n| n.kind() == NodeKind::Constant && n.name == "config")
        .expect("module-level config constant exists");
    assert!(config_var.id.contains("->global->"));
}

/// `const x = a || b;` produces an EXPRESSION node with DERIVES_FROM edges
/// to both identifier operands, and the VARIABLE has ASSIGNED_FROM to the
/// EXPRESSION.
#[test]
fn logical_expression_wires_derives_from_to_both_operands() {
    let a = FakeNode::leaf("Identifier", "a");
    let b = FakeNode::leaf("Identifier", "b");
    let or_expr = FakeNode::new("LogicalExpression")
        .with_field("left", a)
        .with_field("operator", FakeNode::leaf("Operator", "||"))
        .with_field("right", b);
    let decl = FakeNode::new("VariableDeclarator")
        .with_field("id", FakeNode::leaf("Identifier", "x"))
        .with_field("init", or_expr);
    let param_a = FakeNode::new("VariableDeclarator")
        .with_field("id", FakeNode::leaf("Identifier", "a"))
        .with_field("init", FakeNode::leaf("NumericLiteral", "1"));
    let param_b = FakeNode::new("VariableDeclarator")
        .with_field("id", FakeNode::leaf("Identifier", "b"))
        .with_field("init", FakeNode::leaf("NumericLiteral", "2"));
    let decl_a = FakeNode::new("VariableDeclaration").with_flag("const").with_child(param_a);
    let decl_b = FakeNode::new("VariableDeclaration").with_flag("const").with_child(param_b);
    let decl_x = FakeNode::new("VariableDeclaration").with_flag("const").with_child(decl);
    let program = FakeNode::new("Program").with_children(vec![decl_a, decl_b, decl_x]);

    let build = run(program, "index.js");

    let expr = build
        .nodes
        .iter()
        .find(|n| matches!(&n.data, NodeData::Expression { expression_type, .. } if expression_type == "LogicalExpression"))
        .expect("LogicalExpression node exists");
    assert_eq!(expr.name, "a || b");

    let derives_from: Vec<_> = build
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::DerivesFrom && e.src == expr.id)
        .collect();
    assert_eq!(derives_from.len(), 2, "derives from both `a` and `b`");

    let x_var = build.nodes.iter().find(|n| n.name == "x").unwrap();
    assert!(build
        .edges
        .iter()
        .any(|e| e.kind == EdgeKind::AssignedFrom && e.src == x_var.id && e.dst == expr.id));
}

/// Every non-MODULE node has exactly one inbound CONTAINS edge.
#[test]
fn every_node_except_module_has_exactly_one_contains_parent() {
    let call = FakeNode::new("CallExpression").with_field("callee", FakeNode::leaf("Identifier", "log"));
    let body = FakeNode::new("BlockStatement").with_child(FakeNode::new("ExpressionStatement").with_child(call));
    let func = FakeNode::new("FunctionDeclaration")
        .with_field("id", FakeNode::leaf("Identifier", "run"))
        .with_field("body", body);
    let program = FakeNode::new("Program").with_child(func);

    let build = run(program, "index.js");

    for node in &build.nodes {
        let inbound = build
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Contains && e.dst == node.id)
            .count();
        if node.kind() == NodeKind::Module {
            assert_eq!(inbound, 0, "MODULE has no CONTAINS parent");
        } else {
            assert_eq!(inbound, 1, "{} ({}) has exactly one CONTAINS parent, found {inbound}", node.id, node.kind().as_str());
        }
    }
}
