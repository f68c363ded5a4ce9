//! Source-text fixtures lowered from tree-sitter into `SyntaxTree`
//!
//! Sources are parsed with the TypeScript grammar and the concrete tree is
//! lowered node by node through `SyntaxTreeBuilder`. Nested function bodies
//! are not lowered; every name they mention is treated as captured and left
//! untracked.

use scriptflow_ir::config::SymbolicExecutionConfig;
use scriptflow_ir::features::flow_graph::{ControlFlowGraph, FlowGraphBuilder, ScriptFlowGraphBuilder};
use scriptflow_ir::features::symbolic_execution::{
    ExecutionResult, FunctionScope, NoopListener, ParameterSeed, SymbolResolver,
    SymbolicExecutionEngine,
};
use scriptflow_ir::pipeline::AnalysisUnit;
use scriptflow_ir::shared::models::{NodeId, Span, SyntaxKind, SyntaxTree, SyntaxTreeBuilder, VariableId};
use std::collections::{HashMap, HashSet};
use tree_sitter::{Node, Parser, Tree};

fn parse(source: &str) -> Tree {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::language_typescript())
        .expect("TypeScript grammar loads");
    let tree = parser.parse(source, None).expect("parser returns a tree");
    assert!(!tree.root_node().has_error(), "fixture does not parse: {source}");
    tree
}

fn span(node: Node<'_>) -> Span {
    let (start, end) = (node.start_position(), node.end_position());
    Span::new(
        start.row as u32 + 1,
        start.column as u32,
        end.row as u32 + 1,
        end.column as u32,
    )
}

fn empty_at(node: Node<'_>) -> Span {
    let start = node.start_position();
    let (line, column) = (start.row as u32 + 1, start.column as u32);
    Span::new(line, column, line, column)
}

/// Named children without comments
fn named(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn first_named(node: Node<'_>) -> Node<'_> {
    named(node)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("{} has no operand", node.kind()))
}

fn field<'t>(node: Node<'t>, name: &str) -> Node<'t> {
    node.child_by_field_name(name)
        .unwrap_or_else(|| panic!("{} has no '{name}'", node.kind()))
}

fn has_token(node: Node<'_>, tokens: &[&str]) -> bool {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .any(|child| tokens.contains(&child.kind()))
}

fn operator<'t>(node: Node<'t>) -> &'t str {
    field(node, "operator").kind()
}

fn binary_kind(op: &str) -> SyntaxKind {
    match op {
        "+" => SyntaxKind::Plus,
        "-" => SyntaxKind::Minus,
        "*" => SyntaxKind::Multiply,
        "/" => SyntaxKind::Divide,
        "%" => SyntaxKind::Remainder,
        "**" => SyntaxKind::Exponent,
        "<<" => SyntaxKind::LeftShift,
        ">>" => SyntaxKind::RightShift,
        ">>>" => SyntaxKind::UnsignedRightShift,
        "&" => SyntaxKind::BitwiseAnd,
        "|" => SyntaxKind::BitwiseOr,
        "^" => SyntaxKind::BitwiseXor,
        "==" => SyntaxKind::Equal,
        "!=" => SyntaxKind::NotEqual,
        "===" => SyntaxKind::StrictEqual,
        "!==" => SyntaxKind::StrictNotEqual,
        "<" => SyntaxKind::Less,
        ">" => SyntaxKind::Greater,
        "<=" => SyntaxKind::LessOrEqual,
        ">=" => SyntaxKind::GreaterOrEqual,
        "in" => SyntaxKind::In,
        "instanceof" => SyntaxKind::InstanceOf,
        "&&" => SyntaxKind::LogicalAnd,
        "||" => SyntaxKind::LogicalOr,
        "??" => SyntaxKind::NullishCoalescing,
        other => panic!("unsupported binary operator '{other}'"),
    }
}

fn compound_assignment_kind(op: &str) -> SyntaxKind {
    match op {
        "+=" => SyntaxKind::PlusAssignment,
        "-=" => SyntaxKind::MinusAssignment,
        "*=" => SyntaxKind::MultiplyAssignment,
        "/=" => SyntaxKind::DivideAssignment,
        "%=" => SyntaxKind::RemainderAssignment,
        "**=" => SyntaxKind::ExponentAssignment,
        "<<=" => SyntaxKind::LeftShiftAssignment,
        ">>=" => SyntaxKind::RightShiftAssignment,
        ">>>=" => SyntaxKind::UnsignedRightShiftAssignment,
        "&=" => SyntaxKind::BitwiseAndAssignment,
        "|=" => SyntaxKind::BitwiseOrAssignment,
        "^=" => SyntaxKind::BitwiseXorAssignment,
        "&&=" | "||=" | "??=" => SyntaxKind::LogicalAssignment,
        other => panic!("unsupported assignment operator '{other}'"),
    }
}

fn unary_kind(op: &str) -> SyntaxKind {
    match op {
        "!" => SyntaxKind::LogicalNot,
        "-" => SyntaxKind::UnaryMinus,
        "+" => SyntaxKind::UnaryPlus,
        "~" => SyntaxKind::BitwiseComplement,
        "typeof" => SyntaxKind::TypeOf,
        "void" => SyntaxKind::Void,
        "delete" => SyntaxKind::Delete,
        other => panic!("unsupported unary operator '{other}'"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declared {
    Local,
    Parameter,
    Rest,
}

/// Lowers one parsed source, recording the declarations it meets
struct Lowering<'s> {
    source: &'s str,
    b: SyntaxTreeBuilder,
    declared: Vec<(String, Declared)>,
    captured: HashSet<String>,
    uses_arguments: bool,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            b: SyntaxTreeBuilder::new(),
            declared: Vec::new(),
            captured: HashSet::new(),
            uses_arguments: false,
        }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    /// String contents without the surrounding quotes or backticks
    fn unquoted(&self, node: Node<'_>) -> &'s str {
        let range = node.byte_range();
        &self.source[range.start + 1..range.end - 1]
    }

    fn declare(&mut self, name: &str, kind: Declared) {
        if !self.declared.iter().any(|(existing, _)| existing == name) {
            self.declared.push((name.to_string(), kind));
        }
    }

    /// Marks every name inside a nested function or class as captured
    fn capture(&mut self, node: Node<'_>) {
        if matches!(node.kind(), "identifier" | "shorthand_property_identifier") {
            self.captured.insert(self.text(node).to_string());
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children {
            self.capture(child);
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn statements(&mut self, nodes: Vec<Node<'_>>) -> Vec<NodeId> {
        nodes.into_iter().map(|node| self.statement(node)).collect()
    }

    fn statement(&mut self, node: Node<'_>) -> NodeId {
        let span = span(node);
        match node.kind() {
            "statement_block" => {
                let children = self.statements(named(node));
                self.b.node(SyntaxKind::Block, span, children)
            }
            "empty_statement" => self.b.leaf(SyntaxKind::Empty, span),
            "debugger_statement" => self.b.leaf(SyntaxKind::Debugger, span),
            "expression_statement" => {
                let expression = self.expression(first_named(node));
                self.b.node(SyntaxKind::ExpressionStatement, span, [expression])
            }
            "variable_declaration" | "lexical_declaration" => {
                let declaration = self.declaration(node);
                self.b.node(SyntaxKind::VariableStatement, span, [declaration])
            }
            "if_statement" => {
                let mut children = vec![
                    self.condition(field(node, "condition")),
                    self.statement(field(node, "consequence")),
                ];
                if let Some(alternative) = node.child_by_field_name("alternative") {
                    let branch = match alternative.kind() {
                        "else_clause" => first_named(alternative),
                        _ => alternative,
                    };
                    children.push(self.statement(branch));
                }
                self.b.node(SyntaxKind::If, span, children)
            }
            "while_statement" => {
                let condition = self.condition(field(node, "condition"));
                let body = self.statement(field(node, "body"));
                self.b.node(SyntaxKind::While, span, [condition, body])
            }
            "do_statement" => {
                let body = self.statement(field(node, "body"));
                let condition = self.condition(field(node, "condition"));
                self.b.node(SyntaxKind::DoWhile, span, [body, condition])
            }
            "with_statement" => {
                let object = self.condition(field(node, "object"));
                let body = self.statement(field(node, "body"));
                self.b.node(SyntaxKind::With, span, [object, body])
            }
            "for_statement" => self.for_statement(node),
            "for_in_statement" => self.for_in_statement(node),
            "break_statement" | "continue_statement" => {
                let kind = if node.kind() == "break_statement" {
                    SyntaxKind::Break
                } else {
                    SyntaxKind::Continue
                };
                match node.child_by_field_name("label") {
                    Some(label) => self.b.token(kind, span, self.text(label)),
                    None => self.b.leaf(kind, span),
                }
            }
            "return_statement" => {
                let value: Vec<_> = named(node)
                    .into_iter()
                    .take(1)
                    .map(|value| self.expression(value))
                    .collect();
                self.b.node(SyntaxKind::Return, span, value)
            }
            "throw_statement" => {
                let value = self.expression(first_named(node));
                self.b.node(SyntaxKind::Throw, span, [value])
            }
            "try_statement" => self.try_statement(node),
            "switch_statement" => self.switch_statement(node),
            "labeled_statement" => {
                let label = self.text(field(node, "label"));
                let body = self.statement(field(node, "body"));
                self.b.node_with_text(SyntaxKind::Labelled, span, label, [body])
            }
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                let kind = if node.kind() == "class_declaration" {
                    SyntaxKind::ClassDeclaration
                } else {
                    SyntaxKind::FunctionDeclaration
                };
                let name = self.text(field(node, "name"));
                self.capture(node);
                self.b.token(kind, span, name)
            }
            other => panic!("unsupported statement '{other}' at {:?}", node.start_position()),
        }
    }

    /// `var`/`let`/`const` declarator list
    fn declaration(&mut self, node: Node<'_>) -> NodeId {
        let mut bindings = Vec::new();
        for declarator in named(node) {
            let target = self.binding(field(declarator, "name"));
            let binding = match declarator.child_by_field_name("value") {
                Some(value) => {
                    let initializer = self.expression(value);
                    self.b
                        .node(SyntaxKind::InitializedBinding, span(declarator), [target, initializer])
                }
                None => target,
            };
            bindings.push(binding);
        }
        self.b.node(SyntaxKind::VariableDeclaration, span(node), bindings)
    }

    fn binding(&mut self, node: Node<'_>) -> NodeId {
        assert_eq!(node.kind(), "identifier", "only plain bindings are supported");
        let name = self.text(node);
        self.declare(name, Declared::Local);
        self.b.token(SyntaxKind::BindingIdentifier, span(node), name)
    }

    /// Parenthesised head of `if`, `while`, `switch`, ...
    fn condition(&mut self, node: Node<'_>) -> NodeId {
        match node.kind() {
            "parenthesized_expression" => self.expression(first_named(node)),
            _ => self.expression(node),
        }
    }

    /// Optional `for` header part: missing parts become `Empty`
    fn for_part(&mut self, node: Option<Node<'_>>, owner: Node<'_>) -> NodeId {
        match node {
            None => self.b.leaf(SyntaxKind::Empty, empty_at(owner)),
            Some(part) => match part.kind() {
                "empty_statement" => self.b.leaf(SyntaxKind::Empty, empty_at(part)),
                "expression_statement" => self.expression(first_named(part)),
                "variable_declaration" | "lexical_declaration" => self.declaration(part),
                _ => self.expression(part),
            },
        }
    }

    fn for_statement(&mut self, node: Node<'_>) -> NodeId {
        let init = self.for_part(node.child_by_field_name("initializer"), node);
        let condition = self.for_part(node.child_by_field_name("condition"), node);
        let update = self.for_part(node.child_by_field_name("increment"), node);
        let body = self.statement(field(node, "body"));
        self.b
            .node(SyntaxKind::For, span(node), [init, condition, update, body])
    }

    fn for_in_statement(&mut self, node: Node<'_>) -> NodeId {
        let kind = if has_token(node, &["of"]) {
            SyntaxKind::ForOf
        } else {
            SyntaxKind::ForIn
        };
        let left = field(node, "left");
        let binding = if has_token(node, &["var", "let", "const"]) {
            let target = self.binding(left);
            self.b.node(SyntaxKind::VariableDeclaration, span(left), [target])
        } else {
            self.expression(left)
        };
        let iterated = self.expression(field(node, "right"));
        let body = self.statement(field(node, "body"));
        self.b.node(kind, span(node), [binding, iterated, body])
    }

    fn try_statement(&mut self, node: Node<'_>) -> NodeId {
        let mut children = vec![self.statement(field(node, "body"))];
        if let Some(handler) = node.child_by_field_name("handler") {
            let mut clause = Vec::new();
            if let Some(parameter) = handler.child_by_field_name("parameter") {
                clause.push(self.binding(parameter));
            }
            clause.push(self.statement(field(handler, "body")));
            children.push(self.b.node(SyntaxKind::CatchClause, span(handler), clause));
        }
        if let Some(finalizer) = node.child_by_field_name("finalizer") {
            let body = self.statement(field(finalizer, "body"));
            children.push(self.b.node(SyntaxKind::FinallyClause, span(finalizer), [body]));
        }
        self.b.node(SyntaxKind::Try, span(node), children)
    }

    fn switch_statement(&mut self, node: Node<'_>) -> NodeId {
        let mut children = vec![self.condition(field(node, "value"))];
        for clause in named(field(node, "body")) {
            let lowered = match clause.kind() {
                "switch_case" => {
                    let test = field(clause, "value");
                    let mut parts = vec![self.expression(test)];
                    let body: Vec<_> = named(clause)
                        .into_iter()
                        .filter(|child| child.id() != test.id())
                        .collect();
                    parts.extend(self.statements(body));
                    self.b.node(SyntaxKind::CaseClause, span(clause), parts)
                }
                "switch_default" => {
                    let body = self.statements(named(clause));
                    self.b.node(SyntaxKind::DefaultClause, span(clause), body)
                }
                other => panic!("unexpected switch member '{other}'"),
            };
            children.push(lowered);
        }
        self.b.node(SyntaxKind::Switch, span(node), children)
    }

    // ---------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------

    fn expressions(&mut self, nodes: Vec<Node<'_>>) -> Vec<NodeId> {
        nodes.into_iter().map(|node| self.expression(node)).collect()
    }

    fn expression(&mut self, node: Node<'_>) -> NodeId {
        let span = span(node);
        match node.kind() {
            "identifier" | "undefined" => {
                let name = self.text(node);
                if name == "arguments" {
                    self.uses_arguments = true;
                }
                self.b.token(SyntaxKind::IdentifierReference, span, name)
            }
            "this" => self.b.leaf(SyntaxKind::This, span),
            "super" => self.b.leaf(SyntaxKind::Super, span),
            "null" => self.b.leaf(SyntaxKind::NullLiteral, span),
            "true" | "false" => self.b.token(SyntaxKind::BooleanLiteral, span, node.kind()),
            "number" => self.b.token(SyntaxKind::NumericLiteral, span, self.text(node)),
            "string" => self.b.token(SyntaxKind::StringLiteral, span, self.unquoted(node)),
            "regex" => self.b.token(SyntaxKind::RegExpLiteral, span, self.text(node)),
            "template_string" => {
                let substitutions: Vec<_> = named(node)
                    .into_iter()
                    .filter(|part| part.kind() == "template_substitution")
                    .map(first_named)
                    .collect();
                if substitutions.is_empty() {
                    let raw = self.unquoted(node);
                    self.b
                        .node_with_text(SyntaxKind::TemplateLiteral, span, raw, Vec::<NodeId>::new())
                } else {
                    let children = self.expressions(substitutions);
                    self.b.node(SyntaxKind::TemplateLiteral, span, children)
                }
            }
            "parenthesized_expression" => {
                let inner = self.expression(first_named(node));
                self.b.node(SyntaxKind::Parenthesised, span, [inner])
            }
            "sequence_expression" => {
                let mut operands = named(node).into_iter();
                let first = operands
                    .next()
                    .unwrap_or_else(|| panic!("empty sequence at {:?}", node.start_position()));
                let mut folded = self.expression(first);
                for operand in operands {
                    let right = self.expression(operand);
                    folded = self.b.node(SyntaxKind::Comma, span, [folded, right]);
                }
                folded
            }
            "binary_expression" => {
                let kind = binary_kind(operator(node));
                let left = self.expression(field(node, "left"));
                let right = self.expression(field(node, "right"));
                self.b.node(kind, span, [left, right])
            }
            "unary_expression" => {
                let kind = unary_kind(operator(node));
                let argument = self.expression(field(node, "argument"));
                self.b.node(kind, span, [argument])
            }
            "update_expression" => {
                let prefix = node
                    .child(0)
                    .is_some_and(|first| matches!(first.kind(), "++" | "--"));
                let kind = match (prefix, operator(node)) {
                    (true, "++") => SyntaxKind::PrefixIncrement,
                    (true, _) => SyntaxKind::PrefixDecrement,
                    (false, "++") => SyntaxKind::PostfixIncrement,
                    (false, _) => SyntaxKind::PostfixDecrement,
                };
                let argument = self.expression(field(node, "argument"));
                self.b.node(kind, span, [argument])
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                let kind = if node.kind() == "assignment_expression" {
                    SyntaxKind::Assignment
                } else {
                    compound_assignment_kind(operator(node))
                };
                let target = self.expression(field(node, "left"));
                let value = self.expression(field(node, "right"));
                self.b.node(kind, span, [target, value])
            }
            "ternary_expression" => {
                let condition = self.expression(field(node, "condition"));
                let consequence = self.expression(field(node, "consequence"));
                let alternative = self.expression(field(node, "alternative"));
                self.b
                    .node(SyntaxKind::Conditional, span, [condition, consequence, alternative])
            }
            "call_expression" | "new_expression" => {
                let (kind, callee) = if node.kind() == "call_expression" {
                    (SyntaxKind::Call, field(node, "function"))
                } else {
                    (SyntaxKind::New, field(node, "constructor"))
                };
                let mut children = vec![self.expression(callee)];
                if let Some(arguments) = node.child_by_field_name("arguments") {
                    children.extend(self.expressions(named(arguments)));
                }
                self.b.node(kind, span, children)
            }
            "member_expression" => {
                let object = self.expression(field(node, "object"));
                let property = field(node, "property");
                let name = self
                    .b
                    .token(SyntaxKind::IdentifierName, self::span(property), self.text(property));
                self.b.node(SyntaxKind::DotMember, span, [object, name])
            }
            "subscript_expression" => {
                let object = self.expression(field(node, "object"));
                let index = self.expression(field(node, "index"));
                self.b.node(SyntaxKind::BracketMember, span, [object, index])
            }
            "spread_element" => {
                let inner = self.expression(first_named(node));
                self.b.node(SyntaxKind::SpreadElement, span, [inner])
            }
            "await_expression" => {
                let inner = self.expression(first_named(node));
                self.b.node(SyntaxKind::Await, span, [inner])
            }
            "yield_expression" => {
                let value: Vec<_> = named(node).into_iter().take(1).collect();
                let children = self.expressions(value);
                self.b.node(SyntaxKind::Yield, span, children)
            }
            "array" => {
                let elements = self.expressions(named(node));
                self.b.node(SyntaxKind::ArrayLiteral, span, elements)
            }
            "object" => self.object(node),
            "function_expression" | "function" | "generator_function" => {
                self.capture(node);
                self.b.leaf(SyntaxKind::FunctionExpression, span)
            }
            "arrow_function" => {
                self.capture(node);
                self.b.leaf(SyntaxKind::ArrowFunction, span)
            }
            "class" => {
                self.capture(node);
                self.b.leaf(SyntaxKind::ClassExpression, span)
            }
            // Type-only wrappers evaluate their operand
            "as_expression" | "non_null_expression" | "satisfies_expression" => {
                self.expression(first_named(node))
            }
            other => panic!("unsupported expression '{other}' at {:?}", node.start_position()),
        }
    }

    fn object(&mut self, node: Node<'_>) -> NodeId {
        let mut members = Vec::new();
        for member in named(node) {
            let lowered = match member.kind() {
                "pair" => {
                    let key = field(member, "key");
                    let key_span = span(key);
                    let lowered_key = match key.kind() {
                        "string" => self.b.token(SyntaxKind::StringLiteral, key_span, self.unquoted(key)),
                        "number" => self.b.token(SyntaxKind::NumericLiteral, key_span, self.text(key)),
                        "computed_property_name" => {
                            let inner = self.expression(first_named(key));
                            self.b.node(SyntaxKind::ComputedPropertyName, key_span, [inner])
                        }
                        _ => self.b.token(SyntaxKind::IdentifierName, key_span, self.text(key)),
                    };
                    let value = self.expression(field(member, "value"));
                    self.b
                        .node(SyntaxKind::PairProperty, span(member), [lowered_key, value])
                }
                "shorthand_property_identifier" => {
                    self.b
                        .token(SyntaxKind::IdentifierReference, span(member), self.text(member))
                }
                "spread_element" => self.expression(member),
                "method_definition" => {
                    self.capture(member);
                    self.b.leaf(SyntaxKind::FunctionExpression, span(member))
                }
                other => panic!("unsupported object member '{other}'"),
            };
            members.push(lowered);
        }
        self.b.node(SyntaxKind::ObjectLiteral, span(node), members)
    }

    // ---------------------------------------------------------------
    // Entry points
    // ---------------------------------------------------------------

    fn parameter(&mut self, node: Node<'_>) {
        match node.kind() {
            "identifier" => self.declare(self.text(node), Declared::Parameter),
            "rest_pattern" => {
                let name = self.text(first_named(node));
                self.declare(name, Declared::Rest);
            }
            "required_parameter" | "optional_parameter" => self.parameter(field(node, "pattern")),
            other => panic!("unsupported parameter '{other}'"),
        }
    }

    fn function(mut self, program: Node<'_>) -> Fixture {
        let function = first_named(program);
        assert_eq!(function.kind(), "function_declaration", "fixture must be a function");
        for parameter in named(field(function, "parameters")) {
            self.parameter(parameter);
        }
        let body = self.statement(field(function, "body"));
        self.finish(body)
    }

    fn script(mut self, program: Node<'_>) -> Fixture {
        let statements = self.statements(named(program));
        let root = self.b.node(SyntaxKind::Script, span(program), statements);
        self.finish(root)
    }

    fn finish(self, root: NodeId) -> Fixture {
        let mut variables = HashMap::new();
        let mut scope = FunctionScope::new();
        for (index, (name, kind)) in self.declared.iter().enumerate() {
            if self.captured.contains(name) {
                continue;
            }
            let id = VariableId(index as u32);
            variables.insert(name.clone(), id);
            scope = match kind {
                Declared::Local => scope.with_local(id),
                Declared::Parameter => scope.with_parameter(ParameterSeed::new(id)),
                Declared::Rest => scope.with_parameter(ParameterSeed::rest(id)),
            };
        }
        if self.uses_arguments {
            let id = VariableId(self.declared.len() as u32);
            variables.insert("arguments".to_string(), id);
            scope = scope.with_arguments(id);
        }
        Fixture {
            tree: self.b.finish(),
            root,
            scope,
            resolver: NameResolver { variables },
        }
    }
}

/// Resolves identifiers by name against the fixture's declarations
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    variables: HashMap<String, VariableId>,
}

impl SymbolResolver for NameResolver {
    fn tracked_variable(&self, tree: &SyntaxTree, node: NodeId) -> Option<VariableId> {
        match tree.kind(node) {
            SyntaxKind::IdentifierReference | SyntaxKind::BindingIdentifier => {
                self.variables.get(tree.text(node)?).copied()
            }
            _ => None,
        }
    }
}

pub struct Fixture {
    pub tree: SyntaxTree,
    /// Function body block or script root
    pub root: NodeId,
    pub scope: FunctionScope,
    pub resolver: NameResolver,
}

impl Fixture {
    /// Identifier references named `name`, in source order
    pub fn refs(&self, name: &str) -> Vec<NodeId> {
        self.tree
            .iter()
            .filter(|(_, node)| node.kind == SyntaxKind::IdentifierReference && node.text.as_deref() == Some(name))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn nth_ref(&self, name: &str, n: usize) -> NodeId {
        self.refs(name)[n]
    }

    /// Nodes of `kind` in creation order (inner nodes before outer ones)
    pub fn nodes(&self, kind: SyntaxKind) -> Vec<NodeId> {
        self.tree
            .iter()
            .filter(|(_, node)| node.kind == kind)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn first(&self, kind: SyntaxKind) -> NodeId {
        self.nodes(kind)[0]
    }

    pub fn var(&self, name: &str) -> VariableId {
        self.resolver.variables[name]
    }

    pub fn cfg(&self) -> ControlFlowGraph {
        ScriptFlowGraphBuilder::default()
            .build(&self.tree, self.root)
            .expect("fixture should produce a valid graph")
    }

    pub fn execute(&self) -> ExecutionResult {
        self.execute_with(SymbolicExecutionConfig::default())
    }

    pub fn execute_with(&self, config: SymbolicExecutionConfig) -> ExecutionResult {
        let cfg = self.cfg();
        SymbolicExecutionEngine::new(&cfg, &self.tree, &self.resolver, config)
            .execute(self.scope.initial_state(), &mut NoopListener)
    }

    pub fn unit<'a>(&'a self, name: &'a str) -> AnalysisUnit<'a> {
        AnalysisUnit::new(name, &self.tree, self.root, &self.scope, &self.resolver)
    }
}

pub fn parse_function(source: &str) -> Fixture {
    let tree = parse(source);
    Lowering::new(source).function(tree.root_node())
}

pub fn parse_script(source: &str) -> Fixture {
    let tree = parse(source);
    Lowering::new(source).script(tree.root_node())
}
