/*
 * Syntax Tree Interface
 *
 * Arena-allocated syntax tree handed to the core by a host adapter
 * (parser bridge, AST converter). The core never parses source text; it only
 * reads node kinds, child order, spans and token text.
 *
 * Child layout conventions (the builder and the engine rely on them):
 *
 *   Script / Block            [statement...]
 *   ExpressionStatement       [expression]
 *   VariableStatement         [VariableDeclaration]
 *   VariableDeclaration       [BindingIdentifier | InitializedBinding ...]
 *   InitializedBinding        [target, initializer]
 *   If                        [condition, then, else?]
 *   While                     [condition, body]
 *   DoWhile                   [body, condition]
 *   For                       [init, condition, update, body]   (Empty = omitted)
 *   ForIn / ForOf             [binding, iterated, body]
 *   Break / Continue          []            text = optional label
 *   Return                    [expression?]
 *   Throw                     [expression]
 *   Try                       [Block, CatchClause?, FinallyClause?]
 *   CatchClause               [parameter?, Block]
 *   FinallyClause             [Block]
 *   Switch                    [discriminant, CaseClause | DefaultClause ...]
 *   CaseClause                [test, statement...]
 *   DefaultClause             [statement...]
 *   Labelled                  [statement]   text = label
 *   With                      [object, statement]
 *   binary / assignment       [left, right]
 *   unary / update            [operand]
 *   DotMember                 [object, IdentifierName]
 *   BracketMember             [object, index]
 *   Call / New                [callee, argument...]
 *   Conditional               [condition, consequent, alternate]
 *   ArrayLiteral              [element...]
 *   ObjectLiteral             [PairProperty | SpreadElement | shorthand ...]
 *   PairProperty              [key, value]
 *   ComputedPropertyName      [expression]
 *   TemplateLiteral           [substitution...]
 *   Parenthesised / Spread    [expression]
 *   Await / Yield             [expression?]
 *
 * Token text: identifiers carry their name, numeric literals their raw source
 * text, string literals their unquoted value, boolean literals "true"/"false".
 */

use super::span::Span;
use serde::{Deserialize, Serialize};

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable category discriminator of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    Script,

    // Statements
    Block,
    Empty,
    ExpressionStatement,
    VariableStatement,
    VariableDeclaration,
    If,
    While,
    DoWhile,
    For,
    ForIn,
    ForOf,
    Continue,
    Break,
    Return,
    Throw,
    Try,
    CatchClause,
    FinallyClause,
    Switch,
    CaseClause,
    DefaultClause,
    Labelled,
    With,
    Debugger,
    FunctionDeclaration,
    ClassDeclaration,
    ImportDeclaration,
    ExportDeclaration,

    // Names and bindings
    IdentifierReference,
    BindingIdentifier,
    IdentifierName,
    InitializedBinding,

    // Literals
    NullLiteral,
    BooleanLiteral,
    NumericLiteral,
    StringLiteral,
    TemplateLiteral,
    RegExpLiteral,
    ArrayLiteral,
    ObjectLiteral,
    PairProperty,
    ComputedPropertyName,
    SpreadElement,

    // Primary expressions
    This,
    Super,
    FunctionExpression,
    ArrowFunction,
    ClassExpression,
    Parenthesised,

    // Member access and calls
    DotMember,
    BracketMember,
    Call,
    New,

    // Expressions with internal control flow
    Conditional,
    LogicalAnd,
    LogicalOr,
    NullishCoalescing,
    Comma,

    // Assignment
    Assignment,
    PlusAssignment,
    MinusAssignment,
    MultiplyAssignment,
    DivideAssignment,
    RemainderAssignment,
    ExponentAssignment,
    LeftShiftAssignment,
    RightShiftAssignment,
    UnsignedRightShiftAssignment,
    BitwiseAndAssignment,
    BitwiseOrAssignment,
    BitwiseXorAssignment,
    /// `&&=`, `||=` and `??=`
    LogicalAssignment,

    // Binary operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    In,
    InstanceOf,

    // Unary operators
    LogicalNot,
    UnaryPlus,
    UnaryMinus,
    BitwiseComplement,
    TypeOf,
    Void,
    Delete,
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
    Await,
    Yield,
}

impl SyntaxKind {
    /// Statement-level kinds (never produce a value on the evaluation stack)
    pub fn is_statement(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            Script
                | Block
                | Empty
                | ExpressionStatement
                | VariableStatement
                | VariableDeclaration
                | If
                | While
                | DoWhile
                | For
                | ForIn
                | ForOf
                | Continue
                | Break
                | Return
                | Throw
                | Try
                | CatchClause
                | FinallyClause
                | Switch
                | CaseClause
                | DefaultClause
                | Labelled
                | With
                | Debugger
                | FunctionDeclaration
                | ClassDeclaration
                | ImportDeclaration
                | ExportDeclaration
        )
    }

    pub fn is_loop(self) -> bool {
        matches!(
            self,
            SyntaxKind::While
                | SyntaxKind::DoWhile
                | SyntaxKind::For
                | SyntaxKind::ForIn
                | SyntaxKind::ForOf
        )
    }

    pub fn is_member_access(self) -> bool {
        matches!(self, SyntaxKind::DotMember | SyntaxKind::BracketMember)
    }

    /// `- * / % **`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            SyntaxKind::Minus
                | SyntaxKind::Multiply
                | SyntaxKind::Divide
                | SyntaxKind::Remainder
                | SyntaxKind::Exponent
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            SyntaxKind::LeftShift
                | SyntaxKind::RightShift
                | SyntaxKind::UnsignedRightShift
                | SyntaxKind::BitwiseAnd
                | SyntaxKind::BitwiseOr
                | SyntaxKind::BitwiseXor
        )
    }

    /// Comparison, equality, `in` and `instanceof`
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            SyntaxKind::Equal
                | SyntaxKind::NotEqual
                | SyntaxKind::StrictEqual
                | SyntaxKind::StrictNotEqual
                | SyntaxKind::Less
                | SyntaxKind::Greater
                | SyntaxKind::LessOrEqual
                | SyntaxKind::GreaterOrEqual
                | SyntaxKind::In
                | SyntaxKind::InstanceOf
        )
    }

    /// Binary operators whose two operands are both evaluated unconditionally
    pub fn is_simple_binary(self) -> bool {
        self == SyntaxKind::Plus
            || self.is_arithmetic()
            || self.is_bitwise()
            || self.is_relational()
            || self == SyntaxKind::Comma
    }

    pub fn is_increment_or_decrement(self) -> bool {
        matches!(
            self,
            SyntaxKind::PrefixIncrement
                | SyntaxKind::PrefixDecrement
                | SyntaxKind::PostfixIncrement
                | SyntaxKind::PostfixDecrement
        )
    }

    pub fn is_unary_numeric(self) -> bool {
        matches!(
            self,
            SyntaxKind::UnaryPlus | SyntaxKind::UnaryMinus | SyntaxKind::BitwiseComplement
        ) || self.is_increment_or_decrement()
    }

    pub fn is_unary(self) -> bool {
        self.is_unary_numeric()
            || matches!(
                self,
                SyntaxKind::LogicalNot
                    | SyntaxKind::TypeOf
                    | SyntaxKind::Void
                    | SyntaxKind::Delete
                    | SyntaxKind::Await
                    | SyntaxKind::Yield
            )
    }

    pub fn is_compound_assignment(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            PlusAssignment
                | MinusAssignment
                | MultiplyAssignment
                | DivideAssignment
                | RemainderAssignment
                | ExponentAssignment
                | LeftShiftAssignment
                | RightShiftAssignment
                | UnsignedRightShiftAssignment
                | BitwiseAndAssignment
                | BitwiseOrAssignment
                | BitwiseXorAssignment
                | LogicalAssignment
        )
    }

    pub fn is_assignment(self) -> bool {
        self == SyntaxKind::Assignment || self.is_compound_assignment()
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::NullLiteral
                | SyntaxKind::BooleanLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TemplateLiteral
                | SyntaxKind::RegExpLiteral
        )
    }

    pub fn is_identifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::IdentifierReference | SyntaxKind::BindingIdentifier
        )
    }

    pub fn as_str(self) -> &'static str {
        use SyntaxKind::*;
        match self {
            Script => "script",
            Block => "block",
            Empty => "empty",
            ExpressionStatement => "expression_statement",
            VariableStatement => "variable_statement",
            VariableDeclaration => "variable_declaration",
            If => "if",
            While => "while",
            DoWhile => "do_while",
            For => "for",
            ForIn => "for_in",
            ForOf => "for_of",
            Continue => "continue",
            Break => "break",
            Return => "return",
            Throw => "throw",
            Try => "try",
            CatchClause => "catch",
            FinallyClause => "finally",
            Switch => "switch",
            CaseClause => "case",
            DefaultClause => "default",
            Labelled => "labelled",
            With => "with",
            Debugger => "debugger",
            FunctionDeclaration => "function_declaration",
            ClassDeclaration => "class_declaration",
            ImportDeclaration => "import_declaration",
            ExportDeclaration => "export_declaration",
            IdentifierReference => "identifier_reference",
            BindingIdentifier => "binding_identifier",
            IdentifierName => "identifier_name",
            InitializedBinding => "initialized_binding",
            NullLiteral => "null",
            BooleanLiteral => "boolean",
            NumericLiteral => "number",
            StringLiteral => "string",
            TemplateLiteral => "template",
            RegExpLiteral => "regexp",
            ArrayLiteral => "array",
            ObjectLiteral => "object",
            PairProperty => "pair",
            ComputedPropertyName => "computed_property_name",
            SpreadElement => "spread",
            This => "this",
            Super => "super",
            FunctionExpression => "function_expression",
            ArrowFunction => "arrow_function",
            ClassExpression => "class_expression",
            Parenthesised => "parenthesised",
            DotMember => "dot_member",
            BracketMember => "bracket_member",
            Call => "call",
            New => "new",
            Conditional => "conditional",
            LogicalAnd => "&&",
            LogicalOr => "||",
            NullishCoalescing => "??",
            Comma => ",",
            Assignment => "=",
            PlusAssignment => "+=",
            MinusAssignment => "-=",
            MultiplyAssignment => "*=",
            DivideAssignment => "/=",
            RemainderAssignment => "%=",
            ExponentAssignment => "**=",
            LeftShiftAssignment => "<<=",
            RightShiftAssignment => ">>=",
            UnsignedRightShiftAssignment => ">>>=",
            BitwiseAndAssignment => "&=",
            BitwiseOrAssignment => "|=",
            BitwiseXorAssignment => "^=",
            LogicalAssignment => "logical_assignment",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Remainder => "%",
            Exponent => "**",
            LeftShift => "<<",
            RightShift => ">>",
            UnsignedRightShift => ">>>",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            Equal => "==",
            NotEqual => "!=",
            StrictEqual => "===",
            StrictNotEqual => "!==",
            Less => "<",
            Greater => ">",
            LessOrEqual => "<=",
            GreaterOrEqual => ">=",
            In => "in",
            InstanceOf => "instanceof",
            LogicalNot => "!",
            UnaryPlus => "unary +",
            UnaryMinus => "unary -",
            BitwiseComplement => "~",
            TypeOf => "typeof",
            Void => "void",
            Delete => "delete",
            PrefixIncrement => "prefix ++",
            PrefixDecrement => "prefix --",
            PostfixIncrement => "postfix ++",
            PostfixDecrement => "postfix --",
            Await => "await",
            Yield => "yield",
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single node of the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    /// Identifier name, literal text or label
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SyntaxNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Immutable syntax tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Node lookup. `id` must come from this tree.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn is(&self, id: NodeId, kind: SyntaxKind) -> bool {
        self.kind(id) == kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Child at `index` unless it is an `Empty` placeholder
    pub fn present_child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.child(id, index)
            .filter(|child| !self.is(*child, SyntaxKind::Empty))
    }

    /// First child of the given kind
    pub fn child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.is(*child, kind))
    }

    /// Strip any number of enclosing parentheses
    pub fn skip_parentheses(&self, mut id: NodeId) -> NodeId {
        while self.is(id, SyntaxKind::Parenthesised) {
            match self.child(id, 0) {
                Some(inner) => id = inner,
                None => break,
            }
        }
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index as u32), node))
    }
}

/// Mutable construction phase of a [`SyntaxTree`]
///
/// Children must be created before their parent; `node` wires the parent
/// links.
#[derive(Debug, Default)]
pub struct SyntaxTreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: SyntaxKind, span: Span, text: Option<String>, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(SyntaxNode {
            kind,
            span,
            text,
            parent: None,
            children,
        });
        id
    }

    /// Node without children or text (`this`, `null`, `;`, `debugger`)
    pub fn leaf(&mut self, kind: SyntaxKind, span: Span) -> NodeId {
        self.push(kind, span, None, Vec::new())
    }

    /// Node carrying token text (identifiers, literals, labelled jumps)
    pub fn token(&mut self, kind: SyntaxKind, span: Span, text: impl Into<String>) -> NodeId {
        self.push(kind, span, Some(text.into()), Vec::new())
    }

    pub fn node(
        &mut self,
        kind: SyntaxKind,
        span: Span,
        children: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let children = children.into_iter().collect();
        self.push(kind, span, None, children)
    }

    pub fn node_with_text(
        &mut self,
        kind: SyntaxKind,
        span: Span,
        text: impl Into<String>,
        children: impl IntoIterator<Item = NodeId>,
    ) -> NodeId {
        let children = children.into_iter().collect();
        self.push(kind, span, Some(text.into()), children)
    }

    pub fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn finish(self) -> SyntaxTree {
        SyntaxTree { nodes: self.nodes }
    }
}
