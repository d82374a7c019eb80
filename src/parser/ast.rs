// Syntax tree definitions for the front end

use std::fmt;

/// Half-open span `[start, end)` in character offsets into the parsed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Position and origin metadata carried by every syntax node.
///
/// The span is fixed when the node is sealed and never widens backward;
/// `disabled_warnings` is the set of diagnostic codes suppressed at the
/// node's start (inherited from the enclosing `#pragma warning` scope).
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub span: Span,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub disabled_warnings: Vec<u32>,
}

/// Built-in value and reference types with dedicated keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Object,
    Void,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Char => "char",
            PrimitiveKind::String => "string",
            PrimitiveKind::Object => "object",
            PrimitiveKind::Void => "void",
        };
        write!(f, "{}", name)
    }
}

/// One dotted segment of a named type, with its generic arguments.
#[derive(Debug, Clone)]
pub struct TypeSegment {
    pub name: String,
    pub type_args: Vec<TypeRef>,
}

/// Type reference as written in source.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Primitive {
        kind: PrimitiveKind,
        info: NodeInfo,
    },
    Named {
        segments: Vec<TypeSegment>,
        info: NodeInfo,
    },
    Array {
        element: Box<TypeRef>,
        /// Number of dimensions in this rank specifier: `[]` is 1, `[,]` is 2.
        rank: usize,
        info: NodeInfo,
    },
}

impl TypeRef {
    pub fn info(&self) -> &NodeInfo {
        match self {
            TypeRef::Primitive { info, .. }
            | TypeRef::Named { info, .. }
            | TypeRef::Array { info, .. } => info,
        }
    }
}

/// Declaration modifiers. Stored as a set: a repeated modifier is a
/// recoverable diagnostic, not a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Virtual,
    Override,
    Readonly,
    Partial,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Readonly => "readonly",
            Modifier::Partial => "partial",
        }
    }
}

/// Declared accessibility, ordered from least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Accessibility {
    Public,
    Protected,
    Private,
}

impl Accessibility {
    /// Accessibility implied by a modifier set; no access modifier means
    /// private.
    pub fn of(modifiers: &[Modifier]) -> Self {
        if modifiers.contains(&Modifier::Public) {
            Accessibility::Public
        } else if modifiers.contains(&Modifier::Protected) {
            Accessibility::Protected
        } else {
            Accessibility::Private
        }
    }
}

/// One annotation inside a bracketed annotation section: `[Name(args)]`.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<Expr>,
    pub info: NodeInfo,
}

/// `using a.b.c;` import directive at the top of a compilation unit.
#[derive(Debug, Clone)]
pub struct UsingDirective {
    pub path: Vec<String>,
    pub info: NodeInfo,
}

/// Root of the tree for one source file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub usings: Vec<UsingDirective>,
    pub declarations: Vec<Declaration>,
    pub info: NodeInfo,
}

/// Generic type parameter name in a declaration header.
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub info: NodeInfo,
}

/// `where T : Base, Interface` constraint clause.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub type_param: String,
    pub bounds: Vec<TypeRef>,
    pub info: NodeInfo,
}

/// Formal parameter. `param_type` is `None` only for inferred lambda
/// parameters.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub param_type: Option<TypeRef>,
    pub info: NodeInfo,
}

/// Top-level and nested type declarations.
#[derive(Debug, Clone)]
pub enum Declaration {
    Package {
        name: Vec<String>,
        annotations: Vec<Annotation>,
        declarations: Vec<Declaration>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Class {
        name: String,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        type_params: Vec<TypeParam>,
        bases: Vec<TypeRef>,
        constraints: Vec<Constraint>,
        members: Vec<Member>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Interface {
        name: String,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        type_params: Vec<TypeParam>,
        bases: Vec<TypeRef>,
        constraints: Vec<Constraint>,
        members: Vec<Member>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Enum {
        name: String,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        constants: Vec<EnumConstant>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Delegate {
        name: String,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        return_type: TypeRef,
        type_params: Vec<TypeParam>,
        params: Vec<Param>,
        constraints: Vec<Constraint>,
        doc: Option<String>,
        info: NodeInfo,
    },
}

impl Declaration {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Declaration::Package { info, .. }
            | Declaration::Class { info, .. }
            | Declaration::Interface { info, .. }
            | Declaration::Enum { info, .. }
            | Declaration::Delegate { info, .. } => info,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Declaration::Package { doc, .. }
            | Declaration::Class { doc, .. }
            | Declaration::Interface { doc, .. }
            | Declaration::Enum { doc, .. }
            | Declaration::Delegate { doc, .. } => doc.as_deref(),
        }
    }
}

/// One constant inside an enum body.
#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub value: Option<Expr>,
    pub doc: Option<String>,
    pub info: NodeInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
}

/// Property or indexer accessor. `synthesized` marks accessors produced by
/// auto-property shorthand rather than written in source.
#[derive(Debug, Clone)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub body: Option<Block>,
    pub synthesized: bool,
    pub info: NodeInfo,
}

/// Class and interface members.
#[derive(Debug, Clone)]
pub enum Member {
    Field {
        name: String,
        field_type: TypeRef,
        initializer: Option<Expr>,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Method {
        name: String,
        return_type: TypeRef,
        type_params: Vec<TypeParam>,
        params: Vec<Param>,
        constraints: Vec<Constraint>,
        /// None for abstract and interface methods.
        body: Option<Block>,
        /// Interface members may declare a default value: `int Size() = 4;`
        default_value: Option<Expr>,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Property {
        name: String,
        property_type: TypeRef,
        get_accessor: Option<Accessor>,
        set_accessor: Option<Accessor>,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Indexer {
        parameters: Vec<Param>,
        value_type: TypeRef,
        get_accessor: Option<Accessor>,
        set_accessor: Option<Accessor>,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Constructor {
        name: String,
        type_params: Vec<TypeParam>,
        params: Vec<Param>,
        constraints: Vec<Constraint>,
        body: Block,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Destructor {
        name: String,
        body: Block,
        modifiers: Vec<Modifier>,
        annotations: Vec<Annotation>,
        doc: Option<String>,
        info: NodeInfo,
    },
    Nested(Declaration),
}

impl Member {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Member::Field { info, .. }
            | Member::Method { info, .. }
            | Member::Property { info, .. }
            | Member::Indexer { info, .. }
            | Member::Constructor { info, .. }
            | Member::Destructor { info, .. } => info,
            Member::Nested(decl) => decl.info(),
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Member::Field { doc, .. }
            | Member::Method { doc, .. }
            | Member::Property { doc, .. }
            | Member::Indexer { doc, .. }
            | Member::Constructor { doc, .. }
            | Member::Destructor { doc, .. } => doc.as_deref(),
            Member::Nested(decl) => decl.doc(),
        }
    }
}

/// Brace-delimited statement list.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub info: NodeInfo,
}

/// One `name [= initializer]` inside a local or field declaration.
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub initializer: Option<Expr>,
    pub info: NodeInfo,
}

/// Initializer clause of a `for` statement.
#[derive(Debug, Clone)]
pub enum ForInit {
    /// `decl_type` is `None` for `var`-led declarations.
    Declaration {
        decl_type: Option<TypeRef>,
        declarators: Vec<Declarator>,
    },
    Expressions(Vec<Expr>),
}

/// Resource clause of a `using` statement.
#[derive(Debug, Clone)]
pub enum UsingResource {
    Declaration {
        decl_type: Option<TypeRef>,
        declarators: Vec<Declarator>,
    },
    Expression(Expr),
}

#[derive(Debug, Clone)]
pub enum SwitchLabel {
    Case { value: Expr, info: NodeInfo },
    Default { info: NodeInfo },
}

/// One run of consecutive case/default labels plus the statements that
/// follow them.
#[derive(Debug, Clone)]
pub struct SwitchSection {
    pub labels: Vec<SwitchLabel>,
    pub statements: Vec<Stmt>,
    pub info: NodeInfo,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub exception_type: Option<TypeRef>,
    pub name: Option<String>,
    pub body: Block,
    pub info: NodeInfo,
}

#[derive(Debug, Clone)]
pub enum GotoTarget {
    Label(String),
    Case(Expr),
    Default,
}

/// Statement nodes.
#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Block),
    Empty {
        info: NodeInfo,
    },
    Labeled {
        label: String,
        statement: Box<Stmt>,
        info: NodeInfo,
    },
    LocalDecl {
        /// `None` for `var` declarations.
        decl_type: Option<TypeRef>,
        declarators: Vec<Declarator>,
        info: NodeInfo,
    },
    Expression {
        expr: Expr,
        info: NodeInfo,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        info: NodeInfo,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        info: NodeInfo,
    },
    Do {
        body: Box<Stmt>,
        condition: Expr,
        info: NodeInfo,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Expr>,
        increment: Vec<Expr>,
        body: Box<Stmt>,
        info: NodeInfo,
    },
    Foreach {
        /// `None` for `var`.
        var_type: Option<TypeRef>,
        name: String,
        iterable: Expr,
        body: Box<Stmt>,
        info: NodeInfo,
    },
    Switch {
        scrutinee: Expr,
        sections: Vec<SwitchSection>,
        info: NodeInfo,
    },
    Try {
        body: Block,
        catches: Vec<CatchClause>,
        finally_block: Option<Block>,
        info: NodeInfo,
    },
    Using {
        resource: UsingResource,
        body: Box<Stmt>,
        info: NodeInfo,
    },
    Synchronized {
        monitor: Expr,
        body: Box<Stmt>,
        info: NodeInfo,
    },
    Return {
        value: Option<Expr>,
        info: NodeInfo,
    },
    Throw {
        value: Option<Expr>,
        info: NodeInfo,
    },
    Break {
        info: NodeInfo,
    },
    Continue {
        info: NodeInfo,
    },
    Goto {
        target: GotoTarget,
        info: NodeInfo,
    },
    YieldReturn {
        value: Expr,
        info: NodeInfo,
    },
    YieldBreak {
        info: NodeInfo,
    },
}

impl Stmt {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Stmt::Block(block) => &block.info,
            Stmt::Empty { info }
            | Stmt::Labeled { info, .. }
            | Stmt::LocalDecl { info, .. }
            | Stmt::Expression { info, .. }
            | Stmt::If { info, .. }
            | Stmt::While { info, .. }
            | Stmt::Do { info, .. }
            | Stmt::For { info, .. }
            | Stmt::Foreach { info, .. }
            | Stmt::Switch { info, .. }
            | Stmt::Try { info, .. }
            | Stmt::Using { info, .. }
            | Stmt::Synchronized { info, .. }
            | Stmt::Return { info, .. }
            | Stmt::Throw { info, .. }
            | Stmt::Break { info }
            | Stmt::Continue { info }
            | Stmt::Goto { info, .. }
            | Stmt::YieldReturn { info, .. }
            | Stmt::YieldBreak { info } => info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Real(f64),
    Char(char),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,     // -x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
}

/// Binary operators in the grammar's precedence table. Note that this
/// grammar binds `&&`/`||` tighter than `&`/`^`/`|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    ShrUnsigned,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    LogicalAnd,
    Xor,
    LogicalOr,
    BitAnd,
    BitOr,
    Coalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expression(Box<Expr>),
    Block(Block),
}

/// Leading `from` clause of a query expression.
#[derive(Debug, Clone)]
pub struct FromClause {
    /// Explicit range variable type, if written.
    pub var_type: Option<TypeRef>,
    pub name: String,
    pub source: Box<Expr>,
    pub info: NodeInfo,
}

#[derive(Debug, Clone)]
pub struct QueryOrdering {
    pub expr: Expr,
    pub descending: bool,
}

/// Body clauses between the leading `from` and the terminal clause.
#[derive(Debug, Clone)]
pub enum QueryClause {
    From(FromClause),
    Let {
        name: String,
        value: Expr,
        info: NodeInfo,
    },
    Where {
        condition: Expr,
        info: NodeInfo,
    },
    Join {
        var_type: Option<TypeRef>,
        name: String,
        source: Expr,
        on: Expr,
        equals: Expr,
        into: Option<String>,
        info: NodeInfo,
    },
    OrderBy {
        orderings: Vec<QueryOrdering>,
        info: NodeInfo,
    },
}

#[derive(Debug, Clone)]
pub enum QueryTerminal {
    Select {
        expr: Box<Expr>,
        info: NodeInfo,
    },
    GroupBy {
        element: Box<Expr>,
        key: Box<Expr>,
        info: NodeInfo,
    },
}

/// Ordered clause list of a query, ending in `select` or `group ... by`,
/// optionally continued with `into name <body>`.
#[derive(Debug, Clone)]
pub struct QueryBody {
    pub clauses: Vec<QueryClause>,
    pub terminal: QueryTerminal,
    pub continuation: Option<QueryContinuation>,
}

#[derive(Debug, Clone)]
pub struct QueryContinuation {
    pub name: String,
    pub body: Box<QueryBody>,
}

/// One `name = value` (or positional `value`) inside `new { ... }`.
#[derive(Debug, Clone)]
pub struct AnonymousMember {
    pub name: Option<String>,
    pub value: Expr,
    pub info: NodeInfo,
}

/// Expression nodes.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: LiteralValue,
        info: NodeInfo,
    },
    Name {
        name: String,
        type_args: Vec<TypeRef>,
        info: NodeInfo,
    },
    MemberAccess {
        target: Box<Expr>,
        member: String,
        type_args: Vec<TypeRef>,
        null_safe: bool,
        info: NodeInfo,
    },
    Invocation {
        target: Box<Expr>,
        arguments: Vec<Expr>,
        info: NodeInfo,
    },
    ElementAccess {
        target: Box<Expr>,
        indices: Vec<Expr>,
        info: NodeInfo,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        info: NodeInfo,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        info: NodeInfo,
    },
    /// `expr as Type`
    TypeAs {
        expr: Box<Expr>,
        target_type: TypeRef,
        info: NodeInfo,
    },
    /// `expr instanceof Type`
    TypeCheck {
        expr: Box<Expr>,
        target_type: TypeRef,
        info: NodeInfo,
    },
    Conditional {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
        info: NodeInfo,
    },
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
        info: NodeInfo,
    },
    Parenthesized {
        expr: Box<Expr>,
        info: NodeInfo,
    },
    Lambda {
        params: Vec<Param>,
        body: LambdaBody,
        info: NodeInfo,
    },
    Query {
        from: FromClause,
        body: QueryBody,
        info: NodeInfo,
    },
    ObjectCreation {
        created_type: TypeRef,
        arguments: Vec<Expr>,
        initializer: Option<Vec<Expr>>,
        info: NodeInfo,
    },
    AnonymousObject {
        members: Vec<AnonymousMember>,
        info: NodeInfo,
    },
    ArrayCreation {
        /// `None` for implicitly typed arrays (`new[] { ... }`).
        element_type: Option<TypeRef>,
        sizes: Vec<Expr>,
        /// Additional implicit `[,,]` rank specifiers after the sized one.
        extra_rank: usize,
        initializer: Option<Vec<Expr>>,
        info: NodeInfo,
    },
    /// Nested `{ ... }` element list inside an array or collection
    /// initializer.
    CollectionInitializer {
        elements: Vec<Expr>,
        info: NodeInfo,
    },
    Cast {
        target_type: TypeRef,
        expr: Box<Expr>,
        info: NodeInfo,
    },
    SizeOf {
        target_type: TypeRef,
        info: NodeInfo,
    },
    TypeOf {
        target_type: TypeRef,
        info: NodeInfo,
    },
    This {
        info: NodeInfo,
    },
    Super {
        info: NodeInfo,
    },
    /// A primitive type keyword used in expression position. Only legal as
    /// the left operand of `as`/`instanceof`; anything else is rejected by
    /// the parser.
    TypeExpression {
        type_ref: TypeRef,
        info: NodeInfo,
    },
}

impl Expr {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Expr::Literal { info, .. }
            | Expr::Name { info, .. }
            | Expr::MemberAccess { info, .. }
            | Expr::Invocation { info, .. }
            | Expr::ElementAccess { info, .. }
            | Expr::Unary { info, .. }
            | Expr::Binary { info, .. }
            | Expr::TypeAs { info, .. }
            | Expr::TypeCheck { info, .. }
            | Expr::Conditional { info, .. }
            | Expr::Assign { info, .. }
            | Expr::Parenthesized { info, .. }
            | Expr::Lambda { info, .. }
            | Expr::Query { info, .. }
            | Expr::ObjectCreation { info, .. }
            | Expr::AnonymousObject { info, .. }
            | Expr::ArrayCreation { info, .. }
            | Expr::CollectionInitializer { info, .. }
            | Expr::Cast { info, .. }
            | Expr::SizeOf { info, .. }
            | Expr::TypeOf { info, .. }
            | Expr::This { info }
            | Expr::Super { info }
            | Expr::TypeExpression { info, .. } => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(start: usize, end: usize) -> NodeInfo {
        NodeInfo {
            span: Span::new(start, end),
            file: "test".to_string(),
            line: 1,
            column: 1,
            disabled_warnings: Vec::new(),
        }
    }

    #[test]
    fn test_span_containment() {
        let outer = Span::new(0, 10);
        assert!(outer.contains(&Span::new(0, 10)));
        assert!(outer.contains(&Span::new(3, 7)));
        assert!(!outer.contains(&Span::new(3, 11)));
    }

    #[test]
    fn test_accessibility_ordering() {
        assert!(Accessibility::Public < Accessibility::Protected);
        assert!(Accessibility::Protected < Accessibility::Private);
        assert_eq!(
            Accessibility::of(&[Modifier::Static, Modifier::Protected]),
            Accessibility::Protected
        );
        assert_eq!(Accessibility::of(&[Modifier::Static]), Accessibility::Private);
    }

    #[test]
    fn test_expr_info_accessor() {
        let expr = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::Literal {
                value: LiteralValue::Int(1),
                info: info(0, 1),
            }),
            right: Box::new(Expr::Literal {
                value: LiteralValue::Int(2),
                info: info(4, 5),
            }),
            info: info(0, 5),
        };
        assert_eq!(expr.info().span, Span::new(0, 5));
    }
}
