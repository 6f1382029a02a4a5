//! AST node model.
//!
//! A single closed sum type: every syntactic form is a [`NodeKind`] variant,
//! and every node carries a [`NodeBase`] with its span, an optional parsing
//! error, and the parenthesization flag. Children are owned by value
//! (`Box<Node>` / `Vec<Node>`); there are no shared subtrees and no parent
//! pointers — ancestor context is threaded through the walker.

mod operators;

pub use operators::{
    AssignmentOperator, BinaryOperator, ByteSliceBase, MarkupPatternQuantifier, Quantifier,
    UnaryOperator,
};

use crate::{Span, Token};
use quill_diagnostic::ParsingError;
use smallvec::SmallVec;

/// Fields shared by every node.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NodeBase {
    pub span: Span,
    /// At most one error; the first concrete error wins.
    pub err: Option<ParsingError>,
    /// True iff the node was directly wrapped in `(` `)`.
    pub parenthesized: bool,
}

impl NodeBase {
    pub fn new(span: Span) -> Self {
        NodeBase {
            span,
            err: None,
            parenthesized: false,
        }
    }

    pub fn with_error(span: Span, err: ParsingError) -> Self {
        NodeBase {
            span,
            err: Some(err),
            parenthesized: false,
        }
    }
}

/// Result of the optional hyperscript sub-parser, attached to a
/// hyperscript attribute shorthand on success.
#[derive(Clone, Debug, PartialEq)]
pub struct HyperscriptParsingResult {
    /// Tokens produced by the hyperscript sub-parser.
    pub tokens: Vec<Token>,
    pub source: Box<str>,
}

/// An AST node: common base plus the variant payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub base: NodeBase,
    pub kind: NodeKind,
}

/// All syntactic forms.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    // ===== Atoms =====
    IntLiteral {
        value: i64,
        raw: Box<str>,
    },
    FloatLiteral {
        value: f64,
        raw: Box<str>,
    },
    /// Number immediately followed by one or more units: `1h30m`.
    QuantityLiteral {
        values: Vec<f64>,
        units: Vec<Box<str>>,
        raw: Box<str>,
    },
    /// Quantity divided by a unit: `1MB/s`.
    RateLiteral {
        values: Vec<f64>,
        units: Vec<Box<str>>,
        div_unit: Box<str>,
        raw: Box<str>,
    },
    PortLiteral {
        port_number: u16,
        scheme_name: Option<Box<str>>,
        raw: Box<str>,
    },
    YearLiteral {
        year: i32,
        location: Box<str>,
        raw: Box<str>,
    },
    DateLiteral {
        year: i32,
        month: u32,
        day: u32,
        location: Box<str>,
        raw: Box<str>,
    },
    DateTimeLiteral {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
        microsecond: u32,
        location: Box<str>,
        raw: Box<str>,
    },
    RuneLiteral {
        value: char,
    },
    ByteSliceLiteral {
        base: ByteSliceBase,
        bytes: Vec<u8>,
        raw: Box<str>,
    },
    BooleanLiteral {
        value: bool,
    },
    NilLiteral,
    IdentifierLiteral {
        name: Box<str>,
    },
    /// `$name`
    Variable {
        name: Box<str>,
    },
    /// `$$name`
    GlobalVariable {
        name: Box<str>,
    },
    /// `.name`
    PropertyNameLiteral {
        name: Box<str>,
    },
    /// `.a.b.c`
    LongValuePathLiteral {
        segments: Vec<Node>,
    },
    /// `--flag` or `-f`
    FlagLiteral {
        name: Box<str>,
        single_dash: bool,
        raw: Box<str>,
    },
    /// `#name`
    UnambiguousIdentifierLiteral {
        name: Box<str>,
    },
    RegexLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    UnquotedStringLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    QuotedStringLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    MultilineStringLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    SelfExpression,

    // ===== Object-like =====
    ObjectLiteral {
        properties: Vec<Node>,
    },
    RecordLiteral {
        properties: Vec<Node>,
    },
    ObjectProperty {
        key: Option<Box<Node>>,
        type_annotation: Option<Box<Node>>,
        value: Option<Box<Node>>,
    },
    PropertySpreadElement {
        expr: Box<Node>,
    },
    ObjectMetaProperty {
        key: Box<Node>,
        initialization: Box<Node>,
    },
    InitializationBlock {
        statements: Vec<Node>,
    },
    ObjectPatternLiteral {
        properties: Vec<Node>,
        exact: bool,
    },
    RecordPatternLiteral {
        properties: Vec<Node>,
        exact: bool,
    },
    ObjectPatternProperty {
        key: Option<Box<Node>>,
        value: Option<Box<Node>>,
        optional: bool,
    },
    PatternPropertySpreadElement {
        expr: Box<Node>,
    },
    /// `otherprops(pattern)` inside an object pattern.
    OtherPropsExpr {
        pattern: Box<Node>,
    },
    ListLiteral {
        elements: Vec<Node>,
    },
    TupleLiteral {
        elements: Vec<Node>,
    },
    ListPatternLiteral {
        elements: Vec<Node>,
        general_element: Option<Box<Node>>,
    },
    TuplePatternLiteral {
        elements: Vec<Node>,
        general_element: Option<Box<Node>>,
    },
    ElementSpreadElement {
        expr: Box<Node>,
    },
    DictionaryLiteral {
        entries: Vec<Node>,
    },
    DictionaryEntry {
        key: Box<Node>,
        value: Option<Box<Node>>,
    },
    /// `.{a, b}`
    KeyListExpression {
        keys: Vec<Node>,
    },

    // ===== Paths =====
    AbsolutePathLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    RelativePathLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    AbsolutePathExpression {
        slices: Vec<Node>,
    },
    RelativePathExpression {
        slices: Vec<Node>,
    },
    AbsolutePathPatternLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    RelativePathPatternLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    PathPatternExpression {
        slices: Vec<Node>,
    },
    NamedSegmentPathPatternLiteral {
        slices: Vec<Node>,
        raw: Box<str>,
    },
    PathSlice {
        value: Box<str>,
    },
    PathPatternSlice {
        value: Box<str>,
    },
    /// `{:name}` in a path pattern.
    NamedPathSegment {
        name: Box<str>,
    },
    InvalidPathPattern {
        value: Box<str>,
    },

    // ===== URLs, hosts, ports =====
    /// `https://` — a scheme followed by `://` and nothing else.
    SchemeLiteral {
        name: Box<str>,
    },
    HostLiteral {
        value: Box<str>,
    },
    HostExpression {
        scheme: Box<Node>,
        host: Box<Node>,
        raw: Box<str>,
    },
    HostPatternLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    UrlLiteral {
        value: Box<str>,
    },
    UrlExpression {
        raw: Box<str>,
        host_part: Box<Node>,
        path: Vec<Node>,
        query_params: Vec<Node>,
    },
    UrlPatternLiteral {
        value: Box<str>,
        raw: Box<str>,
    },
    UrlQueryParameter {
        name: Box<str>,
        value: Vec<Node>,
    },
    UrlQueryParameterValueSlice {
        value: Box<str>,
    },
    InvalidUrl {
        value: Box<str>,
    },
    InvalidUrlPattern {
        value: Box<str>,
    },

    // ===== Operations =====
    UnaryExpression {
        operator: UnaryOperator,
        operand: Box<Node>,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `expr?`
    BooleanConversionExpression {
        expr: Box<Node>,
    },
    /// `~expr`
    RuntimeTypeCheckExpression {
        expr: Box<Node>,
    },
    ConcatenationExpression {
        elements: Vec<Node>,
    },
    /// `%(expr)`
    PatternConversionExpression {
        expr: Box<Node>,
    },

    // ===== Access =====
    MemberExpression {
        object: Box<Node>,
        property_name: Box<Node>,
        optional: bool,
    },
    /// `obj.(expr)`
    ComputedMemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        optional: bool,
    },
    /// `obj.<name`
    DynamicMemberExpression {
        object: Box<Node>,
        property_name: Box<Node>,
    },
    /// `a.b.c` where `a` is an identifier: kept flat.
    IdentifierMemberExpression {
        left: Box<Node>,
        property_names: Vec<Node>,
    },
    IndexExpression {
        indexed: Box<Node>,
        index: Box<Node>,
    },
    SliceExpression {
        indexed: Box<Node>,
        start_index: Option<Box<Node>>,
        end_index: Option<Box<Node>>,
    },
    /// `obj.{a, b}`
    ExtractionExpression {
        object: Box<Node>,
        keys: Box<Node>,
    },
    DoubleColonExpression {
        left: Box<Node>,
        element: Option<Box<Node>>,
    },
    InvalidMemberLike {
        left: Box<Node>,
    },

    // ===== Control flow =====
    Block {
        statements: Vec<Node>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Option<Box<Node>>,
        alternate: Option<Box<Node>>,
    },
    IfExpression {
        test: Box<Node>,
        consequent: Option<Box<Node>>,
        alternate: Option<Box<Node>>,
    },
    ForStatement {
        key_pattern: Option<Box<Node>>,
        key_index_var: Option<Box<Node>>,
        value_pattern: Option<Box<Node>>,
        value_elem_var: Option<Box<Node>>,
        iterated_value: Option<Box<Node>>,
        chunked: bool,
        body: Option<Box<Node>>,
    },
    ForExpression {
        key_pattern: Option<Box<Node>>,
        key_index_var: Option<Box<Node>>,
        value_pattern: Option<Box<Node>>,
        value_elem_var: Option<Box<Node>>,
        iterated_value: Option<Box<Node>>,
        chunked: bool,
        body: Option<Box<Node>>,
    },
    WalkStatement {
        walked: Option<Box<Node>>,
        meta_variable: Option<Box<Node>>,
        entry_variable: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    WalkExpression {
        walked: Option<Box<Node>>,
        meta_variable: Option<Box<Node>>,
        entry_variable: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    SwitchStatement {
        discriminant: Option<Box<Node>>,
        cases: Vec<Node>,
        default_cases: Vec<Node>,
    },
    SwitchStatementCase {
        values: Vec<Node>,
        block: Option<Box<Node>>,
    },
    MatchStatement {
        discriminant: Option<Box<Node>>,
        cases: Vec<Node>,
        default_cases: Vec<Node>,
    },
    MatchStatementCase {
        values: Vec<Node>,
        group_matching_variable: Option<Box<Node>>,
        block: Option<Box<Node>>,
    },
    DefaultCaseWithBlock {
        block: Option<Box<Node>>,
    },
    SwitchExpression {
        discriminant: Option<Box<Node>>,
        cases: Vec<Node>,
        default_cases: Vec<Node>,
    },
    SwitchExpressionCase {
        values: Vec<Node>,
        result: Option<Box<Node>>,
    },
    MatchExpression {
        discriminant: Option<Box<Node>>,
        cases: Vec<Node>,
        default_cases: Vec<Node>,
    },
    MatchExpressionCase {
        values: Vec<Node>,
        group_matching_variable: Option<Box<Node>>,
        result: Option<Box<Node>>,
    },
    DefaultCaseWithResult {
        result: Option<Box<Node>>,
    },
    ReturnStatement {
        expr: Option<Box<Node>>,
    },
    YieldStatement {
        expr: Option<Box<Node>>,
    },
    CoyieldStatement {
        expr: Option<Box<Node>>,
    },
    BreakStatement,
    ContinueStatement,
    PruneStatement,
    AssertionStatement {
        expr: Box<Node>,
    },
    SynchronizedBlockStatement {
        synchronized_values: Vec<Node>,
        block: Option<Box<Node>>,
    },

    // ===== Declarations =====
    GlobalConstantDeclarations {
        declarations: Vec<Node>,
    },
    GlobalConstantDeclaration {
        left: Box<Node>,
        right: Option<Box<Node>>,
    },
    LocalVariableDeclarations {
        declarations: Vec<Node>,
    },
    LocalVariableDeclaration {
        left: Box<Node>,
        type_annotation: Option<Box<Node>>,
        right: Option<Box<Node>>,
    },
    GlobalVariableDeclarations {
        declarations: Vec<Node>,
    },
    GlobalVariableDeclaration {
        left: Box<Node>,
        type_annotation: Option<Box<Node>>,
        right: Option<Box<Node>>,
    },
    /// `{a, b as c, d?}` on the left of a `var`/`globalvar` declaration.
    ObjectDestructuration {
        properties: Vec<Node>,
    },
    ObjectDestructurationProperty {
        property_name: Box<Node>,
        new_name: Option<Box<Node>>,
        nillable: bool,
    },
    Assignment {
        operator: AssignmentOperator,
        left: Box<Node>,
        right: Option<Box<Node>>,
    },
    MultiAssignment {
        variables: Vec<Node>,
        right: Option<Box<Node>>,
        nillable: bool,
    },
    FunctionDeclaration {
        annotations: Option<Box<Node>>,
        function: Box<Node>,
        name: Box<Node>,
    },
    PatternDefinition {
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
        lazy: bool,
    },
    PatternNamespaceDefinition {
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    },
    ExtendStatement {
        extended_pattern: Option<Box<Node>>,
        extension: Option<Box<Node>>,
    },
    StructDefinition {
        name: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },
    StructBody {
        definitions: Vec<Node>,
    },
    StructFieldDefinition {
        name: Box<Node>,
        type_annotation: Box<Node>,
    },

    // ===== Functions & calls =====
    FunctionExpression {
        capture_list: Vec<Node>,
        parameters: Vec<Node>,
        is_variadic: bool,
        return_type: Option<Box<Node>>,
        is_body_expression: bool,
        body: Option<Box<Node>>,
    },
    FunctionPatternExpression {
        parameters: Vec<Node>,
        is_variadic: bool,
        return_type: Option<Box<Node>>,
    },
    FunctionParameter {
        var: Option<Box<Node>>,
        type_annotation: Option<Box<Node>>,
        is_variadic: bool,
    },
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
        /// `callee!(…)` — error-propagating call.
        must: bool,
        /// Parenthesis-less call used as a statement.
        command_like: bool,
    },
    SpreadArgument {
        expr: Box<Node>,
    },
    PatternCallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    NewExpression {
        type_node: Option<Box<Node>>,
        initialization: Option<Box<Node>>,
    },
    StructInitializationLiteral {
        fields: Vec<Node>,
    },
    StructFieldInitialization {
        name: Box<Node>,
        value: Option<Box<Node>>,
    },
    PointerType {
        value_type: Box<Node>,
    },
    DereferenceExpression {
        pointer: Box<Node>,
    },

    // ===== Patterns =====
    PatternIdentifierLiteral {
        name: Box<str>,
        unprefixed: bool,
    },
    PatternNamespaceIdentifierLiteral {
        name: Box<str>,
        unprefixed: bool,
    },
    PatternNamespaceMemberExpression {
        namespace: Box<Node>,
        member_name: Box<Node>,
    },
    PatternUnion {
        cases: Vec<Node>,
    },
    OptionalPatternExpression {
        pattern: Box<Node>,
    },
    ReadonlyPatternExpression {
        pattern: Box<Node>,
    },
    /// `str( elem elem … )`
    ComplexStringPatternPiece {
        elements: Vec<Node>,
    },
    PatternPieceElement {
        quantifier: Quantifier,
        exact_count: Option<u32>,
        group_name: Option<Box<Node>>,
        expr: Box<Node>,
    },
    PatternGroupName {
        name: Box<str>,
    },
    InvalidComplexStringPatternElement,
    OptionPatternLiteral {
        name: Box<str>,
        value: Option<Box<Node>>,
        single_dash: bool,
    },
    OptionExpression {
        name: Box<str>,
        value: Option<Box<Node>>,
        single_dash: bool,
    },
    RuneRangeExpression {
        lower: Box<Node>,
        upper: Option<Box<Node>>,
    },
    IntegerRangeLiteral {
        lower_bound: Box<Node>,
        upper_bound: Option<Box<Node>>,
    },
    FloatRangeLiteral {
        lower_bound: Box<Node>,
        upper_bound: Option<Box<Node>>,
    },
    QuantityRangeLiteral {
        lower_bound: Box<Node>,
        upper_bound: Option<Box<Node>>,
    },
    UpperBoundRangeExpression {
        upper_bound: Box<Node>,
    },

    // ===== Modules =====
    Chunk {
        global_constant_declarations: Option<Box<Node>>,
        includable_chunk_desc: Option<Box<Node>>,
        preinit: Option<Box<Node>>,
        manifest: Option<Box<Node>>,
        statements: Vec<Node>,
    },
    EmbeddedModule {
        manifest: Option<Box<Node>>,
        statements: Vec<Node>,
        single_call_expr: bool,
    },
    PreinitStatement {
        block: Option<Box<Node>>,
    },
    Manifest {
        object: Option<Box<Node>>,
    },
    IncludableChunkDescription,
    SpawnExpression {
        meta: Option<Box<Node>>,
        module: Option<Box<Node>>,
    },
    ImportStatement {
        identifier: Option<Box<Node>>,
        source: Option<Box<Node>>,
        configuration: Option<Box<Node>>,
    },
    InclusionImportStatement {
        source: Option<Box<Node>>,
    },

    // ===== Meta =====
    QuotedExpression {
        expr: Box<Node>,
    },
    QuotedStatements {
        statements: Vec<Node>,
    },
    UnquotedRegion {
        expr: Option<Box<Node>>,
        spread: bool,
    },
    /// `@ident`
    MetaIdentifier {
        name: Box<str>,
    },
    MetadataAnnotations {
        expressions: Vec<Node>,
    },
    AnnotatedRegionHeader {
        text: Box<Node>,
        annotations: Vec<Node>,
    },
    AnnotatedRegionHeaderText {
        value: Box<str>,
        raw: Box<str>,
    },
    MissingStatement {
        annotations: Option<Box<Node>>,
    },
    MissingExpression,
    UnknownNode,

    // ===== Markup =====
    MarkupExpression {
        namespace: Option<Box<Node>>,
        element: Box<Node>,
    },
    MarkupElement {
        opening: Box<Node>,
        children: Vec<Node>,
        closing: Option<Box<Node>>,
        raw_element_content: Option<Box<str>>,
    },
    MarkupOpeningTag {
        name: Option<Box<Node>>,
        attributes: Vec<Node>,
        self_closing: bool,
    },
    MarkupClosingTag {
        name: Option<Box<Node>>,
    },
    MarkupAttribute {
        name: Box<Node>,
        value: Option<Box<Node>>,
    },
    HyperscriptAttributeShorthand {
        value: Box<str>,
        result: Option<Box<HyperscriptParsingResult>>,
    },
    MarkupText {
        value: Box<str>,
        raw: Box<str>,
    },
    MarkupInterpolation {
        expr: Option<Box<Node>>,
    },
    MarkupPatternExpression {
        element: Box<Node>,
    },
    MarkupPatternElement {
        opening: Box<Node>,
        children: Vec<Node>,
        closing: Option<Box<Node>>,
    },
    MarkupPatternOpeningTag {
        name: Option<Box<Node>>,
        attributes: Vec<Node>,
        quantifier: MarkupPatternQuantifier,
        self_closing: bool,
    },
    MarkupPatternClosingTag {
        name: Option<Box<Node>>,
    },
    MarkupPatternAttribute {
        name: Box<Node>,
        value: Option<Box<Node>>,
    },
    /// `*` in markup pattern content position.
    MarkupPatternWildcard,

    // ===== Pipelines =====
    PipelineStatement {
        stages: Vec<Node>,
    },
    PipelineExpression {
        stages: Vec<Node>,
    },

    // ===== String templates =====
    StringTemplateLiteral {
        pattern: Option<Box<Node>>,
        slices: Vec<Node>,
    },
    StringTemplateSlice {
        value: Box<str>,
        raw: Box<str>,
    },
    StringTemplateInterpolation {
        type_name: Option<Box<str>>,
        expr: Option<Box<Node>>,
    },

    // ===== CSS selectors =====
    CssSelectorExpression {
        elements: Vec<Node>,
    },
    CssCombinator {
        name: Box<str>,
    },
    CssClassSelector {
        name: Box<str>,
    },
    CssPseudoClassSelector {
        name: Box<str>,
    },
    CssPseudoElementSelector {
        name: Box<str>,
    },
    CssTypeSelector {
        name: Box<str>,
    },
    CssIdSelector {
        name: Box<str>,
    },
    CssAttributeSelector {
        attribute_name: Box<Node>,
        matcher: Box<str>,
        value: Option<Box<Node>>,
    },

    // ===== Special forms =====
    MappingExpression {
        entries: Vec<Node>,
    },
    StaticMappingEntry {
        key: Option<Box<Node>>,
        value: Option<Box<Node>>,
    },
    DynamicMappingEntry {
        key: Option<Box<Node>>,
        key_var: Option<Box<Node>>,
        group_matching_variable: Option<Box<Node>>,
        value: Option<Box<Node>>,
    },
    ComputeExpression {
        arg: Option<Box<Node>>,
    },
    TreedataLiteral {
        root: Option<Box<Node>>,
        children: Vec<Node>,
    },
    TreedataEntry {
        value: Option<Box<Node>>,
        children: Vec<Node>,
    },
    TreedataPair {
        key: Box<Node>,
        value: Option<Box<Node>>,
    },
    TestSuiteExpression {
        meta: Option<Box<Node>>,
        module: Option<Box<Node>>,
        is_statement: bool,
    },
    TestCaseExpression {
        meta: Option<Box<Node>>,
        module: Option<Box<Node>>,
        is_statement: bool,
    },
    /// `on received %pattern handler`
    ReceptionHandlerExpression {
        pattern: Option<Box<Node>>,
        handler: Option<Box<Node>>,
    },
    SendValueExpression {
        value: Option<Box<Node>>,
        receiver: Option<Box<Node>>,
    },
}

/// Enumerate the node's direct children, in source order.
///
/// One macro body instantiated for shared and mutable access; field
/// bindings are references either way, only the dereference form differs.
macro_rules! node_children_impl {
    ($kind:expr, $out:ident, $($m:tt)*) => {{
        use NodeKind::*;
        match $kind {
            // Leaves.
            IntLiteral { .. } | FloatLiteral { .. } | QuantityLiteral { .. }
            | RateLiteral { .. } | PortLiteral { .. } | YearLiteral { .. }
            | DateLiteral { .. } | DateTimeLiteral { .. } | RuneLiteral { .. }
            | ByteSliceLiteral { .. } | BooleanLiteral { .. } | NilLiteral
            | IdentifierLiteral { .. } | Variable { .. } | GlobalVariable { .. }
            | PropertyNameLiteral { .. }
            | FlagLiteral { .. } | UnambiguousIdentifierLiteral { .. }
            | RegexLiteral { .. } | UnquotedStringLiteral { .. }
            | QuotedStringLiteral { .. } | MultilineStringLiteral { .. }
            | SelfExpression | PathSlice { .. } | PathPatternSlice { .. }
            | NamedPathSegment { .. } | InvalidPathPattern { .. }
            | SchemeLiteral { .. } | HostLiteral { .. } | HostPatternLiteral { .. }
            | UrlLiteral { .. } | UrlPatternLiteral { .. }
            | UrlQueryParameterValueSlice { .. } | InvalidUrl { .. }
            | InvalidUrlPattern { .. } | AbsolutePathLiteral { .. }
            | RelativePathLiteral { .. } | AbsolutePathPatternLiteral { .. }
            | RelativePathPatternLiteral { .. } | BreakStatement | ContinueStatement
            | PruneStatement | PatternIdentifierLiteral { .. }
            | PatternNamespaceIdentifierLiteral { .. } | PatternGroupName { .. }
            | InvalidComplexStringPatternElement | IncludableChunkDescription
            | MetaIdentifier { .. } | AnnotatedRegionHeaderText { .. }
            | MissingExpression | UnknownNode | HyperscriptAttributeShorthand { .. }
            | MarkupText { .. } | MarkupPatternWildcard | StringTemplateSlice { .. }
            | CssCombinator { .. } | CssClassSelector { .. }
            | CssPseudoClassSelector { .. } | CssPseudoElementSelector { .. }
            | CssTypeSelector { .. } | CssIdSelector { .. } => {}

            // Single boxed child.
            PropertySpreadElement { expr } | PatternPropertySpreadElement { expr }
            | ElementSpreadElement { expr } | SpreadArgument { expr }
            | BooleanConversionExpression { expr } | RuntimeTypeCheckExpression { expr }
            | PatternConversionExpression { expr } | QuotedExpression { expr }
            | AssertionStatement { expr } => $out.push($($m)* **expr),
            OptionalPatternExpression { pattern } | ReadonlyPatternExpression { pattern }
            | OtherPropsExpr { pattern } => $out.push($($m)* **pattern),
            UpperBoundRangeExpression { upper_bound } => $out.push($($m)* **upper_bound),
            InvalidMemberLike { left } => $out.push($($m)* **left),
            PointerType { value_type } => $out.push($($m)* **value_type),
            DereferenceExpression { pointer } => $out.push($($m)* **pointer),

            // Single optional child.
            ReturnStatement { expr } | YieldStatement { expr } | CoyieldStatement { expr }
            | MarkupInterpolation { expr } | UnquotedRegion { expr, .. }
            | StringTemplateInterpolation { expr, .. } => {
                if let Some(c) = expr {
                    $out.push($($m)* **c);
                }
            }
            PreinitStatement { block } | DefaultCaseWithBlock { block } => {
                if let Some(c) = block {
                    $out.push($($m)* **c);
                }
            }
            Manifest { object } => {
                if let Some(c) = object {
                    $out.push($($m)* **c);
                }
            }
            InclusionImportStatement { source } => {
                if let Some(c) = source {
                    $out.push($($m)* **c);
                }
            }
            MissingStatement { annotations } => {
                if let Some(c) = annotations {
                    $out.push($($m)* **c);
                }
            }
            DefaultCaseWithResult { result } => {
                if let Some(c) = result {
                    $out.push($($m)* **c);
                }
            }
            ComputeExpression { arg } => {
                if let Some(c) = arg {
                    $out.push($($m)* **c);
                }
            }
            MarkupClosingTag { name } | MarkupPatternClosingTag { name } => {
                if let Some(c) = name {
                    $out.push($($m)* **c);
                }
            }

            // Plain child vectors.
            LongValuePathLiteral { segments } => {
                for c in segments {
                    $out.push(c);
                }
            }
            ObjectLiteral { properties } | RecordLiteral { properties }
            | ObjectPatternLiteral { properties, .. }
            | RecordPatternLiteral { properties, .. }
            | ObjectDestructuration { properties } => {
                for c in properties {
                    $out.push(c);
                }
            }
            ListLiteral { elements } | TupleLiteral { elements }
            | ConcatenationExpression { elements }
            | ComplexStringPatternPiece { elements }
            | CssSelectorExpression { elements } => {
                for c in elements {
                    $out.push(c);
                }
            }
            DictionaryLiteral { entries } | MappingExpression { entries } => {
                for c in entries {
                    $out.push(c);
                }
            }
            KeyListExpression { keys } => {
                for c in keys {
                    $out.push(c);
                }
            }
            AbsolutePathExpression { slices } | RelativePathExpression { slices }
            | PathPatternExpression { slices }
            | NamedSegmentPathPatternLiteral { slices, .. } => {
                for c in slices {
                    $out.push(c);
                }
            }
            Block { statements } | QuotedStatements { statements }
            | InitializationBlock { statements } => {
                for c in statements {
                    $out.push(c);
                }
            }
            PipelineStatement { stages } | PipelineExpression { stages } => {
                for c in stages {
                    $out.push(c);
                }
            }
            PatternUnion { cases } => {
                for c in cases {
                    $out.push(c);
                }
            }
            GlobalConstantDeclarations { declarations }
            | LocalVariableDeclarations { declarations }
            | GlobalVariableDeclarations { declarations } => {
                for c in declarations {
                    $out.push(c);
                }
            }
            MetadataAnnotations { expressions } => {
                for c in expressions {
                    $out.push(c);
                }
            }
            StructBody { definitions } => {
                for c in definitions {
                    $out.push(c);
                }
            }
            StructInitializationLiteral { fields } => {
                for c in fields {
                    $out.push(c);
                }
            }
            UrlQueryParameter { value, .. } => {
                for c in value {
                    $out.push(c);
                }
            }

            // Mixed shapes, in source order.
            ObjectProperty { key, type_annotation, value } => {
                if let Some(c) = key {
                    $out.push($($m)* **c);
                }
                if let Some(c) = type_annotation {
                    $out.push($($m)* **c);
                }
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            ObjectPatternProperty { key, value, .. } => {
                if let Some(c) = key {
                    $out.push($($m)* **c);
                }
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            ObjectMetaProperty { key, initialization } => {
                $out.push($($m)* **key);
                $out.push($($m)* **initialization);
            }
            ListPatternLiteral { elements, general_element }
            | TuplePatternLiteral { elements, general_element } => {
                for c in elements {
                    $out.push(c);
                }
                if let Some(c) = general_element {
                    $out.push($($m)* **c);
                }
            }
            DictionaryEntry { key, value } | TreedataPair { key, value } => {
                $out.push($($m)* **key);
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            HostExpression { scheme, host, .. } => {
                $out.push($($m)* **scheme);
                $out.push($($m)* **host);
            }
            UrlExpression { host_part, path, query_params, .. } => {
                $out.push($($m)* **host_part);
                for c in path {
                    $out.push(c);
                }
                for c in query_params {
                    $out.push(c);
                }
            }
            UnaryExpression { operand, .. } => $out.push($($m)* **operand),
            BinaryExpression { left, right, .. } => {
                $out.push($($m)* **left);
                $out.push($($m)* **right);
            }
            MemberExpression { object, property_name, .. } => {
                $out.push($($m)* **object);
                $out.push($($m)* **property_name);
            }
            ComputedMemberExpression { object, property, .. } => {
                $out.push($($m)* **object);
                $out.push($($m)* **property);
            }
            DynamicMemberExpression { object, property_name } => {
                $out.push($($m)* **object);
                $out.push($($m)* **property_name);
            }
            IdentifierMemberExpression { left, property_names } => {
                $out.push($($m)* **left);
                for c in property_names {
                    $out.push(c);
                }
            }
            IndexExpression { indexed, index } => {
                $out.push($($m)* **indexed);
                $out.push($($m)* **index);
            }
            SliceExpression { indexed, start_index, end_index } => {
                $out.push($($m)* **indexed);
                if let Some(c) = start_index {
                    $out.push($($m)* **c);
                }
                if let Some(c) = end_index {
                    $out.push($($m)* **c);
                }
            }
            ExtractionExpression { object, keys } => {
                $out.push($($m)* **object);
                $out.push($($m)* **keys);
            }
            DoubleColonExpression { left, element } => {
                $out.push($($m)* **left);
                if let Some(c) = element {
                    $out.push($($m)* **c);
                }
            }
            IfStatement { test, consequent, alternate }
            | IfExpression { test, consequent, alternate } => {
                $out.push($($m)* **test);
                if let Some(c) = consequent {
                    $out.push($($m)* **c);
                }
                if let Some(c) = alternate {
                    $out.push($($m)* **c);
                }
            }
            ForStatement { key_pattern, key_index_var, value_pattern, value_elem_var, iterated_value, body, .. }
            | ForExpression { key_pattern, key_index_var, value_pattern, value_elem_var, iterated_value, body, .. } => {
                if let Some(c) = key_pattern {
                    $out.push($($m)* **c);
                }
                if let Some(c) = key_index_var {
                    $out.push($($m)* **c);
                }
                if let Some(c) = value_pattern {
                    $out.push($($m)* **c);
                }
                if let Some(c) = value_elem_var {
                    $out.push($($m)* **c);
                }
                if let Some(c) = iterated_value {
                    $out.push($($m)* **c);
                }
                if let Some(c) = body {
                    $out.push($($m)* **c);
                }
            }
            WalkStatement { walked, meta_variable, entry_variable, body }
            | WalkExpression { walked, meta_variable, entry_variable, body } => {
                if let Some(c) = walked {
                    $out.push($($m)* **c);
                }
                if let Some(c) = meta_variable {
                    $out.push($($m)* **c);
                }
                if let Some(c) = entry_variable {
                    $out.push($($m)* **c);
                }
                if let Some(c) = body {
                    $out.push($($m)* **c);
                }
            }
            SwitchStatement { discriminant, cases, default_cases }
            | MatchStatement { discriminant, cases, default_cases }
            | SwitchExpression { discriminant, cases, default_cases }
            | MatchExpression { discriminant, cases, default_cases } => {
                if let Some(c) = discriminant {
                    $out.push($($m)* **c);
                }
                for c in cases {
                    $out.push(c);
                }
                for c in default_cases {
                    $out.push(c);
                }
            }
            SwitchStatementCase { values, block } => {
                for c in values {
                    $out.push(c);
                }
                if let Some(c) = block {
                    $out.push($($m)* **c);
                }
            }
            MatchStatementCase { values, group_matching_variable, block } => {
                for c in values {
                    $out.push(c);
                }
                if let Some(c) = group_matching_variable {
                    $out.push($($m)* **c);
                }
                if let Some(c) = block {
                    $out.push($($m)* **c);
                }
            }
            SwitchExpressionCase { values, result } => {
                for c in values {
                    $out.push(c);
                }
                if let Some(c) = result {
                    $out.push($($m)* **c);
                }
            }
            MatchExpressionCase { values, group_matching_variable, result } => {
                for c in values {
                    $out.push(c);
                }
                if let Some(c) = group_matching_variable {
                    $out.push($($m)* **c);
                }
                if let Some(c) = result {
                    $out.push($($m)* **c);
                }
            }
            SynchronizedBlockStatement { synchronized_values, block } => {
                for c in synchronized_values {
                    $out.push(c);
                }
                if let Some(c) = block {
                    $out.push($($m)* **c);
                }
            }
            GlobalConstantDeclaration { left, right } => {
                $out.push($($m)* **left);
                if let Some(c) = right {
                    $out.push($($m)* **c);
                }
            }
            LocalVariableDeclaration { left, type_annotation, right }
            | GlobalVariableDeclaration { left, type_annotation, right } => {
                $out.push($($m)* **left);
                if let Some(c) = type_annotation {
                    $out.push($($m)* **c);
                }
                if let Some(c) = right {
                    $out.push($($m)* **c);
                }
            }
            ObjectDestructurationProperty { property_name, new_name, .. } => {
                $out.push($($m)* **property_name);
                if let Some(c) = new_name {
                    $out.push($($m)* **c);
                }
            }
            Assignment { left, right, .. } => {
                $out.push($($m)* **left);
                if let Some(c) = right {
                    $out.push($($m)* **c);
                }
            }
            MultiAssignment { variables, right, .. } => {
                for c in variables {
                    $out.push(c);
                }
                if let Some(c) = right {
                    $out.push($($m)* **c);
                }
            }
            FunctionDeclaration { annotations, function, name } => {
                if let Some(c) = annotations {
                    $out.push($($m)* **c);
                }
                $out.push($($m)* **name);
                $out.push($($m)* **function);
            }
            PatternDefinition { left, right, .. }
            | PatternNamespaceDefinition { left, right } => {
                if let Some(c) = left {
                    $out.push($($m)* **c);
                }
                if let Some(c) = right {
                    $out.push($($m)* **c);
                }
            }
            ExtendStatement { extended_pattern, extension } => {
                if let Some(c) = extended_pattern {
                    $out.push($($m)* **c);
                }
                if let Some(c) = extension {
                    $out.push($($m)* **c);
                }
            }
            StructDefinition { name, body } => {
                if let Some(c) = name {
                    $out.push($($m)* **c);
                }
                if let Some(c) = body {
                    $out.push($($m)* **c);
                }
            }
            StructFieldDefinition { name, type_annotation } => {
                $out.push($($m)* **name);
                $out.push($($m)* **type_annotation);
            }
            FunctionExpression { capture_list, parameters, return_type, body, .. } => {
                for c in capture_list {
                    $out.push(c);
                }
                for c in parameters {
                    $out.push(c);
                }
                if let Some(c) = return_type {
                    $out.push($($m)* **c);
                }
                if let Some(c) = body {
                    $out.push($($m)* **c);
                }
            }
            FunctionPatternExpression { parameters, return_type, .. } => {
                for c in parameters {
                    $out.push(c);
                }
                if let Some(c) = return_type {
                    $out.push($($m)* **c);
                }
            }
            FunctionParameter { var, type_annotation, .. } => {
                if let Some(c) = var {
                    $out.push($($m)* **c);
                }
                if let Some(c) = type_annotation {
                    $out.push($($m)* **c);
                }
            }
            CallExpression { callee, arguments, .. }
            | PatternCallExpression { callee, arguments } => {
                $out.push($($m)* **callee);
                for c in arguments {
                    $out.push(c);
                }
            }
            NewExpression { type_node, initialization } => {
                if let Some(c) = type_node {
                    $out.push($($m)* **c);
                }
                if let Some(c) = initialization {
                    $out.push($($m)* **c);
                }
            }
            StructFieldInitialization { name, value } => {
                $out.push($($m)* **name);
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            PatternNamespaceMemberExpression { namespace, member_name } => {
                $out.push($($m)* **namespace);
                $out.push($($m)* **member_name);
            }
            PatternPieceElement { group_name, expr, .. } => {
                if let Some(c) = group_name {
                    $out.push($($m)* **c);
                }
                $out.push($($m)* **expr);
            }
            OptionPatternLiteral { value, .. } | OptionExpression { value, .. } => {
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            RuneRangeExpression { lower, upper } => {
                $out.push($($m)* **lower);
                if let Some(c) = upper {
                    $out.push($($m)* **c);
                }
            }
            IntegerRangeLiteral { lower_bound, upper_bound }
            | FloatRangeLiteral { lower_bound, upper_bound }
            | QuantityRangeLiteral { lower_bound, upper_bound } => {
                $out.push($($m)* **lower_bound);
                if let Some(c) = upper_bound {
                    $out.push($($m)* **c);
                }
            }
            Chunk {
                global_constant_declarations,
                includable_chunk_desc,
                preinit,
                manifest,
                statements,
            } => {
                if let Some(c) = includable_chunk_desc {
                    $out.push($($m)* **c);
                }
                if let Some(c) = global_constant_declarations {
                    $out.push($($m)* **c);
                }
                if let Some(c) = preinit {
                    $out.push($($m)* **c);
                }
                if let Some(c) = manifest {
                    $out.push($($m)* **c);
                }
                for c in statements {
                    $out.push(c);
                }
            }
            EmbeddedModule { manifest, statements, .. } => {
                if let Some(c) = manifest {
                    $out.push($($m)* **c);
                }
                for c in statements {
                    $out.push(c);
                }
            }
            SpawnExpression { meta, module } => {
                if let Some(c) = meta {
                    $out.push($($m)* **c);
                }
                if let Some(c) = module {
                    $out.push($($m)* **c);
                }
            }
            ImportStatement { identifier, source, configuration } => {
                if let Some(c) = identifier {
                    $out.push($($m)* **c);
                }
                if let Some(c) = source {
                    $out.push($($m)* **c);
                }
                if let Some(c) = configuration {
                    $out.push($($m)* **c);
                }
            }
            AnnotatedRegionHeader { text, annotations } => {
                $out.push($($m)* **text);
                for c in annotations {
                    $out.push(c);
                }
            }
            MarkupExpression { namespace, element } => {
                if let Some(c) = namespace {
                    $out.push($($m)* **c);
                }
                $out.push($($m)* **element);
            }
            MarkupElement { opening, children, closing, .. }
            | MarkupPatternElement { opening, children, closing } => {
                $out.push($($m)* **opening);
                for c in children {
                    $out.push(c);
                }
                if let Some(c) = closing {
                    $out.push($($m)* **c);
                }
            }
            MarkupOpeningTag { name, attributes, .. }
            | MarkupPatternOpeningTag { name, attributes, .. } => {
                if let Some(c) = name {
                    $out.push($($m)* **c);
                }
                for c in attributes {
                    $out.push(c);
                }
            }
            MarkupAttribute { name, value } | MarkupPatternAttribute { name, value } => {
                $out.push($($m)* **name);
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            MarkupPatternExpression { element } => $out.push($($m)* **element),
            StringTemplateLiteral { pattern, slices } => {
                if let Some(c) = pattern {
                    $out.push($($m)* **c);
                }
                for c in slices {
                    $out.push(c);
                }
            }
            CssAttributeSelector { attribute_name, value, .. } => {
                $out.push($($m)* **attribute_name);
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            StaticMappingEntry { key, value } => {
                if let Some(c) = key {
                    $out.push($($m)* **c);
                }
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            DynamicMappingEntry { key, key_var, group_matching_variable, value } => {
                if let Some(c) = key {
                    $out.push($($m)* **c);
                }
                if let Some(c) = key_var {
                    $out.push($($m)* **c);
                }
                if let Some(c) = group_matching_variable {
                    $out.push($($m)* **c);
                }
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
            }
            TreedataLiteral { root, children } => {
                if let Some(c) = root {
                    $out.push($($m)* **c);
                }
                for c in children {
                    $out.push(c);
                }
            }
            TreedataEntry { value, children } => {
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
                for c in children {
                    $out.push(c);
                }
            }
            TestSuiteExpression { meta, module, .. }
            | TestCaseExpression { meta, module, .. } => {
                if let Some(c) = meta {
                    $out.push($($m)* **c);
                }
                if let Some(c) = module {
                    $out.push($($m)* **c);
                }
            }
            ReceptionHandlerExpression { pattern, handler } => {
                if let Some(c) = pattern {
                    $out.push($($m)* **c);
                }
                if let Some(c) = handler {
                    $out.push($($m)* **c);
                }
            }
            SendValueExpression { value, receiver } => {
                if let Some(c) = value {
                    $out.push($($m)* **c);
                }
                if let Some(c) = receiver {
                    $out.push($($m)* **c);
                }
            }
        }
    }};
}

impl Node {
    pub fn new(span: Span, kind: NodeKind) -> Self {
        Node {
            base: NodeBase::new(span),
            kind,
        }
    }

    pub fn with_error(span: Span, kind: NodeKind, err: ParsingError) -> Self {
        Node {
            base: NodeBase::with_error(span, err),
            kind,
        }
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.base.span
    }

    /// Attach an error unless the node already has one; the first concrete
    /// error wins.
    pub fn set_error_if_none(&mut self, err: ParsingError) {
        if self.base.err.is_none() {
            self.base.err = Some(err);
        }
    }

    /// Direct children, in source order.
    pub fn children(&self) -> SmallVec<[&Node; 8]> {
        let mut out: SmallVec<[&Node; 8]> = SmallVec::new();
        node_children_impl!(&self.kind, out, &);
        out
    }

    /// Direct children, mutable, in source order.
    pub fn children_mut(&mut self) -> SmallVec<[&mut Node; 8]> {
        let mut out: SmallVec<[&mut Node; 8]> = SmallVec::new();
        node_children_impl!(&mut self.kind, out, &mut);
        out
    }

    /// Whether the node or any descendant carries a parsing error.
    pub fn error_at_any_depth(&self) -> bool {
        if self.base.err.is_some() {
            return true;
        }
        self.children().iter().any(|c| c.error_at_any_depth())
    }

    /// Nodes that open a new variable scope.
    pub fn is_scope_container(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Chunk { .. }
                | NodeKind::EmbeddedModule { .. }
                | NodeKind::FunctionExpression { .. }
                | NodeKind::FunctionPatternExpression { .. }
                | NodeKind::QuotedExpression { .. }
                | NodeKind::InitializationBlock { .. }
                | NodeKind::MappingExpression { .. }
                | NodeKind::StaticMappingEntry { .. }
                | NodeKind::DynamicMappingEntry { .. }
                | NodeKind::TestSuiteExpression { .. }
                | NodeKind::TestCaseExpression { .. }
                | NodeKind::ExtendStatement { .. }
                | NodeKind::StructDefinition { .. }
        )
    }

    /// Nodes that can appear directly in a block/chunk statement position.
    pub fn is_statement_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::IfStatement { .. }
                | NodeKind::ForStatement { .. }
                | NodeKind::WalkStatement { .. }
                | NodeKind::SwitchStatement { .. }
                | NodeKind::MatchStatement { .. }
                | NodeKind::ReturnStatement { .. }
                | NodeKind::YieldStatement { .. }
                | NodeKind::CoyieldStatement { .. }
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
                | NodeKind::PruneStatement
                | NodeKind::AssertionStatement { .. }
                | NodeKind::SynchronizedBlockStatement { .. }
                | NodeKind::Assignment { .. }
                | NodeKind::MultiAssignment { .. }
                | NodeKind::LocalVariableDeclarations { .. }
                | NodeKind::GlobalVariableDeclarations { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::PatternDefinition { .. }
                | NodeKind::PatternNamespaceDefinition { .. }
                | NodeKind::ExtendStatement { .. }
                | NodeKind::StructDefinition { .. }
                | NodeKind::ImportStatement { .. }
                | NodeKind::InclusionImportStatement { .. }
                | NodeKind::PipelineStatement { .. }
                | NodeKind::MissingStatement { .. }
        )
    }

    /// Short variant name for tree printing and debugging.
    pub fn kind_name(&self) -> &'static str {
        kind_name(&self.kind)
    }
}

/// Variant name without payload.
#[allow(clippy::too_many_lines)]
pub fn kind_name(kind: &NodeKind) -> &'static str {
    use NodeKind::*;
    match kind {
        IntLiteral { .. } => "IntLiteral",
        FloatLiteral { .. } => "FloatLiteral",
        QuantityLiteral { .. } => "QuantityLiteral",
        RateLiteral { .. } => "RateLiteral",
        PortLiteral { .. } => "PortLiteral",
        YearLiteral { .. } => "YearLiteral",
        DateLiteral { .. } => "DateLiteral",
        DateTimeLiteral { .. } => "DateTimeLiteral",
        RuneLiteral { .. } => "RuneLiteral",
        ByteSliceLiteral { .. } => "ByteSliceLiteral",
        BooleanLiteral { .. } => "BooleanLiteral",
        NilLiteral => "NilLiteral",
        IdentifierLiteral { .. } => "IdentifierLiteral",
        Variable { .. } => "Variable",
        GlobalVariable { .. } => "GlobalVariable",
        PropertyNameLiteral { .. } => "PropertyNameLiteral",
        LongValuePathLiteral { .. } => "LongValuePathLiteral",
        FlagLiteral { .. } => "FlagLiteral",
        UnambiguousIdentifierLiteral { .. } => "UnambiguousIdentifierLiteral",
        RegexLiteral { .. } => "RegexLiteral",
        UnquotedStringLiteral { .. } => "UnquotedStringLiteral",
        QuotedStringLiteral { .. } => "QuotedStringLiteral",
        MultilineStringLiteral { .. } => "MultilineStringLiteral",
        SelfExpression => "SelfExpression",
        ObjectLiteral { .. } => "ObjectLiteral",
        RecordLiteral { .. } => "RecordLiteral",
        ObjectProperty { .. } => "ObjectProperty",
        PropertySpreadElement { .. } => "PropertySpreadElement",
        ObjectMetaProperty { .. } => "ObjectMetaProperty",
        InitializationBlock { .. } => "InitializationBlock",
        ObjectPatternLiteral { .. } => "ObjectPatternLiteral",
        RecordPatternLiteral { .. } => "RecordPatternLiteral",
        ObjectPatternProperty { .. } => "ObjectPatternProperty",
        PatternPropertySpreadElement { .. } => "PatternPropertySpreadElement",
        OtherPropsExpr { .. } => "OtherPropsExpr",
        ListLiteral { .. } => "ListLiteral",
        TupleLiteral { .. } => "TupleLiteral",
        ListPatternLiteral { .. } => "ListPatternLiteral",
        TuplePatternLiteral { .. } => "TuplePatternLiteral",
        ElementSpreadElement { .. } => "ElementSpreadElement",
        DictionaryLiteral { .. } => "DictionaryLiteral",
        DictionaryEntry { .. } => "DictionaryEntry",
        KeyListExpression { .. } => "KeyListExpression",
        AbsolutePathLiteral { .. } => "AbsolutePathLiteral",
        RelativePathLiteral { .. } => "RelativePathLiteral",
        AbsolutePathExpression { .. } => "AbsolutePathExpression",
        RelativePathExpression { .. } => "RelativePathExpression",
        AbsolutePathPatternLiteral { .. } => "AbsolutePathPatternLiteral",
        RelativePathPatternLiteral { .. } => "RelativePathPatternLiteral",
        PathPatternExpression { .. } => "PathPatternExpression",
        NamedSegmentPathPatternLiteral { .. } => "NamedSegmentPathPatternLiteral",
        PathSlice { .. } => "PathSlice",
        PathPatternSlice { .. } => "PathPatternSlice",
        NamedPathSegment { .. } => "NamedPathSegment",
        InvalidPathPattern { .. } => "InvalidPathPattern",
        SchemeLiteral { .. } => "SchemeLiteral",
        HostLiteral { .. } => "HostLiteral",
        HostExpression { .. } => "HostExpression",
        HostPatternLiteral { .. } => "HostPatternLiteral",
        UrlLiteral { .. } => "UrlLiteral",
        UrlExpression { .. } => "UrlExpression",
        UrlPatternLiteral { .. } => "UrlPatternLiteral",
        UrlQueryParameter { .. } => "UrlQueryParameter",
        UrlQueryParameterValueSlice { .. } => "UrlQueryParameterValueSlice",
        InvalidUrl { .. } => "InvalidUrl",
        InvalidUrlPattern { .. } => "InvalidUrlPattern",
        UnaryExpression { .. } => "UnaryExpression",
        BinaryExpression { .. } => "BinaryExpression",
        BooleanConversionExpression { .. } => "BooleanConversionExpression",
        RuntimeTypeCheckExpression { .. } => "RuntimeTypeCheckExpression",
        ConcatenationExpression { .. } => "ConcatenationExpression",
        PatternConversionExpression { .. } => "PatternConversionExpression",
        MemberExpression { .. } => "MemberExpression",
        ComputedMemberExpression { .. } => "ComputedMemberExpression",
        DynamicMemberExpression { .. } => "DynamicMemberExpression",
        IdentifierMemberExpression { .. } => "IdentifierMemberExpression",
        IndexExpression { .. } => "IndexExpression",
        SliceExpression { .. } => "SliceExpression",
        ExtractionExpression { .. } => "ExtractionExpression",
        DoubleColonExpression { .. } => "DoubleColonExpression",
        InvalidMemberLike { .. } => "InvalidMemberLike",
        Block { .. } => "Block",
        IfStatement { .. } => "IfStatement",
        IfExpression { .. } => "IfExpression",
        ForStatement { .. } => "ForStatement",
        ForExpression { .. } => "ForExpression",
        WalkStatement { .. } => "WalkStatement",
        WalkExpression { .. } => "WalkExpression",
        SwitchStatement { .. } => "SwitchStatement",
        SwitchStatementCase { .. } => "SwitchStatementCase",
        MatchStatement { .. } => "MatchStatement",
        MatchStatementCase { .. } => "MatchStatementCase",
        DefaultCaseWithBlock { .. } => "DefaultCaseWithBlock",
        SwitchExpression { .. } => "SwitchExpression",
        SwitchExpressionCase { .. } => "SwitchExpressionCase",
        MatchExpression { .. } => "MatchExpression",
        MatchExpressionCase { .. } => "MatchExpressionCase",
        DefaultCaseWithResult { .. } => "DefaultCaseWithResult",
        ReturnStatement { .. } => "ReturnStatement",
        YieldStatement { .. } => "YieldStatement",
        CoyieldStatement { .. } => "CoyieldStatement",
        BreakStatement => "BreakStatement",
        ContinueStatement => "ContinueStatement",
        PruneStatement => "PruneStatement",
        AssertionStatement { .. } => "AssertionStatement",
        SynchronizedBlockStatement { .. } => "SynchronizedBlockStatement",
        GlobalConstantDeclarations { .. } => "GlobalConstantDeclarations",
        GlobalConstantDeclaration { .. } => "GlobalConstantDeclaration",
        LocalVariableDeclarations { .. } => "LocalVariableDeclarations",
        LocalVariableDeclaration { .. } => "LocalVariableDeclaration",
        GlobalVariableDeclarations { .. } => "GlobalVariableDeclarations",
        GlobalVariableDeclaration { .. } => "GlobalVariableDeclaration",
        ObjectDestructuration { .. } => "ObjectDestructuration",
        ObjectDestructurationProperty { .. } => "ObjectDestructurationProperty",
        Assignment { .. } => "Assignment",
        MultiAssignment { .. } => "MultiAssignment",
        FunctionDeclaration { .. } => "FunctionDeclaration",
        PatternDefinition { .. } => "PatternDefinition",
        PatternNamespaceDefinition { .. } => "PatternNamespaceDefinition",
        ExtendStatement { .. } => "ExtendStatement",
        StructDefinition { .. } => "StructDefinition",
        StructBody { .. } => "StructBody",
        StructFieldDefinition { .. } => "StructFieldDefinition",
        FunctionExpression { .. } => "FunctionExpression",
        FunctionPatternExpression { .. } => "FunctionPatternExpression",
        FunctionParameter { .. } => "FunctionParameter",
        CallExpression { .. } => "CallExpression",
        SpreadArgument { .. } => "SpreadArgument",
        PatternCallExpression { .. } => "PatternCallExpression",
        NewExpression { .. } => "NewExpression",
        StructInitializationLiteral { .. } => "StructInitializationLiteral",
        StructFieldInitialization { .. } => "StructFieldInitialization",
        PointerType { .. } => "PointerType",
        DereferenceExpression { .. } => "DereferenceExpression",
        PatternIdentifierLiteral { .. } => "PatternIdentifierLiteral",
        PatternNamespaceIdentifierLiteral { .. } => "PatternNamespaceIdentifierLiteral",
        PatternNamespaceMemberExpression { .. } => "PatternNamespaceMemberExpression",
        PatternUnion { .. } => "PatternUnion",
        OptionalPatternExpression { .. } => "OptionalPatternExpression",
        ReadonlyPatternExpression { .. } => "ReadonlyPatternExpression",
        ComplexStringPatternPiece { .. } => "ComplexStringPatternPiece",
        PatternPieceElement { .. } => "PatternPieceElement",
        PatternGroupName { .. } => "PatternGroupName",
        InvalidComplexStringPatternElement => "InvalidComplexStringPatternElement",
        OptionPatternLiteral { .. } => "OptionPatternLiteral",
        OptionExpression { .. } => "OptionExpression",
        RuneRangeExpression { .. } => "RuneRangeExpression",
        IntegerRangeLiteral { .. } => "IntegerRangeLiteral",
        FloatRangeLiteral { .. } => "FloatRangeLiteral",
        QuantityRangeLiteral { .. } => "QuantityRangeLiteral",
        UpperBoundRangeExpression { .. } => "UpperBoundRangeExpression",
        Chunk { .. } => "Chunk",
        EmbeddedModule { .. } => "EmbeddedModule",
        PreinitStatement { .. } => "PreinitStatement",
        Manifest { .. } => "Manifest",
        IncludableChunkDescription => "IncludableChunkDescription",
        SpawnExpression { .. } => "SpawnExpression",
        ImportStatement { .. } => "ImportStatement",
        InclusionImportStatement { .. } => "InclusionImportStatement",
        QuotedExpression { .. } => "QuotedExpression",
        QuotedStatements { .. } => "QuotedStatements",
        UnquotedRegion { .. } => "UnquotedRegion",
        MetaIdentifier { .. } => "MetaIdentifier",
        MetadataAnnotations { .. } => "MetadataAnnotations",
        AnnotatedRegionHeader { .. } => "AnnotatedRegionHeader",
        AnnotatedRegionHeaderText { .. } => "AnnotatedRegionHeaderText",
        MissingStatement { .. } => "MissingStatement",
        MissingExpression => "MissingExpression",
        UnknownNode => "UnknownNode",
        MarkupExpression { .. } => "MarkupExpression",
        MarkupElement { .. } => "MarkupElement",
        MarkupOpeningTag { .. } => "MarkupOpeningTag",
        MarkupClosingTag { .. } => "MarkupClosingTag",
        MarkupAttribute { .. } => "MarkupAttribute",
        HyperscriptAttributeShorthand { .. } => "HyperscriptAttributeShorthand",
        MarkupText { .. } => "MarkupText",
        MarkupInterpolation { .. } => "MarkupInterpolation",
        MarkupPatternExpression { .. } => "MarkupPatternExpression",
        MarkupPatternElement { .. } => "MarkupPatternElement",
        MarkupPatternOpeningTag { .. } => "MarkupPatternOpeningTag",
        MarkupPatternClosingTag { .. } => "MarkupPatternClosingTag",
        MarkupPatternAttribute { .. } => "MarkupPatternAttribute",
        MarkupPatternWildcard => "MarkupPatternWildcard",
        PipelineStatement { .. } => "PipelineStatement",
        PipelineExpression { .. } => "PipelineExpression",
        StringTemplateLiteral { .. } => "StringTemplateLiteral",
        StringTemplateSlice { .. } => "StringTemplateSlice",
        StringTemplateInterpolation { .. } => "StringTemplateInterpolation",
        CssSelectorExpression { .. } => "CssSelectorExpression",
        CssCombinator { .. } => "CssCombinator",
        CssClassSelector { .. } => "CssClassSelector",
        CssPseudoClassSelector { .. } => "CssPseudoClassSelector",
        CssPseudoElementSelector { .. } => "CssPseudoElementSelector",
        CssTypeSelector { .. } => "CssTypeSelector",
        CssIdSelector { .. } => "CssIdSelector",
        CssAttributeSelector { .. } => "CssAttributeSelector",
        MappingExpression { .. } => "MappingExpression",
        StaticMappingEntry { .. } => "StaticMappingEntry",
        DynamicMappingEntry { .. } => "DynamicMappingEntry",
        ComputeExpression { .. } => "ComputeExpression",
        TreedataLiteral { .. } => "TreedataLiteral",
        TreedataEntry { .. } => "TreedataEntry",
        TreedataPair { .. } => "TreedataPair",
        TestSuiteExpression { .. } => "TestSuiteExpression",
        TestCaseExpression { .. } => "TestCaseExpression",
        ReceptionHandlerExpression { .. } => "ReceptionHandlerExpression",
        SendValueExpression { .. } => "SendValueExpression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(span: Span, value: i64) -> Node {
        Node::new(
            span,
            NodeKind::IntLiteral {
                value,
                raw: value.to_string().into(),
            },
        )
    }

    #[test]
    fn children_in_source_order() {
        let node = Node::new(
            Span::new(0, 7),
            NodeKind::BinaryExpression {
                operator: BinaryOperator::Add,
                left: Box::new(int(Span::new(1, 2), 1)),
                right: Box::new(int(Span::new(5, 6), 2)),
            },
        );
        let children = node.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].span(), Span::new(1, 2));
        assert_eq!(children[1].span(), Span::new(5, 6));
    }

    #[test]
    fn error_at_any_depth_sees_grandchildren() {
        let mut leaf = int(Span::new(0, 1), 1);
        leaf.set_error_if_none(quill_diagnostic::ParsingError::unspecified("boom"));
        let node = Node::new(
            Span::new(0, 3),
            NodeKind::ListLiteral {
                elements: vec![leaf],
            },
        );
        assert!(node.error_at_any_depth());
    }

    #[test]
    fn first_error_wins() {
        let mut node = int(Span::new(0, 1), 1);
        node.set_error_if_none(quill_diagnostic::ParsingError::unspecified("first"));
        node.set_error_if_none(quill_diagnostic::ParsingError::unspecified("second"));
        assert_eq!(node.base.err.as_ref().map(|e| e.message.as_str()), Some("first"));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Node::new(Span::DUMMY, NodeKind::NilLiteral).kind_name(), "NilLiteral");
        assert!(Node::new(
            Span::DUMMY,
            NodeKind::Chunk {
                global_constant_declarations: None,
                includable_chunk_desc: None,
                preinit: None,
                manifest: None,
                statements: vec![],
            }
        )
        .is_scope_container());
    }
}
