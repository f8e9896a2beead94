// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract syntax tree for frametalk programs.
//!
//! A program is a flat sequence of [`Statement`]s; there is no nesting at
//! statement level. `Statement` is a closed tagged union with one variant per
//! operation, so the analyzer and the code generator pattern-match with
//! compiler-enforced coverage: adding an operation without handling it
//! everywhere is a build error, not a runtime surprise.
//!
//! Nodes are pure data. They are immutable after parsing, carry no behavior
//! beyond structural accessors, and every parameter is fully typed at parse
//! time. Statements that may omit their `as` clause model that directly:
//! `alias: None` is display mode (compute into a throwaway variable and show
//! it), `alias: Some(..)` is storage mode (register the alias, show nothing).

use ecow::EcoString;

use crate::source_analysis::Span;

/// A name appearing in source: a dataset alias or a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// The name as written (quotes stripped if it came from a string).
    pub name: EcoString,
    /// Source location.
    pub span: Span,
}

impl Identifier {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A literal parameter value.
///
/// `List` and `Dict` preserve source order; dictionaries are ordered
/// key/value pairs rather than a hash map so that generated keyword
/// arguments come out in the order the user wrote them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(EcoString),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    List(Vec<Value>),
    Dict(Vec<(EcoString, Value)>),
    /// A bare identifier used where a value is expected (a column name).
    Ident(EcoString),
}

/// One `key=value` entry from a parameter run.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: EcoString,
    pub value: Value,
    pub span: Span,
}

/// A tabular file format, spelled in source or sniffed from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Json,
    Excel,
    Parquet,
}

impl FileFormat {
    /// Sniffs a format from a file path's extension.
    ///
    /// SQL sources have no extension convention and must be spelled
    /// explicitly, so they never come from here.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let lowered = path.to_ascii_lowercase();
        if lowered.ends_with(".csv") {
            Some(Self::Csv)
        } else if lowered.ends_with(".json") {
            Some(Self::Json)
        } else if lowered.ends_with(".xlsx") || lowered.ends_with(".xls") {
            Some(Self::Excel)
        } else if lowered.ends_with(".parquet") {
            Some(Self::Parquet)
        } else {
            None
        }
    }
}

/// One column of a `sort ... by` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Identifier,
    /// `desc` was written; absent or `asc` means ascending.
    pub descending: bool,
}

/// One `func: column` pair of a `groupby ... compute {...}` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub func: EcoString,
    pub column: Identifier,
}

impl Aggregation {
    /// The pandas spelling of this aggregation; `avg` is called `mean`
    /// there. Unrecognized names pass through for pandas to judge.
    #[must_use]
    pub fn pandas_func(&self) -> &str {
        match self.func.as_str() {
            "avg" => "mean",
            other => other,
        }
    }
}

/// One derived column of a `mutate` statement.
///
/// The expression is an opaque target-eval payload: it is emitted verbatim
/// into the generated `eval(..)` call and never re-parsed by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub column: Identifier,
    pub expression: EcoString,
}

/// What a `fillna` statement fills with.
#[derive(Debug, Clone, PartialEq)]
pub enum FillWith {
    Value(Value),
    Method(EcoString),
}

/// The body of a consolidated `map` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum MapBody {
    /// `with transform <expr>`: evaluate an expression per element.
    Transform(Expr),
    /// `with mapping = {..}`: substitute values through a dictionary.
    Mapping(Vec<(EcoString, Value)>),
}

/// A row or column selector for positional indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceArg {
    /// `[start, end]` — half-open positional range.
    Range(i64, i64),
    /// A single position.
    Index(i64),
}

/// A comparison operator in a `where` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// How a string-matching condition matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMatchMode {
    Contains,
    StartsWith,
    EndsWith,
    /// Regular-expression match.
    Matches,
}

/// A `where` clause condition.
///
/// Precedence is encoded by construction: `or` binds loosest, then `and`,
/// then `not`, with the atomic forms below. Parentheses in source simply
/// shape the tree and leave no node behind.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `left or right`.
    Or(Box<Condition>, Box<Condition>),
    /// `left and right`.
    And(Box<Condition>, Box<Condition>),
    /// `not inner`.
    Not(Box<Condition>),
    /// `column <op> value`.
    Comparison {
        column: Identifier,
        op: CompareOp,
        value: Value,
    },
    /// `column between low and high` (inclusive on both ends).
    Between {
        column: Identifier,
        low: Value,
        high: Value,
    },
    /// `column in [v1, v2, ..]`.
    In {
        column: Identifier,
        values: Vec<Value>,
    },
    /// `column contains|starts_with|ends_with|matches "pattern"`.
    StringMatch {
        column: Identifier,
        mode: StringMatchMode,
        pattern: EcoString,
    },
    /// `column is null` / `column is not null`.
    IsNull { column: Identifier, negated: bool },
}

/// A binary operator in a transform expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// A unary operator in a transform expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A typed transform expression (`apply .. with transform <expr>` and the
/// expression arm of `map`).
///
/// Precedence, loosest to tightest: conditional, `or`, `and`, comparison
/// (non-chaining), `+ -`, `* / %`, `**` (right-associative), unary, primary.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Value, Span),
    /// A column reference.
    Column(Identifier),
    /// `op operand`.
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `left op right`.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },
    /// `function(arg, ..)`.
    Call {
        function: Identifier,
        args: Vec<Expr>,
        span: Span,
    },
    /// `value where condition else otherwise`.
    Conditional {
        value: Box<Expr>,
        condition: Box<Expr>,
        otherwise: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    /// Returns the span of this expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal(_, span)
            | Self::Unary { span, .. }
            | Self::Binary { span, .. }
            | Self::Call { span, .. }
            | Self::Conditional { span, .. } => *span,
            Self::Column(id) => id.span,
        }
    }
}

/// A frametalk statement.
///
/// One variant per operation. Each variant's doc comment shows its surface
/// grammar; `[..]` marks optional clauses, `src`/`a`/`b` are dataset
/// aliases, `c` is a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    // ------------------------------------------------------------------
    // Loading and saving
    // ------------------------------------------------------------------
    /// `load "path" [with k=v ..] as alias` or
    /// `load csv|json|excel|parquet "path" [with k=v ..] as alias`.
    ///
    /// Without an explicit format keyword or `format=` parameter the format
    /// is sniffed from the file extension; `None` falls back to CSV.
    Load {
        path: EcoString,
        format: Option<FileFormat>,
        params: Vec<Param>,
        alias: Identifier,
        span: Span,
    },
    /// `load sql "query" from "connection" [with k=v ..] as alias`.
    LoadSql {
        query: EcoString,
        connection: EcoString,
        params: Vec<Param>,
        alias: Identifier,
        span: Span,
    },
    /// `save src to "path" [with k=v ..]`. Format sniffed from the
    /// extension, defaulting to CSV.
    Save {
        source: Identifier,
        path: EcoString,
        format: FileFormat,
        params: Vec<Param>,
        span: Span,
    },
    /// `export_plot filename : "path" [width : N] [height : N]`.
    ExportPlot {
        filename: EcoString,
        width: Option<i64>,
        height: Option<i64>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Core relational operations
    // ------------------------------------------------------------------
    /// `select src {c1, c2} [as a]` or `select src with c1, c2 [as a]`.
    Select {
        source: Identifier,
        columns: Vec<Identifier>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter src where <condition> [as a]`.
    Filter {
        source: Identifier,
        condition: Condition,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `sort src by c [asc|desc], .. [as a]`.
    Sort {
        source: Identifier,
        specs: Vec<SortSpec>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `join a with b on c [as r]`.
    Join {
        left: Identifier,
        right: Identifier,
        on: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `groupby src by {c1, ..} [compute {func: col, ..}] [as a]`.
    ///
    /// Group keys keep first-seen order in the result.
    Groupby {
        source: Identifier,
        by: Vec<Identifier>,
        aggregations: Vec<Aggregation>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `sample src with n=N [random] [as a]`.
    Sample {
        source: Identifier,
        n: i64,
        random: bool,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `drop src columns {c1, ..} [as a]`.
    Drop {
        source: Identifier,
        columns: Vec<Identifier>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `mutate src {c: "expr", ..} [as a]` or `mutate src with c = expr [with c = expr ..] [as a]`.
    Mutate {
        source: Identifier,
        mutations: Vec<Mutation>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `apply src column c with transform <expr> [as a]`.
    Apply {
        source: Identifier,
        column: Identifier,
        transform: Expr,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `map src column c with transform <expr> [as a]` or
    /// `map src column c with mapping = {..} [as a]`.
    Map {
        source: Identifier,
        column: Identifier,
        body: MapBody,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Selection and projection
    // ------------------------------------------------------------------
    /// `select_by_type src with type="dtype" [as a]`.
    SelectByType {
        source: Identifier,
        dtype: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `head src [with n=N] [as a]` (default 5).
    Head {
        source: Identifier,
        n: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `tail src [with n=N] [as a]` (default 5).
    Tail {
        source: Identifier,
        n: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `iloc src with [rows=[s,e]|n] [columns=[s,e]|n] [as a]`.
    Iloc {
        source: Identifier,
        rows: Option<SliceArg>,
        columns: Option<SliceArg>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `loc src with [rows=<value>] [columns=<value>] [as a]`.
    Loc {
        source: Identifier,
        rows: Option<Value>,
        columns: Option<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rename src with mapping={"old": "new", ..} [as a]`.
    Rename {
        source: Identifier,
        mapping: Vec<(EcoString, Value)>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `reorder src with order=["c1", ..] [as a]`.
    Reorder {
        source: Identifier,
        order: Vec<Value>,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Parameterised filters
    // ------------------------------------------------------------------
    /// `filter_between src with column="c" min=v max=v [as a]`.
    FilterBetween {
        source: Identifier,
        column: Identifier,
        low: Value,
        high: Value,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_isin src with column="c" values=[..] [as a]`.
    FilterIsin {
        source: Identifier,
        column: Identifier,
        values: Vec<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_contains src with column="c" pattern="p" [as a]`.
    FilterContains {
        source: Identifier,
        column: Identifier,
        pattern: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_startswith src with column="c" pattern="p" [as a]`.
    FilterStartswith {
        source: Identifier,
        column: Identifier,
        pattern: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_endswith src with column="c" pattern="p" [as a]`.
    FilterEndswith {
        source: Identifier,
        column: Identifier,
        pattern: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_regex src with column="c" pattern="p" [as a]`.
    FilterRegex {
        source: Identifier,
        column: Identifier,
        pattern: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_null src with column="c" [as a]`.
    FilterNull {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_notnull src with column="c" [as a]`.
    FilterNotnull {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `filter_duplicates src [with subset=[..] keep="first|last"] [as a]`.
    FilterDuplicates {
        source: Identifier,
        subset: Option<Vec<Value>>,
        keep: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Cleaning
    // ------------------------------------------------------------------
    /// `dropna src [columns : {c1, ..}] [as a]` (the colon may be omitted).
    Dropna {
        source: Identifier,
        columns: Option<Vec<Identifier>>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `fillna src column c with value=v | method="m" [as a]`.
    Fillna {
        source: Identifier,
        column: Identifier,
        fill: FillWith,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `isnull src column c [as a]` — adds a boolean mask column.
    Isnull {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `notnull src column c [as a]` — adds a boolean mask column.
    Notnull {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `count_na src` — displays per-column null counts.
    CountNa { source: Identifier, span: Span },
    /// `fill_forward src [column c] [as a]`.
    FillForward {
        source: Identifier,
        column: Option<Identifier>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `fill_backward src [column c] [as a]`.
    FillBackward {
        source: Identifier,
        column: Option<Identifier>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `fill_mean src column c [as a]`.
    FillMean {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `fill_median src column c [as a]`.
    FillMedian {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `fill_mode src column c [as a]`.
    FillMode {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `interpolate src [column c] [method="linear"] [as a]`.
    Interpolate {
        source: Identifier,
        column: Option<Identifier>,
        method: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `duplicated src [columns [..]] [keep="first"] [as a]` — adds a
    /// boolean mask column.
    Duplicated {
        source: Identifier,
        columns: Option<Vec<Value>>,
        keep: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `count_duplicates src [columns [..]]`.
    CountDuplicates {
        source: Identifier,
        columns: Option<Vec<Value>>,
        span: Span,
    },
    /// `drop_duplicates src [subset=[..]] [keep="first"] [as a]`.
    DropDuplicates {
        source: Identifier,
        subset: Option<Vec<Value>>,
        keep: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `qcut src column c q=N [labels=[..]] [as a]`.
    Qcut {
        source: Identifier,
        column: Identifier,
        q: i64,
        labels: Option<Vec<Value>>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `cut src column c bins=[..] [labels=[..]] [include_lowest=b] [as a]`.
    Cut {
        source: Identifier,
        column: Identifier,
        bins: Vec<Value>,
        labels: Option<Vec<Value>>,
        include_lowest: bool,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Row and element application
    // ------------------------------------------------------------------
    /// `apply_row src function="expr" [as a]` — row-wise lambda.
    ApplyRow {
        source: Identifier,
        function: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `apply_column src column c function="expr" [as a]`.
    ApplyColumn {
        source: Identifier,
        column: Identifier,
        function: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `applymap src function="expr" [as a]` — element-wise lambda.
    Applymap {
        source: Identifier,
        function: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `map_values src column c mapping={..} [as a]`.
    MapValues {
        source: Identifier,
        column: Identifier,
        mapping: Vec<(EcoString, Value)>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `assign src column c value=v [as a]` — constant column.
    AssignConst {
        source: Identifier,
        column: Identifier,
        value: Value,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Inspection (display-only)
    // ------------------------------------------------------------------
    /// `describe src [columns {c1, ..}]`.
    Describe {
        source: Identifier,
        columns: Option<Vec<Identifier>>,
        span: Span,
    },
    /// `summary src` — shape, columns, dtypes, missing counts.
    Summary { source: Identifier, span: Span },
    /// `info src`.
    Info { source: Identifier, span: Span },
    /// `unique src column c`.
    Unique {
        source: Identifier,
        column: Identifier,
        span: Span,
    },
    /// `value_counts src column c [normalize] [ascending]`.
    ValueCounts {
        source: Identifier,
        column: Identifier,
        normalize: bool,
        ascending: bool,
        span: Span,
    },
    /// `show src [with n=N]`.
    Show {
        source: Identifier,
        n: Option<i64>,
        span: Span,
    },
    /// `corr src` — numeric correlation matrix.
    Corr { source: Identifier, span: Span },
    /// `cov src` — numeric covariance matrix.
    Cov { source: Identifier, span: Span },
    /// `compare a with b` — shape/column/dtype comparison.
    Compare {
        left: Identifier,
        right: Identifier,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Statistical analysis
    // ------------------------------------------------------------------
    /// `outliers src with method="iqr|zscore" columns {c1, ..}`.
    Outliers {
        source: Identifier,
        method: EcoString,
        columns: Vec<Identifier>,
        span: Span,
    },
    /// `quantile src column c with q=F`.
    Quantile {
        source: Identifier,
        column: Identifier,
        q: f64,
        span: Span,
    },
    /// `normalize src columns {c1, ..} with method="minmax|zscore" [as a]`.
    Normalize {
        source: Identifier,
        columns: Vec<Identifier>,
        method: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `binning src column c with bins=N [as a]`.
    Binning {
        source: Identifier,
        column: Identifier,
        bins: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rolling src column c with window=N function="mean|sum|.." [as a]`.
    Rolling {
        source: Identifier,
        column: Identifier,
        window: i64,
        function: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `hypothesis a vs b columns {c1, c2} test t_test|chi2|anova`.
    Hypothesis {
        left: Identifier,
        right: Identifier,
        columns: Vec<Identifier>,
        test: EcoString,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Math column transforms
    // ------------------------------------------------------------------
    /// `round src column c [decimals=N] [as a]`.
    Round {
        source: Identifier,
        column: Identifier,
        decimals: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `abs src column c [as a]`.
    Abs {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `sqrt src column c [as a]`.
    Sqrt {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `power src column c exponent=F [as a]`.
    Power {
        source: Identifier,
        column: Identifier,
        exponent: f64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `log src column c [base=N|e] [as a]`.
    Log {
        source: Identifier,
        column: Identifier,
        base: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `ceil src column c [as a]`.
    Ceil {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `floor src column c [as a]`.
    Floor {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // String column transforms
    // ------------------------------------------------------------------
    /// `upper src column c [as a]`.
    Upper {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `lower src column c [as a]`.
    Lower {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `strip src column c [as a]`.
    Strip {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `lstrip src column c [chars=".."] [as a]`.
    Lstrip {
        source: Identifier,
        column: Identifier,
        chars: Option<EcoString>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rstrip src column c [chars=".."] [as a]`.
    Rstrip {
        source: Identifier,
        column: Identifier,
        chars: Option<EcoString>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `title src column c [as a]`.
    Title {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `capitalize src column c [as a]`.
    Capitalize {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `replace src column c old=".." new=".." [as a]`.
    Replace {
        source: Identifier,
        column: Identifier,
        old: EcoString,
        new: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `split src column c [delimiter=".."] [as a]` (default space).
    Split {
        source: Identifier,
        column: Identifier,
        delimiter: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `concat src columns [..] [separator=".."] [as a]`.
    Concat {
        source: Identifier,
        columns: Vec<Value>,
        separator: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `substring src column c start=N [end=N] [as a]`.
    Substring {
        source: Identifier,
        column: Identifier,
        start: i64,
        end: Option<i64>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `length src column c [as a]`.
    Length {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_regex src column c pattern=".." [group=N] [as a]`.
    ExtractRegex {
        source: Identifier,
        column: Identifier,
        pattern: EcoString,
        group: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `find src column c substring=".." [as a]`.
    Find {
        source: Identifier,
        column: Identifier,
        substring: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Datetime transforms
    // ------------------------------------------------------------------
    /// `parse_datetime src column c [format=".."] [as a]`.
    ParseDatetime {
        source: Identifier,
        column: Identifier,
        format: Option<EcoString>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract src column c with part="year|month|.." [as a]`.
    Extract {
        source: Identifier,
        column: Identifier,
        part: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_year src column c [as a]`.
    ExtractYear {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_month src column c [as a]`.
    ExtractMonth {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_day src column c [as a]`.
    ExtractDay {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_hour src column c [as a]`.
    ExtractHour {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_minute src column c [as a]`.
    ExtractMinute {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_second src column c [as a]`.
    ExtractSecond {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_dayofweek src column c [as a]`.
    ExtractDayofweek {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_dayofyear src column c [as a]`.
    ExtractDayofyear {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_weekofyear src column c [as a]`.
    ExtractWeekofyear {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `extract_quarter src column c [as a]`.
    ExtractQuarter {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `date_diff src start=c end=c [unit="days"] [as a]`.
    DateDiff {
        source: Identifier,
        start: Identifier,
        end: Identifier,
        unit: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `date_add src column c value=N unit=".." [as a]`.
    DateAdd {
        source: Identifier,
        column: Identifier,
        amount: i64,
        unit: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `date_subtract src column c value=N unit=".." [as a]`.
    DateSubtract {
        source: Identifier,
        column: Identifier,
        amount: i64,
        unit: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `format_datetime src column c format=".." [as a]`.
    FormatDatetime {
        source: Identifier,
        column: Identifier,
        format: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Types, encoding, scaling
    // ------------------------------------------------------------------
    /// `astype src column c [dtype="str"] [as a]`.
    Astype {
        source: Identifier,
        column: Identifier,
        dtype: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `to_numeric src column c [errors="raise"] [as a]`.
    ToNumeric {
        source: Identifier,
        column: Identifier,
        errors: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `one_hot_encode src column c [as a]`.
    OneHotEncode {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `label_encode src column c [as a]`.
    LabelEncode {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `standard_scale src column c [as a]`.
    StandardScale {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `minmax_scale src column c [as a]`.
    MinmaxScale {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `robust_scale src column c [as a]`.
    RobustScale {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `maxabs_scale src column c [as a]`.
    MaxabsScale {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `ordinal_encode src column c order=[..] [as a]`.
    OrdinalEncode {
        source: Identifier,
        column: Identifier,
        order: Vec<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `target_encode src column c target=".." [as a]`.
    TargetEncode {
        source: Identifier,
        column: Identifier,
        target: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------
    /// `sort_index src [ascending=b] [as a]`.
    SortIndex {
        source: Identifier,
        ascending: bool,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rank src column c [method="average"] [ascending=b] [pct=b] [as a]`.
    Rank {
        source: Identifier,
        column: Identifier,
        method: EcoString,
        ascending: bool,
        pct: bool,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Grouped and windowed operations
    // ------------------------------------------------------------------
    /// `filter_groups src by [..] condition="expr" [as a]`.
    FilterGroups {
        source: Identifier,
        by: Vec<Identifier>,
        condition: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `group_transform src by [..] column c function=".." [as a]`.
    GroupTransform {
        source: Identifier,
        by: Vec<Identifier>,
        column: Identifier,
        function: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `window_rank src column c [by [..]] [method="rank"] [ascending=b] [as a]`.
    WindowRank {
        source: Identifier,
        column: Identifier,
        by: Option<Vec<Identifier>>,
        method: EcoString,
        ascending: bool,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `window_lag src column c periods=N [by [..]] [fill_value=v] [as a]`.
    WindowLag {
        source: Identifier,
        column: Identifier,
        periods: i64,
        by: Option<Vec<Identifier>>,
        fill_value: Option<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `window_lead src column c periods=N [by [..]] [fill_value=v] [as a]`.
    WindowLead {
        source: Identifier,
        column: Identifier,
        periods: i64,
        by: Option<Vec<Identifier>>,
        fill_value: Option<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rolling_mean src column c window=N [min=N] [as a]`.
    RollingMean {
        source: Identifier,
        column: Identifier,
        window: i64,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rolling_sum src column c window=N [min=N] [as a]`.
    RollingSum {
        source: Identifier,
        column: Identifier,
        window: i64,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rolling_std src column c window=N [min=N] [as a]`.
    RollingStd {
        source: Identifier,
        column: Identifier,
        window: i64,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rolling_min src column c window=N [min=N] [as a]`.
    RollingMin {
        source: Identifier,
        column: Identifier,
        window: i64,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `rolling_max src column c window=N [min=N] [as a]`.
    RollingMax {
        source: Identifier,
        column: Identifier,
        window: i64,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `expanding_mean src column c [min=N] [as a]`.
    ExpandingMean {
        source: Identifier,
        column: Identifier,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `expanding_sum src column c [min=N] [as a]`.
    ExpandingSum {
        source: Identifier,
        column: Identifier,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `expanding_min src column c [min=N] [as a]`.
    ExpandingMin {
        source: Identifier,
        column: Identifier,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `expanding_max src column c [min=N] [as a]`.
    ExpandingMax {
        source: Identifier,
        column: Identifier,
        min_periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Cumulative and time-series transforms
    // ------------------------------------------------------------------
    /// `cumsum src column c [as a]`.
    Cumsum {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `cummax src column c [as a]`.
    Cummax {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `cummin src column c [as a]`.
    Cummin {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `cumprod src column c [as a]`.
    Cumprod {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `pct_change src column c [with periods=N] [as a]`.
    PctChange {
        source: Identifier,
        column: Identifier,
        periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `diff src column c [with periods=N] [as a]`.
    Diff {
        source: Identifier,
        column: Identifier,
        periods: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `shift src column c [with periods=N [fill_value=v]] [as a]`.
    Shift {
        source: Identifier,
        column: Identifier,
        periods: i64,
        fill_value: Option<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `resample src rule=".." column c aggfunc=".." [as a]`.
    Resample {
        source: Identifier,
        rule: EcoString,
        column: Identifier,
        aggfunc: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Reshaping
    // ------------------------------------------------------------------
    /// `pivot src index=".." columns=".." values=".." [as a]`.
    Pivot {
        source: Identifier,
        index: EcoString,
        columns: EcoString,
        values: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `pivot_table src index=".." columns=".." values=".." [aggfunc="mean"]
    /// [fill_value=v] [as a]`.
    PivotTable {
        source: Identifier,
        index: EcoString,
        columns: EcoString,
        values: EcoString,
        aggfunc: EcoString,
        fill_value: Option<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `melt src id_vars=[..] [value_vars=[..]] [var_name="variable"]
    /// [value_name="value"] [as a]`.
    Melt {
        source: Identifier,
        id_vars: Vec<Value>,
        value_vars: Option<Vec<Value>>,
        var_name: EcoString,
        value_name: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `stack src [level=N] [as a]`.
    Stack {
        source: Identifier,
        level: i64,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `unstack src [level=N] [fill_value=v] [as a]`.
    Unstack {
        source: Identifier,
        level: i64,
        fill_value: Option<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `transpose src [as a]`.
    Transpose {
        source: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `crosstab src rows=".." columns=".." [values=".." aggfunc="count"] [as a]`.
    Crosstab {
        source: Identifier,
        rows: EcoString,
        columns: EcoString,
        values: Option<EcoString>,
        aggfunc: EcoString,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `explode src column c [as a]`.
    Explode {
        source: Identifier,
        column: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Combining datasets
    // ------------------------------------------------------------------
    /// `merge a with b [on=".."] [left_on=".." right_on=".."] [how="inner"]
    /// [suffixes=[..]] [as r]`.
    Merge {
        left: Identifier,
        right: Identifier,
        on: Option<EcoString>,
        left_on: Option<EcoString>,
        right_on: Option<EcoString>,
        how: EcoString,
        suffixes: (EcoString, EcoString),
        alias: Option<Identifier>,
        span: Span,
    },
    /// `concat_vertical [a, b, ..] [ignore_index=b] [as r]`.
    ConcatVertical {
        sources: Vec<Identifier>,
        ignore_index: bool,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `concat_horizontal [a, b, ..] [ignore_index=b] [as r]`.
    ConcatHorizontal {
        sources: Vec<Identifier>,
        ignore_index: bool,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `union a with b [as r]` — row union, duplicates dropped.
    Union {
        left: Identifier,
        right: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `intersection a with b [as r]`.
    Intersection {
        left: Identifier,
        right: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `difference a with b [as r]` — rows in `a` not in `b`.
    Difference {
        left: Identifier,
        right: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `append a with b [as r]` — row concatenation, duplicates kept.
    Append {
        left: Identifier,
        right: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `cross_join a with b [as r]` — cartesian product.
    CrossJoin {
        left: Identifier,
        right: Identifier,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Index operations
    // ------------------------------------------------------------------
    /// `set_index src column c [drop=true] [as a]`.
    SetIndex {
        source: Identifier,
        column: Identifier,
        drop: bool,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `reset_index src [drop=false] [as a]`.
    ResetIndex {
        source: Identifier,
        drop: bool,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `reindex src with index=[..] [as a]`.
    Reindex {
        source: Identifier,
        index: Vec<Value>,
        alias: Option<Identifier>,
        span: Span,
    },
    /// `set_multiindex src columns [c1, ..] [as a]`.
    SetMultiindex {
        source: Identifier,
        columns: Vec<Identifier>,
        alias: Option<Identifier>,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Validation (display-only)
    // ------------------------------------------------------------------
    /// `assert_unique src column c`.
    AssertUnique {
        source: Identifier,
        column: Identifier,
        span: Span,
    },
    /// `assert_no_nulls src column c`.
    AssertNoNulls {
        source: Identifier,
        column: Identifier,
        span: Span,
    },
    /// `assert_range src column c [min=v] [max=v]`.
    AssertRange {
        source: Identifier,
        column: Identifier,
        min: Option<Value>,
        max: Option<Value>,
        span: Span,
    },
    /// `any src column c` — whether any value is truthy.
    Any {
        source: Identifier,
        column: Identifier,
        span: Span,
    },
    /// `all src column c` — whether all values are truthy.
    All {
        source: Identifier,
        column: Identifier,
        span: Span,
    },
    /// `count_true src column c`.
    CountTrue {
        source: Identifier,
        column: Identifier,
        span: Span,
    },

    // ------------------------------------------------------------------
    // Visualization (display-only)
    // ------------------------------------------------------------------
    /// `boxplot src columns {c1, ..}` or `boxplot src with c [by g]`.
    Boxplot {
        source: Identifier,
        columns: Vec<Identifier>,
        by: Option<Identifier>,
        span: Span,
    },
    /// `heatmap src columns {c1, ..}` — correlation heatmap.
    Heatmap {
        source: Identifier,
        columns: Vec<Identifier>,
        span: Span,
    },
    /// `pairplot src columns {c1, ..}`.
    Pairplot {
        source: Identifier,
        columns: Vec<Identifier>,
        span: Span,
    },
    /// `timeseries src x : c y : c`.
    Timeseries {
        source: Identifier,
        x: Identifier,
        y: Identifier,
        span: Span,
    },
    /// `pie src with values=c labels=c`.
    Pie {
        source: Identifier,
        values: Identifier,
        labels: Identifier,
        span: Span,
    },
}

impl Statement {
    /// Returns the span of the whole statement.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub const fn span(&self) -> Span {
        match self {
            Self::Load { span, .. }
            | Self::LoadSql { span, .. }
            | Self::Save { span, .. }
            | Self::ExportPlot { span, .. }
            | Self::Select { span, .. }
            | Self::Filter { span, .. }
            | Self::Sort { span, .. }
            | Self::Join { span, .. }
            | Self::Groupby { span, .. }
            | Self::Sample { span, .. }
            | Self::Drop { span, .. }
            | Self::Mutate { span, .. }
            | Self::Apply { span, .. }
            | Self::Map { span, .. }
            | Self::SelectByType { span, .. }
            | Self::Head { span, .. }
            | Self::Tail { span, .. }
            | Self::Iloc { span, .. }
            | Self::Loc { span, .. }
            | Self::Rename { span, .. }
            | Self::Reorder { span, .. }
            | Self::FilterBetween { span, .. }
            | Self::FilterIsin { span, .. }
            | Self::FilterContains { span, .. }
            | Self::FilterStartswith { span, .. }
            | Self::FilterEndswith { span, .. }
            | Self::FilterRegex { span, .. }
            | Self::FilterNull { span, .. }
            | Self::FilterNotnull { span, .. }
            | Self::FilterDuplicates { span, .. }
            | Self::Dropna { span, .. }
            | Self::Fillna { span, .. }
            | Self::Isnull { span, .. }
            | Self::Notnull { span, .. }
            | Self::CountNa { span, .. }
            | Self::FillForward { span, .. }
            | Self::FillBackward { span, .. }
            | Self::FillMean { span, .. }
            | Self::FillMedian { span, .. }
            | Self::FillMode { span, .. }
            | Self::Interpolate { span, .. }
            | Self::Duplicated { span, .. }
            | Self::CountDuplicates { span, .. }
            | Self::DropDuplicates { span, .. }
            | Self::Qcut { span, .. }
            | Self::Cut { span, .. }
            | Self::ApplyRow { span, .. }
            | Self::ApplyColumn { span, .. }
            | Self::Applymap { span, .. }
            | Self::MapValues { span, .. }
            | Self::AssignConst { span, .. }
            | Self::Describe { span, .. }
            | Self::Summary { span, .. }
            | Self::Info { span, .. }
            | Self::Unique { span, .. }
            | Self::ValueCounts { span, .. }
            | Self::Show { span, .. }
            | Self::Corr { span, .. }
            | Self::Cov { span, .. }
            | Self::Compare { span, .. }
            | Self::Outliers { span, .. }
            | Self::Quantile { span, .. }
            | Self::Normalize { span, .. }
            | Self::Binning { span, .. }
            | Self::Rolling { span, .. }
            | Self::Hypothesis { span, .. }
            | Self::Round { span, .. }
            | Self::Abs { span, .. }
            | Self::Sqrt { span, .. }
            | Self::Power { span, .. }
            | Self::Log { span, .. }
            | Self::Ceil { span, .. }
            | Self::Floor { span, .. }
            | Self::Upper { span, .. }
            | Self::Lower { span, .. }
            | Self::Strip { span, .. }
            | Self::Lstrip { span, .. }
            | Self::Rstrip { span, .. }
            | Self::Title { span, .. }
            | Self::Capitalize { span, .. }
            | Self::Replace { span, .. }
            | Self::Split { span, .. }
            | Self::Concat { span, .. }
            | Self::Substring { span, .. }
            | Self::Length { span, .. }
            | Self::ExtractRegex { span, .. }
            | Self::Find { span, .. }
            | Self::ParseDatetime { span, .. }
            | Self::Extract { span, .. }
            | Self::ExtractYear { span, .. }
            | Self::ExtractMonth { span, .. }
            | Self::ExtractDay { span, .. }
            | Self::ExtractHour { span, .. }
            | Self::ExtractMinute { span, .. }
            | Self::ExtractSecond { span, .. }
            | Self::ExtractDayofweek { span, .. }
            | Self::ExtractDayofyear { span, .. }
            | Self::ExtractWeekofyear { span, .. }
            | Self::ExtractQuarter { span, .. }
            | Self::DateDiff { span, .. }
            | Self::DateAdd { span, .. }
            | Self::DateSubtract { span, .. }
            | Self::FormatDatetime { span, .. }
            | Self::Astype { span, .. }
            | Self::ToNumeric { span, .. }
            | Self::OneHotEncode { span, .. }
            | Self::LabelEncode { span, .. }
            | Self::StandardScale { span, .. }
            | Self::MinmaxScale { span, .. }
            | Self::RobustScale { span, .. }
            | Self::MaxabsScale { span, .. }
            | Self::OrdinalEncode { span, .. }
            | Self::TargetEncode { span, .. }
            | Self::SortIndex { span, .. }
            | Self::Rank { span, .. }
            | Self::FilterGroups { span, .. }
            | Self::GroupTransform { span, .. }
            | Self::WindowRank { span, .. }
            | Self::WindowLag { span, .. }
            | Self::WindowLead { span, .. }
            | Self::RollingMean { span, .. }
            | Self::RollingSum { span, .. }
            | Self::RollingStd { span, .. }
            | Self::RollingMin { span, .. }
            | Self::RollingMax { span, .. }
            | Self::ExpandingMean { span, .. }
            | Self::ExpandingSum { span, .. }
            | Self::ExpandingMin { span, .. }
            | Self::ExpandingMax { span, .. }
            | Self::Cumsum { span, .. }
            | Self::Cummax { span, .. }
            | Self::Cummin { span, .. }
            | Self::Cumprod { span, .. }
            | Self::PctChange { span, .. }
            | Self::Diff { span, .. }
            | Self::Shift { span, .. }
            | Self::Resample { span, .. }
            | Self::Pivot { span, .. }
            | Self::PivotTable { span, .. }
            | Self::Melt { span, .. }
            | Self::Stack { span, .. }
            | Self::Unstack { span, .. }
            | Self::Transpose { span, .. }
            | Self::Crosstab { span, .. }
            | Self::Explode { span, .. }
            | Self::Merge { span, .. }
            | Self::ConcatVertical { span, .. }
            | Self::ConcatHorizontal { span, .. }
            | Self::Union { span, .. }
            | Self::Intersection { span, .. }
            | Self::Difference { span, .. }
            | Self::Append { span, .. }
            | Self::CrossJoin { span, .. }
            | Self::SetIndex { span, .. }
            | Self::ResetIndex { span, .. }
            | Self::Reindex { span, .. }
            | Self::SetMultiindex { span, .. }
            | Self::AssertUnique { span, .. }
            | Self::AssertNoNulls { span, .. }
            | Self::AssertRange { span, .. }
            | Self::Any { span, .. }
            | Self::All { span, .. }
            | Self::CountTrue { span, .. }
            | Self::Boxplot { span, .. }
            | Self::Heatmap { span, .. }
            | Self::Pairplot { span, .. }
            | Self::Timeseries { span, .. }
            | Self::Pie { span, .. } => *span,
        }
    }

    /// Returns the destination alias this statement registers, if any.
    ///
    /// `None` covers both display-mode statements (the `as` clause was
    /// omitted) and statements that never take one.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn alias(&self) -> Option<&Identifier> {
        match self {
            // Loads always bind an alias.
            Self::Load { alias, .. } | Self::LoadSql { alias, .. } => Some(alias),

            // Display-only statements never bind one.
            Self::Save { .. }
            | Self::ExportPlot { .. }
            | Self::CountNa { .. }
            | Self::CountDuplicates { .. }
            | Self::Describe { .. }
            | Self::Summary { .. }
            | Self::Info { .. }
            | Self::Unique { .. }
            | Self::ValueCounts { .. }
            | Self::Show { .. }
            | Self::Corr { .. }
            | Self::Cov { .. }
            | Self::Compare { .. }
            | Self::Outliers { .. }
            | Self::Quantile { .. }
            | Self::Hypothesis { .. }
            | Self::AssertUnique { .. }
            | Self::AssertNoNulls { .. }
            | Self::AssertRange { .. }
            | Self::Any { .. }
            | Self::All { .. }
            | Self::CountTrue { .. }
            | Self::Boxplot { .. }
            | Self::Heatmap { .. }
            | Self::Pairplot { .. }
            | Self::Timeseries { .. }
            | Self::Pie { .. } => None,

            Self::Select { alias, .. }
            | Self::Filter { alias, .. }
            | Self::Sort { alias, .. }
            | Self::Join { alias, .. }
            | Self::Groupby { alias, .. }
            | Self::Sample { alias, .. }
            | Self::Drop { alias, .. }
            | Self::Mutate { alias, .. }
            | Self::Apply { alias, .. }
            | Self::Map { alias, .. }
            | Self::SelectByType { alias, .. }
            | Self::Head { alias, .. }
            | Self::Tail { alias, .. }
            | Self::Iloc { alias, .. }
            | Self::Loc { alias, .. }
            | Self::Rename { alias, .. }
            | Self::Reorder { alias, .. }
            | Self::FilterBetween { alias, .. }
            | Self::FilterIsin { alias, .. }
            | Self::FilterContains { alias, .. }
            | Self::FilterStartswith { alias, .. }
            | Self::FilterEndswith { alias, .. }
            | Self::FilterRegex { alias, .. }
            | Self::FilterNull { alias, .. }
            | Self::FilterNotnull { alias, .. }
            | Self::FilterDuplicates { alias, .. }
            | Self::Dropna { alias, .. }
            | Self::Fillna { alias, .. }
            | Self::Isnull { alias, .. }
            | Self::Notnull { alias, .. }
            | Self::FillForward { alias, .. }
            | Self::FillBackward { alias, .. }
            | Self::FillMean { alias, .. }
            | Self::FillMedian { alias, .. }
            | Self::FillMode { alias, .. }
            | Self::Interpolate { alias, .. }
            | Self::Duplicated { alias, .. }
            | Self::DropDuplicates { alias, .. }
            | Self::Qcut { alias, .. }
            | Self::Cut { alias, .. }
            | Self::ApplyRow { alias, .. }
            | Self::ApplyColumn { alias, .. }
            | Self::Applymap { alias, .. }
            | Self::MapValues { alias, .. }
            | Self::AssignConst { alias, .. }
            | Self::Normalize { alias, .. }
            | Self::Binning { alias, .. }
            | Self::Rolling { alias, .. }
            | Self::Round { alias, .. }
            | Self::Abs { alias, .. }
            | Self::Sqrt { alias, .. }
            | Self::Power { alias, .. }
            | Self::Log { alias, .. }
            | Self::Ceil { alias, .. }
            | Self::Floor { alias, .. }
            | Self::Upper { alias, .. }
            | Self::Lower { alias, .. }
            | Self::Strip { alias, .. }
            | Self::Lstrip { alias, .. }
            | Self::Rstrip { alias, .. }
            | Self::Title { alias, .. }
            | Self::Capitalize { alias, .. }
            | Self::Replace { alias, .. }
            | Self::Split { alias, .. }
            | Self::Concat { alias, .. }
            | Self::Substring { alias, .. }
            | Self::Length { alias, .. }
            | Self::ExtractRegex { alias, .. }
            | Self::Find { alias, .. }
            | Self::ParseDatetime { alias, .. }
            | Self::Extract { alias, .. }
            | Self::ExtractYear { alias, .. }
            | Self::ExtractMonth { alias, .. }
            | Self::ExtractDay { alias, .. }
            | Self::ExtractHour { alias, .. }
            | Self::ExtractMinute { alias, .. }
            | Self::ExtractSecond { alias, .. }
            | Self::ExtractDayofweek { alias, .. }
            | Self::ExtractDayofyear { alias, .. }
            | Self::ExtractWeekofyear { alias, .. }
            | Self::ExtractQuarter { alias, .. }
            | Self::DateDiff { alias, .. }
            | Self::DateAdd { alias, .. }
            | Self::DateSubtract { alias, .. }
            | Self::FormatDatetime { alias, .. }
            | Self::Astype { alias, .. }
            | Self::ToNumeric { alias, .. }
            | Self::OneHotEncode { alias, .. }
            | Self::LabelEncode { alias, .. }
            | Self::StandardScale { alias, .. }
            | Self::MinmaxScale { alias, .. }
            | Self::RobustScale { alias, .. }
            | Self::MaxabsScale { alias, .. }
            | Self::OrdinalEncode { alias, .. }
            | Self::TargetEncode { alias, .. }
            | Self::SortIndex { alias, .. }
            | Self::Rank { alias, .. }
            | Self::FilterGroups { alias, .. }
            | Self::GroupTransform { alias, .. }
            | Self::WindowRank { alias, .. }
            | Self::WindowLag { alias, .. }
            | Self::WindowLead { alias, .. }
            | Self::RollingMean { alias, .. }
            | Self::RollingSum { alias, .. }
            | Self::RollingStd { alias, .. }
            | Self::RollingMin { alias, .. }
            | Self::RollingMax { alias, .. }
            | Self::ExpandingMean { alias, .. }
            | Self::ExpandingSum { alias, .. }
            | Self::ExpandingMin { alias, .. }
            | Self::ExpandingMax { alias, .. }
            | Self::Cumsum { alias, .. }
            | Self::Cummax { alias, .. }
            | Self::Cummin { alias, .. }
            | Self::Cumprod { alias, .. }
            | Self::PctChange { alias, .. }
            | Self::Diff { alias, .. }
            | Self::Shift { alias, .. }
            | Self::Resample { alias, .. }
            | Self::Pivot { alias, .. }
            | Self::PivotTable { alias, .. }
            | Self::Melt { alias, .. }
            | Self::Stack { alias, .. }
            | Self::Unstack { alias, .. }
            | Self::Transpose { alias, .. }
            | Self::Crosstab { alias, .. }
            | Self::Explode { alias, .. }
            | Self::Merge { alias, .. }
            | Self::ConcatVertical { alias, .. }
            | Self::ConcatHorizontal { alias, .. }
            | Self::Union { alias, .. }
            | Self::Intersection { alias, .. }
            | Self::Difference { alias, .. }
            | Self::Append { alias, .. }
            | Self::CrossJoin { alias, .. }
            | Self::SetIndex { alias, .. }
            | Self::ResetIndex { alias, .. }
            | Self::Reindex { alias, .. }
            | Self::SetMultiindex { alias, .. } => alias.as_ref(),
        }
    }

    /// Whether this statement runs in display mode: it produces something to
    /// show and no alias to register.
    #[must_use]
    pub fn is_display(&self) -> bool {
        self.alias().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, Span::new(0, name.len() as u32))
    }

    #[test]
    fn span_is_reported_for_statements() {
        let stmt = Statement::Summary {
            source: ident("sales"),
            span: Span::new(0, 13),
        };
        assert_eq!(stmt.span(), Span::new(0, 13));
    }

    #[test]
    fn load_always_has_an_alias() {
        let stmt = Statement::Load {
            path: "sales.csv".into(),
            format: Some(FileFormat::Csv),
            params: Vec::new(),
            alias: ident("sales"),
            span: Span::new(0, 24),
        };
        assert_eq!(stmt.alias().map(|a| a.name.as_str()), Some("sales"));
        assert!(!stmt.is_display());
    }

    #[test]
    fn omitted_as_clause_means_display_mode() {
        let displayed = Statement::Filter {
            source: ident("sales"),
            condition: Condition::Comparison {
                column: ident("price"),
                op: CompareOp::Gt,
                value: Value::Int(100),
            },
            alias: None,
            span: Span::new(0, 28),
        };
        assert!(displayed.is_display());

        let stored = Statement::Filter {
            source: ident("sales"),
            condition: Condition::IsNull {
                column: ident("discount"),
                negated: true,
            },
            alias: Some(ident("expensive")),
            span: Span::new(0, 41),
        };
        assert_eq!(stored.alias().map(|a| a.name.as_str()), Some("expensive"));
    }

    #[test]
    fn inspection_statements_are_always_display() {
        let stmt = Statement::Describe {
            source: ident("sales"),
            columns: None,
            span: Span::new(0, 14),
        };
        assert!(stmt.is_display());
        assert!(stmt.alias().is_none());
    }

    #[test]
    fn file_format_sniffing() {
        assert_eq!(FileFormat::from_path("data/sales.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path("DATA.JSON"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path("book.xlsx"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::from_path("book.xls"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::from_path("t.parquet"), Some(FileFormat::Parquet));
        assert_eq!(FileFormat::from_path("query.sql"), None);
        assert_eq!(FileFormat::from_path("noext"), None);
    }

    #[test]
    fn expr_spans_follow_structure() {
        let col = Expr::Column(ident("price"));
        assert_eq!(col.span(), Span::new(0, 5));

        let expr = Expr::Binary {
            left: Box::new(Expr::Column(ident("price"))),
            op: BinOp::Mul,
            right: Box::new(Expr::Literal(Value::Float(1.1), Span::new(8, 11))),
            span: Span::new(0, 11),
        };
        assert_eq!(expr.span(), Span::new(0, 11));
    }
}
