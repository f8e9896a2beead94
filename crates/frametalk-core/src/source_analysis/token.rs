// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tokens produced by the lexer.
//!
//! Frametalk has a large, closed keyword vocabulary: every operation name
//! (`select`, `groupby`, `rolling_mean`, ...) and every clause or parameter
//! name (`as`, `columns`, `fill_value`, ...) is a [`Keyword`]. Keyword lookup
//! is case-insensitive. Numeric literals keep their lexeme text; conversion
//! to `i64`/`f64` happens in the parser where a malformed literal can be
//! reported with full context.

use crate::source_analysis::Span;
use ecow::EcoString;
use std::fmt;

/// A single token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A reserved word from the keyword table.
    Keyword(Keyword),
    /// An identifier (dataset alias, column name, function name).
    Ident(EcoString),
    /// A double-quoted string literal, with escapes resolved.
    Str(EcoString),
    /// An integer literal, kept as lexeme text.
    Int(EcoString),
    /// A floating-point literal, kept as lexeme text.
    Float(EcoString),
    /// `true` or `false`.
    Bool(bool),

    // Comparison operators
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Arithmetic and assignment
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    Dot,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,

    /// End of input. Always the final token.
    Eof,
}

impl TokenKind {
    /// Whether this token ends the input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }

    /// Short human-readable description used in syntax error messages.
    #[must_use]
    pub fn describe(&self) -> EcoString {
        match self {
            TokenKind::Keyword(kw) => EcoString::from(format!("'{}'", kw.as_str())),
            TokenKind::Ident(name) => EcoString::from(format!("identifier '{name}'")),
            TokenKind::Str(_) => "string literal".into(),
            TokenKind::Int(_) | TokenKind::Float(_) => "numeric literal".into(),
            TokenKind::Bool(_) => "boolean literal".into(),
            TokenKind::EqEq => "'=='".into(),
            TokenKind::BangEq => "'!='".into(),
            TokenKind::Lt => "'<'".into(),
            TokenKind::Gt => "'>'".into(),
            TokenKind::LtEq => "'<='".into(),
            TokenKind::GtEq => "'>='".into(),
            TokenKind::Assign => "'='".into(),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Slash => "'/'".into(),
            TokenKind::Percent => "'%'".into(),
            TokenKind::StarStar => "'**'".into(),
            TokenKind::Dot => "'.'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

macro_rules! keywords {
    (
        statement_heads { $($head:ident => $head_text:literal,)+ }
        clause_words { $($word:ident => $word_text:literal,)+ }
    ) => {
        /// Every reserved word in the language.
        ///
        /// Statement-head keywords begin a statement; clause words introduce
        /// clauses or name parameters inside one. Many clause words are also
        /// legal as column names in positions where the grammar expects a
        /// column (the parser handles that).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($head,)+
            $($word,)+
        }

        impl Keyword {
            /// Case-insensitive keyword lookup.
            #[must_use]
            pub fn from_ident(text: &str) -> Option<Self> {
                let lowered = text.to_ascii_lowercase();
                match lowered.as_str() {
                    $($head_text => Some(Self::$head),)+
                    $($word_text => Some(Self::$word),)+
                    _ => None,
                }
            }

            /// The canonical (lowercase) spelling.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$head => $head_text,)+
                    $(Self::$word => $word_text,)+
                }
            }

            /// Whether this keyword can begin a statement.
            #[must_use]
            pub fn is_statement_head(self) -> bool {
                matches!(self, $(Self::$head)|+)
            }
        }
    };
}

keywords! {
    statement_heads {
        // Core operations
        Load => "load",
        Select => "select",
        Filter => "filter",
        Sort => "sort",
        Join => "join",
        Groupby => "groupby",
        Sample => "sample",
        Drop => "drop",
        Dropna => "dropna",
        Fillna => "fillna",
        Mutate => "mutate",
        Apply => "apply",
        Describe => "describe",
        Summary => "summary",
        Outliers => "outliers",
        Quantile => "quantile",
        Normalize => "normalize",
        Binning => "binning",
        Rolling => "rolling",
        Hypothesis => "hypothesis",
        Boxplot => "boxplot",
        Heatmap => "heatmap",
        Pairplot => "pairplot",
        Timeseries => "timeseries",
        Pie => "pie",
        Save => "save",
        ExportPlot => "export_plot",
        Info => "info",
        Unique => "unique",
        ValueCounts => "value_counts",
        Show => "show",
        // Selection and projection
        SelectByType => "select_by_type",
        Head => "head",
        Tail => "tail",
        Iloc => "iloc",
        Loc => "loc",
        Rename => "rename",
        Reorder => "reorder",
        // Parameterised filters
        FilterBetween => "filter_between",
        FilterIsin => "filter_isin",
        FilterContains => "filter_contains",
        FilterStartswith => "filter_startswith",
        FilterEndswith => "filter_endswith",
        FilterRegex => "filter_regex",
        FilterNull => "filter_null",
        FilterNotnull => "filter_notnull",
        FilterDuplicates => "filter_duplicates",
        // Math transforms
        Round => "round",
        Abs => "abs",
        Sqrt => "sqrt",
        Power => "power",
        Log => "log",
        Ceil => "ceil",
        Floor => "floor",
        // String transforms
        Upper => "upper",
        Lower => "lower",
        Strip => "strip",
        Lstrip => "lstrip",
        Rstrip => "rstrip",
        Title => "title",
        Capitalize => "capitalize",
        Replace => "replace",
        Split => "split",
        Concat => "concat",
        Substring => "substring",
        Length => "length",
        ExtractRegex => "extract_regex",
        Find => "find",
        // Datetime transforms
        ParseDatetime => "parse_datetime",
        Extract => "extract",
        ExtractYear => "extract_year",
        ExtractMonth => "extract_month",
        ExtractDay => "extract_day",
        ExtractHour => "extract_hour",
        ExtractMinute => "extract_minute",
        ExtractSecond => "extract_second",
        ExtractDayofweek => "extract_dayofweek",
        ExtractDayofyear => "extract_dayofyear",
        ExtractWeekofyear => "extract_weekofyear",
        ExtractQuarter => "extract_quarter",
        DateDiff => "date_diff",
        DateAdd => "date_add",
        DateSubtract => "date_subtract",
        FormatDatetime => "format_datetime",
        // Types, encoding, scaling
        Astype => "astype",
        ToNumeric => "to_numeric",
        OneHotEncode => "one_hot_encode",
        LabelEncode => "label_encode",
        StandardScale => "standard_scale",
        MinmaxScale => "minmax_scale",
        RobustScale => "robust_scale",
        MaxabsScale => "maxabs_scale",
        OrdinalEncode => "ordinal_encode",
        TargetEncode => "target_encode",
        // Cleaning
        Isnull => "isnull",
        Notnull => "notnull",
        CountNa => "count_na",
        FillForward => "fill_forward",
        FillBackward => "fill_backward",
        FillMean => "fill_mean",
        FillMedian => "fill_median",
        FillMode => "fill_mode",
        Interpolate => "interpolate",
        Duplicated => "duplicated",
        CountDuplicates => "count_duplicates",
        DropDuplicates => "drop_duplicates",
        Qcut => "qcut",
        Cut => "cut",
        // Ordering
        SortIndex => "sort_index",
        Rank => "rank",
        // Grouped and windowed
        FilterGroups => "filter_groups",
        GroupTransform => "group_transform",
        WindowRank => "window_rank",
        WindowLag => "window_lag",
        WindowLead => "window_lead",
        RollingMean => "rolling_mean",
        RollingSum => "rolling_sum",
        RollingStd => "rolling_std",
        RollingMin => "rolling_min",
        RollingMax => "rolling_max",
        ExpandingMean => "expanding_mean",
        ExpandingSum => "expanding_sum",
        ExpandingMin => "expanding_min",
        ExpandingMax => "expanding_max",
        // Cumulative and time series
        Cumsum => "cumsum",
        Cummax => "cummax",
        Cummin => "cummin",
        Cumprod => "cumprod",
        PctChange => "pct_change",
        Diff => "diff",
        Shift => "shift",
        // Reshaping
        Pivot => "pivot",
        PivotTable => "pivot_table",
        Melt => "melt",
        Stack => "stack",
        Unstack => "unstack",
        Transpose => "transpose",
        Crosstab => "crosstab",
        Explode => "explode",
        // Combining
        Merge => "merge",
        ConcatVertical => "concat_vertical",
        ConcatHorizontal => "concat_horizontal",
        Union => "union",
        Intersection => "intersection",
        Difference => "difference",
        Append => "append",
        CrossJoin => "cross_join",
        Compare => "compare",
        // Index operations
        SetIndex => "set_index",
        ResetIndex => "reset_index",
        Reindex => "reindex",
        SetMultiindex => "set_multiindex",
        // Row/element application
        ApplyRow => "apply_row",
        ApplyColumn => "apply_column",
        Applymap => "applymap",
        Map => "map",
        MapValues => "map_values",
        Resample => "resample",
        AssignConst => "assign",
        // Statistics and validation
        Corr => "corr",
        Cov => "cov",
        AssertUnique => "assert_unique",
        AssertNoNulls => "assert_no_nulls",
        AssertRange => "assert_range",
        Any => "any",
        All => "all",
        CountTrue => "count_true",
    }
    clause_words {
        // File formats
        Csv => "csv",
        Json => "json",
        Excel => "excel",
        Parquet => "parquet",
        Sql => "sql",
        // Clause introducers
        As => "as",
        By => "by",
        With => "with",
        On => "on",
        From => "from",
        Agg => "agg",
        Compute => "compute",
        Column => "column",
        Columns => "columns",
        Transform => "transform",
        Where => "where",
        To => "to",
        Vs => "vs",
        Test => "test",
        Is => "is",
        In => "in",
        And => "and",
        Or => "or",
        Not => "not",
        Between => "between",
        Contains => "contains",
        StartsWith => "starts_with",
        EndsWith => "ends_with",
        Matches => "matches",
        Null => "null",
        Else => "else",
        Asc => "asc",
        Desc => "desc",
        // Parameter names
        Value => "value",
        Values => "values",
        N => "n",
        Random => "random",
        Method => "method",
        Q => "q",
        Bins => "bins",
        Window => "window",
        Function => "function",
        X => "x",
        Y => "y",
        Labels => "labels",
        Format => "format",
        Filename => "filename",
        Width => "width",
        Height => "height",
        Type => "type",
        Rows => "rows",
        Mapping => "mapping",
        Order => "order",
        Limit => "limit",
        Offset => "offset",
        First => "first",
        Last => "last",
        Min => "min",
        Max => "max",
        Pattern => "pattern",
        Keep => "keep",
        Part => "part",
        Decimals => "decimals",
        Exponent => "exponent",
        Base => "base",
        Separator => "separator",
        Unit => "unit",
        Old => "old",
        New => "new",
        DelimiterStr => "delimiter_str",
        Start => "start",
        End => "end",
        DtypeStr => "dtype_str",
        Errors => "errors",
        Strategy => "strategy",
        Axis => "axis",
        Ascending => "ascending",
        Periods => "periods",
        IdVars => "id_vars",
        ValueVars => "value_vars",
        VarName => "var_name",
        ValueName => "value_name",
        Left => "left",
        Right => "right",
        LeftOn => "left_on",
        RightOn => "right_on",
        Suffixes => "suffixes",
        How => "how",
        Aggfunc => "aggfunc",
        FillValue => "fill_value",
        Level => "level",
        Rule => "rule",
        Condition => "condition",
        Pct => "pct",
        IgnoreIndex => "ignore_index",
        Target => "target",
        Chars => "chars",
        Group => "group",
        IncludeLowest => "include_lowest",
        // Load/save parameters
        Delimiter => "delimiter",
        Encoding => "encoding",
        Header => "header",
        Names => "names",
        Usecols => "usecols",
        Dtype => "dtype",
        Skiprows => "skiprows",
        Nrows => "nrows",
        NaValues => "na_values",
        Thousands => "thousands",
        Decimal => "decimal",
        Comment => "comment",
        SkipBlankLines => "skip_blank_lines",
        ParseDates => "parse_dates",
        DateFormat => "date_format",
        Chunksize => "chunksize",
        Compression => "compression",
        LowMemory => "low_memory",
        MemoryMap => "memory_map",
        Orient => "orient",
        Typ => "typ",
        ConvertAxes => "convert_axes",
        ConvertDates => "convert_dates",
        PreciseFloat => "precise_float",
        DateUnit => "date_unit",
        Lines => "lines",
        Sheet => "sheet",
        SheetName => "sheet_name",
        IndexCol => "index_col",
        Engine => "engine",
        Converters => "converters",
        Skipfooter => "skipfooter",
        Filters => "filters",
        UseNullableDtypes => "use_nullable_dtypes",
        StorageOptions => "storage_options",
        Params => "params",
        CoerceFloat => "coerce_float",
        Index => "index",
        IndexLabel => "index_label",
        NaRep => "na_rep",
        Mode => "mode",
        Quoting => "quoting",
        Quotechar => "quotechar",
        Escapechar => "escapechar",
        Lineterminator => "lineterminator",
        FloatFormat => "float_format",
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
