// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for frametalk source code.
//!
//! The parser turns the lexer's token stream into a `Vec<Statement>`. The
//! language is line-oriented in spirit but newline-insensitive in practice:
//! every statement begins with a statement-head keyword, so statements
//! self-delimit and a single lookahead token is enough everywhere.
//!
//! Parsing is fail-fast. The first syntax error aborts with a [`ParseError`]
//! carrying the offending span; there is no recovery or resynchronization.
//! Later pipeline stages only ever see a fully well-formed program.
//!
//! Statement parsers live in three submodules split by operation family;
//! the condition and transform-expression grammars live in a fourth. This
//! module owns the token cursor, the shared clause parsers (column lists,
//! `as` clauses, parameter runs, literal values) and statement dispatch.
//!
//! # Usage
//!
//! ```
//! use frametalk_core::source_analysis::{parse, tokenize};
//!
//! let tokens = tokenize(r#"load "sales.csv" as sales"#).unwrap();
//! let program = parse(tokens).unwrap();
//! assert_eq!(program.len(), 1);
//! ```

use ecow::EcoString;

use crate::ast::{Identifier, Param, Statement, Value};
use crate::source_analysis::{ParseError, Span, Token, TokenKind, token::Keyword};

mod expressions;
mod reshape;
mod statements;
mod transforms;

#[cfg(test)]
mod property_tests;

/// Maximum nesting depth for conditions and transform expressions.
///
/// Prevents stack overflow on deeply nested input (e.g. `((((..))))`).
/// Each level burns several frames through the recursive grammar, so the
/// limit is deliberately far below any real stack bound while remaining
/// generous for hand-written programs.
///
/// As a second line of defence, `stacker::maybe_grow` is used at the
/// recursive entry points so the stack is extended on the heap if needed.
const MAX_NESTING_DEPTH: usize = 64;

/// Parses a token stream into a program.
///
/// The token stream must end with an EOF token, as produced by
/// [`tokenize`](crate::source_analysis::tokenize). Returns the statements in
/// source order, or the first syntax error encountered.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first token that does not fit the
/// grammar.
///
/// # Examples
///
/// ```
/// use frametalk_core::source_analysis::{parse, tokenize};
///
/// let tokens = tokenize("filter sales where price > 100 as expensive").unwrap();
/// let program = parse(tokens).unwrap();
/// assert_eq!(program.len(), 1);
/// ```
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser::new(tokens);
    let mut statements = Vec::new();
    while !parser.is_at_end() {
        statements.push(parser.parse_statement()?);
    }
    Ok(statements)
}

/// The parser state: a token buffer and a cursor.
pub(super) struct Parser {
    /// The tokens being parsed. Always ends with an EOF token.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Current expression nesting depth (guards against stack overflow).
    nesting_depth: usize,
}

impl Parser {
    /// Creates a new parser for the given tokens.
    fn new(mut tokens: Vec<Token>) -> Self {
        // Guarantee the EOF sentinel so cursor fallbacks never index out of
        // bounds, even for callers that hand-build token vectors.
        if !tokens.last().is_some_and(|t| t.kind.is_eof()) {
            let end = tokens.last().map_or(Span::new(0, 0), |t| t.span);
            tokens.push(Token::new(TokenKind::Eof, Span::point(end.end())));
        }
        Self {
            tokens,
            current: 0,
            nesting_depth: 0,
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    /// Returns the current token, falling back to the trailing EOF if the
    /// cursor has run past the end.
    pub(super) fn current_token(&self) -> &Token {
        let idx = self.current.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Returns the current token kind.
    pub(super) fn current_kind(&self) -> &TokenKind {
        &self.current_token().kind
    }

    /// Returns the current token span.
    pub(super) fn current_span(&self) -> Span {
        self.current_token().span
    }

    /// Returns the span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        let idx = self.current.saturating_sub(1).min(self.tokens.len() - 1);
        self.tokens[idx].span
    }

    /// A statement span running from `start` through the last consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous_span())
    }

    /// Checks if we're at the end of input.
    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Peeks at the next token kind without consuming.
    pub(super) fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.current + 1).map(|t| &t.kind)
    }

    /// Advances to the next token and returns the consumed one.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Whether the current token is exactly the given keyword.
    pub(super) fn at_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current_kind(), TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Consumes the current token if it is the given keyword.
    pub(super) fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the given keyword, advancing past it.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, ParseError> {
        if self.at_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(
                &format!("'{}'", keyword.as_str()),
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    /// Consumes the current token if it equals `kind`. Only meaningful for
    /// payload-free kinds (punctuation and operators).
    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.current_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects an exact punctuation or operator token.
    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.current_kind() == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(
                &kind.describe(),
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    // ------------------------------------------------------------------
    // Nesting guard
    // ------------------------------------------------------------------

    /// Bumps the nesting depth, failing once the recursion limit is hit.
    pub(super) fn enter_nesting(&mut self) -> Result<(), ParseError> {
        self.nesting_depth += 1;
        if self.nesting_depth > MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                "Expression is nested too deeply",
                self.current_span(),
            ));
        }
        Ok(())
    }

    /// Pops one nesting level.
    pub(super) fn exit_nesting(&mut self) {
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// Expects a dataset name.
    ///
    /// Dataset names and aliases collide freely with the whole keyword
    /// vocabulary (`as summary`, `as cut`): the grammar demands a name in
    /// every position this is called from, so any keyword sitting there is
    /// the name.
    pub(super) fn expect_source(&mut self) -> Result<Identifier, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let token = self.advance();
                Ok(Identifier::new(name, token.span))
            }
            TokenKind::Keyword(kw) => {
                let name = EcoString::from(kw.as_str());
                let token = self.advance();
                Ok(Identifier::new(name, token.span))
            }
            kind => Err(ParseError::expected(
                "a dataset name",
                kind,
                self.current_span(),
            )),
        }
    }

    /// Expects a column name.
    ///
    /// Column names collide freely with the clause-word vocabulary (`value`,
    /// `min`, `type`, ...), so any keyword that cannot begin a statement is
    /// accepted here alongside plain identifiers.
    pub(super) fn expect_column_name(&mut self) -> Result<Identifier, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let token = self.advance();
                Ok(Identifier::new(name, token.span))
            }
            TokenKind::Keyword(kw) if !kw.is_statement_head() => {
                let name = EcoString::from(kw.as_str());
                let token = self.advance();
                Ok(Identifier::new(name, token.span))
            }
            kind => Err(ParseError::expected(
                "a column name",
                kind,
                self.current_span(),
            )),
        }
    }

    /// Whether the current token could start a column name.
    pub(super) fn at_column_name(&self) -> bool {
        match self.current_kind() {
            TokenKind::Ident(_) => true,
            TokenKind::Keyword(kw) => !kw.is_statement_head(),
            _ => false,
        }
    }

    /// Expects a string literal, returning its text and span.
    pub(super) fn expect_str(&mut self) -> Result<(EcoString, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Str(text) => {
                let text = text.clone();
                let token = self.advance();
                Ok((text, token.span))
            }
            kind => Err(ParseError::expected(
                "a string literal",
                kind,
                self.current_span(),
            )),
        }
    }

    /// Expects an integer literal.
    pub(super) fn expect_int(&mut self) -> Result<i64, ParseError> {
        match self.current_kind() {
            TokenKind::Int(text) => {
                let span = self.current_span();
                let value = text
                    .parse::<i64>()
                    .map_err(|_| ParseError::new("Integer literal out of range", span))?;
                self.advance();
                Ok(value)
            }
            kind => Err(ParseError::expected(
                "an integer",
                kind,
                self.current_span(),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Clauses shared across statement families
    // ------------------------------------------------------------------

    /// Parses an optional trailing `as alias` clause.
    pub(super) fn parse_as_clause(&mut self) -> Result<Option<Identifier>, ParseError> {
        if self.eat_keyword(Keyword::As) {
            let alias = self.expect_source()?;
            Ok(Some(alias))
        } else {
            Ok(None)
        }
    }

    /// Parses a required `as alias` clause (loads must bind a name).
    pub(super) fn expect_as_clause(&mut self) -> Result<Identifier, ParseError> {
        self.expect_keyword(Keyword::As)?;
        self.expect_source()
    }

    /// Parses a braced column list: `{ c1, c2, .. }`. A trailing comma is
    /// tolerated and the list may be empty.
    pub(super) fn parse_braced_columns(&mut self) -> Result<Vec<Identifier>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut columns = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            columns.push(self.expect_column_name()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBrace)?;
                break;
            }
        }
        Ok(columns)
    }

    /// Parses a natural comma-separated column list (the `with c1, c2` form
    /// of `select`). Stops before `as` or anything that cannot be a column.
    pub(super) fn parse_natural_columns(&mut self) -> Result<Vec<Identifier>, ParseError> {
        let mut columns = vec![self.expect_column_name()?];
        while self.eat(&TokenKind::Comma) {
            columns.push(self.expect_column_name()?);
        }
        Ok(columns)
    }

    /// Parses a bracketed name list: `[ a, b ]`. Elements may be identifiers
    /// or string literals; both become plain names.
    pub(super) fn parse_bracket_names(&mut self) -> Result<Vec<Identifier>, ParseError> {
        self.expect(&TokenKind::LBracket)?;
        let mut names = Vec::new();
        while !self.eat(&TokenKind::RBracket) {
            let name = match self.current_kind() {
                TokenKind::Str(text) => {
                    let text = text.clone();
                    let token = self.advance();
                    Identifier::new(text, token.span)
                }
                _ => self.expect_column_name()?,
            };
            names.push(name);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBracket)?;
                break;
            }
        }
        Ok(names)
    }

    /// Parses a literal value: string, number (optionally negated), boolean,
    /// `null`, a list, a dictionary, or a bare identifier.
    pub(super) fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.current_kind() {
            TokenKind::Str(text) => {
                let value = Value::Str(text.clone());
                self.advance();
                Ok(value)
            }
            TokenKind::Int(_) | TokenKind::Float(_) => self.parse_number(false),
            TokenKind::Minus => {
                self.advance();
                self.parse_number(true)
            }
            TokenKind::Bool(b) => {
                let value = Value::Bool(*b);
                self.advance();
                Ok(value)
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Value::Null)
            }
            TokenKind::LBracket => Ok(Value::List(self.parse_list_value()?)),
            TokenKind::LBrace => Ok(Value::Dict(self.parse_dict_value()?)),
            TokenKind::Ident(name) => {
                let value = if name.eq_ignore_ascii_case("none") {
                    Value::Null
                } else {
                    Value::Ident(name.clone())
                };
                self.advance();
                Ok(value)
            }
            // Clause words double as bare identifier values (`base=e`).
            TokenKind::Keyword(kw) if !kw.is_statement_head() => {
                let value = Value::Ident(kw.as_str().into());
                self.advance();
                Ok(value)
            }
            kind => Err(ParseError::expected("a value", kind, self.current_span())),
        }
    }

    /// Parses a numeric literal into [`Value::Int`] or [`Value::Float`].
    fn parse_number(&mut self, negated: bool) -> Result<Value, ParseError> {
        let span = self.current_span();
        match self.current_kind() {
            TokenKind::Int(text) => {
                let magnitude = text
                    .parse::<i64>()
                    .map_err(|_| ParseError::new("Integer literal out of range", span))?;
                self.advance();
                Ok(Value::Int(if negated { -magnitude } else { magnitude }))
            }
            TokenKind::Float(text) => {
                let magnitude = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::new("Malformed numeric literal", span))?;
                self.advance();
                Ok(Value::Float(if negated { -magnitude } else { magnitude }))
            }
            kind => Err(ParseError::expected("a number", kind, span)),
        }
    }

    /// Parses a bracketed value list: `[ v1, v2, .. ]` (trailing comma ok).
    pub(super) fn parse_list_value(&mut self) -> Result<Vec<Value>, ParseError> {
        self.expect(&TokenKind::LBracket)?;
        let mut values = Vec::new();
        while !self.eat(&TokenKind::RBracket) {
            values.push(self.parse_value()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBracket)?;
                break;
            }
        }
        Ok(values)
    }

    /// Parses a braced dictionary: `{ "key": v, .. }` (trailing comma ok).
    /// Keys may be string literals, identifiers, or clause words.
    pub(super) fn parse_dict_value(&mut self) -> Result<Vec<(EcoString, Value)>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut entries = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let key = match self.current_kind() {
                TokenKind::Str(text) => {
                    let text = text.clone();
                    self.advance();
                    text
                }
                _ => self.expect_column_name()?.name,
            };
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_value()?;
            entries.push((key, value));
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBrace)?;
                break;
            }
        }
        Ok(entries)
    }

    /// Parses a run of `name=value` parameters.
    ///
    /// A parameter name is any identifier or keyword immediately followed by
    /// `=`; the run stops at the first token that does not fit that shape,
    /// which is how `as` clauses and following statements terminate it.
    pub(super) fn parse_params(&mut self, owner: &'static str) -> Result<Params, ParseError> {
        let span = self.current_span();
        let mut entries = Vec::new();
        loop {
            let assign_follows = matches!(self.peek_kind(), Some(TokenKind::Assign));
            let name = match self.current_kind() {
                TokenKind::Ident(name) if assign_follows => name.clone(),
                TokenKind::Keyword(kw) if assign_follows => EcoString::from(kw.as_str()),
                _ => break,
            };
            let name_token = self.advance();
            self.expect(&TokenKind::Assign)?;
            let value = self.parse_value()?;
            entries.push(Param {
                name,
                value,
                span: name_token.span,
            });
        }
        Ok(Params {
            entries,
            owner,
            span,
        })
    }

    // ------------------------------------------------------------------
    // Statement dispatch
    // ------------------------------------------------------------------

    /// Parses one statement, dispatching on its head keyword.
    #[allow(clippy::too_many_lines)]
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = match self.current_kind() {
            TokenKind::Keyword(kw) if kw.is_statement_head() => *kw,
            kind => {
                return Err(ParseError::expected(
                    "a statement",
                    kind,
                    self.current_span(),
                ));
            }
        };
        match keyword {
            Keyword::Load => self.parse_load(),
            Keyword::Save => self.parse_save(),
            Keyword::ExportPlot => self.parse_export_plot(),
            Keyword::Select => self.parse_select(),
            Keyword::Filter => self.parse_filter(),
            Keyword::Sort => self.parse_sort(),
            Keyword::Join => self.parse_join(),
            Keyword::Groupby => self.parse_groupby(),
            Keyword::Sample => self.parse_sample(),
            Keyword::Drop => self.parse_drop(),
            Keyword::Mutate => self.parse_mutate(),
            Keyword::Apply => self.parse_apply(),
            Keyword::Map => self.parse_map(),
            Keyword::SelectByType => self.parse_select_by_type(),
            Keyword::Head => self.parse_head_or_tail(false),
            Keyword::Tail => self.parse_head_or_tail(true),
            Keyword::Iloc => self.parse_iloc(),
            Keyword::Loc => self.parse_loc(),
            Keyword::Rename => self.parse_rename(),
            Keyword::Reorder => self.parse_reorder(),
            Keyword::FilterBetween => self.parse_filter_between(),
            Keyword::FilterIsin => self.parse_filter_isin(),
            Keyword::FilterContains
            | Keyword::FilterStartswith
            | Keyword::FilterEndswith
            | Keyword::FilterRegex => self.parse_filter_pattern(keyword),
            Keyword::FilterNull => self.parse_filter_null(false),
            Keyword::FilterNotnull => self.parse_filter_null(true),
            Keyword::FilterDuplicates => self.parse_filter_duplicates(),
            Keyword::Dropna => self.parse_dropna(),
            Keyword::Fillna => self.parse_fillna(),
            Keyword::Isnull => self.parse_isnull(false),
            Keyword::Notnull => self.parse_isnull(true),
            Keyword::CountNa => self.parse_count_na(),
            Keyword::FillForward => self.parse_fill_directional(false),
            Keyword::FillBackward => self.parse_fill_directional(true),
            Keyword::FillMean | Keyword::FillMedian | Keyword::FillMode => {
                self.parse_fill_statistic(keyword)
            }
            Keyword::Interpolate => self.parse_interpolate(),
            Keyword::Duplicated => self.parse_duplicated(),
            Keyword::CountDuplicates => self.parse_count_duplicates(),
            Keyword::DropDuplicates => self.parse_drop_duplicates(),
            Keyword::Qcut => self.parse_qcut(),
            Keyword::Cut => self.parse_cut(),
            Keyword::ApplyRow => self.parse_apply_row(),
            Keyword::ApplyColumn => self.parse_apply_column(),
            Keyword::Applymap => self.parse_applymap(),
            Keyword::MapValues => self.parse_map_values(),
            Keyword::AssignConst => self.parse_assign(),
            Keyword::Describe => self.parse_describe(),
            Keyword::Summary => self.parse_summary(),
            Keyword::Info => self.parse_info(),
            Keyword::Unique => self.parse_unique(),
            Keyword::ValueCounts => self.parse_value_counts(),
            Keyword::Show => self.parse_show(),
            Keyword::Corr => self.parse_corr(),
            Keyword::Cov => self.parse_cov(),
            Keyword::Compare => self.parse_compare(),
            Keyword::Outliers => self.parse_outliers(),
            Keyword::Quantile => self.parse_quantile(),
            Keyword::Normalize => self.parse_normalize(),
            Keyword::Binning => self.parse_binning(),
            Keyword::Rolling => self.parse_rolling(),
            Keyword::Hypothesis => self.parse_hypothesis(),
            Keyword::Boxplot => self.parse_boxplot(),
            Keyword::Heatmap => self.parse_heatmap(),
            Keyword::Pairplot => self.parse_pairplot(),
            Keyword::Timeseries => self.parse_timeseries(),
            Keyword::Pie => self.parse_pie(),
            Keyword::Round => self.parse_round(),
            Keyword::Abs
            | Keyword::Sqrt
            | Keyword::Ceil
            | Keyword::Floor
            | Keyword::Upper
            | Keyword::Lower
            | Keyword::Strip
            | Keyword::Title
            | Keyword::Capitalize
            | Keyword::Length
            | Keyword::Cumsum
            | Keyword::Cummax
            | Keyword::Cummin
            | Keyword::Cumprod
            | Keyword::OneHotEncode
            | Keyword::LabelEncode
            | Keyword::StandardScale
            | Keyword::MinmaxScale
            | Keyword::RobustScale
            | Keyword::MaxabsScale
            | Keyword::ExtractYear
            | Keyword::ExtractMonth
            | Keyword::ExtractDay
            | Keyword::ExtractHour
            | Keyword::ExtractMinute
            | Keyword::ExtractSecond
            | Keyword::ExtractDayofweek
            | Keyword::ExtractDayofyear
            | Keyword::ExtractWeekofyear
            | Keyword::ExtractQuarter
            | Keyword::Explode => self.parse_single_column_op(keyword),
            Keyword::Power => self.parse_power(),
            Keyword::Log => self.parse_log(),
            Keyword::Lstrip => self.parse_strip_sided(false),
            Keyword::Rstrip => self.parse_strip_sided(true),
            Keyword::Replace => self.parse_replace(),
            Keyword::Split => self.parse_split(),
            Keyword::Concat => self.parse_concat(),
            Keyword::Substring => self.parse_substring(),
            Keyword::ExtractRegex => self.parse_extract_regex(),
            Keyword::Find => self.parse_find(),
            Keyword::ParseDatetime => self.parse_parse_datetime(),
            Keyword::Extract => self.parse_extract_part(),
            Keyword::DateDiff => self.parse_date_diff(),
            Keyword::DateAdd => self.parse_date_shift(false),
            Keyword::DateSubtract => self.parse_date_shift(true),
            Keyword::FormatDatetime => self.parse_format_datetime(),
            Keyword::Astype => self.parse_astype(),
            Keyword::ToNumeric => self.parse_to_numeric(),
            Keyword::OrdinalEncode => self.parse_ordinal_encode(),
            Keyword::TargetEncode => self.parse_target_encode(),
            Keyword::SortIndex => self.parse_sort_index(),
            Keyword::Rank => self.parse_rank(),
            Keyword::FilterGroups => self.parse_filter_groups(),
            Keyword::GroupTransform => self.parse_group_transform(),
            Keyword::WindowRank => self.parse_window_rank(),
            Keyword::WindowLag => self.parse_window_shift(false),
            Keyword::WindowLead => self.parse_window_shift(true),
            Keyword::RollingMean
            | Keyword::RollingSum
            | Keyword::RollingStd
            | Keyword::RollingMin
            | Keyword::RollingMax => self.parse_rolling_window(keyword),
            Keyword::ExpandingMean
            | Keyword::ExpandingSum
            | Keyword::ExpandingMin
            | Keyword::ExpandingMax => self.parse_expanding(keyword),
            Keyword::PctChange => self.parse_pct_change(),
            Keyword::Diff => self.parse_diff(),
            Keyword::Shift => self.parse_shift(),
            Keyword::Resample => self.parse_resample(),
            Keyword::Pivot => self.parse_pivot(),
            Keyword::PivotTable => self.parse_pivot_table(),
            Keyword::Melt => self.parse_melt(),
            Keyword::Stack => self.parse_stack(),
            Keyword::Unstack => self.parse_unstack(),
            Keyword::Transpose => self.parse_transpose(),
            Keyword::Crosstab => self.parse_crosstab(),
            Keyword::Merge => self.parse_merge(),
            Keyword::ConcatVertical => self.parse_concat_axis(false),
            Keyword::ConcatHorizontal => self.parse_concat_axis(true),
            Keyword::Union | Keyword::Intersection | Keyword::Difference => {
                self.parse_set_op(keyword)
            }
            Keyword::Append => self.parse_append(),
            Keyword::CrossJoin => self.parse_cross_join(),
            Keyword::SetIndex => self.parse_set_index(),
            Keyword::ResetIndex => self.parse_reset_index(),
            Keyword::Reindex => self.parse_reindex(),
            Keyword::SetMultiindex => self.parse_set_multiindex(),
            Keyword::AssertUnique => self.parse_assertion(keyword),
            Keyword::AssertNoNulls => self.parse_assertion(keyword),
            Keyword::AssertRange => self.parse_assert_range(),
            Keyword::Any | Keyword::All | Keyword::CountTrue => self.parse_boolean_check(keyword),
            // Clause words are rejected above; heads are covered exhaustively.
            _ => Err(ParseError::expected(
                "a statement",
                self.current_kind(),
                self.current_span(),
            )),
        }
    }
}

/// A parsed run of `name=value` parameters with typed extraction.
///
/// Statement parsers pull out the parameters their grammar knows, with type
/// checks against the [`Value`] the user wrote. Lookups remove the entry, so
/// [`Params::into_rest`] yields the passthrough remainder (`load`/`save`
/// forward unrecognised parameters verbatim to the reader and writer calls).
/// Elsewhere unknown parameters are ignored.
pub(super) struct Params {
    entries: Vec<Param>,
    owner: &'static str,
    span: Span,
}

impl Params {
    /// Removes and returns the named parameter, if present.
    pub(super) fn take(&mut self, name: &str) -> Option<Param> {
        let idx = self.entries.iter().position(|p| p.name == name)?;
        Some(self.entries.remove(idx))
    }

    /// Folds another parameter run into this one. Grammars that interleave a
    /// positional clause between two runs (`resample rule=.. column c
    /// aggfunc=..`) merge the runs before extraction.
    pub(super) fn absorb(&mut self, other: Params) {
        self.entries.extend(other.entries);
    }

    /// Removes and returns the named parameter, failing if absent.
    pub(super) fn require(&mut self, name: &str) -> Result<Param, ParseError> {
        self.take(name).ok_or_else(|| {
            ParseError::new(
                format!("Missing parameter '{}' for '{}'", name, self.owner),
                self.span,
            )
        })
    }

    /// A string-valued parameter. Bare identifiers are accepted as strings.
    pub(super) fn str_opt(&mut self, name: &str) -> Result<Option<EcoString>, ParseError> {
        match self.take(name) {
            None => Ok(None),
            Some(param) => match param.value {
                Value::Str(text) | Value::Ident(text) => Ok(Some(text)),
                _ => Err(Self::type_error(name, "a string", param.span)),
            },
        }
    }

    /// A required string parameter.
    pub(super) fn str_required(&mut self, name: &str) -> Result<EcoString, ParseError> {
        let param = self.require(name)?;
        match param.value {
            Value::Str(text) | Value::Ident(text) => Ok(text),
            _ => Err(Self::type_error(name, "a string", param.span)),
        }
    }

    /// A string parameter with a default.
    pub(super) fn str_or(&mut self, name: &str, default: &str) -> Result<EcoString, ParseError> {
        Ok(self.str_opt(name)?.unwrap_or_else(|| default.into()))
    }

    /// An integer-valued parameter.
    pub(super) fn int_opt(&mut self, name: &str) -> Result<Option<i64>, ParseError> {
        match self.take(name) {
            None => Ok(None),
            Some(param) => match param.value {
                Value::Int(n) => Ok(Some(n)),
                _ => Err(Self::type_error(name, "an integer", param.span)),
            },
        }
    }

    /// A required integer parameter.
    pub(super) fn int_required(&mut self, name: &str) -> Result<i64, ParseError> {
        let param = self.require(name)?;
        match param.value {
            Value::Int(n) => Ok(n),
            _ => Err(Self::type_error(name, "an integer", param.span)),
        }
    }

    /// An integer parameter with a default.
    pub(super) fn int_or(&mut self, name: &str, default: i64) -> Result<i64, ParseError> {
        Ok(self.int_opt(name)?.unwrap_or(default))
    }

    /// A required float parameter; integers widen.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn float_required(&mut self, name: &str) -> Result<f64, ParseError> {
        let param = self.require(name)?;
        match param.value {
            Value::Float(x) => Ok(x),
            Value::Int(n) => Ok(n as f64),
            _ => Err(Self::type_error(name, "a number", param.span)),
        }
    }

    /// A boolean parameter with a default.
    pub(super) fn bool_or(&mut self, name: &str, default: bool) -> Result<bool, ParseError> {
        match self.take(name) {
            None => Ok(default),
            Some(param) => match param.value {
                Value::Bool(b) => Ok(b),
                _ => Err(Self::type_error(name, "a boolean", param.span)),
            },
        }
    }

    /// A list-valued parameter.
    pub(super) fn list_opt(&mut self, name: &str) -> Result<Option<Vec<Value>>, ParseError> {
        match self.take(name) {
            None => Ok(None),
            Some(param) => match param.value {
                Value::List(items) => Ok(Some(items)),
                _ => Err(Self::type_error(name, "a list", param.span)),
            },
        }
    }

    /// A required list parameter.
    pub(super) fn list_required(&mut self, name: &str) -> Result<Vec<Value>, ParseError> {
        let param = self.require(name)?;
        match param.value {
            Value::List(items) => Ok(items),
            _ => Err(Self::type_error(name, "a list", param.span)),
        }
    }

    /// A required dictionary parameter.
    pub(super) fn dict_required(
        &mut self,
        name: &str,
    ) -> Result<Vec<(EcoString, Value)>, ParseError> {
        let param = self.require(name)?;
        match param.value {
            Value::Dict(entries) => Ok(entries),
            _ => Err(Self::type_error(name, "a dictionary", param.span)),
        }
    }

    /// The raw value of a parameter, if present.
    pub(super) fn value_opt(&mut self, name: &str) -> Option<Value> {
        self.take(name).map(|p| p.value)
    }

    /// Consumes the bag, returning the unextracted remainder in source order.
    pub(super) fn into_rest(self) -> Vec<Param> {
        self.entries
    }

    fn type_error(name: &str, expected: &str, span: Span) -> ParseError {
        ParseError::new(format!("Parameter '{name}' must be {expected}"), span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::tokenize;

    fn parse_source(source: &str) -> Result<Vec<Statement>, ParseError> {
        parse(tokenize(source).expect("lexes"))
    }

    #[test]
    fn empty_input_parses_to_no_statements() {
        assert_eq!(parse_source("").unwrap(), Vec::new());
        assert_eq!(parse_source("  # just a comment\n").unwrap(), Vec::new());
    }

    #[test]
    fn statement_count_matches_input() {
        let program = parse_source(
            r#"load "sales.csv" as sales
               filter sales where price > 100 as expensive
               describe expensive"#,
        )
        .unwrap();
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn non_statement_start_is_rejected() {
        let err = parse_source("price > 100").unwrap_err();
        assert!(err.message.contains("Expected a statement"));

        let err = parse_source("with n=5").unwrap_err();
        assert!(err.message.contains("Expected a statement"));
    }

    #[test]
    fn params_stop_before_as_clause() {
        let program = parse_source("sample sales with n=100 as subset").unwrap();
        match &program[0] {
            Statement::Sample { n, alias, .. } => {
                assert_eq!(*n, 100);
                assert_eq!(alias.as_ref().unwrap().name, "subset");
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn params_stop_before_next_statement() {
        let program = parse_source(
            r#"set_index sales column id drop=true as indexed
               drop indexed columns {notes}"#,
        )
        .unwrap();
        assert_eq!(program.len(), 2);
        assert!(matches!(program[0], Statement::SetIndex { drop: true, .. }));
        assert!(matches!(program[1], Statement::Drop { .. }));
    }

    #[test]
    fn negative_numbers_in_params() {
        let program = parse_source("stack sales level=-1 as stacked").unwrap();
        assert!(matches!(program[0], Statement::Stack { level: -1, .. }));
    }

    #[test]
    fn clause_words_are_valid_column_names() {
        let program = parse_source("unique sales column value").unwrap();
        match &program[0] {
            Statement::Unique { column, .. } => assert_eq!(column.name, "value"),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn statement_head_is_not_a_column_name() {
        let err = parse_source("unique sales column select").unwrap_err();
        assert!(err.message.contains("Expected a column name"));
    }

    #[test]
    fn list_values_tolerate_trailing_comma() {
        let program = parse_source(r#"reorder sales with order=["b", "a",] as swapped"#).unwrap();
        match &program[0] {
            Statement::Reorder { order, .. } => assert_eq!(order.len(), 2),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn dict_values_accept_identifier_keys() {
        let program =
            parse_source(r#"rename sales with mapping={price: "unit_price"} as renamed"#).unwrap();
        match &program[0] {
            Statement::Rename { mapping, .. } => {
                assert_eq!(mapping[0].0, "price");
                assert_eq!(mapping[0].1, Value::Str("unit_price".into()));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn missing_required_param_is_reported() {
        let err = parse_source("replace sales column city old=\"NYC\"").unwrap_err();
        assert!(err.message.contains("Missing parameter 'new'"));
    }

    #[test]
    fn param_type_mismatch_is_reported() {
        let err = parse_source("sample sales with n=\"lots\"").unwrap_err();
        assert!(err.message.contains("must be an integer"));
    }

    #[test]
    fn statement_spans_cover_the_whole_statement() {
        let source = r#"load "sales.csv" as sales"#;
        let program = parse_source(source).unwrap();
        let span = program[0].span();
        assert_eq!(span.start(), 0);
        assert_eq!(span.end() as usize, source.len());
    }

    #[test]
    fn huge_integer_literal_is_rejected() {
        let err = parse_source("head sales with n=99999999999999999999").unwrap_err();
        assert!(err.message.contains("out of range"));
    }
}
