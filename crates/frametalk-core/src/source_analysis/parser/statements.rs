// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsers: loading and saving, the core relational operations,
//! projection, parameterised filters, cleaning, row application, and the
//! inspection family.

use ecow::EcoString;

use crate::ast::{
    Aggregation, FileFormat, FillWith, Identifier, MapBody, Mutation, SliceArg, SortSpec,
    Statement, Value,
};
use crate::source_analysis::{ParseError, TokenKind, token::Keyword};

use super::{Params, Parser};

/// A `column="name"` parameter, converted to an [`Identifier`] so column
/// checks treat it like any other column reference.
fn column_param(params: &mut Params) -> Result<Identifier, ParseError> {
    let param = params.require("column")?;
    let span = param.span;
    match param.value {
        Value::Str(text) | Value::Ident(text) => Ok(Identifier::new(text, span)),
        _ => Err(ParseError::new("Parameter 'column' must be a string", span)),
    }
}

/// An `iloc` selector: a bare position or a `[start, end]` pair.
fn slice_arg_param(params: &mut Params, name: &str) -> Result<Option<SliceArg>, ParseError> {
    let Some(param) = params.take(name) else {
        return Ok(None);
    };
    let span = param.span;
    let malformed = || {
        ParseError::new(
            format!("Parameter '{name}' must be an integer or a [start, end] pair"),
            span,
        )
    };
    match param.value {
        Value::Int(n) => Ok(Some(SliceArg::Index(n))),
        Value::List(items) => match items.as_slice() {
            [Value::Int(start), Value::Int(end)] => Ok(Some(SliceArg::Range(*start, *end))),
            _ => Err(malformed()),
        },
        _ => Err(malformed()),
    }
}

impl Parser {
    // ------------------------------------------------------------------
    // Loading and saving
    // ------------------------------------------------------------------

    pub(super) fn parse_load(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;

        if self.eat_keyword(Keyword::Sql) {
            let (query, _) = self.expect_str()?;
            self.expect_keyword(Keyword::From)?;
            let (connection, _) = self.expect_str()?;
            let params = if self.eat_keyword(Keyword::With) {
                self.parse_params("load")?.into_rest()
            } else {
                Vec::new()
            };
            let alias = self.expect_as_clause()?;
            return Ok(Statement::LoadSql {
                query,
                connection,
                params,
                alias,
                span: self.span_from(start),
            });
        }

        let explicit = if self.eat_keyword(Keyword::Csv) {
            Some(FileFormat::Csv)
        } else if self.eat_keyword(Keyword::Json) {
            Some(FileFormat::Json)
        } else if self.eat_keyword(Keyword::Excel) {
            Some(FileFormat::Excel)
        } else if self.eat_keyword(Keyword::Parquet) {
            Some(FileFormat::Parquet)
        } else {
            None
        };
        let (path, _) = self.expect_str()?;
        let format = explicit.or_else(|| FileFormat::from_path(&path));
        let params = if self.eat_keyword(Keyword::With) {
            self.parse_params("load")?.into_rest()
        } else {
            Vec::new()
        };
        let alias = self.expect_as_clause()?;
        Ok(Statement::Load {
            path,
            format,
            params,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_save(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::To)?;
        let (path, _) = self.expect_str()?;
        let params = if self.eat_keyword(Keyword::With) {
            self.parse_params("save")?.into_rest()
        } else {
            Vec::new()
        };
        let format = FileFormat::from_path(&path).unwrap_or(FileFormat::Csv);
        Ok(Statement::Save {
            source,
            path,
            format,
            params,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_export_plot(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        self.expect_keyword(Keyword::Filename)?;
        self.expect(&TokenKind::Colon)?;
        let (filename, _) = self.expect_str()?;
        let width = if self.eat_keyword(Keyword::Width) {
            self.expect(&TokenKind::Colon)?;
            Some(self.expect_int()?)
        } else {
            None
        };
        let height = if self.eat_keyword(Keyword::Height) {
            self.expect(&TokenKind::Colon)?;
            Some(self.expect_int()?)
        } else {
            None
        };
        Ok(Statement::ExportPlot {
            filename,
            width,
            height,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Core relational operations
    // ------------------------------------------------------------------

    pub(super) fn parse_select(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        // `columns` before the braced list is optional: `select s {a}` and
        // `select s columns {a}` are the same statement.
        let columns = if self.eat_keyword(Keyword::Columns)
            || matches!(self.current_kind(), TokenKind::LBrace)
        {
            self.parse_braced_columns()?
        } else {
            self.expect_keyword(Keyword::With)?;
            self.parse_natural_columns()?
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::Select {
            source,
            columns,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_filter(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Where)?;
        let condition = self.parse_condition()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Filter {
            source,
            condition,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_sort(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::By)?;
        let mut specs = Vec::new();
        loop {
            let column = self.expect_column_name()?;
            let descending = if self.eat_keyword(Keyword::Desc) {
                true
            } else {
                self.eat_keyword(Keyword::Asc);
                false
            };
            specs.push(SortSpec { column, descending });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let alias = self.parse_as_clause()?;
        Ok(Statement::Sort {
            source,
            specs,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_join(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let left = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let right = self.expect_source()?;
        self.expect_keyword(Keyword::On)?;
        let on = self.expect_column_name()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Join {
            left,
            right,
            on,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_groupby(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::By)?;
        let by = if matches!(self.current_kind(), TokenKind::LBrace) {
            self.parse_braced_columns()?
        } else {
            self.parse_natural_columns()?
        };
        let aggregations = if self.eat_keyword(Keyword::Compute) || self.eat_keyword(Keyword::Agg)
        {
            self.parse_aggregations()?
        } else {
            Vec::new()
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::Groupby {
            source,
            by,
            aggregations,
            alias,
            span: self.span_from(start),
        })
    }

    /// `{ func: column, .. }` — the aggregation table of a `groupby`.
    fn parse_aggregations(&mut self) -> Result<Vec<Aggregation>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut aggregations = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let func = self.expect_column_name()?.name;
            self.expect(&TokenKind::Colon)?;
            let column = self.expect_column_name()?;
            aggregations.push(Aggregation { func, column });
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBrace)?;
                break;
            }
        }
        Ok(aggregations)
    }

    pub(super) fn parse_sample(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("sample")?;
        let n = params.int_required("n")?;
        let random = self.eat_keyword(Keyword::Random);
        let alias = self.parse_as_clause()?;
        Ok(Statement::Sample {
            source,
            n,
            random,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_drop(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Columns)?;
        let columns = self.parse_braced_columns()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Drop {
            source,
            columns,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_mutate(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut mutations = Vec::new();
        if matches!(self.current_kind(), TokenKind::LBrace) {
            self.advance();
            while !self.eat(&TokenKind::RBrace) {
                let column = self.expect_column_name()?;
                self.expect(&TokenKind::Colon)?;
                let (expression, _) = self.expect_str()?;
                mutations.push(Mutation { column, expression });
                if !self.eat(&TokenKind::Comma) {
                    self.expect(&TokenKind::RBrace)?;
                    break;
                }
            }
        } else {
            self.expect_keyword(Keyword::With)?;
            loop {
                let column = self.expect_column_name()?;
                self.expect(&TokenKind::Assign)?;
                let expression = self.parse_mutation_expression()?;
                mutations.push(Mutation { column, expression });
                if !self.eat_keyword(Keyword::With) {
                    break;
                }
            }
        }
        let alias = self.parse_as_clause()?;
        Ok(Statement::Mutate {
            source,
            mutations,
            alias,
            span: self.span_from(start),
        })
    }

    /// The right-hand side of `mutate .. with col = ..`.
    ///
    /// The expression is not parsed into a tree; its tokens are re-joined
    /// into the text handed to the generated `eval(..)` call. Strings are
    /// re-quoted with single quotes so they survive inside that call's
    /// double-quoted argument.
    fn parse_mutation_expression(&mut self) -> Result<EcoString, ParseError> {
        let start_span = self.current_span();
        let mut pieces: Vec<EcoString> = Vec::new();
        loop {
            let piece: EcoString = match self.current_kind() {
                TokenKind::Ident(name) => name.clone(),
                TokenKind::Int(text) | TokenKind::Float(text) => text.clone(),
                TokenKind::Str(text) => format!("'{text}'").into(),
                TokenKind::Plus => "+".into(),
                TokenKind::Minus => "-".into(),
                TokenKind::Star => "*".into(),
                TokenKind::Slash => "/".into(),
                TokenKind::Percent => "%".into(),
                TokenKind::StarStar => "**".into(),
                TokenKind::EqEq => "==".into(),
                TokenKind::BangEq => "!=".into(),
                TokenKind::Lt => "<".into(),
                TokenKind::Gt => ">".into(),
                TokenKind::LtEq => "<=".into(),
                TokenKind::GtEq => ">=".into(),
                TokenKind::LParen => "(".into(),
                TokenKind::RParen => ")".into(),
                TokenKind::Keyword(kw)
                    if !kw.is_statement_head()
                        && !matches!(kw, Keyword::As | Keyword::With) =>
                {
                    kw.as_str().into()
                }
                _ => break,
            };
            pieces.push(piece);
            self.advance();
        }
        if pieces.is_empty() {
            return Err(ParseError::expected(
                "an expression",
                self.current_kind(),
                start_span,
            ));
        }
        Ok(pieces.join(" ").into())
    }

    pub(super) fn parse_apply(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        self.expect_keyword(Keyword::With)?;
        self.expect_keyword(Keyword::Transform)?;
        let transform = self.parse_expr()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Apply {
            source,
            column,
            transform,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_map(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        self.expect_keyword(Keyword::With)?;
        let body = if self.eat_keyword(Keyword::Transform) {
            MapBody::Transform(self.parse_expr()?)
        } else if self.eat_keyword(Keyword::Mapping) {
            self.expect(&TokenKind::Assign)?;
            MapBody::Mapping(self.parse_dict_value()?)
        } else {
            return Err(ParseError::expected(
                "'transform' or 'mapping'",
                self.current_kind(),
                self.current_span(),
            ));
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::Map {
            source,
            column,
            body,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Selection and projection
    // ------------------------------------------------------------------

    pub(super) fn parse_select_by_type(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("select_by_type")?;
        let dtype = params.str_required("type")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::SelectByType {
            source,
            dtype,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_head_or_tail(&mut self, tail: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let n = if self.eat_keyword(Keyword::With) {
            let mut params = self.parse_params(if tail { "tail" } else { "head" })?;
            params.int_or("n", 5)?
        } else {
            5
        };
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if tail {
            Statement::Tail {
                source,
                n,
                alias,
                span,
            }
        } else {
            Statement::Head {
                source,
                n,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_iloc(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("iloc")?;
        let rows = slice_arg_param(&mut params, "rows")?;
        let columns = slice_arg_param(&mut params, "columns")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Iloc {
            source,
            rows,
            columns,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_loc(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("loc")?;
        let rows = params.value_opt("rows");
        let columns = params.value_opt("columns");
        let alias = self.parse_as_clause()?;
        Ok(Statement::Loc {
            source,
            rows,
            columns,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_rename(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("rename")?;
        let mapping = params.dict_required("mapping")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Rename {
            source,
            mapping,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_reorder(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("reorder")?;
        let order = params.list_required("order")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Reorder {
            source,
            order,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Parameterised filters
    // ------------------------------------------------------------------

    pub(super) fn parse_filter_between(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("filter_between")?;
        let column = column_param(&mut params)?;
        let low = params.require("min")?.value;
        let high = params.require("max")?.value;
        let alias = self.parse_as_clause()?;
        Ok(Statement::FilterBetween {
            source,
            column,
            low,
            high,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_filter_isin(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("filter_isin")?;
        let column = column_param(&mut params)?;
        let values = params.list_required("values")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::FilterIsin {
            source,
            column,
            values,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_filter_pattern(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("filter")?;
        let column = column_param(&mut params)?;
        let pattern = params.str_required("pattern")?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(match keyword {
            Keyword::FilterContains => Statement::FilterContains {
                source,
                column,
                pattern,
                alias,
                span,
            },
            Keyword::FilterStartswith => Statement::FilterStartswith {
                source,
                column,
                pattern,
                alias,
                span,
            },
            Keyword::FilterEndswith => Statement::FilterEndswith {
                source,
                column,
                pattern,
                alias,
                span,
            },
            _ => Statement::FilterRegex {
                source,
                column,
                pattern,
                alias,
                span,
            },
        })
    }

    pub(super) fn parse_filter_null(&mut self, keep_present: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("filter")?;
        let column = column_param(&mut params)?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if keep_present {
            Statement::FilterNotnull {
                source,
                column,
                alias,
                span,
            }
        } else {
            Statement::FilterNull {
                source,
                column,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_filter_duplicates(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let (subset, keep) = if self.eat_keyword(Keyword::With) {
            let mut params = self.parse_params("filter_duplicates")?;
            (params.list_opt("subset")?, params.str_or("keep", "first")?)
        } else {
            (None, "first".into())
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::FilterDuplicates {
            source,
            subset,
            keep,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Cleaning
    // ------------------------------------------------------------------

    pub(super) fn parse_dropna(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let columns = if self.eat_keyword(Keyword::Columns) {
            self.eat(&TokenKind::Colon);
            Some(self.parse_braced_columns()?)
        } else {
            None
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::Dropna {
            source,
            columns,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_fillna(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("fillna")?;
        let fill = if let Some(param) = params.take("value") {
            FillWith::Value(param.value)
        } else if let Some(method) = params.str_opt("method")? {
            FillWith::Method(method)
        } else {
            return Err(ParseError::new(
                "Missing parameter 'value' or 'method' for 'fillna'",
                self.current_span(),
            ));
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::Fillna {
            source,
            column,
            fill,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_isnull(&mut self, negated: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if negated {
            Statement::Notnull {
                source,
                column,
                alias,
                span,
            }
        } else {
            Statement::Isnull {
                source,
                column,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_count_na(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        Ok(Statement::CountNa {
            source,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_fill_directional(&mut self, backward: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let column = if self.eat_keyword(Keyword::Column) {
            Some(self.expect_column_name()?)
        } else {
            None
        };
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if backward {
            Statement::FillBackward {
                source,
                column,
                alias,
                span,
            }
        } else {
            Statement::FillForward {
                source,
                column,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_fill_statistic(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(match keyword {
            Keyword::FillMean => Statement::FillMean {
                source,
                column,
                alias,
                span,
            },
            Keyword::FillMedian => Statement::FillMedian {
                source,
                column,
                alias,
                span,
            },
            _ => Statement::FillMode {
                source,
                column,
                alias,
                span,
            },
        })
    }

    pub(super) fn parse_interpolate(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let column = if self.eat_keyword(Keyword::Column) {
            Some(self.expect_column_name()?)
        } else {
            None
        };
        let mut params = self.parse_params("interpolate")?;
        let method = params.str_or("method", "linear")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Interpolate {
            source,
            column,
            method,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_duplicated(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let columns = if self.eat_keyword(Keyword::Columns) {
            Some(self.parse_list_value()?)
        } else {
            None
        };
        let mut params = self.parse_params("duplicated")?;
        let keep = params.str_or("keep", "first")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Duplicated {
            source,
            columns,
            keep,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_count_duplicates(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let columns = if self.eat_keyword(Keyword::Columns) {
            Some(self.parse_list_value()?)
        } else {
            None
        };
        Ok(Statement::CountDuplicates {
            source,
            columns,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_drop_duplicates(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("drop_duplicates")?;
        let subset = params.list_opt("subset")?;
        let keep = params.str_or("keep", "first")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::DropDuplicates {
            source,
            subset,
            keep,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_qcut(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("qcut")?;
        let q = params.int_required("q")?;
        let labels = params.list_opt("labels")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Qcut {
            source,
            column,
            q,
            labels,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_cut(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("cut")?;
        let bins = params.list_required("bins")?;
        let labels = params.list_opt("labels")?;
        let include_lowest = params.bool_or("include_lowest", false)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Cut {
            source,
            column,
            bins,
            labels,
            include_lowest,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Row and element application
    // ------------------------------------------------------------------

    pub(super) fn parse_apply_row(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("apply_row")?;
        let function = params.str_required("function")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::ApplyRow {
            source,
            function,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_apply_column(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("apply_column")?;
        let function = params.str_required("function")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::ApplyColumn {
            source,
            column,
            function,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_applymap(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("applymap")?;
        let function = params.str_required("function")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Applymap {
            source,
            function,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_map_values(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("map_values")?;
        let mapping = params.dict_required("mapping")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::MapValues {
            source,
            column,
            mapping,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_assign(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("assign")?;
        let value = params.require("value")?.value;
        let alias = self.parse_as_clause()?;
        Ok(Statement::AssignConst {
            source,
            column,
            value,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub(super) fn parse_describe(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let columns = if self.eat_keyword(Keyword::Columns) {
            Some(self.parse_braced_columns()?)
        } else {
            None
        };
        Ok(Statement::Describe {
            source,
            columns,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_summary(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        Ok(Statement::Summary {
            source,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_info(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        Ok(Statement::Info {
            source,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_unique(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        Ok(Statement::Unique {
            source,
            column,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_value_counts(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut normalize = false;
        let mut ascending = false;
        loop {
            // `normalize` is also a statement head; treat it as the flag only
            // when the next token cannot start that statement.
            if self.at_keyword(Keyword::Normalize)
                && !matches!(self.peek_kind(), Some(TokenKind::Ident(_)))
            {
                self.advance();
                normalize = true;
            } else if self.eat_keyword(Keyword::Ascending) {
                ascending = true;
            } else {
                break;
            }
        }
        Ok(Statement::ValueCounts {
            source,
            column,
            normalize,
            ascending,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_show(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let n = if self.eat_keyword(Keyword::With) {
            let mut params = self.parse_params("show")?;
            params.int_opt("n")?
        } else {
            None
        };
        Ok(Statement::Show {
            source,
            n,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_corr(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        Ok(Statement::Corr {
            source,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_cov(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        Ok(Statement::Cov {
            source,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_compare(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let left = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let right = self.expect_source()?;
        Ok(Statement::Compare {
            left,
            right,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{parse, tokenize};

    fn one(source: &str) -> Statement {
        let program = parse(tokenize(source).expect("lexes")).expect("parses");
        assert_eq!(program.len(), 1, "expected one statement from {source:?}");
        program.into_iter().next().unwrap()
    }

    #[test]
    fn load_with_explicit_format() {
        match one(r#"load csv "data/sales.csv" as sales"#) {
            Statement::Load {
                path,
                format,
                alias,
                params,
                ..
            } => {
                assert_eq!(path, "data/sales.csv");
                assert_eq!(format, Some(FileFormat::Csv));
                assert_eq!(alias.name, "sales");
                assert!(params.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_sniffs_format_from_extension() {
        match one(r#"load "events.parquet" as events"#) {
            Statement::Load { format, .. } => assert_eq!(format, Some(FileFormat::Parquet)),
            other => panic!("unexpected: {other:?}"),
        }
        match one(r#"load "mystery.dat" as data"#) {
            Statement::Load { format, .. } => assert_eq!(format, None),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_forwards_reader_params() {
        match one(r#"load csv "a.csv" with delimiter=";" skiprows=2 as a"#) {
            Statement::Load { params, .. } => {
                assert_eq!(params.len(), 2);
                assert_eq!(params[0].name, "delimiter");
                assert_eq!(params[1].value, Value::Int(2));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_requires_an_alias() {
        let err = parse(tokenize(r#"load "a.csv""#).unwrap()).unwrap_err();
        assert!(err.message.contains("Expected 'as'"));
    }

    #[test]
    fn load_requires_a_quoted_path() {
        let err = parse(tokenize("load csv sales.csv as sales").unwrap()).unwrap_err();
        assert!(err.message.contains("Expected a string literal"));
    }

    #[test]
    fn load_sql_takes_query_and_connection() {
        match one(r#"load sql "select * from t" from "sqlite:///db.sqlite" as t"#) {
            Statement::LoadSql {
                query, connection, ..
            } => {
                assert_eq!(query, "select * from t");
                assert_eq!(connection, "sqlite:///db.sqlite");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn save_sniffs_format_and_defaults_to_csv() {
        match one(r#"save sales to "out.json""#) {
            Statement::Save { format, .. } => assert_eq!(format, FileFormat::Json),
            other => panic!("unexpected: {other:?}"),
        }
        match one(r#"save sales to "out.backup""#) {
            Statement::Save { format, .. } => assert_eq!(format, FileFormat::Csv),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn export_plot_with_dimensions() {
        match one(r#"export_plot filename : "plot.png" width : 12 height : 8"#) {
            Statement::ExportPlot {
                filename,
                width,
                height,
                ..
            } => {
                assert_eq!(filename, "plot.png");
                assert_eq!(width, Some(12));
                assert_eq!(height, Some(8));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn select_braced_and_natural_forms_agree() {
        let braced = one("select sales {name, price} as cut");
        let natural = one("select sales with name, price as cut");
        match (braced, natural) {
            (
                Statement::Select {
                    columns: a,
                    alias: alias_a,
                    ..
                },
                Statement::Select {
                    columns: b,
                    alias: alias_b,
                    ..
                },
            ) => {
                let names =
                    |cols: &[Identifier]| cols.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
                assert_eq!(names(&a), names(&b));
                assert_eq!(alias_a.unwrap().name, alias_b.unwrap().name);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn select_accepts_the_columns_keyword() {
        match one("select sale columns {price} as subset") {
            Statement::Select {
                columns, alias, ..
            } => {
                assert_eq!(columns.len(), 1);
                assert_eq!(columns[0].name, "price");
                assert_eq!(alias.unwrap().name, "subset");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn sort_directions_default_ascending() {
        match one("sort sales by price desc, name, qty asc") {
            Statement::Sort { specs, .. } => {
                assert_eq!(specs.len(), 3);
                assert!(specs[0].descending);
                assert!(!specs[1].descending);
                assert!(!specs[2].descending);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn join_on_column() {
        match one("join orders with customers on customer_id as enriched") {
            Statement::Join {
                left, right, on, ..
            } => {
                assert_eq!(left.name, "orders");
                assert_eq!(right.name, "customers");
                assert_eq!(on.name, "customer_id");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn groupby_with_aggregations() {
        match one("groupby sales by {category} compute {sum: quantity, mean: price} as stats") {
            Statement::Groupby {
                by, aggregations, ..
            } => {
                assert_eq!(by.len(), 1);
                assert_eq!(aggregations.len(), 2);
                assert_eq!(aggregations[0].func, "sum");
                assert_eq!(aggregations[0].column.name, "quantity");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn groupby_alias_is_optional() {
        assert!(one("groupby sales by {category} compute {sum: qty}").is_display());
    }

    #[test]
    fn sample_random_flag() {
        match one("sample sales with n=100 random as subset") {
            Statement::Sample { n, random, .. } => {
                assert_eq!(n, 100);
                assert!(random);
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one("sample sales with n=10") {
            Statement::Sample { random, .. } => assert!(!random),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn mutate_braced_form_keeps_expression_text() {
        match one(r#"mutate sales {margin: "price - cost", flag: "price > 100"} as enriched"#) {
            Statement::Mutate { mutations, .. } => {
                assert_eq!(mutations.len(), 2);
                assert_eq!(mutations[0].column.name, "margin");
                assert_eq!(mutations[0].expression, "price - cost");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn mutate_with_form_joins_tokens() {
        match one("mutate sales with total = price * qty + 1.5 as enriched") {
            Statement::Mutate { mutations, .. } => {
                assert_eq!(mutations[0].expression, "price * qty + 1.5");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn mutate_with_form_requotes_strings_and_chains() {
        match one(r#"mutate sales with label = status + "!" with double = price * 2"#) {
            Statement::Mutate { mutations, .. } => {
                assert_eq!(mutations.len(), 2);
                assert_eq!(mutations[0].expression, "status + '!'");
                assert_eq!(mutations[1].expression, "price * 2");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_transform_and_mapping_arms() {
        match one("map sales column price with transform price * 2 as doubled") {
            Statement::Map { body, .. } => assert!(matches!(body, MapBody::Transform(_))),
            other => panic!("unexpected: {other:?}"),
        }
        match one(r#"map sales column size with mapping = {"S": 1, "M": 2} as sized"#) {
            Statement::Map { body, .. } => match body {
                MapBody::Mapping(entries) => assert_eq!(entries.len(), 2),
                MapBody::Transform(_) => panic!("expected mapping"),
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_requires_a_body() {
        let err = parse(tokenize("map sales column price with n=2").unwrap()).unwrap_err();
        assert!(err.message.contains("'transform' or 'mapping'"));
    }

    #[test]
    fn iloc_slice_shapes() {
        match one("iloc sales with rows=[0, 10] columns=2 as window") {
            Statement::Iloc { rows, columns, .. } => {
                assert_eq!(rows, Some(SliceArg::Range(0, 10)));
                assert_eq!(columns, Some(SliceArg::Index(2)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn iloc_rejects_malformed_ranges() {
        let err =
            parse(tokenize("iloc sales with rows=[1, 2, 3] as x").unwrap()).unwrap_err();
        assert!(err.message.contains("[start, end]"));
    }

    #[test]
    fn filter_between_param_column_becomes_identifier() {
        match one(r#"filter_between sales with column="price" min=10 max=20 as mid"#) {
            Statement::FilterBetween {
                column, low, high, ..
            } => {
                assert_eq!(column.name, "price");
                assert_eq!(low, Value::Int(10));
                assert_eq!(high, Value::Int(20));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn dropna_column_subset_with_optional_colon() {
        match one("dropna sales columns : {price, qty} as clean") {
            Statement::Dropna { columns, .. } => assert_eq!(columns.unwrap().len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
        match one("dropna sales columns {price} as clean") {
            Statement::Dropna { columns, .. } => assert_eq!(columns.unwrap().len(), 1),
            other => panic!("unexpected: {other:?}"),
        }
        match one("dropna sales") {
            Statement::Dropna { columns, .. } => assert!(columns.is_none()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn fillna_value_and_method_forms() {
        match one("fillna sales column qty with value=0 as filled") {
            Statement::Fillna { fill, .. } => {
                assert_eq!(fill, FillWith::Value(Value::Int(0)));
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one(r#"fillna sales column qty with method="ffill""#) {
            Statement::Fillna { fill, .. } => {
                assert_eq!(fill, FillWith::Method("ffill".into()));
            }
            other => panic!("unexpected: {other:?}"),
        }
        let err = parse(tokenize("fillna sales column qty with n=1").unwrap()).unwrap_err();
        assert!(err.message.contains("'value' or 'method'"));
    }

    #[test]
    fn drop_duplicates_defaults() {
        match one("drop_duplicates sales as deduped") {
            Statement::DropDuplicates { subset, keep, .. } => {
                assert!(subset.is_none());
                assert_eq!(keep, "first");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one(r#"drop_duplicates sales subset=["id"] keep="last" as deduped"#) {
            Statement::DropDuplicates { subset, keep, .. } => {
                assert_eq!(subset.unwrap().len(), 1);
                assert_eq!(keep, "last");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn value_counts_flags() {
        match one("value_counts sales column city normalize ascending") {
            Statement::ValueCounts {
                normalize,
                ascending,
                ..
            } => {
                assert!(normalize);
                assert!(ascending);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn value_counts_does_not_swallow_a_following_normalize_statement() {
        let program = parse(
            tokenize(
                r#"value_counts sales column city
                   normalize sales columns {price} with method="zscore" as scaled"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(program.len(), 2);
        assert!(matches!(program[0], Statement::ValueCounts { normalize: false, .. }));
        assert!(matches!(program[1], Statement::Normalize { .. }));
    }

    #[test]
    fn qcut_and_cut() {
        match one("qcut sales column price q=4 labels=[\"q1\", \"q2\", \"q3\", \"q4\"] as binned") {
            Statement::Qcut { q, labels, .. } => {
                assert_eq!(q, 4);
                assert_eq!(labels.unwrap().len(), 4);
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one("cut sales column age bins=[0, 18, 65, 120] include_lowest=true as brackets") {
            Statement::Cut {
                bins,
                include_lowest,
                ..
            } => {
                assert_eq!(bins.len(), 4);
                assert!(include_lowest);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn assign_constant_column() {
        match one(r#"assign sales column source value="web" as tagged"#) {
            Statement::AssignConst { column, value, .. } => {
                assert_eq!(column.name, "source");
                assert_eq!(value, Value::Str("web".into()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn describe_with_column_subset() {
        match one("describe sales columns {price, qty}") {
            Statement::Describe { columns, .. } => assert_eq!(columns.unwrap().len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn show_with_row_count() {
        match one("show sales with n=20") {
            Statement::Show { n, .. } => assert_eq!(n, Some(20)),
            other => panic!("unexpected: {other:?}"),
        }
        match one("show sales") {
            Statement::Show { n, .. } => assert_eq!(n, None),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn compare_two_datasets() {
        match one("compare sales with archive") {
            Statement::Compare { left, right, .. } => {
                assert_eq!(left.name, "sales");
                assert_eq!(right.name, "archive");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
