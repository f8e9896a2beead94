// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Column-transform statement parsers: math, strings, datetimes, type
//! conversion and encoding, ordering, grouped and windowed operations, and
//! the cumulative family.
//!
//! Most of these share the `<op> src column c <params> [as a]` shape. The
//! ones that differ only in which variant they build route through
//! [`Parser::parse_single_column_op`].

use ecow::EcoString;

use crate::ast::{Identifier, Statement, Value};
use crate::source_analysis::{ParseError, token::Keyword};

use super::{Params, Parser};

/// A parameter naming another column (`start=order_date`), converted to an
/// [`Identifier`].
pub(super) fn ident_param(params: &mut Params, name: &str) -> Result<Identifier, ParseError> {
    let param = params.require(name)?;
    let span = param.span;
    match param.value {
        Value::Str(text) | Value::Ident(text) => Ok(Identifier::new(text, span)),
        _ => Err(ParseError::new(
            format!("Parameter '{name}' must be a column name"),
            span,
        )),
    }
}

/// The `base=` parameter of `log`: a number or the identifier `e`.
fn log_base(params: &mut Params) -> Result<EcoString, ParseError> {
    let Some(param) = params.take("base") else {
        return Ok("e".into());
    };
    let span = param.span;
    match param.value {
        Value::Int(n) => Ok(n.to_string().into()),
        Value::Float(x) => Ok(x.to_string().into()),
        Value::Str(text) | Value::Ident(text) => Ok(text),
        _ => Err(ParseError::new(
            "Parameter 'base' must be a number or 'e'",
            span,
        )),
    }
}

impl Parser {
    /// `<op> src column c [as a]` for every transform whose grammar is just
    /// that. The keyword selects the variant.
    #[allow(clippy::too_many_lines)]
    pub(super) fn parse_single_column_op(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(match keyword {
            Keyword::Abs => Statement::Abs {
                source,
                column,
                alias,
                span,
            },
            Keyword::Sqrt => Statement::Sqrt {
                source,
                column,
                alias,
                span,
            },
            Keyword::Ceil => Statement::Ceil {
                source,
                column,
                alias,
                span,
            },
            Keyword::Floor => Statement::Floor {
                source,
                column,
                alias,
                span,
            },
            Keyword::Upper => Statement::Upper {
                source,
                column,
                alias,
                span,
            },
            Keyword::Lower => Statement::Lower {
                source,
                column,
                alias,
                span,
            },
            Keyword::Strip => Statement::Strip {
                source,
                column,
                alias,
                span,
            },
            Keyword::Title => Statement::Title {
                source,
                column,
                alias,
                span,
            },
            Keyword::Capitalize => Statement::Capitalize {
                source,
                column,
                alias,
                span,
            },
            Keyword::Length => Statement::Length {
                source,
                column,
                alias,
                span,
            },
            Keyword::Cumsum => Statement::Cumsum {
                source,
                column,
                alias,
                span,
            },
            Keyword::Cummax => Statement::Cummax {
                source,
                column,
                alias,
                span,
            },
            Keyword::Cummin => Statement::Cummin {
                source,
                column,
                alias,
                span,
            },
            Keyword::Cumprod => Statement::Cumprod {
                source,
                column,
                alias,
                span,
            },
            Keyword::OneHotEncode => Statement::OneHotEncode {
                source,
                column,
                alias,
                span,
            },
            Keyword::LabelEncode => Statement::LabelEncode {
                source,
                column,
                alias,
                span,
            },
            Keyword::StandardScale => Statement::StandardScale {
                source,
                column,
                alias,
                span,
            },
            Keyword::MinmaxScale => Statement::MinmaxScale {
                source,
                column,
                alias,
                span,
            },
            Keyword::RobustScale => Statement::RobustScale {
                source,
                column,
                alias,
                span,
            },
            Keyword::MaxabsScale => Statement::MaxabsScale {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractYear => Statement::ExtractYear {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractMonth => Statement::ExtractMonth {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractDay => Statement::ExtractDay {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractHour => Statement::ExtractHour {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractMinute => Statement::ExtractMinute {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractSecond => Statement::ExtractSecond {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractDayofweek => Statement::ExtractDayofweek {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractDayofyear => Statement::ExtractDayofyear {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractWeekofyear => Statement::ExtractWeekofyear {
                source,
                column,
                alias,
                span,
            },
            Keyword::ExtractQuarter => Statement::ExtractQuarter {
                source,
                column,
                alias,
                span,
            },
            _ => Statement::Explode {
                source,
                column,
                alias,
                span,
            },
        })
    }

    // ------------------------------------------------------------------
    // Math
    // ------------------------------------------------------------------

    pub(super) fn parse_round(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("round")?;
        let decimals = params.int_or("decimals", 0)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Round {
            source,
            column,
            decimals,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_power(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("power")?;
        let exponent = params.float_required("exponent")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Power {
            source,
            column,
            exponent,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_log(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("log")?;
        let base = log_base(&mut params)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Log {
            source,
            column,
            base,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    pub(super) fn parse_strip_sided(&mut self, right: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let chars = if self.eat_keyword(Keyword::With) {
            let mut params = self.parse_params(if right { "rstrip" } else { "lstrip" })?;
            params.str_opt("chars")?
        } else {
            None
        };
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if right {
            Statement::Rstrip {
                source,
                column,
                chars,
                alias,
                span,
            }
        } else {
            Statement::Lstrip {
                source,
                column,
                chars,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_replace(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("replace")?;
        let old = params.str_required("old")?;
        let new = params.str_required("new")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Replace {
            source,
            column,
            old,
            new,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_split(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("split")?;
        let delimiter = params.str_or("delimiter", " ")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Split {
            source,
            column,
            delimiter,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_concat(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Columns)?;
        let columns = self.parse_list_value()?;
        let mut params = self.parse_params("concat")?;
        let separator = params.str_or("separator", "")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Concat {
            source,
            columns,
            separator,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_substring(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("substring")?;
        let start_at = params.int_required("start")?;
        let end = params.int_opt("end")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Substring {
            source,
            column,
            start: start_at,
            end,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_extract_regex(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("extract_regex")?;
        let pattern = params.str_required("pattern")?;
        let group = params.int_or("group", 0)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::ExtractRegex {
            source,
            column,
            pattern,
            group,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_find(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("find")?;
        let substring = params.str_required("substring")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Find {
            source,
            column,
            substring,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Datetimes
    // ------------------------------------------------------------------

    pub(super) fn parse_parse_datetime(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("parse_datetime")?;
        let format = params.str_opt("format")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::ParseDatetime {
            source,
            column,
            format,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_extract_part(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("extract")?;
        let part = params.str_required("part")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Extract {
            source,
            column,
            part,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_date_diff(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("date_diff")?;
        let start_col = ident_param(&mut params, "start")?;
        let end_col = ident_param(&mut params, "end")?;
        let unit = params.str_or("unit", "days")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::DateDiff {
            source,
            start: start_col,
            end: end_col,
            unit,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_date_shift(&mut self, subtract: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params(if subtract { "date_subtract" } else { "date_add" })?;
        let amount = params.int_required("value")?;
        let unit = params.str_required("unit")?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if subtract {
            Statement::DateSubtract {
                source,
                column,
                amount,
                unit,
                alias,
                span,
            }
        } else {
            Statement::DateAdd {
                source,
                column,
                amount,
                unit,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_format_datetime(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("format_datetime")?;
        let format = params.str_required("format")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::FormatDatetime {
            source,
            column,
            format,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Types and encoding
    // ------------------------------------------------------------------

    pub(super) fn parse_astype(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("astype")?;
        let dtype = params.str_or("dtype", "str")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Astype {
            source,
            column,
            dtype,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_to_numeric(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("to_numeric")?;
        let errors = params.str_or("errors", "raise")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::ToNumeric {
            source,
            column,
            errors,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_ordinal_encode(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("ordinal_encode")?;
        let order = params.list_required("order")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::OrdinalEncode {
            source,
            column,
            order,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_target_encode(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("target_encode")?;
        let target = params.str_required("target")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::TargetEncode {
            source,
            column,
            target,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------

    pub(super) fn parse_sort_index(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("sort_index")?;
        let ascending = params.bool_or("ascending", true)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::SortIndex {
            source,
            ascending,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_rank(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("rank")?;
        let method = params.str_or("method", "average")?;
        let ascending = params.bool_or("ascending", true)?;
        let pct = params.bool_or("pct", false)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Rank {
            source,
            column,
            method,
            ascending,
            pct,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Grouped and windowed operations
    // ------------------------------------------------------------------

    pub(super) fn parse_filter_groups(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::By)?;
        let by = self.parse_bracket_names()?;
        let mut params = self.parse_params("filter_groups")?;
        let condition = params.str_required("condition")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::FilterGroups {
            source,
            by,
            condition,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_group_transform(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::By)?;
        let by = self.parse_bracket_names()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("group_transform")?;
        let function = params.str_required("function")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::GroupTransform {
            source,
            by,
            column,
            function,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_window_rank(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("window_rank")?;
        let by = if self.eat_keyword(Keyword::By) {
            Some(self.parse_bracket_names()?)
        } else {
            None
        };
        params.absorb(self.parse_params("window_rank")?);
        let method = params.str_or("method", "rank")?;
        let ascending = params.bool_or("ascending", true)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::WindowRank {
            source,
            column,
            by,
            method,
            ascending,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_window_shift(&mut self, lead: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let owner = if lead { "window_lead" } else { "window_lag" };
        let mut params = self.parse_params(owner)?;
        let by = if self.eat_keyword(Keyword::By) {
            Some(self.parse_bracket_names()?)
        } else {
            None
        };
        params.absorb(self.parse_params(owner)?);
        let periods = params.int_required("periods")?;
        let fill_value = params.value_opt("fill_value");
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if lead {
            Statement::WindowLead {
                source,
                column,
                periods,
                by,
                fill_value,
                alias,
                span,
            }
        } else {
            Statement::WindowLag {
                source,
                column,
                periods,
                by,
                fill_value,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_rolling_window(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("rolling")?;
        let window = params.int_required("window")?;
        let min_periods = params.int_or("min", 1)?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(match keyword {
            Keyword::RollingMean => Statement::RollingMean {
                source,
                column,
                window,
                min_periods,
                alias,
                span,
            },
            Keyword::RollingSum => Statement::RollingSum {
                source,
                column,
                window,
                min_periods,
                alias,
                span,
            },
            Keyword::RollingStd => Statement::RollingStd {
                source,
                column,
                window,
                min_periods,
                alias,
                span,
            },
            Keyword::RollingMin => Statement::RollingMin {
                source,
                column,
                window,
                min_periods,
                alias,
                span,
            },
            _ => Statement::RollingMax {
                source,
                column,
                window,
                min_periods,
                alias,
                span,
            },
        })
    }

    pub(super) fn parse_expanding(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("expanding")?;
        let min_periods = params.int_or("min", 1)?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(match keyword {
            Keyword::ExpandingMean => Statement::ExpandingMean {
                source,
                column,
                min_periods,
                alias,
                span,
            },
            Keyword::ExpandingSum => Statement::ExpandingSum {
                source,
                column,
                min_periods,
                alias,
                span,
            },
            Keyword::ExpandingMin => Statement::ExpandingMin {
                source,
                column,
                min_periods,
                alias,
                span,
            },
            _ => Statement::ExpandingMax {
                source,
                column,
                min_periods,
                alias,
                span,
            },
        })
    }

    // ------------------------------------------------------------------
    // Cumulative and time series
    // ------------------------------------------------------------------

    pub(super) fn parse_pct_change(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let periods = if self.eat_keyword(Keyword::With) {
            let mut params = self.parse_params("pct_change")?;
            params.int_or("periods", 1)?
        } else {
            1
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::PctChange {
            source,
            column,
            periods,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_diff(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let periods = if self.eat_keyword(Keyword::With) {
            let mut params = self.parse_params("diff")?;
            params.int_or("periods", 1)?
        } else {
            1
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::Diff {
            source,
            column,
            periods,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_shift(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let (periods, fill_value) = if self.eat_keyword(Keyword::With) {
            let mut params = self.parse_params("shift")?;
            (params.int_or("periods", 1)?, params.value_opt("fill_value"))
        } else {
            (1, None)
        };
        let alias = self.parse_as_clause()?;
        Ok(Statement::Shift {
            source,
            column,
            periods,
            fill_value,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_resample(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("resample")?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        params.absorb(self.parse_params("resample")?);
        let rule = params.str_required("rule")?;
        let aggfunc = params.str_required("aggfunc")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Resample {
            source,
            rule,
            column,
            aggfunc,
            alias,
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
    fn round_decimals_default_to_zero() {
        match one("round sales column price as rounded") {
            Statement::Round { decimals, .. } => assert_eq!(decimals, 0),
            other => panic!("unexpected: {other:?}"),
        }
        match one("round sales column price decimals=2 as rounded") {
            Statement::Round { decimals, .. } => assert_eq!(decimals, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn power_requires_exponent() {
        match one("power sales column x exponent=2.5 as raised") {
            Statement::Power { exponent, .. } => assert!((exponent - 2.5).abs() < f64::EPSILON),
            other => panic!("unexpected: {other:?}"),
        }
        let err = parse(tokenize("power sales column x as raised").unwrap()).unwrap_err();
        assert!(err.message.contains("Missing parameter 'exponent'"));
    }

    #[test]
    fn log_base_accepts_numbers_and_e() {
        match one("log sales column x as logged") {
            Statement::Log { base, .. } => assert_eq!(base, "e"),
            other => panic!("unexpected: {other:?}"),
        }
        match one("log sales column x base=10 as logged") {
            Statement::Log { base, .. } => assert_eq!(base, "10"),
            other => panic!("unexpected: {other:?}"),
        }
        match one("log sales column x base=e as logged") {
            Statement::Log { base, .. } => assert_eq!(base, "e"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn single_column_ops_pick_their_variant() {
        assert!(matches!(
            one("sqrt sales column area as roots"),
            Statement::Sqrt { .. }
        ));
        assert!(matches!(
            one("extract_quarter sales column order_date"),
            Statement::ExtractQuarter { .. }
        ));
        assert!(matches!(
            one("explode sales column tags as exploded"),
            Statement::Explode { .. }
        ));
        assert!(matches!(
            one("one_hot_encode sales column region as encoded"),
            Statement::OneHotEncode { .. }
        ));
    }

    #[test]
    fn lstrip_chars_are_optional() {
        match one("lstrip sales column code as trimmed") {
            Statement::Lstrip { chars, .. } => assert!(chars.is_none()),
            other => panic!("unexpected: {other:?}"),
        }
        match one(r#"rstrip sales column code with chars="0" as trimmed"#) {
            Statement::Rstrip { chars, .. } => assert_eq!(chars.as_deref(), Some("0")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn concat_takes_column_list_and_separator() {
        match one(r#"concat sales columns ["first", "last"] separator=" " as full_name"#) {
            Statement::Concat {
                columns, separator, ..
            } => {
                assert_eq!(columns.len(), 2);
                assert_eq!(separator, " ");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn date_diff_columns_are_identifiers() {
        match one("date_diff orders start=order_date end=ship_date as lead_time") {
            Statement::DateDiff {
                start, end, unit, ..
            } => {
                assert_eq!(start.name, "order_date");
                assert_eq!(end.name, "ship_date");
                assert_eq!(unit, "days");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn date_add_amount_and_unit() {
        match one(r#"date_add orders column due value=30 unit="days" as extended"#) {
            Statement::DateAdd { amount, unit, .. } => {
                assert_eq!(amount, 30);
                assert_eq!(unit, "days");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rank_flags() {
        match one(r#"rank sales column score method="dense" ascending=false pct=true as ranked"#) {
            Statement::Rank {
                method,
                ascending,
                pct,
                ..
            } => {
                assert_eq!(method, "dense");
                assert!(!ascending);
                assert!(pct);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn window_lag_params_straddle_the_by_clause() {
        match one(r#"window_lag sales column price periods=1 by ["region"] fill_value=0 as lagged"#)
        {
            Statement::WindowLag {
                periods,
                by,
                fill_value,
                ..
            } => {
                assert_eq!(periods, 1);
                assert_eq!(by.unwrap()[0].name, "region");
                assert_eq!(fill_value, Some(Value::Int(0)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rolling_window_min_periods_default() {
        match one("rolling_mean sales column price window=7 as smoothed") {
            Statement::RollingMean {
                window,
                min_periods,
                ..
            } => {
                assert_eq!(window, 7);
                assert_eq!(min_periods, 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one("rolling_std sales column price window=7 min=3 as vol") {
            Statement::RollingStd { min_periods, .. } => assert_eq!(min_periods, 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn shift_carries_fill_value() {
        match one("shift sales column price with periods=2 fill_value=0 as shifted") {
            Statement::Shift {
                periods,
                fill_value,
                ..
            } => {
                assert_eq!(periods, 2);
                assert_eq!(fill_value, Some(Value::Int(0)));
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one("shift sales column price as shifted") {
            Statement::Shift { periods, .. } => assert_eq!(periods, 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn resample_rule_before_column_aggfunc_after() {
        match one(r#"resample sales rule="W" column revenue aggfunc="sum" as weekly"#) {
            Statement::Resample { rule, aggfunc, .. } => {
                assert_eq!(rule, "W");
                assert_eq!(aggfunc, "sum");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn group_transform_shape() {
        match one(r#"group_transform sales by ["region"] column price function="mean" as means"#) {
            Statement::GroupTransform { by, function, .. } => {
                assert_eq!(by.len(), 1);
                assert_eq!(function, "mean");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
