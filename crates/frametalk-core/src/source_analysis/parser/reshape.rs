// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsers for reshaping, combining datasets, index operations,
//! statistical analysis, validation checks, and plots.

use ecow::EcoString;

use crate::ast::{Statement, Value};
use crate::source_analysis::{ParseError, TokenKind, token::Keyword};

use super::transforms::ident_param;
use super::{Params, Parser};

/// The `suffixes=` parameter of `merge`: exactly two strings.
fn suffixes_param(params: &mut Params) -> Result<(EcoString, EcoString), ParseError> {
    let Some(param) = params.take("suffixes") else {
        return Ok(("_x".into(), "_y".into()));
    };
    let span = param.span;
    let malformed = || {
        ParseError::new("Parameter 'suffixes' must be a list of two strings", span)
    };
    match param.value {
        Value::List(items) => match items.as_slice() {
            [Value::Str(left), Value::Str(right)] => Ok((left.clone(), right.clone())),
            _ => Err(malformed()),
        },
        _ => Err(malformed()),
    }
}

impl Parser {
    // ------------------------------------------------------------------
    // Reshaping
    // ------------------------------------------------------------------

    pub(super) fn parse_pivot(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("pivot")?;
        let index = params.str_required("index")?;
        let columns = params.str_required("columns")?;
        let values = params.str_required("values")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Pivot {
            source,
            index,
            columns,
            values,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_pivot_table(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("pivot_table")?;
        let index = params.str_required("index")?;
        let columns = params.str_required("columns")?;
        let values = params.str_required("values")?;
        let aggfunc = params.str_or("aggfunc", "mean")?;
        let fill_value = params.value_opt("fill_value");
        let alias = self.parse_as_clause()?;
        Ok(Statement::PivotTable {
            source,
            index,
            columns,
            values,
            aggfunc,
            fill_value,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_melt(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("melt")?;
        let id_vars = params.list_required("id_vars")?;
        let value_vars = params.list_opt("value_vars")?;
        let var_name = params.str_or("var_name", "variable")?;
        let value_name = params.str_or("value_name", "value")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Melt {
            source,
            id_vars,
            value_vars,
            var_name,
            value_name,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_stack(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("stack")?;
        let level = params.int_or("level", -1)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Stack {
            source,
            level,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_unstack(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("unstack")?;
        let level = params.int_or("level", -1)?;
        let fill_value = params.value_opt("fill_value");
        let alias = self.parse_as_clause()?;
        Ok(Statement::Unstack {
            source,
            level,
            fill_value,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_transpose(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Transpose {
            source,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_crosstab(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("crosstab")?;
        let rows = params.str_required("rows")?;
        let columns = params.str_required("columns")?;
        let values = params.str_opt("values")?;
        let aggfunc = params.str_or("aggfunc", "count")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Crosstab {
            source,
            rows,
            columns,
            values,
            aggfunc,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Combining datasets
    // ------------------------------------------------------------------

    pub(super) fn parse_merge(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let left = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let right = self.expect_source()?;
        let mut params = self.parse_params("merge")?;
        let on = params.str_opt("on")?;
        let left_on = params.str_opt("left_on")?;
        let right_on = params.str_opt("right_on")?;
        let how = params.str_or("how", "inner")?;
        let suffixes = suffixes_param(&mut params)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Merge {
            left,
            right,
            on,
            left_on,
            right_on,
            how,
            suffixes,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_concat_axis(&mut self, horizontal: bool) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let sources = self.parse_bracket_names()?;
        let mut params =
            self.parse_params(if horizontal { "concat_horizontal" } else { "concat_vertical" })?;
        let ignore_index = params.bool_or("ignore_index", !horizontal)?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(if horizontal {
            Statement::ConcatHorizontal {
                sources,
                ignore_index,
                alias,
                span,
            }
        } else {
            Statement::ConcatVertical {
                sources,
                ignore_index,
                alias,
                span,
            }
        })
    }

    pub(super) fn parse_set_op(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let left = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let right = self.expect_source()?;
        let alias = self.parse_as_clause()?;
        let span = self.span_from(start);
        Ok(match keyword {
            Keyword::Union => Statement::Union {
                left,
                right,
                alias,
                span,
            },
            Keyword::Intersection => Statement::Intersection {
                left,
                right,
                alias,
                span,
            },
            _ => Statement::Difference {
                left,
                right,
                alias,
                span,
            },
        })
    }

    pub(super) fn parse_append(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let left = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let right = self.expect_source()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Append {
            left,
            right,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_cross_join(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let left = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let right = self.expect_source()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::CrossJoin {
            left,
            right,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Index operations
    // ------------------------------------------------------------------

    pub(super) fn parse_set_index(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("set_index")?;
        let drop = params.bool_or("drop", true)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::SetIndex {
            source,
            column,
            drop,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_reset_index(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let mut params = self.parse_params("reset_index")?;
        let drop = params.bool_or("drop", false)?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::ResetIndex {
            source,
            drop,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_reindex(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("reindex")?;
        let index = params.list_required("index")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Reindex {
            source,
            index,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_set_multiindex(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Columns)?;
        let columns = self.parse_bracket_names()?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::SetMultiindex {
            source,
            columns,
            alias,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Statistical analysis
    // ------------------------------------------------------------------

    pub(super) fn parse_outliers(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("outliers")?;
        let method = params.str_required("method")?;
        self.expect_keyword(Keyword::Columns)?;
        let columns = self.parse_braced_columns()?;
        Ok(Statement::Outliers {
            source,
            method,
            columns,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_quantile(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("quantile")?;
        let q = params.float_required("q")?;
        Ok(Statement::Quantile {
            source,
            column,
            q,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_normalize(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Columns)?;
        let columns = self.parse_braced_columns()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("normalize")?;
        let method = params.str_required("method")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Normalize {
            source,
            columns,
            method,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_binning(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("binning")?;
        let bins = params.int_required("bins")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Binning {
            source,
            column,
            bins,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_rolling(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("rolling")?;
        let window = params.int_required("window")?;
        let function = params.str_required("function")?;
        let alias = self.parse_as_clause()?;
        Ok(Statement::Rolling {
            source,
            column,
            window,
            function,
            alias,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_hypothesis(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let left = self.expect_source()?;
        self.expect_keyword(Keyword::Vs)?;
        self.eat(&TokenKind::Colon);
        let right = self.expect_source()?;
        self.expect_keyword(Keyword::Columns)?;
        self.eat(&TokenKind::Colon);
        let columns = self.parse_braced_columns()?;
        self.expect_keyword(Keyword::Test)?;
        self.eat(&TokenKind::Colon);
        let test = self.expect_column_name()?.name;
        Ok(Statement::Hypothesis {
            left,
            right,
            columns,
            test,
            span: self.span_from(start),
        })
    }

    // ------------------------------------------------------------------
    // Validation checks
    // ------------------------------------------------------------------

    pub(super) fn parse_assertion(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let span = self.span_from(start);
        Ok(if keyword == Keyword::AssertUnique {
            Statement::AssertUnique {
                source,
                column,
                span,
            }
        } else {
            Statement::AssertNoNulls {
                source,
                column,
                span,
            }
        })
    }

    pub(super) fn parse_assert_range(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let mut params = self.parse_params("assert_range")?;
        let min = params.value_opt("min");
        let max = params.value_opt("max");
        Ok(Statement::AssertRange {
            source,
            column,
            min,
            max,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_boolean_check(&mut self, keyword: Keyword) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Column)?;
        let column = self.expect_column_name()?;
        let span = self.span_from(start);
        Ok(match keyword {
            Keyword::Any => Statement::Any {
                source,
                column,
                span,
            },
            Keyword::All => Statement::All {
                source,
                column,
                span,
            },
            _ => Statement::CountTrue {
                source,
                column,
                span,
            },
        })
    }

    // ------------------------------------------------------------------
    // Plots
    // ------------------------------------------------------------------

    pub(super) fn parse_boxplot(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        let (columns, by) = if self.eat_keyword(Keyword::Columns) {
            (self.parse_braced_columns()?, None)
        } else {
            self.expect_keyword(Keyword::With)?;
            let column = self.expect_column_name()?;
            let by = if self.eat_keyword(Keyword::By) {
                Some(self.expect_column_name()?)
            } else {
                None
            };
            (vec![column], by)
        };
        Ok(Statement::Boxplot {
            source,
            columns,
            by,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_heatmap(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Columns)?;
        let columns = self.parse_braced_columns()?;
        Ok(Statement::Heatmap {
            source,
            columns,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_pairplot(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::Columns)?;
        let columns = self.parse_braced_columns()?;
        Ok(Statement::Pairplot {
            source,
            columns,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_timeseries(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::X)?;
        self.eat(&TokenKind::Colon);
        let x = self.expect_column_name()?;
        self.expect_keyword(Keyword::Y)?;
        self.eat(&TokenKind::Colon);
        let y = self.expect_column_name()?;
        Ok(Statement::Timeseries {
            source,
            x,
            y,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_pie(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance().span;
        let source = self.expect_source()?;
        self.expect_keyword(Keyword::With)?;
        let mut params = self.parse_params("pie")?;
        let values = ident_param(&mut params, "values")?;
        let labels = ident_param(&mut params, "labels")?;
        Ok(Statement::Pie {
            source,
            values,
            labels,
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
    fn pivot_requires_all_three_axes() {
        match one(r#"pivot sales index="date" columns="region" values="revenue" as wide"#) {
            Statement::Pivot {
                index,
                columns,
                values,
                ..
            } => {
                assert_eq!(index, "date");
                assert_eq!(columns, "region");
                assert_eq!(values, "revenue");
            }
            other => panic!("unexpected: {other:?}"),
        }
        let err =
            parse(tokenize(r#"pivot sales index="date" columns="region""#).unwrap()).unwrap_err();
        assert!(err.message.contains("Missing parameter 'values'"));
    }

    #[test]
    fn pivot_table_defaults() {
        match one(r#"pivot_table sales index="date" columns="region" values="revenue" as wide"#) {
            Statement::PivotTable {
                aggfunc,
                fill_value,
                ..
            } => {
                assert_eq!(aggfunc, "mean");
                assert!(fill_value.is_none());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn melt_id_and_value_vars() {
        match one(r#"melt sales id_vars=["date"] value_vars=["a", "b"] as long"#) {
            Statement::Melt {
                id_vars,
                value_vars,
                var_name,
                value_name,
                ..
            } => {
                assert_eq!(id_vars.len(), 1);
                assert_eq!(value_vars.unwrap().len(), 2);
                assert_eq!(var_name, "variable");
                assert_eq!(value_name, "value");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn merge_key_variants_and_suffixes() {
        match one(r#"merge orders with customers on="id" how="left" as joined"#) {
            Statement::Merge {
                on, how, suffixes, ..
            } => {
                assert_eq!(on.as_deref(), Some("id"));
                assert_eq!(how, "left");
                assert_eq!(suffixes, ("_x".into(), "_y".into()));
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one(
            r#"merge a with b left_on="a_id" right_on="b_id" suffixes=["_l", "_r"] as joined"#,
        ) {
            Statement::Merge {
                left_on,
                right_on,
                suffixes,
                ..
            } => {
                assert_eq!(left_on.as_deref(), Some("a_id"));
                assert_eq!(right_on.as_deref(), Some("b_id"));
                assert_eq!(suffixes, ("_l".into(), "_r".into()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn merge_rejects_malformed_suffixes() {
        let err = parse(tokenize(r#"merge a with b suffixes=["_l"] as j"#).unwrap()).unwrap_err();
        assert!(err.message.contains("list of two strings"));
    }

    #[test]
    fn concat_vertical_defaults_ignore_index_on() {
        match one("concat_vertical [jan, feb, mar] as q1") {
            Statement::ConcatVertical {
                sources,
                ignore_index,
                ..
            } => {
                assert_eq!(sources.len(), 3);
                assert!(ignore_index);
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one("concat_horizontal [left, right] as wide") {
            Statement::ConcatHorizontal { ignore_index, .. } => assert!(!ignore_index),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn set_ops_and_append() {
        assert!(matches!(
            one("union jan with feb as both"),
            Statement::Union { .. }
        ));
        assert!(matches!(
            one("intersection jan with feb as common"),
            Statement::Intersection { .. }
        ));
        assert!(matches!(
            one("difference jan with feb as only_jan"),
            Statement::Difference { .. }
        ));
        assert!(matches!(
            one("append jan with feb as both"),
            Statement::Append { .. }
        ));
        assert!(matches!(
            one("cross_join sizes with colors as grid"),
            Statement::CrossJoin { .. }
        ));
    }

    #[test]
    fn set_index_drop_defaults_true() {
        match one("set_index sales column id as indexed") {
            Statement::SetIndex { drop, .. } => assert!(drop),
            other => panic!("unexpected: {other:?}"),
        }
        match one("reset_index sales as flat") {
            Statement::ResetIndex { drop, .. } => assert!(!drop),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn outliers_method_then_columns() {
        match one(r#"outliers sales with method="iqr" columns {price, qty}"#) {
            Statement::Outliers {
                method, columns, ..
            } => {
                assert_eq!(method, "iqr");
                assert_eq!(columns.len(), 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn hypothesis_colon_style() {
        match one("hypothesis control vs : treatment columns : {outcome} test : t_test") {
            Statement::Hypothesis {
                left,
                right,
                columns,
                test,
                ..
            } => {
                assert_eq!(left.name, "control");
                assert_eq!(right.name, "treatment");
                assert_eq!(columns.len(), 1);
                assert_eq!(test, "t_test");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn boxplot_single_column_grouped_form() {
        match one("boxplot sales with price by region") {
            Statement::Boxplot { columns, by, .. } => {
                assert_eq!(columns.len(), 1);
                assert_eq!(by.unwrap().name, "region");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one("boxplot sales columns {price, qty}") {
            Statement::Boxplot { columns, by, .. } => {
                assert_eq!(columns.len(), 2);
                assert!(by.is_none());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn timeseries_and_pie() {
        match one("timeseries sales x : date y : revenue") {
            Statement::Timeseries { x, y, .. } => {
                assert_eq!(x.name, "date");
                assert_eq!(y.name, "revenue");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match one("pie sales with values=revenue labels=region") {
            Statement::Pie { values, labels, .. } => {
                assert_eq!(values.name, "revenue");
                assert_eq!(labels.name, "region");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validation_checks() {
        assert!(matches!(
            one("assert_unique sales column id"),
            Statement::AssertUnique { .. }
        ));
        assert!(matches!(
            one("assert_no_nulls sales column price"),
            Statement::AssertNoNulls { .. }
        ));
        match one("assert_range sales column price min=0 max=1000") {
            Statement::AssertRange { min, max, .. } => {
                assert_eq!(min, Some(Value::Int(0)));
                assert_eq!(max, Some(Value::Int(1000)));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            one("count_true sales column is_refund"),
            Statement::CountTrue { .. }
        ));
    }

    #[test]
    fn quantile_accepts_integer_or_float() {
        match one("quantile sales column price with q=0.75") {
            Statement::Quantile { q, .. } => assert!((q - 0.75).abs() < f64::EPSILON),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
