// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Python/pandas code generation.
//!
//! [`generate`] walks an analyzed program and emits a complete Python
//! script: an import prelude, one block of pandas code per statement, and a
//! plot-display epilogue when any visualization was drawn. Generation is a
//! pure function of its inputs; byte-identical source produces
//! byte-identical output.
//!
//! # Architecture
//!
//! `mod.rs` owns the shared [`Generator`] state and the exhaustive
//! statement dispatch; the emitters live under [`pandas`], one file per
//! operation family. Per-run state is:
//!
//! - the set of aliases bound so far (plus any caller-supplied
//!   [`SymbolTable`] of pre-existing aliases, for notebook-style sessions),
//! - an insertion-ordered, deduplicated import set,
//! - a counter for `_tmp<N>` throwaway variables, and
//! - a flag recording whether any plot was emitted.
//!
//! Statements with an `as` clause assign to a Python variable named after
//! the alias and print a one-line confirmation; statements without one
//! compute into a fresh `_tmp<N>` and print it immediately.
//!
//! The generator can run standalone, without semantic analysis. The only
//! failure it detects itself is a reference to an alias nothing has bound,
//! reported as [`CodeGenError::UnknownAlias`]; a program that passed
//! analysis can never trigger it.

mod pandas;
#[cfg(test)]
mod property_tests;

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::ast::{
    BinOp, CompareOp, Condition, Expr, Identifier, Param, Statement, StringMatchMode, UnaryOp,
    Value,
};
use crate::semantic_analysis::SymbolTable;

/// Convenience alias for codegen results.
pub type Result<T> = std::result::Result<T, CodeGenError>;

/// An error during code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CodeGenError {
    /// A statement referenced a dataset alias that no earlier statement
    /// bound and the ambient symbol table does not know either.
    #[error("dataset '{alias}' is not bound to a variable")]
    #[diagnostic(help("load or create '{alias}' before referencing it"))]
    UnknownAlias {
        /// The alias as written in source.
        alias: EcoString,
    },
}

/// Generates a Python/pandas script for an analyzed program.
///
/// `ambient` names datasets that already exist as Python variables in the
/// execution environment (earlier notebook cells); pass an empty table for
/// a standalone compile.
pub fn generate(statements: &[Statement], ambient: &SymbolTable) -> Result<String> {
    let mut generator = Generator {
        ambient,
        bound: Vec::new(),
        imports: Vec::new(),
        lines: Vec::new(),
        temps: 0,
        plotted: false,
    };
    // Standard preamble of every script; conditional imports (sqlalchemy,
    // sklearn) queue behind these in first-need order.
    for import in [
        "import pandas as pd",
        "import numpy as np",
        "import matplotlib.pyplot as plt",
        "import seaborn as sns",
        "from scipy import stats",
    ] {
        generator.import_line(import);
    }
    for statement in statements {
        let at = generator.lines.len();
        generator.statement(statement)?;
        if generator.lines.len() > at {
            generator.lines.push(String::new());
        }
    }
    debug!(
        statements = statements.len(),
        imports = generator.imports.len(),
        "code generation finished"
    );
    Ok(generator.assemble())
}

/// Mutable emission state for one `generate` run.
struct Generator<'a> {
    ambient: &'a SymbolTable,
    /// Aliases bound by statements already emitted, in binding order.
    bound: Vec<EcoString>,
    /// Import lines in first-need order, deduplicated.
    imports: Vec<EcoString>,
    lines: Vec<String>,
    temps: u32,
    plotted: bool,
}

impl Generator<'_> {
    /// Exhaustive dispatch: every statement variant has an emitter, so a
    /// new operation that reaches here without one is a compile error.
    #[allow(clippy::too_many_lines)]
    fn statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Load {
                path,
                format,
                params,
                alias,
                ..
            } => self.load(path, *format, params, alias),
            Statement::LoadSql {
                query,
                connection,
                params,
                alias,
                ..
            } => self.load_sql(query, connection, params, alias),
            Statement::Save {
                source,
                path,
                format,
                params,
                ..
            } => self.save(source, path, *format, params),
            Statement::ExportPlot {
                filename,
                width,
                height,
                ..
            } => self.export_plot(filename, *width, *height),

            Statement::Select {
                source,
                columns,
                alias,
                ..
            } => self.select(source, columns, alias.as_ref()),
            Statement::Filter {
                source,
                condition,
                alias,
                ..
            } => self.filter(source, condition, alias.as_ref()),
            Statement::Sort {
                source,
                specs,
                alias,
                ..
            } => self.sort(source, specs, alias.as_ref()),
            Statement::Join {
                left,
                right,
                on,
                alias,
                ..
            } => self.join(left, right, on, alias.as_ref()),
            Statement::Groupby {
                source,
                by,
                aggregations,
                alias,
                ..
            } => self.groupby(source, by, aggregations, alias.as_ref()),
            Statement::Sample {
                source,
                n,
                random,
                alias,
                ..
            } => self.sample(source, *n, *random, alias.as_ref()),
            Statement::Drop {
                source,
                columns,
                alias,
                ..
            } => self.drop(source, columns, alias.as_ref()),
            Statement::Mutate {
                source,
                mutations,
                alias,
                ..
            } => self.mutate(source, mutations, alias.as_ref()),
            Statement::Apply {
                source,
                column,
                transform,
                alias,
                ..
            } => self.apply(source, column, transform, alias.as_ref()),
            Statement::Map {
                source,
                column,
                body,
                alias,
                ..
            } => self.map_statement(source, column, body, alias.as_ref()),

            Statement::SelectByType {
                source,
                dtype,
                alias,
                ..
            } => self.select_by_type(source, dtype, alias.as_ref()),
            Statement::Head {
                source, n, alias, ..
            } => self.head(source, *n, alias.as_ref()),
            Statement::Tail {
                source, n, alias, ..
            } => self.tail(source, *n, alias.as_ref()),
            Statement::Iloc {
                source,
                rows,
                columns,
                alias,
                ..
            } => self.iloc(source, *rows, *columns, alias.as_ref()),
            Statement::Loc {
                source,
                rows,
                columns,
                alias,
                ..
            } => self.loc(source, rows.as_ref(), columns.as_ref(), alias.as_ref()),
            Statement::Rename {
                source,
                mapping,
                alias,
                ..
            } => self.rename(source, mapping, alias.as_ref()),
            Statement::Reorder {
                source,
                order,
                alias,
                ..
            } => self.reorder(source, order, alias.as_ref()),

            Statement::FilterBetween {
                source,
                column,
                low,
                high,
                alias,
                ..
            } => self.filter_between(source, column, low, high, alias.as_ref()),
            Statement::FilterIsin {
                source,
                column,
                values,
                alias,
                ..
            } => self.filter_isin(source, column, values, alias.as_ref()),
            Statement::FilterContains {
                source,
                column,
                pattern,
                alias,
                ..
            } => self.filter_string(source, column, pattern, StringMatchMode::Contains, alias.as_ref()),
            Statement::FilterStartswith {
                source,
                column,
                pattern,
                alias,
                ..
            } => self.filter_string(source, column, pattern, StringMatchMode::StartsWith, alias.as_ref()),
            Statement::FilterEndswith {
                source,
                column,
                pattern,
                alias,
                ..
            } => self.filter_string(source, column, pattern, StringMatchMode::EndsWith, alias.as_ref()),
            Statement::FilterRegex {
                source,
                column,
                pattern,
                alias,
                ..
            } => self.filter_string(source, column, pattern, StringMatchMode::Matches, alias.as_ref()),
            Statement::FilterNull {
                source,
                column,
                alias,
                ..
            } => self.filter_null(source, column, false, alias.as_ref()),
            Statement::FilterNotnull {
                source,
                column,
                alias,
                ..
            } => self.filter_null(source, column, true, alias.as_ref()),
            Statement::FilterDuplicates {
                source,
                subset,
                keep,
                alias,
                ..
            } => self.filter_duplicates(source, subset.as_deref(), keep, alias.as_ref()),

            Statement::Dropna {
                source,
                columns,
                alias,
                ..
            } => self.dropna(source, columns.as_deref(), alias.as_ref()),
            Statement::Fillna {
                source,
                column,
                fill,
                alias,
                ..
            } => self.fillna(source, column, fill, alias.as_ref()),
            Statement::Isnull {
                source,
                column,
                alias,
                ..
            } => self.null_mask(source, column, false, alias.as_ref()),
            Statement::Notnull {
                source,
                column,
                alias,
                ..
            } => self.null_mask(source, column, true, alias.as_ref()),
            Statement::CountNa { source, .. } => self.count_na(source),
            Statement::FillForward {
                source,
                column,
                alias,
                ..
            } => self.fill_directional(source, column.as_ref(), "ffill", alias.as_ref()),
            Statement::FillBackward {
                source,
                column,
                alias,
                ..
            } => self.fill_directional(source, column.as_ref(), "bfill", alias.as_ref()),
            Statement::FillMean {
                source,
                column,
                alias,
                ..
            } => self.fill_statistic(source, column, "mean", alias.as_ref()),
            Statement::FillMedian {
                source,
                column,
                alias,
                ..
            } => self.fill_statistic(source, column, "median", alias.as_ref()),
            Statement::FillMode {
                source,
                column,
                alias,
                ..
            } => self.fill_statistic(source, column, "mode", alias.as_ref()),
            Statement::Interpolate {
                source,
                column,
                method,
                alias,
                ..
            } => self.interpolate(source, column.as_ref(), method, alias.as_ref()),
            Statement::Duplicated {
                source,
                columns,
                keep,
                alias,
                ..
            } => self.duplicated(source, columns.as_deref(), keep, alias.as_ref()),
            Statement::CountDuplicates {
                source, columns, ..
            } => self.count_duplicates(source, columns.as_deref()),
            Statement::DropDuplicates {
                source,
                subset,
                keep,
                alias,
                ..
            } => self.drop_duplicates(source, subset.as_deref(), keep, alias.as_ref()),
            Statement::Qcut {
                source,
                column,
                q,
                labels,
                alias,
                ..
            } => self.qcut(source, column, *q, labels.as_deref(), alias.as_ref()),
            Statement::Cut {
                source,
                column,
                bins,
                labels,
                include_lowest,
                alias,
                ..
            } => self.cut(source, column, bins, labels.as_deref(), *include_lowest, alias.as_ref()),

            Statement::ApplyRow {
                source,
                function,
                alias,
                ..
            } => self.apply_row(source, function, alias.as_ref()),
            Statement::ApplyColumn {
                source,
                column,
                function,
                alias,
                ..
            } => self.apply_column(source, column, function, alias.as_ref()),
            Statement::Applymap {
                source,
                function,
                alias,
                ..
            } => self.applymap(source, function, alias.as_ref()),
            Statement::MapValues {
                source,
                column,
                mapping,
                alias,
                ..
            } => self.map_values(source, column, mapping, alias.as_ref()),
            Statement::AssignConst {
                source,
                column,
                value,
                alias,
                ..
            } => self.assign_const(source, column, value, alias.as_ref()),

            Statement::Describe {
                source, columns, ..
            } => self.describe(source, columns.as_deref()),
            Statement::Summary { source, .. } => self.summary(source),
            Statement::Info { source, .. } => self.info(source),
            Statement::Unique { source, column, .. } => self.unique(source, column),
            Statement::ValueCounts {
                source,
                column,
                normalize,
                ascending,
                ..
            } => self.value_counts(source, column, *normalize, *ascending),
            Statement::Show { source, n, .. } => self.show(source, *n),
            Statement::Corr { source, .. } => self.correlation(source),
            Statement::Cov { source, .. } => self.covariance(source),
            Statement::Compare { left, right, .. } => self.compare(left, right),

            Statement::Outliers {
                source,
                method,
                columns,
                ..
            } => self.outliers(source, method, columns),
            Statement::Quantile {
                source, column, q, ..
            } => self.quantile(source, column, *q),
            Statement::Normalize {
                source,
                columns,
                method,
                alias,
                ..
            } => self.normalize(source, columns, method, alias.as_ref()),
            Statement::Binning {
                source,
                column,
                bins,
                alias,
                ..
            } => self.binning(source, column, *bins, alias.as_ref()),
            Statement::Rolling {
                source,
                column,
                window,
                function,
                alias,
                ..
            } => self.rolling(source, column, *window, function, alias.as_ref()),
            Statement::Hypothesis {
                left,
                right,
                columns,
                test,
                ..
            } => self.hypothesis(left, right, columns, test),

            Statement::Round {
                source,
                column,
                decimals,
                alias,
                ..
            } => self.round(source, column, *decimals, alias.as_ref()),
            Statement::Abs {
                source,
                column,
                alias,
                ..
            } => self.abs(source, column, alias.as_ref()),
            Statement::Sqrt {
                source,
                column,
                alias,
                ..
            } => self.sqrt(source, column, alias.as_ref()),
            Statement::Power {
                source,
                column,
                exponent,
                alias,
                ..
            } => self.power(source, column, *exponent, alias.as_ref()),
            Statement::Log {
                source,
                column,
                base,
                alias,
                ..
            } => self.log(source, column, base, alias.as_ref()),
            Statement::Ceil {
                source,
                column,
                alias,
                ..
            } => self.ceil(source, column, alias.as_ref()),
            Statement::Floor {
                source,
                column,
                alias,
                ..
            } => self.floor(source, column, alias.as_ref()),

            Statement::Upper {
                source,
                column,
                alias,
                ..
            } => self.upper(source, column, alias.as_ref()),
            Statement::Lower {
                source,
                column,
                alias,
                ..
            } => self.lower(source, column, alias.as_ref()),
            Statement::Strip {
                source,
                column,
                alias,
                ..
            } => self.strip(source, column, alias.as_ref()),
            Statement::Lstrip {
                source,
                column,
                chars,
                alias,
                ..
            } => self.side_strip(source, column, chars.as_ref(), "lstrip", alias.as_ref()),
            Statement::Rstrip {
                source,
                column,
                chars,
                alias,
                ..
            } => self.side_strip(source, column, chars.as_ref(), "rstrip", alias.as_ref()),
            Statement::Title {
                source,
                column,
                alias,
                ..
            } => self.title_case(source, column, alias.as_ref()),
            Statement::Capitalize {
                source,
                column,
                alias,
                ..
            } => self.capitalize(source, column, alias.as_ref()),
            Statement::Replace {
                source,
                column,
                old,
                new,
                alias,
                ..
            } => self.replace(source, column, old, new, alias.as_ref()),
            Statement::Split {
                source,
                column,
                delimiter,
                alias,
                ..
            } => self.split(source, column, delimiter, alias.as_ref()),
            Statement::Concat {
                source,
                columns,
                separator,
                alias,
                ..
            } => self.concat_columns(source, columns, separator, alias.as_ref()),
            Statement::Substring {
                source,
                column,
                start,
                end,
                alias,
                ..
            } => self.substring(source, column, *start, *end, alias.as_ref()),
            Statement::Length {
                source,
                column,
                alias,
                ..
            } => self.length(source, column, alias.as_ref()),
            Statement::ExtractRegex {
                source,
                column,
                pattern,
                group,
                alias,
                ..
            } => self.extract_regex(source, column, pattern, *group, alias.as_ref()),
            Statement::Find {
                source,
                column,
                substring,
                alias,
                ..
            } => self.find(source, column, substring, alias.as_ref()),

            Statement::ParseDatetime {
                source,
                column,
                format,
                alias,
                ..
            } => self.parse_datetime(source, column, format.as_ref(), alias.as_ref()),
            Statement::Extract {
                source,
                column,
                part,
                alias,
                ..
            } => self.extract_part(source, column, &part.to_lowercase(), alias.as_ref()),
            Statement::ExtractYear {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "year", alias.as_ref()),
            Statement::ExtractMonth {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "month", alias.as_ref()),
            Statement::ExtractDay {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "day", alias.as_ref()),
            Statement::ExtractHour {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "hour", alias.as_ref()),
            Statement::ExtractMinute {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "minute", alias.as_ref()),
            Statement::ExtractSecond {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "second", alias.as_ref()),
            Statement::ExtractDayofweek {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "dayofweek", alias.as_ref()),
            Statement::ExtractDayofyear {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "dayofyear", alias.as_ref()),
            Statement::ExtractWeekofyear {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "weekofyear", alias.as_ref()),
            Statement::ExtractQuarter {
                source,
                column,
                alias,
                ..
            } => self.extract_part(source, column, "quarter", alias.as_ref()),
            Statement::DateDiff {
                source,
                start,
                end,
                unit,
                alias,
                ..
            } => self.date_diff(source, start, end, unit, alias.as_ref()),
            Statement::DateAdd {
                source,
                column,
                amount,
                unit,
                alias,
                ..
            } => self.date_shift(source, column, *amount, unit, true, alias.as_ref()),
            Statement::DateSubtract {
                source,
                column,
                amount,
                unit,
                alias,
                ..
            } => self.date_shift(source, column, *amount, unit, false, alias.as_ref()),
            Statement::FormatDatetime {
                source,
                column,
                format,
                alias,
                ..
            } => self.format_datetime(source, column, format, alias.as_ref()),

            Statement::Astype {
                source,
                column,
                dtype,
                alias,
                ..
            } => self.astype(source, column, dtype, alias.as_ref()),
            Statement::ToNumeric {
                source,
                column,
                errors,
                alias,
                ..
            } => self.to_numeric(source, column, errors, alias.as_ref()),
            Statement::OneHotEncode {
                source,
                column,
                alias,
                ..
            } => self.one_hot_encode(source, column, alias.as_ref()),
            Statement::LabelEncode {
                source,
                column,
                alias,
                ..
            } => self.label_encode(source, column, alias.as_ref()),
            Statement::StandardScale {
                source,
                column,
                alias,
                ..
            } => self.scale_in_place(source, column, "StandardScaler", "Standard", alias.as_ref()),
            Statement::MinmaxScale {
                source,
                column,
                alias,
                ..
            } => self.scale_in_place(source, column, "MinMaxScaler", "Min-Max", alias.as_ref()),
            Statement::RobustScale {
                source,
                column,
                alias,
                ..
            } => self.scale_derived(source, column, "RobustScaler", "robust", alias.as_ref()),
            Statement::MaxabsScale {
                source,
                column,
                alias,
                ..
            } => self.scale_derived(source, column, "MaxAbsScaler", "maxabs", alias.as_ref()),
            Statement::OrdinalEncode {
                source,
                column,
                order,
                alias,
                ..
            } => self.ordinal_encode(source, column, order, alias.as_ref()),
            Statement::TargetEncode {
                source,
                column,
                target,
                alias,
                ..
            } => self.target_encode(source, column, target, alias.as_ref()),

            Statement::SortIndex {
                source,
                ascending,
                alias,
                ..
            } => self.sort_index(source, *ascending, alias.as_ref()),
            Statement::Rank {
                source,
                column,
                method,
                ascending,
                pct,
                alias,
                ..
            } => self.rank(source, column, method, *ascending, *pct, alias.as_ref()),

            Statement::FilterGroups {
                source,
                by,
                condition,
                alias,
                ..
            } => self.filter_groups(source, by, condition, alias.as_ref()),
            Statement::GroupTransform {
                source,
                by,
                column,
                function,
                alias,
                ..
            } => self.group_transform(source, by, column, function, alias.as_ref()),
            Statement::WindowRank {
                source,
                column,
                by,
                method,
                ascending,
                alias,
                ..
            } => self.window_rank(source, column, by.as_deref(), method, *ascending, alias.as_ref()),
            Statement::WindowLag {
                source,
                column,
                periods,
                by,
                fill_value,
                alias,
                ..
            } => self.window_shift(source, column, *periods, by.as_deref(), fill_value.as_ref(), "lag", alias.as_ref()),
            Statement::WindowLead {
                source,
                column,
                periods,
                by,
                fill_value,
                alias,
                ..
            } => self.window_shift(source, column, *periods, by.as_deref(), fill_value.as_ref(), "lead", alias.as_ref()),

            Statement::RollingMean {
                source,
                column,
                window,
                min_periods,
                alias,
                ..
            } => self.rolling_statistic(source, column, *window, *min_periods, "mean", alias.as_ref()),
            Statement::RollingSum {
                source,
                column,
                window,
                min_periods,
                alias,
                ..
            } => self.rolling_statistic(source, column, *window, *min_periods, "sum", alias.as_ref()),
            Statement::RollingStd {
                source,
                column,
                window,
                min_periods,
                alias,
                ..
            } => self.rolling_statistic(source, column, *window, *min_periods, "std", alias.as_ref()),
            Statement::RollingMin {
                source,
                column,
                window,
                min_periods,
                alias,
                ..
            } => self.rolling_statistic(source, column, *window, *min_periods, "min", alias.as_ref()),
            Statement::RollingMax {
                source,
                column,
                window,
                min_periods,
                alias,
                ..
            } => self.rolling_statistic(source, column, *window, *min_periods, "max", alias.as_ref()),
            Statement::ExpandingMean {
                source,
                column,
                min_periods,
                alias,
                ..
            } => self.expanding_statistic(source, column, *min_periods, "mean", alias.as_ref()),
            Statement::ExpandingSum {
                source,
                column,
                min_periods,
                alias,
                ..
            } => self.expanding_statistic(source, column, *min_periods, "sum", alias.as_ref()),
            Statement::ExpandingMin {
                source,
                column,
                min_periods,
                alias,
                ..
            } => self.expanding_statistic(source, column, *min_periods, "min", alias.as_ref()),
            Statement::ExpandingMax {
                source,
                column,
                min_periods,
                alias,
                ..
            } => self.expanding_statistic(source, column, *min_periods, "max", alias.as_ref()),

            Statement::Cumsum {
                source,
                column,
                alias,
                ..
            } => self.cumulative(source, column, "cumsum", "sum", alias.as_ref()),
            Statement::Cummax {
                source,
                column,
                alias,
                ..
            } => self.cumulative(source, column, "cummax", "maximum", alias.as_ref()),
            Statement::Cummin {
                source,
                column,
                alias,
                ..
            } => self.cumulative(source, column, "cummin", "minimum", alias.as_ref()),
            Statement::Cumprod {
                source,
                column,
                alias,
                ..
            } => self.cumulative(source, column, "cumprod", "product", alias.as_ref()),
            Statement::PctChange {
                source,
                column,
                periods,
                alias,
                ..
            } => self.pct_change(source, column, *periods, alias.as_ref()),
            Statement::Diff {
                source,
                column,
                periods,
                alias,
                ..
            } => self.diff(source, column, *periods, alias.as_ref()),
            Statement::Shift {
                source,
                column,
                periods,
                fill_value,
                alias,
                ..
            } => self.shift(source, column, *periods, fill_value.as_ref(), alias.as_ref()),
            Statement::Resample {
                source,
                rule,
                column,
                aggfunc,
                alias,
                ..
            } => self.resample(source, rule, column, aggfunc, alias.as_ref()),

            Statement::Pivot {
                source,
                index,
                columns,
                values,
                alias,
                ..
            } => self.pivot(source, index, columns, values, alias.as_ref()),
            Statement::PivotTable {
                source,
                index,
                columns,
                values,
                aggfunc,
                fill_value,
                alias,
                ..
            } => self.pivot_table(source, index, columns, values, aggfunc, fill_value.as_ref(), alias.as_ref()),
            Statement::Melt {
                source,
                id_vars,
                value_vars,
                var_name,
                value_name,
                alias,
                ..
            } => self.melt(source, id_vars, value_vars.as_deref(), var_name, value_name, alias.as_ref()),
            Statement::Stack {
                source,
                level,
                alias,
                ..
            } => self.stack(source, *level, alias.as_ref()),
            Statement::Unstack {
                source,
                level,
                fill_value,
                alias,
                ..
            } => self.unstack(source, *level, fill_value.as_ref(), alias.as_ref()),
            Statement::Transpose { source, alias, .. } => self.transpose(source, alias.as_ref()),
            Statement::Crosstab {
                source,
                rows,
                columns,
                values,
                aggfunc,
                alias,
                ..
            } => self.crosstab(source, rows, columns, values.as_ref(), aggfunc, alias.as_ref()),
            Statement::Explode {
                source,
                column,
                alias,
                ..
            } => self.explode(source, column, alias.as_ref()),

            Statement::Merge {
                left,
                right,
                on,
                left_on,
                right_on,
                how,
                suffixes,
                alias,
                ..
            } => self.merge(
                left,
                right,
                on.as_ref(),
                left_on.as_ref(),
                right_on.as_ref(),
                how,
                suffixes,
                alias.as_ref(),
            ),
            Statement::ConcatVertical {
                sources,
                ignore_index,
                alias,
                ..
            } => self.concat_frames(sources, *ignore_index, 0, alias.as_ref()),
            Statement::ConcatHorizontal {
                sources,
                ignore_index,
                alias,
                ..
            } => self.concat_frames(sources, *ignore_index, 1, alias.as_ref()),
            Statement::Union {
                left, right, alias, ..
            } => self.union(left, right, alias.as_ref()),
            Statement::Intersection {
                left, right, alias, ..
            } => self.intersection(left, right, alias.as_ref()),
            Statement::Difference {
                left, right, alias, ..
            } => self.difference(left, right, alias.as_ref()),
            Statement::Append {
                left, right, alias, ..
            } => self.append_rows(left, right, alias.as_ref()),
            Statement::CrossJoin {
                left, right, alias, ..
            } => self.cross_join(left, right, alias.as_ref()),

            Statement::SetIndex {
                source,
                column,
                drop,
                alias,
                ..
            } => self.set_index(source, column, *drop, alias.as_ref()),
            Statement::ResetIndex {
                source,
                drop,
                alias,
                ..
            } => self.reset_index(source, *drop, alias.as_ref()),
            Statement::Reindex {
                source,
                index,
                alias,
                ..
            } => self.reindex(source, index, alias.as_ref()),
            Statement::SetMultiindex {
                source,
                columns,
                alias,
                ..
            } => self.set_multiindex(source, columns, alias.as_ref()),

            Statement::AssertUnique { source, column, .. } => self.assert_unique(source, column),
            Statement::AssertNoNulls { source, column, .. } => {
                self.assert_no_nulls(source, column)
            }
            Statement::AssertRange {
                source,
                column,
                min,
                max,
                ..
            } => self.assert_range(source, column, min.as_ref(), max.as_ref()),
            Statement::Any { source, column, .. } => self.truth_check(source, column, "any"),
            Statement::All { source, column, .. } => self.truth_check(source, column, "all"),
            Statement::CountTrue { source, column, .. } => self.count_true(source, column),

            Statement::Boxplot {
                source,
                columns,
                by,
                ..
            } => self.boxplot(source, columns, by.as_ref()),
            Statement::Heatmap {
                source, columns, ..
            } => self.heatmap(source, columns),
            Statement::Pairplot {
                source, columns, ..
            } => self.pairplot(source, columns),
            Statement::Timeseries { source, x, y, .. } => self.timeseries(source, x, y),
            Statement::Pie {
                source,
                values,
                labels,
                ..
            } => self.pie(source, values, labels),
        }
    }

    /// Stitches imports, the visualization config block, per-statement
    /// blocks, and the plot epilogue together into the final script.
    fn assemble(mut self) -> String {
        let mut out: Vec<String> = self.imports.iter().map(ToString::to_string).collect();

        out.push(String::new());
        out.push("# Configure visualization settings".to_string());
        out.push("plt.style.use('seaborn-v0_8-darkgrid')".to_string());
        out.push("sns.set_palette('husl')".to_string());

        out.push(String::new());
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        out.append(&mut self.lines);

        if self.plotted {
            out.push(String::new());
            out.push("# Display all plots".to_string());
            out.push("plt.tight_layout()".to_string());
            out.push("try:".to_string());
            out.push("    get_ipython()".to_string());
            out.push("except NameError:".to_string());
            out.push("    plt.show()".to_string());
        }

        let mut script = out.join("\n");
        script.push('\n');
        script
    }

    // ------------------------------------------------------------------
    // Shared emission state
    // ------------------------------------------------------------------

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Records an import the emitted code needs. First need wins the
    /// position; duplicates are dropped.
    fn import_line(&mut self, line: &str) {
        if !self.imports.iter().any(|l| l == line) {
            self.imports.push(EcoString::from(line));
        }
    }

    /// The Python variable holding `alias`, which must already be bound
    /// here or in the ambient table.
    fn var(&self, alias: &Identifier) -> Result<EcoString> {
        if self.bound.iter().any(|b| *b == alias.name) || self.ambient.contains(&alias.name) {
            Ok(alias.name.clone())
        } else {
            Err(CodeGenError::UnknownAlias {
                alias: alias.name.clone(),
            })
        }
    }

    /// Binds `alias` to a Python variable of the same name.
    fn bind(&mut self, alias: &Identifier) -> EcoString {
        if !self.bound.iter().any(|b| *b == alias.name) {
            self.bound.push(alias.name.clone());
        }
        alias.name.clone()
    }

    /// A fresh throwaway variable for display-mode results.
    fn temp(&mut self) -> String {
        let name = format!("_tmp{}", self.temps);
        self.temps += 1;
        name
    }

    /// Emits `target = expr` with the mode-appropriate follow-up: a
    /// confirmation print in storage mode, a heading and the value itself
    /// in display mode. `confirm` receives the target variable so it can
    /// interpolate runtime counts.
    fn store_or_show(
        &mut self,
        alias: Option<&Identifier>,
        heading: &str,
        expr: &str,
        confirm: impl FnOnce(&str) -> String,
    ) {
        match alias {
            Some(alias) => {
                let var = self.bind(alias);
                self.push(format!("{var} = {expr}"));
                self.push(confirm(&var));
            }
            None => {
                let tmp = self.temp();
                self.push(format!("{tmp} = {expr}"));
                self.push(format!("print(f'\\n{heading}:')"));
                self.push(format!("print({tmp})"));
            }
        }
    }

    /// Copy-then-mutate emission: `target = src.copy()` followed by the
    /// mutation lines `body` builds for the target variable, then the
    /// mode-appropriate follow-up.
    fn copy_mutate(
        &mut self,
        src: &str,
        alias: Option<&Identifier>,
        heading: &str,
        body: impl FnOnce(&str) -> Vec<String>,
        confirm: impl FnOnce(&str) -> String,
    ) {
        let target = match alias {
            Some(alias) => self.bind(alias).to_string(),
            None => self.temp(),
        };
        self.push(format!("{target} = {src}.copy()"));
        for line in body(&target) {
            self.push(line);
        }
        if alias.is_some() {
            self.push(confirm(&target));
        } else {
            self.push(format!("print(f'\\n{heading}:')"));
            self.push(format!("print({target})"));
        }
    }

    // ------------------------------------------------------------------
    // Expression rendering
    // ------------------------------------------------------------------

    /// Renders a transform expression. `x` is the substitution for the
    /// placeholder column `x`; other column references index into `frame`.
    fn expr_code(&mut self, frame: &str, x: &str, expr: &Expr) -> String {
        match expr {
            Expr::Literal(value, _) => py_value(value),
            Expr::Column(id) => {
                if id.name == "x" {
                    x.to_string()
                } else {
                    format!("{frame}['{}']", id.name)
                }
            }
            Expr::Unary { op, operand, .. } => {
                let operand = self.expr_code(frame, x, operand);
                match op {
                    UnaryOp::Neg => format!("(-{operand})"),
                    UnaryOp::Not => format!("(~{operand})"),
                }
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                let left = self.expr_code(frame, x, left);
                let right = self.expr_code(frame, x, right);
                format!("({left} {} {right})", bin_op(*op))
            }
            Expr::Call { function, args, .. } => {
                let args: Vec<String> = args
                    .iter()
                    .map(|arg| self.expr_code(frame, x, arg))
                    .collect();
                let args = args.join(", ");
                if NUMPY_FUNCS.contains(&function.name.as_str()) {
                    self.import_line("import numpy as np");
                    format!("np.{}({args})", function.name)
                } else {
                    format!("{}({args})", function.name)
                }
            }
            Expr::Conditional {
                value,
                condition,
                otherwise,
                ..
            } => {
                self.import_line("import numpy as np");
                let condition = self.expr_code(frame, x, condition);
                let value = self.expr_code(frame, x, value);
                let otherwise = self.expr_code(frame, x, otherwise);
                format!("np.where({condition}, {value}, {otherwise})")
            }
        }
    }
}

/// Functions that render through numpy in vectorized expressions.
const NUMPY_FUNCS: &[&str] = &[
    "sqrt", "log", "log2", "log10", "exp", "abs", "floor", "ceil", "sin", "cos", "tan",
];

fn bin_op(op: BinOp) -> &'static str {
    match op {
        BinOp::Or => "|",
        BinOp::And => "&",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
    }
}

fn compare_op(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "==",
        CompareOp::Ne => "!=",
        CompareOp::Lt => "<",
        CompareOp::Gt => ">",
        CompareOp::Le => "<=",
        CompareOp::Ge => ">=",
    }
}

// ----------------------------------------------------------------------
// Python literal rendering
// ----------------------------------------------------------------------

/// A single-quoted Python string literal.
fn py_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// A [`Value`] as Python source. Bare identifiers render as strings; in
/// every position a value can appear they name a column.
fn py_value(value: &Value) -> String {
    match value {
        Value::Str(s) | Value::Ident(s) => py_str(s),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => py_float(*f),
        Value::Bool(b) => py_bool(*b).to_string(),
        Value::Null => "None".to_string(),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(py_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Dict(entries) => py_dict(entries),
    }
}

/// Floats keep a decimal point so Python reads them as floats.
fn py_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn py_dict(entries: &[(EcoString, Value)]) -> String {
    let entries: Vec<String> = entries
        .iter()
        .map(|(key, value)| format!("{}: {}", py_str(key), py_value(value)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Identifiers as a Python list of strings: `['a', 'b']`.
fn py_name_list(names: &[Identifier]) -> String {
    let names: Vec<String> = names.iter().map(|n| py_str(&n.name)).collect();
    format!("[{}]", names.join(", "))
}

fn py_value_list(values: &[Value]) -> String {
    let values: Vec<String> = values.iter().map(py_value).collect();
    format!("[{}]", values.join(", "))
}

/// A `key=value` keyword-argument run, in source order.
fn params_str(params: &[Param]) -> String {
    let params: Vec<String> = params
        .iter()
        .map(|p| format!("{}={}", p.name, py_value(&p.value)))
        .collect();
    params.join(", ")
}

/// Renders a `where` condition as a boolean mask over `frame`.
fn condition_code(frame: &str, condition: &Condition) -> String {
    match condition {
        Condition::Or(left, right) => format!(
            "({}) | ({})",
            condition_code(frame, left),
            condition_code(frame, right)
        ),
        Condition::And(left, right) => format!(
            "({}) & ({})",
            condition_code(frame, left),
            condition_code(frame, right)
        ),
        Condition::Not(inner) => format!("~({})", condition_code(frame, inner)),
        Condition::Comparison { column, op, value } => format!(
            "{frame}['{}'] {} {}",
            column.name,
            compare_op(*op),
            py_value(value)
        ),
        Condition::Between { column, low, high } => format!(
            "{frame}['{}'].between({}, {})",
            column.name,
            py_value(low),
            py_value(high)
        ),
        Condition::In { column, values } => format!(
            "{frame}['{}'].isin({})",
            column.name,
            py_value_list(values)
        ),
        Condition::StringMatch {
            column,
            mode,
            pattern,
        } => {
            let method = match mode {
                StringMatchMode::Contains => "contains",
                StringMatchMode::StartsWith => "startswith",
                StringMatchMode::EndsWith => "endswith",
                StringMatchMode::Matches => "match",
            };
            format!(
                "{frame}['{}'].str.{method}({}, na=False)",
                column.name,
                py_str(pattern)
            )
        }
        Condition::IsNull { column, negated } => {
            let method = if *negated { "notnull" } else { "isnull" };
            format!("{frame}['{}'].{method}()", column.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{parse, tokenize};

    fn gen(source: &str) -> String {
        let statements = parse(tokenize(source).unwrap()).unwrap();
        generate(&statements, &SymbolTable::new()).unwrap()
    }

    #[test]
    fn literals_render_as_python() {
        assert_eq!(py_value(&Value::Str("it's".into())), "'it\\'s'");
        assert_eq!(py_value(&Value::Int(-3)), "-3");
        assert_eq!(py_value(&Value::Float(2.0)), "2.0");
        assert_eq!(py_value(&Value::Float(2.5)), "2.5");
        assert_eq!(py_value(&Value::Bool(true)), "True");
        assert_eq!(py_value(&Value::Null), "None");
        assert_eq!(
            py_value(&Value::List(vec![Value::Int(1), Value::Str("a".into())])),
            "[1, 'a']"
        );
    }

    #[test]
    fn conditions_follow_pandas_mask_syntax() {
        let statements =
            parse(tokenize("filter sales where price > 100 and region in [\"eu\", \"us\"]").unwrap())
                .unwrap();
        let Statement::Filter { condition, .. } = &statements[0] else {
            panic!("expected filter");
        };
        assert_eq!(
            condition_code("sales", condition),
            "(sales['price'] > 100) & (sales['region'].isin(['eu', 'us']))"
        );
    }

    #[test]
    fn negated_conditions_wrap_in_tilde() {
        let statements =
            parse(tokenize("filter sales where not (price > 100)").unwrap()).unwrap();
        let Statement::Filter { condition, .. } = &statements[0] else {
            panic!("expected filter");
        };
        assert_eq!(
            condition_code("sales", condition),
            "~(sales['price'] > 100)"
        );
    }

    #[test]
    fn storage_mode_binds_the_alias_and_confirms() {
        let script = gen("load \"sales.csv\" as sales\nfilter sales where price > 100 as expensive");
        assert!(script.contains("expensive = sales[sales['price'] > 100].copy()"));
        assert!(script.contains("rows match condition"));
        assert!(!script.contains("_tmp0"));
    }

    #[test]
    fn display_mode_uses_a_fresh_temp_and_prints_it() {
        let script = gen("load \"sales.csv\" as sales\nfilter sales where price > 100");
        assert!(script.contains("_tmp0 = sales[sales['price'] > 100].copy()"));
        assert!(script.contains("print(f'\\nFiltered Result:')"));
        assert!(script.contains("print(_tmp0)"));
    }

    #[test]
    fn temp_counter_never_reuses_names() {
        let script = gen(
            "load \"sales.csv\" as sales\nfilter sales where price > 100\nfilter sales where price < 10",
        );
        assert!(script.contains("_tmp0 = "));
        assert!(script.contains("_tmp1 = "));
    }

    #[test]
    fn unknown_alias_is_the_only_codegen_error() {
        let statements = parse(tokenize("show ghost").unwrap()).unwrap();
        let err = generate(&statements, &SymbolTable::new()).unwrap_err();
        assert_eq!(
            err,
            CodeGenError::UnknownAlias {
                alias: "ghost".into()
            }
        );
    }

    #[test]
    fn ambient_symbols_count_as_bound() {
        use crate::semantic_analysis::{DatasetInfo, Schema};
        use crate::source_analysis::Span;

        let mut ambient = SymbolTable::new();
        ambient.define(
            "sales",
            DatasetInfo::new(Schema::Unknown, "earlier cell", Span::point(0)),
        );
        let statements = parse(tokenize("show sales").unwrap()).unwrap();
        let script = generate(&statements, &ambient).unwrap();
        assert!(script.contains("print(sales)"));
    }

    #[test]
    fn pandas_import_always_leads() {
        let script = gen("load \"sales.csv\" as sales");
        assert!(script.starts_with("import pandas as pd\n"));
    }

    #[test]
    fn every_script_opens_with_the_standard_preamble() {
        let script = gen("load \"sales.csv\" as sales\nhead sales");
        let preamble = "import pandas as pd\n\
                        import numpy as np\n\
                        import matplotlib.pyplot as plt\n\
                        import seaborn as sns\n\
                        from scipy import stats\n\
                        \n\
                        # Configure visualization settings\n\
                        plt.style.use('seaborn-v0_8-darkgrid')\n\
                        sns.set_palette('husl')\n";
        assert!(script.starts_with(preamble));
    }

    #[test]
    fn conditional_imports_queue_behind_the_preamble() {
        let script = gen(
            "load \"sales.csv\" as sales\nnormalize sales columns {price} with method=\"zscore\" as scaled\nload sql \"select * from t\" from \"sqlite:///db.sqlite\" as rows",
        );
        let scipy = script.find("from scipy import stats").unwrap();
        let sklearn = script.find("from sklearn.preprocessing import").unwrap();
        let sqlalchemy = script.find("from sqlalchemy import create_engine").unwrap();
        assert!(scipy < sklearn);
        assert!(sklearn < sqlalchemy);
    }

    #[test]
    fn no_plot_means_no_epilogue() {
        let script = gen("load \"sales.csv\" as sales\nhead sales");
        assert!(!script.contains("# Display all plots"));
        assert!(!script.contains("plt.show()"));
    }

    #[test]
    fn plot_statements_emit_the_display_epilogue() {
        let script = gen("load \"sales.csv\" as sales\nboxplot sales columns {price}");
        assert!(script.contains("# Display all plots"));
        assert!(script.contains("plt.tight_layout()"));
        assert!(script.contains("    plt.show()"));
    }

    #[test]
    fn generation_is_deterministic() {
        let source = "load \"sales.csv\" as sales\ngroupby sales by {region} compute {sum: price} as totals\nshow totals";
        assert_eq!(gen(source), gen(source));
    }
}
