// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis of parsed programs.
//!
//! A single pass walks statements in source order, maintaining a
//! [`SymbolTable`] of dataset aliases with best-effort column schemas.
//! Unlike the fail-fast parser, analysis batches its findings: every
//! statement is visited even when earlier ones fail, so one compile reports
//! every undefined alias in the program. Within a single statement the
//! first failed check wins, the statement registers nothing, and the walk
//! moves on to the next statement.
//!
//! Dataset references are always checked. Column checks are opt-in through
//! [`AnalyzeOptions::check_columns`] and only fire against known schemas,
//! so anything downstream of an unreadable load or a reshape stays quiet.
//!
//! Statements with an `as` clause register their result under that alias;
//! statements without one are display-only and register nothing.

mod introspect;
mod schema;
mod string_utils;
mod symbol_table;

pub use introspect::{FileIntrospector, SchemaIntrospector};
pub use schema::{Column, DataType, Schema};
pub use symbol_table::{DatasetInfo, SymbolTable};

use camino::Utf8Path;
use ecow::EcoString;
use tracing::debug;

use crate::ast::{
    Aggregation, Condition, Expr, FileFormat, Identifier, MapBody, Statement, Value,
};
use crate::diagnostics::Diagnostic;
use crate::source_analysis::Span;

/// Knobs for [`analyze`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Check referenced columns against known schemas. Off by default:
    /// schemas are best-effort, and a stale or missing file should not fail
    /// a compile unless the caller asked for that strictness.
    pub check_columns: bool,
}

/// What analysis found: diagnostics (empty means the program is sound) and
/// the final symbol table.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
}

impl Analysis {
    /// Whether the program passed every semantic check.
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Analyzes a parsed program.
///
/// `introspector` supplies column layouts for load statements; pass `None`
/// to track every loaded dataset with an unknown schema.
pub fn analyze(
    statements: &[Statement],
    options: &AnalyzeOptions,
    introspector: Option<&dyn SchemaIntrospector>,
) -> Analysis {
    let mut analyzer = Analyzer {
        options,
        introspector,
        symbols: SymbolTable::new(),
    };
    let mut diagnostics = Vec::new();
    for statement in statements {
        if let Err(diagnostic) = analyzer.check_statement(statement) {
            diagnostics.push(diagnostic);
        }
    }
    debug!(
        statements = statements.len(),
        datasets = analyzer.symbols.len(),
        errors = diagnostics.len(),
        "semantic analysis finished"
    );
    Analysis {
        diagnostics,
        symbols: analyzer.symbols,
    }
}

struct Analyzer<'a> {
    options: &'a AnalyzeOptions,
    introspector: Option<&'a dyn SchemaIntrospector>,
    symbols: SymbolTable,
}

impl Analyzer<'_> {
    /// Checks one statement and registers its result. The first failing
    /// check aborts the statement, so a statement yields at most one
    /// diagnostic and a failed statement defines nothing.
    #[allow(clippy::too_many_lines)]
    fn check_statement(&mut self, statement: &Statement) -> Result<(), Diagnostic> {
        match statement {
            // -- Loading and saving ------------------------------------
            Statement::Load {
                path,
                format,
                alias,
                span,
                ..
            } => {
                let format = format
                    .or_else(|| FileFormat::from_path(path))
                    .unwrap_or(FileFormat::Csv);
                let schema = self
                    .introspector
                    .and_then(|i| i.columns(Utf8Path::new(path.as_str()), format))
                    .map_or(Schema::Unknown, Schema::Known);
                self.symbols
                    .define(alias.name.clone(), DatasetInfo::new(schema, path.clone(), *span));
                Ok(())
            }
            Statement::LoadSql {
                connection,
                alias,
                span,
                ..
            } => {
                let info = DatasetInfo::new(
                    Schema::Unknown,
                    format!("sql from {connection}"),
                    *span,
                );
                self.symbols.define(alias.name.clone(), info);
                Ok(())
            }
            Statement::Save { source, .. } => self.resolve(source).map(|_| ()),
            Statement::ExportPlot { .. } => Ok(()),

            // -- Core relational operations ----------------------------
            Statement::Select {
                source,
                columns,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, columns)?;
                let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
                self.register(
                    alias,
                    schema.narrowed_to(&names),
                    format!("select from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Filter {
                source,
                condition,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                let mut referenced = Vec::new();
                condition_columns(condition, &mut referenced);
                for column in referenced {
                    self.check_column(source, &schema, column)?;
                }
                self.register(alias, schema, format!("filter from {}", source.name), *span);
                Ok(())
            }
            Statement::Sort {
                source,
                specs,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                for spec in specs {
                    self.check_column(source, &schema, &spec.column)?;
                }
                self.register(alias, schema, format!("sort from {}", source.name), *span);
                Ok(())
            }
            Statement::Join {
                left,
                right,
                on,
                alias,
                span,
            } => {
                let left_schema = self.resolve(left)?;
                let right_schema = self.resolve(right)?;
                self.check_column(left, &left_schema, on)?;
                self.check_column(right, &right_schema, on)?;
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("join {} with {}", left.name, right.name),
                    *span,
                );
                Ok(())
            }
            Statement::Groupby {
                source,
                by,
                aggregations,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, by)?;
                for aggregation in aggregations {
                    self.check_column(source, &schema, &aggregation.column)?;
                }
                self.register(
                    alias,
                    groupby_schema(&schema, by, aggregations),
                    format!("groupby from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Sample {
                source, alias, span, ..
            } => self.passthrough("sample", source, alias, *span),
            Statement::Drop {
                source,
                columns,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, columns)?;
                let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
                self.register(
                    alias,
                    schema.without(&names),
                    format!("drop from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Mutate {
                source,
                mutations,
                alias,
                span,
            } => {
                let mut schema = self.resolve(source)?;
                for mutation in mutations {
                    schema = schema
                        .extended_with(Column::new(mutation.column.name.clone(), DataType::Unknown));
                }
                self.register(alias, schema, format!("mutate from {}", source.name), *span);
                Ok(())
            }
            Statement::Apply {
                source,
                column,
                transform,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                self.check_transform_columns(source, &schema, transform)?;
                let schema = schema.extended_with(Column::new(
                    format!("{}_transformed", column.name),
                    DataType::Unknown,
                ));
                self.register(alias, schema, format!("apply from {}", source.name), *span);
                Ok(())
            }
            Statement::Map {
                source,
                column,
                body,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                if let MapBody::Transform(expr) = body {
                    self.check_transform_columns(source, &schema, expr)?;
                }
                let schema = schema.extended_with(Column::new(
                    format!("{}_mapped", column.name),
                    DataType::Unknown,
                ));
                self.register(alias, schema, format!("map from {}", source.name), *span);
                Ok(())
            }

            // -- Selection and projection ------------------------------
            Statement::SelectByType {
                source, alias, span, ..
            } => self.obscured("select_by_type", source, alias, *span),
            Statement::Head {
                source, alias, span, ..
            } => self.passthrough("head", source, alias, *span),
            Statement::Tail {
                source, alias, span, ..
            } => self.passthrough("tail", source, alias, *span),
            Statement::Iloc {
                source,
                columns,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                // Column slicing is positional, so the result layout is not
                // tracked; row-only slicing keeps the source layout.
                let schema = if columns.is_some() { Schema::Unknown } else { schema };
                self.register(alias, schema, format!("iloc from {}", source.name), *span);
                Ok(())
            }
            Statement::Loc {
                source,
                columns,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                let schema = if columns.is_some() { Schema::Unknown } else { schema };
                self.register(alias, schema, format!("loc from {}", source.name), *span);
                Ok(())
            }
            Statement::Rename {
                source,
                mapping,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                for (old, _) in mapping {
                    self.check_column_name(source, &schema, old, *span)?;
                }
                let pairs: Vec<(&str, &str)> = mapping
                    .iter()
                    .filter_map(|(old, new)| {
                        value_as_column(new).map(|new| (old.as_str(), new))
                    })
                    .collect();
                self.register(
                    alias,
                    schema.renamed(&pairs),
                    format!("rename from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Reorder {
                source,
                order,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                let names: Vec<&str> = order.iter().filter_map(value_as_column).collect();
                for name in &names {
                    self.check_column_name(source, &schema, name, *span)?;
                }
                self.register(
                    alias,
                    schema.narrowed_to(&names),
                    format!("reorder from {}", source.name),
                    *span,
                );
                Ok(())
            }

            // -- Parameterised filters ---------------------------------
            Statement::FilterBetween {
                source,
                column,
                alias,
                span,
                ..
            } => self.filtered("filter_between", source, column, alias, *span),
            Statement::FilterIsin {
                source,
                column,
                alias,
                span,
                ..
            } => self.filtered("filter_isin", source, column, alias, *span),
            Statement::FilterContains {
                source,
                column,
                alias,
                span,
                ..
            } => self.filtered("filter_contains", source, column, alias, *span),
            Statement::FilterStartswith {
                source,
                column,
                alias,
                span,
                ..
            } => self.filtered("filter_startswith", source, column, alias, *span),
            Statement::FilterEndswith {
                source,
                column,
                alias,
                span,
                ..
            } => self.filtered("filter_endswith", source, column, alias, *span),
            Statement::FilterRegex {
                source,
                column,
                alias,
                span,
                ..
            } => self.filtered("filter_regex", source, column, alias, *span),
            Statement::FilterNull {
                source,
                column,
                alias,
                span,
            } => self.filtered("filter_null", source, column, alias, *span),
            Statement::FilterNotnull {
                source,
                column,
                alias,
                span,
            } => self.filtered("filter_notnull", source, column, alias, *span),
            Statement::FilterDuplicates {
                source,
                subset,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                if let Some(subset) = subset {
                    self.check_values(source, &schema, subset, *span)?;
                }
                self.register(
                    alias,
                    schema,
                    format!("filter_duplicates from {}", source.name),
                    *span,
                );
                Ok(())
            }

            // -- Cleaning ----------------------------------------------
            Statement::Dropna {
                source,
                columns,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                if let Some(columns) = columns {
                    self.check_identifiers(source, &schema, columns)?;
                }
                self.register(alias, schema, format!("dropna from {}", source.name), *span);
                Ok(())
            }
            Statement::Fillna {
                source,
                column,
                alias,
                span,
                ..
            } => self.in_place("fillna", source, column, alias, *span),
            Statement::Isnull {
                source,
                column,
                alias,
                span,
            } => self.derived(
                "isnull",
                source,
                column,
                alias,
                *span,
                format!("{}_isnull", column.name),
                DataType::Boolean,
            ),
            Statement::Notnull {
                source,
                column,
                alias,
                span,
            } => self.derived(
                "notnull",
                source,
                column,
                alias,
                *span,
                format!("{}_notnull", column.name),
                DataType::Boolean,
            ),
            Statement::CountNa { source, .. } => self.resolve(source).map(|_| ()),
            Statement::FillForward {
                source,
                column,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                if let Some(column) = column {
                    self.check_column(source, &schema, column)?;
                }
                self.register(
                    alias,
                    schema,
                    format!("fill_forward from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::FillBackward {
                source,
                column,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                if let Some(column) = column {
                    self.check_column(source, &schema, column)?;
                }
                self.register(
                    alias,
                    schema,
                    format!("fill_backward from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::FillMean {
                source,
                column,
                alias,
                span,
            } => self.in_place("fill_mean", source, column, alias, *span),
            Statement::FillMedian {
                source,
                column,
                alias,
                span,
            } => self.in_place("fill_median", source, column, alias, *span),
            Statement::FillMode {
                source,
                column,
                alias,
                span,
            } => self.in_place("fill_mode", source, column, alias, *span),
            Statement::Interpolate {
                source,
                column,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                if let Some(column) = column {
                    self.check_column(source, &schema, column)?;
                }
                self.register(
                    alias,
                    schema,
                    format!("interpolate from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Duplicated {
                source,
                columns,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                if let Some(columns) = columns {
                    self.check_values(source, &schema, columns, *span)?;
                }
                let schema =
                    schema.extended_with(Column::new("is_duplicate", DataType::Boolean));
                self.register(
                    alias,
                    schema,
                    format!("duplicated from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::CountDuplicates {
                source,
                columns,
                span,
            } => {
                let schema = self.resolve(source)?;
                if let Some(columns) = columns {
                    self.check_values(source, &schema, columns, *span)?;
                }
                Ok(())
            }
            Statement::DropDuplicates {
                source,
                subset,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                if let Some(subset) = subset {
                    self.check_values(source, &schema, subset, *span)?;
                }
                self.register(
                    alias,
                    schema,
                    format!("drop_duplicates from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Qcut {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "qcut",
                source,
                column,
                alias,
                *span,
                format!("{}_qcut", column.name),
                DataType::Unknown,
            ),
            Statement::Cut {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "cut",
                source,
                column,
                alias,
                *span,
                format!("{}_binned", column.name),
                DataType::Unknown,
            ),

            // -- Row and element application ---------------------------
            Statement::ApplyRow {
                source, alias, span, ..
            } => {
                let schema = self.resolve(source)?;
                let schema =
                    schema.extended_with(Column::new("applied_result", DataType::Unknown));
                self.register(
                    alias,
                    schema,
                    format!("apply_row from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::ApplyColumn {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "apply_column",
                source,
                column,
                alias,
                *span,
                format!("{}_applied", column.name),
                DataType::Unknown,
            ),
            Statement::Applymap {
                source, alias, span, ..
            } => self.passthrough("applymap", source, alias, *span),
            Statement::MapValues {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "map_values",
                source,
                column,
                alias,
                *span,
                format!("{}_mapped", column.name),
                DataType::Unknown,
            ),
            Statement::AssignConst {
                source,
                column,
                value,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                let schema = schema
                    .extended_with(Column::new(column.name.clone(), dtype_of_value(value)));
                self.register(alias, schema, format!("assign from {}", source.name), *span);
                Ok(())
            }

            // -- Inspection (display-only) -----------------------------
            Statement::Describe {
                source, columns, ..
            } => {
                let schema = self.resolve(source)?;
                if let Some(columns) = columns {
                    self.check_identifiers(source, &schema, columns)?;
                }
                Ok(())
            }
            Statement::Summary { source, .. }
            | Statement::Info { source, .. }
            | Statement::Corr { source, .. }
            | Statement::Cov { source, .. }
            | Statement::Show { source, .. } => self.resolve(source).map(|_| ()),
            Statement::Unique { source, column, .. }
            | Statement::ValueCounts { source, column, .. } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)
            }
            Statement::Compare { left, right, .. } => {
                self.resolve(left)?;
                self.resolve(right)?;
                Ok(())
            }

            // -- Statistical analysis ----------------------------------
            Statement::Outliers {
                source, columns, ..
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, columns)
            }
            Statement::Quantile { source, column, .. } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)
            }
            Statement::Normalize {
                source,
                columns,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, columns)?;
                self.register(
                    alias,
                    schema,
                    format!("normalize from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Binning {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "binning",
                source,
                column,
                alias,
                *span,
                format!("{}_binned", column.name),
                DataType::Unknown,
            ),
            Statement::Rolling {
                source,
                column,
                function,
                alias,
                span,
                ..
            } => self.derived(
                "rolling",
                source,
                column,
                alias,
                *span,
                format!("{}_rolling_{function}", column.name),
                DataType::Numeric,
            ),
            Statement::Hypothesis {
                left,
                right,
                columns,
                ..
            } => {
                let left_schema = self.resolve(left)?;
                let right_schema = self.resolve(right)?;
                self.check_identifiers(left, &left_schema, columns)?;
                self.check_identifiers(right, &right_schema, columns)?;
                Ok(())
            }

            // -- Math column transforms --------------------------------
            Statement::Round {
                source,
                column,
                alias,
                span,
                ..
            } => self.in_place("round", source, column, alias, *span),
            Statement::Abs {
                source,
                column,
                alias,
                span,
            } => self.in_place("abs", source, column, alias, *span),
            Statement::Sqrt {
                source,
                column,
                alias,
                span,
            } => self.in_place("sqrt", source, column, alias, *span),
            Statement::Power {
                source,
                column,
                alias,
                span,
                ..
            } => self.in_place("power", source, column, alias, *span),
            Statement::Log {
                source,
                column,
                alias,
                span,
                ..
            } => self.in_place("log", source, column, alias, *span),
            Statement::Ceil {
                source,
                column,
                alias,
                span,
            } => self.in_place("ceil", source, column, alias, *span),
            Statement::Floor {
                source,
                column,
                alias,
                span,
            } => self.in_place("floor", source, column, alias, *span),

            // -- String column transforms ------------------------------
            Statement::Upper {
                source,
                column,
                alias,
                span,
            } => self.in_place("upper", source, column, alias, *span),
            Statement::Lower {
                source,
                column,
                alias,
                span,
            } => self.in_place("lower", source, column, alias, *span),
            Statement::Strip {
                source,
                column,
                alias,
                span,
            } => self.in_place("strip", source, column, alias, *span),
            Statement::Lstrip {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "lstrip",
                source,
                column,
                alias,
                *span,
                format!("{}_lstripped", column.name),
                DataType::Str,
            ),
            Statement::Rstrip {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "rstrip",
                source,
                column,
                alias,
                *span,
                format!("{}_rstripped", column.name),
                DataType::Str,
            ),
            Statement::Title {
                source,
                column,
                alias,
                span,
            } => self.derived(
                "title",
                source,
                column,
                alias,
                *span,
                format!("{}_title", column.name),
                DataType::Str,
            ),
            Statement::Capitalize {
                source,
                column,
                alias,
                span,
            } => self.derived(
                "capitalize",
                source,
                column,
                alias,
                *span,
                format!("{}_capitalized", column.name),
                DataType::Str,
            ),
            Statement::Replace {
                source,
                column,
                alias,
                span,
                ..
            } => self.in_place("replace", source, column, alias, *span),
            Statement::Split {
                source,
                column,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                // Splitting expands into a variable number of part columns.
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("split from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Concat {
                source,
                columns,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_values(source, &schema, columns, *span)?;
                let schema = schema.extended_with(Column::new("concatenated", DataType::Str));
                self.register(alias, schema, format!("concat from {}", source.name), *span);
                Ok(())
            }
            Statement::Substring {
                source,
                column,
                alias,
                span,
                ..
            } => self.in_place("substring", source, column, alias, *span),
            Statement::Length {
                source,
                column,
                alias,
                span,
            } => self.derived(
                "length",
                source,
                column,
                alias,
                *span,
                format!("{}_length", column.name),
                DataType::Numeric,
            ),
            Statement::ExtractRegex {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "extract_regex",
                source,
                column,
                alias,
                *span,
                format!("{}_extracted", column.name),
                DataType::Str,
            ),
            Statement::Find {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "find",
                source,
                column,
                alias,
                *span,
                format!("{}_position", column.name),
                DataType::Numeric,
            ),

            // -- Datetime transforms -----------------------------------
            Statement::ParseDatetime {
                source,
                column,
                alias,
                span,
                ..
            } => self.retyped("parse_datetime", source, column, alias, *span, DataType::Datetime),
            Statement::Extract {
                source,
                column,
                part,
                alias,
                span,
            } => self.derived(
                "extract",
                source,
                column,
                alias,
                *span,
                format!("{}_{}", column.name, part.to_lowercase()),
                DataType::Numeric,
            ),
            Statement::ExtractYear {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_year", source, column, alias, *span, "year"),
            Statement::ExtractMonth {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_month", source, column, alias, *span, "month"),
            Statement::ExtractDay {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_day", source, column, alias, *span, "day"),
            Statement::ExtractHour {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_hour", source, column, alias, *span, "hour"),
            Statement::ExtractMinute {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_minute", source, column, alias, *span, "minute"),
            Statement::ExtractSecond {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_second", source, column, alias, *span, "second"),
            Statement::ExtractDayofweek {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_dayofweek", source, column, alias, *span, "dayofweek"),
            Statement::ExtractDayofyear {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_dayofyear", source, column, alias, *span, "dayofyear"),
            Statement::ExtractWeekofyear {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_weekofyear", source, column, alias, *span, "weekofyear"),
            Statement::ExtractQuarter {
                source,
                column,
                alias,
                span,
            } => self.date_part("extract_quarter", source, column, alias, *span, "quarter"),
            Statement::DateDiff {
                source,
                start,
                end,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, start)?;
                self.check_column(source, &schema, end)?;
                let schema = schema.extended_with(Column::new("date_diff", DataType::Numeric));
                self.register(
                    alias,
                    schema,
                    format!("date_diff from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::DateAdd {
                source,
                column,
                amount,
                unit,
                alias,
                span,
            } => self.derived(
                "date_add",
                source,
                column,
                alias,
                *span,
                format!("{}_plus_{amount}{unit}", column.name),
                DataType::Datetime,
            ),
            Statement::DateSubtract {
                source,
                column,
                amount,
                unit,
                alias,
                span,
            } => self.derived(
                "date_subtract",
                source,
                column,
                alias,
                *span,
                format!("{}_minus_{amount}{unit}", column.name),
                DataType::Datetime,
            ),
            Statement::FormatDatetime {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "format_datetime",
                source,
                column,
                alias,
                *span,
                format!("{}_formatted", column.name),
                DataType::Str,
            ),

            // -- Type conversion and encoding --------------------------
            Statement::Astype {
                source,
                column,
                dtype,
                alias,
                span,
            } => {
                let target = dtype_from_name(dtype);
                self.retyped("astype", source, column, alias, *span, target)
            }
            Statement::ToNumeric {
                source,
                column,
                alias,
                span,
                ..
            } => self.retyped("to_numeric", source, column, alias, *span, DataType::Numeric),
            Statement::OneHotEncode {
                source,
                column,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                // One dummy column appears per distinct value.
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("one_hot_encode from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::LabelEncode {
                source,
                column,
                alias,
                span,
            } => self.retyped("label_encode", source, column, alias, *span, DataType::Numeric),
            Statement::StandardScale {
                source,
                column,
                alias,
                span,
            } => self.retyped("standard_scale", source, column, alias, *span, DataType::Numeric),
            Statement::MinmaxScale {
                source,
                column,
                alias,
                span,
            } => self.retyped("minmax_scale", source, column, alias, *span, DataType::Numeric),
            Statement::RobustScale {
                source,
                column,
                alias,
                span,
            } => self.derived(
                "robust_scale",
                source,
                column,
                alias,
                *span,
                format!("{}_robust", column.name),
                DataType::Numeric,
            ),
            Statement::MaxabsScale {
                source,
                column,
                alias,
                span,
            } => self.derived(
                "maxabs_scale",
                source,
                column,
                alias,
                *span,
                format!("{}_maxabs", column.name),
                DataType::Numeric,
            ),
            Statement::OrdinalEncode {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "ordinal_encode",
                source,
                column,
                alias,
                *span,
                format!("{}_encoded", column.name),
                DataType::Numeric,
            ),
            Statement::TargetEncode {
                source,
                column,
                target,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                self.check_column_name(source, &schema, target, *span)?;
                let schema = schema.extended_with(Column::new(
                    format!("{}_target_encoded", column.name),
                    DataType::Numeric,
                ));
                self.register(
                    alias,
                    schema,
                    format!("target_encode from {}", source.name),
                    *span,
                );
                Ok(())
            }

            // -- Ordering ----------------------------------------------
            Statement::SortIndex {
                source, alias, span, ..
            } => self.passthrough("sort_index", source, alias, *span),
            Statement::Rank {
                source,
                column,
                alias,
                span,
                ..
            } => self.derived(
                "rank",
                source,
                column,
                alias,
                *span,
                format!("{}_rank", column.name),
                DataType::Numeric,
            ),

            // -- Grouped and windowed operations -----------------------
            Statement::FilterGroups {
                source,
                by,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, by)?;
                self.register(
                    alias,
                    schema,
                    format!("filter_groups from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::GroupTransform {
                source,
                by,
                column,
                function,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, by)?;
                self.check_column(source, &schema, column)?;
                let schema = schema.extended_with(Column::new(
                    format!("{}_{function}", column.name),
                    DataType::Numeric,
                ));
                self.register(
                    alias,
                    schema,
                    format!("group_transform from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::WindowRank {
                source,
                column,
                by,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                if let Some(by) = by {
                    self.check_identifiers(source, &schema, by)?;
                }
                let schema = schema.extended_with(Column::new(
                    format!("{}_rank", column.name),
                    DataType::Numeric,
                ));
                self.register(
                    alias,
                    schema,
                    format!("window_rank from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::WindowLag {
                source,
                column,
                periods,
                by,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                if let Some(by) = by {
                    self.check_identifiers(source, &schema, by)?;
                }
                let dtype = schema.dtype_of(&column.name);
                let schema = schema
                    .extended_with(Column::new(format!("{}_lag{periods}", column.name), dtype));
                self.register(
                    alias,
                    schema,
                    format!("window_lag from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::WindowLead {
                source,
                column,
                periods,
                by,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                if let Some(by) = by {
                    self.check_identifiers(source, &schema, by)?;
                }
                let dtype = schema.dtype_of(&column.name);
                let schema = schema
                    .extended_with(Column::new(format!("{}_lead{periods}", column.name), dtype));
                self.register(
                    alias,
                    schema,
                    format!("window_lead from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::RollingMean {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("rolling_mean", source, column, alias, *span, "rolling_mean"),
            Statement::RollingSum {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("rolling_sum", source, column, alias, *span, "rolling_sum"),
            Statement::RollingStd {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("rolling_std", source, column, alias, *span, "rolling_std"),
            Statement::RollingMin {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("rolling_min", source, column, alias, *span, "rolling_min"),
            Statement::RollingMax {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("rolling_max", source, column, alias, *span, "rolling_max"),
            Statement::ExpandingMean {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("expanding_mean", source, column, alias, *span, "expanding_mean"),
            Statement::ExpandingSum {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("expanding_sum", source, column, alias, *span, "expanding_sum"),
            Statement::ExpandingMin {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("expanding_min", source, column, alias, *span, "expanding_min"),
            Statement::ExpandingMax {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("expanding_max", source, column, alias, *span, "expanding_max"),
            Statement::Cumsum {
                source,
                column,
                alias,
                span,
            } => self.windowed("cumsum", source, column, alias, *span, "cumsum"),
            Statement::Cummax {
                source,
                column,
                alias,
                span,
            } => self.windowed("cummax", source, column, alias, *span, "cummax"),
            Statement::Cummin {
                source,
                column,
                alias,
                span,
            } => self.windowed("cummin", source, column, alias, *span, "cummin"),
            Statement::Cumprod {
                source,
                column,
                alias,
                span,
            } => self.windowed("cumprod", source, column, alias, *span, "cumprod"),
            Statement::PctChange {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("pct_change", source, column, alias, *span, "pct_change"),
            Statement::Diff {
                source,
                column,
                alias,
                span,
                ..
            } => self.windowed("diff", source, column, alias, *span, "diff"),
            Statement::Shift {
                source,
                column,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                let dtype = schema.dtype_of(&column.name);
                let schema = schema
                    .extended_with(Column::new(format!("{}_shifted", column.name), dtype));
                self.register(alias, schema, format!("shift from {}", source.name), *span);
                Ok(())
            }
            Statement::Resample {
                source,
                column,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("resample from {}", source.name),
                    *span,
                );
                Ok(())
            }

            // -- Reshaping ---------------------------------------------
            Statement::Pivot {
                source,
                index,
                columns,
                values,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_column_name(source, &schema, index, *span)?;
                self.check_column_name(source, &schema, columns, *span)?;
                self.check_column_name(source, &schema, values, *span)?;
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("pivot from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::PivotTable {
                source,
                index,
                columns,
                values,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column_name(source, &schema, index, *span)?;
                self.check_column_name(source, &schema, columns, *span)?;
                self.check_column_name(source, &schema, values, *span)?;
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("pivot_table from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Melt {
                source,
                id_vars,
                value_vars,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_values(source, &schema, id_vars, *span)?;
                if let Some(value_vars) = value_vars {
                    self.check_values(source, &schema, value_vars, *span)?;
                }
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("melt from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Stack {
                source, alias, span, ..
            } => self.obscured("stack", source, alias, *span),
            Statement::Unstack {
                source, alias, span, ..
            } => self.obscured("unstack", source, alias, *span),
            Statement::Transpose { source, alias, span } => {
                self.obscured("transpose", source, alias, *span)
            }
            Statement::Crosstab {
                source,
                rows,
                columns,
                values,
                alias,
                span,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column_name(source, &schema, rows, *span)?;
                self.check_column_name(source, &schema, columns, *span)?;
                if let Some(values) = values {
                    self.check_column_name(source, &schema, values, *span)?;
                }
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("crosstab from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::Explode {
                source,
                column,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                self.register(alias, schema, format!("explode from {}", source.name), *span);
                Ok(())
            }

            // -- Combining datasets ------------------------------------
            Statement::Merge {
                left,
                right,
                on,
                left_on,
                right_on,
                alias,
                span,
                ..
            } => {
                let left_schema = self.resolve(left)?;
                let right_schema = self.resolve(right)?;
                if let Some(on) = on {
                    self.check_column_name(left, &left_schema, on, *span)?;
                    self.check_column_name(right, &right_schema, on, *span)?;
                }
                if let Some(left_on) = left_on {
                    self.check_column_name(left, &left_schema, left_on, *span)?;
                }
                if let Some(right_on) = right_on {
                    self.check_column_name(right, &right_schema, right_on, *span)?;
                }
                self.register(
                    alias,
                    Schema::Unknown,
                    format!("merge {} with {}", left.name, right.name),
                    *span,
                );
                Ok(())
            }
            Statement::ConcatVertical {
                sources,
                alias,
                span,
                ..
            } => self.concatenated("concat_vertical", sources, alias, *span),
            Statement::ConcatHorizontal {
                sources,
                alias,
                span,
                ..
            } => self.concatenated("concat_horizontal", sources, alias, *span),
            Statement::Union {
                left,
                right,
                alias,
                span,
            } => self.combined("union", left, right, alias, *span),
            Statement::Intersection {
                left,
                right,
                alias,
                span,
            } => self.combined("intersection", left, right, alias, *span),
            Statement::Difference {
                left,
                right,
                alias,
                span,
            } => self.combined("difference", left, right, alias, *span),
            Statement::Append {
                left,
                right,
                alias,
                span,
            } => self.combined("append", left, right, alias, *span),
            Statement::CrossJoin {
                left,
                right,
                alias,
                span,
            } => self.combined("cross_join", left, right, alias, *span),

            // -- Index operations --------------------------------------
            Statement::SetIndex {
                source,
                column,
                drop,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)?;
                let schema = if *drop {
                    schema.without(&[column.name.as_str()])
                } else {
                    schema
                };
                self.register(
                    alias,
                    schema,
                    format!("set_index from {}", source.name),
                    *span,
                );
                Ok(())
            }
            Statement::ResetIndex {
                source, alias, span, ..
            } => self.passthrough("reset_index", source, alias, *span),
            Statement::Reindex {
                source, alias, span, ..
            } => self.passthrough("reindex", source, alias, *span),
            Statement::SetMultiindex {
                source,
                columns,
                alias,
                span,
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, columns)?;
                let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
                self.register(
                    alias,
                    schema.without(&names),
                    format!("set_multiindex from {}", source.name),
                    *span,
                );
                Ok(())
            }

            // -- Validation (display-only) -----------------------------
            Statement::AssertUnique { source, column, .. }
            | Statement::AssertNoNulls { source, column, .. }
            | Statement::AssertRange { source, column, .. }
            | Statement::Any { source, column, .. }
            | Statement::All { source, column, .. }
            | Statement::CountTrue { source, column, .. } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, column)
            }

            // -- Visualization (display-only) --------------------------
            Statement::Boxplot {
                source,
                columns,
                by,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, columns)?;
                if let Some(by) = by {
                    self.check_column(source, &schema, by)?;
                }
                Ok(())
            }
            Statement::Heatmap { source, columns, .. }
            | Statement::Pairplot { source, columns, .. } => {
                let schema = self.resolve(source)?;
                self.check_identifiers(source, &schema, columns)
            }
            Statement::Timeseries { source, x, y, .. } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, x)?;
                self.check_column(source, &schema, y)?;
                Ok(())
            }
            Statement::Pie {
                source,
                values,
                labels,
                ..
            } => {
                let schema = self.resolve(source)?;
                self.check_column(source, &schema, values)?;
                self.check_column(source, &schema, labels)?;
                Ok(())
            }
        }
    }

    /// Looks up a dataset reference, returning its schema, or the
    /// undefined-dataset diagnostic with hint and suggestion.
    fn resolve(&self, dataset: &Identifier) -> Result<Schema, Diagnostic> {
        if let Some(info) = self.symbols.lookup(&dataset.name) {
            return Ok(info.schema.clone());
        }
        let message = format!("Dataset '{}' has not been loaded or created", dataset.name);
        let hint = if self.symbols.is_empty() {
            EcoString::from("No datasets have been loaded yet")
        } else {
            let names: Vec<&str> = self.symbols.names().collect();
            EcoString::from(format!("Available datasets: {}", names.join(", ")))
        };
        let mut diagnostic = Diagnostic::semantic(message, dataset.span).with_hint(hint);
        if let Some(suggestion) = string_utils::closest_match(&dataset.name, self.symbols.names())
        {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }
        Err(diagnostic)
    }

    fn check_column(
        &self,
        dataset: &Identifier,
        schema: &Schema,
        column: &Identifier,
    ) -> Result<(), Diagnostic> {
        self.check_column_name(dataset, schema, &column.name, column.span)
    }

    /// Column existence check by name, for references that carry no span of
    /// their own (string parameters); silent unless `check_columns` is on
    /// and the schema is known.
    fn check_column_name(
        &self,
        dataset: &Identifier,
        schema: &Schema,
        name: &str,
        at: Span,
    ) -> Result<(), Diagnostic> {
        if !self.options.check_columns {
            return Ok(());
        }
        let Some(columns) = schema.columns() else {
            return Ok(());
        };
        if columns.iter().any(|c| c.name == name) {
            return Ok(());
        }
        let available: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        let message = format!("Column '{name}' does not exist in dataset '{}'", dataset.name);
        let hint = format!(
            "Available columns in '{}': {}",
            dataset.name,
            available.join(", ")
        );
        let mut diagnostic = Diagnostic::semantic(message, at).with_hint(hint);
        if let Some(suggestion) = string_utils::closest_match(name, available.iter().copied()) {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }
        Err(diagnostic)
    }

    fn check_identifiers(
        &self,
        dataset: &Identifier,
        schema: &Schema,
        columns: &[Identifier],
    ) -> Result<(), Diagnostic> {
        for column in columns {
            self.check_column(dataset, schema, column)?;
        }
        Ok(())
    }

    /// Checks list parameters whose entries name columns; non-name entries
    /// (numbers, nested lists) are ignored.
    fn check_values(
        &self,
        dataset: &Identifier,
        schema: &Schema,
        values: &[Value],
        at: Span,
    ) -> Result<(), Diagnostic> {
        for name in values.iter().filter_map(value_as_column) {
            self.check_column_name(dataset, schema, name, at)?;
        }
        Ok(())
    }

    /// Registers the statement result under its alias; display-only
    /// statements (no alias) register nothing.
    fn register(
        &mut self,
        alias: &Option<Identifier>,
        schema: Schema,
        provenance: impl Into<EcoString>,
        span: Span,
    ) {
        if let Some(alias) = alias {
            self.symbols
                .define(alias.name.clone(), DatasetInfo::new(schema, provenance, span));
        }
    }

    /// Row-level operation: the result keeps the source layout.
    fn passthrough(
        &mut self,
        verb: &str,
        source: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
    ) -> Result<(), Diagnostic> {
        let schema = self.resolve(source)?;
        self.register(alias, schema, format!("{verb} from {}", source.name), span);
        Ok(())
    }

    /// Row filter parameterised on one column.
    fn filtered(
        &mut self,
        verb: &str,
        source: &Identifier,
        column: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
    ) -> Result<(), Diagnostic> {
        let schema = self.resolve(source)?;
        self.check_column(source, &schema, column)?;
        self.register(alias, schema, format!("{verb} from {}", source.name), span);
        Ok(())
    }

    /// Transform that rewrites one column in place without changing its type.
    fn in_place(
        &mut self,
        verb: &str,
        source: &Identifier,
        column: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
    ) -> Result<(), Diagnostic> {
        self.filtered(verb, source, column, alias, span)
    }

    /// Transform that rewrites one column in place, changing its type.
    fn retyped(
        &mut self,
        verb: &str,
        source: &Identifier,
        column: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
        dtype: DataType,
    ) -> Result<(), Diagnostic> {
        let schema = self.resolve(source)?;
        self.check_column(source, &schema, column)?;
        let schema = schema.extended_with(Column::new(column.name.clone(), dtype));
        self.register(alias, schema, format!("{verb} from {}", source.name), span);
        Ok(())
    }

    /// Transform that appends one derived column.
    #[allow(clippy::too_many_arguments)]
    fn derived(
        &mut self,
        verb: &str,
        source: &Identifier,
        column: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
        derived_name: String,
        dtype: DataType,
    ) -> Result<(), Diagnostic> {
        let schema = self.resolve(source)?;
        self.check_column(source, &schema, column)?;
        let schema = schema.extended_with(Column::new(derived_name, dtype));
        self.register(alias, schema, format!("{verb} from {}", source.name), span);
        Ok(())
    }

    /// Datetime component extraction: appends `<column>_<part>`.
    fn date_part(
        &mut self,
        verb: &str,
        source: &Identifier,
        column: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
        part: &str,
    ) -> Result<(), Diagnostic> {
        self.derived(
            verb,
            source,
            column,
            alias,
            span,
            format!("{}_{part}", column.name),
            DataType::Numeric,
        )
    }

    /// Windowed or cumulative numeric derivation: appends `<column>_<suffix>`.
    fn windowed(
        &mut self,
        verb: &str,
        source: &Identifier,
        column: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
        suffix: &str,
    ) -> Result<(), Diagnostic> {
        self.derived(
            verb,
            source,
            column,
            alias,
            span,
            format!("{}_{suffix}", column.name),
            DataType::Numeric,
        )
    }

    /// Operation that loses column tracking (reshapes, type projections).
    fn obscured(
        &mut self,
        verb: &str,
        source: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
    ) -> Result<(), Diagnostic> {
        self.resolve(source)?;
        self.register(
            alias,
            Schema::Unknown,
            format!("{verb} from {}", source.name),
            span,
        );
        Ok(())
    }

    /// Two-dataset combination; the merged layout is not tracked.
    fn combined(
        &mut self,
        verb: &str,
        left: &Identifier,
        right: &Identifier,
        alias: &Option<Identifier>,
        span: Span,
    ) -> Result<(), Diagnostic> {
        self.resolve(left)?;
        self.resolve(right)?;
        self.register(
            alias,
            Schema::Unknown,
            format!("{verb} {}, {}", left.name, right.name),
            span,
        );
        Ok(())
    }

    /// N-ary concatenation; every source must be defined.
    fn concatenated(
        &mut self,
        verb: &str,
        sources: &[Identifier],
        alias: &Option<Identifier>,
        span: Span,
    ) -> Result<(), Diagnostic> {
        for source in sources {
            self.resolve(source)?;
        }
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        self.register(
            alias,
            Schema::Unknown,
            format!("{verb} {}", names.join(", ")),
            span,
        );
        Ok(())
    }

    /// Column checks for `apply`/`map` transform expressions. The name `x`
    /// is the element placeholder, not a column.
    fn check_transform_columns(
        &self,
        dataset: &Identifier,
        schema: &Schema,
        expr: &Expr,
    ) -> Result<(), Diagnostic> {
        let mut referenced = Vec::new();
        expr_columns(expr, &mut referenced);
        for column in referenced {
            if column.name == "x" {
                continue;
            }
            self.check_column(dataset, schema, column)?;
        }
        Ok(())
    }
}

/// Collects every column identifier referenced by a condition.
fn condition_columns<'c>(condition: &'c Condition, out: &mut Vec<&'c Identifier>) {
    match condition {
        Condition::Or(left, right) | Condition::And(left, right) => {
            condition_columns(left, out);
            condition_columns(right, out);
        }
        Condition::Not(inner) => condition_columns(inner, out),
        Condition::Comparison { column, .. }
        | Condition::Between { column, .. }
        | Condition::In { column, .. }
        | Condition::StringMatch { column, .. }
        | Condition::IsNull { column, .. } => out.push(column),
    }
}

/// Collects column references from a transform expression. Call names are
/// functions, not columns, so only their arguments are walked.
fn expr_columns<'e>(expr: &'e Expr, out: &mut Vec<&'e Identifier>) {
    match expr {
        Expr::Literal(..) => {}
        Expr::Column(identifier) => out.push(identifier),
        Expr::Unary { operand, .. } => expr_columns(operand, out),
        Expr::Binary { left, right, .. } => {
            expr_columns(left, out);
            expr_columns(right, out);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                expr_columns(arg, out);
            }
        }
        Expr::Conditional {
            value,
            condition,
            otherwise,
            ..
        } => {
            expr_columns(value, out);
            expr_columns(condition, out);
            expr_columns(otherwise, out);
        }
    }
}

/// A list entry that names a column, if it does.
fn value_as_column(value: &Value) -> Option<&str> {
    match value {
        Value::Str(name) | Value::Ident(name) => Some(name),
        _ => None,
    }
}

fn dtype_of_value(value: &Value) -> DataType {
    match value {
        Value::Str(_) => DataType::Str,
        Value::Int(_) | Value::Float(_) => DataType::Numeric,
        Value::Bool(_) => DataType::Boolean,
        Value::Null | Value::List(_) | Value::Dict(_) | Value::Ident(_) => DataType::Unknown,
    }
}

fn dtype_from_name(name: &str) -> DataType {
    match name {
        "int" | "int32" | "int64" | "float" | "float32" | "float64" => DataType::Numeric,
        "str" | "string" | "object" => DataType::Str,
        "bool" | "boolean" => DataType::Boolean,
        "datetime" | "datetime64" | "datetime64[ns]" => DataType::Datetime,
        _ => DataType::Unknown,
    }
}

/// Result layout of a groupby: the group keys followed by one column per
/// aggregation. Pandas flattens `agg` output grouped by source column in
/// first-seen order, so `{sum: quantity, mean: price, max: quantity}` comes
/// out as `quantity_sum, quantity_max, price_mean`.
fn groupby_schema(schema: &Schema, by: &[Identifier], aggregations: &[Aggregation]) -> Schema {
    let mut columns: Vec<Column> = by
        .iter()
        .map(|key| Column::new(key.name.clone(), schema.dtype_of(&key.name)))
        .collect();
    if aggregations.is_empty() {
        // Natural syntax counts group sizes.
        columns.push(Column::new("count", DataType::Numeric));
        return Schema::Known(columns);
    }
    let mut sources: Vec<&str> = Vec::new();
    for aggregation in aggregations {
        if !sources.contains(&aggregation.column.name.as_str()) {
            sources.push(aggregation.column.name.as_str());
        }
    }
    for source in sources {
        for aggregation in aggregations.iter().filter(|a| a.column.name == source) {
            let func = aggregation.pandas_func();
            let dtype = match func {
                "min" | "max" | "first" | "last" => schema.dtype_of(source),
                _ => DataType::Numeric,
            };
            columns.push(Column::new(format!("{source}_{func}"), dtype));
        }
    }
    Schema::Known(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{parse, tokenize};

    fn analyze_source(source: &str) -> Analysis {
        analyze_with(source, &AnalyzeOptions::default(), None)
    }

    fn analyze_with(
        source: &str,
        options: &AnalyzeOptions,
        introspector: Option<&dyn SchemaIntrospector>,
    ) -> Analysis {
        let tokens = tokenize(source).expect("source should lex");
        let statements = parse(tokens).expect("source should parse");
        analyze(&statements, options, introspector)
    }

    /// Fixed schemas for the test datasets; no filesystem involved.
    struct FixtureIntrospector;

    impl SchemaIntrospector for FixtureIntrospector {
        fn columns(&self, path: &Utf8Path, _format: FileFormat) -> Option<Vec<Column>> {
            match path.as_str() {
                "sales.csv" => Some(vec![
                    Column::new("category", DataType::Str),
                    Column::new("quantity", DataType::Numeric),
                    Column::new("price", DataType::Numeric),
                ]),
                "orders.csv" => Some(vec![
                    Column::new("id", DataType::Numeric),
                    Column::new("region", DataType::Str),
                ]),
                _ => None,
            }
        }
    }

    fn checked() -> AnalyzeOptions {
        AnalyzeOptions {
            check_columns: true,
        }
    }

    fn schema_names(analysis: &Analysis, alias: &str) -> Vec<String> {
        analysis
            .symbols
            .lookup(alias)
            .expect("alias should be registered")
            .schema
            .columns()
            .expect("schema should be known")
            .iter()
            .map(|c| c.name.to_string())
            .collect()
    }

    #[test]
    fn loaded_datasets_can_be_referenced() {
        let analysis = analyze_source("load \"sales.csv\" as sales\nshow sales");
        assert!(analysis.is_valid());
        assert!(analysis.symbols.contains("sales"));
    }

    #[test]
    fn undefined_dataset_is_reported_with_hint() {
        let analysis = analyze_source("show sales");
        assert_eq!(analysis.diagnostics.len(), 1);
        let diagnostic = &analysis.diagnostics[0];
        assert_eq!(
            diagnostic.message,
            "Dataset 'sales' has not been loaded or created"
        );
        assert_eq!(
            diagnostic.hint.as_deref(),
            Some("No datasets have been loaded yet")
        );
        assert_eq!(diagnostic.suggestion, None);
    }

    #[test]
    fn hint_lists_datasets_in_registration_order() {
        let analysis = analyze_source(
            "load \"sales.csv\" as sales\nload \"orders.csv\" as orders\nshow salez",
        );
        assert_eq!(analysis.diagnostics.len(), 1);
        let diagnostic = &analysis.diagnostics[0];
        assert_eq!(
            diagnostic.hint.as_deref(),
            Some("Available datasets: sales, orders")
        );
        assert_eq!(diagnostic.suggestion.as_deref(), Some("sales"));
    }

    #[test]
    fn every_bad_reference_gets_its_own_diagnostic() {
        let analysis = analyze_source("head sals\nhead sals");
        assert_eq!(analysis.diagnostics.len(), 2);
    }

    #[test]
    fn failed_statement_registers_nothing() {
        // `filtered` never comes into existence, so the second statement
        // reports it as undefined rather than cascading silently.
        let analysis = analyze_source("filter sals where price > 10 as filtered\nshow filtered");
        assert_eq!(analysis.diagnostics.len(), 2);
        assert_eq!(
            analysis.diagnostics[0].message,
            "Dataset 'sals' has not been loaded or created"
        );
        assert_eq!(
            analysis.diagnostics[1].message,
            "Dataset 'filtered' has not been loaded or created"
        );
        assert!(analysis.symbols.is_empty());
    }

    #[test]
    fn display_statements_register_nothing() {
        let analysis = analyze_source("load \"sales.csv\" as sales\nhead sales");
        assert!(analysis.is_valid());
        assert_eq!(analysis.symbols.len(), 1);
    }

    #[test]
    fn column_checks_are_off_by_default() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\nselect sales {serial}",
            &AnalyzeOptions::default(),
            Some(&FixtureIntrospector),
        );
        assert!(analysis.is_valid());
    }

    #[test]
    fn missing_column_is_reported_when_checks_are_on() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\nselect sales {pric}",
            &checked(),
            Some(&FixtureIntrospector),
        );
        assert_eq!(analysis.diagnostics.len(), 1);
        let diagnostic = &analysis.diagnostics[0];
        assert_eq!(
            diagnostic.message,
            "Column 'pric' does not exist in dataset 'sales'"
        );
        assert_eq!(
            diagnostic.hint.as_deref(),
            Some("Available columns in 'sales': category, quantity, price")
        );
        assert_eq!(diagnostic.suggestion.as_deref(), Some("price"));
    }

    #[test]
    fn unknown_schemas_suppress_column_checks() {
        // No introspector, so the load tracks an unknown schema.
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\nselect sales {whatever}",
            &checked(),
            None,
        );
        assert!(analysis.is_valid());
    }

    #[test]
    fn first_failing_check_wins_within_a_statement() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\nselect sales {bogus_one, bogus_two}",
            &checked(),
            Some(&FixtureIntrospector),
        );
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(
            analysis.diagnostics[0].message,
            "Column 'bogus_one' does not exist in dataset 'sales'"
        );
    }

    #[test]
    fn select_narrows_the_schema_in_listed_order() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\nselect sales {price, category} as slim",
            &AnalyzeOptions::default(),
            Some(&FixtureIntrospector),
        );
        assert!(analysis.is_valid());
        assert_eq!(schema_names(&analysis, "slim"), ["price", "category"]);
    }

    #[test]
    fn groupby_derives_key_and_aggregate_columns() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\n\
             groupby sales by {category} compute {sum: quantity, mean: price} as report",
            &AnalyzeOptions::default(),
            Some(&FixtureIntrospector),
        );
        assert!(analysis.is_valid());
        assert_eq!(
            schema_names(&analysis, "report"),
            ["category", "quantity_sum", "price_mean"]
        );
    }

    #[test]
    fn derived_columns_are_appended() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\nrank sales column price as ranked",
            &AnalyzeOptions::default(),
            Some(&FixtureIntrospector),
        );
        assert!(analysis.is_valid());
        assert_eq!(
            schema_names(&analysis, "ranked"),
            ["category", "quantity", "price", "price_rank"]
        );
    }

    #[test]
    fn redefinition_updates_provenance_in_place() {
        let analysis = analyze_source(
            "load \"sales.csv\" as sales\nfilter sales where price > 10 as sales",
        );
        assert!(analysis.is_valid());
        assert_eq!(analysis.symbols.len(), 1);
        let info = analysis.symbols.lookup("sales").unwrap();
        assert_eq!(info.provenance, "filter from sales");
    }

    #[test]
    fn merge_checks_keys_on_both_sides() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\n\
             load \"orders.csv\" as orders\n\
             merge sales with orders on=\"quantity\" as joined",
            &checked(),
            Some(&FixtureIntrospector),
        );
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(
            analysis.diagnostics[0].message,
            "Column 'quantity' does not exist in dataset 'orders'"
        );
        assert!(!analysis.symbols.contains("joined"));
    }

    #[test]
    fn drop_removes_columns_from_the_schema() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\ndrop sales columns {quantity} as slim",
            &AnalyzeOptions::default(),
            Some(&FixtureIntrospector),
        );
        assert!(analysis.is_valid());
        assert_eq!(schema_names(&analysis, "slim"), ["category", "price"]);
    }

    #[test]
    fn reshapes_lose_column_tracking() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\n\
             pivot sales index=\"category\" columns=\"quantity\" values=\"price\" as wide\n\
             select wide {anything} as out",
            &checked(),
            Some(&FixtureIntrospector),
        );
        // The pivot result has an unknown schema, so the select passes.
        assert!(analysis.is_valid());
        let wide = analysis.symbols.lookup("wide").unwrap();
        assert_eq!(wide.schema, Schema::Unknown);
    }

    #[test]
    fn transform_placeholder_is_not_a_column() {
        let analysis = analyze_with(
            "load \"sales.csv\" as sales\napply sales column price with transform x * 2 as scaled",
            &checked(),
            Some(&FixtureIntrospector),
        );
        assert!(analysis.is_valid());
        assert_eq!(
            schema_names(&analysis, "scaled"),
            ["category", "quantity", "price", "price_transformed"]
        );
    }
}
