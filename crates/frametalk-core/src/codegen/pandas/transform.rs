// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Column transforms: math, string, datetime, type conversion, encoding,
//! and scaling.
//!
//! Derived column names here must stay in sync with the schemas the
//! analyzer registers for the same statements; both sides spell the names
//! out rather than share a table, so a rename needs both edits.

use ecow::EcoString;

use crate::ast::{Identifier, Value};
use crate::codegen::{Generator, Result, py_float, py_str, py_value_list};

impl Generator<'_> {
    // ------------------------------------------------------------------
    // Statistical transforms
    // ------------------------------------------------------------------

    pub(crate) fn normalize(
        &mut self,
        source: &Identifier,
        columns: &[Identifier],
        method: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let scaler = if method == "zscore" {
            "StandardScaler"
        } else {
            "MinMaxScaler"
        };
        self.import_line(&format!("from sklearn.preprocessing import {scaler}"));
        let tmp = self.temp();
        let cols = crate::codegen::py_name_list(columns);
        let count = columns.len();
        let method = method.clone();
        self.copy_mutate(
            &src,
            alias,
            "Normalized Result",
            |target| {
                vec![
                    format!("{tmp} = {scaler}()"),
                    format!("{target}[{cols}] = {tmp}.fit_transform({target}[{cols}])"),
                ]
            },
            |_| format!("print(f'Normalized {count} columns using {method}')"),
        );
        Ok(())
    }

    pub(crate) fn binning(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        bins: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Binned Result",
            |target| {
                vec![format!(
                    "{target}['{name}_binned'] = pd.cut({target}['{name}'], bins={bins})"
                )]
            },
            |_| format!("print(f'Binned column {name} into {bins} bins')"),
        );
        Ok(())
    }

    pub(crate) fn rolling(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        window: i64,
        function: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let function = function.clone();
        self.copy_mutate(
            &src,
            alias,
            "Rolling Result",
            |target| {
                vec![format!(
                    "{target}['{name}_rolling_{function}'] = {target}['{name}'].rolling(window={window}).{function}()"
                )]
            },
            |_| format!("print(f'Computed rolling {function} over window of {window}')"),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Math transforms (in place on a copy)
    // ------------------------------------------------------------------

    pub(crate) fn round(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        decimals: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Rounded Result",
            |target| vec![format!("{target}['{name}'] = {target}['{name}'].round({decimals})")],
            |_| format!("print(f'Rounded {name} to {decimals} decimals')"),
        );
        Ok(())
    }

    pub(crate) fn abs(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Absolute Value Result",
            |target| vec![format!("{target}['{name}'] = {target}['{name}'].abs()")],
            |_| format!("print(f'Applied absolute value to {name}')"),
        );
        Ok(())
    }

    pub(crate) fn sqrt(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        self.numpy_unary(source, column, "sqrt", "Square Root Result", alias)
    }

    pub(crate) fn ceil(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        self.numpy_unary(source, column, "ceil", "Ceiling Result", alias)
    }

    pub(crate) fn floor(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        self.numpy_unary(source, column, "floor", "Floor Result", alias)
    }

    fn numpy_unary(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        func: &str,
        heading: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("import numpy as np");
        let name = column.name.clone();
        let func = func.to_string();
        self.copy_mutate(
            &src,
            alias,
            heading,
            |target| vec![format!("{target}['{name}'] = np.{func}({target}['{name}'])")],
            |_| format!("print(f'Applied {func} to {name}')"),
        );
        Ok(())
    }

    pub(crate) fn power(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        exponent: f64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let exponent = py_float(exponent);
        self.copy_mutate(
            &src,
            alias,
            "Power Result",
            |target| vec![format!("{target}['{name}'] = {target}['{name}'] ** {exponent}")],
            |_| format!("print(f'Raised {name} to power {exponent}')"),
        );
        Ok(())
    }

    pub(crate) fn log(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        base: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("import numpy as np");
        let name = column.name.clone();
        let base = base.clone();
        self.copy_mutate(
            &src,
            alias,
            "Log Result",
            |target| {
                let expr = match base.as_str() {
                    "e" => format!("np.log({target}['{name}'])"),
                    "2" => format!("np.log2({target}['{name}'])"),
                    "10" => format!("np.log10({target}['{name}'])"),
                    other => format!("np.log({target}['{name}']) / np.log({other})"),
                };
                vec![format!("{target}['{name}'] = {expr}")]
            },
            |_| format!("print(f'Applied log base {base} to {name}')"),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // String transforms
    // ------------------------------------------------------------------

    pub(crate) fn upper(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        self.string_in_place(source, column, "upper", "Uppercase Result", alias)
    }

    pub(crate) fn lower(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        self.string_in_place(source, column, "lower", "Lowercase Result", alias)
    }

    pub(crate) fn strip(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        self.string_in_place(source, column, "strip", "Stripped Result", alias)
    }

    fn string_in_place(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        method: &str,
        heading: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let method = method.to_string();
        self.copy_mutate(
            &src,
            alias,
            heading,
            |target| {
                vec![format!(
                    "{target}['{name}'] = {target}['{name}'].str.{method}()"
                )]
            },
            |_| format!("print(f'Applied {method} to {name}')"),
        );
        Ok(())
    }

    pub(crate) fn side_strip(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        chars: Option<&EcoString>,
        method: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let suffix = if method == "lstrip" {
            "lstripped"
        } else {
            "rstripped"
        };
        let args = chars.map_or_else(String::new, |c| py_str(c));
        let method = method.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Stripped Result",
            |target| {
                vec![format!(
                    "{target}['{name}_{suffix}'] = {target}['{name}'].str.{method}({args})"
                )]
            },
            |_| format!("print(f'Applied {method} to {name}')"),
        );
        Ok(())
    }

    pub(crate) fn title_case(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Title Case Result",
            |target| {
                vec![format!(
                    "{target}['{name}_title'] = {target}['{name}'].str.title()"
                )]
            },
            |_| format!("print(f'Applied title case to {name}')"),
        );
        Ok(())
    }

    pub(crate) fn capitalize(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Capitalized Result",
            |target| {
                vec![format!(
                    "{target}['{name}_capitalized'] = {target}['{name}'].str.capitalize()"
                )]
            },
            |_| format!("print(f'Capitalized {name}')"),
        );
        Ok(())
    }

    pub(crate) fn replace(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        old: &EcoString,
        new: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let old_lit = py_str(old);
        let new_lit = py_str(new);
        let old = old.clone();
        let new = new.clone();
        self.copy_mutate(
            &src,
            alias,
            "Replaced Result",
            |target| {
                vec![format!(
                    "{target}['{name}'] = {target}['{name}'].str.replace({old_lit}, {new_lit})"
                )]
            },
            |_| format!("print(f'Replaced \"{old}\" with \"{new}\" in {name}')"),
        );
        Ok(())
    }

    pub(crate) fn split(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        delimiter: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let delimiter = py_str(delimiter);
        let parts = self.temp();
        self.copy_mutate(
            &src,
            alias,
            "Split Result",
            |target| {
                vec![
                    format!(
                        "{parts} = {target}['{name}'].str.split({delimiter}, expand=True)"
                    ),
                    format!("{parts}.columns = [f'{name}_part{{i}}' for i in {parts}.columns]"),
                    format!("{target} = pd.concat([{target}, {parts}], axis=1)"),
                ]
            },
            |_| format!("print(f'Split {name} into part columns')"),
        );
        Ok(())
    }

    pub(crate) fn concat_columns(
        &mut self,
        source: &Identifier,
        columns: &[Value],
        separator: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let cols = py_value_list(columns);
        let separator = py_str(separator);
        let count = columns.len();
        self.copy_mutate(
            &src,
            alias,
            "Concatenated Columns Result",
            |target| {
                vec![format!(
                    "{target}['concatenated'] = {target}[{cols}].astype(str).agg({separator}.join, axis=1)"
                )]
            },
            |_| format!("print(f'Concatenated {count} columns')"),
        );
        Ok(())
    }

    pub(crate) fn substring(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        start: i64,
        end: Option<i64>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let args = match end {
            Some(end) => format!("{start}, {end}"),
            None => start.to_string(),
        };
        self.copy_mutate(
            &src,
            alias,
            "Substring Result",
            |target| {
                vec![format!(
                    "{target}['{name}'] = {target}['{name}'].str.slice({args})"
                )]
            },
            |_| format!("print(f'Extracted substring from {name}')"),
        );
        Ok(())
    }

    pub(crate) fn length(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Length Result",
            |target| {
                vec![format!(
                    "{target}['{name}_length'] = {target}['{name}'].str.len()"
                )]
            },
            |_| format!("print(f'Computed length of {name}')"),
        );
        Ok(())
    }

    pub(crate) fn extract_regex(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        pattern: &EcoString,
        group: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let pattern = py_str(pattern);
        self.copy_mutate(
            &src,
            alias,
            "Regex Extract Result",
            |target| {
                vec![format!(
                    "{target}['{name}_extracted'] = {target}['{name}'].str.extract({pattern})[{group}]"
                )]
            },
            |_| format!("print(f'Extracted regex group {group} from {name}')"),
        );
        Ok(())
    }

    pub(crate) fn find(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        substring: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let needle = py_str(substring);
        let substring = substring.clone();
        self.copy_mutate(
            &src,
            alias,
            "Find Result",
            |target| {
                vec![format!(
                    "{target}['{name}_position'] = {target}['{name}'].str.find({needle})"
                )]
            },
            |_| format!("print(f'Found position of \"{substring}\" in {name}')"),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Datetime transforms
    // ------------------------------------------------------------------

    pub(crate) fn parse_datetime(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        format: Option<&EcoString>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let args = format.map_or_else(String::new, |f| format!(", format={}", py_str(f)));
        self.copy_mutate(
            &src,
            alias,
            "Parsed Datetime Result",
            |target| {
                vec![format!(
                    "{target}['{name}'] = pd.to_datetime({target}['{name}']{args})"
                )]
            },
            |_| format!("print(f'Parsed {name} as datetime')"),
        );
        Ok(())
    }

    /// `part` is one of the pandas `.dt` accessors; week-of-year moved to
    /// the ISO calendar in pandas 1.1 and needs the long spelling.
    pub(crate) fn extract_part(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        part: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let accessor = if part == "weekofyear" {
            "isocalendar().week".to_string()
        } else {
            part.to_string()
        };
        let part = part.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Extracted Part Result",
            |target| {
                vec![format!(
                    "{target}['{name}_{part}'] = {target}['{name}'].dt.{accessor}"
                )]
            },
            |_| format!("print(f'Extracted {part} from {name}')"),
        );
        Ok(())
    }

    pub(crate) fn date_diff(
        &mut self,
        source: &Identifier,
        start: &Identifier,
        end: &Identifier,
        unit: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let start = start.name.clone();
        let end = end.name.clone();
        let convert = match unit.as_str() {
            "seconds" => ".dt.total_seconds()".to_string(),
            "minutes" => ".dt.total_seconds() / 60".to_string(),
            "hours" => ".dt.total_seconds() / 3600".to_string(),
            "weeks" => ".dt.days / 7".to_string(),
            _ => ".dt.days".to_string(),
        };
        let unit = unit.clone();
        self.copy_mutate(
            &src,
            alias,
            "Date Difference Result",
            |target| {
                vec![format!(
                    "{target}['date_diff'] = ({target}['{end}'] - {target}['{start}']){convert}"
                )]
            },
            |_| format!("print(f'Computed date difference in {unit}')"),
        );
        Ok(())
    }

    pub(crate) fn date_shift(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        amount: i64,
        unit: &EcoString,
        add: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let (op, word, heading) = if add {
            ("+", "plus", "Date Add Result")
        } else {
            ("-", "minus", "Date Subtract Result")
        };
        let unit = unit.clone();
        // DateOffset takes the unit as a keyword, which also covers
        // calendar units like months that Timedelta cannot express.
        self.copy_mutate(
            &src,
            alias,
            heading,
            |target| {
                vec![format!(
                    "{target}['{name}_{word}_{amount}{unit}'] = {target}['{name}'] {op} pd.DateOffset({unit}={amount})"
                )]
            },
            |_| format!("print(f'Shifted {name} by {amount} {unit}')"),
        );
        Ok(())
    }

    pub(crate) fn format_datetime(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        format: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let format = py_str(format);
        self.copy_mutate(
            &src,
            alias,
            "Formatted Datetime Result",
            |target| {
                vec![format!(
                    "{target}['{name}_formatted'] = {target}['{name}'].dt.strftime({format})"
                )]
            },
            |_| format!("print(f'Formatted {name} as string')"),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Type conversion, encoding, scaling
    // ------------------------------------------------------------------

    pub(crate) fn astype(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        dtype: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let pandas_dtype = match dtype.as_str() {
            "int" => "int64",
            "float" => "float64",
            "str" | "string" => "str",
            "datetime" => "datetime64[ns]",
            other => other,
        }
        .to_string();
        let dtype = dtype.clone();
        self.copy_mutate(
            &src,
            alias,
            "Type Conversion Result",
            |target| {
                vec![format!(
                    "{target}['{name}'] = {target}['{name}'].astype('{pandas_dtype}')"
                )]
            },
            |_| format!("print(f'Converted {name} to {dtype}')"),
        );
        Ok(())
    }

    pub(crate) fn to_numeric(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        errors: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let errors = errors.clone();
        self.copy_mutate(
            &src,
            alias,
            "Numeric Conversion Result",
            |target| {
                vec![format!(
                    "{target}['{name}'] = pd.to_numeric({target}['{name}'], errors='{errors}')"
                )]
            },
            |_| format!("print(f'Converted {name} to numeric')"),
        );
        Ok(())
    }

    pub(crate) fn one_hot_encode(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let expr = format!("pd.get_dummies({src}, columns=['{name}'])");
        self.store_or_show(alias, "One-Hot Encoded Result", &expr, |var| {
            format!("print(f'One-hot encoded {name}: {{len({var}.columns)}} columns')")
        });
        Ok(())
    }

    pub(crate) fn label_encode(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("from sklearn.preprocessing import LabelEncoder");
        let encoder = self.temp();
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Label Encoded Result",
            |target| {
                vec![
                    format!("{encoder} = LabelEncoder()"),
                    format!("{target}['{name}'] = {encoder}.fit_transform({target}['{name}'])"),
                ]
            },
            |_| format!("print(f'Label encoded {name}')"),
        );
        Ok(())
    }

    /// Standard and min-max scaling overwrite the column.
    pub(crate) fn scale_in_place(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        scaler: &str,
        label: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line(&format!("from sklearn.preprocessing import {scaler}"));
        let tmp = self.temp();
        let name = column.name.clone();
        let scaler = scaler.to_string();
        let label = label.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Scaled Result",
            |target| {
                vec![
                    format!("{tmp} = {scaler}()"),
                    format!("{target}['{name}'] = {tmp}.fit_transform({target}[['{name}']])"),
                ]
            },
            |_| format!("print(f'{label} scaled column {name}')"),
        );
        Ok(())
    }

    /// Robust and max-abs scaling keep the original column and add a
    /// suffixed one.
    pub(crate) fn scale_derived(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        scaler: &str,
        suffix: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line(&format!("from sklearn.preprocessing import {scaler}"));
        let tmp = self.temp();
        let name = column.name.clone();
        let scaler = scaler.to_string();
        let suffix = suffix.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Scaled Result",
            |target| {
                vec![
                    format!("{tmp} = {scaler}()"),
                    format!(
                        "{target}['{name}_{suffix}'] = {tmp}.fit_transform({target}[['{name}']])"
                    ),
                ]
            },
            |_| format!("print(f'Applied {suffix} scaling to {name}')"),
        );
        Ok(())
    }

    pub(crate) fn ordinal_encode(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        order: &[Value],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let categories = py_value_list(order);
        self.copy_mutate(
            &src,
            alias,
            "Ordinal Encoded Result",
            |target| {
                vec![format!(
                    "{target}['{name}_encoded'] = pd.Categorical({target}['{name}'], categories={categories}, ordered=True).codes"
                )]
            },
            |_| format!("print(f'Ordinal encoded {name}')"),
        );
        Ok(())
    }

    pub(crate) fn target_encode(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        target_column: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let target_column = target_column.clone();
        self.copy_mutate(
            &src,
            alias,
            "Target Encoded Result",
            |target| {
                vec![format!(
                    "{target}['{name}_target_encoded'] = {target}.groupby('{name}')['{target_column}'].transform('mean')"
                )]
            },
            |_| format!("print(f'Target encoded {name} against {target_column}')"),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::codegen::generate;
    use crate::semantic_analysis::SymbolTable;
    use crate::source_analysis::{parse, tokenize};

    fn gen(source: &str) -> String {
        let statements = parse(tokenize(source).unwrap()).unwrap();
        generate(&statements, &SymbolTable::new()).unwrap()
    }

    #[test]
    fn normalize_picks_the_scaler_from_the_method() {
        let script = gen(
            "load \"s.csv\" as sales\nnormalize sales columns {price, cost} with method=\"zscore\" as scaled",
        );
        assert!(script.contains("from sklearn.preprocessing import StandardScaler"));
        assert!(script.contains("_tmp0 = StandardScaler()"));
        assert!(script.contains(
            "scaled[['price', 'cost']] = _tmp0.fit_transform(scaled[['price', 'cost']])"
        ));
        assert!(script.contains("print(f'Normalized 2 columns using zscore')"));
    }

    #[test]
    fn rolling_derives_a_suffixed_column() {
        let script = gen(
            "load \"s.csv\" as sales\nrolling sales column price with window=7 function=\"mean\" as smooth",
        );
        assert!(script.contains(
            "smooth['price_rolling_mean'] = smooth['price'].rolling(window=7).mean()"
        ));
    }

    #[test]
    fn math_transforms_overwrite_the_column() {
        let script = gen("load \"s.csv\" as sales\nsqrt sales column price as rooted");
        assert!(script.contains("import numpy as np"));
        assert!(script.contains("rooted['price'] = np.sqrt(rooted['price'])"));

        let script = gen("load \"s.csv\" as sales\nround sales column price decimals=2 as tidy");
        assert!(script.contains("tidy['price'] = tidy['price'].round(2)"));
    }

    #[test]
    fn log_base_selects_the_numpy_function() {
        let script = gen("load \"s.csv\" as sales\nlog sales column price base=10 as logged");
        assert!(script.contains("logged['price'] = np.log10(logged['price'])"));
    }

    #[test]
    fn lstrip_adds_a_derived_column() {
        let script = gen("load \"s.csv\" as sales\nlstrip sales column name as cleaned");
        assert!(script.contains("cleaned['name_lstripped'] = cleaned['name'].str.lstrip()"));
    }

    #[test]
    fn concat_joins_through_the_separator() {
        let script = gen(
            "load \"s.csv\" as sales\nconcat sales columns [first, last] separator=\" \" as named",
        );
        assert!(script.contains(
            "named['concatenated'] = named[['first', 'last']].astype(str).agg(' '.join, axis=1)"
        ));
    }

    #[test]
    fn weekofyear_goes_through_the_iso_calendar() {
        let script =
            gen("load \"s.csv\" as sales\nextract_weekofyear sales column order_date as weekly");
        assert!(script.contains(
            "weekly['order_date_weekofyear'] = weekly['order_date'].dt.isocalendar().week"
        ));
    }

    #[test]
    fn date_add_uses_a_date_offset() {
        let script = gen(
            "load \"s.csv\" as sales\ndate_add sales column order_date value=3 unit=\"days\" as shifted",
        );
        assert!(script.contains(
            "shifted['order_date_plus_3days'] = shifted['order_date'] + pd.DateOffset(days=3)"
        ));
    }

    #[test]
    fn standard_scale_overwrites_and_robust_scale_derives() {
        let script = gen("load \"s.csv\" as sales\nstandard_scale sales column price as scaled");
        assert!(script.contains("from sklearn.preprocessing import StandardScaler"));
        assert!(script.contains("scaled['price'] = _tmp0.fit_transform(scaled[['price']])"));

        let script = gen("load \"s.csv\" as sales\nrobust_scale sales column price as scaled");
        assert!(script.contains("from sklearn.preprocessing import RobustScaler"));
        assert!(script.contains("scaled['price_robust'] = _tmp0.fit_transform(scaled[['price']])"));
    }

    #[test]
    fn ordinal_encode_respects_the_given_order() {
        let script = gen(
            "load \"s.csv\" as sales\nordinal_encode sales column size order=[\"S\", \"M\", \"L\"] as encoded",
        );
        assert!(script.contains(
            "encoded['size_encoded'] = pd.Categorical(encoded['size'], categories=['S', 'M', 'L'], ordered=True).codes"
        ));
    }

    #[test]
    fn target_encode_is_a_grouped_mean() {
        let script = gen(
            "load \"s.csv\" as sales\ntarget_encode sales column region target=\"revenue\" as encoded",
        );
        assert!(script.contains(
            "encoded['region_target_encoded'] = encoded.groupby('region')['revenue'].transform('mean')"
        ));
    }
}
