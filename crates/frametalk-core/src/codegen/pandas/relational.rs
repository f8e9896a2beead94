// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! I/O, projection, filtering, ordering, grouping, cleaning, mutation, and
//! dataset combination.

use ecow::EcoString;

use crate::ast::{
    Aggregation, Condition, Expr, FileFormat, FillWith, Identifier, MapBody, Mutation, Param,
    SliceArg, SortSpec, StringMatchMode, Value,
};
use crate::codegen::{
    Generator, Result, condition_code, params_str, py_dict, py_name_list, py_str, py_value,
    py_value_list,
};

impl Generator<'_> {
    // ------------------------------------------------------------------
    // Loading and saving
    // ------------------------------------------------------------------

    pub(crate) fn load(
        &mut self,
        path: &EcoString,
        format: Option<FileFormat>,
        params: &[Param],
        alias: &Identifier,
    ) -> Result<()> {
        let format = format
            .or_else(|| FileFormat::from_path(path))
            .unwrap_or(FileFormat::Csv);
        let reader = match format {
            FileFormat::Csv => "read_csv",
            FileFormat::Json => "read_json",
            FileFormat::Excel => "read_excel",
            FileFormat::Parquet => "read_parquet",
        };
        let var = self.bind(alias);
        let mut args = py_str(path);
        if !params.is_empty() {
            args = format!("{args}, {}", params_str(params));
        }
        self.push(format!("{var} = pd.{reader}({args})"));
        self.push(format!(
            "print(f'Loaded {path} as {var}: {{len({var})}} rows, {{len({var}.columns)}} columns')"
        ));
        Ok(())
    }

    pub(crate) fn load_sql(
        &mut self,
        query: &EcoString,
        connection: &EcoString,
        params: &[Param],
        alias: &Identifier,
    ) -> Result<()> {
        self.import_line("from sqlalchemy import create_engine");
        let var = self.bind(alias);
        let engine = self.temp();
        self.push(format!("{engine} = create_engine({})", py_str(connection)));
        let mut args = format!("'''{query}''', con={engine}");
        if !params.is_empty() {
            args = format!("{args}, {}", params_str(params));
        }
        self.push(format!("{var} = pd.read_sql({args})"));
        self.push(format!(
            "print(f'Loaded from SQL as {var}: {{len({var})}} rows, {{len({var}.columns)}} columns')"
        ));
        Ok(())
    }

    pub(crate) fn save(
        &mut self,
        source: &Identifier,
        path: &EcoString,
        format: FileFormat,
        params: &[Param],
    ) -> Result<()> {
        let src = self.var(source)?;
        let (writer, defaults): (&str, Vec<(&str, String)>) = match format {
            FileFormat::Csv => ("to_csv", vec![("index", "False".into())]),
            FileFormat::Json => (
                "to_json",
                vec![("orient", "'records'".into()), ("indent", "2".into())],
            ),
            FileFormat::Excel => ("to_excel", vec![("index", "False".into())]),
            FileFormat::Parquet => ("to_parquet", vec![("index", "False".into())]),
        };
        // User parameters override the defaults by name, appended otherwise.
        let mut args: Vec<(String, String)> = defaults
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        for param in params {
            let rendered = py_value(&param.value);
            match args.iter_mut().find(|(k, _)| *k == param.name.as_str()) {
                Some((_, v)) => *v = rendered,
                None => args.push((param.name.to_string(), rendered)),
            }
        }
        let args: Vec<String> = args.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.push(format!(
            "{src}.{writer}({}, {})",
            py_str(path),
            args.join(", ")
        ));
        self.push(format!("print(f'Saved {src} to {path}')"));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Core relational operations
    // ------------------------------------------------------------------

    pub(crate) fn select(
        &mut self,
        source: &Identifier,
        columns: &[Identifier],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}[{}].copy()", py_name_list(columns));
        self.store_or_show(alias, "Selected Columns", &expr, |var| {
            format!("print(f'Selected {{len({var}.columns)}} columns from {src}')")
        });
        Ok(())
    }

    pub(crate) fn filter(
        &mut self,
        source: &Identifier,
        condition: &Condition,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let mask = condition_code(&src, condition);
        let expr = format!("{src}[{mask}].copy()");
        self.store_or_show(alias, "Filtered Result", &expr, |var| {
            format!("print(f'Filtered {src}: {{len({var})}} rows match condition')")
        });
        Ok(())
    }

    pub(crate) fn sort(
        &mut self,
        source: &Identifier,
        specs: &[SortSpec],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let by: Vec<String> = specs.iter().map(|s| py_str(&s.column.name)).collect();
        let ascending: Vec<&str> = specs
            .iter()
            .map(|s| if s.descending { "False" } else { "True" })
            .collect();
        let by = format!("[{}]", by.join(", "));
        let expr = format!(
            "{src}.sort_values(by={by}, ascending=[{}]).copy()",
            ascending.join(", ")
        );
        self.store_or_show(alias, "Sorted Result", &expr, |_| {
            format!("print(f\"Sorted {src} by {by}\")")
        });
        Ok(())
    }

    pub(crate) fn join(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        on: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        let expr = format!("pd.merge({l}, {r}, on={}, how='inner')", py_str(&on.name));
        self.store_or_show(alias, "Joined Result", &expr, |var| {
            format!("print(f'Joined {l} and {r}: {{len({var})}} rows')")
        });
        Ok(())
    }

    /// Grouped aggregation. `sort=False` keeps group keys in first-seen
    /// order, matching the schema the analyzer tracks for the result.
    pub(crate) fn groupby(
        &mut self,
        source: &Identifier,
        by: &[Identifier],
        aggregations: &[Aggregation],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let keys = py_name_list(by);
        let target = match alias {
            Some(alias) => self.bind(alias).to_string(),
            None => self.temp(),
        };
        if aggregations.is_empty() {
            self.push(format!(
                "{target} = {src}.groupby({keys}, sort=False).size().reset_index(name='count')"
            ));
        } else {
            // Aggregation dict grouped by source column, first-seen order,
            // so the flattened names line up with pandas' output layout.
            let mut sources: Vec<&str> = Vec::new();
            for aggregation in aggregations {
                if !sources.contains(&aggregation.column.name.as_str()) {
                    sources.push(aggregation.column.name.as_str());
                }
            }
            let entries: Vec<String> = sources
                .iter()
                .map(|column| {
                    let funcs: Vec<String> = aggregations
                        .iter()
                        .filter(|a| a.column.name == *column)
                        .map(|a| py_str(a.pandas_func()))
                        .collect();
                    format!("{}: [{}]", py_str(column), funcs.join(", "))
                })
                .collect();
            self.push(format!(
                "{target} = {src}.groupby({keys}, sort=False).agg({{{}}}).reset_index()",
                entries.join(", ")
            ));
            self.push(format!(
                "{target}.columns = ['_'.join(col).strip('_') if isinstance(col, tuple) else col for col in {target}.columns]"
            ));
        }
        if alias.is_some() {
            self.push(format!(
                "print(f\"Grouped by {keys}: {{len({target})}} groups\")"
            ));
        } else {
            self.push("print(f'\\nGrouped Result:')".to_string());
            self.push(format!("print({target})"));
        }
        Ok(())
    }

    pub(crate) fn sample(
        &mut self,
        source: &Identifier,
        n: i64,
        random: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        // Fixed seed keeps regenerated scripts reproducible.
        let expr = if random {
            format!("{src}.sample(n={n}, random_state=42).copy()")
        } else {
            format!("{src}.head({n}).copy()")
        };
        let heading = format!("Sample of {n} rows from {src}");
        self.store_or_show(alias, &heading, &expr, |var| {
            format!("print(f'Created alias {var} with {n} sampled rows')")
        });
        Ok(())
    }

    pub(crate) fn drop(
        &mut self,
        source: &Identifier,
        columns: &[Identifier],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.drop(columns={}).copy()", py_name_list(columns));
        let count = columns.len();
        self.store_or_show(alias, "Result after dropping columns", &expr, |_| {
            format!("print(f'Dropped {count} columns from {src}')")
        });
        Ok(())
    }

    pub(crate) fn mutate(
        &mut self,
        source: &Identifier,
        mutations: &[Mutation],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let lines: Vec<(String, String)> = mutations
            .iter()
            .map(|m| (m.column.name.to_string(), py_str(&m.expression)))
            .collect();
        let count = mutations.len();
        self.copy_mutate(
            &src,
            alias,
            "Mutated Result",
            |target| {
                lines
                    .iter()
                    .map(|(column, expression)| {
                        format!("{target}['{column}'] = {target}.eval({expression})")
                    })
                    .collect()
            },
            |_| format!("print('Added/modified {count} columns')"),
        );
        Ok(())
    }

    pub(crate) fn apply(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        transform: &Expr,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let x = format!("{src}['{}']", column.name);
        let code = self.expr_code(&src, &x, transform);
        let derived = format!("{}_transformed", column.name);
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Apply Result",
            |target| vec![format!("{target}['{derived}'] = {code}")],
            |_| format!("print(f'Applied transform to {name}')"),
        );
        Ok(())
    }

    pub(crate) fn map_statement(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        body: &MapBody,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let derived = format!("{}_mapped", column.name);
        let name = column.name.clone();
        match body {
            MapBody::Transform(expr) => {
                let x = format!("{src}['{}']", column.name);
                let code = self.expr_code(&src, &x, expr);
                self.copy_mutate(
                    &src,
                    alias,
                    "Map Result",
                    |target| vec![format!("{target}['{derived}'] = {code}")],
                    |_| format!("print(f'Mapped {name} with transform')"),
                );
            }
            MapBody::Mapping(entries) => {
                let dict = py_dict(entries);
                self.copy_mutate(
                    &src,
                    alias,
                    "Map Result",
                    |target| vec![format!("{target}['{derived}'] = {target}['{name}'].map({dict})")],
                    |_| format!("print(f'Mapped values in column {name} using dictionary')"),
                );
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selection and projection
    // ------------------------------------------------------------------

    pub(crate) fn select_by_type(
        &mut self,
        source: &Identifier,
        dtype: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let pandas_dtype = match dtype.as_str() {
            "numeric" | "number" => "number",
            "int" => "int64",
            "float" => "float64",
            "str" | "string" | "object" => "object",
            "bool" => "bool",
            "datetime" => "datetime64[ns]",
            other => other,
        };
        let expr = format!("{src}.select_dtypes(include=['{pandas_dtype}']).copy()");
        let heading = format!("Columns of type {dtype} from {src}");
        self.store_or_show(alias, &heading, &expr, |var| {
            format!("print(f'Created alias {var}')")
        });
        Ok(())
    }

    pub(crate) fn head(
        &mut self,
        source: &Identifier,
        n: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.head({n}).copy()");
        let heading = format!("First {n} rows of {src}");
        self.store_or_show(alias, &heading, &expr, |var| {
            format!("print(f'Created alias {var} with first {n} rows')")
        });
        Ok(())
    }

    pub(crate) fn tail(
        &mut self,
        source: &Identifier,
        n: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.tail({n}).copy()");
        let heading = format!("Last {n} rows of {src}");
        self.store_or_show(alias, &heading, &expr, |var| {
            format!("print(f'Created alias {var} with last {n} rows')")
        });
        Ok(())
    }

    pub(crate) fn iloc(
        &mut self,
        source: &Identifier,
        rows: Option<SliceArg>,
        columns: Option<SliceArg>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!(
            "{src}.iloc[{}, {}].copy()",
            slice_arg(rows),
            slice_arg(columns)
        );
        self.store_or_show(alias, "Position Selection Result", &expr, |_| {
            format!("print(f'Selected rows by position from {src}')")
        });
        Ok(())
    }

    pub(crate) fn loc(
        &mut self,
        source: &Identifier,
        rows: Option<&Value>,
        columns: Option<&Value>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let rows = rows.map_or_else(|| ":".to_string(), py_value);
        let columns = columns.map_or_else(|| ":".to_string(), py_value);
        let expr = format!("{src}.loc[{rows}, {columns}].copy()");
        self.store_or_show(alias, "Label Selection Result", &expr, |_| {
            format!("print(f'Selected rows by label from {src}')")
        });
        Ok(())
    }

    pub(crate) fn rename(
        &mut self,
        source: &Identifier,
        mapping: &[(EcoString, Value)],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.rename(columns={}).copy()", py_dict(mapping));
        let count = mapping.len();
        self.store_or_show(alias, "Renamed Result", &expr, |_| {
            format!("print(f'Renamed {count} columns in {src}')")
        });
        Ok(())
    }

    pub(crate) fn reorder(
        &mut self,
        source: &Identifier,
        order: &[Value],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}[{}].copy()", py_value_list(order));
        self.store_or_show(alias, "Reordered Result", &expr, |_| {
            format!("print(f'Reordered columns in {src}')")
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Parameterised filters
    // ------------------------------------------------------------------

    pub(crate) fn filter_between(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        low: &Value,
        high: &Value,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let low = py_value(low);
        let high = py_value(high);
        let expr = format!(
            "{src}[{src}['{}'].between({low}, {high})].copy()",
            column.name
        );
        let name = column.name.clone();
        self.store_or_show(alias, "Filtered Result", &expr, |var| {
            format!(
                "print(f'Filtered {{len({var})}} rows where {name} is between {low} and {high}')"
            )
        });
        Ok(())
    }

    pub(crate) fn filter_isin(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        values: &[Value],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!(
            "{src}[{src}['{}'].isin({})].copy()",
            column.name,
            py_value_list(values)
        );
        let name = column.name.clone();
        self.store_or_show(alias, "Filtered Result", &expr, |var| {
            format!("print(f'Filtered {{len({var})}} rows where {name} is in specified values')")
        });
        Ok(())
    }

    pub(crate) fn filter_string(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        pattern: &EcoString,
        mode: StringMatchMode,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let (method, description) = match mode {
            StringMatchMode::Contains => ("contains", "contains"),
            StringMatchMode::StartsWith => ("startswith", "starts with"),
            StringMatchMode::EndsWith => ("endswith", "ends with"),
            StringMatchMode::Matches => ("match", "matches regex"),
        };
        let expr = format!(
            "{src}[{src}['{}'].str.{method}({}, na=False)].copy()",
            column.name,
            py_str(pattern)
        );
        let name = column.name.clone();
        let pattern = pattern.clone();
        self.store_or_show(alias, "Filtered Result", &expr, |var| {
            format!(
                "print(f'Filtered {{len({var})}} rows where {name} {description} \"{pattern}\"')"
            )
        });
        Ok(())
    }

    pub(crate) fn filter_null(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        negated: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let (method, description) = if negated {
            ("notnull", "is not null")
        } else {
            ("isnull", "is null")
        };
        let expr = format!("{src}[{src}['{}'].{method}()].copy()", column.name);
        let name = column.name.clone();
        self.store_or_show(alias, "Filtered Result", &expr, |var| {
            format!("print(f'Filtered {{len({var})}} rows where {name} {description}')")
        });
        Ok(())
    }

    pub(crate) fn filter_duplicates(
        &mut self,
        source: &Identifier,
        subset: Option<&[Value]>,
        keep: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let subset = subset.map_or_else(String::new, |s| format!("subset={}, ", py_value_list(s)));
        let expr = format!(
            "{src}[{src}.duplicated({subset}keep={})].copy()",
            py_str(keep)
        );
        self.store_or_show(alias, "Duplicate Rows", &expr, |var| {
            format!("print(f'Filtered {{len({var})}} duplicate rows from {src}')")
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cleaning
    // ------------------------------------------------------------------

    pub(crate) fn dropna(
        &mut self,
        source: &Identifier,
        columns: Option<&[Identifier]>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = match columns {
            Some(columns) => format!("{src}.dropna(subset={}).copy()", py_name_list(columns)),
            None => format!("{src}.dropna().copy()"),
        };
        self.store_or_show(alias, "Result after dropping NA", &expr, |var| {
            format!("print(f'Dropped NA values: {{len({src}) - len({var})}} rows removed')")
        });
        Ok(())
    }

    pub(crate) fn fillna(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        fill: &FillWith,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        match fill {
            FillWith::Value(value) => {
                let rendered = py_value(value);
                let shown = rendered.clone();
                self.copy_mutate(
                    &src,
                    alias,
                    "Result after filling NA",
                    |target| vec![format!("{target}['{name}'] = {target}['{name}'].fillna({rendered})")],
                    |_| format!("print(f\"Filled NA values in {name} with: {shown}\")"),
                );
            }
            FillWith::Method(method) => {
                let method = method.clone();
                self.copy_mutate(
                    &src,
                    alias,
                    "Result after filling NA",
                    |target| {
                        vec![format!(
                            "{target}['{name}'] = {target}['{name}'].fillna(method='{method}')"
                        )]
                    },
                    |_| format!("print(f'Filled NA values in {name} using method: {method}')"),
                );
            }
        }
        Ok(())
    }

    pub(crate) fn null_mask(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        negated: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let (method, heading, what) = if negated {
            ("notnull", "Not-Null Mask Result", "not-null")
        } else {
            ("isnull", "Null Mask Result", "null")
        };
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            heading,
            |target| {
                vec![format!(
                    "{target}['{name}_{method}'] = {target}['{name}'].{method}()"
                )]
            },
            |_| format!("print(f'Created {what} mask for {name}')"),
        );
        Ok(())
    }

    pub(crate) fn count_na(&mut self, source: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        self.push("print('Missing values count:')".to_string());
        self.push(format!("print({src}.isnull().sum())"));
        Ok(())
    }

    pub(crate) fn fill_directional(
        &mut self,
        source: &Identifier,
        column: Option<&Identifier>,
        method: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let (heading, verb) = if method == "ffill" {
            ("Forward Fill Result", "Forward")
        } else {
            ("Backward Fill Result", "Backward")
        };
        let method = method.to_string();
        match column {
            Some(column) => {
                let name = column.name.clone();
                self.copy_mutate(
                    &src,
                    alias,
                    heading,
                    |target| {
                        vec![format!(
                            "{target}['{name}'] = {target}['{name}'].fillna(method='{method}')"
                        )]
                    },
                    |_| format!("print(f'{verb} filled {name}')"),
                );
            }
            None => {
                self.copy_mutate(
                    &src,
                    alias,
                    heading,
                    |target| vec![format!("{target} = {target}.fillna(method='{method}')")],
                    |_| format!("print(f'{verb} filled all columns')"),
                );
            }
        }
        Ok(())
    }

    pub(crate) fn fill_statistic(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        statistic: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        // Mode returns a series; take the first value.
        let fill = if statistic == "mode" {
            format!("{src}['{name}'].mode()[0]")
        } else {
            format!("{src}['{name}'].{statistic}()")
        };
        let statistic = statistic.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Result after filling NA",
            |target| vec![format!("{target}['{name}'] = {target}['{name}'].fillna({fill})")],
            |_| format!("print(f'Filled {name} with {statistic} value')"),
        );
        Ok(())
    }

    pub(crate) fn interpolate(
        &mut self,
        source: &Identifier,
        column: Option<&Identifier>,
        method: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let method = method.clone();
        match column {
            Some(column) => {
                let name = column.name.clone();
                self.copy_mutate(
                    &src,
                    alias,
                    "Interpolated Result",
                    |target| {
                        vec![format!(
                            "{target}['{name}'] = {target}['{name}'].interpolate(method='{method}')"
                        )]
                    },
                    |_| format!("print(f'Interpolated {name} using {method} method')"),
                );
            }
            None => {
                self.copy_mutate(
                    &src,
                    alias,
                    "Interpolated Result",
                    |target| vec![format!("{target} = {target}.interpolate(method='{method}')")],
                    |_| format!("print(f'Interpolated all columns using {method} method')"),
                );
            }
        }
        Ok(())
    }

    pub(crate) fn duplicated(
        &mut self,
        source: &Identifier,
        columns: Option<&[Value]>,
        keep: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let subset = columns.map_or_else(String::new, |c| format!("subset={}, ", py_value_list(c)));
        let keep = py_str(keep);
        self.copy_mutate(
            &src,
            alias,
            "Duplicated Result",
            |target| {
                vec![format!(
                    "{target}['is_duplicate'] = {target}.duplicated({subset}keep={keep})"
                )]
            },
            |_| "print(f'Marked duplicate rows')".to_string(),
        );
        Ok(())
    }

    pub(crate) fn count_duplicates(
        &mut self,
        source: &Identifier,
        columns: Option<&[Value]>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let subset = columns.map_or_else(String::new, |c| format!("subset={}", py_value_list(c)));
        self.push("print('Duplicate count:')".to_string());
        self.push(format!("print({src}.duplicated({subset}).sum())"));
        Ok(())
    }

    pub(crate) fn drop_duplicates(
        &mut self,
        source: &Identifier,
        subset: Option<&[Value]>,
        keep: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let subset = subset.map_or_else(String::new, |s| format!("subset={}, ", py_value_list(s)));
        let expr = format!("{src}.drop_duplicates({subset}keep={}).copy()", py_str(keep));
        self.store_or_show(alias, "Drop Duplicates Result", &expr, |var| {
            format!("print(f'Removed duplicates: {{len({src}) - len({var})}} rows removed')")
        });
        Ok(())
    }

    pub(crate) fn qcut(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        q: i64,
        labels: Option<&[Value]>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let labels = labels.map_or_else(String::new, |l| format!(", labels={}", py_value_list(l)));
        self.copy_mutate(
            &src,
            alias,
            "Quantile Bins Result",
            |target| {
                vec![format!(
                    "{target}['{name}_qcut'] = pd.qcut({target}['{name}'], q={q}{labels})"
                )]
            },
            |_| format!("print(f'Created {q} quantile bins for {name}')"),
        );
        Ok(())
    }

    pub(crate) fn cut(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        bins: &[Value],
        labels: Option<&[Value]>,
        include_lowest: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let bins = py_value_list(bins);
        let mut extra = labels.map_or_else(String::new, |l| format!(", labels={}", py_value_list(l)));
        if include_lowest {
            extra.push_str(", include_lowest=True");
        }
        self.copy_mutate(
            &src,
            alias,
            "Binned Result",
            |target| {
                vec![format!(
                    "{target}['{name}_binned'] = pd.cut({target}['{name}'], bins={bins}{extra})"
                )]
            },
            |_| format!("print(f'Binned column {name} with explicit boundaries')"),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Row and element application
    // ------------------------------------------------------------------

    pub(crate) fn apply_row(
        &mut self,
        source: &Identifier,
        function: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let function = function.clone();
        self.copy_mutate(
            &src,
            alias,
            "Row Apply Result",
            |target| vec![format!("{target}['applied_result'] = {target}.apply({function}, axis=1)")],
            |_| "print(f'Applied function to each row')".to_string(),
        );
        Ok(())
    }

    pub(crate) fn apply_column(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        function: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let function = function.clone();
        self.copy_mutate(
            &src,
            alias,
            "Column Apply Result",
            |target| {
                vec![format!(
                    "{target}['{name}_applied'] = {target}['{name}'].apply({function})"
                )]
            },
            |_| format!("print(f'Applied function to column {name}')"),
        );
        Ok(())
    }

    pub(crate) fn applymap(
        &mut self,
        source: &Identifier,
        function: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.applymap({function})");
        self.store_or_show(alias, "Element-wise Result", &expr, |_| {
            "print(f'Applied function element-wise to dataframe')".to_string()
        });
        Ok(())
    }

    pub(crate) fn map_values(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        mapping: &[(EcoString, Value)],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let dict = py_dict(mapping);
        self.copy_mutate(
            &src,
            alias,
            "Mapped Values Result",
            |target| vec![format!("{target}['{name}_mapped'] = {target}['{name}'].map({dict})")],
            |_| format!("print(f'Mapped values in column {name} using dictionary')"),
        );
        Ok(())
    }

    pub(crate) fn assign_const(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        value: &Value,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let value = py_value(value);
        self.copy_mutate(
            &src,
            alias,
            "Assigned Result",
            |target| vec![format!("{target}['{name}'] = {value}")],
            |_| format!("print(f'Assigned value to column {name}')"),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Combining datasets
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn merge(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        on: Option<&EcoString>,
        left_on: Option<&EcoString>,
        right_on: Option<&EcoString>,
        how: &EcoString,
        suffixes: &(EcoString, EcoString),
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        let mut args = format!("{l}, {r}");
        if let Some(on) = on {
            args.push_str(&format!(", on={}", py_str(on)));
        } else if let (Some(left_on), Some(right_on)) = (left_on, right_on) {
            args.push_str(&format!(
                ", left_on={}, right_on={}",
                py_str(left_on),
                py_str(right_on)
            ));
        }
        args.push_str(&format!(", how='{how}'"));
        if (suffixes.0.as_str(), suffixes.1.as_str()) != ("_x", "_y") {
            args.push_str(&format!(
                ", suffixes=({}, {})",
                py_str(&suffixes.0),
                py_str(&suffixes.1)
            ));
        }
        let expr = format!("pd.merge({args})");
        let how = how.clone();
        self.store_or_show(alias, "Merged Result", &expr, |var| {
            format!("print(f'Merged data using {how} join: {{len({var})}} rows')")
        });
        Ok(())
    }

    pub(crate) fn concat_frames(
        &mut self,
        sources: &[Identifier],
        ignore_index: bool,
        axis: u8,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let mut vars = Vec::with_capacity(sources.len());
        for source in sources {
            vars.push(self.var(source)?.to_string());
        }
        let expr = format!(
            "pd.concat([{}], axis={axis}, ignore_index={})",
            vars.join(", "),
            if ignore_index { "True" } else { "False" }
        );
        let count = sources.len();
        if axis == 0 {
            self.store_or_show(alias, "Concatenated Result", &expr, |var| {
                format!(
                    "print(f'Concatenated {count} dataframes vertically: {{len({var})}} rows')"
                )
            });
        } else {
            self.store_or_show(alias, "Concatenated Result", &expr, |var| {
                format!(
                    "print(f'Concatenated {count} dataframes horizontally: {{len({var}.columns)}} columns')"
                )
            });
        }
        Ok(())
    }

    pub(crate) fn union(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        let expr = format!("pd.concat([{l}, {r}]).drop_duplicates().reset_index(drop=True)");
        self.store_or_show(alias, "Union Result", &expr, |var| {
            format!("print(f'Union of {l} and {r}: {{len({var})}} unique rows')")
        });
        Ok(())
    }

    pub(crate) fn intersection(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        let expr = format!("pd.merge({l}, {r}, how='inner').drop_duplicates().reset_index(drop=True)");
        self.store_or_show(alias, "Intersection Result", &expr, |var| {
            format!("print(f'Intersection of {l} and {r}: {{len({var})}} common rows')")
        });
        Ok(())
    }

    pub(crate) fn difference(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        let merged = self.temp();
        self.push(format!(
            "{merged} = {l}.merge({r}, how='outer', indicator=True)"
        ));
        let expr = format!(
            "{merged}[{merged}['_merge'] == 'left_only'].drop('_merge', axis=1).reset_index(drop=True)"
        );
        self.store_or_show(alias, "Difference Result", &expr, |var| {
            format!("print(f'Difference of {l} minus {r}: {{len({var})}} rows')")
        });
        Ok(())
    }

    pub(crate) fn append_rows(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        let expr = format!("pd.concat([{l}, {r}], ignore_index=True)");
        self.store_or_show(alias, "Appended Result", &expr, |var| {
            format!("print(f'Appended {r} to {l}: {{len({var})}} rows')")
        });
        Ok(())
    }

    pub(crate) fn cross_join(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        let expr = format!("pd.merge({l}, {r}, how='cross')");
        self.store_or_show(alias, "Cross Join Result", &expr, |var| {
            format!("print(f'Cross join of {l} and {r}: {{len({var})}} rows')")
        });
        Ok(())
    }
}

/// An `iloc` selector: a half-open range, a single position, or `:`.
fn slice_arg(arg: Option<SliceArg>) -> String {
    match arg {
        Some(SliceArg::Range(start, end)) => format!("{start}:{end}"),
        Some(SliceArg::Index(index)) => index.to_string(),
        None => ":".to_string(),
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
    fn load_sniffs_reader_from_extension() {
        let script = gen("load \"data/sales.parquet\" as sales");
        assert!(script.contains("sales = pd.read_parquet('data/sales.parquet')"));
        assert!(script.contains(
            "print(f'Loaded data/sales.parquet as sales: {len(sales)} rows, {len(sales.columns)} columns')"
        ));
    }

    #[test]
    fn load_passes_parameters_through_in_order() {
        let script = gen("load csv \"s.csv\" with sep=\";\" header=0 as sales");
        assert!(script.contains("sales = pd.read_csv('s.csv', sep=';', header=0)"));
    }

    #[test]
    fn load_sql_builds_an_engine_first() {
        let script =
            gen(r#"load sql "select * from t" from "sqlite:///db.sqlite" as t"#);
        assert!(script.contains("from sqlalchemy import create_engine"));
        assert!(script.contains("_tmp0 = create_engine('sqlite:///db.sqlite')"));
        assert!(script.contains("t = pd.read_sql('''select * from t''', con=_tmp0)"));
    }

    #[test]
    fn save_applies_format_defaults_and_overrides() {
        let script = gen("load \"s.csv\" as sales\nsave sales to \"out.json\"");
        assert!(script.contains("sales.to_json('out.json', orient='records', indent=2)"));

        let script = gen("load \"s.csv\" as sales\nsave sales to \"out.csv\" with index=true");
        assert!(script.contains("sales.to_csv('out.csv', index=True)"));
    }

    #[test]
    fn select_projects_and_copies() {
        let script = gen("load \"s.csv\" as sales\nselect sales {name, price} as cut");
        assert!(script.contains("cut = sales[['name', 'price']].copy()"));
        assert!(script.contains("print(f'Selected {len(cut.columns)} columns from sales')"));
    }

    #[test]
    fn sort_collects_columns_and_directions() {
        let script = gen("load \"s.csv\" as sales\nsort sales by price desc, name as ordered");
        assert!(script.contains(
            "ordered = sales.sort_values(by=['price', 'name'], ascending=[False, True]).copy()"
        ));
    }

    #[test]
    fn groupby_disables_key_sorting_and_flattens() {
        let script = gen(
            "load \"s.csv\" as sales\ngroupby sales by {region} compute {sum: quantity, avg: price, max: quantity} as summary",
        );
        assert!(script.contains(
            "summary = sales.groupby(['region'], sort=False).agg({'quantity': ['sum', 'max'], 'price': ['mean']}).reset_index()"
        ));
        assert!(script.contains(
            "summary.columns = ['_'.join(col).strip('_') if isinstance(col, tuple) else col for col in summary.columns]"
        ));
        assert!(script.contains("print(f\"Grouped by ['region']: {len(summary)} groups\")"));
    }

    #[test]
    fn natural_groupby_counts_group_sizes() {
        let script = gen("load \"s.csv\" as sales\ngroupby sales by {region} as counts");
        assert!(script.contains(
            "counts = sales.groupby(['region'], sort=False).size().reset_index(name='count')"
        ));
    }

    #[test]
    fn random_sample_pins_the_seed() {
        let script = gen("load \"s.csv\" as sales\nsample sales with n=100 random as small");
        assert!(script.contains("small = sales.sample(n=100, random_state=42).copy()"));
    }

    #[test]
    fn mutate_goes_through_eval() {
        let script =
            gen("load \"s.csv\" as sales\nmutate sales {total: \"price * quantity\"} as extended");
        assert!(script.contains("extended = sales.copy()"));
        assert!(script.contains("extended['total'] = extended.eval('price * quantity')"));
        assert!(script.contains("print('Added/modified 1 columns')"));
    }

    #[test]
    fn apply_substitutes_the_placeholder_column() {
        let script =
            gen("load \"s.csv\" as sales\napply sales column price with transform x * 2 as doubled");
        assert!(script.contains("doubled['price_transformed'] = (sales['price'] * 2)"));
    }

    #[test]
    fn conditional_transform_renders_as_np_where() {
        let script = gen(
            "load \"s.csv\" as sales\napply sales column price with transform price * 0.9 where price > 100 else price as discounted",
        );
        assert!(script.contains("import numpy as np"));
        assert!(script.contains("np.where((sales['price'] > 100), (sales['price'] * 0.9), sales['price'])"));
    }

    #[test]
    fn union_deduplicates_and_difference_uses_the_indicator() {
        let script = gen("load \"a.csv\" as a\nload \"b.csv\" as b\nunion a with b as u");
        assert!(script.contains("u = pd.concat([a, b]).drop_duplicates().reset_index(drop=True)"));

        let script = gen("load \"a.csv\" as a\nload \"b.csv\" as b\ndifference a with b as d");
        assert!(script.contains("_tmp0 = a.merge(b, how='outer', indicator=True)"));
        assert!(script.contains(
            "d = _tmp0[_tmp0['_merge'] == 'left_only'].drop('_merge', axis=1).reset_index(drop=True)"
        ));
    }

    #[test]
    fn append_keeps_duplicates_and_cross_join_is_cartesian() {
        let script = gen("load \"a.csv\" as a\nload \"b.csv\" as b\nappend a with b as all_rows");
        assert!(script.contains("all_rows = pd.concat([a, b], ignore_index=True)"));

        let script = gen("load \"a.csv\" as a\nload \"b.csv\" as b\ncross_join a with b as pairs");
        assert!(script.contains("pairs = pd.merge(a, b, how='cross')"));
    }

    #[test]
    fn merge_omits_default_suffixes() {
        let script = gen(
            "load \"a.csv\" as a\nload \"b.csv\" as b\nmerge a with b on=\"id\" how=\"left\" as joined",
        );
        assert!(script.contains("joined = pd.merge(a, b, on='id', how='left')"));
        assert!(!script.contains("suffixes"));
    }
}
