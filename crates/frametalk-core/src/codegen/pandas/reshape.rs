// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Ordering, grouped and windowed operations, time-series transforms,
//! reshaping, and index manipulation.

use ecow::EcoString;

use crate::ast::{Identifier, Value};
use crate::codegen::{Generator, Result, py_bool, py_name_list, py_str, py_value, py_value_list};

impl Generator<'_> {
    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------

    pub(crate) fn sort_index(
        &mut self,
        source: &Identifier,
        ascending: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.sort_index(ascending={}).copy()", py_bool(ascending));
        self.store_or_show(alias, "Sorted by Index Result", &expr, |_| {
            format!("print(f'Sorted {src} by index')")
        });
        Ok(())
    }

    pub(crate) fn rank(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        method: &EcoString,
        ascending: bool,
        pct: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let mut args = format!("method='{method}', ascending={}", py_bool(ascending));
        if pct {
            args.push_str(", pct=True");
        }
        self.copy_mutate(
            &src,
            alias,
            "Ranked Result",
            |target| vec![format!("{target}['{name}_rank'] = {target}['{name}'].rank({args})")],
            |_| format!("print(f'Ranked {name}')"),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Grouped and windowed operations
    // ------------------------------------------------------------------

    /// `condition` is written against an implicit group: aggregate words
    /// translate to calls on the lambda parameter, everything else passes
    /// through. Word-wise substitution keeps column names containing an
    /// aggregate word (like `sum_total`) intact.
    pub(crate) fn filter_groups(
        &mut self,
        source: &Identifier,
        by: &[Identifier],
        condition: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let translated: Vec<String> = condition
            .split_whitespace()
            .map(|word| match word {
                "count" => "len(x)".to_string(),
                "sum" => "x.sum()".to_string(),
                "mean" | "avg" => "x.mean()".to_string(),
                "min" => "x.min()".to_string(),
                "max" => "x.max()".to_string(),
                other => other.to_string(),
            })
            .collect();
        let expr = format!(
            "{src}.groupby({}).filter(lambda x: {})",
            py_name_list(by),
            translated.join(" ")
        );
        self.store_or_show(alias, "Filtered Groups Result", &expr, |var| {
            format!("print(f'Filtered groups: {{len({var})}} rows remain')")
        });
        Ok(())
    }

    pub(crate) fn group_transform(
        &mut self,
        source: &Identifier,
        by: &[Identifier],
        column: &Identifier,
        function: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let keys = py_name_list(by);
        let function = function.clone();
        self.copy_mutate(
            &src,
            alias,
            "Group Transform Result",
            |target| {
                vec![format!(
                    "{target}['{name}_{function}'] = {target}.groupby({keys})['{name}'].transform('{function}')"
                )]
            },
            |_| format!("print(f'Computed group {function} of {name}')"),
        );
        Ok(())
    }

    pub(crate) fn window_rank(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        by: Option<&[Identifier]>,
        method: &EcoString,
        ascending: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let series = match by {
            Some(by) => format!("{{t}}.groupby({})['{name}']", py_name_list(by)),
            None => format!("{{t}}['{name}']"),
        };
        let args = format!("method='{method}', ascending={}", py_bool(ascending));
        self.copy_mutate(
            &src,
            alias,
            "Window Rank Result",
            |target| {
                let series = series.replace("{t}", target);
                vec![format!("{target}['{name}_rank'] = {series}.rank({args})")]
            },
            |_| format!("print(f'Ranked {name} within windows')"),
        );
        Ok(())
    }

    /// `kind` is `lag` (shift forward in index, values look back) or
    /// `lead` (negative shift).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn window_shift(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        periods: i64,
        by: Option<&[Identifier]>,
        fill_value: Option<&Value>,
        kind: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let shift_by = if kind == "lead" { -periods } else { periods };
        let series = match by {
            Some(by) => format!("{{t}}.groupby({})['{name}']", py_name_list(by)),
            None => format!("{{t}}['{name}']"),
        };
        let mut args = shift_by.to_string();
        if let Some(fill) = fill_value {
            args.push_str(&format!(", fill_value={}", py_value(fill)));
        }
        let kind = kind.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Window Shift Result",
            |target| {
                let series = series.replace("{t}", target);
                vec![format!(
                    "{target}['{name}_{kind}{periods}'] = {series}.shift({args})"
                )]
            },
            |_| format!("print(f'Computed {kind} of {name} by {periods} periods')"),
        );
        Ok(())
    }

    pub(crate) fn rolling_statistic(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        window: i64,
        min_periods: i64,
        func: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let func = func.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Rolling Result",
            |target| {
                vec![format!(
                    "{target}['{name}_rolling_{func}'] = {target}['{name}'].rolling(window={window}, min_periods={min_periods}).{func}()"
                )]
            },
            |_| format!("print(f'Computed rolling {func} of {name} over window {window}')"),
        );
        Ok(())
    }

    pub(crate) fn expanding_statistic(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        min_periods: i64,
        func: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let func = func.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Expanding Result",
            |target| {
                vec![format!(
                    "{target}['{name}_expanding_{func}'] = {target}['{name}'].expanding(min_periods={min_periods}).{func}()"
                )]
            },
            |_| format!("print(f'Computed expanding {func} of {name}')"),
        );
        Ok(())
    }

    pub(crate) fn cumulative(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        method: &str,
        word: &str,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let method = method.to_string();
        let word = word.to_string();
        self.copy_mutate(
            &src,
            alias,
            "Cumulative Result",
            |target| {
                vec![format!(
                    "{target}['{name}_{method}'] = {target}['{name}'].{method}()"
                )]
            },
            |_| format!("print(f'Computed cumulative {word} of {name}')"),
        );
        Ok(())
    }

    pub(crate) fn pct_change(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        periods: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Percent Change Result",
            |target| {
                vec![format!(
                    "{target}['{name}_pct_change'] = {target}['{name}'].pct_change(periods={periods})"
                )]
            },
            |_| format!("print(f'Computed percent change of {name}')"),
        );
        Ok(())
    }

    pub(crate) fn diff(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        periods: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        self.copy_mutate(
            &src,
            alias,
            "Difference Result",
            |target| {
                vec![format!(
                    "{target}['{name}_diff'] = {target}['{name}'].diff(periods={periods})"
                )]
            },
            |_| format!("print(f'Computed difference of {name}')"),
        );
        Ok(())
    }

    pub(crate) fn shift(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        periods: i64,
        fill_value: Option<&Value>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let mut args = periods.to_string();
        if let Some(fill) = fill_value {
            args.push_str(&format!(", fill_value={}", py_value(fill)));
        }
        self.copy_mutate(
            &src,
            alias,
            "Shifted Result",
            |target| {
                vec![format!(
                    "{target}['{name}_shifted'] = {target}['{name}'].shift({args})"
                )]
            },
            |_| format!("print(f'Shifted {name} by {periods} periods')"),
        );
        Ok(())
    }

    pub(crate) fn resample(
        &mut self,
        source: &Identifier,
        rule: &EcoString,
        column: &Identifier,
        aggfunc: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let expr = format!(
            "{src}.resample({})['{name}'].agg({}).reset_index()",
            py_str(rule),
            py_str(aggfunc)
        );
        let rule = rule.clone();
        let aggfunc = aggfunc.clone();
        self.store_or_show(alias, "Resampled Result", &expr, |var| {
            format!("print(f'Resampled {name} by {rule} using {aggfunc}: {{len({var})}} rows')")
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reshaping
    // ------------------------------------------------------------------

    pub(crate) fn pivot(
        &mut self,
        source: &Identifier,
        index: &EcoString,
        columns: &EcoString,
        values: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!(
            "{src}.pivot(index={}, columns={}, values={})",
            py_str(index),
            py_str(columns),
            py_str(values)
        );
        self.store_or_show(alias, "Pivoted Result", &expr, |var| {
            format!("print(f'Pivoted {src}: {{len({var})}} rows, {{len({var}.columns)}} columns')")
        });
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn pivot_table(
        &mut self,
        source: &Identifier,
        index: &EcoString,
        columns: &EcoString,
        values: &EcoString,
        aggfunc: &EcoString,
        fill_value: Option<&Value>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let mut args = format!(
            "{src}, index={}, columns={}, values={}, aggfunc={}",
            py_str(index),
            py_str(columns),
            py_str(values),
            py_str(aggfunc)
        );
        if let Some(fill) = fill_value {
            args.push_str(&format!(", fill_value={}", py_value(fill)));
        }
        let expr = format!("pd.pivot_table({args})");
        self.store_or_show(alias, "Pivot Table Result", &expr, |var| {
            format!("print(f'Built pivot table: {{len({var})}} rows')")
        });
        Ok(())
    }

    pub(crate) fn melt(
        &mut self,
        source: &Identifier,
        id_vars: &[Value],
        value_vars: Option<&[Value]>,
        var_name: &EcoString,
        value_name: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let mut args = format!("{src}, id_vars={}", py_value_list(id_vars));
        if let Some(value_vars) = value_vars {
            args.push_str(&format!(", value_vars={}", py_value_list(value_vars)));
        }
        args.push_str(&format!(
            ", var_name={}, value_name={}",
            py_str(var_name),
            py_str(value_name)
        ));
        let expr = format!("pd.melt({args})");
        self.store_or_show(alias, "Melted Result", &expr, |var| {
            format!("print(f'Melted {src}: {{len({var})}} rows')")
        });
        Ok(())
    }

    pub(crate) fn stack(
        &mut self,
        source: &Identifier,
        level: i64,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.stack(level={level})");
        self.store_or_show(alias, "Stacked Result", &expr, |_| {
            format!("print(f'Stacked {src}')")
        });
        Ok(())
    }

    pub(crate) fn unstack(
        &mut self,
        source: &Identifier,
        level: i64,
        fill_value: Option<&Value>,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let mut args = format!("level={level}");
        if let Some(fill) = fill_value {
            args.push_str(&format!(", fill_value={}", py_value(fill)));
        }
        let expr = format!("{src}.unstack({args})");
        self.store_or_show(alias, "Unstacked Result", &expr, |_| {
            format!("print(f'Unstacked {src}')")
        });
        Ok(())
    }

    pub(crate) fn transpose(
        &mut self,
        source: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.T");
        self.store_or_show(alias, "Transposed Result", &expr, |var| {
            format!("print(f'Transposed {src}: {{len({var})}} rows, {{len({var}.columns)}} columns')")
        });
        Ok(())
    }

    pub(crate) fn crosstab(
        &mut self,
        source: &Identifier,
        rows: &EcoString,
        columns: &EcoString,
        values: Option<&EcoString>,
        aggfunc: &EcoString,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let mut args = format!("{src}['{rows}'], {src}['{columns}']");
        if let Some(values) = values {
            args.push_str(&format!(
                ", values={src}['{values}'], aggfunc={}",
                py_str(aggfunc)
            ));
        }
        let expr = format!("pd.crosstab({args})");
        self.store_or_show(alias, "Crosstab Result", &expr, |_| {
            format!("print(f'Built crosstab of {rows} by {columns}')")
        });
        Ok(())
    }

    pub(crate) fn explode(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let expr = format!("{src}.explode('{name}').reset_index(drop=True)");
        self.store_or_show(alias, "Exploded Result", &expr, |var| {
            format!("print(f'Exploded {name}: {{len({var})}} rows')")
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Index operations
    // ------------------------------------------------------------------

    pub(crate) fn set_index(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        drop: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = column.name.clone();
        let expr = format!("{src}.set_index('{name}', drop={})", py_bool(drop));
        self.store_or_show(alias, "Set Index Result", &expr, |_| {
            format!("print(f'Set {name} as index of {src}')")
        });
        Ok(())
    }

    pub(crate) fn reset_index(
        &mut self,
        source: &Identifier,
        drop: bool,
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.reset_index(drop={})", py_bool(drop));
        self.store_or_show(alias, "Reset Index Result", &expr, |_| {
            format!("print(f'Reset index of {src}')")
        });
        Ok(())
    }

    pub(crate) fn reindex(
        &mut self,
        source: &Identifier,
        index: &[Value],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let expr = format!("{src}.reindex({})", py_value_list(index));
        self.store_or_show(alias, "Reindexed Result", &expr, |var| {
            format!("print(f'Reindexed {src}: {{len({var})}} rows')")
        });
        Ok(())
    }

    pub(crate) fn set_multiindex(
        &mut self,
        source: &Identifier,
        columns: &[Identifier],
        alias: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let keys = py_name_list(columns);
        let expr = format!("{src}.set_index({keys})");
        self.store_or_show(alias, "Multi-Index Result", &expr, |_| {
            format!("print(f\"Set multi-index {keys} on {src}\")")
        });
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
    fn filter_groups_translates_aggregate_words() {
        let script = gen(
            "load \"s.csv\" as sales\nfilter_groups sales by [region] condition=\"count > 5\" as big",
        );
        assert!(script.contains("big = sales.groupby(['region']).filter(lambda x: len(x) > 5)"));

        let script = gen(
            "load \"s.csv\" as sales\nfilter_groups sales by [region] condition=\"mean > 100\" as rich",
        );
        assert!(script.contains("rich = sales.groupby(['region']).filter(lambda x: x.mean() > 100)"));
    }

    #[test]
    fn group_transform_broadcasts_back() {
        let script = gen(
            "load \"s.csv\" as sales\ngroup_transform sales by [region] column price function=\"mean\" as enriched",
        );
        assert!(script.contains(
            "enriched['price_mean'] = enriched.groupby(['region'])['price'].transform('mean')"
        ));
    }

    #[test]
    fn window_lag_shifts_within_groups() {
        let script = gen(
            "load \"s.csv\" as sales\nwindow_lag sales column price periods=2 by [region] as lagged",
        );
        assert!(script.contains(
            "lagged['price_lag2'] = lagged.groupby(['region'])['price'].shift(2)"
        ));
    }

    #[test]
    fn window_lead_negates_the_shift() {
        let script =
            gen("load \"s.csv\" as sales\nwindow_lead sales column price periods=1 as led");
        assert!(script.contains("led['price_lead1'] = led['price'].shift(-1)"));
    }

    #[test]
    fn rolling_and_expanding_keep_min_periods() {
        let script = gen(
            "load \"s.csv\" as sales\nrolling_mean sales column price window=7 min=2 as smooth",
        );
        assert!(script.contains(
            "smooth['price_rolling_mean'] = smooth['price'].rolling(window=7, min_periods=2).mean()"
        ));

        let script =
            gen("load \"s.csv\" as sales\nexpanding_sum sales column price as running");
        assert!(script.contains("running['price_expanding_sum'] = running['price'].expanding(min_periods=1).sum()"));
    }

    #[test]
    fn cumulative_transforms_use_the_pandas_method_name() {
        let script = gen("load \"s.csv\" as sales\ncumsum sales column price as summed");
        assert!(script.contains("summed['price_cumsum'] = summed['price'].cumsum()"));
    }

    #[test]
    fn shift_renders_the_fill_value() {
        let script = gen(
            "load \"s.csv\" as sales\nshift sales column price with periods=2 fill_value=0 as shifted",
        );
        assert!(script.contains("shifted['price_shifted'] = shifted['price'].shift(2, fill_value=0)"));
    }

    #[test]
    fn pivot_table_takes_the_fill_value() {
        let script = gen(
            "load \"s.csv\" as sales\npivot_table sales index=\"region\" columns=\"month\" values=\"price\" aggfunc=\"sum\" fill_value=0 as wide",
        );
        assert!(script.contains(
            "wide = pd.pivot_table(sales, index='region', columns='month', values='price', aggfunc='sum', fill_value=0)"
        ));
    }

    #[test]
    fn melt_defaults_and_transpose() {
        let script = gen("load \"s.csv\" as sales\nmelt sales id_vars=[\"id\"] as long");
        assert!(script.contains(
            "long = pd.melt(sales, id_vars=['id'], var_name='variable', value_name='value')"
        ));

        let script = gen("load \"s.csv\" as sales\ntranspose sales as flipped");
        assert!(script.contains("flipped = sales.T"));
    }

    #[test]
    fn index_operations_round_out_the_family() {
        let script = gen("load \"s.csv\" as sales\nset_index sales column id as indexed");
        assert!(script.contains("indexed = sales.set_index('id', drop=True)"));

        let script = gen("load \"s.csv\" as sales\nset_multiindex sales columns [region, month] as indexed");
        assert!(script.contains("indexed = sales.set_index(['region', 'month'])"));
    }
}
