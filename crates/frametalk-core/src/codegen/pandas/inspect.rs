// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Display-only emitters: inspection, statistics, validation, and plots.
//!
//! Nothing here binds an alias; every statement prints or draws. Plot
//! emitters flip the generator's `plotted` flag so the script ends with
//! the display epilogue.

use ecow::EcoString;

use crate::ast::{Identifier, Value};
use crate::codegen::{Generator, Result, py_bool, py_name_list, py_value};

impl Generator<'_> {
    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub(crate) fn describe(
        &mut self,
        source: &Identifier,
        columns: Option<&[Identifier]>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let subject = match columns {
            Some(columns) => format!("{src}[{}]", py_name_list(columns)),
            None => src.to_string(),
        };
        self.push(format!("print(f'\\nDescriptive Statistics for {src}:')"));
        self.push(format!("print({subject}.describe())"));
        Ok(())
    }

    pub(crate) fn summary(&mut self, source: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        self.push(format!("print(f'\\nSummary of {src}:')"));
        self.push(format!("print(f'Shape: {{{src}.shape}}')"));
        self.push(format!("print(f'Columns: {{list({src}.columns)}}')"));
        self.push("print(f'\\nData Types:')".to_string());
        self.push(format!("print({src}.dtypes)"));
        self.push("print(f'\\nMissing Values:')".to_string());
        self.push(format!("print({src}.isnull().sum())"));
        Ok(())
    }

    pub(crate) fn info(&mut self, source: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        self.push(format!("print(f'\\nInfo for {src}:')"));
        self.push(format!("{src}.info()"));
        Ok(())
    }

    pub(crate) fn unique(&mut self, source: &Identifier, column: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        let tmp = self.temp();
        self.push(format!("{tmp} = {src}['{name}'].unique()"));
        self.push(format!("print(f'\\nUnique values in {name}:')"));
        self.push(format!("print({tmp})"));
        self.push(format!("print(f'Total: {{len({tmp})}} unique values')"));
        Ok(())
    }

    pub(crate) fn value_counts(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        normalize: bool,
        ascending: bool,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        let tmp = self.temp();
        self.push(format!(
            "{tmp} = {src}['{name}'].value_counts(normalize={}, ascending={})",
            py_bool(normalize),
            py_bool(ascending)
        ));
        self.push(format!("print(f'\\nValue counts for {name}:')"));
        self.push(format!("print({tmp})"));
        Ok(())
    }

    pub(crate) fn show(&mut self, source: &Identifier, n: Option<i64>) -> Result<()> {
        let src = self.var(source)?;
        self.push(format!("print(f'\\n{src}:')"));
        match n {
            Some(n) => self.push(format!("print({src}.head({n}))")),
            None => self.push(format!("print({src})")),
        }
        Ok(())
    }

    pub(crate) fn correlation(&mut self, source: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        self.push(format!("print(f'\\nCorrelation Matrix for {src}:')"));
        self.push(format!("print({src}.corr(numeric_only=True))"));
        Ok(())
    }

    pub(crate) fn covariance(&mut self, source: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        self.push(format!("print(f'\\nCovariance Matrix for {src}:')"));
        self.push(format!("print({src}.cov(numeric_only=True))"));
        Ok(())
    }

    pub(crate) fn compare(&mut self, left: &Identifier, right: &Identifier) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        self.push(format!("print(f'\\nComparing {l} and {r}:')"));
        self.push(format!(
            "print(f'{l} shape: {{{l}.shape}}, {r} shape: {{{r}.shape}}')"
        ));
        self.push(format!(
            "print(f'Common columns: {{sorted(set({l}.columns) & set({r}.columns))}}')"
        ));
        self.push(format!(
            "print(f'Only in {l}: {{sorted(set({l}.columns) - set({r}.columns))}}')"
        ));
        self.push(format!(
            "print(f'Only in {r}: {{sorted(set({r}.columns) - set({l}.columns))}}')"
        ));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statistical analysis
    // ------------------------------------------------------------------

    pub(crate) fn outliers(
        &mut self,
        source: &Identifier,
        method: &EcoString,
        columns: &[Identifier],
    ) -> Result<()> {
        let src = self.var(source)?;
        self.push(format!("print(f'\\nOutliers in {src} ({method}):')"));
        for column in columns {
            let name = &column.name;
            if method == "zscore" {
                let z = self.temp();
                self.push(format!(
                    "{z} = ({src}['{name}'] - {src}['{name}'].mean()) / {src}['{name}'].std()"
                ));
                self.push(format!(
                    "print(f'{name}: {{({z}.abs() > 3).sum()}} outliers')"
                ));
            } else {
                let q1 = self.temp();
                let q3 = self.temp();
                let iqr = self.temp();
                let mask = self.temp();
                self.push(format!("{q1} = {src}['{name}'].quantile(0.25)"));
                self.push(format!("{q3} = {src}['{name}'].quantile(0.75)"));
                self.push(format!("{iqr} = {q3} - {q1}"));
                self.push(format!(
                    "{mask} = ({src}['{name}'] < {q1} - 1.5 * {iqr}) | ({src}['{name}'] > {q3} + 1.5 * {iqr})"
                ));
                self.push(format!("print(f'{name}: {{{mask}.sum()}} outliers')"));
            }
        }
        Ok(())
    }

    pub(crate) fn quantile(&mut self, source: &Identifier, column: &Identifier, q: f64) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        self.push(format!(
            "print(f\"Quantile {q} of {name}: {{{src}['{name}'].quantile({q})}}\")"
        ));
        Ok(())
    }

    pub(crate) fn hypothesis(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        columns: &[Identifier],
        test: &EcoString,
    ) -> Result<()> {
        let l = self.var(left)?;
        let r = self.var(right)?;
        self.import_line("from scipy import stats");
        match test.as_str() {
            "chi2" => {
                // Contingency table of the first two columns on the left
                // dataset; chi2 compares categorical distributions, not
                // paired samples.
                let Some(first) = columns.first() else {
                    return Ok(());
                };
                let first = &first.name;
                let second = columns.get(1).map_or(first, |c| &c.name);
                let table = self.temp();
                let result = self.temp();
                self.push(format!(
                    "{table} = pd.crosstab({l}['{first}'], {l}['{second}'])"
                ));
                self.push(format!("{result} = stats.chi2_contingency({table})"));
                self.push(format!(
                    "print(f'Chi-squared test of {first} vs {second}: statistic={{{result}.statistic:.4f}}, p-value={{{result}.pvalue:.4f}}')"
                ));
            }
            "anova" => {
                for column in columns {
                    let name = &column.name;
                    let result = self.temp();
                    self.push(format!(
                        "{result} = stats.f_oneway({l}['{name}'].dropna(), {r}['{name}'].dropna())"
                    ));
                    self.push(format!(
                        "print(f'ANOVA on {name}: statistic={{{result}.statistic:.4f}}, p-value={{{result}.pvalue:.4f}}')"
                    ));
                }
            }
            _ => {
                for column in columns {
                    let name = &column.name;
                    let result = self.temp();
                    self.push(format!(
                        "{result} = stats.ttest_ind({l}['{name}'].dropna(), {r}['{name}'].dropna())"
                    ));
                    self.push(format!(
                        "print(f't-test on {name}: statistic={{{result}.statistic:.4f}}, p-value={{{result}.pvalue:.4f}}')"
                    ));
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    pub(crate) fn assert_unique(&mut self, source: &Identifier, column: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        self.push(format!(
            "assert {src}['{name}'].is_unique, 'Column {name} contains duplicate values'"
        ));
        self.push(format!("print(f'Assertion passed: {name} is unique')"));
        Ok(())
    }

    pub(crate) fn assert_no_nulls(
        &mut self,
        source: &Identifier,
        column: &Identifier,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        self.push(format!(
            "assert {src}['{name}'].notnull().all(), 'Column {name} contains null values'"
        ));
        self.push(format!("print(f'Assertion passed: {name} has no nulls')"));
        Ok(())
    }

    pub(crate) fn assert_range(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        min: Option<&Value>,
        max: Option<&Value>,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        let mut checks = Vec::new();
        if let Some(min) = min {
            checks.push(format!("({src}['{name}'] >= {}).all()", py_value(min)));
        }
        if let Some(max) = max {
            checks.push(format!("({src}['{name}'] <= {}).all()", py_value(max)));
        }
        if checks.is_empty() {
            return Ok(());
        }
        self.push(format!(
            "assert {}, 'Column {name} has values outside the expected range'",
            checks.join(" and ")
        ));
        self.push(format!("print(f'Assertion passed: {name} is within range')"));
        Ok(())
    }

    pub(crate) fn truth_check(
        &mut self,
        source: &Identifier,
        column: &Identifier,
        method: &str,
    ) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        let label = if method == "any" { "Any" } else { "All" };
        self.push(format!(
            "print(f\"{label} truthy in {name}: {{{src}['{name}'].{method}()}}\")"
        ));
        Ok(())
    }

    pub(crate) fn count_true(&mut self, source: &Identifier, column: &Identifier) -> Result<()> {
        let src = self.var(source)?;
        let name = &column.name;
        self.push(format!(
            "print(f\"True count in {name}: {{{src}['{name}'].sum()}}\")"
        ));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Visualization
    // ------------------------------------------------------------------

    pub(crate) fn boxplot(
        &mut self,
        source: &Identifier,
        columns: &[Identifier],
        by: Option<&Identifier>,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("import matplotlib.pyplot as plt");
        self.plotted = true;
        self.push("plt.figure(figsize=(10, 6))".to_string());
        let mut args = format!("column={}", py_name_list(columns));
        if let Some(by) = by {
            args.push_str(&format!(", by='{}'", by.name));
        }
        self.push(format!("{src}.boxplot({args})"));
        self.push(format!("plt.title('Boxplot of {src}')"));
        Ok(())
    }

    pub(crate) fn heatmap(&mut self, source: &Identifier, columns: &[Identifier]) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("import matplotlib.pyplot as plt");
        self.import_line("import seaborn as sns");
        self.plotted = true;
        self.push("plt.figure(figsize=(10, 8))".to_string());
        self.push(format!(
            "sns.heatmap({src}[{}].corr(), annot=True, cmap='coolwarm')",
            py_name_list(columns)
        ));
        self.push(format!("plt.title('Correlation Heatmap of {src}')"));
        Ok(())
    }

    pub(crate) fn pairplot(&mut self, source: &Identifier, columns: &[Identifier]) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("import matplotlib.pyplot as plt");
        self.import_line("import seaborn as sns");
        self.plotted = true;
        self.push(format!("sns.pairplot({src}[{}])", py_name_list(columns)));
        Ok(())
    }

    pub(crate) fn timeseries(
        &mut self,
        source: &Identifier,
        x: &Identifier,
        y: &Identifier,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("import matplotlib.pyplot as plt");
        self.plotted = true;
        let x = &x.name;
        let y = &y.name;
        self.push("plt.figure(figsize=(12, 6))".to_string());
        self.push(format!("plt.plot({src}['{x}'], {src}['{y}'])"));
        self.push(format!("plt.xlabel('{x}')"));
        self.push(format!("plt.ylabel('{y}')"));
        self.push(format!("plt.title('{y} over {x}')"));
        Ok(())
    }

    pub(crate) fn pie(
        &mut self,
        source: &Identifier,
        values: &Identifier,
        labels: &Identifier,
    ) -> Result<()> {
        let src = self.var(source)?;
        self.import_line("import matplotlib.pyplot as plt");
        self.plotted = true;
        let values = &values.name;
        let labels = &labels.name;
        self.push("plt.figure(figsize=(8, 8))".to_string());
        self.push(format!(
            "plt.pie({src}['{values}'], labels={src}['{labels}'], autopct='%1.1f%%')"
        ));
        self.push(format!("plt.title('Pie Chart of {values}')"));
        Ok(())
    }

    /// Saves the current figure. Dimensions arrive in pixels and matplotlib
    /// wants inches at the fixed 100 dpi used by `savefig`.
    pub(crate) fn export_plot(
        &mut self,
        filename: &EcoString,
        width: Option<i64>,
        height: Option<i64>,
    ) -> Result<()> {
        self.import_line("import matplotlib.pyplot as plt");
        if let (Some(width), Some(height)) = (width, height) {
            self.push(format!(
                "plt.gcf().set_size_inches({width} / 100, {height} / 100)"
            ));
        }
        self.push(format!(
            "plt.savefig('{filename}', dpi=100, bbox_inches='tight')"
        ));
        self.push(format!("print(f'Exported plot to {filename}')"));
        Ok(())
    }
}
