// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Column-level schemas tracked for each registered dataset.
//!
//! A schema is either a known, ordered column list or [`Schema::Unknown`].
//! Operations that obscure column structure (reshaping, combining, loads the
//! introspector cannot read) produce `Unknown`, and column existence checks
//! are suppressed on it rather than guessed at.

use ecow::EcoString;

/// Broad column type classes, as coarse as file introspection can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Str,
    Numeric,
    Boolean,
    Datetime,
    Unknown,
}

/// A single named column and its inferred type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: EcoString,
    pub dtype: DataType,
}

impl Column {
    pub fn new(name: impl Into<EcoString>, dtype: DataType) -> Self {
        Column {
            name: name.into(),
            dtype,
        }
    }

    /// Column with no type information, the usual case for CSV headers.
    pub fn untyped(name: impl Into<EcoString>) -> Self {
        Column::new(name, DataType::Unknown)
    }
}

/// Ordered column layout of a dataset, when one can be derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// Columns in dataset order.
    Known(Vec<Column>),
    /// Column structure lost or never observed.
    Unknown,
}

impl Schema {
    /// Known schema of untyped columns, in the given order.
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<EcoString>,
    {
        Schema::Known(names.into_iter().map(Column::untyped).collect())
    }

    /// Columns in order, or `None` when the layout is unknown.
    pub fn columns(&self) -> Option<&[Column]> {
        match self {
            Schema::Known(columns) => Some(columns),
            Schema::Unknown => None,
        }
    }

    /// Whether `name` is a known column. Always `false` on an unknown
    /// schema; callers must skip existence checks in that case.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns()
            .is_some_and(|columns| columns.iter().any(|c| c.name == name))
    }

    /// Type of column `name`, `Unknown` when the schema or column is not.
    pub fn dtype_of(&self, name: &str) -> DataType {
        self.columns()
            .and_then(|columns| columns.iter().find(|c| c.name == name))
            .map_or(DataType::Unknown, |c| c.dtype)
    }

    /// Projection onto `names`, in the listed order. Names not present are
    /// dropped, matching `df[[...]]` after checks have already run.
    pub fn narrowed_to(&self, names: &[&str]) -> Schema {
        let Some(columns) = self.columns() else {
            return Schema::Unknown;
        };
        Schema::Known(
            names
                .iter()
                .filter_map(|name| columns.iter().find(|c| c.name == *name))
                .cloned()
                .collect(),
        )
    }

    /// Schema with the listed columns removed.
    pub fn without(&self, names: &[&str]) -> Schema {
        let Some(columns) = self.columns() else {
            return Schema::Unknown;
        };
        Schema::Known(
            columns
                .iter()
                .filter(|c| !names.contains(&c.name.as_str()))
                .cloned()
                .collect(),
        )
    }

    /// Assignment semantics: retype `column` in place when the name already
    /// exists, otherwise append it.
    pub fn extended_with(&self, column: Column) -> Schema {
        let Some(columns) = self.columns() else {
            return Schema::Unknown;
        };
        let mut columns = columns.to_vec();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => existing.dtype = column.dtype,
            None => columns.push(column),
        }
        Schema::Known(columns)
    }

    /// Apply old-to-new renames, preserving order and types.
    pub fn renamed(&self, mapping: &[(&str, &str)]) -> Schema {
        let Some(columns) = self.columns() else {
            return Schema::Unknown;
        };
        Schema::Known(
            columns
                .iter()
                .map(|c| {
                    let name = mapping
                        .iter()
                        .find(|(old, _)| c.name == *old)
                        .map_or(c.name.clone(), |(_, new)| EcoString::from(*new));
                    Column {
                        name,
                        dtype: c.dtype,
                    }
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(names: &[&str]) -> Schema {
        Schema::from_names(names.iter().copied())
    }

    #[test]
    fn unknown_schema_suppresses_lookups() {
        assert!(!Schema::Unknown.has_column("price"));
        assert_eq!(Schema::Unknown.columns(), None);
        assert_eq!(Schema::Unknown.narrowed_to(&["price"]), Schema::Unknown);
    }

    #[test]
    fn narrowing_keeps_the_listed_order() {
        let schema = known(&["id", "price", "region"]);
        let narrowed = schema.narrowed_to(&["region", "id"]);
        let names: Vec<_> = narrowed
            .columns()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["region", "id"]);
    }

    #[test]
    fn extending_replaces_in_place_on_name_collision() {
        let schema = known(&["id", "price"]);
        let extended = schema.extended_with(Column::new("price", DataType::Numeric));
        let columns = extended.columns().unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].name, "price");
        assert_eq!(columns[1].dtype, DataType::Numeric);
    }

    #[test]
    fn extending_appends_new_names() {
        let schema = known(&["id"]);
        let extended = schema.extended_with(Column::new("id_rank", DataType::Numeric));
        let names: Vec<_> = extended
            .columns()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["id", "id_rank"]);
    }

    #[test]
    fn renaming_preserves_untouched_columns() {
        let schema = known(&["id", "price"]);
        let renamed = schema.renamed(&[("price", "unit_price")]);
        let names: Vec<_> = renamed
            .columns()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["id", "unit_price"]);
    }

    #[test]
    fn dropping_removes_only_the_named_columns() {
        let schema = known(&["id", "price", "region"]);
        let dropped = schema.without(&["price"]);
        let names: Vec<_> = dropped
            .columns()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["id", "region"]);
    }
}
