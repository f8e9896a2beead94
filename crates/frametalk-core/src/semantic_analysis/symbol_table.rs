// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Registry of dataset aliases visible to later statements.

use ecow::EcoString;
use tracing::trace;

use crate::source_analysis::Span;

use super::schema::Schema;

/// Everything the analyzer knows about one registered dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfo {
    pub schema: Schema,
    /// Human-readable origin, e.g. `"data/sales.csv"` or `"filter from sales"`.
    pub provenance: EcoString,
    /// Where the defining statement sits in the source.
    pub defined_at: Span,
}

impl DatasetInfo {
    pub fn new(schema: Schema, provenance: impl Into<EcoString>, defined_at: Span) -> Self {
        DatasetInfo {
            schema,
            provenance: provenance.into(),
            defined_at,
        }
    }
}

/// Dataset aliases in registration order.
///
/// Backed by a `Vec` rather than a map: registration order drives the
/// "available datasets" hint and suggestion tie-breaks, and programs are
/// small enough that linear lookup is never the bottleneck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    datasets: Vec<(EcoString, DatasetInfo)>,
    /// Every define in statement order, redefinitions included.
    history: Vec<EcoString>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Register `name`, updating in place (position kept) when it already
    /// exists. Every call is recorded in the definition history.
    pub fn define(&mut self, name: impl Into<EcoString>, info: DatasetInfo) {
        let name = name.into();
        trace!(dataset = %name, provenance = %info.provenance, "dataset registered");
        self.history.push(name.clone());
        match self.datasets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = info,
            None => self.datasets.push((name, info)),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&DatasetInfo> {
        self.datasets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, info)| info)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Alias names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatasetInfo)> {
        self.datasets.iter().map(|(n, info)| (n.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Every define in statement order, redefinitions included.
    pub fn history(&self) -> &[EcoString] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(provenance: &str) -> DatasetInfo {
        DatasetInfo::new(Schema::Unknown, provenance, Span::point(0))
    }

    #[test]
    fn names_come_back_in_registration_order() {
        let mut table = SymbolTable::new();
        table.define("sales", info("data/sales.csv"));
        table.define("orders", info("data/orders.csv"));
        table.define("customers", info("data/customers.csv"));
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, ["sales", "orders", "customers"]);
    }

    #[test]
    fn redefinition_updates_in_place() {
        let mut table = SymbolTable::new();
        table.define("sales", info("data/sales.csv"));
        table.define("filtered", info("filter from sales"));
        table.define("sales", info("head from filtered"));

        let names: Vec<_> = table.names().collect();
        assert_eq!(names, ["sales", "filtered"]);
        let sales = table.lookup("sales").unwrap();
        assert_eq!(sales.provenance, "head from filtered");
    }

    #[test]
    fn history_keeps_every_define() {
        let mut table = SymbolTable::new();
        table.define("sales", info("data/sales.csv"));
        table.define("sales", info("filter from sales"));
        assert_eq!(table.history(), ["sales", "sales"]);
    }

    #[test]
    fn lookup_misses_return_none() {
        let table = SymbolTable::new();
        assert!(table.lookup("sales").is_none());
        assert!(table.is_empty());
    }
}
