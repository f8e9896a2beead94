// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Pandas emitters, one file per operation family.
//!
//! Each file adds methods to the shared [`Generator`](super::Generator);
//! the emission templates follow pandas idiom: masks for filters,
//! `copy()`-then-mutate for column transforms, `pd.merge`/`pd.concat` for
//! combination, sklearn for scaling and encoding, matplotlib/seaborn for
//! plots.

mod inspect;
mod relational;
mod reshape;
mod transform;
