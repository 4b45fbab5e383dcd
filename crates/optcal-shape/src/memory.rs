//! In-memory predicate table for tests.
//!
//! Holds only the `b` column; ids and filler carry no information for
//! shaping. Counts every mutating call so tests can assert idempotence.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Result, ShapeError};
use crate::table::{Pick, Predicate, PredicateTable};

pub struct MemoryTable {
    name: String,
    rows: Option<Vec<i64>>,
    rng: StdRng,
    bulk_batch: Option<u64>,
    mutations: usize,
    analyze_calls: usize,
    frozen: bool,
}

impl MemoryTable {
    /// A table that does not exist yet.
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rows: None,
            rng: StdRng::seed_from_u64(seed),
            bulk_batch: None,
            mutations: 0,
            analyze_calls: 0,
            frozen: false,
        }
    }

    /// An existing table holding `values` in `b`.
    pub fn with_values(name: impl Into<String>, values: Vec<i64>, seed: u64) -> Self {
        Self {
            rows: Some(values),
            ..Self::new(name, seed)
        }
    }

    /// Make every subsequent update change zero rows.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn exists(&self) -> bool {
        self.rows.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_value(&self, value: i64) -> u64 {
        self.count_matching(&Predicate::Equals(value))
    }

    pub fn count_matching(&self, filter: &Predicate) -> u64 {
        self.rows
            .as_ref()
            .map_or(0, |rows| rows.iter().filter(|b| filter.matches(**b)).count() as u64)
    }

    /// Mutating calls so far: recreate, inserts and updates.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls
    }

    fn rows_mut(&mut self) -> Result<&mut Vec<i64>> {
        let name = &self.name;
        self.rows
            .as_mut()
            .ok_or_else(|| ShapeError::Backend(format!("table {name} does not exist")))
    }
}

impl PredicateTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&mut self) -> Result<Option<u64>> {
        Ok(self.rows.as_ref().map(|rows| rows.len() as u64))
    }

    fn recreate(&mut self) -> Result<()> {
        self.mutations += 1;
        self.rows = Some(Vec::new());
        Ok(())
    }

    fn begin_bulk_load(&mut self, batch_rows: u64) -> Result<()> {
        self.rows_mut()?;
        self.bulk_batch = Some(batch_rows);
        Ok(())
    }

    fn append_random_rows(&mut self, rows: u64) -> Result<u64> {
        let batch = self
            .bulk_batch
            .ok_or_else(|| ShapeError::Backend("bulk load not started".into()))?;
        let n = rows.min(batch);
        let values: Vec<i64> = (0..n).map(|_| self.rng.gen_range(0..1_000_000)).collect();
        self.mutations += 1;
        self.rows_mut()?.extend(values);
        Ok(n)
    }

    fn end_bulk_load(&mut self) -> Result<()> {
        self.bulk_batch = None;
        Ok(())
    }

    fn count_where(&mut self, filter: &Predicate) -> Result<u64> {
        self.rows_mut()?;
        Ok(self.count_matching(filter))
    }

    fn reassign(&mut self, filter: &Predicate, value: i64, limit: u64, pick: Pick) -> Result<u64> {
        self.mutations += 1;
        let frozen = self.frozen;
        let mut matching: Vec<usize> = self
            .rows_mut()?
            .iter()
            .enumerate()
            .filter(|(_, b)| filter.matches(**b))
            .map(|(i, _)| i)
            .collect();
        if frozen {
            return Ok(0);
        }
        if pick == Pick::Random {
            matching.shuffle(&mut self.rng);
        }
        matching.truncate(limit as usize);
        let rows = self.rows_mut()?;
        for &i in &matching {
            rows[i] = value;
        }
        Ok(matching.len() as u64)
    }

    fn analyze(&mut self) -> Result<()> {
        self.rows_mut()?;
        self.analyze_calls += 1;
        Ok(())
    }
}
