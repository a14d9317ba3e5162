use super::modint::{ModularArithmetic, ModularInteger};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Precomputed multiplicative inverses of the integers `1..=threshold`.
///
/// Multiplying by the `i`-th entry divides by `i + 1` in the field. Each
/// sketch owns one of these, built once at construction and never mutated;
/// Newton's identities divide by exactly these integers and nothing else.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InverseTable<T> {
    inverses: Vec<ModularInteger<T>>,
}

impl<T> fmt::Debug for InverseTable<T>
where
    ModularInteger<T>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InverseTable")
            .field("inverses", &self.inverses)
            .finish()
    }
}

impl<T> InverseTable<T>
where
    ModularInteger<T>: ModularArithmetic<T>,
{
    /// Inverts `1..=threshold` by Fermat's little theorem.
    pub fn new(threshold: usize) -> Self {
        let one = ModularInteger::one();
        let mut index = one;
        let mut inverses = Vec::with_capacity(threshold);
        for _ in 0..threshold {
            inverses.push(index.inv());
            index.add_assign(one);
        }
        Self { inverses }
    }

    /// The number of precomputed inverses.
    pub fn len(&self) -> usize {
        self.inverses.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.inverses.is_empty()
    }
}

impl<T> Index<usize> for InverseTable<T> {
    type Output = ModularInteger<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.inverses[index]
    }
}
