//! Rendering of a finished table as `{ key=min/mean/max, ... }`.

use crate::table::{AggregateState, AggregateTable};
use std::fmt;

/// Write one `key=min/mean/max` entry with six decimals per number
pub fn write_entry<W: fmt::Write>(out: &mut W, key: &str, state: &AggregateState) -> fmt::Result {
    write!(
        out,
        "{}={:.6}/{:.6}/{:.6}",
        key,
        state.min(),
        state.mean(),
        state.max()
    )
}

/// Entries in key order, comma separated, wrapped in braces
impl fmt::Display for AggregateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for (i, (key, state)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_entry(f, key, state)?;
        }
        f.write_str(" }")
    }
}
