//! Character-class style rendering of sets, for diagnostics.

use crate::bdd::Bdd;
use crate::bitvec::BitVector;
use crate::bv_algebra::BvAlgebra;
use crate::error::Result;
use crate::reference::Ref;

/// Render one element: printable ASCII as itself, anything else as an escape.
pub fn fmt_element(value: u64) -> String {
    match value {
        0x5C | 0x5B | 0x5D | 0x2D | 0x5E => format!("\\{}", value as u8 as char),
        0x21..=0x7E => (value as u8 as char).to_string(),
        0x00..=0xFF => format!("\\x{:02X}", value),
        0x100..=0xFFFF => format!("\\u{:04X}", value),
        _ => format!("\\u{{{:X}}}", value),
    }
}

/// Render inclusive ranges as a bracketed class, e.g. `[0-9A-F]`.
pub fn fmt_ranges(ranges: &[(u64, u64)]) -> String {
    let mut s = String::from("[");
    for &(lo, hi) in ranges {
        s.push_str(&fmt_element(lo));
        if hi > lo {
            if hi > lo + 1 {
                s.push('-');
            }
            s.push_str(&fmt_element(hi));
        }
    }
    s.push(']');
    s
}

/// Ranges rendered by [`Bdd::pretty_print`] before the output is cut with `...`.
pub const MAX_PRINTED_RANGES: usize = 32;

impl Bdd {
    pub fn pretty_print(&self, set: Ref, max_bit: i32) -> Result<String> {
        let ranges = self.collect_ranges(set, max_bit, MAX_PRINTED_RANGES)?;
        if ranges.len() <= MAX_PRINTED_RANGES {
            return Ok(fmt_ranges(&ranges));
        }
        let mut s = fmt_ranges(&ranges[..MAX_PRINTED_RANGES]);
        s.insert_str(s.len() - 1, "...");
        Ok(s)
    }
}

impl BvAlgebra {
    /// Render `set` through the blocks it stands for; `ctx` must hold the partition.
    pub fn pretty_print(&self, ctx: &Bdd, max_bit: i32, set: &BitVector) -> Result<String> {
        let charset = self.convert_to_charset(ctx, set)?;
        ctx.pretty_print(charset, max_bit)
    }

    /// Render `set` as the list of its bit indices, without a context.
    pub fn pretty_print_bits(&self, set: &BitVector) -> String {
        let mut s = String::from("[");
        for (i, index) in set.iter_ones().enumerate() {
            if i > 0 {
                s.push(',');
            }
            s.push_str(&index.to_string());
        }
        s.push(']');
        s
    }
}
