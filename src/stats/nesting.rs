//! Tight nesting of an outer/inner loop pair.
//!
//! The inner loop must be the only effectful content of the outer loop body:
//!
//! ```text
//! [outer header] --> [inner preheader] --> [inner loop] --> [inner exit] --> ... --> [outer latch]
//! ```
//!
//! The outer header may only branch to the inner preheader, the inner header or the
//! outer latch; the outer header, outer latch, inner preheader and inner exit may not
//! touch memory; and the inner exit must reach the outer latch through empty blocks only.

use std::collections::HashSet;

use log::debug;

use crate::analysis::{LoopInfo, SsaFunction};

/// Returns `true` if `inner` is tightly nested in `outer`.
#[must_use]
pub fn tightly_nested(func: &SsaFunction, outer: &LoopInfo, inner: &LoopInfo) -> bool {
    let outer_header = outer.header.index();
    let inner_header = inner.header.index();
    let (Some(outer_latch), Some(inner_preheader), Some(inner_exit)) = (
        outer.latch().map(|node| node.index()),
        inner.preheader.map(|node| node.index()),
        inner.exit_block().map(|node| node.index()),
    ) else {
        debug!(
            "{}: loop at {} is not in canonical form",
            func.name(),
            inner.header
        );
        return false;
    };

    let Some(header_block) = func.block(outer_header) else {
        return false;
    };
    if header_block.terminator().is_none() {
        return false;
    }
    let stray = header_block
        .successors()
        .into_iter()
        .any(|succ| succ != inner_preheader && succ != inner_header && succ != outer_latch);
    if stray {
        return false;
    }

    let effect_free = |block: usize| func.block(block).is_some_and(|b| b.is_effect_free());

    if !effect_free(outer_header) || !effect_free(outer_latch) {
        return false;
    }
    if inner_preheader != outer_header && !effect_free(inner_preheader) {
        return false;
    }
    if skip_empty_blocks_until(func, inner_exit, outer_latch) != outer_latch {
        return false;
    }

    effect_free(inner_exit)
}

/// Follows unique successors from `from` over blocks holding only a terminator.
///
/// Returns `end` if the walk reaches it, otherwise the last block walked. A `from` that
/// is `end` or has no unique successor is returned as is.
pub(crate) fn skip_empty_blocks_until(func: &SsaFunction, from: usize, end: usize) -> usize {
    let next = |block: usize| func.block(block).and_then(|b| b.unique_successor());

    let Some(mut current) = next(from).filter(|_| from != end) else {
        return from;
    };

    let mut previous = from;
    let mut visited = HashSet::new();
    while current != end
        && func.block(current).is_some_and(|b| b.is_trivial())
        && visited.insert(current)
    {
        previous = current;
        match next(current) {
            Some(succ) => current = succ,
            None => break,
        }
    }

    if current == end {
        end
    } else {
        previous
    }
}
