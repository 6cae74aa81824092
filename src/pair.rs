//! Tag reconciliation between the two mates of a pair.

use crate::read::Read;

/// Makes two mates agree on `tag` when only one of them carries it.
///
/// Values present on both mates are never compared or changed.
pub fn fix_pair_tag(tag: &str, first: &mut Read, second: &mut Read) {
    match (first.tag(tag).cloned(), second.tag(tag).cloned()) {
        (Some(value), None) => second.set_tag(tag, value),
        (None, Some(value)) => first.set_tag(tag, value),
        _ => {}
    }
}
