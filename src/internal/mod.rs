//! Internal implementation details.

pub(crate) mod dispose_bag;
