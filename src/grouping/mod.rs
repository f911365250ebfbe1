//! Day grouping for paginated detail display.
//!
//! The detail view lays days out in rows of a fixed width. `group_days`
//! produces those rows as borrowed slices of the author's day list.

/// Default number of days per detail row.
pub const DEFAULT_CHUNK_SIZE: usize = 4;

/// Split `days` into consecutive chunks of `chunk_size`.
///
/// Every chunk but the last holds exactly `chunk_size` items; the last holds
/// the remainder. Empty input yields no chunks. A `chunk_size` of `0` is
/// treated as `1`.
pub fn group_days<T>(days: &[T], chunk_size: usize) -> Vec<&[T]> {
    days.chunks(chunk_size.max(1)).collect()
}

/// Number of chunks `group_days` produces for `len` items.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    len.div_ceil(chunk_size.max(1))
}
