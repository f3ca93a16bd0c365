//! Key derivation — row buffer → store key.
//!
//! The store key is the raw bytes of the table's single key column. For
//! variable-length columns the 1- or 2-byte length prefix is skipped; the
//! remaining `length` bytes are taken verbatim (no hashing, no trimming).

use crate::error::{LdbError, LdbResult};
use crate::schema::{KeyPart, TableSchema};

/// Host key buffers prefix every variable-length key part with 2 length bytes.
pub const HOST_VAR_KEY_PREFIX: usize = 2;

/// Derive the store key for `row` from the schema's key column.
pub fn derive_key(row: &[u8], schema: &TableSchema) -> LdbResult<Vec<u8>> {
    let part = schema.key_part()?;
    key_slice(row, part).map(<[u8]>::to_vec)
}

/// Borrow the key bytes of `row` described by `part`.
pub fn key_slice<'a>(row: &'a [u8], part: &KeyPart) -> LdbResult<&'a [u8]> {
    let bounds = part
        .offset
        .checked_add(part.key_type.length_prefix())
        .and_then(|start| Some((start, start.checked_add(part.length)?)));
    let out_of_row = || {
        LdbError::InvalidRow(format!(
            "key column '{}' at offset {} (length {}) outside a {}-byte row",
            part.column,
            part.offset,
            part.length,
            row.len()
        ))
    };
    let (start, end) = bounds.ok_or_else(out_of_row)?;
    row.get(start..end).ok_or_else(out_of_row)
}

/// Convert a host key buffer into a store key.
///
/// Unlike row buffers, host key buffers always carry a 2-byte length prefix
/// for variable-length parts, whatever the column's own prefix width.
pub fn strip_key_buffer<'a>(key_buffer: &'a [u8], part: &KeyPart) -> LdbResult<&'a [u8]> {
    if !part.key_type.is_var_length() {
        return Ok(key_buffer);
    }
    key_buffer.get(HOST_VAR_KEY_PREFIX..).ok_or_else(|| {
        LdbError::InvalidRow(format!(
            "key buffer of {} bytes shorter than its length prefix",
            key_buffer.len()
        ))
    })
}
