//! Engine descriptor — static capabilities reported to the host.

/// Table type name shown by the host.
pub const ENGINE_NAME: &str = "LEVELDB";

/// Index algorithm name shown by the host.
pub const INDEX_TYPE: &str = "HASH";

/// Per-table file extensions. Stores live in their own directory, so none.
pub const FILE_EXTENSIONS: &[&str] = &[];

/// Longest key column accepted, in bytes.
pub const MAX_KEY_LENGTH: usize = 3500;

/// Longest record accepted, in bytes.
pub const MAX_RECORD_LENGTH: usize = 65_535;

pub const MAX_SUPPORTED_KEYS: usize = 1;
pub const MAX_SUPPORTED_KEY_PARTS: usize = 1;

/// Fixed estimate for any key range.
pub const RECORDS_IN_RANGE_ESTIMATE: u64 = 10;

/// Table capability flags.
pub mod table_flags {
    /// Rows are not versioned; the engine reports no transactions
    pub const NO_TRANSACTIONS: u64 = 1 << 0;
    /// Statement-based binary logging is safe
    pub const BINLOG_STMT_CAPABLE: u64 = 1 << 1;
    /// Row-based binary logging is safe
    pub const BINLOG_ROW_CAPABLE: u64 = 1 << 2;
    /// Deletes and updates must locate rows by primary key
    pub const PRIMARY_KEY_REQUIRED_FOR_DELETE: u64 = 1 << 3;
    /// Auto-increment columns are rejected
    pub const NO_AUTO_INCREMENT: u64 = 1 << 4;
    /// Row count in statistics is exact
    pub const STATS_RECORDS_IS_EXACT: u64 = 1 << 5;
}

/// Index capability flags.
pub mod index_flags {
    /// `index_next` may follow a keyed read
    pub const READ_NEXT: u64 = 1 << 0;
    /// Keys come back in order
    pub const READ_ORDER: u64 = 1 << 1;
    /// Ranges can be scanned
    pub const READ_RANGE: u64 = 1 << 2;
    /// Rows can be read back from the index alone
    pub const KEYREAD_ONLY: u64 = 1 << 3;
}

/// Flags advertised for every table.
pub fn table_flags() -> u64 {
    table_flags::NO_TRANSACTIONS
        | table_flags::BINLOG_STMT_CAPABLE
        | table_flags::BINLOG_ROW_CAPABLE
        | table_flags::PRIMARY_KEY_REQUIRED_FOR_DELETE
        | table_flags::NO_AUTO_INCREMENT
}

/// Flags advertised for the key; only unique point reads are possible.
pub fn index_flags() -> u64 {
    index_flags::READ_NEXT
}

/// Cost of a full scan over `records` live and `deleted` dead rows.
pub fn scan_time(records: u64, deleted: u64) -> f64 {
    (records + deleted) as f64 / 20.0 + 10.0
}

/// Cost of reading `rows` rows through the key.
pub fn read_time(rows: u64) -> f64 {
    rows as f64 / 20.0 + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_estimates() {
        assert_eq!(scan_time(0, 0), 10.0);
        assert_eq!(scan_time(180, 20), 20.0);
        assert_eq!(read_time(0), 1.0);
        assert_eq!(read_time(40), 3.0);
    }

    #[test]
    fn flags_exclude_scans() {
        assert_eq!(index_flags() & index_flags::READ_RANGE, 0);
        assert_eq!(index_flags() & index_flags::READ_ORDER, 0);
        assert_ne!(table_flags() & table_flags::NO_TRANSACTIONS, 0);
        assert_eq!(table_flags() & table_flags::STATS_RECORDS_IS_EXACT, 0);
    }
}
