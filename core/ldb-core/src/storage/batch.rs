//! Ordered batch of pending puts and deletes.
//!
//! A batch keeps every operation in append order. When it is applied the
//! store sees the net effect per key: the last operation on a key wins.

/// 배치 내 쓰기 작업
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Put(key, encoded value)
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete(key)
    Delete { key: Vec<u8> },
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }
}

/// Pending mutations for one table, committed as a single atomic write.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
    approximate_size: usize,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.approximate_size += key.len() + value.len();
        self.ops.push(BatchOp::Put { key, value });
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.approximate_size += key.len();
        self.ops.push(BatchOp::Delete { key });
    }

    /// Operations in append order.
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Bytes of keys and values held.
    pub fn approximate_size(&self) -> usize {
        self.approximate_size
    }

    /// (puts, deletes) appended so far.
    pub fn counts(&self) -> (usize, usize) {
        let puts = self
            .ops
            .iter()
            .filter(|op| matches!(op, BatchOp::Put { .. }))
            .count();
        (puts, self.ops.len() - puts)
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.approximate_size = 0;
    }

    /// Build the sled batch. sled keeps one entry per key, so replaying in
    /// append order leaves the last operation on each key.
    pub(crate) fn into_sled(self) -> sled::Batch {
        let mut batch = sled::Batch::default();
        for op in self.ops {
            match op {
                BatchOp::Put { key, value } => batch.insert(key, value),
                BatchOp::Delete { key } => batch.remove(key),
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_append_order() {
        let mut batch = WriteBatch::new();
        batch.put(b"a".to_vec(), b"1".to_vec());
        batch.delete(b"b".to_vec());
        batch.put(b"c".to_vec(), b"3".to_vec());

        let keys: Vec<&[u8]> = batch.ops().iter().map(BatchOp::key).collect();
        assert_eq!(keys, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
        assert_eq!(batch.counts(), (2, 1));
        assert_eq!(batch.approximate_size(), 5);
    }

    #[test]
    fn clear_resets() {
        let mut batch = WriteBatch::new();
        batch.put(b"k".to_vec(), b"v".to_vec());
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.approximate_size(), 0);
    }

    #[test]
    fn last_operation_per_key_wins() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        db.insert(b"gone", b"old".to_vec()).unwrap();

        let mut batch = WriteBatch::new();
        batch.put(b"k".to_vec(), b"v1".to_vec());
        batch.put(b"k".to_vec(), b"v2".to_vec());
        batch.put(b"gone".to_vec(), b"new".to_vec());
        batch.delete(b"gone".to_vec());
        batch.delete(b"back".to_vec());
        batch.put(b"back".to_vec(), b"here".to_vec());
        db.apply_batch(batch.into_sled()).unwrap();

        assert_eq!(db.get(b"k").unwrap().unwrap().to_vec(), b"v2".to_vec());
        assert!(db.get(b"gone").unwrap().is_none());
        assert_eq!(db.get(b"back").unwrap().unwrap().to_vec(), b"here".to_vec());
    }
}
