use crate::{transform, BatchCapacity, CartesianPoint, SphericalRecord, WireRecord};

/// Fixed capacity storage for one batch of records and their packed bytes.
///
/// Allocated once per conversion, cleared between batches and never grown.
pub struct RecordBuffer<T> {
    capacity: usize,
    pub(crate) records: Vec<T>,
    pub(crate) bytes: Vec<u8>,
}

impl<T: WireRecord> RecordBuffer<T> {
    pub fn new(capacity: BatchCapacity) -> Self {
        let capacity = *capacity;
        Self {
            capacity,
            records: Vec::with_capacity(capacity),
            bytes: Vec::with_capacity(capacity * T::SIZE),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn byte_capacity(&self) -> usize {
        self.capacity * T::SIZE
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.bytes.clear();
    }

    /// Replaces the content of the buffer. Panics if `records` exceeds the capacity.
    #[cfg(test)]
    pub(crate) fn fill_from(&mut self, records: impl IntoIterator<Item = T>) {
        self.clear();
        for record in records {
            assert!(
                self.records.len() < self.capacity,
                "RecordBuffer capacity ({}) exceeded",
                self.capacity
            );
            self.records.push(record);
        }
    }
}

/// Input and output buffers owned by a single conversion run
pub struct BatchBuffers {
    pub input: RecordBuffer<SphericalRecord>,
    pub output: RecordBuffer<CartesianPoint>,
}

impl BatchBuffers {
    pub fn new(capacity: BatchCapacity) -> Self {
        Self {
            input: RecordBuffer::new(capacity),
            output: RecordBuffer::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.input.capacity()
    }

    /// Transforms every decoded input record into the output buffer, keeping the order
    pub fn transform_into_output(&mut self) -> usize {
        self.output.clear();
        self.output
            .records
            .extend(self.input.records.iter().copied().map(transform));
        self.output.len()
    }
}
