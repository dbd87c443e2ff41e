use std::io::{self, ErrorKind, Read, Write};

use crate::{field_at, ConvertError, RecordBuffer, WireRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// The buffer was filled completely, more input may follow
    Full,
    /// Input ended on a record boundary
    Exhausted,
    /// Input ended in the middle of `record`
    Truncated {
        record: u64,
        field: &'static str,
        available: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedBatch {
    pub count: usize,
    pub status: BatchStatus,
}

impl DecodedBatch {
    pub fn truncation_error<T: WireRecord>(&self) -> Option<ConvertError> {
        match self.status {
            BatchStatus::Truncated {
                record,
                field,
                available,
            } => Some(ConvertError::TruncatedRecord {
                record,
                field,
                available,
                expected: T::SIZE,
            }),
            BatchStatus::Full | BatchStatus::Exhausted => None,
        }
    }
}

/// Reads up to `buffer.capacity()` records.
///
/// Complete records are decoded into `buffer` even if the input is truncated or fails afterwards,
/// so the caller decides what happens to them. `first_record` is the index of the first record of
/// this batch within the whole stream and is only used to describe errors.
pub fn decode_batch<T: WireRecord, R: Read>(
    reader: &mut R,
    buffer: &mut RecordBuffer<T>,
    first_record: u64,
) -> Result<DecodedBatch, ConvertError> {
    buffer.clear();
    buffer.bytes.resize(buffer.byte_capacity(), 0);

    let (filled, failure) = match read_up_to(reader, &mut buffer.bytes) {
        Ok(filled) => (filled, None),
        Err((filled, source)) => (filled, Some(source)),
    };
    buffer.bytes.truncate(filled);

    let count = filled / T::SIZE;
    let remainder = filled % T::SIZE;
    buffer.records.extend(
        buffer.bytes[..count * T::SIZE]
            .chunks_exact(T::SIZE)
            .map(T::decode),
    );

    if let Some(source) = failure {
        return Err(ConvertError::Read {
            record: first_record + count as u64,
            field: field_at(T::FIELDS, remainder).name,
            source,
        });
    }

    let status = if remainder != 0 {
        BatchStatus::Truncated {
            record: first_record + count as u64,
            field: field_at(T::FIELDS, remainder).name,
            available: remainder,
        }
    } else if count == buffer.capacity() {
        BatchStatus::Full
    } else {
        BatchStatus::Exhausted
    };
    Ok(DecodedBatch { count, status })
}

/// Writes all records of `buffer`, returns the number of records written.
pub fn encode_batch<T: WireRecord, W: Write>(
    writer: &mut W,
    buffer: &mut RecordBuffer<T>,
    first_record: u64,
) -> Result<usize, ConvertError> {
    buffer.bytes.clear();
    for record in &buffer.records {
        record.encode(&mut buffer.bytes);
    }
    debug_assert_eq!(buffer.records.len() * T::SIZE, buffer.bytes.len());

    write_counted(writer, &buffer.bytes).map_err(|(written, source)| ConvertError::Write {
        record: first_record + (written / T::SIZE) as u64,
        field: field_at(T::FIELDS, written % T::SIZE).name,
        source,
    })?;
    Ok(buffer.records.len())
}

/// Like `read_exact`, but stops at the end of the stream and reports how far it got
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize, (usize, io::Error)> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err((filled, e)),
        }
    }
    Ok(filled)
}

/// Like `write_all`, but reports how many bytes were accepted before the failure
fn write_counted(writer: &mut impl Write, buf: &[u8]) -> Result<(), (usize, io::Error)> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => {
                return Err((
                    written,
                    io::Error::new(ErrorKind::WriteZero, "failed to write whole buffer"),
                ))
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err((written, e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{BatchCapacity, CartesianPoint, SphericalRecord};

    use super::*;

    fn records(n: u32) -> Vec<SphericalRecord> {
        (0..n)
            .map(|i| SphericalRecord {
                scan_number: i,
                x_angle_deg: i as f32 * 0.5,
                y_angle_deg: 90. - i as f32,
                distance_m: 1. + i as f32,
                intensity: (i * 3) as u16,
            })
            .collect()
    }

    fn to_bytes(records: &[SphericalRecord]) -> Vec<u8> {
        let mut out = Vec::new();
        for r in records {
            r.encode(&mut out);
        }
        out
    }

    fn buffer<T: WireRecord>(capacity: usize) -> RecordBuffer<T> {
        RecordBuffer::new(BatchCapacity::try_from(capacity).unwrap())
    }

    /// Hands out at most one byte per call and is interrupted every other call
    struct Trickle<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(ErrorKind::Interrupted.into());
            }
            match (self.data.split_first(), buf.first_mut()) {
                (Some((first, rest)), Some(target)) => {
                    *target = *first;
                    self.data = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    /// Accepts `budget` bytes, then fails
    struct Full {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for Full {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(ErrorKind::Other, "No space left on device"));
            }
            let n = buf.len().min(self.budget).min(7);
            self.budget -= n;
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn decode_full_then_exhausted() {
        let input = records(5);
        let bytes = to_bytes(&input);
        let mut reader = bytes.as_slice();
        let mut buf = buffer::<SphericalRecord>(3);

        let first = decode_batch(&mut reader, &mut buf, 0).unwrap();
        assert_eq!(3, first.count);
        assert_eq!(BatchStatus::Full, first.status);
        assert_eq!(&input[..3], buf.records());

        let second = decode_batch(&mut reader, &mut buf, 3).unwrap();
        assert_eq!(2, second.count);
        assert_eq!(BatchStatus::Exhausted, second.status);
        assert_eq!(&input[3..], buf.records());

        let third = decode_batch(&mut reader, &mut buf, 5).unwrap();
        assert_eq!(0, third.count);
        assert_eq!(BatchStatus::Exhausted, third.status);
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_truncated_keeps_complete_records() {
        let mut bytes = to_bytes(&records(2));
        bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
        let mut buf = buffer::<SphericalRecord>(8);

        let batch = decode_batch(&mut bytes.as_slice(), &mut buf, 10).unwrap();
        assert_eq!(2, batch.count);
        assert_eq!(
            BatchStatus::Truncated {
                record: 12,
                field: "x_angle_deg",
                available: 5
            },
            batch.status
        );
        let err = batch.truncation_error::<SphericalRecord>().unwrap();
        assert!(matches!(
            err,
            ConvertError::TruncatedRecord {
                record: 12,
                expected: 18,
                ..
            }
        ));
    }

    #[test]
    fn decode_junk_smaller_than_record() {
        let junk = b"some junk\0\0\0\0\0\0\0";
        assert_eq!(16, junk.len());
        let mut buf = buffer::<SphericalRecord>(4);
        let batch = decode_batch(&mut junk.as_slice(), &mut buf, 0).unwrap();
        assert_eq!(0, batch.count);
        assert_eq!(
            BatchStatus::Truncated {
                record: 0,
                field: "intensity",
                available: 16
            },
            batch.status
        );
    }

    #[test]
    fn decode_from_fragmented_reader() {
        let input = records(4);
        let bytes = to_bytes(&input);
        let mut reader = Trickle {
            data: &bytes,
            interrupt: false,
        };
        let mut buf = buffer::<SphericalRecord>(4);
        let batch = decode_batch(&mut reader, &mut buf, 0).unwrap();
        assert_eq!(4, batch.count);
        assert_eq!(BatchStatus::Full, batch.status);
        assert_eq!(input.as_slice(), buf.records());
    }

    #[test]
    fn decode_read_error_names_record() {
        struct Broken(usize);
        impl Read for Broken {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0 == 0 {
                    return Err(io::Error::new(ErrorKind::Other, "device gone"));
                }
                let n = self.0.min(buf.len());
                self.0 -= n;
                Ok(n)
            }
        }
        let mut buf = buffer::<SphericalRecord>(4);
        let err = decode_batch(&mut Broken(18 + 9), &mut buf, 0).unwrap_err();
        assert_eq!(Some(1), err.record());
        assert_eq!(Some("y_angle_deg"), err.field());
        // The record completed before the failure is still available
        assert_eq!(1, buf.len());
    }

    #[test]
    fn encode_writes_all_records() {
        let mut buf = buffer::<CartesianPoint>(3);
        buf.fill_from((0..3).map(|i| CartesianPoint {
            scan_number: i,
            x: 1.,
            y: 2.,
            z: 3.,
            intensity: 4,
        }));
        let mut out = Vec::new();
        assert_eq!(3, encode_batch(&mut out, &mut buf, 0).unwrap());
        assert_eq!(3 * 18, out.len());

        let mut decoded = buffer::<CartesianPoint>(3);
        decode_batch(&mut out.as_slice(), &mut decoded, 0).unwrap();
        assert_eq!(buf.records(), decoded.records());
    }

    #[test]
    fn encode_failure_names_record_and_field() {
        let mut buf = buffer::<CartesianPoint>(4);
        buf.fill_from([CartesianPoint::default(); 4]);
        let mut sink = Full {
            budget: 18 * 2 + 13,
            written: Vec::new(),
        };
        let err = encode_batch(&mut sink, &mut buf, 100).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Write {
                record: 102,
                field: "z",
                ..
            }
        ));
        assert_eq!(18 * 2 + 13, sink.written.len());
    }

    #[test]
    fn encode_write_zero_is_an_error() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut buf = buffer::<CartesianPoint>(1);
        buf.fill_from([CartesianPoint::default()]);
        let err = encode_batch(&mut Closed, &mut buf, 0).unwrap_err();
        match err {
            ConvertError::Write { record, field, source } => {
                assert_eq!(0, record);
                assert_eq!("scan_number", field);
                assert_eq!(ErrorKind::WriteZero, source.kind());
            }
            e => panic!("Unexpected error {e}"),
        }
    }
}
