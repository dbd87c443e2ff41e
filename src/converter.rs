use std::{
    fs::File,
    io::{self, BufWriter, Cursor, Read, Write},
};

use serde::Serialize;

use crate::{
    decode_batch, encode_batch, BatchBuffers, BatchCapacity, BatchStatus, CartesianPoint,
    ConvertError, DecodedBatch, Side, SphericalRecord, WireRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionState {
    Opening,
    Processing,
    Draining,
    Closing,
    Done,
    Failed,
}

impl ConversionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversionState::Done | ConversionState::Failed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub records: u64,
    pub batches: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Destination which can report errors when it is released.
///
/// Dropping a `File` silently ignores errors of data which was not yet persisted.
pub trait OutputSink: Write {
    fn close(self) -> io::Result<()>;
}

impl OutputSink for File {
    fn close(mut self) -> io::Result<()> {
        self.flush()?;
        // Devices and pipes can't be synced
        if self.metadata()?.is_file() {
            self.sync_all()
        } else {
            Ok(())
        }
    }
}

impl<W: OutputSink> OutputSink for BufWriter<W> {
    fn close(self) -> io::Result<()> {
        self.into_inner()
            .map_err(io::IntoInnerError::into_error)?
            .close()
    }
}

impl OutputSink for Vec<u8> {
    fn close(self) -> io::Result<()> {
        Ok(())
    }
}

impl OutputSink for Cursor<Vec<u8>> {
    fn close(self) -> io::Result<()> {
        Ok(())
    }
}

/// Converts a stream of `SphericalRecord`s into `CartesianPoint`s, one batch at a time.
///
/// Memory usage only depends on the batch capacity, not on the length of the input.
pub struct StreamConverter<R, W> {
    reader: R,
    writer: W,
    buffers: BatchBuffers,
    state: ConversionState,
    summary: ConversionSummary,
}

impl<R: Read, W: Write> StreamConverter<R, W> {
    /// Both handles are expected to be open already, so the converter starts in `Processing`
    pub fn new(reader: R, writer: W, capacity: BatchCapacity) -> Self {
        log::debug!("Converting with batch capacity {}", *capacity);
        Self {
            reader,
            writer,
            buffers: BatchBuffers::new(capacity),
            state: ConversionState::Processing,
            summary: ConversionSummary::default(),
        }
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }

    pub fn summary(&self) -> &ConversionSummary {
        &self.summary
    }

    fn transition(&mut self, next: ConversionState) {
        if self.state != next {
            log::debug!("{:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn fail(&mut self, err: ConvertError) -> ConvertError {
        log::debug!("Conversion failed after {} records: {err}", self.summary.records);
        self.transition(ConversionState::Failed);
        err
    }

    /// Decodes, transforms and encodes one batch.
    ///
    /// Returns the state after the batch. Calling it in any state but `Processing` does nothing.
    pub fn process_batch(&mut self) -> Result<ConversionState, ConvertError> {
        if self.state != ConversionState::Processing {
            return Ok(self.state);
        }
        let first_record = self.summary.records;

        // Records completed before a read error or truncation are written before failing
        let decoded = decode_batch(&mut self.reader, &mut self.buffers.input, first_record);
        let count = self.buffers.input.len();
        self.summary.bytes_read += (count * SphericalRecord::SIZE) as u64;
        if let Ok(DecodedBatch {
            status: BatchStatus::Exhausted,
            ..
        }) = &decoded
        {
            self.transition(ConversionState::Draining);
        }

        if count > 0 {
            self.buffers.transform_into_output();
            let written =
                match encode_batch(&mut self.writer, &mut self.buffers.output, first_record) {
                    Ok(written) => written,
                    Err(e) => return Err(self.fail(e)),
                };
            self.summary.records += written as u64;
            self.summary.bytes_written += (written * CartesianPoint::SIZE) as u64;
            self.summary.batches += 1;
            log::trace!(
                "Batch {} with {written} records written",
                self.summary.batches
            );
        }

        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(e) => return Err(self.fail(e)),
        };
        if let Some(err) = decoded.truncation_error::<SphericalRecord>() {
            return Err(self.fail(err));
        }
        if self.state == ConversionState::Draining {
            self.transition(ConversionState::Closing);
        }
        Ok(self.state)
    }

    /// Processes batches until the input is exhausted or the first error occurs
    pub fn run(&mut self) -> Result<ConversionSummary, ConvertError> {
        while self.process_batch()? == ConversionState::Processing {}
        Ok(self.summary)
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W: OutputSink> StreamConverter<R, W> {
    /// Runs the conversion and closes both handles
    pub fn finish(mut self) -> Result<ConversionSummary, ConvertError> {
        self.run()?;
        let StreamConverter {
            reader,
            writer,
            summary,
            ..
        } = self;
        drop(reader);
        log::debug!("{:?} -> {:?}", ConversionState::Closing, ConversionState::Done);
        match writer.close() {
            Ok(()) => Ok(summary),
            Err(source) => {
                log::debug!("{:?} -> {:?}", ConversionState::Closing, ConversionState::Failed);
                Err(ConvertError::Close {
                    side: Side::Output,
                    source,
                })
            }
        }
    }
}
