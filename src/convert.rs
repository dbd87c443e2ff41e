use std::{fs::File, path::Path};

use crate::{
    ConversionState, ConversionSummary, ConvertError, ConverterConfig, Side, StreamConverter,
};

/// Conventional output location, relative to the working directory of the caller
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "output.bin";

/// Converts the spherical records in `input` into cartesian points in `output`.
///
/// `output` is created or truncated. On failure everything written up to that point stays on disk.
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<ConversionSummary, ConvertError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    log::debug!(
        "{:?}: {input:?} -> {output:?}",
        ConversionState::Opening
    );

    let reader = File::open(input).map_err(|source| ConvertError::Open {
        side: Side::Input,
        path: input.to_path_buf(),
        source,
    })?;
    // The input handle is released when `reader` goes out of scope
    let writer = File::create(output).map_err(|source| ConvertError::Open {
        side: Side::Output,
        path: output.to_path_buf(),
        source,
    })?;

    let summary = StreamConverter::new(reader, writer, config.batch_capacity).finish()?;
    log::info!(
        "Converted {} records from {input:?} into {output:?} ({} batches)",
        summary.records,
        summary.batches
    );
    Ok(summary)
}

/// Status code wrapper around [`convert_file`] with the default configuration.
///
/// Returns 0 on success. Failures are logged and mapped to [`ConvertError::exit_code`].
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> i32 {
    match convert_file(input, output, &ConverterConfig::default()) {
        Ok(_) => 0,
        Err(e) => {
            log::error!("{e}");
            e.exit_code()
        }
    }
}
