use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    sync::mpsc::Receiver,
};

use log::{error, info};
use serde_jsonlines::JsonLinesWriter;

use crate::{CircleMapError, projection::CircleMapFrame};

/// Write every received frame as one JSON line, to `file` or to stdout.
///
/// Returns the number of frames written once the sending side hangs up.
pub fn write_frames(
    file: Option<&Path>,
    frame_receiver: Receiver<CircleMapFrame>,
) -> Result<usize, CircleMapError> {
    let output: Box<dyn Write> = match file {
        Some(path) => Box::new(
            File::create(path).map_err(|e| CircleMapError::WriterError { source: e })?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut frame_writer = JsonLinesWriter::new(BufWriter::new(output));

    let mut written = 0;
    for frame in &frame_receiver {
        match frame_writer.write(&frame) {
            Ok(()) => written += 1,
            Err(e) => error!("Error while writing frame to output: {}", e),
        }
    }
    frame_writer
        .flush()
        .map_err(|e| CircleMapError::WriterError { source: e })?;
    info!("Wrote {} frames", written);
    Ok(written)
}
