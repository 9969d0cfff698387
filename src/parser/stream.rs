//! Record source backed by a decoder thread.
//!
//! The input is rewound and sniffed up front so that obviously wrong input
//! fails before any record is produced. Decoding then runs on its own thread
//! and hands records over a bounded channel, so consumers see a blocking,
//! ordered, finite iterator. Lines that do not decode are skipped; only a
//! read error ends the stream early.

use super::schema::{decode_record, Record};
use crate::utils::cancel::CancelToken;
use crate::utils::config::RECORD_CHANNEL_CAPACITY;
use crate::utils::error::SourceError;
use log::{debug, warn};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

/// Totals reported by [`RecordStream::finish`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Records handed to the consumer
    pub records: usize,

    /// Non-blank lines that did not decode
    pub skipped_lines: usize,
}

/// Lazy sequence of decoded records
///
/// Iterate it (usually by `&mut`) to pull records, then call
/// [`RecordStream::finish`] to learn whether decoding stopped cleanly.
#[derive(Debug)]
pub struct RecordStream {
    receiver: Receiver<Record>,
    worker: JoinHandle<Result<StreamSummary, SourceError>>,
}

impl RecordStream {
    /// Open a record stream over a seekable input
    ///
    /// **Public** - main entry point of the record source
    ///
    /// # Arguments
    /// * `input` - Newline-delimited JSON records
    /// * `token` - Checked before each record; once cancelled no more
    ///   records are produced
    ///
    /// # Errors
    /// * `SourceError::Io` - the input cannot be rewound or read
    /// * `SourceError::EmptyInput` - no non-whitespace content
    /// * `SourceError::InvalidHeader` - content does not open a JSON object
    pub fn open<R>(mut input: R, token: CancelToken) -> Result<Self, SourceError>
    where
        R: Read + Seek + Send + 'static,
    {
        check_header(&mut input)?;

        let (sender, receiver) = mpsc::sync_channel(RECORD_CHANNEL_CAPACITY);
        let worker = thread::Builder::new()
            .name("record-decoder".to_string())
            .spawn(move || {
                let result = decode_lines(BufReader::new(input), &sender, &token);
                if let Err(e) = &result {
                    debug!("Record stream stopped: {}", e);
                }
                result
            })?;

        Ok(Self { receiver, worker })
    }

    /// Stop consuming and wait for the decoder thread
    ///
    /// Records not yet pulled are discarded.
    ///
    /// # Errors
    /// * `SourceError::Io` - reading stopped part-way through the input
    /// * `SourceError::WorkerPanicked` - the decoder thread died
    pub fn finish(self) -> Result<StreamSummary, SourceError> {
        let Self { receiver, worker } = self;
        // Unblocks a decoder waiting on a full channel
        drop(receiver);
        worker.join().map_err(|_| SourceError::WorkerPanicked)?
    }
}

impl Iterator for RecordStream {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.receiver.recv().ok()
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Rewind the input and require its first non-whitespace byte, after an
/// optional UTF-8 BOM, to be `{`
///
/// **Private** - setup check for `RecordStream::open`
fn check_header<R: Read + Seek>(input: &mut R) -> Result<(), SourceError> {
    input.seek(SeekFrom::Start(0))?;

    let mut bom = [0u8; 3];
    let read = read_up_to(input, &mut bom)?;
    if &bom[..read] != UTF8_BOM {
        input.seek(SeekFrom::Start(0))?;
    }

    let mut buf = [0u8; 512];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            return Err(SourceError::EmptyInput);
        }
        if let Some(&first) = buf[..n].iter().find(|b| !b.is_ascii_whitespace()) {
            if first != b'{' {
                return Err(SourceError::InvalidHeader(first as char));
            }
            break;
        }
    }

    input.seek(SeekFrom::Start(0))?;
    Ok(())
}

/// Fill as much of `buf` as the input allows
fn read_up_to<R: Read>(input: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Decode lines and push them into the channel until input ends,
/// the token is cancelled, or the consumer goes away
///
/// **Private** - body of the decoder thread
fn decode_lines<R: BufRead>(
    reader: R,
    sender: &SyncSender<Record>,
    token: &CancelToken,
) -> Result<StreamSummary, SourceError> {
    let mut summary = StreamSummary::default();

    for (index, line) in reader.lines().enumerate() {
        if token.is_cancelled() {
            debug!("Cancellation observed after {} records", summary.records);
            break;
        }

        let record = match decode_record(&line?, index + 1) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping line: {}", e);
                summary.skipped_lines += 1;
                continue;
            }
        };

        if sender.send(record).is_err() {
            debug!("Record consumer hung up after {} records", summary.records);
            break;
        }
        summary.records += 1;
    }

    debug!(
        "Decoder finished: {} records, {} lines skipped",
        summary.records, summary.skipped_lines
    );
    Ok(summary)
}
