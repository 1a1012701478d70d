//! Device source seam.
//!
//! The pipeline consumes opaque byte buffers of a known maximum size;
//! device discovery and mode switching happen outside the core. A plain
//! file-backed source covers both the kernel character device and replaying
//! recorded dumps.

use crate::error::Result;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Producer of raw device buffers.
pub trait DeviceSource {
    /// The maximum size of one raw buffer.
    fn buffer_size(&self) -> usize;

    /// Reads the next buffer. Returns the number of bytes read; 0 means the
    /// source is exhausted.
    fn read_frame(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

/// Source reading fixed-size frames from a file.
///
/// Works against the IPTS character device as well as raw dump files
/// recorded from one.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    buffer_size: usize,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P, buffer_size: usize) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
            buffer_size,
        })
    }
}

impl DeviceSource for FileSource {
    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn read_frame(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut total = 0;

        // A device read returns one full buffer; a dump file may end with a
        // short tail, which is passed through as-is.
        while total < buffer.len() {
            match self.file.read(&mut buffer[total..])? {
                0 => break,
                n => total += n,
            }
        }

        Ok(total)
    }
}

/// Source replaying queued buffers, for testing.
#[derive(Debug, Default)]
pub struct MockSource {
    frames: VecDeque<Vec<u8>>,
    buffer_size: usize,
}

impl MockSource {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            frames: VecDeque::new(),
            buffer_size,
        }
    }

    /// Queues one buffer to be returned by a later read.
    pub fn push_frame(&mut self, data: &[u8]) {
        self.frames.push_back(data.to_vec());
    }
}

impl DeviceSource for MockSource {
    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn read_frame(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(0);
        };

        let size = frame.len().min(buffer.len());
        buffer[..size].copy_from_slice(&frame[..size]);
        Ok(size)
    }
}
