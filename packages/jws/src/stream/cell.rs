//! Write-once, close-once input accumulator

use crate::api::KeyMaterial;
use crate::error::{JwsError, JwsResult};
use crate::types::Payload;
use zeroize::Zeroizing;

/// Value produced from the bytes accumulated in a cell
pub trait CellValue: Sized {
    /// Build the value from everything written before close
    fn from_buffer(buffer: Vec<u8>) -> Self;
}

impl CellValue for KeyMaterial {
    fn from_buffer(buffer: Vec<u8>) -> Self {
        KeyMaterial::Bytes(buffer)
    }
}

impl CellValue for Payload {
    fn from_buffer(buffer: Vec<u8>) -> Self {
        Payload::Bytes(buffer)
    }
}

impl CellValue for String {
    fn from_buffer(buffer: Vec<u8>) -> Self {
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Input that buffers chunks until closed
///
/// A cell is either filled with a complete value up front or fed chunk by chunk.
/// Either way it closes exactly once; later writes fail with `InputClosed`.
pub struct InputCell<T> {
    name: &'static str,
    buffer: Zeroizing<Vec<u8>>,
    preset: Option<T>,
    closed: bool,
}

impl<T: CellValue> InputCell<T> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            buffer: Zeroizing::new(Vec::new()),
            preset: None,
            closed: false,
        }
    }

    /// Input name used in errors and traces
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the cell still accepts data
    pub fn is_writable(&self) -> bool {
        !self.closed
    }

    pub(crate) fn write(&mut self, chunk: &[u8]) -> JwsResult<()> {
        if self.closed {
            return Err(JwsError::InputClosed(self.name));
        }
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    pub(crate) fn close(&mut self) -> JwsResult<()> {
        if self.closed {
            return Err(JwsError::InputClosed(self.name));
        }
        self.closed = true;
        tracing::trace!(input = self.name, "input closed");
        Ok(())
    }

    /// Store a complete value and close
    pub(crate) fn fill(&mut self, value: T) -> JwsResult<()> {
        self.close()?;
        self.preset = Some(value);
        Ok(())
    }

    /// Hand over the accumulated value; only called once, at finalize
    pub(crate) fn take(&mut self) -> T {
        self.preset
            .take()
            .unwrap_or_else(|| T::from_buffer(std::mem::take(&mut *self.buffer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_accumulate_until_close() {
        let mut cell = InputCell::<String>::new("signature");
        cell.write(b"abc.").expect("open");
        cell.write(b"def").expect("open");
        cell.close().expect("first close");
        assert!(!cell.is_writable());
        assert_eq!(cell.take(), "abc.def");
    }

    #[test]
    fn closed_cell_rejects_writes_and_second_close() {
        let mut cell = InputCell::<Payload>::new("payload");
        cell.fill(Payload::from("preset")).expect("fill");
        assert_eq!(cell.write(b"late"), Err(JwsError::InputClosed("payload")));
        assert_eq!(cell.close(), Err(JwsError::InputClosed("payload")));
        assert_eq!(cell.take(), Payload::from("preset"));
    }

    #[test]
    fn streamed_key_becomes_bytes() {
        let mut cell = InputCell::<KeyMaterial>::new("key");
        cell.write(b"sec").expect("open");
        cell.write(b"ret").expect("open");
        cell.close().expect("close");
        let key = cell.take();
        assert!(matches!(&key, KeyMaterial::Bytes(bytes) if bytes == b"secret"));
    }
}
