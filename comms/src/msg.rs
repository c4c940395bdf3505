//! The two messages exchanged between the coordinator and a worker.
//!
//! A partition assignment travels coordinator -> worker exactly once, a result travels
//! worker -> coordinator exactly once. Both payloads are fixed-width big-endian words.

use std::{io, ops::Range};

use crate::{Deserialize, Serialize};

type Word = u64;
const WORD_SIZE: usize = size_of::<Word>();

/// A contiguous, possibly empty slice of the test set's index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Partition {
    pub start: usize,
    pub len: usize,
}

impl Partition {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last index covered by this partition.
    #[inline]
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The count of correctly classified items a worker reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerResult {
    pub correct_count: u64,
}

impl WorkerResult {
    pub fn new(correct_count: u64) -> Self {
        Self { correct_count }
    }
}

impl Serialize for Partition {
    fn serialize(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.start as Word).to_be_bytes());
        buf.extend_from_slice(&(self.len as Word).to_be_bytes());
    }
}

impl Deserialize for Partition {
    fn deserialize(buf: &[u8]) -> io::Result<Self> {
        let [start, len] = read_words("partition", buf)?;
        Ok(Self {
            start: to_index(start)?,
            len: to_index(len)?,
        })
    }
}

impl Serialize for WorkerResult {
    fn serialize(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.correct_count.to_be_bytes());
    }
}

impl Deserialize for WorkerResult {
    fn deserialize(buf: &[u8]) -> io::Result<Self> {
        let [correct_count] = read_words("worker result", buf)?;
        Ok(Self { correct_count })
    }
}

fn read_words<const N: usize>(what: &str, buf: &[u8]) -> io::Result<[Word; N]> {
    if buf.len() != N * WORD_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{what} payload must be {} bytes, got {}",
                N * WORD_SIZE,
                buf.len()
            ),
        ));
    }

    let mut words = [0; N];
    let mut bytes = [0; WORD_SIZE];
    for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(WORD_SIZE)) {
        bytes.copy_from_slice(chunk);
        *word = Word::from_be_bytes(bytes);
    }

    Ok(words)
}

fn to_index(word: Word) -> io::Result<usize> {
    usize::try_from(word).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_payload_is_two_words() {
        let partition = Partition::new(3, 7);
        let mut buf = Vec::new();
        partition.serialize(&mut buf);

        assert_eq!(buf.len(), 2 * WORD_SIZE);
        assert_eq!(&buf[..WORD_SIZE], &3u64.to_be_bytes());
        assert_eq!(&buf[WORD_SIZE..], &7u64.to_be_bytes());
        assert_eq!(Partition::deserialize(&buf).unwrap(), Partition::new(3, 7));
    }

    #[test]
    fn result_payload_is_one_word() {
        let mut buf = Vec::new();
        WorkerResult::new(42).serialize(&mut buf);

        assert_eq!(buf, 42u64.to_be_bytes());
        assert_eq!(WorkerResult::deserialize(&buf).unwrap().correct_count, 42);
    }

    #[test]
    fn wrong_payload_length_is_invalid_data() {
        let err = WorkerResult::deserialize(&[0; 16]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err = Partition::deserialize(&[0; 8]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn partition_range() {
        let p = Partition::new(4, 3);
        assert_eq!(p.range(), 4..7);
        assert!(!p.is_empty());
        assert!(Partition::new(9, 0).is_empty());
    }
}
