use std::io;

/// Rebuilds a message from a complete wire payload.
pub trait Deserialize: Sized {
    fn deserialize(buf: &[u8]) -> io::Result<Self>;
}
