use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Deserialize, LEN_TYPE_SIZE, LenType, MAX_FRAME_LEN};

/// The receiving end handle of the communication.
pub struct OnoReceiver<R: AsyncRead + Unpin> {
    rx: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> OnoReceiver<R> {
    /// Creates a new `OnoReceiver` instance.
    ///
    /// # Arguments
    /// * `rx` - The underlying reader.
    pub(super) fn new(rx: R) -> Self {
        Self {
            rx,
            buf: Vec::new(),
        }
    }

    /// Waits to receive the next message.
    ///
    /// # Returns
    /// A result object that returns `T` on success or `io::Error` on failure. An
    /// `UnexpectedEof` error means the peer closed the channel before a full frame arrived.
    pub async fn recv<T: Deserialize>(&mut self) -> io::Result<T> {
        let Self { rx, buf } = self;
        read_frame(rx, buf).await?;
        T::deserialize(buf)
    }
}

/// Reads one frame's payload into `buf`, replacing its contents.
async fn read_frame<R>(rx: &mut R, buf: &mut Vec<u8>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut size_buf = [0; LEN_TYPE_SIZE];
    rx.read_exact(&mut size_buf).await?;
    let len = LenType::from_be_bytes(size_buf);

    let len = match usize::try_from(len) {
        Ok(len) if len <= MAX_FRAME_LEN => len,
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame of {len} bytes exceeds the {MAX_FRAME_LEN} bytes limit"),
            ));
        }
    };

    buf.clear();
    buf.resize(len, 0);
    rx.read_exact(buf).await?;

    Ok(())
}
