/// Turns a message into its wire payload.
pub trait Serialize {
    /// Appends the payload to `buf`.
    fn serialize(&self, buf: &mut Vec<u8>);
}
