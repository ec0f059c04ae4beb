/// A byte-oriented duplex port, typically a UART. The board's HAL provides
/// the implementation; the crate only ever writes whole sentences and reads
/// whatever bytes have arrived.
pub trait Serial {
    type Error;

    /// Write all of `buf`.
    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Read up to `buf.len()` bytes, returning how many were read. Must
    /// wait for at least one byte rather than returning 0.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T> Serial for &mut T
where
    T: Serial,
{
    type Error = T::Error;

    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (*self).write(buf).await
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (*self).read(buf).await
    }
}
