use std::io::{ErrorKind, Read};

/// A reader that tolerates interruptions.
///
/// Signal handlers installed with `SA_RESTART` still interrupt some system
/// calls. This reader simply retries them, which suits reads that must not
/// time out.
pub(crate) struct DoggedReader<R> {
    inner: R,
}

impl<R> DoggedReader<R> {
    /// Create a new dogged reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for DoggedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
