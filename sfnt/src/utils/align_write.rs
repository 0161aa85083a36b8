use std::io::{self, Write};

/// A writer that keeps track of the number of bytes written, so that the output can be padded
/// with zeros to a multiple of `align` afterwards.
pub struct AlignWrite<W: Write> {
    inner: W,
    align: usize,
    written: usize,
}

impl<W> AlignWrite<W>
where
    W: Write,
{
    pub fn new(inner: W, align: usize) -> Self {
        AlignWrite {
            inner,
            align,
            written: 0,
        }
    }

    /// Bytes written so far, including padding.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Pads the output to the next multiple of `align`. Returns the number of padding bytes.
    pub fn pad(&mut self) -> Result<usize, io::Error> {
        let rest = self.written % self.align;
        if rest == 0 {
            return Ok(0);
        }
        let padding = self.align - rest;
        self.write_all(&vec![0; padding])?;
        Ok(padding)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W> Write for AlignWrite<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        let n = self.inner.write(buf)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_align_write_pad() {
        let mut wr = AlignWrite::new(Vec::new(), 4);
        wr.write_all(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(wr.pad().unwrap(), 3);
        assert_eq!(wr.pad().unwrap(), 0);
        wr.write_all(&[6]).unwrap();
        assert_eq!(wr.written(), 9);
        assert_eq!(wr.into_inner(), vec![1, 2, 3, 4, 5, 0, 0, 0, 6]);
    }
}
