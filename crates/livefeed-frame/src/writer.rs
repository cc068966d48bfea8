use std::io::{ErrorKind, Write};

use bytes::{Bytes, BytesMut};

use crate::codec::{encode_record, Record};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete records to any `Write` sink.
pub struct RecordWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> RecordWriter<T> {
    /// Create a new record writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write a complete record (blocking).
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.buf.clear();
        encode_record(record, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Encode and send a configuration payload.
    pub fn send_config(&mut self, payload: &[u8]) -> Result<()> {
        self.write_record(&Record::config(Bytes::copy_from_slice(payload)))
    }

    /// Encode and send a media payload with its presentation timestamp.
    pub fn send(&mut self, pts: u64, payload: &[u8]) -> Result<()> {
        self.write_record(&Record::media(pts, Bytes::copy_from_slice(payload)))
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::{decode_record, CONFIG_TIMESTAMP, HEADER_SIZE};
    use crate::reader::RecordReader;

    #[test]
    fn write_media_record() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(5, &[0x11, 0x22]).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(
            wire,
            [0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 2, 0x11, 0x22].to_vec()
        );
    }

    #[test]
    fn write_config_record() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send_config(&[0xAA, 0xBB, 0xCC]).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[..8], &CONFIG_TIMESTAMP.to_be_bytes());
        assert_eq!(&wire[8..HEADER_SIZE], &[0, 0, 0, 3]);
        assert_eq!(&wire[HEADER_SIZE..], &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn write_multiple_records() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send_config(b"pps").unwrap();
        writer.send(1, b"one").unwrap();
        writer.send(2, b"two").unwrap();

        let mut wire = BytesMut::from(writer.into_inner().into_inner().as_slice());
        let r1 = decode_record(&mut wire, usize::MAX).unwrap().unwrap();
        let r2 = decode_record(&mut wire, usize::MAX).unwrap().unwrap();
        let r3 = decode_record(&mut wire, usize::MAX).unwrap().unwrap();

        assert_eq!((r1.pts, r1.payload.as_ref()), (None, b"pps".as_ref()));
        assert_eq!((r2.pts, r2.payload.as_ref()), (Some(1), b"one".as_ref()));
        assert_eq!((r3.pts, r3.payload.as_ref()), (Some(2), b"two".as_ref()));
    }

    #[test]
    fn reserved_timestamp_rejected() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        let err = writer.send(CONFIG_TIMESTAMP, b"x").unwrap_err();
        assert!(matches!(err, FrameError::ReservedTimestamp));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn written_bytes_read_back() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_record(&Record::media(3, &b"z"[..])).unwrap();

        let wire = writer.into_inner().into_inner();
        let mut reader = RecordReader::new(Cursor::new(wire));
        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.pts, Some(3));
        assert_eq!(record.payload.as_ref(), b"z");
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = RecordWriter::new(sink);

        writer.send(1, b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(writer.get_mut().data.len(), HEADER_SIZE + 1);
    }

    struct InterruptedOnce {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn handles_interrupted_write() {
        let mut writer = RecordWriter::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });
        writer.send(5, b"retry").unwrap();
        assert_eq!(writer.into_inner().data.len(), HEADER_SIZE + 5);
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_zero_is_an_error() {
        let mut writer = RecordWriter::new(ZeroWriter);
        let err = writer.send(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }
}
