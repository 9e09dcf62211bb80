//! Stored zip writer
//!
//! Writes a classic (non-Zip64) zip container whose entries all use the
//! stored method. Each entry is streamed once: the local header is written
//! with a zero CRC and sizes, the data follows, and the header is patched in
//! place when the entry is finished.
//!
//! Record layouts (all little endian):
//! - Local file header:  PK 03 04, 30 bytes + name
//! - Central directory:  PK 01 02, 46 bytes + name + comment
//! - End of central dir: PK 05 06, 22 bytes

use std::collections::HashSet;
use std::io::{self, Seek, SeekFrom, Write};
use std::time::SystemTime;

use byteorder::{LittleEndian, WriteBytesExt};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike};
use crc32fast::Hasher;
use log::trace;

use crate::errors::{Result, archive_limit_error, archive_write_error};

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

/// Version 1.0 is enough for stored entries.
const VERSION_NEEDED: u16 = 10;
/// Upper byte 3 = Unix, lower byte 20 = spec version 2.0.
const VERSION_MADE_BY: u16 = (3 << 8) | 20;
const METHOD_STORED: u16 = 0;
const FLAG_UTF8: u16 = 1 << 11;
/// Regular file, rw-r--r--
const EXTERNAL_ATTRIBUTES: u32 = 0o100644 << 16;

/// Offset of the CRC field inside a local file header
const LOCAL_HEADER_CRC_OFFSET: u64 = 14;

const MAX_CLASSIC_SIZE: u64 = u32::MAX as u64;
const MAX_CLASSIC_ENTRIES: usize = u16::MAX as usize;

/// Modification timestamp in MS-DOS format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub date: u16,
    pub time: u16,
}

impl Default for DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant
    fn default() -> Self {
        DosDateTime {
            date: (1 << 5) | 1,
            time: 0,
        }
    }
}

impl DosDateTime {
    /// Converts a local date and time, clamping to the 1980..=2107 range
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        let year = datetime.year();
        if year < 1980 {
            return DosDateTime::default();
        }
        if year > 2107 {
            return DosDateTime {
                date: (127 << 9) | (12 << 5) | 31,
                time: (23 << 11) | (59 << 5) | 29,
            };
        }

        let date = (((year - 1980) as u16) << 9)
            | ((datetime.month() as u16) << 5)
            | datetime.day() as u16;
        // Two-second resolution
        let time = ((datetime.hour() as u16) << 11)
            | ((datetime.minute() as u16) << 5)
            | (datetime.second() as u16 / 2);

        DosDateTime { date, time }
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        let local: DateTime<Local> = time.into();
        DosDateTime::from_naive(local.naive_local())
    }
}

/// Central directory record kept until the archive is finished
#[derive(Debug)]
struct CentralRecord {
    name: String,
    comment: String,
    flags: u16,
    modified: DosDateTime,
    crc: u32,
    size: u32,
    header_offset: u32,
}

/// The entry currently receiving data
struct OpenEntry {
    index: usize,
    hasher: Hasher,
    size: u64,
}

/// Zip writer producing stored (uncompressed) entries with comments
pub struct StoredZipWriter<W: Write + Seek> {
    inner: W,
    records: Vec<CentralRecord>,
    names: HashSet<String>,
    current: Option<OpenEntry>,
    position: u64,
}

impl<W: Write + Seek> StoredZipWriter<W> {
    /// Creates a writer emitting the archive at the current end of `inner`
    ///
    /// `inner` is expected to be empty; offsets are counted from zero.
    pub fn new(inner: W) -> Self {
        StoredZipWriter {
            inner,
            records: Vec::new(),
            names: HashSet::new(),
            current: None,
            position: 0,
        }
    }

    /// Checks whether an entry with this name was already started
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of entries started so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Starts a new stored entry, finishing the previous one
    ///
    /// Data written to the writer afterwards becomes the content of this
    /// entry.
    ///
    /// # Errors
    /// * Returns an archive write error if the name is already used or the
    ///   header cannot be written
    /// * Returns an archive limit error if a classic zip limit is exceeded
    pub fn start_entry(&mut self, name: &str, comment: &str, modified: DosDateTime) -> Result<()> {
        self.finish_entry()?;

        if self.names.contains(name) {
            return Err(archive_write_error(
                io::Error::new(io::ErrorKind::AlreadyExists, "duplicate entry name"),
                name,
                "create",
            ));
        }
        if self.records.len() >= MAX_CLASSIC_ENTRIES {
            return Err(archive_limit_error(&format!(
                "more than {MAX_CLASSIC_ENTRIES} entries"
            )));
        }
        if name.len() > u16::MAX as usize || comment.len() > u16::MAX as usize {
            return Err(archive_limit_error(&format!(
                "name or comment of entry '{name}' is longer than {} bytes",
                u16::MAX
            )));
        }
        if self.position > MAX_CLASSIC_SIZE {
            return Err(archive_limit_error("archive is larger than 4 GiB"));
        }

        let flags = if name.is_ascii() && comment.is_ascii() {
            0
        } else {
            FLAG_UTF8
        };

        let mut header = Vec::with_capacity(30 + name.len());
        write_local_header(&mut header, name, flags, modified)
            .and_then(|_| self.inner.write_all(&header))
            .map_err(|e| archive_write_error(e, name, "create"))?;

        trace!("Started entry '{}' at offset {}", name, self.position);

        self.records.push(CentralRecord {
            name: name.to_string(),
            comment: comment.to_string(),
            flags,
            modified,
            crc: 0,
            size: 0,
            header_offset: self.position as u32,
        });
        self.names.insert(name.to_string());
        self.position += header.len() as u64;
        self.current = Some(OpenEntry {
            index: self.records.len() - 1,
            hasher: Hasher::new(),
            size: 0,
        });

        Ok(())
    }

    /// Completes the open entry by patching its local header
    ///
    /// Does nothing when no entry is open.
    pub fn finish_entry(&mut self) -> Result<()> {
        let Some(open) = self.current.take() else {
            return Ok(());
        };

        let crc = open.hasher.finalize();
        let size = open.size as u32;
        let record = &mut self.records[open.index];
        record.crc = crc;
        record.size = size;

        let mut patch = Vec::with_capacity(12);
        patch.write_u32::<LittleEndian>(crc)?;
        patch.write_u32::<LittleEndian>(size)?;
        patch.write_u32::<LittleEndian>(size)?;

        let header_offset = record.header_offset as u64;
        let end = self.position;
        self.inner
            .seek(SeekFrom::Start(header_offset + LOCAL_HEADER_CRC_OFFSET))
            .and_then(|_| self.inner.write_all(&patch))
            .and_then(|_| self.inner.seek(SeekFrom::Start(end)))
            .map_err(|e| archive_write_error(e, &record.name, "finish"))?;

        trace!("Finished entry '{}' ({} bytes, crc {:08x})", record.name, size, crc);

        Ok(())
    }

    /// Writes the central directory and returns the underlying writer
    ///
    /// Consumes the writer, so the archive can only be finished once.
    ///
    /// # Errors
    /// Returns an archive write error if the central directory cannot be
    /// written, or an archive limit error if it would not fit a classic zip
    pub fn finish(mut self) -> Result<W> {
        self.finish_entry()?;

        let directory_offset = self.position;
        let mut directory = Vec::new();
        for record in &self.records {
            write_central_header(&mut directory, record)?;
        }
        let directory_size = directory.len() as u64;

        if directory_offset > MAX_CLASSIC_SIZE || directory_size > MAX_CLASSIC_SIZE {
            return Err(archive_limit_error("central directory lies beyond 4 GiB"));
        }

        let entries = self.records.len() as u16;
        directory.write_u32::<LittleEndian>(END_OF_CENTRAL_DIRECTORY_SIGNATURE)?;
        directory.write_u16::<LittleEndian>(0)?; // this disk
        directory.write_u16::<LittleEndian>(0)?; // disk with the central directory
        directory.write_u16::<LittleEndian>(entries)?;
        directory.write_u16::<LittleEndian>(entries)?;
        directory.write_u32::<LittleEndian>(directory_size as u32)?;
        directory.write_u32::<LittleEndian>(directory_offset as u32)?;
        directory.write_u16::<LittleEndian>(0)?; // archive comment length

        self.inner
            .write_all(&directory)
            .and_then(|_| self.inner.flush())
            .map_err(|e| archive_write_error(e, "central directory", "write"))?;
        self.position += directory.len() as u64;

        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for StoredZipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(open) = self.current.as_mut() else {
            return Err(io::Error::other("no archive entry has been started"));
        };
        if open.size + buf.len() as u64 > MAX_CLASSIC_SIZE {
            return Err(io::Error::other("entry is larger than 4 GiB"));
        }

        let written = self.inner.write(buf)?;
        open.hasher.update(&buf[..written]);
        open.size += written as u64;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn write_local_header(
    out: &mut Vec<u8>,
    name: &str,
    flags: u16,
    modified: DosDateTime,
) -> io::Result<()> {
    out.write_u32::<LittleEndian>(LOCAL_HEADER_SIGNATURE)?;
    out.write_u16::<LittleEndian>(VERSION_NEEDED)?;
    out.write_u16::<LittleEndian>(flags)?;
    out.write_u16::<LittleEndian>(METHOD_STORED)?;
    out.write_u16::<LittleEndian>(modified.time)?;
    out.write_u16::<LittleEndian>(modified.date)?;
    // CRC and sizes are patched by finish_entry
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(name.len() as u16)?;
    out.write_u16::<LittleEndian>(0)?; // extra field length
    out.write_all(name.as_bytes())
}

fn write_central_header(out: &mut Vec<u8>, record: &CentralRecord) -> io::Result<()> {
    out.write_u32::<LittleEndian>(CENTRAL_HEADER_SIGNATURE)?;
    out.write_u16::<LittleEndian>(VERSION_MADE_BY)?;
    out.write_u16::<LittleEndian>(VERSION_NEEDED)?;
    out.write_u16::<LittleEndian>(record.flags)?;
    out.write_u16::<LittleEndian>(METHOD_STORED)?;
    out.write_u16::<LittleEndian>(record.modified.time)?;
    out.write_u16::<LittleEndian>(record.modified.date)?;
    out.write_u32::<LittleEndian>(record.crc)?;
    out.write_u32::<LittleEndian>(record.size)?;
    out.write_u32::<LittleEndian>(record.size)?;
    out.write_u16::<LittleEndian>(record.name.len() as u16)?;
    out.write_u16::<LittleEndian>(0)?; // extra field length
    out.write_u16::<LittleEndian>(record.comment.len() as u16)?;
    out.write_u16::<LittleEndian>(0)?; // disk number start
    out.write_u16::<LittleEndian>(0)?; // internal attributes
    out.write_u32::<LittleEndian>(EXTERNAL_ATTRIBUTES)?;
    out.write_u32::<LittleEndian>(record.header_offset)?;
    out.write_all(record.name.as_bytes())?;
    out.write_all(record.comment.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::{Cursor, Read};

    fn build(entries: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut writer = StoredZipWriter::new(Cursor::new(Vec::new()));
        for (name, comment, data) in entries {
            writer
                .start_entry(name, comment, DosDateTime::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_entries_read_back_as_stored_with_comments() {
        let bytes = build(&[
            ("book1_track01.mp3", "book1/track01.mp3", b"first chapter"),
            ("book1_track02.mp3", "book1/track02.mp3", b"second chapter"),
        ]);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_index(1).unwrap();
        assert_eq!(entry.name(), "book1_track02.mp3");
        assert_eq!(entry.comment(), "book1/track02.mp3");
        assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
        assert_eq!(entry.size(), 14);
        assert_eq!(entry.compressed_size(), 14);

        // Reading to the end also verifies the CRC
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"second chapter");
    }

    #[test]
    fn test_local_header_is_patched() {
        let data = b"patched in place";
        let bytes = build(&[("a.mp3", "", data)]);

        let crc = crc32fast::hash(data);
        let read_u32 = |at: usize| u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());

        assert_eq!(read_u32(0), LOCAL_HEADER_SIGNATURE);
        assert_eq!(read_u32(14), crc);
        assert_eq!(read_u32(18), data.len() as u32);
        assert_eq!(read_u32(22), data.len() as u32);
        // Data follows the 30-byte header and the name
        assert_eq!(&bytes[35..35 + data.len()], data);
    }

    #[test]
    fn test_empty_entries_and_empty_archive() {
        let bytes = build(&[("empty.mp3", "", b"")]);
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().size(), 0);

        let bytes = build(&[]);
        // Only the end-of-central-directory record
        assert_eq!(bytes.len(), 22);
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_non_ascii_names_set_the_utf8_flag() {
        let bytes = build(&[("kniha_kapitola_č1.mp3", "kniha/kapitola_č1.mp3", b"x")]);

        let flags = u16::from_le_bytes([bytes[6], bytes[7]]);
        assert_eq!(flags & FLAG_UTF8, FLAG_UTF8);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), "kniha_kapitola_č1.mp3");
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut writer = StoredZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_entry("same.mp3", "", DosDateTime::default())
            .unwrap();
        assert!(writer.contains("same.mp3"));

        let result = writer.start_entry("same.mp3", "", DosDateTime::default());
        assert!(result.is_err(), "A second entry with the same name must fail");
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_writing_without_an_entry_fails() {
        let mut writer = StoredZipWriter::new(Cursor::new(Vec::new()));
        assert!(writer.write_all(b"orphan").is_err());
    }

    #[test]
    fn test_dos_date_time_conversion() {
        let datetime = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 44)
            .unwrap();
        let dos = DosDateTime::from_naive(datetime);

        assert_eq!(dos.date, (44 << 9) | (3 << 5) | 15);
        assert_eq!(dos.time, (10 << 11) | (30 << 5) | 22);
    }

    #[test]
    fn test_dos_date_time_is_clamped() {
        let early = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(DosDateTime::from_naive(early), DosDateTime::default());

        let late = NaiveDate::from_ymd_opt(2200, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(DosDateTime::from_naive(late).date >> 9, 127);
    }
}
