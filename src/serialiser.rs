use crate::error::SubframeError;
use crate::subtitle::SubtitleRecord;

use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

/// Writes the filled prefix of `records` to `output`, returning the number
/// of blocks written.
pub fn serialise<P: AsRef<Path>>(records: &[SubtitleRecord], output: P) -> Result<usize, SubframeError> {
    let path = output.as_ref();
    let io_err = |source| SubframeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let written = write_records(&mut writer, records).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    info!("Wrote {} subtitles to {}", written, path.display());
    Ok(written)
}

pub fn to_string(records: &[SubtitleRecord]) -> String {
    let mut buf = Vec::new();
    write_records(&mut buf, records).expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("records hold valid UTF-8")
}

/// Emits one block per record, stopping at the first record without text.
pub fn write_records<W: Write>(buf: &mut W, records: &[SubtitleRecord]) -> io::Result<usize> {
    let mut written = 0;
    for (i, record) in records.iter().take_while(|r| !r.text.is_empty()).enumerate() {
        write_record(buf, i + 1, record)?;
        written += 1;
    }
    Ok(written)
}

fn write_record<W: Write>(buf: &mut W, seq_num: usize, record: &SubtitleRecord) -> io::Result<()> {
    writeln!(buf, "{}", seq_num)?;
    writeln!(buf, "{} --> {}", record.start_time(), record.end_time())?;
    writeln!(buf, "{}", record.text.trim())?;
    writeln!(buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: &str, end: &str, text: &str) -> SubtitleRecord {
        let mut record = SubtitleRecord::new("frame.bmp", start, end);
        record.text = text.to_string();
        record
    }

    #[test]
    fn writes_blocks_in_order() {
        let records = vec![
            record("00:00:01,000", "00:00:02,000", "  Hello\n"),
            record("00:00:02,500", "00:00:03,50", "Two\nlines"),
        ];
        assert_eq!(
            to_string(&records),
            "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,500 --> 00:00:03,50\nTwo\nlines\n\n"
        );
    }

    #[test]
    fn stops_at_first_empty_text() {
        let records = vec![
            record("00:00:01,000", "00:00:02,000", "one"),
            record("00:00:02,500", "00:00:03,500", ""),
            record("00:00:04,000", "00:00:05,000", "three"),
        ];
        assert_eq!(to_string(&records), "1\n00:00:01,000 --> 00:00:02,000\none\n\n");
        assert_eq!(write_records(&mut Vec::new(), &records).unwrap(), 1);
    }

    #[test]
    fn nothing_filled_writes_nothing() {
        let records = vec![record("00:00:01,000", "00:00:02,000", "")];
        assert_eq!(to_string(&records), "");
    }

    #[test]
    fn round_trips_through_merge() {
        let filled = vec![
            record("00:00:01,000", "00:00:02,000", "Hello"),
            record("00:00:02,500", "00:00:03,500", "<i>World</i>\nagain"),
        ];
        let encoded = to_string(&filled);

        let mut empty: Vec<SubtitleRecord> = filled
            .iter()
            .map(|r| SubtitleRecord::new(r.image_file(), r.start_time(), r.end_time()))
            .collect();
        let merge = crate::parser::merge(&encoded, &mut empty);

        assert!(merge.stopped.is_none());
        assert_eq!(merge.merged, 2);
        assert_eq!(empty, filled);
    }

    #[test]
    fn serialise_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.srt");
        let records = vec![record("00:00:01,000", "00:00:02,000", "one")];
        match serialise(&records, &path) {
            Err(SubframeError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
