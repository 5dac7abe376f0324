use crate::error::SubframeError;
use crate::subtitle::{split_lines, SubtitleRecord};

use log::{debug, warn};

/// Outcome of reading a batch description.
///
/// Parsing halts at the first invalid line, so `records` holds everything
/// accepted up to that point and `error` describes the line that stopped it.
#[derive(Debug)]
pub struct BatchParse {
    pub records: Vec<SubtitleRecord>,
    pub error: Option<SubframeError>,
}

/// Parses `imageFile<TAB>startTime<TAB>endTime` lines into records, in input order.
pub fn parse(input: &str) -> BatchParse {
    let mut records = Vec::new();
    for line in split_lines(input) {
        if line.is_empty() {
            continue;
        }
        let record = SubtitleRecord::from_fields(line.split('\t'));
        if !record.is_valid() {
            let position = records.len() + 1;
            warn!("Rejected batch entry {}: {:?}", position, line);
            return BatchParse {
                records,
                error: Some(SubframeError::Validation {
                    position,
                    line: line.to_string(),
                }),
            };
        }
        debug!(
            "Accepted {} ({} --> {})",
            record.image_file(),
            record.start_time(),
            record.end_time()
        );
        records.push(record);
    }
    BatchParse {
        records,
        error: None,
    }
}
