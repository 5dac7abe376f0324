use crate::error::SubframeError;
use crate::subtitle::{split_lines, SubtitleRecord};

use log::{debug, warn};
use nom::bytes::complete::{tag, take_while1, take_while_m_n};
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, recognize};
use nom::error::{convert_error, VerboseError};
use nom::sequence::tuple;
use nom::{Err, IResult};

/// Result of applying exchange-format content onto a loaded sequence.
///
/// Entries are merged by position. `merged` counts the records that received
/// text; they always form a prefix of the sequence. `stopped` is set when
/// processing halted early, and everything merged before that point is kept.
#[derive(Debug)]
pub struct Merge {
    pub merged: usize,
    pub stopped: Option<SubframeError>,
}

/// Verifies exchange-format content against `records` and copies its text
/// onto them.
///
/// Each block's index must equal its 1-based position and its timing line
/// must repeat the record's start and end time exactly. Blocks past the end
/// of `records` are ignored.
pub fn merge(input: &str, records: &mut [SubtitleRecord]) -> Merge {
    let lines: Vec<&str> = split_lines(input).collect();
    let mut line = 0;
    let mut i = 0;

    while line < lines.len() && i < records.len() {
        match seq_num(lines[line]) {
            Some(index) if index == i + 1 => (),
            Some(_) => {
                return stop(
                    i,
                    SubframeError::WrongIndex {
                        line: line + 1,
                        expected: i + 1,
                    },
                )
            }
            None => return stop(i, SubframeError::InvalidIndex { line: line + 1 }),
        }

        line += 1;
        if line >= lines.len() {
            return stop(i, SubframeError::UnexpectedEof);
        }
        let (start, end) = match timing_line(lines[line]) {
            Ok(times) => times,
            Err(err) => {
                debug!("{}", err);
                return stop(i, SubframeError::InvalidTiming { line: line + 1 });
            }
        };
        let record = &mut records[i];
        if record.start_time() != start || record.end_time() != end {
            return stop(i, SubframeError::TimingMismatch { line: line + 1 });
        }

        line += 1;
        if line >= lines.len() {
            return stop(i, SubframeError::UnexpectedEof);
        }
        let mut body = Vec::new();
        while line < lines.len() && !lines[line].is_empty() {
            body.push(lines[line]);
            line += 1;
        }
        record.text = body.join("\n");
        debug!("Merged entry {}: {:?}", i + 1, record.text);
        while line < lines.len() && lines[line].is_empty() {
            line += 1;
        }
        i += 1;
    }

    Merge {
        merged: i,
        stopped: None,
    }
}

fn stop(merged: usize, err: SubframeError) -> Merge {
    warn!("Import stopped after {} entries: {}", merged, err);
    Merge {
        merged,
        stopped: Some(err),
    }
}

fn seq_num(line: &str) -> Option<usize> {
    let parsed: IResult<&str, usize, VerboseError<&str>> =
        all_consuming(map_res(digit1, |s: &str| s.parse()))(line.trim());
    parsed.ok().map(|(_, index)| index)
}

/// Parses `start --> end`, returning both times exactly as written.
fn timing_line(line: &str) -> Result<(&str, &str), String> {
    match all_consuming(show_hide)(line) {
        Ok((_, times)) => Ok(times),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => Err(convert_error(line, err)),
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

fn show_hide(input: &str) -> IResult<&str, (&str, &str), VerboseError<&str>> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = spaces(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = spaces(input)?;
    let (input, hide_at) = timestamp(input)?;

    Ok((input, (show_at, hide_at)))
}

fn spaces(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    take_while1(|c: char| c == ' ')(input)
}

fn timestamp(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    let hms = || take_while_m_n(2, 2, |c: char| c.is_ascii_digit());
    let fraction = take_while_m_n(2, 3, |c: char| c.is_ascii_digit());

    recognize(tuple((
        hms(),
        char(':'),
        hms(),
        char(':'),
        hms(),
        char(','),
        fraction,
    )))(input)
}
