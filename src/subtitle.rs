use nom::bytes::complete::tag;
use nom::combinator::opt;
use nom::error::VerboseError;
use nom::IResult;
use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern shared by both time fields of a record and both halves of a
/// timing line. ASCII digits only.
pub const TIME_FORMAT: &str = r"[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{2,3}";

/// Every frame image referenced by a batch description must carry this extension.
pub const IMAGE_EXTENSION: &str = ".bmp";

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}$", TIME_FORMAT)).expect("Invalid time regex")
});

/// One frame of the working sequence.
///
/// The image reference and time range are fixed when the record is built;
/// only the text changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRecord {
    image_file: String,
    start_time: String,
    end_time: String,
    pub text: String,
}

impl SubtitleRecord {
    pub fn new(image_file: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            image_file: image_file.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            text: String::new(),
        }
    }

    /// Builds a record from tab-separated fields. Missing fields are empty
    /// and anything past the third is ignored.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields = fields.into_iter();
        let image_file = fields.next().unwrap_or("");
        let start_time = fields.next().unwrap_or("");
        let end_time = fields.next().unwrap_or("");
        Self::new(image_file, start_time, end_time)
    }

    pub fn image_file(&self) -> &str {
        &self.image_file
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn is_valid(&self) -> bool {
        self.image_file.len() > IMAGE_EXTENSION.len()
            && self.image_file.ends_with(IMAGE_EXTENSION)
            && is_time(&self.start_time)
            && is_time(&self.end_time)
    }
}

pub fn is_time(value: &str) -> bool {
    TIME_REGEX.is_match(value)
}

/// Splits input on `\n`, dropping a leading byte order mark and the `\r`
/// of CRLF line endings. Both text formats are read this way.
pub(crate) fn split_lines(input: &str) -> impl Iterator<Item = &str> {
    let input = match optional_bom(input) {
        Ok((rest, _)) => rest,
        Err(_) => input,
    };
    input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>, VerboseError<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_is_time {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(is_time(input), expected);
            }
        )*
        }
    }

    test_is_time! {
        test_is_time_0: ("00:00:01,000", true),
        test_is_time_1: ("00:00:01,00", true),
        test_is_time_2: ("99:59:59,999", true),
        test_is_time_3: ("00:00:01,0", false),
        test_is_time_4: ("00:00:01,0000", false),
        test_is_time_5: ("0:00:01,000", false),
        test_is_time_6: ("00:00:01.000", false),
        test_is_time_7: ("", false),
        test_is_time_8: (" 00:00:01,000", false),
        test_is_time_9: ("00:00:01,000\n", false),
        test_is_time_10: ("٠٠:٠٠:٠١,٠٠٠", false),
        test_is_time_11: ("００:００:０１,０００", false),
    }

    #[test]
    fn missing_fields_are_empty() {
        let record = SubtitleRecord::from_fields(vec!["a.bmp"]);
        assert_eq!(record.image_file(), "a.bmp");
        assert_eq!(record.start_time(), "");
        assert_eq!(record.end_time(), "");
        assert!(record.text.is_empty());
        assert!(!record.is_valid());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let record = SubtitleRecord::from_fields(
            "a.bmp\t00:00:01,000\t00:00:02,000\tnotes".split('\t'),
        );
        assert_eq!(record.end_time(), "00:00:02,000");
        assert!(record.is_valid());
    }

    #[test]
    fn non_ascii_digit_times_are_invalid() {
        let record = SubtitleRecord::new("a.bmp", "٠٠:٠٠:١٠,٠٠٠", "٠٠:٠٠:٢٠,٠٠٠");
        assert!(!record.is_valid());
    }

    #[test]
    fn split_lines_drops_bom_and_carriage_returns() {
        let lines: Vec<&str> = split_lines("\u{FEFF}one\r\ntwo\n\r\n").collect();
        assert_eq!(lines, vec!["one", "two", "", ""]);
    }

    #[test]
    fn image_needs_a_name_and_extension() {
        assert!(!SubtitleRecord::new(".bmp", "00:00:01,000", "00:00:02,000").is_valid());
        assert!(!SubtitleRecord::new("a.png", "00:00:01,000", "00:00:02,000").is_valid());
        assert!(!SubtitleRecord::new("a.BMP", "00:00:01,000", "00:00:02,000").is_valid());
        assert!(SubtitleRecord::new("a.bmp", "00:00:01,000", "00:00:02,00").is_valid());
    }
}
