//! The editing session: the working sequence, the cursor into it, and the
//! collaborators that feed it.
//!
//! Session operations never return errors. Failures are reported through a
//! [`Notifier`] and leave already accepted or merged entries in place.

use crate::batch;
use crate::error::{Severity, SubframeError};
use crate::markup::{self, Marker, Selection};
use crate::parser;
use crate::serialiser;
use crate::subtitle::SubtitleRecord;

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

/// Extension appended to a save destination that has none.
pub const EXCHANGE_EXTENSION: &str = "srt";

/// Where the session reports problems and asks for confirmation.
pub trait Notifier {
    fn error(&mut self, title: &str, message: &str);
    fn info(&mut self, title: &str, message: &str);
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Raw pixel data of one subtitle frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    /// Bytes per row, including padding.
    pub stride: u32,
}

/// Decodes frame images from disk.
pub trait FrameSource {
    fn load(&mut self, path: &Path) -> io::Result<Frame>;
}

/// Optical character recognition over a single frame.
pub trait Recognizer {
    fn recognize(&mut self, frame: &Frame) -> String;
}

#[derive(Debug, Default)]
pub struct Session {
    records: Vec<SubtitleRecord>,
    current: usize,
    input_dir: PathBuf,
    dirty: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SubtitleRecord] {
        &self.records
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&SubtitleRecord> {
        self.records.get(self.current)
    }

    /// Directory of the loaded batch file. Images resolve against it and it
    /// is the default save location.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn can_save(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn can_next(&self) -> bool {
        self.current + 1 < self.records.len()
    }

    pub fn can_previous(&self) -> bool {
        self.current > 0
    }

    pub fn status(&self) -> String {
        if self.records.is_empty() {
            "no file loaded".to_string()
        } else {
            format!("{} of {}", self.current + 1, self.records.len())
        }
    }

    /// Replaces the working sequence with the records of a batch description.
    ///
    /// `name` is the batch file's path. Returns `false` when the load was
    /// declined or no record was accepted, in which case the session is
    /// unchanged.
    pub fn load_batch(&mut self, name: &Path, content: &str, notifier: &mut dyn Notifier) -> bool {
        if !self.confirm_discard(notifier) {
            return false;
        }
        let parsed = batch::parse(content);
        if let Some(err) = &parsed.error {
            report(notifier, err);
        }
        if parsed.records.is_empty() {
            return false;
        }
        self.records = parsed.records;
        self.current = 0;
        self.dirty = false;
        self.input_dir = name.parent().map(Path::to_path_buf).unwrap_or_default();
        info!(
            "Loaded {} subtitles from {}",
            self.records.len(),
            name.display()
        );
        true
    }

    /// Merges exchange-format content onto the working sequence and returns
    /// the number of entries that received text.
    pub fn import(&mut self, content: &str, notifier: &mut dyn Notifier) -> usize {
        if self.records.is_empty() {
            report(notifier, &SubframeError::NoRecords);
            return 0;
        }
        let merge = parser::merge(content, &mut self.records);
        if merge.merged > 0 {
            self.dirty = true;
        }
        let succeeded = merge
            .stopped
            .as_ref()
            .map_or(true, |err| err.severity() == Severity::Info);
        if let Some(err) = &merge.stopped {
            report(notifier, err);
        }
        if succeeded && merge.merged > self.current + 1 {
            self.current += 1;
            debug!("Cursor moved to {}", self.current);
        }
        info!("Imported {} subtitles", merge.merged);
        merge.merged
    }

    /// Writes the filled prefix of the sequence to `path`, appending the
    /// exchange extension when the path has none. Returns the number of
    /// blocks written.
    pub fn save(&mut self, path: &Path, notifier: &mut dyn Notifier) -> Option<usize> {
        if self.records.is_empty() {
            report(notifier, &SubframeError::NoRecords);
            return None;
        }
        let path = if path.extension().is_none() {
            path.with_extension(EXCHANGE_EXTENSION)
        } else {
            path.to_path_buf()
        };
        if path.exists() && !notifier.confirm("Replace file", "Replace existing file?") {
            return None;
        }
        match serialiser::serialise(&self.records, &path) {
            Ok(written) => {
                self.dirty = false;
                Some(written)
            }
            Err(err) => {
                report(notifier, &err);
                None
            }
        }
    }

    /// Asks before closing when there are unsaved changes.
    pub fn confirm_close(&self, notifier: &mut dyn Notifier) -> bool {
        self.confirm_discard(notifier)
    }

    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn set_current_text(&mut self, text: &str) {
        if let Some(record) = self.records.get_mut(self.current) {
            record.text = text.to_string();
            self.dirty = true;
        }
    }

    /// Toggles `marker` in the active record's text and returns the
    /// selection to restore in the editor.
    pub fn toggle_current(&mut self, marker: &Marker, selection: Selection) -> Option<Selection> {
        let record = self.records.get_mut(self.current)?;
        let toggled = markup::toggle(&record.text, marker, selection);
        record.text = toggled.text;
        self.dirty = true;
        Some(toggled.selection)
    }

    /// Prepares the active record for display, running recognition on its
    /// frame when it has no text yet. Returns the text to edit.
    pub fn show_current(
        &mut self,
        frames: &mut dyn FrameSource,
        recognizer: &mut dyn Recognizer,
        notifier: &mut dyn Notifier,
    ) -> Option<&str> {
        let record = self.records.get_mut(self.current)?;
        let path = self.input_dir.join(record.image_file());
        if !path.exists() {
            report(notifier, &SubframeError::MissingResource(path));
            return None;
        }
        if record.text.is_empty() {
            let frame = match frames.load(&path) {
                Ok(frame) => frame,
                Err(source) => {
                    report(notifier, &SubframeError::Io { path, source });
                    return None;
                }
            };
            debug!(
                "Recognizing {} ({}x{})",
                path.display(),
                frame.width,
                frame.height
            );
            record.text = recognizer.recognize(&frame);
            self.dirty = true;
        }
        Some(&record.text)
    }

    fn confirm_discard(&self, notifier: &mut dyn Notifier) -> bool {
        !self.dirty || notifier.confirm("Unsaved changes", "Discard unsaved changes?")
    }
}

fn report(notifier: &mut dyn Notifier, err: &SubframeError) {
    let message = err.to_string();
    match err.severity() {
        Severity::Error => notifier.error(err.title(), &message),
        Severity::Info => notifier.info(err.title(), &message),
    }
}
