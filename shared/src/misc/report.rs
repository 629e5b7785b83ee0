// External.
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Represents a report that the game sends.
///
/// A report is built once per submission and handed over to the sender by value,
/// it's never reused after that.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GameReport {
    pub report_name: String,
    pub report_text: String,
    pub sender_name: String,
    pub sender_email: String,
    pub game_name: String,
    pub game_version: String,
    // if adding new fields here
    // also add a new entry to the ReportField enum
    // and update the REPORTER_PROTOCOL
}

impl GameReport {
    /// Returns the value of the specified field.
    pub fn field(&self, field: ReportField) -> &str {
        match field {
            ReportField::ReportName => &self.report_name,
            ReportField::ReportText => &self.report_text,
            ReportField::SenderName => &self.sender_name,
            ReportField::SenderEmail => &self.sender_email,
            ReportField::GameName => &self.game_name,
            ReportField::GameVersion => &self.game_version,
        }
    }

    /// Checks the size of each field (in the order they are sent).
    ///
    /// ## Return
    /// `None` if all fields are within their limits, otherwise the first field
    /// that exceeds its limit.
    pub fn check_fields_limit(&self) -> Option<ReportField> {
        first_oversized_field(|field| self.field(field).len())
    }
}

/// Walks fields in the order they are sent and returns the first one whose size
/// (as reported by `field_size`) is bigger than its limit.
///
/// `field_size` is not called for fields after the first oversized one.
pub fn first_oversized_field<F>(mut field_size: F) -> Option<ReportField>
where
    F: FnMut(ReportField) -> usize,
{
    ReportField::iter().find(|field| field_size(*field) > field.max_size_in_bytes())
}

/// Fields of the `GameReport` in the order they go over the network.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    ReportName,
    ReportText,
    SenderName,
    SenderEmail,
    GameName,
    GameVersion,
}

impl ReportField {
    /// Returns the maximum amount of __bytes__ (not characters) allowed for the field.
    pub fn max_size_in_bytes(&self) -> usize {
        match *self {
            ReportField::ReportName => 100, // the reporter also checks the limits
            ReportField::ReportText => 5120, // so if changing any values here
            ReportField::SenderName => 100, // also change the REPORTER_PROTOCOL
            ReportField::SenderEmail => 100,
            ReportField::GameName => 100,
            ReportField::GameVersion => 100,
        }
    }
    pub fn id(&self) -> u16 {
        match *self {
            ReportField::ReportName => 0,
            ReportField::ReportText => 1,
            ReportField::SenderName => 2,
            ReportField::SenderEmail => 3,
            ReportField::GameName => 4,
            ReportField::GameVersion => 5,
        }
    }
}
