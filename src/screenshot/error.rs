use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The search step located no candidate.
    NotFound,
    /// A candidate was located but its text could not be read.
    Unreadable,
    /// A required reference list was never loaded.
    ListUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    HatchingTimer,
    RaidTimer,
    ExTag,
    Level,
    Gym,
    Boss,
    Time,
}

impl Subject {
    /// Stage name used for debug dumps and log lines.
    pub fn key(&self) -> &'static str {
        match self {
            Subject::HatchingTimer => "hatching_timer",
            Subject::RaidTimer => "raid_timer",
            Subject::ExTag => "ex_tag",
            Subject::Level => "level",
            Subject::Gym => "gym_name",
            Subject::Boss => "boss",
            Subject::Time => "time",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Unreadable => "unreadable",
            ErrorKind::ListUnavailable => "list not available",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Subject::HatchingTimer => "hatching timer",
            Subject::RaidTimer => "raid timer",
            Subject::ExTag => "ex tag",
            Subject::Level => "level",
            Subject::Gym => "gym",
            Subject::Boss => "boss",
            Subject::Time => "time",
        };
        f.write_str(s)
    }
}

/// Failure of one extractor on one screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{subject} {kind}")]
pub struct ExtractionError {
    pub kind: ErrorKind,
    pub subject: Subject,
}

impl ExtractionError {
    pub fn not_found(subject: Subject) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            subject,
        }
    }

    pub fn unreadable(subject: Subject) -> Self {
        Self {
            kind: ErrorKind::Unreadable,
            subject,
        }
    }

    pub fn list_unavailable(subject: Subject) -> Self {
        Self {
            kind: ErrorKind::ListUnavailable,
            subject,
        }
    }
}

/// Errors that prevent building a screenshot at all.
#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("failed to decode screenshot: {0}")]
    Decode(#[from] image::ImageError),
}
