// error.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
use std::fmt;
use std::io;
use std::num::TryFromIntError;

/// Errors encountered while encoding an animation
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// Integer out of bounds.
    TryFromInt(TryFromIntError),
    /// Frame has zero width / height, or its pixel buffer length does not
    /// match width × height × channels.
    InvalidFrame,
    /// Frame location / size larger than the canvas.
    DimensionMismatch,
    /// [AnimationWriter](struct.AnimationWriter.html) method called out of
    /// lifecycle order.
    InvalidState,
    /// Palette size not supported (more than 256 colors, or too few to
    /// reserve a transparent slot).
    UnsupportedPaletteSize,
    /// Frame requests transparency, but the global palette has no
    /// transparent slot.
    MissingTransparentIndex,
}

/// Animgif result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::TryFromInt(err) => err.fmt(fmt),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::TryFromInt(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<TryFromIntError> for Error {
    fn from(err: TryFromIntError) -> Self {
        Error::TryFromInt(err)
    }
}
