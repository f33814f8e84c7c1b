// Core modules implementing the text codec boundary, structural diff, and errors.
pub mod diff;
pub mod error;
pub mod escapes;
pub mod parse;
pub mod print;
