//! gleaner — structured game-content extraction from decompiled
//! GameMaker scripts.
//!
//! An external decompiler flattens the game's management routines into
//! statement sequences ([`dump::AstDump`]); this crate scans them for the
//! known declaration call patterns, constant-folds the argument
//! expressions ([`eval::Evaluator`]), and reassembles the typed item,
//! perk, and supervisor records the game builds at startup
//! ([`extract::Extraction`]). Localizable strings stay deferred as
//! [`text::TextTemplate`]s and render against a [`translate::TranslationTable`]
//! only at export time.

pub mod ast;
pub mod dump;
pub mod error;
pub mod eval;
pub mod export;
pub mod extract;
pub mod records;
pub mod registry;
pub mod scan;
pub mod text;
pub mod translate;
pub mod value;

pub use error::CoreError;
