pub mod document;
pub mod editing;
pub mod incremental;
pub mod invoice;
pub mod matching;
pub mod models;
pub mod parsing;
pub mod pointer;
pub mod snapshot;
pub mod structure;

// Re-export key types for easier usage
pub use document::{Atom, Block, Doc, Inline, Mark, MarkKind, Span, TextRun};
pub use editing::{ChangedRange, EditError, Operation, Patch, Transform};
pub use incremental::MatchSession;
pub use matching::{Match, MatchContext, MatchKind, match_text};
pub use models::{Event, IMeta, IMetaTable};
pub use parsing::{EventParser, parse_content, parse_user_about};
pub use pointer::{Entity, NostrPointer, NostrReference, Prefix, decode, encode};
