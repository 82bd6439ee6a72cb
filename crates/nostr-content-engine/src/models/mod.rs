pub mod event;
pub mod imeta;

pub use event::{Event, kinds};
pub use imeta::{Dimensions, IMeta, IMetaTable};
