//! Domain names and their label algebra.

mod iter;
mod name;
mod tlds;

pub use iter::{Labels, Parents, ThisAndParents};
pub use name::{DomainName, DomainNameError, MAX_LABEL_LENGTH, MAX_LENGTH};
