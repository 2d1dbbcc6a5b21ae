//! Console scenarios against the in-memory skill service.

mod dependencies;
mod editing;
mod mutations;
mod selection;
mod transfer;
