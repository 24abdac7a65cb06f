pub mod backup;
pub mod list;
pub mod next;
pub mod prune;
pub mod run;
