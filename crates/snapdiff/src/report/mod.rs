pub mod annotate;
pub mod terminal;
