pub mod category;
pub mod lead;
pub mod profile;
pub mod recommendation;
