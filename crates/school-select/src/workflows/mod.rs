pub mod registry;
pub mod selection;
