pub mod config;
pub mod editor;
pub mod errors;
pub mod events;
pub mod graph;
pub mod presentation;
pub mod serializer;
pub mod types;
