mod common;
mod laws;
mod registry;
