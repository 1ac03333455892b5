// handlers/admin/mod.rs - Parent admin panel endpoints

pub mod songs;

pub use songs::get as songs_get;
