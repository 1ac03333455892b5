pub mod history;
pub mod refresh;
pub mod songs;
