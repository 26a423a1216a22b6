//! Slice an image into a grid of tiles, pick tiles as animation frames,
//! preview them and export PNG sequences, GIFs or sprite sheets.

pub mod events;
pub mod export;
pub mod file;
pub mod frames;
pub mod grid;
pub mod imaging;
pub mod model;
pub mod persist;
pub mod preview;
pub mod state;
pub mod studio;
pub mod ui;
pub mod watch;
