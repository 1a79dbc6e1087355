pub mod animation;
pub mod canvas;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod layout;
pub mod protocol;
pub mod render;
pub mod util;
pub mod worker;
