//! Title sequence engine for Reims en Rage: a timed intro of background
//! images under a scrolling text crawl, then a title screen with a blinking
//! prompt, all driven one display frame at a time.

pub mod engine;
pub mod headless;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod types;
