pub mod cli;
pub mod day;
pub mod extract;
pub mod fetch;
pub mod hansik;
pub mod markup;
pub mod models;
pub mod signals;
pub mod util;
pub mod web;

#[cfg(test)]
mod fixtures;

shadow_rs::shadow!(build);
