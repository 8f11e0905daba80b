pub mod app;
pub mod cmems;
pub mod config;
pub mod domain;
pub mod error;
pub mod gbif;
pub mod normalize;
pub mod output;
pub mod table;
