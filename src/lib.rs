#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod likes;
pub mod probe;
pub mod resolver;
pub mod storage;
pub mod utils;
