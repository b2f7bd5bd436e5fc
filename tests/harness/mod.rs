#![allow(dead_code)]

pub mod config;
pub mod db;
pub mod wait;
