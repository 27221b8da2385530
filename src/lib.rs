//! Article Site - articles, categories and a newsletter
//!
//! This library provides the storage layer, the controllers and the HTTP
//! surface of the article site.

pub mod api;
pub mod config;
pub mod controllers;
pub mod db;
pub mod models;
pub mod services;
