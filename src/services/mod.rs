pub mod backend;
pub mod catalog;
pub mod controller;
pub mod export;
pub mod html;
pub mod reaction;
pub mod speech;
pub mod transcript;
