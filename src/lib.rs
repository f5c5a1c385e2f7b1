#![forbid(unsafe_code)]

pub mod google_books;
pub mod isbn;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod open_library;
pub mod server;
