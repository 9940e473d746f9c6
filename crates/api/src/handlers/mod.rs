pub mod chat;
pub mod images;
pub mod panels;
pub mod queries;
pub mod sessions;
