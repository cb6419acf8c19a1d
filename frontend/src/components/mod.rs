pub mod chat;
pub mod page_panel;
