pub mod catalog_model;
pub mod page_model;
pub mod ticket_model;
pub mod user_model;
pub mod user_session_model;
