// src/handlers.rs

pub mod announcements;
pub mod crm;
pub mod dashboard;
pub mod inventory;
pub mod sales;
pub mod team;
pub mod users;
