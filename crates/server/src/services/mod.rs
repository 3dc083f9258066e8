//! Outbound clients and the order/notification flows.

pub mod dispatcher;
pub mod optout;
pub mod ordering;
pub mod push;
pub mod twilio;
pub mod whatsapp;
