//! Data Transfer Objects
//!
//! Request payloads sent to the Rundeck API.

pub mod run;
