//! Integration tests for the notification service.

mod helpers;
mod submission_test;
mod ws_test;
