//! Business operations shared by the web surface and the Sync API

pub mod access;
pub mod ledger;
pub mod report;
