//! Adapters for the domain ports: storage, payment gateway and mail delivery.

pub mod in_memory;
pub mod mail;
pub mod razorpay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
