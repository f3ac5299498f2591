//! Domain model of the checkout flow: courses, students, progress records,
//! gateway orders, signature verification and the storage/collaborator ports.

pub mod course;
pub mod enrollment;
pub mod ids;
pub mod money;
pub mod order;
pub mod ports;
pub mod progress;
pub mod signature;
pub mod student;
