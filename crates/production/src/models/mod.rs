//! Domain models for production tracking.

pub mod certificate;
pub mod production;

pub use certificate::{
    BatchSource, Certificate, CertificateFields, Microorganism, PhysicochemicalResult,
};
pub use production::{Batch, NewBatch, NewOrder, NewOrderItem, Order, OrderItem};
