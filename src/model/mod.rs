//! Pure data structures for orders, implementing [`Document`](doc_store::Document) in
//! [`crate::order_store`].

pub mod order;

pub use order::*;
