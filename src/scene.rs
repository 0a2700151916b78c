//! Declarative design model: the layer-state snapshot a render consumes and the product data it
//! is sized by.

pub mod color;
pub mod layer_state;
pub mod products;
