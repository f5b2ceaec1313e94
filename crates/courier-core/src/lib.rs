//! Core types for the courier dispatch protocol: branded ids, the transport
//! envelope, outbound events, the routing key, the process-wide sequence
//! counter, the error taxonomy, and the trait seams between the dispatch
//! core and its collaborators (adapters, suggesters, delivery channel).

pub mod channel;
pub mod envelope;
pub mod errors;
pub mod events;
pub mod ids;
pub mod routing;
pub mod sequence;
pub mod strategy;
