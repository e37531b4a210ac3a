// Starting-pitcher streaming analysis: identities, fantasy weeks, second-start
// detection, ownership filtering, and the cached recommendation service.

pub mod engine;
pub mod error;
pub mod normalize;
pub mod ownership;
pub mod player;
pub mod service;
pub mod snapshot;
pub mod source;
pub mod starts;
pub mod window;
