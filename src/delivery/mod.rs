//! Contact message delivery.
//!
//! | Module | Role |
//! |--------|------|
//! | [`transport`] | `Transport` trait and the blocking `reqwest` implementation |
//! | [`providers`] | Backend, EmailJS, and Web3Forms request/response handling |
//! | [`chain`] | Ordered, strictly sequential fallback across configured providers |

pub mod chain;
pub mod providers;
pub mod transport;

pub use chain::{Attempt, Delivery, DeliveryError, ProviderChain, ProviderSlot};
pub use providers::{Provider, ProviderError, ProviderKind};
pub use transport::{HttpResponse, HttpTransport, Transport, TransportError};
