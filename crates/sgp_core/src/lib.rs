//! # SGP Core
//!
//! The deferred execution layer of Super Great Park.
//!
//! All game state lives on a single engine thread. Code that wants something
//! done "later in the frame", or platform code calling back from another OS
//! thread, goes through the [`CallQueue`]; the queue is drained once per frame
//! by the level's callback queue item.
//!
//! ## Modules
//!
//! - `call_queue`: the deferred call queue and its drain
//! - `connection`: cancellation tokens for scheduled calls
//! - `native_call`: the id-based bridge used by native callbacks
//!
//! ## Example
//!
//! ```rust
//! use sgp_core::{CallQueue, NativeCallBridge};
//!
//! let queue = CallQueue::new();
//! let bridge = NativeCallBridge::new(queue.clone());
//!
//! let handle = bridge.register_callback(|| println!("ad closed"));
//!
//! // Later, from any thread:
//! bridge.invoker().invoke(handle.id);
//!
//! // Once per frame, on the engine thread:
//! queue.process_pending_callbacks();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod call_queue;
pub mod connection;
pub mod native_call;

pub use call_queue::{CallQueue, DeferredCall, DrainReport};
pub use connection::{Connection, ScopedConnection};
pub use native_call::{CallbackId, NativeCallBridge, NativeCallHandle, NativeCallInvoker};
