pub use thingest_agent as agent;
pub use thingest_codec as codec;
pub use thingest_types as types;
pub mod client {
  pub use thingest_client::*;
}
