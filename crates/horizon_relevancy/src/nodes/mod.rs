//! Routing containers
//!
//! Flat object lists used by the global always-relevant node and by each
//! connection's owner and team nodes, plus the team membership registry the
//! team gather delegates through.

mod actor_list;
mod team;

pub use actor_list::{ActorListNode, NodeStats};
pub use team::TeamRegistry;
