// Search inputs and paged outputs
// Transient values: built per request, never persisted

pub mod condition;
pub mod page;

pub use condition::MemberSearchCondition;
pub use page::{Direction, NullHandling, Order, Page, PageRequest, Sort};
