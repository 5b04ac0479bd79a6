// Member domain module

#![allow(clippy::module_inception)]

pub mod member;
pub mod value_objects;

pub use member::{Member, NewMember};
pub use value_objects::MemberId;
