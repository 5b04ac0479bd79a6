// Domain layer module exports
// Entities, search values and repository ports; no storage concerns here

pub mod dto;
pub mod member;
pub mod repositories;
pub mod roster;
pub mod search;
pub mod team;
