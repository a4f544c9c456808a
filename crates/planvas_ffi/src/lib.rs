//! Flutter bridge surface for the Planvas core.

pub mod api;
