//! Scenario tests for the routing context
//!
//! These drive a [`RoutingContext`](crate::RoutingContext) through whole
//! tick sequences:
//! - Container routing by class policy
//! - Team assignment and team gathers
//! - Deferred routes and team requests
//! - Ownership changes
//! - World resets
//! - Dependent objects

pub mod support;

#[cfg(test)]
pub mod routing_test;
