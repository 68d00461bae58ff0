//! prodcomp: product catalog search
//!
//! Command-line front end for a sharded product index. Products are added from
//! JSON files and found again with conjunctive keyword queries, one page at a
//! time, optionally ordered by price.

#![warn(missing_docs)]

pub mod cli;
