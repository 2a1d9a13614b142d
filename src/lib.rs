//! Natural-language front end for a fixed set of Cisco IOS device
//! operations, executed over a per-invocation SSH management session.

pub mod netops;
