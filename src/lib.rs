//  Copyright 2024 MrCroxx
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! A multi-threaded workload-generation harness for benchmarking ordered
//! key-value stores under the YCSB methodology.
//!
//! The harness produces a reproducible stream of load (insert) and run
//! (mixed read/update/scan/insert/read-modify-write) operations against a
//! pluggable [`db::Db`] adapter and measures sustained throughput.
//!
//! The insert key space is partitioned across workers by the
//! [`generator::batched::BatchedCounterGenerator`], which hands out disjoint
//! batches of keynums and maintains a monotone completion frontier.
//! Transaction key distributions ([`generator`]) are restricted to the
//! safely materialized prefix of that space, so a mixed workload never reads
//! a key whose insert is still in flight.

#![warn(missing_docs)]

/// Per-thread driver loop.
pub mod client;
/// Store adapter contract.
pub mod db;
/// Stateful numeric and categorical generators.
pub mod generator;
/// Workload-file parsing.
pub mod properties;
/// Phase orchestration across worker threads.
pub mod runner;
/// Hashing and payload helpers.
pub mod utils;
/// The core workload state and its configuration.
pub mod workload;

pub use client::Client;
pub use db::{Db, KvPair, Status};
pub use properties::Properties;
pub use runner::{run_load, run_transactions, PhaseSummary};
pub use workload::{CoreWorkload, CoreWorkloadConfig, Op};
