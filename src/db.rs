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

use anyhow::Result;

/// Outcome of a single store operation.
///
/// The harness does not interpret outcomes beyond counting them: anything
/// other than [`Status::Ok`] is an unsuccessful operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation succeeded.
    Ok,
    /// The operation failed inside the adapter.
    Error,
    /// The requested record does not exist.
    NotFound,
}

/// A single rendered cell: field name and payload bytes.
pub type KvPair = (String, String);

/// A layer for accessing a database to be benchmarked. The adapter is shared
/// by all client threads and must provide its own thread safety.
///
/// The semantics of methods such as insert, update and delete vary from
/// database to database. In particular, operations may or may not be durable
/// once these methods commit, and some systems may return success regardless
/// of whether or not a tuple with a matching key existed before the call.
/// Rather than dictate the exact semantics of these methods, we recommend you
/// either implement them to match the database's default semantics, or the
/// semantics of your target application. For the sake of comparison between
/// experiments we also recommend you explain the semantics you chose when
/// presenting performance results. Blind-write stores are free to treat
/// `update` as `insert`.
pub trait Db {
    /// Initialize any state for this DB.
    /// Called once per worker at the start of a phase.
    fn init(&self) -> Result<()>;

    /// Cleanup any state for this DB.
    /// Called once per worker at the end of a phase.
    fn cleanup(&self) -> Result<()>;

    /// Read a record from the database, filling `result` with the returned
    /// field/value pairs.
    ///
    /// * `table` - The name of the table
    /// * `key` - The record key of the record to read.
    /// * `fields` - The list of fields to read, or `None` for all of them.
    ///   Adapters are free to ignore the list and return everything.
    /// * `result` - Returned field/value pairs; cleared by the adapter.
    fn read(&self, table: &str, key: &str, fields: Option<&[String]>, result: &mut Vec<KvPair>) -> Status;

    /// Perform a range scan for a set of records in the database.
    ///
    /// * `table` - The name of the table
    /// * `start_key` - The record key of the first record to read.
    /// * `len` - The number of records to read.
    /// * `fields` - The list of fields to read, or `None` for all of them.
    /// * `result` - One entry of field/value pairs per scanned record.
    fn scan(
        &self,
        table: &str,
        start_key: &str,
        len: usize,
        fields: Option<&[String]>,
        result: &mut Vec<Vec<KvPair>>,
    ) -> Status;

    /// Update a record in the database. Any field/value pairs in `values`
    /// will be written into the record with the specified record key,
    /// overwriting any existing values with the same field name.
    fn update(&self, table: &str, key: &str, values: &[KvPair]) -> Status;

    /// Insert a record in the database. Any field/value pairs in `values`
    /// will be written into the record with the specified record key.
    fn insert(&self, table: &str, key: &str, values: &[KvPair]) -> Status;

    /// Read a record, then write `values` back to it. The default is a plain
    /// read followed by an update; adapters with native read-modify-write
    /// support may override it.
    fn read_modify_write(
        &self,
        table: &str,
        key: &str,
        fields: Option<&[String]>,
        values: &[KvPair],
    ) -> Status {
        let mut cells = Vec::new();
        match self.read(table, key, fields, &mut cells) {
            Status::Ok => self.update(table, key, values),
            status => status,
        }
    }

    /// Delete a record from the database.
    fn delete(&self, table: &str, key: &str) -> Status;
}
