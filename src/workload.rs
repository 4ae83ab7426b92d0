use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, ensure, Result};
use itertools::Itertools;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    db::KvPair,
    generator::{
        batched::BatchedCounterGenerator,
        constant::ConstantGenerator,
        counter::CounterGenerator,
        discrete::{Choice, DiscreteGenerator},
        latest::{AcknowledgedLatestGenerator, SkewedLatestGenerator},
        uniform::UniformGenerator,
        zipfian::{ScrambledZipfianGenerator, ZipfianGenerator},
        Generator, NumberGenerator,
    },
    properties::Properties,
    utils::{deterministic_value, fnvhash64, random_letters},
};

/// Prefix shared by every rendered key.
const KEY_PREFIX: &str = "user";

/// Operations a workload issues against a database.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Update,
    Insert,
    Scan,
    ReadModifyWrite,
}

/// Configuration for the [`CoreWorkload`].
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CoreWorkloadConfig {
    /// The name of the database table to run queries against.
    #[serde(default = "default::table")]
    table: String,
    /// The number of fields in a record.
    #[serde(default = "default::field_count")]
    field_count: usize,
    /// Field name prefix.
    #[serde(default = "default::field_name_prefix")]
    field_name_prefix: String,
    /// Field length distribution.
    ///
    /// Options are "constant", "uniform" and "zipfian" (favoring short
    /// records). If "constant", only `field_length` is used.
    #[serde(default = "default::field_length_distribution")]
    field_length_distribution: String,
    /// Min field length.
    #[serde(default = "default::min_field_length")]
    min_field_length: usize,
    /// Bytes per field when the distribution is constant; the upper bound
    /// otherwise.
    #[serde(default = "default::field_length")]
    field_length: usize,
    /// The size of the insert key space.
    #[serde(default = "default::record_count")]
    record_count: u64,
    /// The run-phase operation budget.
    #[serde(default = "default::operation_count")]
    operation_count: u64,
    /// The distribution of requests across the keyspace.
    ///
    /// Options are "uniform", "zipfian" and "latest".
    #[serde(default = "default::request_distribution")]
    request_distribution: String,
    /// The scan length distribution.
    ///
    /// Options are "uniform" and "zipfian" (favoring short scans).
    #[serde(default = "default::scan_length_distribution")]
    scan_length_distribution: String,
    /// The min scan length (number of records).
    #[serde(default = "default::min_scan_length")]
    min_scan_length: u64,
    /// The max scan length (number of records).
    #[serde(default = "default::max_scan_length")]
    max_scan_length: u64,
    /// First keynum of this instance's key space, for running multiple
    /// harness instances against disjoint slices of one database.
    #[serde(default = "default::insert_start")]
    insert_start: u64,
    /// Adding zero padding to record numbers in order to match string sort
    /// order. Controls the number of 0s to left pad with.
    #[serde(default = "default::zero_padding")]
    zero_padding: usize,
    /// Deciding whether to read one field (false) or all fields (true) of a record.
    #[serde(default = "default::read_all_fields")]
    read_all_fields: bool,
    /// How to read all the fields when `read_all_fields` is `true`.
    ///
    /// If set to `true`, all the field names will be passed into the
    /// underlying client. If set to `false`, `None` will be passed and some
    /// clients may retrieve the entire row with a wildcard.
    #[serde(default = "default::read_all_fields_by_name")]
    read_all_fields_by_name: bool,
    /// Deciding whether to write one field (false) or all fields (true) of a record.
    #[serde(default = "default::write_all_fields")]
    write_all_fields: bool,
    /// Deciding whether to check returned data against the generation
    /// template to ensure data integrity.
    #[serde(default = "default::data_integrity")]
    data_integrity: bool,
    /// The order to insert records. Options are "ordered" or "hashed".
    #[serde(default = "default::insert_order")]
    insert_order: String,
    /// Proportion of transactions that are reads.
    #[serde(default = "default::read_proportion")]
    read_proportion: f64,
    /// Proportion of transactions that are updates.
    #[serde(default = "default::update_proportion")]
    update_proportion: f64,
    /// Proportion of transactions that are inserts.
    #[serde(default = "default::insert_proportion")]
    insert_proportion: f64,
    /// Proportion of transactions that are scans.
    #[serde(default = "default::scan_proportion")]
    scan_proportion: f64,
    /// Proportion of transactions that are read-modify-writes.
    #[serde(default = "default::read_modify_write_proportion")]
    read_modify_write_proportion: f64,
    /// How many times to retry when insertion of a single item to a DB fails.
    #[serde(default = "default::insertion_retry_limit")]
    insertion_retry_limit: usize,
    /// On average, how long to wait between the retries, in seconds.
    #[serde(default = "default::insertion_retry_interval")]
    insertion_retry_interval: u64,
    /// Global RNG seed; each worker derives its own stream from it.
    #[serde(default = "default::seed")]
    seed: u64,
}

impl CoreWorkloadConfig {
    /// Build a config from a property bag, recognizing the classic workload
    /// option names (`recordcount`, `fieldlength`, ...). Absent options fall
    /// back to their defaults.
    pub fn from_properties(props: &Properties) -> Result<Self> {
        Ok(Self {
            table: props.get_or("table", &default::table()).to_string(),
            field_count: props.get_usize("fieldcount", default::field_count())?,
            field_name_prefix: props
                .get_or("fieldnameprefix", &default::field_name_prefix())
                .to_string(),
            field_length_distribution: props
                .get_or("fieldlengthdistribution", &default::field_length_distribution())
                .to_string(),
            min_field_length: props.get_usize("minfieldlength", default::min_field_length())?,
            field_length: props.get_usize("fieldlength", default::field_length())?,
            record_count: props.get_u64("recordcount", default::record_count())?,
            operation_count: props.get_u64("operationcount", default::operation_count())?,
            request_distribution: props
                .get_or("requestdistribution", &default::request_distribution())
                .to_string(),
            scan_length_distribution: props
                .get_or("scanlengthdistribution", &default::scan_length_distribution())
                .to_string(),
            min_scan_length: props.get_u64("minscanlength", default::min_scan_length())?,
            max_scan_length: props.get_u64("maxscanlength", default::max_scan_length())?,
            insert_start: props.get_u64("insertstart", default::insert_start())?,
            zero_padding: props.get_usize("zeropadding", default::zero_padding())?,
            read_all_fields: props.get_bool("readallfields", default::read_all_fields())?,
            read_all_fields_by_name: props
                .get_bool("readallfieldsbyname", default::read_all_fields_by_name())?,
            write_all_fields: props.get_bool("writeallfields", default::write_all_fields())?,
            data_integrity: props.get_bool("dataintegrity", default::data_integrity())?,
            insert_order: props.get_or("insertorder", &default::insert_order()).to_string(),
            read_proportion: props.get_f64("readproportion", default::read_proportion())?,
            update_proportion: props.get_f64("updateproportion", default::update_proportion())?,
            insert_proportion: props.get_f64("insertproportion", default::insert_proportion())?,
            scan_proportion: props.get_f64("scanproportion", default::scan_proportion())?,
            read_modify_write_proportion: props.get_f64(
                "readmodifywriteproportion",
                default::read_modify_write_proportion(),
            )?,
            insertion_retry_limit: props
                .get_usize("insertionretrylimit", default::insertion_retry_limit())?,
            insertion_retry_interval: props
                .get_u64("insertionretryinterval", default::insertion_retry_interval())?,
            seed: props.get_u64("seed", default::seed())?,
        })
    }

    /// The size of the insert key space.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// The run-phase operation budget.
    pub fn operation_count(&self) -> u64 {
        self.operation_count
    }

    /// First keynum of the key space.
    pub fn insert_start(&self) -> u64 {
        self.insert_start
    }

    /// Set the size of the insert key space.
    pub fn set_record_count(&mut self, record_count: u64) {
        self.record_count = record_count;
    }

    /// Set the run-phase operation budget.
    pub fn set_operation_count(&mut self, operation_count: u64) {
        self.operation_count = operation_count;
    }
}

/// The core benchmark scenario: clients doing simple CRUD operations, with
/// the relative proportion of the operation kinds, the key distributions and
/// the payload shape controlled by [`CoreWorkloadConfig`].
///
/// One instance exists per worker thread. It owns the worker's RNG and its
/// choosers, and shares the batched key allocator with the other workers:
/// insert keynums are pulled a batch at a time, and transaction keynums are
/// redrawn until they fall inside the allocator's completed prefix, so a
/// transaction never targets a key whose insert is still in flight.
pub struct CoreWorkload {
    table: String,
    field_names: Vec<String>,
    field_len_generator: NumberGenerator,
    op_chooser: DiscreteGenerator<Op>,
    key_chooser: NumberGenerator,
    field_chooser: UniformGenerator,
    scan_len_chooser: NumberGenerator,
    key_allocator: Arc<BatchedCounterGenerator>,
    batch_cursor: CounterGenerator,
    batch_first: Option<u64>,
    batch_remaining: u64,
    ordered_inserts: bool,
    zero_padding: usize,
    read_all_fields: bool,
    read_all_fields_by_name: bool,
    write_all_fields: bool,
    data_integrity: bool,
    insertion_retry_limit: usize,
    insertion_retry_interval: Duration,
    rng: SmallRng,
}

impl CoreWorkload {
    /// Build the workload state for one worker.
    ///
    /// `key_allocator` is the phase-wide allocator shared by all workers;
    /// `worker_index` seeds this worker's RNG stream off the global seed.
    pub fn new(
        config: &CoreWorkloadConfig,
        key_allocator: Arc<BatchedCounterGenerator>,
        worker_index: u64,
    ) -> Result<Self> {
        ensure!(config.record_count > 0, "recordcount must be positive");
        ensure!(config.field_count > 0, "fieldcount must be positive");

        let field_len_generator = match config.field_length_distribution.as_str() {
            "constant" => NumberGenerator::Constant(ConstantGenerator::new(config.field_length as u64)),
            "uniform" => {
                ensure!(
                    config.min_field_length <= config.field_length,
                    "minfieldlength {} exceeds fieldlength {}",
                    config.min_field_length,
                    config.field_length
                );
                NumberGenerator::Uniform(UniformGenerator::new(
                    config.min_field_length as u64,
                    config.field_length as u64,
                ))
            }
            "zipfian" => {
                ensure!(
                    config.min_field_length <= config.field_length,
                    "minfieldlength {} exceeds fieldlength {}",
                    config.min_field_length,
                    config.field_length
                );
                NumberGenerator::Zipfian(ZipfianGenerator::new(
                    config.min_field_length as u64,
                    config.field_length as u64,
                ))
            }
            other => bail!("field length distribution not supported: {other}"),
        };

        if config.data_integrity && config.field_length_distribution != "constant" {
            bail!("data integrity checks require a constant field length");
        }

        let mut choices = vec![];
        if config.read_proportion > 0.0 {
            choices.push(Choice { val: Op::Read, weight: config.read_proportion });
        }
        if config.update_proportion > 0.0 {
            choices.push(Choice { val: Op::Update, weight: config.update_proportion });
        }
        if config.insert_proportion > 0.0 {
            choices.push(Choice { val: Op::Insert, weight: config.insert_proportion });
        }
        if config.scan_proportion > 0.0 {
            choices.push(Choice { val: Op::Scan, weight: config.scan_proportion });
        }
        if config.read_modify_write_proportion > 0.0 {
            choices.push(Choice {
                val: Op::ReadModifyWrite,
                weight: config.read_modify_write_proportion,
            });
        }
        let op_chooser = DiscreteGenerator::new(choices)?;

        let ordered_inserts = match config.insert_order.as_str() {
            "ordered" => true,
            "hashed" => false,
            other => bail!("insert order not supported: {other}"),
        };

        let last_keynum = config.insert_start + config.record_count - 1;
        let key_chooser = match config.request_distribution.as_str() {
            "uniform" => {
                NumberGenerator::Uniform(UniformGenerator::new(config.insert_start, last_keynum))
            }
            "zipfian" => {
                // Size the domain past the loaded records so run-phase inserts
                // stay inside the chooser's support; draws above the frontier
                // are rejected and redrawn either way.
                let expected_new =
                    2 * (config.operation_count as f64 * config.insert_proportion) as u64;
                if ordered_inserts {
                    NumberGenerator::ScrambledZipfian(ScrambledZipfianGenerator::new(
                        config.insert_start,
                        last_keynum + expected_new,
                    ))
                } else {
                    NumberGenerator::Zipfian(ZipfianGenerator::new(
                        config.insert_start,
                        last_keynum + expected_new,
                    ))
                }
            }
            "latest" => {
                if config.insert_proportion > 0.0 {
                    NumberGenerator::AcknowledgedLatest(AcknowledgedLatestGenerator::new(
                        key_allocator.clone(),
                    ))
                } else {
                    NumberGenerator::SkewedLatest(SkewedLatestGenerator::new(key_allocator.clone()))
                }
            }
            other => bail!("request distribution not supported: {other}"),
        };

        ensure!(
            config.min_scan_length >= 1 && config.min_scan_length <= config.max_scan_length,
            "invalid scan length interval [{}, {}]",
            config.min_scan_length,
            config.max_scan_length
        );
        let scan_len_chooser = match config.scan_length_distribution.as_str() {
            "uniform" => NumberGenerator::Uniform(UniformGenerator::new(
                config.min_scan_length,
                config.max_scan_length,
            )),
            "zipfian" => NumberGenerator::Zipfian(ZipfianGenerator::new(
                config.min_scan_length,
                config.max_scan_length,
            )),
            other => bail!("scan length distribution not supported: {other}"),
        };

        let field_names = (0..config.field_count)
            .map(|i| format!("{prefix}{i}", prefix = config.field_name_prefix))
            .collect_vec();
        let field_chooser = UniformGenerator::new(0, field_names.len() as u64 - 1);

        Ok(Self {
            table: config.table.clone(),
            field_names,
            field_len_generator,
            op_chooser,
            key_chooser,
            field_chooser,
            scan_len_chooser,
            key_allocator,
            batch_cursor: CounterGenerator::new(0),
            batch_first: None,
            batch_remaining: 0,
            ordered_inserts,
            zero_padding: config.zero_padding,
            read_all_fields: config.read_all_fields,
            read_all_fields_by_name: config.read_all_fields_by_name,
            write_all_fields: config.write_all_fields,
            data_integrity: config.data_integrity,
            insertion_retry_limit: config.insertion_retry_limit,
            insertion_retry_interval: Duration::from_secs(config.insertion_retry_interval),
            rng: SmallRng::seed_from_u64(config.seed ^ worker_index),
        })
    }

    /// The name of the table to run queries against.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether reads fetch all fields of a record.
    pub fn read_all_fields(&self) -> bool {
        self.read_all_fields
    }

    /// Whether updates and read-modify-writes write all fields of a record.
    pub fn write_all_fields(&self) -> bool {
        self.write_all_fields
    }

    /// Whether returned cells are verified against the generation template.
    pub fn data_integrity(&self) -> bool {
        self.data_integrity
    }

    /// How many times a failed load insert is retried.
    pub fn insertion_retry_limit(&self) -> usize {
        self.insertion_retry_limit
    }

    /// Mean wait between insert retries.
    pub fn insertion_retry_interval(&self) -> Duration {
        self.insertion_retry_interval
    }

    /// ±20% jitter factor applied to the retry interval.
    pub(crate) fn retry_jitter(&mut self) -> f64 {
        self.rng.gen_range(0.8..=1.2)
    }

    /// A key buffer seeded for the in-place rendering of sequence keys.
    pub fn init_key_buffer(&self) -> String {
        self.build_key_name(0)
    }

    /// Produce the next insert keynum and render it into `buffer`.
    ///
    /// Keynums are consumed out of the worker's current batch; an exhausted
    /// batch is handed back to the allocator as completed before the next one
    /// is pulled. Every keynum of the space is produced exactly once across
    /// all workers.
    pub fn next_sequence_key(&mut self, buffer: &mut String) {
        if self.batch_remaining == 0 {
            if let Some(first) = self.batch_first.take() {
                self.key_allocator.mark_completed(first);
            }
            let first = self.key_allocator.next_batch();
            self.batch_cursor.set(first);
            self.batch_first = Some(first);
            self.batch_remaining = self.key_allocator.batch_size();
        }
        let key_num = self.batch_cursor.next();
        self.batch_remaining -= 1;
        self.update_key_name(key_num, buffer);
    }

    /// Hand the in-progress batch back to the allocator.
    ///
    /// Called once when the worker leaves its insert loop so the completion
    /// frontier covers the final, possibly partially consumed, batch.
    pub fn finish_load(&mut self) {
        if let Some(first) = self.batch_first.take() {
            self.key_allocator.mark_completed(first);
            self.batch_remaining = 0;
        }
    }

    /// Choose a transaction keynum and render its key.
    ///
    /// Draws are rejected until they fall at or below the completion
    /// frontier, so the returned key is never one whose insert is still
    /// outstanding.
    pub fn next_transaction_key(&mut self) -> String {
        let key_num = self.next_transaction_keynum();
        self.build_key_name(key_num)
    }

    fn next_transaction_keynum(&mut self) -> u64 {
        loop {
            let key_num = self.key_chooser.next(&mut self.rng);
            if key_num <= self.key_allocator.last_completed_keynum() {
                return key_num;
            }
        }
    }

    /// Choose the next operation.
    pub fn next_operation(&mut self) -> Op {
        self.op_chooser.next(&mut self.rng)
    }

    /// Choose the next scan length.
    pub fn next_scan_length(&mut self) -> usize {
        self.scan_len_chooser.next(&mut self.rng) as usize
    }

    /// Choose a field name uniformly.
    pub fn next_field_name(&mut self) -> String {
        let index = self.field_chooser.next(&mut self.rng) as usize;
        self.field_names[index].clone()
    }

    /// The field list to pass to a read-type operation, or `None` for the
    /// read-all wildcard.
    pub fn read_fields(&mut self) -> Option<Vec<String>> {
        if !self.read_all_fields {
            Some(vec![self.next_field_name()])
        } else if self.data_integrity || self.read_all_fields_by_name {
            Some(self.field_names.clone())
        } else {
            None
        }
    }

    /// Render `key_num` as a key: scrambled unless inserts are ordered,
    /// decimal, left-padded with zeros, `"user"`-prefixed. Injective for a
    /// fixed configuration.
    pub fn build_key_name(&self, mut key_num: u64) -> String {
        if !self.ordered_inserts {
            key_num = fnvhash64(key_num);
        }
        format!("{KEY_PREFIX}{key_num:0width$}", width = self.zero_padding)
    }

    /// Re-render `buffer` (a key produced by [`Self::build_key_name`] or
    /// [`Self::init_key_buffer`]) for `key_num`, overwriting only the digit
    /// region and reusing the buffer's allocation on the insert hot path.
    pub fn update_key_name(&self, mut key_num: u64, buffer: &mut String) {
        if !self.ordered_inserts {
            key_num = fnvhash64(key_num);
        }
        buffer.truncate(KEY_PREFIX.len());
        write!(buffer, "{key_num:0width$}", width = self.zero_padding).unwrap();
    }

    /// Fill `out` with freshly generated payloads for all fields of a record.
    pub fn build_values(&mut self, key: &str, out: &mut Vec<KvPair>) {
        out.clear();
        for index in 0..self.field_names.len() {
            let field = self.field_names[index].clone();
            let len = self.field_len_generator.next(&mut self.rng) as usize;
            let value = self.build_value(len, key, &field);
            out.push((field, value));
        }
    }

    /// Fill `out` with a freshly generated payload for one random field.
    pub fn build_update(&mut self, key: &str, out: &mut Vec<KvPair>) {
        out.clear();
        let field = self.next_field_name();
        let len = self.field_len_generator.next(&mut self.rng) as usize;
        let value = self.build_value(len, key, &field);
        out.push((field, value));
    }

    fn build_value(&mut self, len: usize, key: &str, field: &str) -> String {
        if self.data_integrity {
            deterministic_value(len, key, field)
        } else {
            random_letters(&mut self.rng, len)
        }
    }

    /// Check returned cells against the deterministic generation template.
    /// Returns whether every requested cell matched.
    pub fn verify_row(&mut self, key: &str, cells: &[KvPair]) -> bool {
        if cells.is_empty() {
            tracing::warn!(key, "data integrity check read no cells");
            return false;
        }
        for (field, value) in cells {
            let len = self.field_len_generator.next(&mut self.rng) as usize;
            if *value != deterministic_value(len, key, field) {
                tracing::warn!(key, field, "data integrity mismatch");
                return false;
            }
        }
        true
    }
}

/// Default values for configurations.
#[allow(missing_docs)]
pub mod default {
    pub fn table() -> String {
        "usertable".to_string()
    }

    pub fn field_count() -> usize {
        10
    }

    pub fn field_name_prefix() -> String {
        "field".to_string()
    }

    pub fn field_length_distribution() -> String {
        "constant".to_string()
    }

    pub fn min_field_length() -> usize {
        1
    }

    pub fn field_length() -> usize {
        100
    }

    pub fn record_count() -> u64 {
        0
    }

    pub fn operation_count() -> u64 {
        0
    }

    pub fn request_distribution() -> String {
        "uniform".to_string()
    }

    pub fn scan_length_distribution() -> String {
        "uniform".to_string()
    }

    pub fn min_scan_length() -> u64 {
        1
    }

    pub fn max_scan_length() -> u64 {
        1000
    }

    pub fn insert_start() -> u64 {
        0
    }

    pub fn zero_padding() -> usize {
        1
    }

    pub fn read_all_fields() -> bool {
        true
    }

    pub fn read_all_fields_by_name() -> bool {
        false
    }

    pub fn write_all_fields() -> bool {
        false
    }

    pub fn data_integrity() -> bool {
        false
    }

    pub fn insert_order() -> String {
        "hashed".to_string()
    }

    pub fn read_proportion() -> f64 {
        0.95
    }

    pub fn update_proportion() -> f64 {
        0.05
    }

    pub fn insert_proportion() -> f64 {
        0.0
    }

    pub fn scan_proportion() -> f64 {
        0.0
    }

    pub fn read_modify_write_proportion() -> f64 {
        0.0
    }

    pub fn insertion_retry_limit() -> usize {
        0
    }

    pub fn insertion_retry_interval() -> u64 {
        3
    }

    pub fn seed() -> u64 {
        0x9E3779B97F4A7C15
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::utils::fnvhash64;

    fn config(record_count: u64) -> CoreWorkloadConfig {
        let mut props = Properties::new();
        props.set("recordcount", record_count.to_string());
        CoreWorkloadConfig::from_properties(&props).unwrap()
    }

    fn workload(config: &CoreWorkloadConfig, batch_size: u64) -> CoreWorkload {
        let allocator = Arc::new(BatchedCounterGenerator::new(config.insert_start(), batch_size));
        CoreWorkload::new(config, allocator, 0).unwrap()
    }

    #[test]
    fn test_single_thread_sequence() {
        let mut props = Properties::new();
        props.set("recordcount", "100");
        props.set("insertorder", "ordered");
        props.set("zeropadding", "3");
        let config = CoreWorkloadConfig::from_properties(&props).unwrap();
        let allocator = Arc::new(BatchedCounterGenerator::new(0, 10));
        let mut wl = CoreWorkload::new(&config, allocator.clone(), 0).unwrap();

        let mut buffer = wl.init_key_buffer();
        for i in 0..100 {
            wl.next_sequence_key(&mut buffer);
            assert_eq!(buffer, format!("user{i:03}"));
        }
        wl.finish_load();
        assert_eq!(allocator.last_completed_keynum(), 100);
    }

    #[test]
    fn test_partial_final_batch_completed() {
        let config = config(25);
        let allocator = Arc::new(BatchedCounterGenerator::new(0, 10));
        let mut wl = CoreWorkload::new(&config, allocator.clone(), 0).unwrap();
        let mut buffer = wl.init_key_buffer();
        for _ in 0..25 {
            wl.next_sequence_key(&mut buffer);
        }
        assert_eq!(allocator.last_completed_keynum(), 20);
        wl.finish_load();
        assert_eq!(allocator.last_completed_keynum(), 30);
        // Idempotent once the batch is handed back.
        wl.finish_load();
        assert_eq!(allocator.last_completed_keynum(), 30);
    }

    #[test]
    fn test_key_name_injective_and_fixed_width() {
        let mut props = Properties::new();
        props.set("recordcount", "1000");
        props.set("insertorder", "hashed");
        props.set("zeropadding", "20");
        let config = CoreWorkloadConfig::from_properties(&props).unwrap();
        let wl = workload(&config, 100);

        let mut keys = HashSet::new();
        for key_num in 0..1000u64 {
            let key = wl.build_key_name(key_num);
            assert_eq!(key.len(), 24);
            assert!(keys.insert(key), "collision at keynum {key_num}");
        }

        // Fixed-width rendering sorts like the scrambled keynums themselves.
        let mut by_key: Vec<_> = (0..1000u64).map(|n| wl.build_key_name(n)).collect();
        by_key.sort();
        let mut by_hash: Vec<_> = (0..1000u64).collect();
        by_hash.sort_by_key(|n| fnvhash64(*n));
        let rendered: Vec<_> = by_hash.iter().map(|n| wl.build_key_name(*n)).collect();
        assert_eq!(by_key, rendered);
    }

    #[test]
    fn test_update_key_name_matches_build() {
        let mut props = Properties::new();
        props.set("recordcount", "1000");
        props.set("zeropadding", "20");
        let config = CoreWorkloadConfig::from_properties(&props).unwrap();
        let wl = workload(&config, 100);

        let mut buffer = wl.init_key_buffer();
        for key_num in [0u64, 1, 99, 1000, u64::MAX] {
            wl.update_key_name(key_num, &mut buffer);
            assert_eq!(buffer, wl.build_key_name(key_num));
        }
    }

    #[test]
    fn test_transaction_keys_stay_below_frontier() {
        let config = config(1000);
        let allocator = Arc::new(BatchedCounterGenerator::new(0, 100));
        let mut wl = CoreWorkload::new(&config, allocator.clone(), 0).unwrap();

        // Load only part of the key space.
        let mut buffer = wl.init_key_buffer();
        for _ in 0..300 {
            wl.next_sequence_key(&mut buffer);
        }
        assert_eq!(allocator.last_completed_keynum(), 200);

        let mut checker = CoreWorkload::new(&config, allocator.clone(), 1).unwrap();
        for _ in 0..10_000 {
            let key_num = checker.next_transaction_keynum();
            assert!(key_num <= allocator.last_completed_keynum());
        }
    }

    #[test]
    fn test_build_values_shape() {
        let mut props = Properties::new();
        props.set("recordcount", "10");
        props.set("fieldcount", "4");
        props.set("fieldlength", "32");
        let config = CoreWorkloadConfig::from_properties(&props).unwrap();
        let mut wl = workload(&config, 10);

        let mut values = vec![];
        wl.build_values("user0", &mut values);
        assert_eq!(values.len(), 4);
        for (index, (field, value)) in values.iter().enumerate() {
            assert_eq!(field, &format!("field{index}"));
            assert_eq!(value.len(), 32);
        }

        let mut update = vec![];
        wl.build_update("user0", &mut update);
        assert_eq!(update.len(), 1);
        assert_eq!(update[0].1.len(), 32);
    }

    #[test]
    fn test_deterministic_values_verify() {
        let mut props = Properties::new();
        props.set("recordcount", "10");
        props.set("dataintegrity", "true");
        let config = CoreWorkloadConfig::from_properties(&props).unwrap();
        let mut wl = workload(&config, 10);

        let mut values = vec![];
        wl.build_values("user7", &mut values);
        assert!(wl.verify_row("user7", &values));

        values[0].1 = "corrupted".to_string();
        assert!(!wl.verify_row("user7", &values));
        assert!(!wl.verify_row("user7", &[]));
    }

    #[test]
    fn test_config_errors() {
        let allocator = Arc::new(BatchedCounterGenerator::new(0, 10));

        let zero_records = config(0);
        assert!(CoreWorkload::new(&zero_records, allocator.clone(), 0).is_err());

        let mut props = Properties::new();
        props.set("recordcount", "10");
        props.set("requestdistribution", "exponential");
        let unknown = CoreWorkloadConfig::from_properties(&props).unwrap();
        assert!(CoreWorkload::new(&unknown, allocator.clone(), 0).is_err());

        let mut props = Properties::new();
        props.set("recordcount", "10");
        props.set("readproportion", "0");
        props.set("updateproportion", "0");
        let empty_mix = CoreWorkloadConfig::from_properties(&props).unwrap();
        assert!(CoreWorkload::new(&empty_mix, allocator.clone(), 0).is_err());

        let mut props = Properties::new();
        props.set("recordcount", "10");
        props.set("dataintegrity", "true");
        props.set("fieldlengthdistribution", "uniform");
        let integrity = CoreWorkloadConfig::from_properties(&props).unwrap();
        assert!(CoreWorkload::new(&integrity, allocator, 0).is_err());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = config(1234);
        let json = serde_json::to_string(&config).unwrap();
        let back: CoreWorkloadConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.record_count(), 1234);
        assert_eq!(back.operation_count(), config.operation_count());
    }

    #[test]
    fn test_latest_distribution_tracks_frontier() {
        let mut props = Properties::new();
        props.set("recordcount", "1000");
        props.set("requestdistribution", "latest");
        let config = CoreWorkloadConfig::from_properties(&props).unwrap();
        let allocator = Arc::new(BatchedCounterGenerator::new(0, 100));
        let mut loader = CoreWorkload::new(&config, allocator.clone(), 0).unwrap();

        let mut buffer = loader.init_key_buffer();
        for _ in 0..1000 {
            loader.next_sequence_key(&mut buffer);
        }
        loader.finish_load();

        let mut wl = CoreWorkload::new(&config, allocator, 1).unwrap();
        for _ in 0..10_000 {
            let key_num = wl.next_transaction_keynum();
            assert!(key_num <= 1000);
        }
    }
}
