use crate::db::{Db, KvPair, Status};
use crate::workload::{CoreWorkload, Op};

/// A single worker: owns its per-thread workload state, borrows the shared
/// store adapter, and turns generator output into store operations.
///
/// Because many clients run concurrently against one adapter, this type has
/// no side effects other than DB operations; all coordination happens inside
/// the workload's shared key allocator.
pub struct Client<'a, D>
where
    D: Db,
{
    db: &'a D,
    workload: CoreWorkload,
    key_buffer: String,
    values: Vec<KvPair>,
    cells: Vec<KvPair>,
    rows: Vec<Vec<KvPair>>,
}

impl<'a, D> Client<'a, D>
where
    D: Db,
{
    /// Create a client over the worker's workload state.
    pub fn new(db: &'a D, workload: CoreWorkload) -> Self {
        let key_buffer = workload.init_key_buffer();
        Self {
            db,
            workload,
            key_buffer,
            values: vec![],
            cells: vec![],
            rows: vec![],
        }
    }

    /// Do one load-phase insert. Returns whether the operation succeeded.
    ///
    /// A failed insert is retried up to the configured limit with a jittered
    /// wait in between; the keynum is not returned to the allocator either
    /// way.
    pub fn do_insert(&mut self) -> bool {
        self.workload.next_sequence_key(&mut self.key_buffer);
        self.workload.build_values(&self.key_buffer, &mut self.values);

        let mut attempt = 0;
        loop {
            let status = self.db.insert(self.workload.table(), &self.key_buffer, &self.values);
            if status == Status::Ok {
                return true;
            }
            if attempt >= self.workload.insertion_retry_limit() {
                if attempt > 0 {
                    tracing::warn!(key = %self.key_buffer, attempt, "insert retries exhausted");
                }
                return false;
            }
            attempt += 1;
            tracing::warn!(key = %self.key_buffer, attempt, "insert failed, retrying");
            let interval = self.workload.insertion_retry_interval();
            std::thread::sleep(interval.mul_f64(self.workload.retry_jitter()));
        }
    }

    /// Hand the worker's in-progress insert batch back to the allocator.
    /// Called once when the worker leaves the load loop.
    pub fn finish_load(&mut self) {
        self.workload.finish_load();
    }

    /// Do one run-phase operation. Returns whether the operation succeeded.
    pub fn do_transaction(&mut self) -> bool {
        match self.workload.next_operation() {
            Op::Read => self.txn_read(),
            Op::Update => self.txn_update(),
            Op::Insert => self.txn_insert(),
            Op::Scan => self.txn_scan(),
            Op::ReadModifyWrite => self.txn_read_modify_write(),
        }
    }

    fn txn_read(&mut self) -> bool {
        let key = self.workload.next_transaction_key();
        let fields = self.workload.read_fields();
        self.cells.clear();
        let status = self.db.read(self.workload.table(), &key, fields.as_deref(), &mut self.cells);
        if status != Status::Ok {
            return false;
        }
        if self.workload.data_integrity() {
            return self.workload.verify_row(&key, &self.cells);
        }
        true
    }

    fn txn_update(&mut self) -> bool {
        let key = self.workload.next_transaction_key();
        if self.workload.write_all_fields() {
            self.workload.build_values(&key, &mut self.values);
        } else {
            self.workload.build_update(&key, &mut self.values);
        }
        self.db.update(self.workload.table(), &key, &self.values) == Status::Ok
    }

    fn txn_insert(&mut self) -> bool {
        // Run-phase inserts extend the key space through the same batch
        // discipline as the load path.
        self.workload.next_sequence_key(&mut self.key_buffer);
        self.workload.build_values(&self.key_buffer, &mut self.values);
        self.db.insert(self.workload.table(), &self.key_buffer, &self.values) == Status::Ok
    }

    fn txn_scan(&mut self) -> bool {
        let start_key = self.workload.next_transaction_key();
        let len = self.workload.next_scan_length();
        let fields = self.workload.read_fields();
        self.rows.clear();
        self.db
            .scan(self.workload.table(), &start_key, len, fields.as_deref(), &mut self.rows)
            == Status::Ok
    }

    fn txn_read_modify_write(&mut self) -> bool {
        let key = self.workload.next_transaction_key();
        let fields = self.workload.read_fields();
        if self.workload.write_all_fields() {
            self.workload.build_values(&key, &mut self.values);
        } else {
            self.workload.build_update(&key, &mut self.values);
        }
        self.db
            .read_modify_write(self.workload.table(), &key, fields.as_deref(), &self.values)
            == Status::Ok
    }
}
