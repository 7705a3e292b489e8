mod pool;


pub(crate) use load_test::{LoadTestOutcome, run_load_test};
pub(crate) use pool::{POOL_PAUSE, print_ched_reference, run_pool_cleanup, run_pool_create};
