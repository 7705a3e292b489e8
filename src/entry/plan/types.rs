use crate::config::RunSettings;

pub(in crate::entry) enum RunPlan {
    LoadTest(Box<RunSettings>),
    PoolCreate(Box<RunSettings>),
    PoolCleanup(Box<RunSettings>),
    ChedReference(String),
}
