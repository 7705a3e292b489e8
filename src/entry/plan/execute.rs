use std::sync::Arc;

use crate::app::{
    POOL_PAUSE, print_ched_reference, run_load_test, run_pool_cleanup, run_pool_create,
};
use crate::config::RunSettings;
use crate::error::{AppError, AppResult, PoolError, ValidationError};
use crate::http::{ReqwestSessionFactory, ReqwestTransport, Transport};
use crate::identity::RetryPolicy;

use super::types::RunPlan;

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    match plan {
        RunPlan::LoadTest(settings) => {
            let sessions = Arc::new(ReqwestSessionFactory::new(settings.client.clone()));
            let outcome = run_load_test(&settings, sessions).await?;
            if outcome.report.passed {
                return Ok(());
            }
            Err(AppError::validation(ValidationError::ThresholdsCrossed {
                failed: outcome.report.failed_thresholds().max(1),
            }))
        }
        RunPlan::PoolCreate(settings) => {
            let transport = stub_transport(&settings)?;
            run_pool_create(&settings, transport, RetryPolicy::default(), POOL_PAUSE).await?;
            Ok(())
        }
        RunPlan::PoolCleanup(settings) => {
            let transport = stub_transport(&settings)?;
            run_pool_cleanup(&settings, transport, RetryPolicy::default(), POOL_PAUSE).await;
            Ok(())
        }
        RunPlan::ChedReference(notification_id) => {
            print_ched_reference(&notification_id)?;
            Ok(())
        }
    }
}

fn stub_transport(settings: &RunSettings) -> AppResult<Box<dyn Transport>> {
    let transport = ReqwestTransport::new(&settings.client)
        .map_err(|source| AppError::pool(PoolError::BuildClient { source }))?;
    Ok(Box::new(transport))
}
