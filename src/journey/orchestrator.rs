use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::data::{DraftGenerator, ImportNotificationDraft, NotificationReference};
use crate::error::{JourneyDefect, JourneyError, JourneyResult};
use crate::http::{PageClient, SessionFactory};
use crate::identity::{IdentityBootstrap, VirtualUser};
use crate::metrics::MetricsSink;
use crate::pages::{
    AppUrls, CommodityPage, DashboardPage, HomePage, OriginPage, PurposePage, ReviewExpectations,
    ReviewPage, TransportPage,
};

use super::{AUTH_FAILURE, FAILED_JOURNEY, JOURNEY_DURATION, SUCCESSFUL_JOURNEY, Stage, ThinkTime};

/// What one iteration ended with. Harness defects are not outcomes; they
/// come back as `JourneyDefect` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyOutcome {
    Success {
        reference: Option<NotificationReference>,
    },
    ValidationFailure {
        stage: Stage,
        message: String,
    },
    AuthenticationFailure {
        message: String,
    },
}

impl JourneyOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, JourneyOutcome::Success { .. })
    }
}

#[derive(Debug, Clone)]
pub struct JourneySettings {
    pub urls: AppUrls,
    pub stub_base: String,
    pub think_time: Option<ThinkTime>,
    pub generator: DraftGenerator,
}

/// A failure tagged with the stage it happened in.
struct StageFailure {
    stage: Stage,
    error: JourneyError,
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Runs the journey for one VU iteration at a time, each on a fresh session.
#[derive(Clone)]
pub struct JourneyOrchestrator {
    sessions: Arc<dyn SessionFactory>,
    sink: Arc<dyn MetricsSink>,
    settings: Arc<JourneySettings>,
}

impl JourneyOrchestrator {
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionFactory>,
        sink: Arc<dyn MetricsSink>,
        settings: JourneySettings,
    ) -> Self {
        Self {
            sessions,
            sink,
            settings: Arc::new(settings),
        }
    }

    /// Run one full journey and account for it: exactly one of
    /// `successful_journey`, `failed_journey` or `auth_failure` is
    /// incremented, and the iteration duration is always recorded.
    ///
    /// # Errors
    ///
    /// Returns `JourneyDefect` when the harness itself failed (no session,
    /// unbuildable URL or pattern). Defects are not counted.
    pub async fn run_iteration(&self, user: &VirtualUser) -> Result<JourneyOutcome, JourneyDefect> {
        let start = Instant::now();
        let (first, second) = {
            let mut rng = rand::thread_rng();
            (
                self.settings.generator.generate(&mut rng),
                self.settings.generator.generate(&mut rng),
            )
        };
        info!("VU {}: Starting journey for {}", user.id, user.email);
        info!(
            "VU {}: Test data: {} -> {}",
            user.id, first.country_code, first.commodity.commodity.description
        );

        let transport = self.sessions.open().map_err(|err| JourneyDefect {
            vu: user.id,
            stage: "session",
            message: err.to_string(),
        })?;
        let client = PageClient::new(transport, Arc::clone(&self.sink));
        let result = self.journey(&client, user, &first, &second).await;
        let duration_ms = elapsed_ms(start);
        self.sink.add_trend(JOURNEY_DURATION, duration_ms);

        match result {
            Ok(reference) => {
                self.sink.add_counter(SUCCESSFUL_JOURNEY, 1);
                match reference.as_ref().map(NotificationReference::to_ched_reference) {
                    Some(Ok(ched)) => info!(
                        "VU {}: Journey completed successfully in {}ms ({})",
                        user.id, duration_ms, ched
                    ),
                    Some(Err(err)) => warn!(
                        "VU {}: Journey completed in {}ms; reference not convertible: {}",
                        user.id, duration_ms, err
                    ),
                    None => info!(
                        "VU {}: Journey completed successfully in {}ms",
                        user.id, duration_ms
                    ),
                }
                Ok(JourneyOutcome::Success { reference })
            }
            Err(StageFailure { stage, error }) => match error {
                JourneyError::Validation(failure) => {
                    error!("VU {}: {}", user.id, failure.message);
                    self.sink.add_counter(FAILED_JOURNEY, 1);
                    Ok(JourneyOutcome::ValidationFailure {
                        stage,
                        message: failure.message,
                    })
                }
                JourneyError::Authentication(failure) => {
                    error!("VU {}: {}", user.id, failure.message);
                    self.sink.add_counter(AUTH_FAILURE, 1);
                    Ok(JourneyOutcome::AuthenticationFailure {
                        message: failure.message,
                    })
                }
                JourneyError::Defect { message } => Err(JourneyDefect {
                    vu: user.id,
                    stage: stage.as_str(),
                    message,
                }),
            },
        }
    }

    /// Time `future` as `stage`, counting a classified failure against the stage.
    async fn stage<T, F>(&self, stage: Stage, future: F) -> Result<T, StageFailure>
    where
        F: Future<Output = JourneyResult<T>>,
    {
        let start = Instant::now();
        let result = future.await;
        self.sink.add_trend(stage.duration_metric(), elapsed_ms(start));
        result.map_err(|error| {
            if error.is_classified() {
                self.sink.add_counter(stage.failure_counter(), 1);
            }
            StageFailure { stage, error }
        })
    }

    async fn think(&self) {
        let Some(think_time) = self.settings.think_time else {
            return;
        };
        let pause = think_time.sample(&mut rand::thread_rng());
        tokio::time::sleep(pause).await;
    }

    async fn journey(
        &self,
        client: &PageClient,
        user: &VirtualUser,
        first: &ImportNotificationDraft,
        second: &ImportNotificationDraft,
    ) -> Result<Option<NotificationReference>, StageFailure> {
        let urls = &self.settings.urls;
        let origin = OriginPage::new(client, urls);
        let commodity = CommodityPage::new(client, urls);
        let purpose = PurposePage::new(client, urls);
        let transport = TransportPage::new(client, urls);
        let review = ReviewPage::new(client, urls);
        let selection = first.commodity;
        let species = selection.commodity.species;

        self.stage(
            Stage::Authenticate,
            IdentityBootstrap::new(client, urls, &self.settings.stub_base)
                .authenticate(&user.email),
        )
        .await?;
        self.think().await;

        self.stage(Stage::Home, HomePage::new(client, urls).visit())
            .await?;
        self.stage(Stage::Dashboard, DashboardPage::new(client, urls).visit())
            .await?;
        self.think().await;

        let crumb = self
            .stage(Stage::Origin, async move {
                let crumb = origin.visit().await?;
                origin.submit(crumb, first.country_code).await
            })
            .await?;
        self.think().await;

        let crumb = self
            .stage(Stage::Commodity, async move {
                let crumb = commodity
                    .search_code(crumb, selection.commodity.code)
                    .await?;
                let crumb = commodity
                    .select_species(crumb, species.species_type, species.id)
                    .await?;
                commodity
                    .save_quantities(crumb, species.id, selection.animals, selection.packs)
                    .await
            })
            .await?;
        self.think().await;

        let crumb = self
            .stage(
                Stage::Purpose,
                purpose.submit(
                    crumb,
                    first.purpose.as_str(),
                    first.internal_market_purpose,
                ),
            )
            .await?;
        self.think().await;

        let crumb = self
            .stage(Stage::Transport, transport.submit(crumb, &first.transport))
            .await?;
        self.think().await;

        let token = self
            .stage(
                Stage::Review,
                review.validate(&ReviewExpectations {
                    country: first.country_code,
                    commodity: selection.commodity.description,
                    reason: first.purpose.as_str(),
                    purpose: first.internal_market_purpose,
                    bcp: first.transport.bcp,
                }),
            )
            .await?;
        self.stage(Stage::SaveDraft, review.save_as_draft(&token))
            .await?;
        self.think().await;

        // Only quantities change; purpose keeps its main reason and transport is redrawn.
        let crumb = self
            .stage(Stage::ChangeFlow, async move {
                let crumb = commodity.change(crumb).await?;
                let (animals, packs) = selection.halved();
                let crumb = commodity
                    .save_quantities(crumb, species.id, animals, packs)
                    .await?;
                let crumb = purpose
                    .submit(
                        crumb,
                        first.purpose.as_str(),
                        second.internal_market_purpose,
                    )
                    .await?;
                transport.submit(crumb, &second.transport).await
            })
            .await?;
        self.think().await;

        let token = self
            .stage(
                Stage::Review,
                review.validate(&ReviewExpectations {
                    country: first.country_code,
                    commodity: selection.commodity.description,
                    reason: first.purpose.as_str(),
                    purpose: second.internal_market_purpose,
                    bcp: second.transport.bcp,
                }),
            )
            .await?;
        self.stage(Stage::SaveDraft, review.save_as_draft(&token))
            .await?;
        self.think().await;

        self.stage(Stage::Submit, review.submit(crumb, true)).await
    }
}
