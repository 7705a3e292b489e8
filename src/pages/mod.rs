//! One module per page of the import notification journey.
mod commodity;
mod dashboard;
mod home;
mod origin;
mod purpose;
mod review;
pub mod tags;
mod transport;
mod urls;


pub use commodity::CommodityPage;
pub use dashboard::DashboardPage;
pub use home::HomePage;
pub use origin::OriginPage;
pub use purpose::PurposePage;
pub use review::{ReviewExpectations, ReviewPage, missing_review_fields};
pub use transport::TransportPage;
pub use urls::AppUrls;
